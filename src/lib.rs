//! profreport library - every stage of the resource usage report.
//!
//! Profiler captures flow through the modules in order:
//!
//! - [`record`] - split raw lines into process and cgroup groups
//! - [`trace`] - typed sample tables over fixed column schemas
//! - [`analyze`] - unit conversions, diff mode, size bins, state timelines
//! - [`chart`] - the five chart operations, producing [`output::Figure`]s
//! - [`output`] - figure writers (SVG via plotters, or in memory)
//! - [`report`] - the fixed 15-chart report
//!
//! # Example
//!
//! ```no_run
//! use profreport::config::ReportConfig;
//! use profreport::output::SvgOutput;
//!
//! let config = ReportConfig {
//!     input: "profile.csv".into(),
//!     ..ReportConfig::default()
//! };
//! std::fs::create_dir_all(&config.output_dir).expect("Failed to create output directory");
//! let mut output = SvgOutput::new(config.width, config.height);
//! let summary = profreport::report::generate(&config, &mut output).expect("Report failed");
//! println!("{} charts written", summary.artifacts.len());
//! ```

pub mod analyze;
pub mod chart;
pub mod config;
pub mod error;
pub mod output;
pub mod record;
pub mod report;
pub mod trace;

// Re-export for convenience
pub use config::ReportConfig;
pub use error::ParseError;
pub use report::{generate, ReportSummary};
