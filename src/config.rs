//! Report configuration.

use std::path::PathBuf;

use crate::output::BarhType;

pub const DEFAULT_WIDTH: u32 = 1500;
pub const DEFAULT_HEIGHT: u32 = 800;
pub const DEFAULT_TICK_MINUTES: i64 = 60;
/// Largest tick interval accepted, a bit under two years.
pub const MAX_TICK_MINUTES: i64 = 1_000_000;
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Configuration for one report run.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// Profiler CSV holding both process and cgroup records.
    pub input: PathBuf,

    /// Directory receiving one artifact per chart.
    pub output_dir: PathBuf,

    /// Figure size in pixels.
    pub width: u32,
    pub height: u32,

    /// Minutes between major labels on time axes.
    pub tick_interval_minutes: i64,

    /// State labeling for the process state timeline.
    pub barh_type: BarhType,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            // 15x8 inches at 100 dpi
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            tick_interval_minutes: DEFAULT_TICK_MINUTES,
            barh_type: BarhType::Cpu,
        }
    }
}
