//! The fixed resource usage report.
//!
//! A report reads one profiler file, builds the process and cgroup tables
//! and renders the same 15 charts on every run, in a fixed order. Any
//! failure aborts the remaining charts. Cgroup records are mapped after the
//! last chart, so a bad cgroup line fails the run without costing a chart.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use crate::analyze::IoSizeBin;
use crate::chart::{ChartRenderer, ChartRequest};
use crate::config::ReportConfig;
use crate::output::FigureOutput;
use crate::record::{read_group, RecordGroup};
use crate::trace::constants::{KB_PER_GB, TIMESTAMP_FORMAT};
use crate::trace::{CgroupTable, ProcessField, ProcessTable, SampleTable};

/// What a report run read and wrote.
#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub version: String,
    pub input: PathBuf,
    pub process_rows: usize,
    pub cgroup_rows: usize,
    /// First and last process sample, formatted like the input timestamps.
    pub time_range: Option<TimeRange>,
    pub artifacts: Vec<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimeRange {
    pub start: String,
    pub end: String,
}

/// Read `config.input` and render every chart through `output`.
pub fn generate(config: &ReportConfig, output: &mut dyn FigureOutput) -> Result<ReportSummary> {
    let input = &config.input;

    let process_lines = read_group(input, RecordGroup::Process)?;
    let process = ProcessTable::from_lines(&process_lines)
        .with_context(|| format!("invalid process record in {}", input.display()))?;
    info!(
        "Loaded {} process samples from {}",
        process.len(),
        input.display()
    );

    let mut renderer =
        ChartRenderer::new(output, config.output_dir.clone()).with_barh_type(config.barh_type);
    let artifacts = render_charts(&mut renderer, &process)?;

    // Cgroup records only feed the summary.
    let cgroup_lines = read_group(input, RecordGroup::Cgroup)?;
    let cgroup = CgroupTable::from_lines(&cgroup_lines)
        .with_context(|| format!("invalid cgroup record in {}", input.display()))?;
    debug!("Loaded {} cgroup samples", cgroup.len());

    let time_range = process.time_range().map(|(start, end)| TimeRange {
        start: start.format(TIMESTAMP_FORMAT).to_string(),
        end: end.format(TIMESTAMP_FORMAT).to_string(),
    });

    Ok(ReportSummary {
        version: env!("CARGO_PKG_VERSION").to_string(),
        input: input.clone(),
        process_rows: process.len(),
        cgroup_rows: cgroup.len(),
        time_range,
        artifacts,
    })
}

fn render_charts(renderer: &mut ChartRenderer<'_>, process: &ProcessTable) -> Result<Vec<PathBuf>> {
    use ProcessField::*;

    let gb = 1.0 / KB_PER_GB;
    let mut artifacts = Vec::with_capacity(15);

    artifacts.push(renderer.line_summary(
        process,
        AvgCpu,
        &ChartRequest::new("CPU Usage (Sum)", "CPU Avg"),
    )?);
    artifacts.push(renderer.line_summary(
        process,
        Rss,
        &ChartRequest::new("RSS Usage (Sum)", "GBytes").scale(gb),
    )?);
    artifacts.push(renderer.line_detail(
        process,
        &[AvgSys, AvgUsr],
        &ChartRequest::new("CPU User & System Usage", "CPU Avg"),
    )?);
    artifacts.push(renderer.stack_summary(
        process,
        &[AvgSys, AvgUsr],
        &ChartRequest::new("CPU User & System Stacked Usage", "CPU Avg"),
    )?);
    artifacts.push(renderer.line_detail(
        process,
        &[Rss, Vsize],
        &ChartRequest::new("RSS & VSize Usage", "GBytes").scale(gb),
    )?);
    artifacts.push(renderer.stack_summary(
        process,
        &[Rss, Vsize],
        &ChartRequest::new("RSS & VSize Stacked Usage", "GBytes").scale(gb),
    )?);
    artifacts.push(renderer.line_detail(
        process,
        &[Rchar, Wchar],
        &ChartRequest::new("IO Activity", "Kbytes").diff(),
    )?);
    artifacts.push(renderer.stack_summary(
        process,
        &[Rchar, Wchar],
        &ChartRequest::new("IO Stacked Activity", "Kbytes").diff(),
    )?);
    artifacts.push(renderer.line_detail(
        process,
        &[Rbytes, Wbytes],
        &ChartRequest::new("Bytes Read & Written to Storage", "Kbytes").diff(),
    )?);
    artifacts.push(renderer.stack_summary(
        process,
        &[Rbytes, Wbytes],
        &ChartRequest::new("Stacked Bytes Read & Written to Storage", "Kbytes").diff(),
    )?);
    artifacts.push(renderer.line_detail(
        process,
        &[Syscr, Syscw],
        &ChartRequest::new("Read & Write System Call Activity", "#System Calls").diff(),
    )?);
    artifacts.push(renderer.stack_summary(
        process,
        &[Syscr, Syscw],
        &ChartRequest::new("Read & Write System Call Stacked Activity", "#System Calls").diff(),
    )?);
    artifacts.push(renderer.line_summary(
        process,
        Cputime,
        &ChartRequest::new("CPU Time (Sum)", "Time").diff(),
    )?);
    artifacts.push(renderer.broken_barh(
        process,
        Proc,
        State,
        &ChartRequest::new("CPU Process State", "CPU"),
    )?);

    let (reads, writes) = process.size_bin_counts();
    let as_values = |counts: [u64; 16]| counts.iter().map(|c| *c as f64).collect::<Vec<f64>>();
    artifacts.push(renderer.bar_detail(
        IoSizeBin::labels(),
        vec![
            ("Read".to_string(), as_values(reads)),
            ("Write".to_string(), as_values(writes)),
        ],
        &ChartRequest::new("IO Distribution", "IO Frequency").x_label("IO Sizes"),
    )?);

    Ok(artifacts)
}
