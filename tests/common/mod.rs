//! Common test utilities for profreport integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

/// Seconds covered by [`write_capture`].
pub const CAPTURE_SECONDS: u32 = 6;

/// Pids sampled at every second of [`write_capture`].
pub const CAPTURE_PIDS: [i32; 2] = [1, 2];

/// A process record for `pid` at `10:00:<sec>`.
///
/// Each pid owns 1 GB of RSS and runs on CPU `pid - 1`; pid 1 is running at
/// 10% CPU and pid 2 sleeping at 20%. Read counters grow with `sec` so the
/// average read size is 4096 bytes once any reads happened.
pub fn process_line(sec: u32, pid: i32) -> String {
    let (state, cpu) = if pid == 1 { ("R", 10.0) } else { ("S", 20.0) };
    let proc_id = pid - 1;
    let n = i64::from(sec);
    format!(
        "2024/03/01T10:00:{sec:02},/proc/{pid},{pid},{state},1,2,262144,4096,0,0,1073741824,\
         {proc_id},{cpu},1.5,2.5,{sec},{cputime},0,0,{rchar},{rbytes},{syscr},0,0,0,0,0",
        cputime = n * 3,
        rchar = n * 4096,
        rbytes = n * 8192,
        syscr = n * 2,
    )
}

pub fn cgroup_line(sec: u32) -> String {
    format!("2024/03/01T10:00:{sec:02},/cgroup/job_1/step_0,2,2,4096,8192,0,0,0,0,2048,1024")
}

/// Write a capture mixing process and cgroup records, with NUL padding and
/// blank lines the way the profiler leaves them.
pub fn write_capture(dir: &Path) -> PathBuf {
    let mut lines = Vec::new();
    for sec in 0..CAPTURE_SECONDS {
        for pid in CAPTURE_PIDS {
            lines.push(process_line(sec, pid));
        }
        lines.push(cgroup_line(sec));
    }
    lines.push("\0\0\0".to_string());
    write_lines(dir, "profile.csv", &lines)
}

pub fn write_lines(dir: &Path, name: &str, lines: &[String]) -> PathBuf {
    let path = dir.join(name);
    let mut content = lines.join("\n");
    content.push('\n');
    fs::write(&path, content).expect("Failed to write capture");
    path
}

/// Titles of the report charts in render order.
pub const REPORT_TITLES: [&str; 15] = [
    "CPU Usage (Sum)",
    "RSS Usage (Sum)",
    "CPU User & System Usage",
    "CPU User & System Stacked Usage",
    "RSS & VSize Usage",
    "RSS & VSize Stacked Usage",
    "IO Activity",
    "IO Stacked Activity",
    "Bytes Read & Written to Storage",
    "Stacked Bytes Read & Written to Storage",
    "Read & Write System Call Activity",
    "Read & Write System Call Stacked Activity",
    "CPU Time (Sum)",
    "CPU Process State",
    "IO Distribution",
];
