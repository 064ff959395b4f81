//! Group selection over raw profiler lines.
//!
//! Every record carries a path-like second field, e.g. `/cgroup/job_12/step_0`
//! for cgroup samples or `/proc/1234` for process samples. The second path
//! segment decides which group a line belongs to.

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::error::ParseError;

/// Segment value that marks a cgroup record.
const CGROUP_SEGMENT: &str = "cgroup";

/// Which record type to pull out of a profiler file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordGroup {
    Process,
    Cgroup,
}

impl RecordGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Process => "process",
            Self::Cgroup => "cgroup",
        }
    }

    fn matches(&self, segment: &str) -> bool {
        match self {
            Self::Cgroup => segment == CGROUP_SEGMENT,
            Self::Process => segment != CGROUP_SEGMENT,
        }
    }
}

impl fmt::Display for RecordGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordGroup {
    type Err = std::convert::Infallible;

    /// Anything other than `cgroup` selects process records.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(if s == CGROUP_SEGMENT {
            Self::Cgroup
        } else {
            Self::Process
        })
    }
}

/// Read `path` and return the lines belonging to `group`, in file order.
pub fn read_group(path: &Path, group: RecordGroup) -> Result<Vec<String>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    select_group(BufReader::new(file), group)
        .with_context(|| format!("failed to read {} records from {}", group, path.display()))
}

/// Select the lines of `group` from any line-oriented reader.
///
/// Leading and trailing NUL/newline characters are stripped and blank lines
/// skipped before classification. A line that cannot be classified is an
/// error rather than being dropped.
pub fn select_group<R: BufRead>(reader: R, group: RecordGroup) -> Result<Vec<String>> {
    let mut lines = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim_matches(&['\0', '\n'][..]);
        if line.is_empty() {
            continue;
        }

        let segment = discriminator(line, idx + 1)?;
        if group.matches(segment) {
            lines.push(line.to_string());
        }
    }

    Ok(lines)
}

/// Second `/`-segment of the second comma-delimited field.
fn discriminator(line: &str, line_no: usize) -> std::result::Result<&str, ParseError> {
    let field = line
        .split(',')
        .nth(1)
        .ok_or(ParseError::MissingDiscriminator { line: line_no })?;

    field
        .split('/')
        .nth(1)
        .ok_or_else(|| ParseError::MissingPathSegment {
            line: line_no,
            value: field.to_string(),
        })
}
