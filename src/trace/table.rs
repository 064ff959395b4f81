//! Sample tables indexed by timestamp.
//!
//! A table owns every row of one record group for the duration of a report.
//! Rows keep input order; the timestamp index is not unique because each
//! sampling instant produces one row per process.

use std::fmt;

use anyhow::{bail, Result};
use chrono::NaiveDateTime;

use super::models::{CgroupField, CgroupSample, GroupKey, ProcessField, ProcessSample};
use crate::analyze::{bin_counts, Point};
use crate::error::ParseError;

/// Read access shared by the process and cgroup tables.
///
/// The chart renderer only sees tables through this trait, so it can chart
/// either record type with the same code.
pub trait SampleTable {
    /// Column selector; its `Display` form is used as the legend name.
    type Field: Copy + fmt::Display;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Timestamp of every row, in row order.
    fn timestamps(&self) -> Vec<NaiveDateTime>;

    /// `(timestamp, value)` of every row for a numeric field.
    fn points(&self, field: Self::Field) -> Result<Vec<Point>>;

    /// `(timestamp, key)` of every row for any field.
    fn keys(&self, field: Self::Field) -> Vec<(NaiveDateTime, GroupKey)>;

    /// Earliest and latest timestamp.
    fn time_range(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let stamps = self.timestamps();
        let min = stamps.iter().min()?;
        let max = stamps.iter().max()?;
        Some((*min, *max))
    }
}

/// Every process sample of one profiler file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessTable {
    rows: Vec<ProcessSample>,
}

impl ProcessTable {
    /// Map raw process lines into typed rows. The first failing line aborts
    /// the build.
    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Result<Self, ParseError> {
        let rows = lines
            .iter()
            .enumerate()
            .map(|(idx, line)| ProcessSample::from_line(line.as_ref(), idx + 1))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[ProcessSample] {
        &self.rows
    }

    /// Row counts per read and write size bucket, in bucket order.
    pub fn size_bin_counts(&self) -> ([u64; 16], [u64; 16]) {
        (
            bin_counts(self.rows.iter().map(|r| r.rsize_bin)),
            bin_counts(self.rows.iter().map(|r| r.wsize_bin)),
        )
    }
}

impl SampleTable for ProcessTable {
    type Field = ProcessField;

    fn len(&self) -> usize {
        self.rows.len()
    }

    fn timestamps(&self) -> Vec<NaiveDateTime> {
        self.rows.iter().map(|r| r.timestamp).collect()
    }

    fn points(&self, field: ProcessField) -> Result<Vec<Point>> {
        let mut points = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            match row.value(field) {
                Some(v) => points.push((row.timestamp, v)),
                None => bail!("Process field {field} is not numeric"),
            }
        }
        Ok(points)
    }

    fn keys(&self, field: ProcessField) -> Vec<(NaiveDateTime, GroupKey)> {
        self.rows
            .iter()
            .map(|r| (r.timestamp, r.key(field)))
            .collect()
    }
}

/// Every cgroup sample of one profiler file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CgroupTable {
    rows: Vec<CgroupSample>,
}

impl CgroupTable {
    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Result<Self, ParseError> {
        let rows = lines
            .iter()
            .enumerate()
            .map(|(idx, line)| CgroupSample::from_line(line.as_ref(), idx + 1))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[CgroupSample] {
        &self.rows
    }
}

impl SampleTable for CgroupTable {
    type Field = CgroupField;

    fn len(&self) -> usize {
        self.rows.len()
    }

    fn timestamps(&self) -> Vec<NaiveDateTime> {
        self.rows.iter().map(|r| r.timestamp).collect()
    }

    fn points(&self, field: CgroupField) -> Result<Vec<Point>> {
        let mut points = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            match row.value(field) {
                Some(v) => points.push((row.timestamp, v)),
                None => bail!("Cgroup field {field} is not numeric"),
            }
        }
        Ok(points)
    }

    fn keys(&self, field: CgroupField) -> Vec<(NaiveDateTime, GroupKey)> {
        self.rows
            .iter()
            .map(|r| (r.timestamp, r.key(field)))
            .collect()
    }
}
