//! Column schemas for profiler sample records.
//!
//! Both record types are positional CSV. The tables below fix the column
//! order and the type each column is cast to. [`RowFields`] splits a line
//! against a schema and performs the casts, reporting the line, column and
//! offending text on failure.

use chrono::NaiveDateTime;

use super::constants::TIMESTAMP_FORMAT;
use crate::error::ParseError;

/// Declared type of a schema column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Timestamp,
    Text,
    /// 32-bit integer.
    Int,
    /// 64-bit integer.
    Int64,
    Float,
}

/// A named, typed column.
#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub data_type: ColumnType,
}

const fn col(name: &'static str, data_type: ColumnType) -> Column {
    Column { name, data_type }
}

pub const PROCESS_COLUMN_COUNT: usize = 27;
pub const CGROUP_COLUMN_COUNT: usize = 12;

/// Process record layout.
pub const PROCESS_SCHEMA: [Column; PROCESS_COLUMN_COUNT] = [
    col("timestamp", ColumnType::Timestamp),
    col("desc", ColumnType::Text),
    col("pid", ColumnType::Int),
    col("state", ColumnType::Text),
    col("ppid", ColumnType::Int),
    col("nthrds", ColumnType::Int),
    col("rss", ColumnType::Int64),
    col("pagesize", ColumnType::Int64),
    col("rss_kb", ColumnType::Int64),
    col("pss_kb", ColumnType::Int64),
    col("vsize", ColumnType::Float),
    col("proc", ColumnType::Int),
    col("avg_cpu", ColumnType::Float),
    col("avg_usr", ColumnType::Float),
    col("avg_sys", ColumnType::Float),
    col("secs", ColumnType::Int64),
    col("cputime", ColumnType::Float),
    col("usrtime", ColumnType::Float),
    col("systime", ColumnType::Float),
    col("rchar", ColumnType::Int64),
    col("rbytes", ColumnType::Int64),
    col("syscr", ColumnType::Int64),
    col("rsize", ColumnType::Float),
    col("wchar", ColumnType::Int64),
    col("wbytes", ColumnType::Int64),
    col("syscw", ColumnType::Int64),
    col("wsize", ColumnType::Float),
];

/// Cgroup record layout. Memory columns are bytes.
pub const CGROUP_SCHEMA: [Column; CGROUP_COLUMN_COUNT] = [
    col("timestamp", ColumnType::Timestamp),
    col("desc", ColumnType::Text),
    col("tgids", ColumnType::Int),
    col("pids", ColumnType::Int),
    col("cache", ColumnType::Int64),
    col("rss", ColumnType::Int64),
    col("mapped_file", ColumnType::Int64),
    col("inactive_anon", ColumnType::Int64),
    col("active_anon", ColumnType::Int64),
    col("unevictable", ColumnType::Int64),
    col("tcache", ColumnType::Int64),
    col("trss", ColumnType::Int64),
];

/// Index of a column by name, for tests and diagnostics.
pub fn column_index(schema: &[Column], name: &str) -> Option<usize> {
    schema.iter().position(|c| c.name == name)
}

/// One line split against a schema, with typed accessors per column.
///
/// Accessors take the column index; the expected type is checked in debug
/// builds against the schema declaration.
pub struct RowFields<'a> {
    line: usize,
    schema: &'static [Column],
    fields: Vec<&'a str>,
}

impl<'a> RowFields<'a> {
    /// Split `text` by comma and require exactly `schema.len()` fields.
    pub fn split(
        text: &'a str,
        schema: &'static [Column],
        line: usize,
    ) -> Result<Self, ParseError> {
        let fields: Vec<&str> = text.split(',').collect();
        if fields.len() != schema.len() {
            return Err(ParseError::FieldCount {
                line,
                expected: schema.len(),
                got: fields.len(),
            });
        }
        Ok(Self {
            line,
            schema,
            fields,
        })
    }

    fn raw(&self, idx: usize, expected: ColumnType) -> &'a str {
        debug_assert_eq!(self.schema[idx].data_type, expected);
        self.fields[idx]
    }

    fn invalid(&self, idx: usize) -> ParseError {
        ParseError::InvalidNumber {
            line: self.line,
            column: self.schema[idx].name,
            value: self.fields[idx].to_string(),
        }
    }

    pub fn timestamp(&self, idx: usize) -> Result<NaiveDateTime, ParseError> {
        let raw = self.raw(idx, ColumnType::Timestamp);
        NaiveDateTime::parse_from_str(raw.trim(), TIMESTAMP_FORMAT).map_err(|source| {
            ParseError::InvalidTimestamp {
                line: self.line,
                value: raw.to_string(),
                source,
            }
        })
    }

    pub fn text(&self, idx: usize) -> String {
        self.raw(idx, ColumnType::Text).to_string()
    }

    pub fn int(&self, idx: usize) -> Result<i32, ParseError> {
        self.raw(idx, ColumnType::Int)
            .trim()
            .parse()
            .map_err(|_| self.invalid(idx))
    }

    pub fn int64(&self, idx: usize) -> Result<i64, ParseError> {
        self.raw(idx, ColumnType::Int64)
            .trim()
            .parse()
            .map_err(|_| self.invalid(idx))
    }

    pub fn float(&self, idx: usize) -> Result<f64, ParseError> {
        self.raw(idx, ColumnType::Float)
            .trim()
            .parse()
            .map_err(|_| self.invalid(idx))
    }
}
