//! Errors raised while reading profiler input.
//!
//! Anything that makes a record unusable is fatal: rows are never skipped,
//! so a single bad line aborts the report.

use std::fmt;

/// Malformed profiler input.
#[derive(Debug)]
pub enum ParseError {
    /// The line has no second comma-delimited field to classify it by.
    MissingDiscriminator { line: usize },
    /// The second field has no path segment at index 1.
    MissingPathSegment { line: usize, value: String },
    /// The line does not split into the schema's column count.
    FieldCount {
        line: usize,
        expected: usize,
        got: usize,
    },
    /// The timestamp column is not `YYYY/MM/DDTHH:MM:SS`.
    InvalidTimestamp {
        line: usize,
        value: String,
        source: chrono::ParseError,
    },
    /// A numeric column holds text that does not cast to its declared type.
    InvalidNumber {
        line: usize,
        column: &'static str,
        value: String,
    },
}

impl ParseError {
    /// 1-based line number within the group the error was raised for.
    pub fn line(&self) -> usize {
        match self {
            ParseError::MissingDiscriminator { line }
            | ParseError::MissingPathSegment { line, .. }
            | ParseError::FieldCount { line, .. }
            | ParseError::InvalidTimestamp { line, .. }
            | ParseError::InvalidNumber { line, .. } => *line,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::MissingDiscriminator { line } => {
                write!(f, "line {line}: expected at least two comma-delimited fields")
            }
            ParseError::MissingPathSegment { line, value } => {
                write!(f, "line {line}: field '{value}' has no path segment at index 1")
            }
            ParseError::FieldCount {
                line,
                expected,
                got,
            } => {
                write!(f, "line {line}: expected {expected} fields, got {got}")
            }
            ParseError::InvalidTimestamp {
                line,
                value,
                source,
            } => {
                write!(f, "line {line}: invalid timestamp '{value}': {source}")
            }
            ParseError::InvalidNumber {
                line,
                column,
                value,
            } => {
                write!(f, "line {line}: column {column}: '{value}' is not a number")
            }
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::InvalidTimestamp { source, .. } => Some(source),
            _ => None,
        }
    }
}
