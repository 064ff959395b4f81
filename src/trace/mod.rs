//! Typed sample tables built from raw profiler records.
//!
//! # Module Organization
//!
//! - [`schema`]: positional column layouts and per-column casting
//! - [`models`]: process and cgroup rows plus their field selectors
//! - [`table`]: timestamp-indexed tables and the [`SampleTable`] trait
//! - [`constants`]: timestamp format and unit factors

pub mod constants;
pub mod models;
pub mod schema;
pub mod table;

pub use models::{CgroupField, CgroupSample, GroupKey, ProcessField, ProcessSample};
pub use schema::{Column, ColumnType, CGROUP_SCHEMA, PROCESS_SCHEMA};
pub use table::{CgroupTable, ProcessTable, SampleTable};
