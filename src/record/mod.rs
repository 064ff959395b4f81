//! Record parsing for profiler sample files.
//!
//! The profiler writes process and cgroup samples into one file. This module
//! only splits the raw lines into the two groups; typed mapping happens in
//! [`crate::trace`].

pub mod reader;

pub use reader::{read_group, select_group, RecordGroup};
