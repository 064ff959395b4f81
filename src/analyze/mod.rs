//! Metric derivation over sample tables.
//!
//! Everything here is pure: functions take rows or series and return new
//! values, leaving the base tables untouched so each chart can derive its own
//! working copy.

pub mod identity;
pub mod iosize;
pub mod series;
pub mod timeline;
pub mod units;

pub use identity::identity_key;
pub use iosize::{bin_counts, IoSizeBin};
pub use series::{diff_clip, quantile, sum_by_timestamp, Point, TimeSeries};
pub use timeline::{build_tracks, sampling_resolution, segment_rows, Segment, StateSample, Track};
pub use units::{finite_or_zero, safe_div};
