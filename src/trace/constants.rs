//! Constants shared by the sample schemas and derivations.

/// Timestamp layout written by the profiler, e.g. `2024/03/01T12:00:05`.
pub const TIMESTAMP_FORMAT: &str = "%Y/%m/%dT%H:%M:%S";

/// Bytes per kilobyte for unit conversions.
pub const KB: f64 = 1024.0;

/// Kilobytes per gigabyte, used when charting memory in GBytes.
pub const KB_PER_GB: f64 = 1024.0 * 1024.0;

/// Quantile used to clip differenced series.
pub const DIFF_CLIP_QUANTILE: f64 = 0.9;
