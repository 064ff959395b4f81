//! Per-call I/O size buckets.
//!
//! Average bytes per read/write syscall are bucketed into 16 power-of-two
//! classes. Intervals are open below and closed above, so a value sitting
//! on an edge belongs to the lower bucket (4096 is `4K`, not `8K`).

use std::fmt;

use serde::Serialize;

/// One of the 16 fixed I/O size classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum IoSizeBin {
    Zero,
    B512,
    K1,
    K2,
    K4,
    K8,
    K16,
    K32,
    K64,
    K128,
    K256,
    K512,
    M1,
    M2,
    M4,
    M8,
}

/// Upper edges matching [`IoSizeBin::ALL`]; the lowest bucket starts above -1.
const UPPER_EDGES: [f64; 16] = [
    0.0,
    512.0,
    1024.0,
    2048.0,
    4096.0,
    8192.0,
    16384.0,
    32768.0,
    65536.0,
    131072.0,
    262144.0,
    524288.0,
    1048576.0,
    2097152.0,
    4194304.0,
    8388608.0,
];

const LOWEST_EDGE: f64 = -1.0;

impl IoSizeBin {
    /// Every bucket, smallest first.
    pub const ALL: [IoSizeBin; 16] = [
        Self::Zero,
        Self::B512,
        Self::K1,
        Self::K2,
        Self::K4,
        Self::K8,
        Self::K16,
        Self::K32,
        Self::K64,
        Self::K128,
        Self::K256,
        Self::K512,
        Self::M1,
        Self::M2,
        Self::M4,
        Self::M8,
    ];

    /// Bucket for an average I/O size in bytes.
    ///
    /// Anything outside `(-1, 8M]`, including NaN, lands in `0B`.
    pub fn classify(value: f64) -> Self {
        if value.is_nan() || value <= LOWEST_EDGE {
            return Self::Zero;
        }
        UPPER_EDGES
            .iter()
            .position(|&upper| value <= upper)
            .map_or(Self::Zero, |idx| Self::ALL[idx])
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Zero => "0B",
            Self::B512 => "512B",
            Self::K1 => "1K",
            Self::K2 => "2K",
            Self::K4 => "4K",
            Self::K8 => "8K",
            Self::K16 => "16K",
            Self::K32 => "32K",
            Self::K64 => "64K",
            Self::K128 => "128K",
            Self::K256 => "256K",
            Self::K512 => "512K",
            Self::M1 => "1M",
            Self::M2 => "2M",
            Self::M4 => "4M",
            Self::M8 => "8M",
        }
    }

    /// Position within [`IoSizeBin::ALL`].
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Labels of every bucket in order, used as histogram categories.
    pub fn labels() -> Vec<String> {
        Self::ALL.iter().map(|b| b.label().to_string()).collect()
    }
}

impl fmt::Display for IoSizeBin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Count occurrences of each bucket, reported for all 16 in fixed order.
pub fn bin_counts<I>(bins: I) -> [u64; 16]
where
    I: IntoIterator<Item = IoSizeBin>,
{
    let mut counts = [0u64; 16];
    for bin in bins {
        counts[bin.index()] += 1;
    }
    counts
}
