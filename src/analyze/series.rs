//! Time series built from sample tables.
//!
//! Charts work on one value per timestamp. Rows that share a timestamp (one
//! per pid) are summed first; cumulative counters can then be turned into
//! per-interval activity with [`diff_clip`].

use std::collections::BTreeMap;

use chrono::NaiveDateTime;

use super::units::finite_or_zero;
use crate::trace::constants::DIFF_CLIP_QUANTILE;

/// A single timestamped value.
pub type Point = (NaiveDateTime, f64);

/// A named series of points in ascending timestamp order.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    pub name: String,
    pub points: Vec<Point>,
}

impl TimeSeries {
    pub fn new(name: impl Into<String>, points: Vec<Point>) -> Self {
        Self {
            name: name.into(),
            points,
        }
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|(_, v)| *v)
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Multiply every value, e.g. to convert KB into GB for display.
    pub fn scaled(mut self, factor: f64) -> Self {
        for (_, v) in &mut self.points {
            *v = finite_or_zero(*v * factor);
        }
        self
    }

    /// Replace the values with their clipped first difference.
    pub fn diffed(mut self) -> Self {
        let values: Vec<f64> = self.values().collect();
        for ((_, v), d) in self.points.iter_mut().zip(diff_clip(&values)) {
            *v = d;
        }
        self
    }
}

/// Sum values that share a timestamp, returning one point per timestamp in
/// ascending order.
pub fn sum_by_timestamp<I>(points: I) -> Vec<Point>
where
    I: IntoIterator<Item = Point>,
{
    let mut sums: BTreeMap<NaiveDateTime, f64> = BTreeMap::new();
    for (ts, value) in points {
        *sums.entry(ts).or_insert(0.0) += value;
    }
    sums.into_iter()
        .map(|(ts, v)| (ts, finite_or_zero(v)))
        .collect()
}

/// First difference with counter-reset clamping and high-quantile clipping.
///
/// The leading element has no predecessor and becomes 0. Negative steps
/// (counter resets or wraps) become 0. The result is then clipped to
/// `[0, q]` where `q` is the 0.9 quantile of the clamped series, so single
/// sample spikes cannot dominate the chart scale.
pub fn diff_clip(values: &[f64]) -> Vec<f64> {
    let mut diffs: Vec<f64> = Vec::with_capacity(values.len());
    let mut prev: Option<f64> = None;
    for &value in values {
        let step = match prev {
            Some(p) => finite_or_zero(value - p),
            None => 0.0,
        };
        diffs.push(step.max(0.0));
        prev = Some(value);
    }

    let upper = quantile(&diffs, DIFF_CLIP_QUANTILE).unwrap_or(0.0);
    diffs.iter().map(|v| v.clamp(0.0, upper)).collect()
}

/// Quantile `q` in `[0, 1]` with linear interpolation between closest ranks.
///
/// Returns `None` for an empty input.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}
