//! State occupancy timelines for broken-bar charts.
//!
//! Samples are split into one track per group value (e.g. per CPU). Within a
//! track consecutive samples in the same state are run-length encoded into
//! segments. A segment also ends when the time since the previous sample
//! exceeds the sampling resolution, so missed samples show up as holes
//! instead of being painted over.

use std::collections::{BTreeMap, HashMap};

use chrono::{NaiveDateTime, TimeDelta};

use crate::trace::GroupKey;

/// One row projected onto (timestamp, group, state).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateSample {
    pub ts: NaiveDateTime,
    pub group: GroupKey,
    pub state: String,
}

/// A run of one state starting at `start` and lasting `seconds`.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub state: String,
    pub start: NaiveDateTime,
    pub seconds: f64,
}

impl Segment {
    pub fn end(&self) -> NaiveDateTime {
        self.start + TimeDelta::milliseconds((self.seconds * 1000.0).round() as i64)
    }
}

/// All segments of one group value.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub group: GroupKey,
    pub segments: Vec<Segment>,
}

fn delta_seconds(delta: TimeDelta) -> f64 {
    delta.num_milliseconds() as f64 / 1000.0
}

/// Most frequent delta between consecutive distinct timestamps.
///
/// Ties go to the smaller delta. Returns `None` with fewer than two distinct
/// timestamps.
pub fn sampling_resolution<I>(timestamps: I) -> Option<TimeDelta>
where
    I: IntoIterator<Item = NaiveDateTime>,
{
    let mut distinct: Vec<NaiveDateTime> = timestamps.into_iter().collect();
    distinct.sort_unstable();
    distinct.dedup();

    let mut counts: HashMap<TimeDelta, usize> = HashMap::new();
    for pair in distinct.windows(2) {
        *counts.entry(pair[1] - pair[0]).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .max_by(|(da, ca), (db, cb)| ca.cmp(cb).then_with(|| db.cmp(da)))
        .map(|(delta, _)| delta)
}

/// Order one group's rows by (timestamp, state) and keep the first row per
/// timestamp.
fn dedup_rows(mut rows: Vec<(NaiveDateTime, &str)>) -> Vec<(NaiveDateTime, &str)> {
    rows.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)));
    rows.dedup_by_key(|row| row.0);
    rows
}

struct OpenSegment<'a> {
    state: &'a str,
    start: NaiveDateTime,
    seconds: f64,
}

impl OpenSegment<'_> {
    fn close(self) -> Segment {
        Segment {
            state: self.state.to_string(),
            start: self.start,
            seconds: self.seconds,
        }
    }
}

/// Run-length encode time-ordered rows of a single group.
///
/// A gap larger than `resolution` closes the open segment at the previous
/// sample. A state change extends the open segment up to the current sample
/// before closing it. The last open segment is always flushed.
pub fn segment_rows(rows: &[(NaiveDateTime, &str)], resolution: Option<TimeDelta>) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut open: Option<OpenSegment<'_>> = None;
    let mut prev: Option<(NaiveDateTime, &str)> = None;

    for &(ts, state) in rows {
        let Some((prev_ts, prev_state)) = prev else {
            open = Some(OpenSegment {
                state,
                start: ts,
                seconds: 0.0,
            });
            prev = Some((ts, state));
            continue;
        };

        let delta = ts - prev_ts;
        let gap = resolution.is_some_and(|res| delta > res);
        if let Some(mut current) = open.take() {
            if gap {
                segments.push(current.close());
            } else if state != prev_state {
                current.seconds += delta_seconds(delta);
                segments.push(current.close());
            } else {
                current.seconds += delta_seconds(delta);
                open = Some(current);
            }
        }
        if open.is_none() {
            open = Some(OpenSegment {
                state,
                start: ts,
                seconds: 0.0,
            });
        }
        prev = Some((ts, state));
    }

    if let Some(current) = open {
        segments.push(current.close());
    }
    segments
}

/// Build one track per distinct group value, in ascending group order.
pub fn build_tracks(samples: &[StateSample], resolution: Option<TimeDelta>) -> Vec<Track> {
    let mut groups: BTreeMap<&GroupKey, Vec<(NaiveDateTime, &str)>> = BTreeMap::new();
    for sample in samples {
        groups
            .entry(&sample.group)
            .or_default()
            .push((sample.ts, sample.state.as_str()));
    }

    groups
        .into_iter()
        .map(|(group, rows)| Track {
            group: group.clone(),
            segments: segment_rows(&dedup_rows(rows), resolution),
        })
        .collect()
}
