//! Intermediate figure model.
//!
//! A [`Figure`] describes what to draw without saying how. The chart layer
//! builds figures from derived series and any [`super::FigureOutput`] turns
//! them into artifacts, so the same figure can be rendered to SVG or simply
//! inspected in tests.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;

use crate::analyze::Point;

/// 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// A complete chart: title, axis labels and body.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub body: FigureBody,
}

/// The five chart layouts.
///
/// `Line` covers both the single-series summary and the multi-series
/// detail chart; they differ only in series count and colors.
#[derive(Debug, Clone, PartialEq)]
pub enum FigureBody {
    Line {
        series: Vec<NamedSeries>,
    },
    /// Series stacked bottom to top in the order given.
    StackedArea {
        series: Vec<NamedSeries>,
    },
    Timeline {
        tracks: Vec<TimelineTrack>,
    },
    Bars {
        categories: Vec<String>,
        series: Vec<BarSeries>,
    },
}

impl FigureBody {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Line { .. } => "line",
            Self::StackedArea { .. } => "stacked-area",
            Self::Timeline { .. } => "timeline",
            Self::Bars { .. } => "bars",
        }
    }
}

/// One time series with its legend name and color.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedSeries {
    pub name: String,
    pub color: Rgb,
    pub points: Vec<Point>,
}

/// One horizontal track of a broken-bar timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineTrack {
    pub label: String,
    pub bars: Vec<TimelineBar>,
}

/// A colored interval on a timeline track.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineBar {
    pub start: NaiveDateTime,
    pub seconds: f64,
    pub color: Rgb,
    pub label: String,
}

/// Histogram values for one series, one value per category.
#[derive(Debug, Clone, PartialEq)]
pub struct BarSeries {
    pub name: String,
    pub color: Rgb,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegendEntry {
    pub label: String,
    pub color: Rgb,
}

impl Figure {
    /// Legend entries in first-seen order.
    ///
    /// Timeline bars repeat their state label on every track; those are
    /// collapsed so each label appears once.
    pub fn legend(&self) -> Vec<LegendEntry> {
        let entries: Vec<LegendEntry> = match &self.body {
            FigureBody::Line { series } | FigureBody::StackedArea { series } => series
                .iter()
                .map(|s| LegendEntry {
                    label: s.name.clone(),
                    color: s.color,
                })
                .collect(),
            FigureBody::Bars { series, .. } => series
                .iter()
                .map(|s| LegendEntry {
                    label: s.name.clone(),
                    color: s.color,
                })
                .collect(),
            FigureBody::Timeline { tracks } => tracks
                .iter()
                .flat_map(|t| t.bars.iter())
                .map(|b| LegendEntry {
                    label: b.label.clone(),
                    color: b.color,
                })
                .collect(),
        };

        let mut legend: Vec<LegendEntry> = Vec::new();
        for entry in entries {
            if !legend.iter().any(|e| e.label == entry.label) {
                legend.push(entry);
            }
        }
        legend
    }

    /// Earliest and latest instant drawn on the time axis.
    ///
    /// `None` for histograms and for figures without any data.
    pub fn time_range(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let stamps: Vec<NaiveDateTime> = match &self.body {
            FigureBody::Line { series } | FigureBody::StackedArea { series } => series
                .iter()
                .flat_map(|s| s.points.iter().map(|(ts, _)| *ts))
                .collect(),
            FigureBody::Timeline { tracks } => tracks
                .iter()
                .flat_map(|t| t.bars.iter())
                .flat_map(|b| [b.start, bar_end(b)])
                .collect(),
            FigureBody::Bars { .. } => Vec::new(),
        };
        let min = stamps.iter().min()?;
        let max = stamps.iter().max()?;
        Some((*min, *max))
    }
}

fn bar_end(bar: &TimelineBar) -> NaiveDateTime {
    bar.start + chrono::TimeDelta::milliseconds((bar.seconds * 1000.0).round() as i64)
}

/// Running totals of `series`, bottom layer first.
///
/// Each returned layer holds the cumulative value at every timestamp seen in
/// any series; a series missing a timestamp contributes 0 there.
pub fn stack_layers(series: &[NamedSeries]) -> Vec<Vec<Point>> {
    let mut totals: BTreeMap<NaiveDateTime, f64> = series
        .iter()
        .flat_map(|s| s.points.iter().map(|(ts, _)| (*ts, 0.0)))
        .collect();

    let mut layers = Vec::with_capacity(series.len());
    for s in series {
        let values: BTreeMap<NaiveDateTime, f64> = s.points.iter().copied().collect();
        for (ts, total) in totals.iter_mut() {
            *total += values.get(ts).copied().unwrap_or(0.0);
        }
        layers.push(totals.iter().map(|(ts, v)| (*ts, *v)).collect());
    }
    layers
}
