//! SVG rendering of figures with plotters.
//!
//! Time axes are drawn in seconds from the first instant of the figure and
//! labelled as wall-clock `%H:%M:%S`. Categorical axes (timeline tracks,
//! histogram buckets) use integer coordinates so every label sits on an
//! exact key point.

use std::ffi::OsString;
use std::ops::Range;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{NaiveDateTime, TimeDelta};
use plotters::coord::Shift;
use plotters::prelude::*;
use tracing::debug;

use super::types::{
    stack_layers, BarSeries, Figure, FigureBody, LegendEntry, NamedSeries, Rgb, TimelineTrack,
};
use super::FigureOutput;
use crate::config::{DEFAULT_HEIGHT, DEFAULT_TICK_MINUTES, DEFAULT_WIDTH, MAX_TICK_MINUTES};

const CAPTION_SIZE: i32 = 24;
const MARGIN: u32 = 20;
const X_LABEL_AREA: u32 = 50;
const Y_LABEL_AREA: u32 = 90;

/// Vertical distance between timeline tracks, and half the bar height.
const TRACK_PITCH: i32 = 10;
const TRACK_HALF_HEIGHT: i32 = 4;

/// Histogram layout in tenths of a category: one category every 10 units,
/// bars 4 units wide.
const CATEGORY_PITCH: i32 = 10;
const BAR_WIDTH: i32 = 4;

impl From<Rgb> for RGBColor {
    fn from(c: Rgb) -> Self {
        RGBColor(c.0, c.1, c.2)
    }
}

/// Writes each figure as `<destination>.svg`.
#[derive(Debug, Clone)]
pub struct SvgOutput {
    width: u32,
    height: u32,
    tick_interval: TimeDelta,
}

impl SvgOutput {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            tick_interval: TimeDelta::minutes(DEFAULT_TICK_MINUTES),
        }
    }

    /// Minutes between major labels on time axes, clamped to
    /// `1..=MAX_TICK_MINUTES`.
    pub fn with_tick_interval(mut self, minutes: i64) -> Self {
        self.tick_interval = TimeDelta::minutes(minutes.clamp(1, MAX_TICK_MINUTES));
        self
    }

    fn draw<DB>(&self, root: &DrawingArea<DB, Shift>, figure: &Figure) -> Result<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        root.fill(&WHITE)?;

        let axis = TimeAxis::new(figure.time_range(), self.tick_interval);
        let legend = figure.legend();
        match &figure.body {
            FigureBody::Line { series } => draw_lines(root, figure, series, &axis),
            FigureBody::StackedArea { series } => draw_stacked(root, figure, series, &axis),
            FigureBody::Timeline { tracks } => {
                draw_timeline(root, figure, tracks, &axis, &legend)
            }
            FigureBody::Bars { categories, series } => {
                draw_bars(root, figure, categories, series)
            }
        }
    }
}

impl Default for SvgOutput {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

impl FigureOutput for SvgOutput {
    fn save(&mut self, figure: &Figure, destination: &Path) -> Result<PathBuf> {
        let path = svg_path(destination);
        {
            let root = SVGBackend::new(&path, (self.width, self.height)).into_drawing_area();
            self.draw(&root, figure)
                .with_context(|| format!("failed to draw {}", figure.title))?;
            root.present()
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
        debug!("Wrote {} chart to {}", figure.body.kind(), path.display());
        Ok(path)
    }
}

/// Append `.svg` without touching anything already in the file name.
fn svg_path(destination: &Path) -> PathBuf {
    let mut name = OsString::from(destination.as_os_str());
    name.push(".svg");
    PathBuf::from(name)
}

/// Maps timestamps onto seconds from the first instant of the figure.
struct TimeAxis {
    origin: Option<NaiveDateTime>,
    span: f64,
    labels: usize,
}

impl TimeAxis {
    fn new(range: Option<(NaiveDateTime, NaiveDateTime)>, interval: TimeDelta) -> Self {
        let Some((start, end)) = range else {
            return Self {
                origin: None,
                span: 1.0,
                labels: 2,
            };
        };
        let span = seconds(end - start);
        let step = seconds(interval).max(1.0);
        Self {
            origin: Some(start),
            span: span.max(1.0),
            labels: ((span / step).floor() as usize + 1).max(2),
        }
    }

    fn range(&self) -> Range<f64> {
        0.0..self.span
    }

    fn offset(&self, ts: NaiveDateTime) -> f64 {
        self.origin.map_or(0.0, |origin| seconds(ts - origin))
    }

    fn format(&self, offset: f64) -> String {
        match self.origin {
            Some(origin) => (origin + TimeDelta::milliseconds((offset * 1000.0).round() as i64))
                .format("%H:%M:%S")
                .to_string(),
            None => String::new(),
        }
    }
}

fn seconds(delta: TimeDelta) -> f64 {
    delta.num_milliseconds() as f64 / 1000.0
}

/// Y range covering `values` and 0, with 5% headroom.
fn value_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((0.0f64, 0.0f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let hi = if hi <= lo { lo + 1.0 } else { hi };
    lo..hi + (hi - lo) * 0.05
}

fn draw_legend<'a, DB, CT>(chart: &mut ChartContext<'a, DB, CT>) -> Result<()>
where
    DB: DrawingBackend + 'a,
    DB::ErrorType: 'static,
    CT: CoordTranslate,
{
    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    Ok(())
}

fn draw_lines<DB>(
    root: &DrawingArea<DB, Shift>,
    figure: &Figure,
    series: &[NamedSeries],
    axis: &TimeAxis,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let y = value_range(series.iter().flat_map(|s| s.points.iter().map(|p| p.1)));
    let mut chart = ChartBuilder::on(root)
        .caption(&figure.title, ("sans-serif", CAPTION_SIZE))
        .margin(MARGIN)
        .x_label_area_size(X_LABEL_AREA)
        .y_label_area_size(Y_LABEL_AREA)
        .build_cartesian_2d(axis.range(), y)?;

    chart
        .configure_mesh()
        .x_labels(axis.labels)
        .x_label_formatter(&|v| axis.format(*v))
        .x_desc(figure.x_label.as_str())
        .y_desc(figure.y_label.as_str())
        .draw()?;

    for s in series {
        let color = RGBColor::from(s.color);
        chart
            .draw_series(LineSeries::new(
                s.points.iter().map(|(ts, v)| (axis.offset(*ts), *v)),
                color.stroke_width(2),
            ))?
            .label(s.name.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    }

    if !series.is_empty() {
        draw_legend(&mut chart)?;
    }
    Ok(())
}

fn draw_stacked<DB>(
    root: &DrawingArea<DB, Shift>,
    figure: &Figure,
    series: &[NamedSeries],
    axis: &TimeAxis,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let layers = stack_layers(series);
    let y = value_range(layers.iter().flatten().map(|p| p.1));
    let mut chart = ChartBuilder::on(root)
        .caption(&figure.title, ("sans-serif", CAPTION_SIZE))
        .margin(MARGIN)
        .x_label_area_size(X_LABEL_AREA)
        .y_label_area_size(Y_LABEL_AREA)
        .build_cartesian_2d(axis.range(), y)?;

    chart
        .configure_mesh()
        .x_labels(axis.labels)
        .x_label_formatter(&|v| axis.format(*v))
        .x_desc(figure.x_label.as_str())
        .y_desc(figure.y_label.as_str())
        .draw()?;

    // Each band is the polygon between this layer's running total and the
    // one below it, so bands never overdraw each other.
    let mut lower: Vec<(f64, f64)> = layers
        .first()
        .map(|layer| layer.iter().map(|(ts, _)| (axis.offset(*ts), 0.0)).collect())
        .unwrap_or_default();
    for (s, layer) in series.iter().zip(&layers) {
        let color = RGBColor::from(s.color);
        let upper: Vec<(f64, f64)> = layer.iter().map(|(ts, v)| (axis.offset(*ts), *v)).collect();

        let mut outline = upper.clone();
        outline.extend(lower.iter().rev().copied());
        let band = (outline.len() >= 3).then(|| Polygon::new(outline, color.mix(0.8).filled()));

        chart
            .draw_series(band)?
            .label(s.name.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 15, y + 5)], color.filled()));
        chart.draw_series(LineSeries::new(upper.iter().copied(), color))?;

        lower = upper;
    }

    if !series.is_empty() {
        draw_legend(&mut chart)?;
    }
    Ok(())
}

fn draw_timeline<DB>(
    root: &DrawingArea<DB, Shift>,
    figure: &Figure,
    tracks: &[TimelineTrack],
    axis: &TimeAxis,
    legend: &[LegendEntry],
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let rows = tracks.len() as i32;
    let y_top = TRACK_PITCH * (rows + 1);
    let mut chart = ChartBuilder::on(root)
        .caption(&figure.title, ("sans-serif", CAPTION_SIZE))
        .margin(MARGIN)
        .x_label_area_size(X_LABEL_AREA)
        .y_label_area_size(Y_LABEL_AREA)
        .build_cartesian_2d(axis.range(), 0..y_top)?;

    // Track i is centered on (i + 1) * TRACK_PITCH.
    let track_label = |v: i32| -> String {
        if v <= 0 || v % TRACK_PITCH != 0 {
            return String::new();
        }
        tracks
            .get((v / TRACK_PITCH - 1) as usize)
            .map(|t| t.label.clone())
            .unwrap_or_default()
    };

    chart
        .configure_mesh()
        .disable_y_mesh()
        .x_labels(axis.labels)
        .x_label_formatter(&|v| axis.format(*v))
        .y_labels(tracks.len() + 2)
        .y_label_formatter(&|v| track_label(*v))
        .x_desc(figure.x_label.as_str())
        .y_desc(figure.y_label.as_str())
        .draw()?;

    for (idx, track) in tracks.iter().enumerate() {
        let center = TRACK_PITCH * (idx as i32 + 1);
        let (y0, y1) = (center - TRACK_HALF_HEIGHT, center + TRACK_HALF_HEIGHT);
        let corners = |start: NaiveDateTime, secs: f64| {
            let x0 = axis.offset(start);
            [(x0, y0), (x0 + secs, y1)]
        };

        chart.draw_series(track.bars.iter().map(|bar| {
            Rectangle::new(
                corners(bar.start, bar.seconds),
                RGBColor::from(bar.color).filled(),
            )
        }))?;
        chart.draw_series(
            track
                .bars
                .iter()
                .map(|bar| Rectangle::new(corners(bar.start, bar.seconds), BLACK.stroke_width(1))),
        )?;
    }

    for entry in legend {
        let color = RGBColor::from(entry.color);
        chart
            .draw_series(std::iter::empty::<Rectangle<(f64, i32)>>())?
            .label(entry.label.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 15, y + 5)], color.filled()));
    }

    if !legend.is_empty() {
        draw_legend(&mut chart)?;
    }
    Ok(())
}

fn draw_bars<DB>(
    root: &DrawingArea<DB, Shift>,
    figure: &Figure,
    categories: &[String],
    series: &[BarSeries],
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    // Series i of category c spans [10c + 4(i - 1), 10c + 4i]; the category
    // label sits on 10c, at the right edge of the first bar.
    let n = categories.len().max(1) as i32;
    let k = series.len() as i32;
    let x_end = (CATEGORY_PITCH * n).max(CATEGORY_PITCH * (n - 1) + BAR_WIDTH * k + 1);
    let x_range = -(BAR_WIDTH + 2)..x_end;
    let y = value_range(series.iter().flat_map(|s| s.values.iter().copied()));

    let mut chart = ChartBuilder::on(root)
        .caption(&figure.title, ("sans-serif", CAPTION_SIZE))
        .margin(MARGIN)
        .x_label_area_size(X_LABEL_AREA)
        .y_label_area_size(Y_LABEL_AREA)
        .build_cartesian_2d(x_range, y)?;

    let category_label = |v: i32| -> String {
        if v < 0 || v % CATEGORY_PITCH != 0 {
            return String::new();
        }
        categories
            .get((v / CATEGORY_PITCH) as usize)
            .cloned()
            .unwrap_or_default()
    };

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(categories.len() + 1)
        .x_label_formatter(&|v| category_label(*v))
        .x_desc(figure.x_label.as_str())
        .y_desc(figure.y_label.as_str())
        .draw()?;

    for (i, s) in series.iter().enumerate() {
        let color = RGBColor::from(s.color);
        let offset = BAR_WIDTH * (i as i32 - 1);
        chart
            .draw_series(s.values.iter().enumerate().map(|(c, v)| {
                let x0 = CATEGORY_PITCH * c as i32 + offset;
                Rectangle::new([(x0, 0.0), (x0 + BAR_WIDTH, *v)], color.filled())
            }))?
            .label(s.name.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 15, y + 5)], color.filled()));
    }

    if !series.is_empty() {
        draw_legend(&mut chart)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_svg_path_appends_extension() {
        assert_eq!(
            svg_path(Path::new("out/CPU_Usage_(Sum)")),
            PathBuf::from("out/CPU_Usage_(Sum).svg")
        );
        assert_eq!(
            svg_path(Path::new("out/v1.2")),
            PathBuf::from("out/v1.2.svg")
        );
    }

    #[test]
    fn test_time_axis_labels_follow_interval() {
        let axis = TimeAxis::new(Some((ts(8, 0, 0), ts(12, 0, 0))), TimeDelta::minutes(60));
        assert_eq!(axis.labels, 5);
        assert_eq!(axis.span, 4.0 * 3600.0);
        assert_eq!(axis.format(0.0), "08:00:00");
        assert_eq!(axis.format(axis.offset(ts(9, 30, 15))), "09:30:15");
    }

    #[test]
    fn test_time_axis_short_window_keeps_two_labels() {
        let axis = TimeAxis::new(Some((ts(8, 0, 0), ts(8, 0, 30))), TimeDelta::minutes(60));
        assert_eq!(axis.labels, 2);

        let empty = TimeAxis::new(None, TimeDelta::minutes(60));
        assert_eq!(empty.range(), 0.0..1.0);
        assert_eq!(empty.format(0.5), "");
    }

    #[test]
    fn test_tick_interval_is_clamped() {
        let huge = SvgOutput::new(10, 10).with_tick_interval(i64::MAX);
        assert_eq!(huge.tick_interval, TimeDelta::minutes(MAX_TICK_MINUTES));

        let negative = SvgOutput::new(10, 10).with_tick_interval(-5);
        assert_eq!(negative.tick_interval, TimeDelta::minutes(1));
    }

    #[test]
    fn test_value_range_includes_zero() {
        let r = value_range([5.0, 10.0].into_iter());
        assert_eq!(r.start, 0.0);
        assert!(r.end > 10.0);

        let flat = value_range(std::iter::empty());
        assert_eq!(flat.start, 0.0);
        assert!(flat.end > 0.0);

        let nan = value_range([f64::NAN, -2.0].into_iter());
        assert_eq!(nan.start, -2.0);
    }
}
