//! Chart operations over sample tables.
//!
//! Every operation groups same-timestamp rows, optionally applies diff mode,
//! builds a [`Figure`] and saves it through the configured
//! [`FigureOutput`] as `<output_dir>/<title with spaces as underscores>`.
//! Tables are only ever read.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::analyze::{build_tracks, sampling_resolution, sum_by_timestamp, StateSample, TimeSeries};
use crate::output::{
    hue_colors, BarSeries, BarhType, Figure, FigureBody, FigureOutput, NamedSeries, TimelineBar,
    TimelineTrack, SERIES_PALETTE, SUMMARY_COLOR,
};
use crate::trace::SampleTable;

/// X axis label used unless a chart overrides it.
pub const DEFAULT_X_LABEL: &str = "Date/Time";

/// Title, labels and derivation options of one chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartRequest {
    pub title: String,
    pub y_label: String,
    pub x_label: String,
    /// Chart the clipped first difference instead of raw values.
    pub diff: bool,
    /// Factor applied to every value before charting.
    pub scale: f64,
}

impl ChartRequest {
    pub fn new(title: impl Into<String>, y_label: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            y_label: y_label.into(),
            x_label: DEFAULT_X_LABEL.to_string(),
            diff: false,
            scale: 1.0,
        }
    }

    pub fn x_label(mut self, x_label: impl Into<String>) -> Self {
        self.x_label = x_label.into();
        self
    }

    pub fn diff(mut self) -> Self {
        self.diff = true;
        self
    }

    pub fn scale(mut self, factor: f64) -> Self {
        self.scale = factor;
        self
    }
}

/// File name for a chart title.
pub fn artifact_name(title: &str) -> String {
    title.replace(' ', "_")
}

/// Renders charts into one output directory.
pub struct ChartRenderer<'a> {
    output: &'a mut dyn FigureOutput,
    output_dir: PathBuf,
    barh_type: BarhType,
}

impl<'a> ChartRenderer<'a> {
    pub fn new(output: &'a mut dyn FigureOutput, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output,
            output_dir: output_dir.into(),
            barh_type: BarhType::default(),
        }
    }

    pub fn with_barh_type(mut self, barh_type: BarhType) -> Self {
        self.barh_type = barh_type;
        self
    }

    /// One field summed per timestamp, drawn as a single red line.
    pub fn line_summary<T: SampleTable>(
        &mut self,
        table: &T,
        field: T::Field,
        request: &ChartRequest,
    ) -> Result<PathBuf> {
        info!("Plotting {}", request.title);
        let series = field_series(table, field, request)?;
        let body = FigureBody::Line {
            series: vec![NamedSeries {
                name: series.name,
                color: SUMMARY_COLOR,
                points: series.points,
            }],
        };
        self.save(request, body)
    }

    /// Several fields on shared axes, one legend entry per field.
    pub fn line_detail<T: SampleTable>(
        &mut self,
        table: &T,
        fields: &[T::Field],
        request: &ChartRequest,
    ) -> Result<PathBuf> {
        info!("Plotting {}", request.title);
        let series = palette_series(table, fields, request)?;
        self.save(request, FigureBody::Line { series })
    }

    /// Several fields stacked bottom to top in the order given.
    pub fn stack_summary<T: SampleTable>(
        &mut self,
        table: &T,
        fields: &[T::Field],
        request: &ChartRequest,
    ) -> Result<PathBuf> {
        info!("Plotting {}", request.title);
        let series = palette_series(table, fields, request)?;
        self.save(request, FigureBody::StackedArea { series })
    }

    /// State occupancy per value of `group_field`, one track per value.
    ///
    /// Tracks are labeled `"<y_label> <value>"`; segment colors and legend
    /// labels come from the renderer's [`BarhType`].
    pub fn broken_barh<T: SampleTable>(
        &mut self,
        table: &T,
        group_field: T::Field,
        state_field: T::Field,
        request: &ChartRequest,
    ) -> Result<PathBuf> {
        info!("Plotting {}", request.title);
        let resolution = sampling_resolution(table.timestamps());
        debug!("Sampling resolution for {}: {:?}", request.title, resolution);

        let samples: Vec<StateSample> = table
            .keys(group_field)
            .into_iter()
            .zip(table.keys(state_field))
            .map(|((ts, group), (_, state))| StateSample {
                ts,
                group,
                state: state.to_string(),
            })
            .collect();

        let tracks = build_tracks(&samples, resolution)
            .into_iter()
            .map(|track| TimelineTrack {
                label: format!("{} {}", request.y_label, track.group),
                bars: track
                    .segments
                    .into_iter()
                    .map(|segment| {
                        let style = self.barh_type.style(&segment.state);
                        TimelineBar {
                            start: segment.start,
                            seconds: segment.seconds,
                            color: style.color,
                            label: style.label.to_string(),
                        }
                    })
                    .collect(),
            })
            .collect();

        self.save(request, FigureBody::Timeline { tracks })
    }

    /// Grouped bars: series `i` is shifted by `i * 0.4` category widths and
    /// colored from evenly spaced hues.
    pub fn bar_detail(
        &mut self,
        categories: Vec<String>,
        series: Vec<(String, Vec<f64>)>,
        request: &ChartRequest,
    ) -> Result<PathBuf> {
        info!("Plotting {}", request.title);
        let colors = hue_colors(series.len());
        let series = series
            .into_iter()
            .zip(colors)
            .map(|((name, values), color)| BarSeries {
                name,
                color,
                values,
            })
            .collect();
        self.save(request, FigureBody::Bars { categories, series })
    }

    fn save(&mut self, request: &ChartRequest, body: FigureBody) -> Result<PathBuf> {
        let figure = Figure {
            title: request.title.clone(),
            x_label: request.x_label.clone(),
            y_label: request.y_label.clone(),
            body,
        };
        let destination = self.output_dir.join(artifact_name(&request.title));
        self.output
            .save(&figure, &destination)
            .with_context(|| format!("failed to save chart '{}'", request.title))
    }
}

/// Per-timestamp sum of `field`, scaled and optionally differenced.
fn field_series<T: SampleTable>(
    table: &T,
    field: T::Field,
    request: &ChartRequest,
) -> Result<TimeSeries> {
    let points = sum_by_timestamp(table.points(field)?);
    let series = TimeSeries::new(field.to_string(), points).scaled(request.scale);
    Ok(if request.diff {
        series.diffed()
    } else {
        series
    })
}

fn palette_series<T: SampleTable>(
    table: &T,
    fields: &[T::Field],
    request: &ChartRequest,
) -> Result<Vec<NamedSeries>> {
    fields
        .iter()
        .enumerate()
        .map(|(idx, field)| {
            let series = field_series(table, *field, request)?;
            Ok(NamedSeries {
                name: series.name,
                color: SERIES_PALETTE[idx % SERIES_PALETTE.len()],
                points: series.points,
            })
        })
        .collect()
}
