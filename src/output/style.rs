//! Colors and state labels.

use std::fmt;
use std::str::FromStr;

use anyhow::bail;

use super::types::Rgb;

/// Color of the single series in a summary chart.
pub const SUMMARY_COLOR: Rgb = Rgb(255, 0, 0);

/// Colors for multi-series line and stacked charts, cycled by series index.
pub const SERIES_PALETTE: [Rgb; 10] = [
    Rgb(31, 119, 180),
    Rgb(255, 127, 14),
    Rgb(44, 160, 44),
    Rgb(214, 39, 40),
    Rgb(148, 103, 189),
    Rgb(140, 86, 75),
    Rgb(227, 119, 194),
    Rgb(127, 127, 127),
    Rgb(188, 189, 34),
    Rgb(23, 190, 207),
];

const LIGHTBLUE: Rgb = Rgb(173, 216, 230);
const BLACK: Rgb = Rgb(0, 0, 0);
const DARKGREEN: Rgb = Rgb(0, 100, 0);
const CRIMSON: Rgb = Rgb(220, 20, 60);
const WHITE: Rgb = Rgb(255, 255, 255);

/// Color and legend label for one process state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateStyle {
    pub color: Rgb,
    pub label: &'static str,
}

const OTHER: StateStyle = StateStyle {
    color: WHITE,
    label: "Other",
};

const CPU_STATES: [(&str, StateStyle); 4] = [
    (
        "S",
        StateStyle {
            color: LIGHTBLUE,
            label: "Sleep",
        },
    ),
    (
        "Z",
        StateStyle {
            color: BLACK,
            label: "Zombie",
        },
    ),
    (
        "D",
        StateStyle {
            color: DARKGREEN,
            label: "Disk",
        },
    ),
    (
        "R",
        StateStyle {
            color: CRIMSON,
            label: "Running",
        },
    ),
];

/// How broken-bar segments are labeled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BarhType {
    /// Color by Linux process state.
    #[default]
    Cpu,
    /// Every segment is "Other".
    Plain,
}

impl BarhType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cpu => "cpu",
            Self::Plain => "plain",
        }
    }

    /// Style for `state`; unknown states fall back to "Other".
    pub fn style(&self, state: &str) -> StateStyle {
        match self {
            Self::Cpu => CPU_STATES
                .iter()
                .find(|(s, _)| *s == state)
                .map_or(OTHER, |(_, style)| *style),
            Self::Plain => OTHER,
        }
    }
}

impl fmt::Display for BarhType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BarhType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "cpu" => Ok(Self::Cpu),
            "plain" => Ok(Self::Plain),
            other => bail!("Unknown barh type: {other} (expected cpu or plain)"),
        }
    }
}

/// `n` fully saturated colors at evenly spaced hues.
///
/// Hues are taken from an `n + 1` step wheel skipping the first step, so two
/// series come out cyan and red.
pub fn hue_colors(n: usize) -> Vec<Rgb> {
    (1..=n).map(|i| hsv(i as f64 / n as f64)).collect()
}

/// Hue in `[0, 1]` at full saturation and value.
fn hsv(hue: f64) -> Rgb {
    let h = (hue.rem_euclid(1.0)) * 6.0;
    let x = 1.0 - (h % 2.0 - 1.0).abs();
    let (r, g, b) = match h as u32 {
        0 => (1.0, x, 0.0),
        1 => (x, 1.0, 0.0),
        2 => (0.0, 1.0, x),
        3 => (0.0, x, 1.0),
        4 => (x, 0.0, 1.0),
        _ => (1.0, 0.0, x),
    };
    let scale = |c: f64| (c * 255.0).round() as u8;
    Rgb(scale(r), scale(g), scale(b))
}
