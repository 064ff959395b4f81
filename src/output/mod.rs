//! Figure output abstraction layer
//!
//! The chart layer describes every chart as a [`Figure`] and hands it to a
//! [`FigureOutput`]. Implementations decide how the figure becomes an
//! artifact: [`SvgOutput`] draws it with plotters, [`InMemoryOutput`] keeps
//! it around for inspection.

mod render;
mod style;
mod types;

pub use render::SvgOutput;
pub use style::{hue_colors, BarhType, StateStyle, SERIES_PALETTE, SUMMARY_COLOR};
pub use types::*;

use std::path::{Path, PathBuf};

use anyhow::Result;

/// Trait for abstracting figure output formats.
pub trait FigureOutput {
    /// Write `figure` to `destination` and return the path actually written.
    ///
    /// `destination` carries no extension; writers append their own.
    fn save(&mut self, figure: &Figure, destination: &Path) -> Result<PathBuf>;
}

/// Output that keeps every figure in memory instead of drawing it.
#[derive(Debug, Default)]
pub struct InMemoryOutput {
    saved: Vec<(PathBuf, Figure)>,
}

impl InMemoryOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Saved figures in save order.
    pub fn figures(&self) -> impl Iterator<Item = &Figure> {
        self.saved.iter().map(|(_, f)| f)
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.saved.iter().map(|(p, _)| p.clone()).collect()
    }

    /// Look up a saved figure by title.
    pub fn get(&self, title: &str) -> Option<&Figure> {
        self.figures().find(|f| f.title == title)
    }

    pub fn len(&self) -> usize {
        self.saved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.saved.is_empty()
    }

    pub fn into_inner(self) -> Vec<(PathBuf, Figure)> {
        self.saved
    }
}

impl FigureOutput for InMemoryOutput {
    fn save(&mut self, figure: &Figure, destination: &Path) -> Result<PathBuf> {
        let path = destination.to_path_buf();
        self.saved.push((path.clone(), figure.clone()));
        Ok(path)
    }
}
