//! Column-aligned buffer of every series seen so far.
//!
//! # ALIGNMENT INVARIANT
//! Column 0 holds timestamps; every other column belongs to one key, in first-seen
//! order. After each ingestion all columns have the same length: every event adds
//! exactly one row, with its value in its own column and `None` everywhere else.
//! Columns are never removed during a session.

use std::collections::HashMap;

use tracing::debug;

use super::color::Palette;
use super::event::Point;
use super::surface::{Columns, RenderingSurface};

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesColumn {
    pub key: String,
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Default)]
pub struct SeriesMatrix {
    timestamps: Vec<f64>,
    series: Vec<SeriesColumn>,
    // key -> position in `series`
    index: HashMap<String, usize>,
}

impl SeriesMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one row per point and hands the whole matrix to the surface once.
    ///
    /// New keys get a back-filled column and are registered on the surface
    /// before their first value lands. An empty batch does nothing.
    /// Returns the number of series created by this batch.
    pub fn ingest_batch<S>(&mut self, batch: &[Point], surface: &mut S, palette: &dyn Palette) -> usize
    where
        S: RenderingSurface + ?Sized,
    {
        if batch.is_empty() {
            return 0;
        }

        let before = self.series.len();
        for point in batch {
            let slot = self.resolve(&point.label, surface, palette);

            self.timestamps.push(point.timestamp);
            for (i, column) in self.series.iter_mut().enumerate() {
                column.values.push((i == slot).then_some(point.value));
            }
        }

        debug_assert!(self.is_aligned(), "series columns out of alignment");
        debug!(
            rows = self.timestamps.len(),
            series = self.series.len(),
            batch = batch.len(),
            "batch ingested"
        );

        surface.set_data(&self.columns());
        self.series.len() - before
    }

    fn resolve<S>(&mut self, key: &str, surface: &mut S, palette: &dyn Palette) -> usize
    where
        S: RenderingSurface + ?Sized,
    {
        if let Some(&slot) = self.index.get(key) {
            return slot;
        }

        let slot = self.series.len();
        self.series.push(SeriesColumn {
            key: key.to_string(),
            values: vec![None; self.timestamps.len()],
        });
        self.index.insert(key.to_string(), slot);

        // Surface indices count the x column
        surface.add_series(slot + 1, key, &palette.at(slot));
        slot
    }

    /// The render payload. Pure function of the current state.
    pub fn columns(&self) -> Columns {
        let mut cols = Vec::with_capacity(self.series.len() + 1);
        cols.push(self.timestamps.iter().copied().map(Some).collect());
        cols.extend(self.series.iter().map(|c| c.values.clone()));
        cols
    }

    pub fn timestamps(&self) -> &[f64] {
        &self.timestamps
    }

    pub fn column(&self, key: &str) -> Option<&[Option<f64>]> {
        self.index
            .get(key)
            .map(|&slot| self.series[slot].values.as_slice())
    }

    /// Keys in column order.
    pub fn keys(&self) -> Vec<&str> {
        self.series.iter().map(|c| c.key.as_str()).collect()
    }

    pub fn rows(&self) -> usize {
        self.timestamps.len()
    }

    pub fn series_count(&self) -> usize {
        self.series.len()
    }

    pub fn is_aligned(&self) -> bool {
        let rows = self.timestamps.len();
        self.series.iter().all(|c| c.values.len() == rows)
    }
}
