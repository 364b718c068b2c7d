use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use super::color::{Palette, Style};
use super::error::ChartError;
use super::event::Point;
use super::surface::SurfaceConfig;
use crate::config::ChartOptions;

/// Storage shape behind an Instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InstrumentKind {
    /// One running scalar per label (doughnut-style snapshot).
    Aggregate,
    /// One growing `(t, y)` sequence per label.
    Temporal,
}

impl FromStr for InstrumentKind {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "aggregate" | "doughnut" => Ok(InstrumentKind::Aggregate),
            "temporal" | "timeseries" => Ok(InstrumentKind::Temporal),
            other => Err(ChartError::UnknownInstrument(other.to_string())),
        }
    }
}

/// The shape-specific half of the Instrument contract.
///
/// `index` arguments always come from a prior `index_of` or `push_dataset`.
pub trait Storage: Send {
    /// Adds `point.value` to what the slot already holds.
    fn increment(&mut self, index: usize, point: &Point);
    fn index_of(&self, label: &str) -> Option<usize>;
    /// Allocates a slot seeded with `point`, colored by the slot's ordinal.
    fn push_dataset(&mut self, label: &str, point: &Point, palette: &dyn Palette) -> usize;
    /// Overwrite semantics: replace (aggregate) or append (temporal).
    fn push_data(&mut self, index: usize, point: &Point);
    /// Current scalar, or the newest point's value.
    fn value(&self, index: usize) -> Option<f64>;
    fn labels(&self) -> Vec<String>;
    fn snapshot(&self) -> StorageSnapshot;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum StorageSnapshot {
    Aggregate(AggregateStorage),
    Temporal(TemporalStorage),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregateStorage {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub colors: Vec<Style>,
}

impl Storage for AggregateStorage {
    fn increment(&mut self, index: usize, point: &Point) {
        if let Some(v) = self.values.get_mut(index) {
            *v += point.value;
        }
    }

    fn index_of(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    fn push_dataset(&mut self, label: &str, point: &Point, palette: &dyn Palette) -> usize {
        self.colors.push(palette.at(self.labels.len()));
        self.labels.push(label.to_string());
        self.values.push(point.value);
        self.labels.len() - 1
    }

    fn push_data(&mut self, index: usize, point: &Point) {
        if let Some(v) = self.values.get_mut(index) {
            *v = point.value;
        }
    }

    fn value(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    fn labels(&self) -> Vec<String> {
        self.labels.clone()
    }

    fn snapshot(&self) -> StorageSnapshot {
        StorageSnapshot::Aggregate(self.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimedValue {
    pub t: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    pub label: String,
    pub data: Vec<TimedValue>,
    pub style: Style,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TemporalStorage {
    pub datasets: Vec<Dataset>,
}

impl Storage for TemporalStorage {
    /// Carries the newest value forward plus the increment, stamped with the new time.
    fn increment(&mut self, index: usize, point: &Point) {
        let previous = self.value(index).unwrap_or(0.0);
        self.push_data(
            index,
            &Point {
                label: point.label.clone(),
                value: previous + point.value,
                timestamp: point.timestamp,
            },
        );
    }

    fn index_of(&self, label: &str) -> Option<usize> {
        self.datasets.iter().position(|d| d.label == label)
    }

    fn push_dataset(&mut self, label: &str, point: &Point, palette: &dyn Palette) -> usize {
        let style = palette.at(self.datasets.len());
        self.datasets.push(Dataset {
            label: label.to_string(),
            data: vec![TimedValue { t: point.timestamp, y: point.value }],
            style,
        });
        self.datasets.len() - 1
    }

    fn push_data(&mut self, index: usize, point: &Point) {
        if let Some(d) = self.datasets.get_mut(index) {
            d.data.push(TimedValue { t: point.timestamp, y: point.value });
        }
    }

    fn value(&self, index: usize) -> Option<f64> {
        self.datasets.get(index)?.data.last().map(|p| p.y)
    }

    fn labels(&self) -> Vec<String> {
        self.datasets.iter().map(|d| d.label.clone()).collect()
    }

    fn snapshot(&self) -> StorageSnapshot {
        StorageSnapshot::Temporal(self.clone())
    }
}

/// Label-keyed accumulator over one storage shape.
///
/// Every operation allocates the label's slot (and color) on first sight before
/// touching its value. Not safe for concurrent mutation.
pub struct Instrument {
    kind: InstrumentKind,
    config: SurfaceConfig,
    storage: Box<dyn Storage>,
    palette: Arc<dyn Palette>,
}

impl Instrument {
    pub fn create(kind: InstrumentKind, options: &ChartOptions, palette: Arc<dyn Palette>) -> Self {
        let (config, storage): (SurfaceConfig, Box<dyn Storage>) = match kind {
            InstrumentKind::Aggregate => (
                SurfaceConfig::doughnut(options),
                Box::new(AggregateStorage::default()),
            ),
            InstrumentKind::Temporal => (
                SurfaceConfig::timeseries(options),
                Box::new(TemporalStorage::default()),
            ),
        };

        Self { kind, config, storage, palette }
    }

    pub fn kind(&self) -> InstrumentKind {
        self.kind
    }

    pub fn config(&self) -> &SurfaceConfig {
        &self.config
    }

    pub fn increment(&mut self, point: &Point) {
        match self.index_of(&point.label) {
            Some(index) => self.storage.increment(index, point),
            None => {
                self.push_dataset(point);
            }
        }
    }

    /// Linear scan; label cardinality is small.
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.storage.index_of(label)
    }

    pub fn push_dataset(&mut self, point: &Point) -> usize {
        let index = self
            .storage
            .push_dataset(&point.label, point, self.palette.as_ref());
        debug!(label = %point.label, index, "dataset registered");
        index
    }

    pub fn push_data(&mut self, point: &Point) {
        match self.index_of(&point.label) {
            Some(index) => self.storage.push_data(index, point),
            None => {
                self.push_dataset(point);
            }
        }
    }

    pub fn value(&self, label: &str) -> Option<f64> {
        self.storage.value(self.index_of(label)?)
    }

    pub fn labels(&self) -> Vec<String> {
        self.storage.labels()
    }

    pub fn len(&self) -> usize {
        self.storage.labels().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn snapshot(&self) -> StorageSnapshot {
        self.storage.snapshot()
    }
}

impl std::fmt::Debug for Instrument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Instrument")
            .field("kind", &self.kind)
            .field("labels", &self.labels())
            .finish()
    }
}
