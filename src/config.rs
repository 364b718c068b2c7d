use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::chart::error::ChartError;

pub const DEFAULT_HEIGHT: u32 = 300;
pub const DEFAULT_WIDTH: u32 = 800;

/// What to do with an event whose value or timestamp does not parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedPolicy {
    /// Drop the event, keep the rest of the batch, report the count.
    #[default]
    Skip,
    /// Fail the whole batch without touching any state.
    Reject,
}

/// Construction options for a chart session.
///
/// `metric` and `instrument` stay strings here so an unknown kind surfaces as a
/// construction error rather than a deserialization one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartOptions {
    pub metric: String,
    #[serde(default = "default_instrument")]
    pub instrument: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    /// Right edge of the initial x window, epoch seconds.
    #[serde(default)]
    pub now: Option<f64>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub on_malformed: MalformedPolicy,
}

fn default_instrument() -> String {
    "temporal".to_string()
}

fn default_width() -> u32 {
    DEFAULT_WIDTH
}

fn default_height() -> u32 {
    DEFAULT_HEIGHT
}

impl ChartOptions {
    pub fn new(metric: &str, instrument: &str) -> Self {
        Self {
            metric: metric.to_string(),
            instrument: instrument.to_string(),
            title: None,
            unit: None,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            now: None,
            tags: Vec::new(),
            on_malformed: MalformedPolicy::Skip,
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ChartError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ChartError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// True when the metric is split by tag values.
    pub fn tagged(&self) -> bool {
        self.tags.iter().any(|t| !t.trim().is_empty())
    }

    pub fn now_or_current(&self) -> f64 {
        self.now
            .unwrap_or_else(|| Utc::now().timestamp_millis() as f64 / 1000.0)
    }
}
