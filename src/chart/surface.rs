use serde::Serialize;
use tracing::{debug, info};

use super::color::Style;
use crate::config::ChartOptions;

/// Width of the sliding x window, in seconds.
pub const X_WINDOW_SECS: f64 = 60.0;

/// Column-major payload: column 0 is timestamps, column `i` is the series
/// registered with `add_series(i, ..)`. All columns have the same length.
/// Temporal charts send one row per event; aggregate charts send a single row
/// stamped with the newest event time.
pub type Columns = Vec<Vec<Option<f64>>>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Scale {
    pub min: f64,
    pub max: f64,
}

/// Setup handed to the surface once, before any series or data.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SurfaceConfig {
    /// Categorical snapshot, one slice per label.
    Doughnut {
        title: Option<String>,
        legend_position: String,
    },
    Timeseries {
        title: Option<String>,
        width: u32,
        height: u32,
        x: Scale,
        y: Scale,
        unit: Option<String>,
    },
}

impl SurfaceConfig {
    pub fn doughnut(options: &ChartOptions) -> Self {
        SurfaceConfig::Doughnut {
            title: options.title.clone(),
            legend_position: "bottom".to_string(),
        }
    }

    pub fn timeseries(options: &ChartOptions) -> Self {
        let now = options.now_or_current();
        SurfaceConfig::Timeseries {
            title: options.title.clone(),
            width: options.width,
            height: options.height,
            x: Scale { min: now - X_WINDOW_SECS, max: now },
            y: Scale { min: 0.0, max: 1.0 },
            unit: options.unit.clone(),
        }
    }
}

/// Y axis tick label: two decimals at most, trailing zeros dropped, unit appended.
pub fn format_tick(value: f64, unit: Option<&str>) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    // avoid "-0"
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    match unit {
        Some(unit) if !unit.is_empty() => format!("{} {}", rounded, unit),
        _ => rounded.to_string(),
    }
}

/// The drawing collaborator. The chart calls into it; it never calls back.
pub trait RenderingSurface {
    fn initialize(&mut self, config: &SurfaceConfig);

    /// Registers series `index` (1-based; column 0 is the x axis).
    fn add_series(&mut self, index: usize, label: &str, style: &Style);

    /// Host-only. The chart never deletes series during a session; hosts use
    /// this to drop placeholder series their backend creates on `initialize`.
    fn del_series(&mut self, index: usize);

    /// Full replace of the plotted data.
    fn set_data(&mut self, columns: &[Vec<Option<f64>>]);
}

#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCall {
    Initialize(SurfaceConfig),
    AddSeries { index: usize, label: String, style: Style },
    DelSeries(usize),
    SetData(Columns),
}

/// Keeps every call in order. Useful to hosts that render later and to tests.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub calls: Vec<SurfaceCall>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_data_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, SurfaceCall::SetData(_)))
            .count()
    }

    pub fn last_data(&self) -> Option<&Columns> {
        self.calls.iter().rev().find_map(|c| match c {
            SurfaceCall::SetData(cols) => Some(cols),
            _ => None,
        })
    }

    /// Labels of the currently registered series, by index.
    pub fn series_labels(&self) -> Vec<String> {
        let mut labels: Vec<(usize, String)> = Vec::new();
        for call in &self.calls {
            match call {
                SurfaceCall::AddSeries { index, label, .. } => {
                    let at = labels.partition_point(|(i, _)| i < index);
                    for (i, _) in labels.iter_mut().skip(at) {
                        *i += 1;
                    }
                    labels.insert(at, (*index, label.clone()));
                }
                SurfaceCall::DelSeries(index) => {
                    labels.retain(|(i, _)| i != index);
                    for (i, _) in labels.iter_mut() {
                        if *i > *index {
                            *i -= 1;
                        }
                    }
                }
                _ => {}
            }
        }
        labels.into_iter().map(|(_, l)| l).collect()
    }
}

impl RenderingSurface for RecordingSurface {
    fn initialize(&mut self, config: &SurfaceConfig) {
        self.calls.push(SurfaceCall::Initialize(config.clone()));
    }

    fn add_series(&mut self, index: usize, label: &str, style: &Style) {
        self.calls.push(SurfaceCall::AddSeries {
            index,
            label: label.to_string(),
            style: style.clone(),
        });
    }

    fn del_series(&mut self, index: usize) {
        self.calls.push(SurfaceCall::DelSeries(index));
    }

    fn set_data(&mut self, columns: &[Vec<Option<f64>>]) {
        self.calls.push(SurfaceCall::SetData(columns.to_vec()));
    }
}

/// Headless surface for the binary: every call becomes a log line.
#[derive(Debug, Default)]
pub struct TracingSurface {
    unit: Option<String>,
}

impl TracingSurface {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RenderingSurface for TracingSurface {
    fn initialize(&mut self, config: &SurfaceConfig) {
        if let SurfaceConfig::Timeseries { unit, .. } = config {
            self.unit = unit.clone();
        }
        match serde_json::to_string(config) {
            Ok(json) => info!(config = %json, "surface initialized"),
            Err(e) => info!("surface initialized (config not serializable: {})", e),
        }
    }

    fn add_series(&mut self, index: usize, label: &str, style: &Style) {
        info!(index, label, stroke = %style.stroke, "series added");
    }

    fn del_series(&mut self, index: usize) {
        info!(index, "series deleted");
    }

    fn set_data(&mut self, columns: &[Vec<Option<f64>>]) {
        let rows = columns.first().map_or(0, Vec::len);
        debug!(rows, columns = columns.len(), "data replaced");

        // Latest row, one entry per series
        if rows == 0 {
            return;
        }
        let latest: Vec<String> = columns
            .iter()
            .skip(1)
            .map(|col| match col.get(rows - 1).copied().flatten() {
                Some(v) => format_tick(v, self.unit.as_deref()),
                None => "-".to_string(),
            })
            .collect();
        info!(t = ?columns[0].get(rows - 1).copied().flatten(), values = ?latest, "latest row");
    }
}
