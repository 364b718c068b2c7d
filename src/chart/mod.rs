//! Live telemetry chart binding.
//!
//! Inbound events flow `MetricStrategy -> Instrument -> SeriesMatrix -> RenderingSurface`.
//!
//! # SESSION INVARIANT
//! Series are created lazily on first sight of their key and are never deleted
//! while the chart lives. Nothing here is persisted.
//!
//! # THREADING
//! Single-threaded and synchronous. A chart is mutated by one caller at a time.

pub mod color;
pub mod error;
pub mod event;
pub mod instrument;
pub mod matrix;
pub mod metric;
pub mod surface;
pub mod telemetry_chart;

pub use color::{ColorWheel, Palette, Style};
pub use error::ChartError;
pub use event::{Event, Measurement, Point};
pub use instrument::{Instrument, InstrumentKind};
pub use matrix::SeriesMatrix;
pub use metric::{MetricKind, MetricStrategy};
pub use surface::{RecordingSurface, RenderingSurface, SurfaceCall, SurfaceConfig, TracingSurface};
pub use telemetry_chart::{IngestReport, TelemetryChart};
