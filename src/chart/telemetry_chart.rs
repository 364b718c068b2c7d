use std::sync::Arc;

use tracing::{debug, info, info_span, warn};
use uuid::Uuid;

use super::color::Palette;
use super::error::ChartError;
use super::event::{Event, Point};
use super::instrument::{Instrument, InstrumentKind, StorageSnapshot};
use super::matrix::SeriesMatrix;
use super::metric::{MetricKind, MetricStrategy};
use super::surface::{Columns, RenderingSurface};
use crate::config::{ChartOptions, MalformedPolicy};

/// Outcome of one `push_data` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub received: usize,
    pub ingested: usize,
    pub skipped: usize,
    pub new_series: usize,
    pub rendered: bool,
}

/// One chart session: instrument, metric strategy, aligned matrix and the surface
/// they feed. Created once, mutated in place until dropped.
pub struct TelemetryChart<S: RenderingSurface> {
    session: Uuid,
    metric: Box<dyn MetricStrategy>,
    instrument: Instrument,
    matrix: SeriesMatrix,
    surface: S,
    palette: Arc<dyn Palette>,
    policy: MalformedPolicy,
    skipped_total: u64,
    // aggregate labels already registered on the surface
    announced: usize,
    // newest timestamp applied, column 0 of the aggregate payload
    last_timestamp: Option<f64>,
}

impl<S: RenderingSurface> TelemetryChart<S> {
    /// Fails on an unknown metric or instrument kind before anything is built.
    pub fn new(options: &ChartOptions, mut surface: S, palette: Arc<dyn Palette>) -> Result<Self, ChartError> {
        let metric_kind: MetricKind = options.metric.parse()?;
        let instrument_kind: InstrumentKind = options.instrument.parse()?;

        let session = Uuid::new_v4();
        if metric_kind == MetricKind::Summary {
            debug!(%session, "summary metric has no percentiles yet, plotting last value");
        }
        let instrument = Instrument::create(instrument_kind, options, palette.clone());
        surface.initialize(instrument.config());

        info!(
            %session,
            metric = ?metric_kind,
            instrument = ?instrument_kind,
            tagged = options.tagged(),
            "chart created"
        );

        Ok(Self {
            session,
            metric: metric_kind.strategy(),
            instrument,
            matrix: SeriesMatrix::new(),
            surface,
            palette,
            policy: options.on_malformed,
            skipped_total: 0,
            announced: 0,
            last_timestamp: None,
        })
    }

    /// Ingests one batch in arrival order.
    ///
    /// All events are parsed before any state changes. Under
    /// [`MalformedPolicy::Reject`] a single bad event fails the batch and nothing
    /// is touched; under [`MalformedPolicy::Skip`] bad events are dropped and counted.
    /// The surface receives exactly one data replace per batch that had a valid event.
    pub fn push_data(&mut self, batch: &[Event]) -> Result<IngestReport, ChartError> {
        let _span = info_span!("push_data", session = %self.session).entered();

        let mut report = IngestReport {
            received: batch.len(),
            ..IngestReport::default()
        };
        if batch.is_empty() {
            return Ok(report);
        }

        let mut points: Vec<Point> = Vec::with_capacity(batch.len());
        let mut first_error: Option<ChartError> = None;
        for event in batch {
            match event.parse() {
                Ok(point) => points.push(point),
                Err(e) => {
                    report.skipped += 1;
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        if let Some(first) = first_error {
            match self.policy {
                MalformedPolicy::Reject => {
                    warn!(skipped = report.skipped, total = batch.len(), "batch rejected: {}", first);
                    return Err(ChartError::BatchRejected {
                        skipped: report.skipped,
                        total: batch.len(),
                        first: Box::new(first),
                    });
                }
                MalformedPolicy::Skip => {
                    warn!(skipped = report.skipped, total = batch.len(), "dropping malformed events: {}", first);
                    self.skipped_total += report.skipped as u64;
                }
            }
        }

        if points.is_empty() {
            return Ok(report);
        }

        self.metric.push_data(&mut self.instrument, &points);
        report.ingested = points.len();
        self.last_timestamp = points.last().map(|p| p.timestamp);

        match self.instrument.kind() {
            InstrumentKind::Temporal => {
                report.new_series =
                    self.matrix
                        .ingest_batch(&points, &mut self.surface, self.palette.as_ref());
            }
            InstrumentKind::Aggregate => {
                report.new_series = self.render_aggregate();
            }
        }
        report.rendered = true;

        debug!(
            ingested = report.ingested,
            skipped = report.skipped,
            new_series = report.new_series,
            "batch applied"
        );
        Ok(report)
    }

    /// Doughnut payload: one row. Column 0 holds the newest timestamp, column
    /// `slot + 1` the current scalar of that label, matching `add_series` indices.
    fn render_aggregate(&mut self) -> usize {
        let StorageSnapshot::Aggregate(storage) = self.instrument.snapshot() else {
            return 0;
        };

        let created = storage.labels.len().saturating_sub(self.announced);
        for (slot, label) in storage.labels.iter().enumerate().skip(self.announced) {
            self.surface.add_series(slot + 1, label, &storage.colors[slot]);
        }
        self.announced = storage.labels.len();

        self.surface.set_data(&aggregate_columns(self.last_timestamp, &storage.values));
        created
    }

    pub fn session(&self) -> Uuid {
        self.session
    }

    pub fn metric_kind(&self) -> MetricKind {
        self.metric.kind()
    }

    pub fn instrument(&self) -> &Instrument {
        &self.instrument
    }

    pub fn matrix(&self) -> &SeriesMatrix {
        &self.matrix
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Events dropped as malformed over the whole session.
    pub fn skipped_total(&self) -> u64 {
        self.skipped_total
    }

    /// Re-sends the current payload without ingesting anything.
    pub fn redraw(&mut self) {
        match self.instrument.kind() {
            InstrumentKind::Temporal => self.surface.set_data(&self.matrix.columns()),
            InstrumentKind::Aggregate => {
                if let StorageSnapshot::Aggregate(storage) = self.instrument.snapshot() {
                    self.surface.set_data(&aggregate_columns(self.last_timestamp, &storage.values));
                }
            }
        }
    }

    pub fn into_surface(self) -> S {
        self.surface
    }
}

fn aggregate_columns(timestamp: Option<f64>, values: &[f64]) -> Columns {
    let mut cols: Columns = Vec::with_capacity(values.len() + 1);
    cols.push(vec![timestamp]);
    cols.extend(values.iter().map(|&v| vec![Some(v)]));
    cols
}
