use std::str::FromStr;

use serde::Serialize;

use super::error::ChartError;
use super::event::Point;
use super::instrument::Instrument;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Counter,
    LastValue,
    Sum,
    Summary,
}

impl FromStr for MetricKind {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "counter" => Ok(MetricKind::Counter),
            "last_value" => Ok(MetricKind::LastValue),
            "sum" => Ok(MetricKind::Sum),
            "summary" => Ok(MetricKind::Summary),
            other => Err(ChartError::UnknownMetric(other.to_string())),
        }
    }
}

impl MetricKind {
    /// Selected once per chart; strategies carry no state.
    pub fn strategy(self) -> Box<dyn MetricStrategy> {
        match self {
            MetricKind::Counter => Box::new(Counter),
            MetricKind::LastValue => Box::new(LastValue),
            MetricKind::Sum => Box::new(Sum),
            MetricKind::Summary => Box::new(Summary),
        }
    }
}

/// Translates a batch of parsed events into Instrument operations, in order.
pub trait MetricStrategy: Send + Sync {
    fn kind(&self) -> MetricKind;
    fn push_data(&self, instrument: &mut Instrument, batch: &[Point]);
}

/// Newest value replaces the previous one.
#[derive(Debug, Clone, Copy)]
pub struct LastValue;

impl MetricStrategy for LastValue {
    fn kind(&self) -> MetricKind {
        MetricKind::LastValue
    }

    fn push_data(&self, instrument: &mut Instrument, batch: &[Point]) {
        for point in batch {
            instrument.push_data(point);
        }
    }
}

/// One per event. The inbound value is ignored.
#[derive(Debug, Clone, Copy)]
pub struct Counter;

impl MetricStrategy for Counter {
    fn kind(&self) -> MetricKind {
        MetricKind::Counter
    }

    fn push_data(&self, instrument: &mut Instrument, batch: &[Point]) {
        for point in batch {
            instrument.increment(&Point {
                label: point.label.clone(),
                value: 1.0,
                timestamp: point.timestamp,
            });
        }
    }
}

/// Running total of inbound values.
#[derive(Debug, Clone, Copy)]
pub struct Sum;

impl MetricStrategy for Sum {
    fn kind(&self) -> MetricKind {
        MetricKind::Sum
    }

    fn push_data(&self, instrument: &mut Instrument, batch: &[Point]) {
        for point in batch {
            instrument.increment(point);
        }
    }
}

/// Pass-through, same as [`LastValue`].
// TODO: compute configured percentiles once options carry them.
#[derive(Debug, Clone, Copy)]
pub struct Summary;

impl MetricStrategy for Summary {
    fn kind(&self) -> MetricKind {
        MetricKind::Summary
    }

    fn push_data(&self, instrument: &mut Instrument, batch: &[Point]) {
        LastValue.push_data(instrument, batch);
    }
}
