use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("unknown metric kind: {0:?} (expected counter, last_value, sum or summary)")]
    UnknownMetric(String),

    #[error("unknown instrument kind: {0:?} (expected aggregate or temporal)")]
    UnknownInstrument(String),

    #[error("malformed value {raw:?} for series {label:?}")]
    MalformedValue { label: String, raw: String },

    #[error("malformed timestamp {raw:?} for series {label:?}")]
    MalformedTimestamp { label: String, raw: String },

    #[error("batch rejected: {skipped} of {total} events malformed (first: {first})")]
    BatchRejected {
        skipped: usize,
        total: usize,
        first: Box<ChartError>,
    },

    #[error("invalid chart options: {0}")]
    InvalidOptions(#[from] serde_json::Error),

    #[error("failed to read chart options: {0}")]
    Io(#[from] std::io::Error),
}
