use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::error::ChartError;

/// Raw measurement as it arrives on the wire: a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Measurement {
    Number(f64),
    Text(String),
}

impl Measurement {
    pub fn value(&self) -> Option<f64> {
        let v = match self {
            Measurement::Number(n) => *n,
            Measurement::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        v.is_finite().then_some(v)
    }

    fn raw(&self) -> String {
        match self {
            Measurement::Number(n) => n.to_string(),
            Measurement::Text(s) => s.clone(),
        }
    }
}

impl From<f64> for Measurement {
    fn from(v: f64) -> Self {
        Measurement::Number(v)
    }
}

impl From<&str> for Measurement {
    fn from(s: &str) -> Self {
        Measurement::Text(s.to_string())
    }
}

/// One inbound telemetry event.
/// `x` names the series, `y` carries the measurement, `z` is an ISO-8601 timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub x: String,
    pub y: Measurement,
    pub z: String,
}

impl Event {
    pub fn new(x: &str, y: impl Into<Measurement>, z: &str) -> Self {
        Self {
            x: x.to_string(),
            y: y.into(),
            z: z.to_string(),
        }
    }

    /// Parses the value and timestamp. The value is checked first.
    pub fn parse(&self) -> Result<Point, ChartError> {
        let value = self.y.value().ok_or_else(|| ChartError::MalformedValue {
            label: self.x.clone(),
            raw: self.y.raw(),
        })?;
        let timestamp = parse_timestamp(&self.z).ok_or_else(|| ChartError::MalformedTimestamp {
            label: self.x.clone(),
            raw: self.z.clone(),
        })?;

        Ok(Point {
            label: self.x.clone(),
            value,
            timestamp,
        })
    }
}

/// A fully parsed event. `timestamp` is in epoch seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub label: String,
    pub value: f64,
    pub timestamp: f64,
}

impl Point {
    pub fn new(label: &str, value: f64, timestamp: f64) -> Self {
        Self {
            label: label.to_string(),
            value,
            timestamp,
        }
    }
}

/// ISO-8601 string -> epoch seconds (millisecond precision).
///
/// Accepts RFC 3339 with an offset, a naive date-time (read as UTC) or a bare date.
pub fn parse_timestamp(raw: &str) -> Option<f64> {
    let raw = raw.trim();

    let millis = if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        dt.timestamp_millis()
    } else if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
    {
        naive.and_utc().timestamp_millis()
    } else if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        date.and_hms_opt(0, 0, 0)?.and_utc().timestamp_millis()
    } else {
        return None;
    };

    Some(millis as f64 / 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rfc3339_with_offset() {
        assert_eq!(parse_timestamp("2024-01-01T00:00:00Z"), Some(1_704_067_200.0));
        assert_eq!(parse_timestamp("2024-01-01T01:00:00+01:00"), Some(1_704_067_200.0));
        assert_eq!(parse_timestamp("2024-01-01T00:00:00.250Z"), Some(1_704_067_200.25));
    }

    #[test]
    fn naive_and_date_only_are_utc() {
        assert_eq!(parse_timestamp("2024-01-01T00:00:01"), Some(1_704_067_201.0));
        assert_eq!(parse_timestamp("2024-01-01"), Some(1_704_067_200.0));
    }

    #[test]
    fn rejects_garbage_timestamps() {
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn measurement_accepts_numbers_and_numeric_strings() {
        assert_eq!(Measurement::Number(2.0).value(), Some(2.0));
        assert_eq!(Measurement::from(" 1.5 ").value(), Some(1.5));
        assert_eq!(Measurement::from("abc").value(), None);
        assert_eq!(Measurement::from("NaN").value(), None);
    }

    #[test]
    fn event_deserializes_string_or_number_y() {
        let a: Event = serde_json::from_str(r#"{"x":"cpu","y":"1.5","z":"2024-01-01T00:00:00Z"}"#).unwrap();
        let b: Event = serde_json::from_str(r#"{"x":"cpu","y":1.5,"z":"2024-01-01T00:00:00Z"}"#).unwrap();
        assert_eq!(a.parse().unwrap(), b.parse().unwrap());
    }

    #[test]
    fn bad_timestamp_error_carries_label_and_raw_text() {
        match Event::new("disk", 3.0, "soon").parse() {
            Err(ChartError::MalformedTimestamp { label, raw }) => {
                assert_eq!(label, "disk");
                assert_eq!(raw, "soon");
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn bad_value_is_reported_before_bad_timestamp() {
        let err = Event::new("k", "x", "nope").parse().unwrap_err();
        assert!(matches!(err, ChartError::MalformedValue { .. }));
    }
}
