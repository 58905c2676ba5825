//! Measurement and its event payload.

use std::time::Duration;

use serde::Serialize;

use crate::error::{PingStreamError, Result};

/// One probe round-trip, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    millis: f64,
}

impl Measurement {
    pub fn from_elapsed(elapsed: Duration) -> Self {
        Self {
            millis: elapsed.as_secs_f64() * 1000.0,
        }
    }

    pub fn as_millis(&self) -> f64 {
        self.millis
    }
}

/// JSON payload of one stream event.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StreamEvent {
    pub message: String,
}

impl StreamEvent {
    /// `12.5ms` renders as `"12.500000 ms"`.
    pub fn from_measurement(m: Measurement) -> Self {
        Self {
            message: format!("{:.6} ms", m.as_millis()),
        }
    }

    /// Encode as the JSON body of an SSE `data:` line.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| PingStreamError::Internal(format!("encode event failed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn measurement_keeps_sub_millisecond_precision() {
        let m = Measurement::from_elapsed(Duration::from_micros(12_500));
        assert!((m.as_millis() - 12.5).abs() < 1e-9);
    }

    #[test]
    fn event_json_matches_wire_format() {
        let ev = StreamEvent::from_measurement(Measurement::from_elapsed(Duration::from_millis(42)));
        assert_eq!(ev.message, "42.000000 ms");
        assert_eq!(ev.to_json().unwrap(), r#"{"message":"42.000000 ms"}"#);
    }
}
