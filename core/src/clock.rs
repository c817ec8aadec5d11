//! Event clock: the generator-wide timestamp cursor.
//!
//! The cursor only moves forward. It is owned by one DatasetGenerator
//! and advanced in the same fixed order as the RNG draws.

use crate::types::Timestamp;
use chrono::{Duration, SecondsFormat, TimeZone, Utc};

#[derive(Debug, Clone, PartialEq)]
pub struct EventClock {
    cursor: Timestamp,
}

impl EventClock {
    pub fn new(start: Timestamp) -> Self {
        Self { cursor: start }
    }

    /// The fixed generation epoch, 2023-01-01T09:00:00Z.
    pub fn epoch() -> Timestamp {
        Utc.with_ymd_and_hms(2023, 1, 1, 9, 0, 0)
            .single()
            .unwrap_or_default()
    }

    pub fn now(&self) -> Timestamp {
        self.cursor
    }

    /// Move the cursor forward and return the new value.
    /// Negative steps are ignored so the cursor never goes backwards.
    pub fn advance(&mut self, step: Duration) -> Timestamp {
        if step > Duration::zero() {
            self.cursor += step;
        }
        self.cursor
    }

    pub fn advance_minutes(&mut self, minutes: i64) -> Timestamp {
        self.advance(Duration::minutes(minutes))
    }

    pub fn advance_seconds(&mut self, seconds: i64) -> Timestamp {
        self.advance(Duration::seconds(seconds))
    }
}

impl Default for EventClock {
    fn default() -> Self {
        Self::new(Self::epoch())
    }
}

/// Serialize an instant the way every record field carries it,
/// e.g. `2023-01-01T09:00:00+00:00`.
pub fn format_timestamp(ts: &Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, false)
}
