//! Inclusive time window for message retrieval

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{ExportError, Result};

/// Creation-time window in epoch milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    start_ms: i64,
    end_ms: i64,
}

impl TimeWindow {
    /// Build a window; `start_ms` must not exceed `end_ms`.
    pub fn new(start_ms: i64, end_ms: i64) -> Result<Self> {
        if start_ms > end_ms {
            return Err(ExportError::InvalidInput(format!(
                "time window start {start_ms} is after end {end_ms}"
            )));
        }
        Ok(Self { start_ms, end_ms })
    }

    /// Build a window from two UTC instants, truncated to milliseconds.
    pub fn from_datetimes(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        Self::new(start.timestamp_millis(), end.timestamp_millis())
    }

    pub fn start_ms(&self) -> i64 {
        self.start_ms
    }

    pub fn end_ms(&self) -> i64 {
        self.end_ms
    }

    /// `start_time` query value (integer milliseconds).
    pub fn start_param(&self) -> String {
        self.start_ms.to_string()
    }

    /// `end_time` query value (integer milliseconds).
    pub fn end_param(&self) -> String {
        self.end_ms.to_string()
    }

    /// Whether `ms` falls inside the window, bounds included.
    pub fn contains(&self, ms: i64) -> bool {
        (self.start_ms..=self.end_ms).contains(&ms)
    }
}
