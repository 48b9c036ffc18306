//! Record type carried through the shared queue
//!
//! A record is a single sensor reading. Records are plain `Copy` values:
//! the queue keeps its own copy inside each node and hands out copies to
//! readers, so no reference into the chain ever leaves the queue.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of the sensor that produced a reading
pub type SourceId = u16;

/// One immutable sensor reading
///
/// # Example
///
/// ```rust
/// use sensorbuf::queue::Record;
///
/// let record = Record::new(15, 21.5, 1_700_000_000);
/// assert_eq!(record.source_id, 15);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Sensor identifier
    pub source_id: SourceId,
    /// Measured value
    pub value: f64,
    /// Seconds since the Unix epoch
    pub timestamp: i64,
}

impl Record {
    pub fn new(source_id: SourceId, value: f64, timestamp: i64) -> Self {
        Self {
            source_id,
            value,
            timestamp,
        }
    }

    /// Create a record stamped with the current wall-clock time
    pub fn now(source_id: SourceId, value: f64) -> Self {
        Self::new(source_id, value, Utc::now().timestamp())
    }

    /// Timestamp as a UTC date-time, if it is representable
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp, 0)
    }

    /// Local wall-clock time of the reading as `HH:MM:SS`
    pub fn local_time(&self) -> String {
        match self.datetime() {
            Some(utc) => utc.with_timezone(&Local).format("%T").to_string(),
            None => "--:--:--".to_string(),
        }
    }
}
