//! Record consumers attached to reader roles

use crate::core::sync::handle_mutex_poison;
use crate::pipeline::error::SinkError;
use crate::queue::{Record, SourceId};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// Destination for the records one reader role sees
pub trait RecordSink: Send {
    /// Short name used in logs and reports
    fn name(&self) -> &str;

    fn accept(&mut self, record: &Record) -> Result<(), SinkError>;
}

/// Writes every record to the log at debug level
#[derive(Debug, Clone)]
pub struct LogSink {
    name: String,
}

impl LogSink {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl RecordSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn accept(&mut self, record: &Record) -> Result<(), SinkError> {
        log::debug!(
            "[{}] sensor {} = {:.2} at {}",
            self.name,
            record.source_id,
            record.value,
            record.local_time()
        );
        Ok(())
    }
}

/// Per-sensor tally kept by [`CountingSink`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceTally {
    pub count: u64,
    pub last_value: f64,
    pub last_timestamp: i64,
}

/// Counts records per sensor
///
/// Clones share one tally, so a clone kept outside the pipeline can be
/// inspected after the run.
#[derive(Debug, Clone)]
pub struct CountingSink {
    name: String,
    tallies: Arc<Mutex<BTreeMap<SourceId, SourceTally>>>,
}

impl CountingSink {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tallies: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }

    /// Copy of the per-sensor tallies
    pub fn tallies(&self) -> Result<BTreeMap<SourceId, SourceTally>, SinkError> {
        let guard = handle_mutex_poison(self.tallies.lock(), |message| self.unavailable(message))?;
        Ok(guard.clone())
    }

    /// Records seen across all sensors
    pub fn total(&self) -> Result<u64, SinkError> {
        Ok(self.tallies()?.values().map(|t| t.count).sum())
    }

    fn unavailable(&self, message: String) -> SinkError {
        SinkError::Unavailable {
            sink: self.name.clone(),
            message,
        }
    }
}

impl RecordSink for CountingSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn accept(&mut self, record: &Record) -> Result<(), SinkError> {
        if !record.value.is_finite() {
            return Err(SinkError::Rejected {
                sink: self.name.clone(),
                reason: format!("non-finite value from sensor {}", record.source_id),
            });
        }
        let mut tallies =
            handle_mutex_poison(self.tallies.lock(), |message| self.unavailable(message))?;
        let tally = tallies.entry(record.source_id).or_insert(SourceTally {
            count: 0,
            last_value: record.value,
            last_timestamp: record.timestamp,
        });
        tally.count += 1;
        tally.last_value = record.value;
        tally.last_timestamp = record.timestamp;
        Ok(())
    }
}
