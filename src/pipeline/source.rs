//! Record producers feeding the queue

use crate::queue::{Record, SourceId};

/// Something that yields sensor records until it runs dry
///
/// Every `Iterator<Item = Record>` that can cross threads is a source, so
/// a `Vec<Record>` replays fixed data in tests.
pub trait RecordSource: Send {
    fn next_record(&mut self) -> Option<Record>;
}

impl<I> RecordSource for I
where
    I: Iterator<Item = Record> + Send,
{
    fn next_record(&mut self) -> Option<Record> {
        self.next()
    }
}

/// Deterministic readings for a fixed set of sensors
///
/// Sensors are visited round-robin. Each sensor has its own base level and
/// the value follows a slow triangle wave around it, so repeated runs
/// produce the same values (timestamps are taken when a record is made).
#[derive(Debug, Clone)]
pub struct SimulatedSource {
    sensors: Vec<SourceId>,
    remaining: usize,
    emitted: usize,
}

impl SimulatedSource {
    pub fn new(sensors: Vec<SourceId>, records: usize) -> Self {
        let remaining = if sensors.is_empty() { 0 } else { records };
        Self {
            sensors,
            remaining,
            emitted: 0,
        }
    }

    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Value of the `round`-th reading of `sensor`
    pub fn reading(sensor: SourceId, round: usize) -> f64 {
        let base = 15.0 + f64::from(sensor % 10);
        let phase = (round % 20) as f64;
        base + (phase - 10.0).abs() / 4.0
    }
}

impl Iterator for SimulatedSource {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        if self.remaining == 0 {
            return None;
        }
        let sensor = self.sensors[self.emitted % self.sensors.len()];
        let round = self.emitted / self.sensors.len();
        self.remaining -= 1;
        self.emitted += 1;
        Some(Record::now(sensor, Self::reading(sensor, round)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}
