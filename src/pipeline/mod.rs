//! Sensor data pipeline
//!
//! Drives a [`SharedQueue`](crate::queue::SharedQueue) with one producer task
//! and one reader task per role, the way the gateway feeds its data manager
//! and storage manager from a single buffer.
//!
//! ```text
//!   RecordSource ──▶ WriterTask ──insert──▶ SharedQueue
//!                                              │
//!                      ┌──────── read_next + try_remove ────────┐
//!                      ▼                                        ▼
//!               ReaderTask(role 0)                      ReaderTask(role N-1)
//!                      │                                        │
//!                  RecordSink                               RecordSink
//! ```

mod error;
mod runner;
mod sink;
mod source;

pub use error::{PipelineError, PipelineResult, SinkError};
pub use runner::{Pipeline, PipelineConfig, PipelineReport, RoleReport};
pub use sink::{CountingSink, LogSink, RecordSink, SourceTally};
pub use source::{RecordSource, SimulatedSource};
