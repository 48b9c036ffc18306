//! Shared Queue Component
//!
//! A multi-reader, single-writer FIFO queue where every record is kept until
//! each of a fixed set of reader roles has read it exactly once, and is then
//! reclaimed.
//!
//! # Overview
//!
//! - **Single Producer**: one writer appends records at the tail
//! - **Fixed Reader Roles**: `ROLES` independent readers, known at compile time
//! - **Exactly Once**: a read flag per role per node; flags only go false→true
//! - **Reclamation**: the head node is freed once every flag is set
//! - **One Lock**: a reader-writer lock; reads share it, topology changes take it exclusively
//!
//! # Architecture
//!
//! ```text
//!        ┌──────────────┐
//!        │   Producer   │
//!        └──────┬───────┘
//!               │ insert (exclusive)
//!               ▼
//! ┌──────────────────────────────────────────────┐
//! │                 SharedQueue                  │
//! │  head                                  tail  │
//! │   ▼                                      ▼   │
//! │  ┌─────┐    ┌─────┐    ┌─────┐    ┌─────┐   │
//! │  │ A   │───▶│ B   │───▶│ C   │───▶│ D   │   │
//! │  │[1 1]│    │[1 0]│    │[1 0]│    │[0 0]│   │
//! │  └─────┘    └─────┘    └─────┘    └─────┘   │
//! │   ▲ try_remove frees A                       │
//! └──────────────────────────────────────────────┘
//!          ▲ read_next(0)        ▲ read_next(1)
//!          │ (shared)            │ (shared)
//!   ┌──────┴─────┐        ┌──────┴─────┐
//!   │  Role 0    │        │  Role 1    │
//!   └────────────┘        └────────────┘
//! ```
//!
//! # Example Usage
//!
//! ```rust
//! use sensorbuf::queue::{QueueConfig, Record, Removal, SharedQueue};
//!
//! let queue = SharedQueue::<2>::create(QueueConfig::new("sensors"))?;
//!
//! let producer = queue.producer();
//! producer.publish(Record::now(15, 21.3))?;
//!
//! let data_role = queue.consumer(0)?;
//! let storage_role = queue.consumer(1)?;
//!
//! let (_, removal) = data_role.read_and_reclaim()?.unwrap();
//! assert_eq!(removal, Removal::Retained);
//!
//! let (_, removal) = storage_role.read_and_reclaim()?.unwrap();
//! assert_eq!(removal, Removal::Removed);
//!
//! queue.destroy()?;
//! # Ok::<(), sensorbuf::queue::QueueError>(())
//! ```

pub mod api;
mod consumer;
mod error;
mod internal;
mod publisher;
mod record;
mod snapshot;
mod types;

pub use consumer::Consumer;
pub use error::{QueueError, QueueResult};
pub use internal::SharedQueue;
pub use publisher::Producer;
pub use record::{Record, SourceId};
pub use snapshot::{NodeSnapshot, QueueSnapshot};
pub use types::{QueueConfig, QueueStats, Removal, DEFAULT_ROLES};

#[cfg(test)]
mod tests;
