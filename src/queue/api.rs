//! Public API for the queue system
//!
//! This module provides the complete public API for the shared queue.
//! External modules should import from here rather than directly from internal modules.
//! See module documentation for complete usage examples and architecture details.

// Core queue and its handles
pub use crate::queue::consumer::Consumer;
pub use crate::queue::internal::SharedQueue;
pub use crate::queue::publisher::Producer;

// Record type
pub use crate::queue::record::{Record, SourceId};

// Error handling
pub use crate::queue::error::{QueueError, QueueResult};

// Configuration, outcomes and statistics
pub use crate::queue::snapshot::{NodeSnapshot, QueueSnapshot};
pub use crate::queue::types::{QueueConfig, QueueStats, Removal, DEFAULT_ROLES};
