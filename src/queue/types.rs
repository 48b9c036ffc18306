//! Type definitions for the queue system
//!
//! Configuration, removal outcomes and statistics shared by the queue and
//! its handles.

use crate::core::version;
use strum_macros::Display;

/// Reader role count used when a queue type does not name one explicitly.
/// Comes from `package.metadata.reader_roles` in Cargo.toml.
pub const DEFAULT_ROLES: usize = version::READER_ROLES;

/// Creation parameters for a [`SharedQueue`](crate::queue::SharedQueue)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueConfig {
    /// Queue identifier, used in log lines and error messages
    pub name: String,
    /// Maximum number of nodes the queue may hold at once.
    /// Inserting beyond it fails like an allocation failure; `None` is unbounded.
    pub node_capacity: Option<usize>,
}

impl QueueConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            node_capacity: None,
        }
    }

    pub fn with_node_capacity(mut self, capacity: usize) -> Self {
        self.node_capacity = Some(capacity);
        self
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self::new("sensor-data")
    }
}

/// Outcome of a removal attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Removal {
    /// The head node had been read by every role and was freed
    Removed,
    /// At least one role has not read the head node yet
    Retained,
    /// The queue holds no nodes
    NoData,
}

/// Snapshot of queue occupancy and per-role backlog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueStats {
    /// Nodes currently reachable from the head
    pub nodes: usize,
    /// Nodes already read by every role and waiting to be removed
    pub reclaimable: usize,
    /// Unread nodes for each role, indexed by role
    pub pending_per_role: Vec<usize>,
    /// Records appended since creation
    pub inserted: u64,
    /// Nodes detached by removal since creation (teardown not included)
    pub removed: u64,
}

impl QueueStats {
    /// Largest backlog among all roles
    pub fn max_pending(&self) -> usize {
        self.pending_per_role.iter().copied().max().unwrap_or(0)
    }
}
