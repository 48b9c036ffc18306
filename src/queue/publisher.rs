//! Queue Producer for appending records
//!
//! The producer is the single writer of a shared queue. It holds only a weak
//! reference so that dropping the last strong handle to the queue is not
//! delayed by a producer that outlives it.

use crate::queue::error::{QueueError, QueueResult};
use crate::queue::internal::SharedQueue;
use crate::queue::record::Record;
use crate::queue::types::DEFAULT_ROLES;
use std::sync::{Arc, Weak};

/// Producer handle for appending records to the queue
///
/// # Example
///
/// ```rust
/// # use sensorbuf::queue::{QueueConfig, Record, SharedQueue};
/// let queue = SharedQueue::<2>::create(QueueConfig::new("sensors"))?;
/// let producer = queue.producer();
///
/// producer.publish(Record::now(15, 21.3))?;
/// assert_eq!(queue.len()?, 1);
/// # Ok::<(), sensorbuf::queue::QueueError>(())
/// ```
#[derive(Debug)]
pub struct Producer<const ROLES: usize = DEFAULT_ROLES> {
    queue: Weak<SharedQueue<ROLES>>,
}

impl<const ROLES: usize> Producer<ROLES> {
    pub(crate) fn new(queue: Weak<SharedQueue<ROLES>>) -> Self {
        Self { queue }
    }

    /// Append a record to the queue
    pub fn publish(&self, record: Record) -> QueueResult<()> {
        let queue = self.queue.upgrade().ok_or_else(QueueError::queue_gone)?;
        queue.insert(record)
    }

    /// Append records in order, stopping at the first failure
    ///
    /// Returns the number of records appended.
    pub fn publish_all<I>(&self, records: I) -> QueueResult<usize>
    where
        I: IntoIterator<Item = Record>,
    {
        let queue = self.queue.upgrade().ok_or_else(QueueError::queue_gone)?;
        let mut published = 0;
        for record in records {
            queue.insert(record)?;
            published += 1;
        }
        Ok(published)
    }

    /// Whether the queue behind this handle still exists
    pub fn is_connected(&self) -> bool {
        self.queue.strong_count() > 0
    }
}

impl<const ROLES: usize> SharedQueue<ROLES> {
    /// Create a producer handle for this queue
    pub fn producer(self: &Arc<Self>) -> Producer<ROLES> {
        Producer::new(Arc::downgrade(self))
    }
}
