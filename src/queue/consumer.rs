//! Queue Consumer bound to one reader role
//!
//! Each consumer owns exactly one role index. The role is claimed when the
//! consumer is created and released when it is dropped, so two live
//! consumers can never advance the same role.

use crate::queue::error::{QueueError, QueueResult};
use crate::queue::internal::SharedQueue;
use crate::queue::record::Record;
use crate::queue::types::{Removal, DEFAULT_ROLES};
use std::sync::{Arc, Weak};

/// Consumer handle for reading records as one role
///
/// # Example
///
/// ```rust
/// # use sensorbuf::queue::{QueueConfig, Record, Removal, SharedQueue};
/// let queue = SharedQueue::<1>::create(QueueConfig::new("sensors"))?;
/// queue.producer().publish(Record::now(15, 21.3))?;
///
/// let consumer = queue.consumer(0)?;
/// while let Some((record, removal)) = consumer.read_and_reclaim()? {
///     println!("sensor {} -> {} ({})", record.source_id, record.value, removal);
/// }
/// assert!(queue.is_empty()?);
/// # Ok::<(), sensorbuf::queue::QueueError>(())
/// ```
#[derive(Debug)]
pub struct Consumer<const ROLES: usize = DEFAULT_ROLES> {
    role: usize,
    queue: Weak<SharedQueue<ROLES>>,
}

impl<const ROLES: usize> Consumer<ROLES> {
    pub(crate) fn new(role: usize, queue: &Arc<SharedQueue<ROLES>>) -> QueueResult<Self> {
        queue.claim_role(role)?;
        Ok(Self {
            role,
            queue: Arc::downgrade(queue),
        })
    }

    /// Role index this consumer reads as
    pub fn role(&self) -> usize {
        self.role
    }

    fn queue(&self) -> QueueResult<Arc<SharedQueue<ROLES>>> {
        self.queue.upgrade().ok_or_else(QueueError::queue_gone)
    }

    /// Read the next record for this role, `None` if there is nothing new
    pub fn read(&self) -> QueueResult<Option<Record>> {
        self.queue()?.read_next(self.role)
    }

    /// Read the next record and then attempt to free the head node
    pub fn read_and_reclaim(&self) -> QueueResult<Option<(Record, Removal)>> {
        let queue = self.queue()?;
        match queue.read_next(self.role)? {
            Some(record) => {
                let removal = queue.try_remove()?;
                Ok(Some((record, removal)))
            }
            None => Ok(None),
        }
    }

    /// Read up to `batch_size` records for this role
    pub fn read_batch(&self, batch_size: usize) -> QueueResult<Vec<Record>> {
        let queue = self.queue()?;
        let mut batch = Vec::with_capacity(batch_size);

        for _ in 0..batch_size {
            match queue.read_next(self.role)? {
                Some(record) => batch.push(record),
                None => break,
            }
        }

        Ok(batch)
    }

    /// Attempt to free the head node
    pub fn reclaim(&self) -> QueueResult<Removal> {
        self.queue()?.try_remove()
    }

    /// Number of records this role has not read yet
    pub fn pending(&self) -> QueueResult<usize> {
        self.queue()?.pending(self.role)
    }
}

impl<const ROLES: usize> Drop for Consumer<ROLES> {
    fn drop(&mut self) {
        if let Some(queue) = self.queue.upgrade() {
            queue.release_role(self.role);
        }
    }
}

impl<const ROLES: usize> SharedQueue<ROLES> {
    /// Create a consumer bound to `role`
    ///
    /// Fails with `InvalidState` if the role is out of range or already
    /// held by another live consumer.
    pub fn consumer(self: &Arc<Self>, role: usize) -> QueueResult<Consumer<ROLES>> {
        Consumer::new(role, self)
    }
}
