//! Internal SharedQueue implementation with per-node read tracking
//!
//! This module provides the core queue functionality with:
//! - A singly-linked chain of nodes owned exclusively by the queue
//! - A fixed array of read flags per node, one per reader role
//! - One reader-writer lock guarding topology and flag changes
//! - Two-phase removal of fully-read head nodes

use crate::core::sync::{handle_rwlock_read, handle_rwlock_write};
use crate::queue::error::{QueueError, QueueResult};
use crate::queue::record::Record;
use crate::queue::snapshot::{NodeSnapshot, QueueSnapshot};
use crate::queue::types::{QueueConfig, QueueStats, Removal, DEFAULT_ROLES};
use std::iter;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// One link of the chain
struct Node<const ROLES: usize> {
    record: Record,
    reads: [AtomicBool; ROLES],
    next: Option<Box<Node<ROLES>>>,
}

impl<const ROLES: usize> Node<ROLES> {
    fn new(record: Record) -> Box<Self> {
        Box::new(Self {
            record,
            reads: std::array::from_fn(|_| AtomicBool::new(false)),
            next: None,
        })
    }

    fn is_read_by(&self, role: usize) -> bool {
        self.reads[role].load(Ordering::Acquire)
    }

    /// Flip the role's flag. Returns false if the role had already read this node.
    fn mark_read(&self, role: usize) -> bool {
        self.reads[role]
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn is_fully_read(&self) -> bool {
        self.reads.iter().all(|flag| flag.load(Ordering::Acquire))
    }
}

/// State of the head node as seen by a removal attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeadState {
    Empty,
    Pending,
    Consumed,
}

/// Node chain. `head` owns every node; `tail` aliases the last one.
struct Chain<const ROLES: usize> {
    head: Option<Box<Node<ROLES>>>,
    tail: Option<NonNull<Node<ROLES>>>,
    len: usize,
}

// SAFETY: `tail` only ever points into a node owned through `head`, and it is
// only dereferenced through `&mut Chain`, which the queue hands out under the
// exclusive lock. Every other field is Send + Sync on its own.
unsafe impl<const ROLES: usize> Send for Chain<ROLES> {}
unsafe impl<const ROLES: usize> Sync for Chain<ROLES> {}

impl<const ROLES: usize> Chain<ROLES> {
    fn new() -> Self {
        Self {
            head: None,
            tail: None,
            len: 0,
        }
    }

    fn iter(&self) -> impl Iterator<Item = &Node<ROLES>> {
        iter::successors(self.head.as_deref(), |node| node.next.as_deref())
    }

    fn push_back(&mut self, mut node: Box<Node<ROLES>>) {
        let new_tail = NonNull::from(node.as_mut());
        match self.tail {
            None => self.head = Some(node),
            // SAFETY: tail points at the last node owned by this chain and we hold `&mut self`
            Some(mut tail) => unsafe { tail.as_mut().next = Some(node) },
        }
        self.tail = Some(new_tail);
        self.len += 1;
    }

    fn pop_front(&mut self) -> Option<Box<Node<ROLES>>> {
        self.head.take().map(|mut old_head| {
            self.head = old_head.next.take();
            if self.head.is_none() {
                self.tail = None;
            }
            self.len -= 1;
            old_head
        })
    }

    fn head_state(&self) -> HeadState {
        match self.head.as_deref() {
            None => HeadState::Empty,
            Some(node) if node.is_fully_read() => HeadState::Consumed,
            Some(_) => HeadState::Pending,
        }
    }

    /// Free every node, read or not. Iterative so long chains cannot overflow the stack.
    fn clear(&mut self) -> usize {
        let mut freed = 0;
        while self.pop_front().is_some() {
            freed += 1;
        }
        freed
    }
}

impl<const ROLES: usize> Drop for Chain<ROLES> {
    fn drop(&mut self) {
        self.clear();
    }
}

/// Multi-reader FIFO queue where every record is kept until all reader
/// roles have read it
///
/// One producer appends with [`insert`](Self::insert); each of the `ROLES`
/// reader roles walks the chain independently with
/// [`read_next`](Self::read_next) and then calls
/// [`try_remove`](Self::try_remove), which frees the head node once every
/// role has read it.
///
/// Any role's `try_remove` may perform the detach; it does not have to be
/// the role that flipped the last flag.
///
/// # Example
///
/// ```rust
/// use sensorbuf::queue::{QueueConfig, Record, Removal, SharedQueue};
///
/// let queue = SharedQueue::<2>::create(QueueConfig::new("example"))?;
/// queue.insert(Record::new(1, 20.5, 0))?;
///
/// assert!(queue.read_next(0)?.is_some());
/// assert_eq!(queue.try_remove()?, Removal::Retained);
///
/// assert!(queue.read_next(1)?.is_some());
/// assert_eq!(queue.try_remove()?, Removal::Removed);
/// # Ok::<(), sensorbuf::queue::QueueError>(())
/// ```
pub struct SharedQueue<const ROLES: usize = DEFAULT_ROLES> {
    /// Queue identifier
    name: String,
    /// Simulated allocator budget, in nodes
    node_capacity: Option<usize>,
    /// The chain, or `None` once the queue has been destroyed
    chain: RwLock<Option<Chain<ROLES>>>,
    /// Roles currently bound to a live consumer handle
    claimed: [AtomicBool; ROLES],
    inserted: AtomicU64,
    removed: AtomicU64,
}

impl<const ROLES: usize> SharedQueue<ROLES> {
    /// Create an empty queue
    ///
    /// Fails with `InvalidState` when the queue type has no reader roles and
    /// with `Allocation` when the configured node capacity is zero.
    pub fn create(config: QueueConfig) -> QueueResult<Arc<Self>> {
        if ROLES == 0 {
            return Err(QueueError::InvalidState {
                message: format!("queue '{}' needs at least one reader role", config.name),
            });
        }
        if config.node_capacity == Some(0) {
            return Err(QueueError::Allocation {
                reason: format!("queue '{}' has a node capacity of zero", config.name),
            });
        }

        log::debug!(
            "Created queue '{}' with {} reader roles (capacity: {:?})",
            config.name,
            ROLES,
            config.node_capacity
        );

        Ok(Arc::new(Self {
            name: config.name,
            node_capacity: config.node_capacity,
            chain: RwLock::new(Some(Chain::new())),
            claimed: std::array::from_fn(|_| AtomicBool::new(false)),
            inserted: AtomicU64::new(0),
            removed: AtomicU64::new(0),
        }))
    }

    /// Get the queue identifier
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of reader roles every record must be read by
    pub const fn roles(&self) -> usize {
        ROLES
    }

    /// Configured node capacity, if any
    pub fn node_capacity(&self) -> Option<usize> {
        self.node_capacity
    }

    /// Free every remaining node and retire the queue
    ///
    /// Unread nodes are discarded. Returns the number of nodes freed. Any
    /// later operation on this queue fails with `InvalidState`, including a
    /// second `destroy`.
    pub fn destroy(&self) -> QueueResult<usize> {
        let mut guard = self.exclusive()?;
        let mut chain = guard.take().ok_or_else(|| QueueError::destroyed(&self.name))?;
        let discarded = chain.clear();
        drop(guard);

        log::debug!(
            "Destroyed queue '{}', discarded {} unremoved nodes",
            self.name,
            discarded
        );
        Ok(discarded)
    }

    /// Whether [`destroy`](Self::destroy) has been called
    pub fn is_destroyed(&self) -> bool {
        match self.chain.read() {
            Ok(guard) => guard.is_none(),
            Err(poisoned) => poisoned.into_inner().is_none(),
        }
    }

    /// Append a record at the tail
    ///
    /// Fails with `Allocation` when the node capacity is exhausted; the queue
    /// is left exactly as it was.
    pub fn insert(&self, record: Record) -> QueueResult<()> {
        let node = Node::<ROLES>::new(record);

        let mut guard = self.exclusive()?;
        let chain = guard
            .as_mut()
            .ok_or_else(|| QueueError::destroyed(&self.name))?;

        if let Some(capacity) = self.node_capacity {
            if chain.len >= capacity {
                return Err(QueueError::Allocation {
                    reason: format!(
                        "queue '{}' node capacity of {} exhausted",
                        self.name, capacity
                    ),
                });
            }
        }

        chain.push_back(node);
        self.inserted.fetch_add(1, Ordering::Relaxed);
        drop(guard);

        log::trace!(
            "Inserted record from sensor {} into queue '{}'",
            record.source_id,
            self.name
        );
        Ok(())
    }

    /// Read the oldest record this role has not read yet
    ///
    /// Returns `Ok(None)` when the role has read every node present. The
    /// node stays in the chain; only its flag for `role` is set.
    pub fn read_next(&self, role: usize) -> QueueResult<Option<Record>> {
        self.check_role(role)?;

        let guard = self.shared()?;
        let chain = guard
            .as_ref()
            .ok_or_else(|| QueueError::destroyed(&self.name))?;

        // Nodes this role already read sit at the front; walk past them
        let record = chain
            .iter()
            .find(|node| node.mark_read(role))
            .map(|node| node.record);
        Ok(record)
    }

    /// Free the head node if every role has read it
    ///
    /// The check runs under shared access and the detach under exclusive
    /// access. The head is checked again after the exclusive lock is taken,
    /// so a node is never freed while a flag is unset and never freed twice.
    pub fn try_remove(&self) -> QueueResult<Removal> {
        {
            let guard = self.shared()?;
            let chain = guard
                .as_ref()
                .ok_or_else(|| QueueError::destroyed(&self.name))?;
            match chain.head_state() {
                HeadState::Empty => return Ok(Removal::NoData),
                HeadState::Pending => return Ok(Removal::Retained),
                HeadState::Consumed => {}
            }
        }

        let mut guard = self.exclusive()?;
        let chain = guard
            .as_mut()
            .ok_or_else(|| QueueError::destroyed(&self.name))?;

        // Another caller may have detached the node we checked in the meantime
        match chain.head_state() {
            HeadState::Empty => Ok(Removal::NoData),
            HeadState::Pending => Ok(Removal::Retained),
            HeadState::Consumed => {
                chain.pop_front();
                self.removed.fetch_add(1, Ordering::Relaxed);
                log::trace!("Removed head node from queue '{}'", self.name);
                Ok(Removal::Removed)
            }
        }
    }

    /// Free every fully-read node at the front of the chain in one exclusive section
    ///
    /// Returns the number of nodes freed.
    pub fn reclaim(&self) -> QueueResult<usize> {
        let mut guard = self.exclusive()?;
        let chain = guard
            .as_mut()
            .ok_or_else(|| QueueError::destroyed(&self.name))?;

        let mut freed = 0;
        while chain.head_state() == HeadState::Consumed {
            chain.pop_front();
            freed += 1;
        }
        self.removed.fetch_add(freed as u64, Ordering::Relaxed);
        Ok(freed)
    }

    /// Number of nodes reachable from the head
    pub fn len(&self) -> QueueResult<usize> {
        let guard = self.shared()?;
        let chain = guard
            .as_ref()
            .ok_or_else(|| QueueError::destroyed(&self.name))?;
        let len = chain.iter().count();
        Ok(len)
    }

    pub fn is_empty(&self) -> QueueResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Number of nodes the role has not read yet
    pub fn pending(&self, role: usize) -> QueueResult<usize> {
        self.check_role(role)?;
        let guard = self.shared()?;
        let chain = guard
            .as_ref()
            .ok_or_else(|| QueueError::destroyed(&self.name))?;
        let pending = chain.iter().filter(|node| !node.is_read_by(role)).count();
        Ok(pending)
    }

    /// Occupancy and backlog statistics
    pub fn stats(&self) -> QueueResult<QueueStats> {
        let guard = self.shared()?;
        let chain = guard
            .as_ref()
            .ok_or_else(|| QueueError::destroyed(&self.name))?;

        let mut pending_per_role = vec![0; ROLES];
        let mut nodes = 0;
        let mut reclaimable = 0;
        for node in chain.iter() {
            nodes += 1;
            if node.is_fully_read() {
                reclaimable += 1;
            }
            for (role, pending) in pending_per_role.iter_mut().enumerate() {
                if !node.is_read_by(role) {
                    *pending += 1;
                }
            }
        }

        Ok(QueueStats {
            nodes,
            reclaimable,
            pending_per_role,
            inserted: self.inserted.load(Ordering::Relaxed),
            removed: self.removed.load(Ordering::Relaxed),
        })
    }

    /// Copy out every node, head first, with its read flags
    pub fn snapshot(&self) -> QueueResult<QueueSnapshot> {
        let guard = self.shared()?;
        let chain = guard
            .as_ref()
            .ok_or_else(|| QueueError::destroyed(&self.name))?;

        let nodes = chain
            .iter()
            .map(|node| NodeSnapshot {
                record: node.record,
                reads: (0..ROLES).map(|role| node.is_read_by(role)).collect(),
            })
            .collect();

        Ok(QueueSnapshot {
            name: self.name.clone(),
            nodes,
        })
    }

    /// Bind a role to a single live consumer handle
    pub(crate) fn claim_role(&self, role: usize) -> QueueResult<()> {
        self.check_role(role)?;
        self.claimed[role]
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(|_| QueueError::InvalidState {
                message: format!(
                    "reader role {} of queue '{}' is already claimed",
                    role, self.name
                ),
            })
    }

    pub(crate) fn release_role(&self, role: usize) {
        if let Some(flag) = self.claimed.get(role) {
            flag.store(false, Ordering::Release);
        }
    }

    #[cfg(test)]
    pub(crate) fn is_role_claimed(&self, role: usize) -> bool {
        self.claimed
            .get(role)
            .is_some_and(|flag| flag.load(Ordering::Acquire))
    }

    fn check_role(&self, role: usize) -> QueueResult<()> {
        if role < ROLES {
            Ok(())
        } else {
            Err(QueueError::role_out_of_range(role, ROLES))
        }
    }

    fn shared(&self) -> QueueResult<RwLockReadGuard<'_, Option<Chain<ROLES>>>> {
        handle_rwlock_read(self.chain.read(), |message| QueueError::InvalidState {
            message,
        })
    }

    fn exclusive(&self) -> QueueResult<RwLockWriteGuard<'_, Option<Chain<ROLES>>>> {
        handle_rwlock_write(self.chain.write(), |message| QueueError::InvalidState {
            message,
        })
    }
}

impl<const ROLES: usize> std::fmt::Debug for SharedQueue<ROLES> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedQueue")
            .field("name", &self.name)
            .field("roles", &ROLES)
            .field("node_capacity", &self.node_capacity)
            .field("destroyed", &self.is_destroyed())
            .finish()
    }
}
