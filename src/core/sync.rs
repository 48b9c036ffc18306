//! Lock poisoning helpers
//!
//! A panic while a lock is held poisons it. Instead of unwrapping, callers
//! turn the poison into their own error type through these helpers.

use std::sync::{LockResult, RwLockReadGuard, RwLockWriteGuard};

/// Convert a poisoned mutex lock result into an application error
///
/// # Examples
/// ```
/// use std::sync::Mutex;
/// use sensorbuf::core::sync::handle_mutex_poison;
/// use sensorbuf::queue::QueueError;
///
/// let mutex = Mutex::new(42);
/// let guard = handle_mutex_poison(
///     mutex.lock(),
///     |message| QueueError::InvalidState { message }
/// ).unwrap();
/// assert_eq!(*guard, 42);
/// ```
pub fn handle_mutex_poison<T, E>(
    result: LockResult<T>,
    error_constructor: impl FnOnce(String) -> E,
) -> Result<T, E> {
    result.map_err(|poison_err| {
        error_constructor(format!(
            "Internal synchronisation error (mutex poisoned). A panic occurred while holding a lock. PoisonError: {:?}",
            poison_err
        ))
    })
}

/// Convert a poisoned shared (read) acquisition into an application error
pub fn handle_rwlock_read<T, E>(
    result: LockResult<RwLockReadGuard<T>>,
    error_constructor: impl FnOnce(String) -> E,
) -> Result<RwLockReadGuard<T>, E> {
    result.map_err(|poison_err| {
        error_constructor(format!(
            "Internal synchronisation error (RwLock read poisoned). A panic occurred while holding the write lock. PoisonError: {:?}",
            poison_err
        ))
    })
}

/// Convert a poisoned exclusive (write) acquisition into an application error
pub fn handle_rwlock_write<T, E>(
    result: LockResult<RwLockWriteGuard<T>>,
    error_constructor: impl FnOnce(String) -> E,
) -> Result<RwLockWriteGuard<T>, E> {
    result.map_err(|poison_err| {
        error_constructor(format!(
            "Internal synchronisation error (RwLock write poisoned). A panic occurred while holding the lock. PoisonError: {:?}",
            poison_err
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::QueueError;
    use std::sync::{Arc, Mutex, RwLock};
    use std::thread;

    fn invalid_state(message: String) -> QueueError {
        QueueError::InvalidState { message }
    }

    #[test]
    fn test_handle_mutex_poison_success() {
        let mutex = Mutex::new(42);
        let guard = handle_mutex_poison(mutex.lock(), invalid_state).unwrap();
        assert_eq!(*guard, 42);
    }

    #[test]
    fn test_handle_rwlock_read_with_poisoned_lock() {
        let rwlock = Arc::new(RwLock::new(42));
        let rwlock_clone = Arc::clone(&rwlock);

        // Poison the lock by panicking while holding the write guard
        let _ = thread::spawn(move || {
            let _guard = rwlock_clone.write().unwrap();
            panic!("Intentional panic to poison lock");
        })
        .join();

        match handle_rwlock_read(rwlock.read(), invalid_state) {
            Err(QueueError::InvalidState { message }) => {
                assert!(message.contains("RwLock read poisoned"));
            }
            other => panic!("Expected InvalidState, got {:?}", other.map(|g| *g)),
        }
        assert!(handle_rwlock_write(rwlock.write(), invalid_state).is_err());
    }

    #[test]
    fn test_handle_rwlock_write_success() {
        let rwlock = RwLock::new(42);

        *handle_rwlock_write(rwlock.write(), invalid_state).unwrap() = 100;
        assert_eq!(*handle_rwlock_read(rwlock.read(), invalid_state).unwrap(), 100);
    }
}
