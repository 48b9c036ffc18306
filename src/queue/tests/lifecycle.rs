//! Tests for queue creation and teardown

#[cfg(test)]
mod tests {
    use crate::queue::api::{QueueConfig, QueueError, Record, Removal, SharedQueue};

    #[test]
    fn test_destroy_discards_unread_nodes() {
        let queue = SharedQueue::<2>::create(QueueConfig::new("teardown")).unwrap();
        for id in 0..5 {
            queue.insert(Record::new(id, 1.0, 0)).unwrap();
        }
        queue.read_next(0).unwrap();

        // No prior consumption required
        assert_eq!(queue.destroy().unwrap(), 5);
        assert!(queue.is_destroyed());
    }

    #[test]
    fn test_destroy_empty_queue() {
        let queue = SharedQueue::<2>::create(QueueConfig::new("empty")).unwrap();
        assert_eq!(queue.destroy().unwrap(), 0);
    }

    #[test]
    fn test_double_destroy_is_invalid_state() {
        let queue = SharedQueue::<2>::create(QueueConfig::new("twice")).unwrap();
        queue.destroy().unwrap();

        match queue.destroy() {
            Err(QueueError::InvalidState { message }) => {
                assert!(message.contains("already been destroyed"));
            }
            other => panic!("Expected InvalidState, got {:?}", other),
        }
    }

    #[test]
    fn test_operations_after_destroy_fail() {
        let queue = SharedQueue::<2>::create(QueueConfig::new("retired")).unwrap();
        queue.destroy().unwrap();

        let invalid = |result: Result<(), QueueError>| {
            assert!(matches!(result, Err(QueueError::InvalidState { .. })));
        };

        invalid(queue.insert(Record::new(1, 1.0, 0)));
        invalid(queue.read_next(0).map(|_| ()));
        invalid(queue.try_remove().map(|_| ()));
        invalid(queue.reclaim().map(|_| ()));
        invalid(queue.len().map(|_| ()));
        invalid(queue.stats().map(|_| ()));
        invalid(queue.snapshot().map(|_| ()));
    }

    #[test]
    fn test_drop_frees_long_unconsumed_chain() {
        let queue = SharedQueue::<2>::create(QueueConfig::new("drop")).unwrap();
        for i in 0..100_000u32 {
            queue.insert(Record::new((i % 64) as u16, f64::from(i), 0)).unwrap();
        }
        assert_eq!(queue.len().unwrap(), 100_000);
        drop(queue);
    }

    #[test]
    fn test_queue_reusable_after_draining() {
        let queue = SharedQueue::<2>::create(QueueConfig::new("reuse")).unwrap();
        for round in 0..3 {
            queue.insert(Record::new(round, 0.0, 0)).unwrap();
            queue.read_next(0).unwrap();
            queue.read_next(1).unwrap();
            assert_eq!(queue.try_remove().unwrap(), Removal::Removed);
            assert!(queue.is_empty().unwrap());
        }
        assert_eq!(queue.stats().unwrap().inserted, 3);
        assert_eq!(queue.stats().unwrap().removed, 3);
    }
}
