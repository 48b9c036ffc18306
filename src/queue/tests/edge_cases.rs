//! Edge case and error condition tests for the queue system
//!
//! These tests verify that failures are reported as errors, that expected
//! "nothing to do" outcomes are not, and that a failed operation leaves
//! the queue untouched.

#[cfg(test)]
mod tests {
    use crate::queue::api::{QueueConfig, QueueError, Record, Removal, SharedQueue};

    fn record(source_id: u16) -> Record {
        Record::new(source_id, 10.0, 0)
    }

    #[test]
    fn test_allocation_failure_leaves_queue_unchanged() {
        let queue =
            SharedQueue::<2>::create(QueueConfig::new("bounded").with_node_capacity(2)).unwrap();
        queue.insert(record(1)).unwrap();
        queue.insert(record(2)).unwrap();
        queue.read_next(0).unwrap();

        let before = queue.snapshot().unwrap();
        let stats_before = queue.stats().unwrap();

        match queue.insert(record(3)) {
            Err(QueueError::Allocation { reason }) => {
                assert!(reason.contains("node capacity of 2 exhausted"));
            }
            other => panic!("Expected Allocation error, got {:?}", other),
        }

        assert_eq!(queue.snapshot().unwrap(), before);
        assert_eq!(queue.stats().unwrap(), stats_before);
        assert_eq!(queue.len().unwrap(), 2);
    }

    #[test]
    fn test_capacity_frees_up_after_removal() {
        let queue =
            SharedQueue::<1>::create(QueueConfig::new("bounded").with_node_capacity(1)).unwrap();
        queue.insert(record(1)).unwrap();
        assert!(queue.insert(record(2)).is_err());

        queue.read_next(0).unwrap();
        assert_eq!(queue.try_remove().unwrap(), Removal::Removed);
        assert!(queue.insert(record(2)).is_ok());
        assert_eq!(queue.read_next(0).unwrap(), Some(record(2)));
    }

    #[test]
    fn test_out_of_range_role_is_invalid_state() {
        let queue = SharedQueue::<2>::create(QueueConfig::new("roles")).unwrap();
        queue.insert(record(1)).unwrap();

        match queue.read_next(2) {
            Err(QueueError::InvalidState { message }) => {
                assert!(message.contains("reader role 2 is out of range (0..2)"));
            }
            other => panic!("Expected InvalidState, got {:?}", other),
        }
        assert!(matches!(
            queue.pending(usize::MAX),
            Err(QueueError::InvalidState { .. })
        ));

        // The failed read must not have touched any flag
        assert_eq!(queue.pending(0).unwrap(), 1);
        assert_eq!(queue.pending(1).unwrap(), 1);
    }

    #[test]
    fn test_no_data_and_retained_are_not_errors() {
        let queue = SharedQueue::<2>::create(QueueConfig::new("outcomes")).unwrap();
        assert!(matches!(queue.read_next(0), Ok(None)));
        assert!(matches!(queue.try_remove(), Ok(Removal::NoData)));

        queue.insert(record(1)).unwrap();
        queue.read_next(0).unwrap();
        assert!(matches!(queue.try_remove(), Ok(Removal::Retained)));
        assert_ne!(Removal::Retained, Removal::NoData);
    }

    #[test]
    fn test_role_that_read_everything_gets_no_data_while_others_lag() {
        let queue = SharedQueue::<2>::create(QueueConfig::new("lag")).unwrap();
        queue.insert(record(1)).unwrap();
        queue.read_next(0).unwrap();

        assert_eq!(queue.read_next(0).unwrap(), None);
        assert_eq!(queue.len().unwrap(), 1);
        assert_eq!(queue.read_next(1).unwrap(), Some(record(1)));
    }

    #[test]
    fn test_queues_are_independent() {
        let first = SharedQueue::<2>::create(QueueConfig::new("first")).unwrap();
        let second = SharedQueue::<2>::create(QueueConfig::new("second")).unwrap();

        first.insert(record(1)).unwrap();
        assert_eq!(second.read_next(0).unwrap(), None);

        first.destroy().unwrap();
        second.insert(record(2)).unwrap();
        assert_eq!(second.read_next(0).unwrap(), Some(record(2)));
    }

    #[test]
    fn test_single_role_queue_removes_immediately() {
        let queue = SharedQueue::<1>::create(QueueConfig::new("solo")).unwrap();
        queue.insert(record(1)).unwrap();
        queue.read_next(0).unwrap();
        assert_eq!(queue.try_remove().unwrap(), Removal::Removed);
    }

    #[test]
    fn test_extreme_values_round_trip_unchanged() {
        let queue = SharedQueue::<1>::create(QueueConfig::new("values")).unwrap();
        let records = [
            Record::new(u16::MAX, f64::MAX, i64::MAX),
            Record::new(0, f64::MIN_POSITIVE, i64::MIN),
            Record::new(1, -0.0, 0),
        ];
        for r in records {
            queue.insert(r).unwrap();
        }
        for r in records {
            assert_eq!(queue.read_next(0).unwrap(), Some(r));
        }
    }
}
