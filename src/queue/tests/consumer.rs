//! Tests for Consumer functionality

#[cfg(test)]
mod tests {
    use crate::queue::api::{QueueConfig, QueueError, Record, Removal, SharedQueue};

    #[test]
    fn test_consumer_reads_as_its_role() {
        let queue = SharedQueue::<2>::create(QueueConfig::new("consumer")).unwrap();
        let consumer = queue.consumer(1).unwrap();
        assert_eq!(consumer.role(), 1);

        queue.insert(Record::new(3, 1.0, 0)).unwrap();
        assert_eq!(consumer.read().unwrap(), Some(Record::new(3, 1.0, 0)));
        assert_eq!(consumer.read().unwrap(), None);

        // Role 0 untouched
        assert_eq!(queue.pending(0).unwrap(), 1);
        assert_eq!(consumer.pending().unwrap(), 0);
    }

    #[test]
    fn test_role_cannot_be_claimed_twice() {
        let queue = SharedQueue::<2>::create(QueueConfig::new("claim")).unwrap();
        let first = queue.consumer(0).unwrap();

        match queue.consumer(0) {
            Err(QueueError::InvalidState { message }) => {
                assert!(message.contains("already claimed"));
            }
            Ok(_) => panic!("Expected the second claim to fail"),
            Err(other) => panic!("Unexpected error: {:?}", other),
        }

        drop(first);
        assert!(queue.consumer(0).is_ok());
    }

    #[test]
    fn test_consumer_for_out_of_range_role() {
        let queue = SharedQueue::<2>::create(QueueConfig::new("range")).unwrap();
        assert!(matches!(
            queue.consumer(5),
            Err(QueueError::InvalidState { .. })
        ));
    }

    #[test]
    fn test_read_and_reclaim_reports_removal() {
        let queue = SharedQueue::<2>::create(QueueConfig::new("reclaim")).unwrap();
        let role0 = queue.consumer(0).unwrap();
        let role1 = queue.consumer(1).unwrap();
        queue.insert(Record::new(1, 1.0, 0)).unwrap();

        let (_, removal) = role0.read_and_reclaim().unwrap().unwrap();
        assert_eq!(removal, Removal::Retained);
        let (_, removal) = role1.read_and_reclaim().unwrap().unwrap();
        assert_eq!(removal, Removal::Removed);

        assert!(role0.read_and_reclaim().unwrap().is_none());
        assert_eq!(role1.reclaim().unwrap(), Removal::NoData);
    }

    #[test]
    fn test_read_batch() {
        let queue = SharedQueue::<1>::create(QueueConfig::new("batch")).unwrap();
        let consumer = queue.consumer(0).unwrap();
        for id in 0..5 {
            queue.insert(Record::new(id, 0.0, 0)).unwrap();
        }

        let batch = consumer.read_batch(3).unwrap();
        assert_eq!(batch.iter().map(|r| r.source_id).collect::<Vec<_>>(), vec![0, 1, 2]);

        let rest = consumer.read_batch(10).unwrap();
        assert_eq!(rest.len(), 2);
        assert!(consumer.read_batch(10).unwrap().is_empty());
    }

    #[test]
    fn test_consumer_outliving_queue() {
        let queue = SharedQueue::<1>::create(QueueConfig::new("gone")).unwrap();
        let consumer = queue.consumer(0).unwrap();
        drop(queue);

        match consumer.read() {
            Err(QueueError::InvalidState { message }) => {
                assert!(message.contains("no longer exists"));
            }
            other => panic!("Expected InvalidState, got {:?}", other),
        }
        // Dropping the consumer afterwards must not panic
        drop(consumer);
    }
}
