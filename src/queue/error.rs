//! Queue Error Types

use crate::core::error_handling::ContextualError;

/// Failures returned by queue operations.
///
/// "Nothing to read" and "node kept for other roles" are not errors: they
/// are reported as `Ok(None)` from `read_next` and as [`Removal`] values from
/// `try_remove`.
///
/// [`Removal`]: crate::queue::Removal
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    #[error("Node allocation failed: {reason}")]
    Allocation { reason: String },

    #[error("Invalid queue state: {message}")]
    InvalidState { message: String },
}

impl QueueError {
    pub(crate) fn destroyed(queue_name: &str) -> Self {
        QueueError::InvalidState {
            message: format!("queue '{}' has already been destroyed", queue_name),
        }
    }

    pub(crate) fn role_out_of_range(role: usize, roles: usize) -> Self {
        QueueError::InvalidState {
            message: format!("reader role {} is out of range (0..{})", role, roles),
        }
    }

    pub(crate) fn queue_gone() -> Self {
        QueueError::InvalidState {
            message: "SharedQueue no longer exists".to_string(),
        }
    }
}

impl ContextualError for QueueError {
    fn is_user_actionable(&self) -> bool {
        // Both kinds point at the process or the calling code, not at user input
        false
    }

    fn user_message(&self) -> Option<&str> {
        None
    }
}

/// Result type for queue operations
pub type QueueResult<T> = Result<T, QueueError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = QueueError::role_out_of_range(3, 2);
        assert_eq!(
            err.to_string(),
            "Invalid queue state: reader role 3 is out of range (0..2)"
        );

        let err = QueueError::destroyed("sensors");
        assert!(err.to_string().contains("'sensors' has already been destroyed"));

        let err = QueueError::Allocation {
            reason: "node capacity of 4 exhausted".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Node allocation failed: node capacity of 4 exhausted"
        );
    }

    #[test]
    fn test_queue_errors_are_not_user_actionable() {
        assert!(!QueueError::queue_gone().is_user_actionable());
        assert_eq!(QueueError::queue_gone().user_message(), None);
    }
}
