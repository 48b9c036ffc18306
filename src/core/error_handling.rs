//! Generic error handling utilities
//!
//! Provides unified error reporting that works across the crate's error
//! types while keeping internal details at debug level.

/// Trait for errors that can distinguish between user-actionable and system errors
///
/// When `is_user_actionable()` returns `true`, `user_message()` should return
/// `Some(message)` with a helpful, actionable message. When it returns
/// `false`, `user_message()` should return `None`.
pub trait ContextualError: std::error::Error {
    /// Returns true if this error carries a message the user can act on,
    /// such as a bad configuration value
    fn is_user_actionable(&self) -> bool;

    /// Returns the specific user message if this is a user-actionable error
    fn user_message(&self) -> Option<&str>;
}

/// Log errors with appropriate detail level based on error specificity
///
/// - User-actionable errors show their own message
/// - System errors show the operation context only
/// - Full details always go to debug level
///
/// # Examples
/// ```rust,no_run
/// # use sensorbuf::core::error_handling::log_error_with_context;
/// # use sensorbuf::queue::QueueError;
/// let err = QueueError::Allocation { reason: "node capacity of 8 exhausted".to_string() };
/// log_error_with_context(&err, "Publishing sensor reading");
/// // Logs: "FATAL: Publishing sensor reading"
/// ```
pub fn log_error_with_context<E: ContextualError + std::fmt::Display + std::fmt::Debug>(
    error: &E,
    operation_context: &str,
) {
    log::error!("FATAL: {}", headline(error, operation_context));
    log::debug!("DETAIL: {}", error);
    log::debug!("DEBUG_DETAILS: {:?}", error);
}

/// The line shown to the user for `error`
pub fn headline<'a, E: ContextualError>(error: &'a E, operation_context: &'a str) -> &'a str {
    if error.is_user_actionable() {
        error.user_message().unwrap_or(operation_context)
    } else {
        operation_context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::QueueError;
    use std::fmt;

    // Test error type for user-actionable errors
    #[derive(Debug)]
    struct TestUserError {
        message: String,
    }

    impl fmt::Display for TestUserError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.message)
        }
    }

    impl std::error::Error for TestUserError {}

    impl ContextualError for TestUserError {
        fn is_user_actionable(&self) -> bool {
            true
        }

        fn user_message(&self) -> Option<&str> {
            Some(&self.message)
        }
    }

    #[test]
    fn test_user_actionable_error_shows_specific_message() {
        let error = TestUserError {
            message: "records must be greater than 0".to_string(),
        };
        assert_eq!(
            headline(&error, "Loading configuration"),
            "records must be greater than 0"
        );
    }

    #[test]
    fn test_queue_error_uses_generic_context() {
        let error = QueueError::InvalidState {
            message: "reader role 4 is out of range (0..2)".to_string(),
        };
        assert_eq!(headline(&error, "Reading sensor data"), "Reading sensor data");

        // Must not panic without a logger installed
        log_error_with_context(&error, "Reading sensor data");
    }
}
