//! Error types for the pipeline

use crate::core::error_handling::ContextualError;
use crate::queue::QueueError;

/// A sink refused or failed to store a record
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SinkError {
    #[error("Sink '{sink}' rejected record: {reason}")]
    Rejected { sink: String, reason: String },

    #[error("Sink '{sink}' is unavailable: {message}")]
    Unavailable { sink: String, message: String },
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error("Reader role {role} failed: {source}")]
    Sink {
        role: usize,
        #[source]
        source: SinkError,
    },

    #[error("Pipeline configuration error: {message}")]
    Config { message: String },

    #[error("Pipeline task failed: {message}")]
    Task { message: String },
}

pub type PipelineResult<T> = Result<T, PipelineError>;

impl ContextualError for PipelineError {
    fn is_user_actionable(&self) -> bool {
        matches!(self, PipelineError::Config { .. })
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            PipelineError::Config { message } => Some(message),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sink_error_display() {
        let err = PipelineError::Sink {
            role: 1,
            source: SinkError::Rejected {
                sink: "storage".to_string(),
                reason: "disk full".to_string(),
            },
        };
        assert_eq!(
            err.to_string(),
            "Reader role 1 failed: Sink 'storage' rejected record: disk full"
        );
        assert!(!err.is_user_actionable());
    }

    #[test]
    fn test_queue_error_converts_transparently() {
        let err: PipelineError = QueueError::Allocation {
            reason: "node capacity of 4 exhausted".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "Node allocation failed: node capacity of 4 exhausted");
        assert_eq!(err.user_message(), None);
    }

    #[test]
    fn test_config_error_is_user_actionable() {
        let err = PipelineError::Config {
            message: "expected 2 sinks, got 1".to_string(),
        };
        assert!(err.is_user_actionable());
        assert_eq!(err.user_message(), Some("expected 2 sinks, got 1"));
    }
}
