//! Top-level error types for the consumer process.

use thiserror::Error;

use crate::constants::exit_codes;
use crate::messaging::QueueError;

/// Configuration could not be resolved into a [`QueueConfig`](crate::config::QueueConfig)
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("You must supply the name of a queue (-q QUEUE)")]
    MissingQueueName,

    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid endpoint URL {url}: {reason}")]
    InvalidEndpoint { url: String, reason: String },

    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },
}

/// Consumer error type
#[derive(Error, Debug)]
pub enum ConsumerError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Queue error: {0}")]
    Queue(#[from] QueueError),
}

impl ConsumerError {
    /// Process exit code reported for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Configuration(_) => exit_codes::CONFIGURATION,
            Self::Queue(_) => exit_codes::QUEUE_FAILURE,
        }
    }
}

/// Result type alias for ConsumerError
pub type Result<T> = std::result::Result<T, ConsumerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let err = ConsumerError::from(ConfigError::MissingQueueName);
        assert_eq!(err.exit_code(), 2);

        let err = ConsumerError::from(QueueError::receive_failed("url", "timed out"));
        assert_eq!(err.exit_code(), 1);
    }
}
