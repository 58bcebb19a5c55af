//! # Messaging Error Types
//!
//! Structured errors for queue operations and payload decoding using thiserror
//! instead of `Box<dyn Error>` patterns.

use thiserror::Error;

/// Failures of the queue service that end a consumer cycle
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    #[error("Failed to resolve queue URL for {queue_name}: {message}")]
    AddressResolution { queue_name: String, message: String },

    #[error("Failed to receive messages from {queue_url}: {message}")]
    ReceiveFailed { queue_url: String, message: String },

    #[error("Failed to delete message {message_id} from {queue_url}: {message}")]
    AcknowledgeFailed {
        queue_url: String,
        message_id: String,
        message: String,
    },
}

impl QueueError {
    /// Create an address resolution error
    pub fn address_resolution(queue_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::AddressResolution {
            queue_name: queue_name.into(),
            message: message.into(),
        }
    }

    /// Create a receive error
    pub fn receive_failed(queue_url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ReceiveFailed {
            queue_url: queue_url.into(),
            message: message.into(),
        }
    }

    /// Create an acknowledge (delete) error
    pub fn acknowledge_failed(
        queue_url: impl Into<String>,
        message_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::AcknowledgeFailed {
            queue_url: queue_url.into(),
            message_id: message_id.into(),
            message: message.into(),
        }
    }

    /// Attach the ID of the message a failed delete was issued for
    ///
    /// Clients only see the receipt handle, so the caller fills in the ID.
    pub fn with_message_id(self, id: impl Into<String>) -> Self {
        match self {
            Self::AcknowledgeFailed {
                queue_url, message, ..
            } => Self::AcknowledgeFailed {
                queue_url,
                message_id: id.into(),
                message,
            },
            other => other,
        }
    }

    /// Short operation name, used as a structured log field
    pub fn operation(&self) -> &'static str {
        match self {
            Self::AddressResolution { .. } => "get_queue_url",
            Self::ReceiveFailed { .. } => "receive_message",
            Self::AcknowledgeFailed { .. } => "delete_message",
        }
    }
}

/// Payload could not be decoded into a [`DecodedRecord`](super::DecodedRecord)
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Message deserialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Message body is a JSON {found}, expected an object")]
    NotAnObject { found: &'static str },
}

impl DecodeError {
    /// Line of the payload where parsing stopped, for syntax and type errors
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Json(source) => Some(source.line()),
            Self::NotAnObject { .. } => None,
        }
    }

    /// Column of the payload where parsing stopped, for syntax and type errors
    pub fn column(&self) -> Option<usize> {
        match self {
            Self::Json(source) => Some(source.column()),
            Self::NotAnObject { .. } => None,
        }
    }
}

/// Result type alias for queue operations
pub type QueueResult<T> = Result<T, QueueError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_includes_context() {
        let err = QueueError::address_resolution("orders", "queue does not exist");
        assert_eq!(
            err.to_string(),
            "Failed to resolve queue URL for orders: queue does not exist"
        );

        let err = QueueError::acknowledge_failed("http://localhost:4566/000/orders", "m-1", "boom");
        assert!(err.to_string().contains("m-1"));
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn test_with_message_id_only_touches_acknowledge_errors() {
        let err = QueueError::acknowledge_failed("u", "", "throttled").with_message_id("m-7");
        assert_eq!(
            err,
            QueueError::acknowledge_failed("u", "m-7", "throttled")
        );
        assert!(err.to_string().starts_with("Failed to delete message m-7 from u"));

        let err = QueueError::receive_failed("u", "x").with_message_id("m-7");
        assert_eq!(err, QueueError::receive_failed("u", "x"));
    }

    #[test]
    fn test_operation_names() {
        assert_eq!(
            QueueError::address_resolution("q", "x").operation(),
            "get_queue_url"
        );
        assert_eq!(QueueError::receive_failed("u", "x").operation(), "receive_message");
        assert_eq!(
            QueueError::acknowledge_failed("u", "id", "x").operation(),
            "delete_message"
        );
    }
}
