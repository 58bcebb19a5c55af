use async_trait::async_trait;

use crate::messaging::{errors::QueueResult, message::InboundMessage};

/// Abstraction over the queue service consumed by the polling consumer
///
/// Implementations own the wire protocol. The consumer only needs address
/// resolution, bounded receive and delete-by-receipt-handle.
#[async_trait]
pub trait QueueClient: Send + Sync {
    /// Resolve a queue name to the URL used by the other operations
    async fn resolve_queue_url(&self, queue_name: &str) -> QueueResult<String>;

    /// Receive up to `max_messages` messages, hiding them for `visibility_timeout` seconds
    ///
    /// `wait_time_seconds` of zero returns immediately when the queue is empty.
    async fn receive_messages(
        &self,
        queue_url: &str,
        max_messages: i32,
        visibility_timeout: i32,
        wait_time_seconds: i32,
    ) -> QueueResult<Vec<InboundMessage>>;

    /// Delete (acknowledge) a delivery using its receipt handle
    async fn delete_message(&self, queue_url: &str, receipt_handle: &str) -> QueueResult<()>;

    /// Get client type for debugging/observability
    fn client_type(&self) -> &'static str;
}
