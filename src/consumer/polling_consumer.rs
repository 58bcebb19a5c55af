//! # Polling Consumer
//!
//! Runs one receive → decode → log → delete cycle against a queue.
//!
//! A received message is always deleted, whether or not its body decodes.
//! This is at-most-once observation with a best-effort log: a payload that
//! cannot be decoded is reported and then dropped. Redelivery only happens
//! when the delete itself fails, in which case the queue service makes the
//! message visible again once its visibility timeout elapses.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::QueueConfig;
use crate::logging::log_message_operation;
use crate::messaging::{DecodedRecord, MessageCodec, QueueClient, QueueResult};

/// Result of a successful cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// A message was received and deleted
    Processed {
        message_id: String,
        /// `None` when the body failed to decode
        record: Option<DecodedRecord>,
    },
    /// The queue returned no message
    Empty,
}

/// Runtime statistics for the polling consumer
#[derive(Debug, Default)]
pub struct ConsumerStats {
    /// Cycles started
    pub cycles: AtomicU64,
    /// Messages received and deleted
    pub messages_processed: AtomicU64,
    /// Bodies that failed to decode
    pub decode_failures: AtomicU64,
    /// Receives that returned nothing
    pub empty_polls: AtomicU64,
    /// Cycles that ended with a queue error
    pub errors: AtomicU64,
}

/// Executes receive-process-acknowledge cycles against one queue
pub struct PollingConsumer {
    consumer_id: Uuid,
    config: QueueConfig,
    client: Arc<dyn QueueClient>,
    stats: ConsumerStats,
}

impl std::fmt::Debug for PollingConsumer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollingConsumer")
            .field("consumer_id", &self.consumer_id)
            .field("config", &self.config)
            .field("client_type", &self.client.client_type())
            .finish()
    }
}

impl PollingConsumer {
    pub fn new(config: QueueConfig, client: Arc<dyn QueueClient>) -> Self {
        let consumer_id = Uuid::new_v4();

        info!(
            consumer_id = %consumer_id,
            queue = %config.queue_name,
            visibility_timeout = config.visibility_timeout_seconds,
            client_type = client.client_type(),
            "Creating PollingConsumer"
        );

        Self {
            consumer_id,
            config,
            client,
            stats: ConsumerStats::default(),
        }
    }

    /// Run exactly one cycle
    pub async fn run_cycle(&self) -> QueueResult<CycleOutcome> {
        self.stats.cycles.fetch_add(1, Ordering::Relaxed);

        let result = self.process_next().await;
        if result.is_err() {
            self.stats.errors.fetch_add(1, Ordering::Relaxed);
        }
        result
    }

    async fn process_next(&self) -> QueueResult<CycleOutcome> {
        let queue_url = self
            .client
            .resolve_queue_url(&self.config.queue_name)
            .await?;

        let messages = self
            .client
            .receive_messages(
                &queue_url,
                self.config.max_messages,
                self.config.visibility_timeout_seconds,
                self.config.wait_time_seconds,
            )
            .await?;

        // At most one message is requested per cycle
        let Some(message) = messages.into_iter().next() else {
            debug!(consumer_id = %self.consumer_id, queue = %self.config.queue_name, "No messages available");
            self.stats.empty_polls.fetch_add(1, Ordering::Relaxed);
            return Ok(CycleOutcome::Empty);
        };

        info!(
            consumer_id = %self.consumer_id,
            message_id = %message.id,
            body = %message.body,
            attributes = message.attributes.len(),
            "Message received"
        );

        let record = match MessageCodec::decode(&message.body) {
            Ok(record) => {
                info!(
                    message_id = %message.id,
                    id = %record.id,
                    name = %record.name,
                    status = %record.status,
                    "Decoded message"
                );
                Some(record)
            }
            Err(e) => {
                warn!(
                    message_id = %message.id,
                    error = %e,
                    "Failed to decode message body"
                );
                self.stats.decode_failures.fetch_add(1, Ordering::Relaxed);
                None
            }
        };

        self.client
            .delete_message(&queue_url, &message.receipt_handle)
            .await
            .map_err(|e| e.with_message_id(&message.id))?;

        log_message_operation(
            "delete_message",
            &self.config.queue_name,
            Some(&message.id),
            "deleted",
            None,
        );
        self.stats.messages_processed.fetch_add(1, Ordering::Relaxed);

        Ok(CycleOutcome::Processed {
            message_id: message.id,
            record,
        })
    }

    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    pub fn stats(&self) -> &ConsumerStats {
        &self.stats
    }

    pub fn consumer_id(&self) -> Uuid {
        self.consumer_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::{InMemoryQueueClient, QueueError};

    fn consumer(client: &Arc<InMemoryQueueClient>) -> PollingConsumer {
        PollingConsumer::new(QueueConfig::new("orders"), client.clone())
    }

    #[tokio::test]
    async fn test_processes_well_formed_message() {
        let client = Arc::new(InMemoryQueueClient::new());
        let id = client.send_message("orders", r#"{"id":"42","name":"widget","status":"NEW"}"#);
        let consumer = consumer(&client);

        let outcome = consumer.run_cycle().await.unwrap();

        assert_eq!(
            outcome,
            CycleOutcome::Processed {
                message_id: id,
                record: Some(DecodedRecord {
                    id: "42".to_string(),
                    name: "widget".to_string(),
                    status: "NEW".to_string(),
                }),
            }
        );
        assert_eq!(client.message_count("orders"), 0);
        assert_eq!(consumer.stats().messages_processed.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_undecodable_message_is_still_deleted() {
        let client = Arc::new(InMemoryQueueClient::new());
        client.send_message("orders", "not-json");
        let consumer = consumer(&client);

        let outcome = consumer.run_cycle().await.unwrap();

        assert!(matches!(
            outcome,
            CycleOutcome::Processed { record: None, .. }
        ));
        assert_eq!(client.deleted_receipt_handles().len(), 1);
        assert_eq!(consumer.stats().decode_failures.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_empty_queue_issues_no_delete() {
        let client = Arc::new(InMemoryQueueClient::new());
        client.create_queue("orders");
        let consumer = consumer(&client);

        assert_eq!(consumer.run_cycle().await.unwrap(), CycleOutcome::Empty);
        assert_eq!(client.stats().delete_calls.load(Ordering::Relaxed), 0);
        assert_eq!(consumer.stats().empty_polls.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_resolution_failure_has_no_side_effects() {
        let client = Arc::new(InMemoryQueueClient::new());
        client.send_message("orders", "{}");
        client.fail_resolve(true);
        let consumer = consumer(&client);

        let err = consumer.run_cycle().await.unwrap_err();

        assert!(matches!(err, QueueError::AddressResolution { .. }));
        assert_eq!(client.stats().receive_calls.load(Ordering::Relaxed), 0);
        assert_eq!(client.visible_count("orders"), 1);
        assert_eq!(consumer.stats().errors.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_receive_failure_is_surfaced() {
        let client = Arc::new(InMemoryQueueClient::new());
        client.create_queue("orders");
        client.fail_receive(true);

        let err = consumer(&client).run_cycle().await.unwrap_err();
        assert!(matches!(err, QueueError::ReceiveFailed { .. }));
    }

    #[tokio::test]
    async fn test_delete_failure_is_surfaced() {
        let client = Arc::new(InMemoryQueueClient::new());
        let id = client.send_message("orders", r#"{"id":"1"}"#);
        client.fail_delete(true);
        let consumer = consumer(&client);

        let err = consumer.run_cycle().await.unwrap_err();

        match &err {
            QueueError::AcknowledgeFailed { message_id, .. } => assert_eq!(message_id, &id),
            other => panic!("expected AcknowledgeFailed, got {other:?}"),
        }
        assert!(err.to_string().contains(&format!("Failed to delete message {id} ")));
        assert_eq!(client.message_count("orders"), 1);
        assert_eq!(consumer.stats().messages_processed.load(Ordering::Relaxed), 0);
    }
}
