//! # In-Memory Queue Client
//!
//! Process-local [`QueueClient`] for tests and offline runs. Messages are held
//! per queue with SQS-like visibility timeout semantics, and individual
//! operations can be made to fail to exercise the consumer's error paths.
//!
//! ## Usage
//!
//! ```rust
//! use sqs_consumer::messaging::{InMemoryQueueClient, QueueClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = InMemoryQueueClient::new();
//! client.create_queue("orders");
//! client.send_message("orders", r#"{"id":"42","name":"widget","status":"NEW"}"#);
//!
//! let url = client.resolve_queue_url("orders").await?;
//! let messages = client.receive_messages(&url, 1, 30, 0).await?;
//! client.delete_message(&url, &messages[0].receipt_handle).await?;
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use uuid::Uuid;

use super::traits::QueueClient;
use crate::messaging::{
    errors::{QueueError, QueueResult},
    message::InboundMessage,
};

const URL_PREFIX: &str = "memory://queue/";

/// Message wrapper for in-memory storage with metadata
#[derive(Debug, Clone)]
struct StoredMessage {
    id: String,
    body: String,
    /// Receipt handle of the current delivery, if any
    receipt_handle: Option<String>,
    invisible_until: Option<DateTime<Utc>>,
    receive_count: u32,
}

impl StoredMessage {
    fn is_visible(&self, now: DateTime<Utc>) -> bool {
        self.invisible_until.map(|until| until <= now).unwrap_or(true)
    }
}

/// Operations that can be forced to fail
#[derive(Debug, Default)]
struct FaultInjection {
    resolve: AtomicBool,
    receive: AtomicBool,
    delete: AtomicBool,
}

/// Call counters, used by tests to assert on side effects
#[derive(Debug, Default)]
pub struct InMemoryClientStats {
    pub resolve_calls: AtomicU64,
    pub receive_calls: AtomicU64,
    pub delete_calls: AtomicU64,
}

/// In-memory client implementation
#[derive(Debug, Default)]
pub struct InMemoryQueueClient {
    queues: DashMap<String, Mutex<VecDeque<StoredMessage>>>,
    faults: FaultInjection,
    deleted_handles: Mutex<Vec<String>>,
    stats: InMemoryClientStats,
}

impl InMemoryQueueClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn queue_url(queue_name: &str) -> String {
        format!("{URL_PREFIX}{queue_name}")
    }

    fn queue_name(queue_url: &str) -> &str {
        queue_url.strip_prefix(URL_PREFIX).unwrap_or(queue_url)
    }

    /// Create queue if it doesn't exist
    pub fn create_queue(&self, queue_name: &str) {
        self.queues.entry(queue_name.to_string()).or_default();
    }

    /// Enqueue a body, creating the queue if needed. Returns the message ID.
    pub fn send_message(&self, queue_name: &str, body: impl Into<String>) -> String {
        let id = Uuid::new_v4().to_string();
        let queue = self.queues.entry(queue_name.to_string()).or_default();
        queue.lock().push_back(StoredMessage {
            id: id.clone(),
            body: body.into(),
            receipt_handle: None,
            invisible_until: None,
            receive_count: 0,
        });
        id
    }

    /// Number of messages stored in a queue, visible or in flight
    pub fn message_count(&self, queue_name: &str) -> usize {
        self.queues
            .get(queue_name)
            .map(|queue| queue.lock().len())
            .unwrap_or(0)
    }

    /// Number of messages currently visible to a receive
    pub fn visible_count(&self, queue_name: &str) -> usize {
        let now = Utc::now();
        self.queues
            .get(queue_name)
            .map(|queue| queue.lock().iter().filter(|m| m.is_visible(now)).count())
            .unwrap_or(0)
    }

    /// Receipt handles accepted by `delete_message`, in call order
    pub fn deleted_receipt_handles(&self) -> Vec<String> {
        self.deleted_handles.lock().clone()
    }

    pub fn stats(&self) -> &InMemoryClientStats {
        &self.stats
    }

    pub fn fail_resolve(&self, fail: bool) {
        self.faults.resolve.store(fail, Ordering::SeqCst);
    }

    pub fn fail_receive(&self, fail: bool) {
        self.faults.receive.store(fail, Ordering::SeqCst);
    }

    pub fn fail_delete(&self, fail: bool) {
        self.faults.delete.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl QueueClient for InMemoryQueueClient {
    async fn resolve_queue_url(&self, queue_name: &str) -> QueueResult<String> {
        self.stats.resolve_calls.fetch_add(1, Ordering::Relaxed);

        if self.faults.resolve.load(Ordering::SeqCst) {
            return Err(QueueError::address_resolution(
                queue_name,
                "injected resolve failure",
            ));
        }
        if !self.queues.contains_key(queue_name) {
            return Err(QueueError::address_resolution(
                queue_name,
                "The specified queue does not exist",
            ));
        }
        Ok(Self::queue_url(queue_name))
    }

    async fn receive_messages(
        &self,
        queue_url: &str,
        max_messages: i32,
        visibility_timeout: i32,
        _wait_time_seconds: i32,
    ) -> QueueResult<Vec<InboundMessage>> {
        self.stats.receive_calls.fetch_add(1, Ordering::Relaxed);

        if self.faults.receive.load(Ordering::SeqCst) {
            return Err(QueueError::receive_failed(
                queue_url,
                "injected receive failure",
            ));
        }
        let queue = self
            .queues
            .get(Self::queue_name(queue_url))
            .ok_or_else(|| QueueError::receive_failed(queue_url, "queue does not exist"))?;

        let now = Utc::now();
        let invisible_until = now + Duration::seconds(i64::from(visibility_timeout.max(0)));
        let limit = usize::try_from(max_messages.max(1)).unwrap_or(1);

        let mut messages = queue.lock();
        let received = messages
            .iter_mut()
            .filter(|message| message.is_visible(now))
            .take(limit)
            .map(|message| {
                let handle = Uuid::new_v4().to_string();
                message.receipt_handle = Some(handle.clone());
                message.invisible_until = Some(invisible_until);
                message.receive_count += 1;
                InboundMessage::new(message.id.clone(), message.body.clone(), handle)
                    .with_attribute("ApproximateReceiveCount", message.receive_count.to_string())
            })
            .collect();

        Ok(received)
    }

    async fn delete_message(&self, queue_url: &str, receipt_handle: &str) -> QueueResult<()> {
        self.stats.delete_calls.fetch_add(1, Ordering::Relaxed);

        let queue = self
            .queues
            .get(Self::queue_name(queue_url))
            .ok_or_else(|| QueueError::acknowledge_failed(queue_url, "", "queue does not exist"))?;

        if self.faults.delete.load(Ordering::SeqCst) {
            return Err(QueueError::acknowledge_failed(
                queue_url,
                "",
                "injected delete failure",
            ));
        }

        let mut messages = queue.lock();
        let position = messages
            .iter()
            .position(|message| message.receipt_handle.as_deref() == Some(receipt_handle));

        // Stale handles are accepted silently, matching SQS
        if let Some(index) = position {
            messages.remove(index);
        }
        self.deleted_handles.lock().push(receipt_handle.to_string());
        Ok(())
    }

    fn client_type(&self) -> &'static str {
        "in_memory"
    }
}
