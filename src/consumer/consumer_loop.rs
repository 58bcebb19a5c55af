//! # Consumer Loop
//!
//! Drives the [`PollingConsumer`] until the stop signal is observed or a
//! cycle fails. There is no retry or backoff: the first queue error ends the
//! loop. By default the loop busy-polls; a non-zero idle delay pauses after
//! empty cycles.

use std::time::Duration;
use tracing::info;

use super::polling_consumer::{CycleOutcome, PollingConsumer};
use super::shutdown::ShutdownSignal;
use crate::constants::exit_codes;
use crate::logging::log_error;
use crate::messaging::QueueError;

/// Why the loop stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopExit {
    /// The stop signal was observed between cycles
    Interrupted,
    /// A cycle failed with a queue error
    Failed(QueueError),
}

impl LoopExit {
    /// Process exit code for this outcome
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Interrupted => exit_codes::INTERRUPTED,
            Self::Failed(_) => exit_codes::QUEUE_FAILURE,
        }
    }
}

/// Repeatedly runs consumer cycles
#[derive(Debug)]
pub struct ConsumerLoop {
    consumer: PollingConsumer,
    shutdown: ShutdownSignal,
    idle_delay: Duration,
}

impl ConsumerLoop {
    pub fn new(consumer: PollingConsumer, shutdown: ShutdownSignal) -> Self {
        Self {
            consumer,
            shutdown,
            idle_delay: Duration::ZERO,
        }
    }

    /// Pause after every empty cycle
    pub fn with_idle_delay(mut self, idle_delay: Duration) -> Self {
        self.idle_delay = idle_delay;
        self
    }

    /// Run until interrupted or a cycle fails
    pub async fn run(&self) -> LoopExit {
        info!(
            consumer_id = %self.consumer.consumer_id(),
            queue = %self.consumer.config().queue_name,
            idle_delay = ?self.idle_delay,
            "Start listening for incoming messages"
        );

        loop {
            // Let the interrupt listener run even when every cycle completes without blocking
            tokio::task::yield_now().await;

            if self.shutdown.is_triggered() {
                info!(consumer_id = %self.consumer.consumer_id(), "Consumer stopped");
                return LoopExit::Interrupted;
            }

            match self.consumer.run_cycle().await {
                Ok(CycleOutcome::Empty) if !self.idle_delay.is_zero() => {
                    tokio::select! {
                        _ = tokio::time::sleep(self.idle_delay) => {}
                        _ = self.shutdown.triggered() => {}
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    log_error(
                        "consumer_loop",
                        e.operation(),
                        &e.to_string(),
                        Some(&self.consumer.config().queue_name),
                    );
                    return LoopExit::Failed(e);
                }
            }
        }
    }

    pub fn consumer(&self) -> &PollingConsumer {
        &self.consumer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QueueConfig;
    use crate::messaging::InMemoryQueueClient;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    fn consumer_loop(client: &Arc<InMemoryQueueClient>, shutdown: &ShutdownSignal) -> ConsumerLoop {
        let consumer = PollingConsumer::new(QueueConfig::new("orders"), client.clone());
        ConsumerLoop::new(consumer, shutdown.clone())
    }

    #[tokio::test]
    async fn test_stop_signal_before_first_cycle() {
        let client = Arc::new(InMemoryQueueClient::new());
        client.send_message("orders", "{}");
        let shutdown = ShutdownSignal::new();
        shutdown.trigger();

        let exit = consumer_loop(&client, &shutdown).run().await;

        assert_eq!(exit, LoopExit::Interrupted);
        assert_eq!(exit.exit_code(), 0);
        assert_eq!(client.stats().resolve_calls.load(Ordering::Relaxed), 0);
        assert_eq!(client.message_count("orders"), 1);
    }

    #[tokio::test]
    async fn test_delete_failure_stops_loop_with_failure() {
        let client = Arc::new(InMemoryQueueClient::new());
        client.send_message("orders", r#"{"id":"1","name":"a","status":"NEW"}"#);
        client.fail_delete(true);

        let exit = consumer_loop(&client, &ShutdownSignal::new()).run().await;

        assert!(matches!(
            exit,
            LoopExit::Failed(QueueError::AcknowledgeFailed { .. })
        ));
        assert_eq!(exit.exit_code(), 1);
    }

    #[tokio::test]
    async fn test_missing_queue_stops_loop_with_failure() {
        let client = Arc::new(InMemoryQueueClient::new());

        let exit = consumer_loop(&client, &ShutdownSignal::new()).run().await;

        assert!(matches!(
            exit,
            LoopExit::Failed(QueueError::AddressResolution { .. })
        ));
    }

    #[tokio::test]
    async fn test_idle_delay_is_cut_short_by_stop_signal() {
        let client = Arc::new(InMemoryQueueClient::new());
        client.create_queue("orders");
        let shutdown = ShutdownSignal::new();
        let consumer_loop =
            consumer_loop(&client, &shutdown).with_idle_delay(Duration::from_secs(3600));

        let trigger = shutdown.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.trigger();
        });

        let exit = tokio::time::timeout(Duration::from_secs(5), consumer_loop.run())
            .await
            .expect("loop should stop promptly");

        assert_eq!(exit, LoopExit::Interrupted);
        assert_eq!(consumer_loop.consumer().stats().cycles.load(Ordering::Relaxed), 1);
    }
}
