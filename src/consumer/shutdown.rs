//! Cooperative stop signal shared between the interrupt listener and the consumer loop.

use std::future::Future;
use std::io;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Cloneable stop flag; once triggered it stays triggered
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Request a stop
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once the signal has been triggered
    pub async fn triggered(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives as long as self, so this cannot fail
        let _ = rx.wait_for(|triggered| *triggered).await;
    }

    /// Trigger this signal on the first Ctrl-C / SIGINT
    pub fn listen_for_interrupt(&self) -> JoinHandle<()> {
        self.trigger_on(tokio::signal::ctrl_c())
    }

    /// Trigger once `interrupt` resolves successfully
    ///
    /// A listener that fails to install leaves the signal untouched, so the
    /// loop keeps running instead of reporting an interrupt that never happened.
    pub fn trigger_on<F>(&self, interrupt: F) -> JoinHandle<()>
    where
        F: Future<Output = io::Result<()>> + Send + 'static,
    {
        let signal = self.clone();
        tokio::spawn(async move {
            match interrupt.await {
                Ok(()) => {
                    info!("Interrupt received, stopping after the current cycle");
                    signal.trigger();
                }
                Err(e) => warn!(error = %e, "Failed to listen for interrupt signal"),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_trigger_is_visible_to_clones() {
        let signal = ShutdownSignal::new();
        let clone = signal.clone();
        assert!(!clone.is_triggered());

        signal.trigger();
        assert!(clone.is_triggered());
    }

    #[tokio::test]
    async fn test_triggered_resolves_after_trigger() {
        let signal = ShutdownSignal::new();
        let waiter = signal.clone();
        let handle = tokio::spawn(async move { waiter.triggered().await });

        signal.trigger();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("waiter should resolve")
            .unwrap();
    }

    #[tokio::test]
    async fn test_interrupt_triggers_signal() {
        let signal = ShutdownSignal::new();
        signal.trigger_on(async { Ok(()) }).await.unwrap();
        assert!(signal.is_triggered());
    }

    #[tokio::test]
    async fn test_failed_listener_leaves_signal_untriggered() {
        let signal = ShutdownSignal::new();
        signal
            .trigger_on(async { Err(io::Error::other("signal handler unavailable")) })
            .await
            .unwrap();
        assert!(!signal.is_triggered());
    }

    #[tokio::test]
    async fn test_triggered_resolves_immediately_when_already_set() {
        let signal = ShutdownSignal::new();
        signal.trigger();
        tokio::time::timeout(Duration::from_millis(100), signal.triggered())
            .await
            .expect("already triggered");
    }
}
