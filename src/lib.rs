#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # SQS Consumer
//!
//! Polling consumer for AWS SQS and SQS-compatible services such as LocalStack.
//!
//! ## Overview
//!
//! Each cycle resolves the queue URL, receives at most one message, decodes
//! its `{id, name, status}` JSON body, logs the fields and deletes the
//! message. A body that fails to decode is logged and still deleted. The
//! loop runs until the process is interrupted (exit status 0) or a queue
//! operation fails (exit status 1); there is no retry or backoff.
//!
//! ## Module Organization
//!
//! - [`config`] - Layered configuration (file, environment, CLI)
//! - [`messaging`] - Queue clients, message types and decoding
//! - [`consumer`] - Polling consumer, consumer loop and stop signal
//! - [`indexing`] - Search index bootstrap run at startup
//! - [`logging`] - Structured logging setup
//! - [`error`] - Top-level error types
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use sqs_consumer::config::QueueConfig;
//! use sqs_consumer::consumer::{CycleOutcome, PollingConsumer};
//! use sqs_consumer::messaging::InMemoryQueueClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Arc::new(InMemoryQueueClient::new());
//! client.send_message("orders", r#"{"id":"42","name":"widget","status":"NEW"}"#);
//!
//! let consumer = PollingConsumer::new(QueueConfig::new("orders"), client);
//! let outcome = consumer.run_cycle().await?;
//! assert!(matches!(outcome, CycleOutcome::Processed { .. }));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod consumer;
pub mod error;
pub mod indexing;
pub mod logging;
pub mod messaging;

pub use self::config::{ConsumerConfig, QueueConfig};
pub use consumer::{ConsumerLoop, CycleOutcome, LoopExit, PollingConsumer, ShutdownSignal};
pub use error::{ConfigError, ConsumerError, Result};
pub use messaging::{DecodedRecord, InboundMessage, MessageCodec, QueueClient, QueueError};
