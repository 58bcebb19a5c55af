//! # Queue Client Module
//!
//! Queue client implementations behind the [`QueueClient`] abstraction.
//!
//! ## Structure
//!
//! - `traits.rs` - The `QueueClient` trait consumed by the polling consumer
//! - `sqs_client.rs` - AWS SQS (and LocalStack) implementation
//! - `in_memory_client.rs` - In-memory implementation for testing
//!
//! ## Usage
//!
//! ```rust,no_run
//! use sqs_consumer::config::QueueConfig;
//! use sqs_consumer::messaging::{QueueClient, SqsQueueClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = QueueConfig::new("orders");
//! let client = SqsQueueClient::from_config(&config).await;
//!
//! let url = client.resolve_queue_url(&config.queue_name).await?;
//! let messages = client.receive_messages(&url, 1, 5, 0).await?;
//! # Ok(())
//! # }
//! ```

pub mod in_memory_client;
pub mod sqs_client;
pub mod traits;

// Re-export the main types for convenience
pub use in_memory_client::{InMemoryClientStats, InMemoryQueueClient};
pub use sqs_client::SqsQueueClient;
pub use traits::QueueClient;
