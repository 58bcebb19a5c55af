//! # Messaging Module
//!
//! Queue access and message decoding for the polling consumer.
//!
//! ## Module Structure
//!
//! - `clients` - `QueueClient` trait with SQS and in-memory implementations
//! - `errors` - Queue and decode error types
//! - `message` - Inbound deliveries, decoded records and the codec

pub mod clients;
pub mod errors;
pub mod message;

pub use clients::{InMemoryQueueClient, QueueClient, SqsQueueClient};
pub use errors::{DecodeError, QueueError, QueueResult};
pub use message::{DecodedRecord, InboundMessage, MessageCodec};
