//! # Consumer Module
//!
//! The polling consumer, the loop that drives it and the stop signal that
//! ends the loop.

pub mod consumer_loop;
pub mod polling_consumer;
pub mod shutdown;

pub use consumer_loop::{ConsumerLoop, LoopExit};
pub use polling_consumer::{ConsumerStats, CycleOutcome, PollingConsumer};
pub use shutdown::ShutdownSignal;
