//! # Consumer Constants
//!
//! Defaults and operational bounds shared by configuration, the queue clients
//! and the consumer loop.

/// Default AWS region when none is configured
pub const DEFAULT_REGION: &str = "us-east-1";

/// Default endpoint override, pointing at a local LocalStack instance
pub const DEFAULT_ENDPOINT_URL: &str = "http://localhost:4566";

/// Default visibility timeout applied to received messages
pub const DEFAULT_VISIBILITY_TIMEOUT_SECONDS: i64 = 5;

/// Upper bound of the SQS visibility timeout (12 hours)
pub const MAX_VISIBILITY_TIMEOUT_SECONDS: i32 = 12 * 60 * 60;

/// Upper bound of the SQS long-poll wait time
pub const MAX_WAIT_TIME_SECONDS: i32 = 20;

/// Messages requested per receive call
pub const MAX_MESSAGES_PER_RECEIVE: i32 = 1;

/// Network timeout applied to every queue and search call
pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 30;

/// Default search index created at bootstrap
pub const DEFAULT_SEARCH_INDEX: &str = "messages";

/// Prefix for environment variable overrides
pub const ENV_PREFIX: &str = "SQS_CONSUMER";

/// Process exit codes
pub mod exit_codes {
    /// Clean shutdown after an interrupt
    pub const INTERRUPTED: i32 = 0;
    /// A queue operation failed during a cycle
    pub const QUEUE_FAILURE: i32 = 1;
    /// Configuration could not be resolved at startup
    pub const CONFIGURATION: i32 = 2;
}
