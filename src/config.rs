//! # Consumer Configuration
//!
//! Settings are layered with the `config` crate: an optional TOML file, then
//! `SQS_CONSUMER_*` environment variables, then command-line overrides. The
//! merged [`ConsumerSettings`] are validated once into an immutable
//! [`ConsumerConfig`] that is passed explicitly into the consumer.

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use crate::constants::{
    DEFAULT_ENDPOINT_URL, DEFAULT_REGION, DEFAULT_REQUEST_TIMEOUT_SECONDS, DEFAULT_SEARCH_INDEX,
    DEFAULT_VISIBILITY_TIMEOUT_SECONDS, ENV_PREFIX, MAX_MESSAGES_PER_RECEIVE,
    MAX_VISIBILITY_TIMEOUT_SECONDS, MAX_WAIT_TIME_SECONDS,
};
use crate::error::ConfigError;

/// Clamp a requested visibility timeout into `[0, 43200]` seconds
pub fn clamp_visibility_timeout(seconds: i64) -> i32 {
    // Lossless: the clamped value always fits in i32
    seconds.clamp(0, i64::from(MAX_VISIBILITY_TIMEOUT_SECONDS)) as i32
}

/// Clamp a requested long-poll wait time into `[0, 20]` seconds
pub fn clamp_wait_time(seconds: i64) -> i32 {
    seconds.clamp(0, i64::from(MAX_WAIT_TIME_SECONDS)) as i32
}

/// Raw, merged settings before validation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsumerSettings {
    #[serde(default = "default_region")]
    pub region: String,

    /// Queue name; required
    #[serde(default)]
    pub queue: Option<String>,

    /// Requested visibility timeout in seconds, clamped on validation
    #[serde(default = "default_timeout")]
    pub timeout: i64,

    /// Endpoint override; an empty value uses the regular AWS endpoint
    #[serde(default = "default_endpoint_url")]
    pub endpoint_url: String,

    #[serde(default)]
    pub wait_time_seconds: i64,

    /// Delay after an empty poll; zero keeps the loop busy-polling
    #[serde(default)]
    pub idle_delay_ms: u64,

    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,

    /// Search service base URL; bootstrap indexing is skipped when unset
    #[serde(default)]
    pub search_url: Option<String>,

    #[serde(default = "default_search_index")]
    pub search_index: String,
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

fn default_timeout() -> i64 {
    DEFAULT_VISIBILITY_TIMEOUT_SECONDS
}

fn default_endpoint_url() -> String {
    DEFAULT_ENDPOINT_URL.to_string()
}

fn default_request_timeout_seconds() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECONDS
}

fn default_search_index() -> String {
    DEFAULT_SEARCH_INDEX.to_string()
}

/// Command-line values that take precedence over file and environment
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub region: Option<String>,
    pub queue: Option<String>,
    pub timeout: Option<i64>,
    pub endpoint_url: Option<String>,
    pub wait_time_seconds: Option<i64>,
    pub idle_delay_ms: Option<i64>,
    pub request_timeout_seconds: Option<i64>,
    pub search_url: Option<String>,
    pub search_index: Option<String>,
}

/// Queue parameters for the polling consumer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueConfig {
    pub region: String,
    pub queue_name: String,
    /// Always within `[0, 43200]`
    pub visibility_timeout_seconds: i32,
    pub endpoint_url: Option<String>,
    /// Always within `[0, 20]`
    pub wait_time_seconds: i32,
    pub max_messages: i32,
    pub request_timeout: Duration,
}

impl QueueConfig {
    /// Queue configuration with default settings for the given queue name
    pub fn new(queue_name: impl Into<String>) -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            queue_name: queue_name.into(),
            visibility_timeout_seconds: clamp_visibility_timeout(
                DEFAULT_VISIBILITY_TIMEOUT_SECONDS,
            ),
            endpoint_url: Some(DEFAULT_ENDPOINT_URL.to_string()),
            wait_time_seconds: 0,
            max_messages: MAX_MESSAGES_PER_RECEIVE,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECONDS),
        }
    }

    pub fn with_visibility_timeout(mut self, seconds: i64) -> Self {
        self.visibility_timeout_seconds = clamp_visibility_timeout(seconds);
        self
    }

    pub fn with_wait_time(mut self, seconds: i64) -> Self {
        self.wait_time_seconds = clamp_wait_time(seconds);
        self
    }
}

/// Bootstrap search index settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    pub url: Option<String>,
    pub index: String,
    pub request_timeout: Duration,
}

/// Validated configuration for the whole process
#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    pub queue: QueueConfig,
    pub search: SearchConfig,
    pub idle_delay: Duration,
}

impl ConsumerConfig {
    /// Load from an optional file, the process environment and CLI overrides
    pub fn load(
        config_file: Option<&Path>,
        overrides: &ConfigOverrides,
    ) -> Result<Self, ConfigError> {
        Self::load_with_env(config_file, overrides, None)
    }

    /// Load with an explicit environment map instead of the process environment
    ///
    /// This is useful for testing without modifying global environment variables
    pub fn load_with_env(
        config_file: Option<&Path>,
        overrides: &ConfigOverrides,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        if let Some(path) = config_file {
            builder = builder.add_source(File::from(path).required(true));
        }

        let settings: ConsumerSettings = builder
            // Values stay strings; serde converts the numeric fields
            .add_source(Environment::with_prefix(ENV_PREFIX).source(env))
            .set_override_option("region", overrides.region.clone())?
            .set_override_option("queue", overrides.queue.clone())?
            .set_override_option("timeout", overrides.timeout)?
            .set_override_option("endpoint_url", overrides.endpoint_url.clone())?
            .set_override_option("wait_time_seconds", overrides.wait_time_seconds)?
            .set_override_option("idle_delay_ms", overrides.idle_delay_ms)?
            .set_override_option(
                "request_timeout_seconds",
                overrides.request_timeout_seconds,
            )?
            .set_override_option("search_url", overrides.search_url.clone())?
            .set_override_option("search_index", overrides.search_index.clone())?
            .build()?
            .try_deserialize()?;

        Self::from_settings(settings)
    }

    /// Validate merged settings
    pub fn from_settings(settings: ConsumerSettings) -> Result<Self, ConfigError> {
        let queue_name = settings
            .queue
            .filter(|queue| !queue.is_empty())
            .ok_or(ConfigError::MissingQueueName)?;

        let endpoint_url = validate_url(&settings.endpoint_url)?;
        let search_url = match settings.search_url.as_deref() {
            Some(url) => validate_url(url)?,
            None => None,
        };
        let wait_time_seconds = clamp_wait_time(settings.wait_time_seconds);
        // A receive must be able to outlast its long-poll wait
        if settings.request_timeout_seconds <= wait_time_seconds as u64 {
            return Err(ConfigError::InvalidValue {
                key: "request_timeout_seconds",
                reason: format!(
                    "{} must be greater than the wait time of {wait_time_seconds}s",
                    settings.request_timeout_seconds
                ),
            });
        }
        let request_timeout = Duration::from_secs(settings.request_timeout_seconds);

        Ok(Self {
            queue: QueueConfig {
                region: settings.region,
                queue_name,
                visibility_timeout_seconds: clamp_visibility_timeout(settings.timeout),
                endpoint_url,
                wait_time_seconds,
                max_messages: MAX_MESSAGES_PER_RECEIVE,
                request_timeout,
            },
            search: SearchConfig {
                url: search_url,
                index: settings.search_index,
                request_timeout,
            },
            idle_delay: Duration::from_millis(settings.idle_delay_ms),
        })
    }
}

/// Empty means "not set"; anything else must be an absolute http(s) URL
fn validate_url(url: &str) -> Result<Option<String>, ConfigError> {
    if url.is_empty() {
        return Ok(None);
    }
    let parsed = reqwest::Url::parse(url).map_err(|e| ConfigError::InvalidEndpoint {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(Some(url.to_string())),
        scheme => Err(ConfigError::InvalidEndpoint {
            url: url.to_string(),
            reason: format!("unsupported scheme {scheme}"),
        }),
    }
}
