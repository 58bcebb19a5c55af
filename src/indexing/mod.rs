//! # Bootstrap Indexing
//!
//! One-shot search index initialization performed before the consumer loop
//! starts. The indexer is a collaborator: its failures are reported to the
//! caller, which decides whether startup continues.

mod elasticsearch;

pub use elasticsearch::ElasticsearchIndexer;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::config::SearchConfig;

/// Search index bootstrap errors
#[derive(Error, Debug)]
pub enum IndexerError {
    #[error("Search request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid search URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Unexpected status {status} from {operation}: {body}")]
    UnexpectedStatus {
        operation: String,
        status: u16,
        body: String,
    },
}

/// A single no-argument initialization call made at process start
#[async_trait]
pub trait BootstrapIndexer: Send + Sync {
    async fn init(&self) -> Result<(), IndexerError>;

    fn indexer_type(&self) -> &'static str;
}

/// Indexer used when no search service is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopIndexer;

#[async_trait]
impl BootstrapIndexer for NoopIndexer {
    async fn init(&self) -> Result<(), IndexerError> {
        debug!("No search service configured, skipping index bootstrap");
        Ok(())
    }

    fn indexer_type(&self) -> &'static str {
        "noop"
    }
}

/// Pick the indexer for the given search configuration
pub fn indexer_from_config(config: &SearchConfig) -> Result<Box<dyn BootstrapIndexer>, IndexerError> {
    match config.url.as_deref() {
        Some(url) => Ok(Box::new(ElasticsearchIndexer::new(
            url,
            &config.index,
            config.request_timeout,
        )?)),
        None => Ok(Box::new(NoopIndexer)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn search_config(url: Option<&str>) -> SearchConfig {
        SearchConfig {
            url: url.map(str::to_string),
            index: "messages".to_string(),
            request_timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn test_noop_indexer_succeeds() {
        let indexer = indexer_from_config(&search_config(None)).unwrap();
        assert_eq!(indexer.indexer_type(), "noop");
        indexer.init().await.unwrap();
    }

    #[test]
    fn test_configured_url_selects_elasticsearch() {
        let indexer = indexer_from_config(&search_config(Some("http://localhost:9200"))).unwrap();
        assert_eq!(indexer.indexer_type(), "elasticsearch");
    }
}
