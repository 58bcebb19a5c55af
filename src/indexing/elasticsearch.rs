//! Elasticsearch index bootstrap over the REST API.

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde_json::json;
use std::time::Duration;
use tracing::info;

use super::{BootstrapIndexer, IndexerError};

/// Ensures the configured index exists, creating it with a mapping for the
/// `{id, name, status}` envelope when absent
#[derive(Debug, Clone)]
pub struct ElasticsearchIndexer {
    client: Client,
    index_url: Url,
    index: String,
}

impl ElasticsearchIndexer {
    pub fn new(base_url: &str, index: &str, timeout: Duration) -> Result<Self, IndexerError> {
        let invalid = |reason: String| IndexerError::InvalidUrl {
            url: base_url.to_string(),
            reason,
        };

        let mut index_url = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        // Appended as a segment so a path prefix on the base URL is kept
        index_url
            .path_segments_mut()
            .map_err(|()| invalid("URL cannot be a base".to_string()))?
            .pop_if_empty()
            .push(index);
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            index_url,
            index: index.to_string(),
        })
    }

    fn index_definition() -> serde_json::Value {
        json!({
            "mappings": {
                "properties": {
                    "id": { "type": "keyword" },
                    "name": { "type": "text" },
                    "status": { "type": "keyword" }
                }
            }
        })
    }

    async fn index_exists(&self) -> Result<bool, IndexerError> {
        let response = self.client.head(self.index_url.clone()).send().await?;
        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(IndexerError::UnexpectedStatus {
                operation: "index_exists".to_string(),
                status: status.as_u16(),
                body: String::new(),
            }),
        }
    }

    async fn create_index(&self) -> Result<(), IndexerError> {
        let response = self
            .client
            .put(self.index_url.clone())
            .json(&Self::index_definition())
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        // Another process created it between the check and the create
        if status == StatusCode::BAD_REQUEST && body.contains("resource_already_exists_exception") {
            return Ok(());
        }
        Err(IndexerError::UnexpectedStatus {
            operation: "create_index".to_string(),
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl BootstrapIndexer for ElasticsearchIndexer {
    async fn init(&self) -> Result<(), IndexerError> {
        if self.index_exists().await? {
            info!(index = %self.index, "Search index already exists");
            return Ok(());
        }

        self.create_index().await?;
        info!(index = %self.index, url = %self.index_url, "Created search index");
        Ok(())
    }

    fn indexer_type(&self) -> &'static str {
        "elasticsearch"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn indexer(server: &MockServer) -> ElasticsearchIndexer {
        ElasticsearchIndexer::new(&server.uri(), "messages", Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_existing_index_is_left_alone() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/messages"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        indexer(&server).await.init().await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_index_is_created() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/messages"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"acknowledged": true})))
            .expect(1)
            .mount(&server)
            .await;

        indexer(&server).await.init().await.unwrap();
    }

    #[tokio::test]
    async fn test_concurrent_creation_is_tolerated() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(400).set_body_string(
                r#"{"error":{"type":"resource_already_exists_exception"},"status":400}"#,
            ))
            .mount(&server)
            .await;

        indexer(&server).await.init().await.unwrap();
    }

    #[tokio::test]
    async fn test_server_error_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = indexer(&server).await.init().await.unwrap_err();
        assert!(matches!(
            err,
            IndexerError::UnexpectedStatus { status: 503, .. }
        ));
    }

    #[test]
    fn test_index_url_keeps_base_path() {
        for base in ["http://gw:8080/es", "http://gw:8080/es/"] {
            let indexer = ElasticsearchIndexer::new(base, "messages", Duration::from_secs(1)).unwrap();
            assert_eq!(indexer.index_url.as_str(), "http://gw:8080/es/messages");
        }

        let indexer =
            ElasticsearchIndexer::new("http://localhost:9200", "messages", Duration::from_secs(1))
                .unwrap();
        assert_eq!(indexer.index_url.as_str(), "http://localhost:9200/messages");
    }

    #[tokio::test]
    async fn test_index_created_behind_path_prefix() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/search/messages"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/search/messages"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let base = format!("{}/search", server.uri());
        ElasticsearchIndexer::new(&base, "messages", Duration::from_secs(5))
            .unwrap()
            .init()
            .await
            .unwrap();
    }

    #[test]
    fn test_invalid_base_url() {
        let err = ElasticsearchIndexer::new("not a url", "messages", Duration::from_secs(1))
            .unwrap_err();
        assert!(matches!(err, IndexerError::InvalidUrl { .. }));
    }
}
