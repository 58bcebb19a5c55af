//! # SQS Queue Client
//!
//! [`QueueClient`] backed by `aws-sdk-sqs`. The underlying SDK client is built
//! once from the [`QueueConfig`] and reused for every cycle. An endpoint
//! override points it at LocalStack or another SQS-compatible service.

use async_trait::async_trait;
use aws_config::{timeout::TimeoutConfig, BehaviorVersion, Region};
use aws_sdk_sqs::{error::DisplayErrorContext, types::Message as SqsMessage, Client};
use std::collections::HashMap;
use tracing::{debug, info};

use super::traits::QueueClient;
use crate::config::QueueConfig;
use crate::messaging::{
    errors::{QueueError, QueueResult},
    message::InboundMessage,
};

/// Request every message attribute on receive
const ALL_ATTRIBUTES: &str = "All";

impl From<&SqsMessage> for InboundMessage {
    fn from(msg: &SqsMessage) -> Self {
        let attributes: HashMap<String, String> = msg
            .message_attributes()
            .map(|attrs| {
                attrs
                    .iter()
                    .filter_map(|(key, value)| {
                        value
                            .string_value()
                            .map(|value| (key.clone(), value.to_string()))
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            id: msg.message_id().unwrap_or_default().to_string(),
            body: msg.body().unwrap_or_default().to_string(),
            receipt_handle: msg.receipt_handle().unwrap_or_default().to_string(),
            attributes,
        }
    }
}

/// aws-sdk-sqs based queue client
#[derive(Debug, Clone)]
pub struct SqsQueueClient {
    client: Client,
}

impl SqsQueueClient {
    /// Build the SDK client from the default credential chain and the consumer configuration
    pub async fn from_config(config: &QueueConfig) -> Self {
        let timeouts = TimeoutConfig::builder()
            .operation_timeout(config.request_timeout)
            .build();

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .timeout_config(timeouts);

        if let Some(ref endpoint) = config.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }

        let sdk_config = loader.load().await;

        info!(
            region = %config.region,
            endpoint = config.endpoint_url.as_deref().unwrap_or("default"),
            request_timeout = ?config.request_timeout,
            "Created SQS client"
        );

        Self {
            client: Client::new(&sdk_config),
        }
    }
}

#[async_trait]
impl QueueClient for SqsQueueClient {
    async fn resolve_queue_url(&self, queue_name: &str) -> QueueResult<String> {
        debug!(queue = %queue_name, "Resolving queue URL");

        let output = self
            .client
            .get_queue_url()
            .queue_name(queue_name)
            .send()
            .await
            .map_err(|e| {
                QueueError::address_resolution(queue_name, DisplayErrorContext(&e).to_string())
            })?;

        output
            .queue_url()
            .map(str::to_string)
            .ok_or_else(|| QueueError::address_resolution(queue_name, "response had no queue URL"))
    }

    async fn receive_messages(
        &self,
        queue_url: &str,
        max_messages: i32,
        visibility_timeout: i32,
        wait_time_seconds: i32,
    ) -> QueueResult<Vec<InboundMessage>> {
        let output = self
            .client
            .receive_message()
            .queue_url(queue_url)
            .max_number_of_messages(max_messages)
            .visibility_timeout(visibility_timeout)
            .wait_time_seconds(wait_time_seconds)
            .message_attribute_names(ALL_ATTRIBUTES)
            .send()
            .await
            .map_err(|e| QueueError::receive_failed(queue_url, DisplayErrorContext(&e).to_string()))?;

        let messages: Vec<InboundMessage> =
            output.messages().iter().map(InboundMessage::from).collect();

        debug!(
            queue_url = %queue_url,
            count = messages.len(),
            "Received messages"
        );
        Ok(messages)
    }

    async fn delete_message(&self, queue_url: &str, receipt_handle: &str) -> QueueResult<()> {
        self.client
            .delete_message()
            .queue_url(queue_url)
            .receipt_handle(receipt_handle)
            .send()
            .await
            .map_err(|e| {
                QueueError::acknowledge_failed(queue_url, "", DisplayErrorContext(&e).to_string())
            })?;

        Ok(())
    }

    fn client_type(&self) -> &'static str {
        "sqs"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_sqs::types::MessageAttributeValue;

    #[test]
    fn test_inbound_message_from_sdk_message() {
        let attribute = MessageAttributeValue::builder()
            .data_type("String")
            .string_value("web")
            .build()
            .unwrap();
        let sdk_message = SqsMessage::builder()
            .message_id("m-1")
            .receipt_handle("rh-1")
            .body(r#"{"id":"42"}"#)
            .message_attributes("source", attribute)
            .build();

        let message = InboundMessage::from(&sdk_message);

        assert_eq!(message.id, "m-1");
        assert_eq!(message.receipt_handle, "rh-1");
        assert_eq!(message.body, r#"{"id":"42"}"#);
        assert_eq!(message.attributes.get("source"), Some(&"web".to_string()));
    }

    #[test]
    fn test_inbound_message_from_sparse_sdk_message() {
        let message = InboundMessage::from(&SqsMessage::builder().build());

        assert!(message.id.is_empty());
        assert!(message.body.is_empty());
        assert!(message.attributes.is_empty());
    }
}
