//! SQS-compatible queue client

use crate::adapters::queue::MessageQueue;
use crate::config::QueueConfig;
use crate::domain::{QueueError, QueueMessage};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_sqs::config::Credentials;
use aws_sdk_sqs::error::DisplayErrorContext;
use aws_sdk_sqs::Client;
use secrecy::ExposeSecret;

/// Queue URL for `queue_name` on `endpoint_url`
pub fn queue_url(endpoint_url: &str, queue_name: &str) -> String {
    format!(
        "{}/{}",
        endpoint_url.trim_end_matches('/'),
        queue_name.trim_start_matches('/')
    )
}

/// Queue client for SQS and SQS-compatible endpoints (e.g. LocalStack)
pub struct SqsQueue {
    client: Client,
    queue_url: String,
}

impl SqsQueue {
    /// Build a client for `queue_name` on `endpoint_url`
    ///
    /// Static credentials are used when configured; otherwise the default
    /// provider chain applies.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::ConnectionFailed`] if the endpoint or queue name is empty.
    pub async fn connect(
        config: &QueueConfig,
        endpoint_url: &str,
        queue_name: &str,
    ) -> Result<Self, QueueError> {
        if endpoint_url.trim().is_empty() {
            return Err(QueueError::ConnectionFailed(
                "endpoint URL cannot be empty".to_string(),
            ));
        }
        if queue_name.trim().is_empty() {
            return Err(QueueError::ConnectionFailed(
                "queue name cannot be empty".to_string(),
            ));
        }

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .endpoint_url(endpoint_url);

        if let (Some(key_id), Some(secret)) = (&config.access_key_id, &config.secret_access_key) {
            loader = loader.credentials_provider(Credentials::new(
                key_id.clone(),
                secret.expose_secret().as_ref().to_string(),
                None,
                None,
                "veil-config",
            ));
        }

        let sdk_config = loader.load().await;
        let queue_url = queue_url(endpoint_url, queue_name);

        tracing::info!(queue_url = %queue_url, region = %config.region, "Queue client ready");

        Ok(Self {
            client: Client::new(&sdk_config),
            queue_url,
        })
    }

    pub fn queue_url(&self) -> &str {
        &self.queue_url
    }
}

#[async_trait]
impl MessageQueue for SqsQueue {
    async fn fetch_batch(
        &self,
        max_messages: u32,
        wait_time_seconds: u32,
    ) -> Result<Vec<QueueMessage>, QueueError> {
        let output = self
            .client
            .receive_message()
            .queue_url(&self.queue_url)
            .max_number_of_messages(max_messages as i32)
            .wait_time_seconds(wait_time_seconds as i32)
            .send()
            .await
            .map_err(|e| QueueError::FetchFailed(DisplayErrorContext(&e).to_string()))?;

        let messages = output
            .messages()
            .iter()
            .map(|m| {
                let mut message = QueueMessage::new(m.body().unwrap_or_default());
                if let Some(id) = m.message_id() {
                    message = message.with_message_id(id);
                }
                if let Some(handle) = m.receipt_handle() {
                    message = message.with_receipt_handle(handle);
                }
                message
            })
            .collect::<Vec<_>>();

        tracing::debug!(count = messages.len(), queue_url = %self.queue_url, "Received messages");
        Ok(messages)
    }

    async fn acknowledge(&self, messages: &[QueueMessage]) -> Result<usize, QueueError> {
        let mut deleted = 0;
        let mut failures = Vec::new();

        for handle in messages.iter().filter_map(|m| m.receipt_handle.as_deref()) {
            match self
                .client
                .delete_message()
                .queue_url(&self.queue_url)
                .receipt_handle(handle)
                .send()
                .await
            {
                Ok(_) => deleted += 1,
                Err(e) => failures.push(DisplayErrorContext(&e).to_string()),
            }
        }

        if failures.is_empty() {
            Ok(deleted)
        } else {
            Err(QueueError::AcknowledgeFailed(format!(
                "{} of {} deletes failed (deleted {}): {}",
                failures.len(),
                failures.len() + deleted,
                deleted,
                failures[0]
            )))
        }
    }
}
