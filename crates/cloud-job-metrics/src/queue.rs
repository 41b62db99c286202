// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_sqs::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use tracing::debug;

use crate::error::QueueError;

/// Hide a received message from other consumers for this long while it is processed
pub const VISIBILITY_TIMEOUT_SECS: i32 = 15;

// Error codes returned by SQS (query protocol and JSON protocol spellings)
const NON_EXISTENT_QUEUE_CODES: [&str; 2] =
    ["AWS.SimpleQueueService.NonExistentQueue", "QueueDoesNotExist"];
const INVALID_ADDRESS_CODE: &str = "InvalidAddress";

/// Parameters of a single receive call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiveOptions {
    pub max_messages: i32,
    pub wait_time_secs: i32,
    pub visibility_timeout_secs: i32,
}

impl Default for ReceiveOptions {
    /// One message, no long polling, 15 second visibility timeout.
    fn default() -> Self {
        Self {
            max_messages: 1,
            wait_time_secs: 0,
            visibility_timeout_secs: VISIBILITY_TIMEOUT_SECS,
        }
    }
}

/// A raw message as handed out by the queue service
#[derive(Debug, Clone, PartialEq)]
pub struct ReceivedMessage {
    pub body: String,
    /// Opaque handle required to delete the message
    pub ack_token: String,
}

#[async_trait]
pub trait QueueClient: Send + Sync {
    /// Receives at most one message; `None` when the queue has nothing visible.
    async fn receive(&self, options: &ReceiveOptions)
        -> Result<Option<ReceivedMessage>, QueueError>;

    async fn delete(&self, ack_token: &str) -> Result<(), QueueError>;
}

/// [`QueueClient`] backed by Amazon SQS
#[derive(Clone, Debug)]
pub struct SqsQueue {
    client: aws_sdk_sqs::Client,
    queue_url: String,
}

impl SqsQueue {
    pub fn new(client: aws_sdk_sqs::Client, queue_url: impl Into<String>) -> Self {
        Self {
            client,
            queue_url: queue_url.into(),
        }
    }

    pub fn from_sdk_config(sdk_config: &SdkConfig, queue_url: impl Into<String>) -> Self {
        Self::new(aws_sdk_sqs::Client::new(sdk_config), queue_url)
    }

    pub fn queue_url(&self) -> &str {
        &self.queue_url
    }

    fn classify<E, R>(&self, err: SdkError<E, R>) -> QueueError
    where
        E: ProvideErrorMetadata + std::error::Error + 'static,
        R: std::fmt::Debug,
    {
        let code = err.code().map(str::to_string);
        classify_error_code(
            code.as_deref(),
            &self.queue_url,
            DisplayErrorContext(&err).to_string(),
        )
    }
}

#[async_trait]
impl QueueClient for SqsQueue {
    async fn receive(
        &self,
        options: &ReceiveOptions,
    ) -> Result<Option<ReceivedMessage>, QueueError> {
        let output = self
            .client
            .receive_message()
            .queue_url(&self.queue_url)
            .max_number_of_messages(options.max_messages)
            .wait_time_seconds(options.wait_time_secs)
            .visibility_timeout(options.visibility_timeout_secs)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let Some(message) = output.messages.unwrap_or_default().into_iter().next() else {
            debug!("No visible messages in {}", self.queue_url);
            return Ok(None);
        };

        let ack_token = message.receipt_handle.ok_or_else(|| {
            QueueError::Service("received message without a receipt handle".to_string())
        })?;
        Ok(Some(ReceivedMessage {
            body: message.body.unwrap_or_default(),
            ack_token,
        }))
    }

    async fn delete(&self, ack_token: &str) -> Result<(), QueueError> {
        self.client
            .delete_message()
            .queue_url(&self.queue_url)
            .receipt_handle(ack_token)
            .send()
            .await
            .map_err(|e| self.classify(e))?;
        Ok(())
    }
}

/// Maps an SQS error code onto the failures the bridge distinguishes.
pub fn classify_error_code(code: Option<&str>, queue_url: &str, message: String) -> QueueError {
    match code {
        Some(code) if NON_EXISTENT_QUEUE_CODES.contains(&code) => {
            QueueError::NonExistentQueue(queue_url.to_string())
        }
        Some(INVALID_ADDRESS_CODE) => QueueError::InvalidAddress(queue_url.to_string()),
        _ => QueueError::Service(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUEUE_URL: &str = "http://localstack:4566/000000000000/cloud-job-results-queue";

    #[test]
    fn test_default_receive_options() {
        let options = ReceiveOptions::default();
        assert_eq!(options.max_messages, 1);
        assert_eq!(options.wait_time_secs, 0);
        assert_eq!(options.visibility_timeout_secs, 15);
    }

    #[test]
    fn test_classify_non_existent_queue() {
        for code in NON_EXISTENT_QUEUE_CODES {
            assert_eq!(
                classify_error_code(Some(code), QUEUE_URL, "missing".to_string()),
                QueueError::NonExistentQueue(QUEUE_URL.to_string())
            );
        }
    }

    #[test]
    fn test_classify_invalid_address() {
        assert_eq!(
            classify_error_code(Some("InvalidAddress"), QUEUE_URL, "bad".to_string()),
            QueueError::InvalidAddress(QUEUE_URL.to_string())
        );
    }

    #[test]
    fn test_classify_other_errors() {
        assert_eq!(
            classify_error_code(Some("ThrottlingException"), QUEUE_URL, "slow down".to_string()),
            QueueError::Service("slow down".to_string())
        );
        assert_eq!(
            classify_error_code(None, QUEUE_URL, "dispatch failure".to_string()),
            QueueError::Service("dispatch failure".to_string())
        );
    }
}
