// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Queue and blob store access for the submitter.
//!
//! The handler holds at most one in-flight message. [`ResourceHandler::has_next`]
//! replaces it with the next visible message and [`ResourceHandler::acknowledge`]
//! deletes it from the queue; every other accessor reads the cached message.

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use crate::error::BridgeError;
use crate::message::{self, QueueMessage};
use crate::queue::{QueueClient, ReceiveOptions, ReceivedMessage};
use crate::store::BlobStore;

// Only this much of an ack token ends up in the logs
const ACK_TOKEN_LOG_PREFIX: usize = 25;

pub struct ResourceHandler {
    queue: Arc<dyn QueueClient>,
    store: Arc<dyn BlobStore>,
    receive_options: ReceiveOptions,
    message: Option<QueueMessage>,
}

impl ResourceHandler {
    pub fn new(queue: Arc<dyn QueueClient>, store: Arc<dyn BlobStore>) -> Self {
        Self {
            queue,
            store,
            receive_options: ReceiveOptions::default(),
            message: None,
        }
    }

    /// Asks the queue for exactly one message.
    ///
    /// A missing queue or a malformed queue address comes back as a fatal
    /// [`BridgeError`]; any other queue failure is returned as is.
    pub async fn poll(&self) -> Result<Option<ReceivedMessage>, BridgeError> {
        Ok(self.queue.receive(&self.receive_options).await?)
    }

    /// Polls and caches the next message. Returns `false`, with the cache
    /// cleared, once the queue has nothing visible.
    pub async fn has_next(&mut self) -> Result<bool, BridgeError> {
        if self.message.is_some() {
            warn!("Replacing an unacknowledged message, it will reappear after the visibility timeout");
        }

        match self.poll().await? {
            Some(received) => {
                self.message = Some(QueueMessage::from(received));
                Ok(true)
            }
            None => {
                self.message = None;
                Ok(false)
            }
        }
    }

    pub fn message(&self) -> Option<&QueueMessage> {
        self.message.as_ref()
    }

    pub fn is_test_event(&self) -> bool {
        self.message.as_ref().is_some_and(QueueMessage::is_test_event)
    }

    pub fn bucket_name(&self) -> Option<&str> {
        self.message.as_ref().and_then(QueueMessage::bucket_name)
    }

    /// Percent-decoded object key of the cached notification.
    pub fn object_key(&self) -> Option<&str> {
        self.message.as_ref().and_then(QueueMessage::object_key)
    }

    pub fn key_is_valid(&self) -> bool {
        message::key_is_valid(self.object_key())
    }

    /// Downloads and decodes the object the cached message points to.
    ///
    /// Returns `Ok(None)` when there is no cached message, the message does not
    /// name an object, the object does not exist, or its body is not UTF-8 JSON.
    /// Other store failures are returned.
    pub async fn fetch_object(&self) -> Result<Option<Value>, BridgeError> {
        if self.message.is_none() {
            warn!("No cached queue message to fetch an object for");
            return Ok(None);
        }
        let (Some(bucket), Some(key)) = (self.bucket_name(), self.object_key()) else {
            warn!("Bucket name and object key could not be determined from queue message");
            return Ok(None);
        };

        let Some(raw) = self.store.get(bucket, key).await? else {
            warn!("Object s3://{}/{} does not exist", bucket, key);
            return Ok(None);
        };

        let text = match String::from_utf8(raw) {
            Ok(text) => text,
            Err(e) => {
                warn!("Object s3://{}/{} is not valid UTF-8: {}", bucket, key, e);
                return Ok(None);
            }
        };
        match serde_json::from_str(&text) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!("Object s3://{}/{} is not valid JSON: {}", bucket, key, e);
                Ok(None)
            }
        }
    }

    /// Deletes the cached message from the queue and clears the cache.
    /// Does nothing when no message is cached.
    pub async fn acknowledge(&mut self) -> Result<(), BridgeError> {
        let Some(message) = self.message.as_ref() else {
            return Ok(());
        };

        let token_prefix: String = message
            .ack_token
            .chars()
            .take(ACK_TOKEN_LOG_PREFIX)
            .collect();
        info!("Removing message from queue ({}...)", token_prefix);
        self.queue.delete(&message.ack_token).await?;
        self.message = None;
        Ok(())
    }
}
