// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! In-memory stand-ins for the queue, the blob store and the agent.

#![allow(clippy::unwrap_used)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use dogstatsd::AlertType;
use serde_json::json;

use crate::agent::MetricsAgent;
use crate::error::{QueueError, StoreError};
use crate::queue::{QueueClient, ReceiveOptions, ReceivedMessage};
use crate::store::BlobStore;

/// Body of an S3 object-created notification for `bucket`/`key`. The key is
/// embedded as given, so pass it percent-encoded the way S3 does.
pub fn notification_body(bucket: &str, key: &str) -> String {
    json!({
        "Records": [{
            "eventVersion": "2.1",
            "eventSource": "aws:s3",
            "eventName": "ObjectCreated:Put",
            "s3": {
                "bucket": { "name": bucket, "arn": format!("arn:aws:s3:::{bucket}") },
                "object": { "key": key, "size": 36 }
            }
        }]
    })
    .to_string()
}

/// Body of the message S3 sends when a bucket notification is configured
pub fn test_event_body(bucket: &str) -> String {
    json!({
        "Service": "Amazon S3",
        "Event": "s3:TestEvent",
        "Time": "2020-01-12T00:00:00.000Z",
        "Bucket": bucket,
        "RequestId": "5582815E1AEA5ADF",
    })
    .to_string()
}

#[derive(Debug, Default)]
struct QueueState {
    visible: VecDeque<ReceivedMessage>,
    in_flight: Vec<ReceivedMessage>,
    receive_calls: Vec<ReceiveOptions>,
    deleted: Vec<String>,
    receive_error: Option<QueueError>,
    delete_error: Option<QueueError>,
}

/// FIFO queue where received messages stay in flight until deleted or until
/// [`InMemoryQueue::expire_visibility`] makes them visible again.
#[derive(Debug, Default)]
pub struct InMemoryQueue {
    state: Mutex<QueueState>,
    next_token: AtomicUsize,
}

impl InMemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues a raw body and returns its ack token.
    pub fn push_body(&self, body: impl Into<String>) -> String {
        let id = self.next_token.fetch_add(1, Ordering::SeqCst);
        let ack_token = format!("AQEB{id:04}-receipt-handle-for-in-memory-queue");
        self.state
            .lock()
            .unwrap()
            .visible
            .push_back(ReceivedMessage {
                body: body.into(),
                ack_token: ack_token.clone(),
            });
        ack_token
    }

    pub fn push_notification(&self, bucket: &str, key: &str) -> String {
        self.push_body(notification_body(bucket, key))
    }

    pub fn visible_len(&self) -> usize {
        self.state.lock().unwrap().visible.len()
    }

    pub fn in_flight_len(&self) -> usize {
        self.state.lock().unwrap().in_flight.len()
    }

    pub fn receive_calls(&self) -> Vec<ReceiveOptions> {
        self.state.lock().unwrap().receive_calls.clone()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.state.lock().unwrap().deleted.clone()
    }

    /// The next receive fails with `err`.
    pub fn fail_receive_with(&self, err: QueueError) {
        self.state.lock().unwrap().receive_error = Some(err);
    }

    /// The next delete fails with `err`.
    pub fn fail_delete_with(&self, err: QueueError) {
        self.state.lock().unwrap().delete_error = Some(err);
    }

    /// Returns every in-flight message to the front of the queue.
    pub fn expire_visibility(&self) {
        let mut state = self.state.lock().unwrap();
        let in_flight = std::mem::take(&mut state.in_flight);
        for message in in_flight.into_iter().rev() {
            state.visible.push_front(message);
        }
    }
}

#[async_trait]
impl QueueClient for InMemoryQueue {
    async fn receive(
        &self,
        options: &ReceiveOptions,
    ) -> Result<Option<ReceivedMessage>, QueueError> {
        let mut state = self.state.lock().unwrap();
        state.receive_calls.push(*options);
        if let Some(err) = state.receive_error.take() {
            return Err(err);
        }

        let Some(message) = state.visible.pop_front() else {
            return Ok(None);
        };
        state.in_flight.push(message.clone());
        Ok(Some(message))
    }

    async fn delete(&self, ack_token: &str) -> Result<(), QueueError> {
        let mut state = self.state.lock().unwrap();
        if let Some(err) = state.delete_error.take() {
            return Err(err);
        }

        let Some(position) = state
            .in_flight
            .iter()
            .position(|message| message.ack_token == ack_token)
        else {
            return Err(QueueError::Service(format!(
                "receipt handle {ack_token} is not in flight"
            )));
        };
        state.in_flight.remove(position);
        state.deleted.push(ack_token.to_string());
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    objects: Mutex<HashMap<(String, String), Vec<u8>>>,
    get_error: Mutex<Option<StoreError>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, bucket: &str, key: &str, body: &[u8]) {
        self.objects
            .lock()
            .unwrap()
            .insert((bucket.to_string(), key.to_string()), body.to_vec());
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .unwrap()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    pub fn keys(&self, bucket: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .objects
            .lock()
            .unwrap()
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, key)| key.clone())
            .collect();
        keys.sort();
        keys
    }

    /// The next get fails with `err`.
    pub fn fail_get_with(&self, err: StoreError) {
        *self.get_error.lock().unwrap() = Some(err);
    }
}

#[async_trait]
impl BlobStore for InMemoryStore {
    async fn get(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        if let Some(err) = self.get_error.lock().unwrap().take() {
            return Err(err);
        }
        Ok(self.object(bucket, key))
    }

    async fn put(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<(), StoreError> {
        self.objects
            .lock()
            .unwrap()
            .insert((bucket.to_string(), key.to_string()), body);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AgentCall {
    Event {
        title: String,
        text: String,
        alert_type: AlertType,
        tags: Vec<String>,
    },
    Gauge {
        name: String,
        value: f64,
        tags: Vec<String>,
    },
}

/// [`MetricsAgent`] that records every call in order
#[derive(Debug, Default)]
pub struct RecordingAgent {
    calls: Mutex<Vec<AgentCall>>,
}

impl RecordingAgent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<AgentCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn events(&self) -> Vec<AgentCall> {
        self.calls()
            .into_iter()
            .filter(|call| matches!(call, AgentCall::Event { .. }))
            .collect()
    }

    pub fn gauges(&self) -> Vec<AgentCall> {
        self.calls()
            .into_iter()
            .filter(|call| matches!(call, AgentCall::Gauge { .. }))
            .collect()
    }

    pub fn reset(&self) {
        self.calls.lock().unwrap().clear();
    }
}

fn owned_tags(tags: &[&str]) -> Vec<String> {
    tags.iter().map(|tag| tag.to_string()).collect()
}

#[async_trait]
impl MetricsAgent for RecordingAgent {
    async fn event(&self, title: &str, text: &str, alert_type: AlertType, tags: &[&str]) {
        self.calls.lock().unwrap().push(AgentCall::Event {
            title: title.to_string(),
            text: text.to_string(),
            alert_type,
            tags: owned_tags(tags),
        });
    }

    async fn gauge(&self, name: &str, value: f64, tags: &[&str]) {
        self.calls.lock().unwrap().push(AgentCall::Gauge {
            name: name.to_string(),
            value,
            tags: owned_tags(tags),
        });
    }
}
