// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Queue message model.
//!
//! S3 delivers two kinds of bodies to the queue: the notification for a newly
//! created object, and a one-off `s3:TestEvent` sent when the notification is
//! configured. Bodies are parsed once, on receipt.

use percent_encoding::percent_decode_str;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::queue::ReceivedMessage;

pub const TEST_EVENT: &str = "s3:TestEvent";

/// Parsed body of a queue message
#[derive(Debug, Clone, PartialEq)]
pub enum MessageBody {
    /// `{"Event": "s3:TestEvent", ...}`
    TestEvent,
    /// First record of an S3 notification, with the object key percent-decoded
    ObjectCreated { bucket: String, key: String },
    /// Anything else, including bodies that are not JSON (cached as `Null`)
    Unrecognized(Value),
}

// Only the fields the bridge reads, unknown fields are ignored
#[derive(Deserialize)]
struct Notification {
    #[serde(rename = "Records")]
    records: Vec<NotificationRecord>,
}

#[derive(Deserialize)]
struct NotificationRecord {
    s3: S3Entity,
}

#[derive(Deserialize)]
struct S3Entity {
    bucket: S3Bucket,
    object: S3Object,
}

#[derive(Deserialize)]
struct S3Bucket {
    name: String,
}

#[derive(Deserialize)]
struct S3Object {
    key: String,
}

impl MessageBody {
    pub fn parse(raw: &str) -> MessageBody {
        match serde_json::from_str::<Value>(raw) {
            Ok(value) => Self::from_value(value),
            Err(e) => {
                warn!("Queue message body is not valid JSON: {}", e);
                MessageBody::Unrecognized(Value::Null)
            }
        }
    }

    pub fn from_value(value: Value) -> MessageBody {
        if value.get("Event").and_then(Value::as_str) == Some(TEST_EVENT) {
            return MessageBody::TestEvent;
        }

        let first_record = Notification::deserialize(&value)
            .ok()
            .and_then(|notification| notification.records.into_iter().next());
        match first_record {
            Some(record) => MessageBody::ObjectCreated {
                bucket: record.s3.bucket.name,
                key: decode_key(&record.s3.object.key),
            },
            None => MessageBody::Unrecognized(value),
        }
    }
}

/// S3 percent-encodes object keys in notifications.
pub fn decode_key(encoded: &str) -> String {
    percent_decode_str(encoded).decode_utf8_lossy().into_owned()
}

/// Checks the `date=<yyyymmdd>/metrics.json` layout.
///
/// The check is substring based: the key must have exactly two `/`-separated
/// segments, the first containing `date=` and the second containing `.json`.
/// `olddate=1/x.json.bak` therefore passes.
pub fn key_is_valid(key: Option<&str>) -> bool {
    let Some(key) = key.filter(|key| !key.is_empty()) else {
        return false;
    };
    match key.split('/').collect::<Vec<_>>().as_slice() {
        [prefix, file] => prefix.contains("date=") && file.contains(".json"),
        _ => false,
    }
}

/// The single in-flight message held by the resource handler
#[derive(Debug, Clone, PartialEq)]
pub struct QueueMessage {
    pub body: MessageBody,
    pub ack_token: String,
}

impl From<ReceivedMessage> for QueueMessage {
    fn from(message: ReceivedMessage) -> Self {
        QueueMessage {
            body: MessageBody::parse(&message.body),
            ack_token: message.ack_token,
        }
    }
}

impl QueueMessage {
    pub fn is_test_event(&self) -> bool {
        matches!(self.body, MessageBody::TestEvent)
    }

    pub fn bucket_name(&self) -> Option<&str> {
        match &self.body {
            MessageBody::ObjectCreated { bucket, .. } => Some(bucket.as_str()),
            _ => None,
        }
    }

    pub fn object_key(&self) -> Option<&str> {
        match &self.body {
            MessageBody::ObjectCreated { key, .. } => Some(key.as_str()),
            _ => None,
        }
    }
}
