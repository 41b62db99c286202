// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

/// Errors raised while reading the startup configuration
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("environment variable '{0}' not set")]
    MissingVar(&'static str),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Errors returned by a [`crate::queue::QueueClient`]
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum QueueError {
    #[error("queue does not exist: {0}")]
    NonExistentQueue(String),

    #[error("queue address is not valid: {0}")]
    InvalidAddress(String),

    #[error("queue service error: {0}")]
    Service(String),
}

/// Errors returned by a [`crate::store::BlobStore`]
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum StoreError {
    #[error("blob store error: {0}")]
    Service(String),

    #[error("failed to read object body: {0}")]
    Body(String),

    #[error("failed to encode object body: {0}")]
    Encode(String),
}

/// Errors that end a drain run
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum BridgeError {
    #[error("SQS queue does not exist ({0})")]
    QueueNotFound(String),

    #[error("SQS queue URL is not valid ({0})")]
    InvalidQueueAddress(String),

    #[error(transparent)]
    Queue(QueueError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl BridgeError {
    /// Startup-class failures: the queue cannot be reached at all, so no run can succeed.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            BridgeError::QueueNotFound(_) | BridgeError::InvalidQueueAddress(_)
        )
    }
}

impl From<QueueError> for BridgeError {
    fn from(err: QueueError) -> Self {
        match err {
            QueueError::NonExistentQueue(url) => BridgeError::QueueNotFound(url),
            QueueError::InvalidAddress(url) => BridgeError::InvalidQueueAddress(url),
            other => BridgeError::Queue(other),
        }
    }
}
