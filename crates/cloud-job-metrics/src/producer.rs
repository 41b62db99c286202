// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Mock data source that drops a metrics file into the results bucket, which
//! in turn makes S3 publish an object-created notification to the queue.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rand::Rng;
use serde::Serialize;
use tracing::info;

use crate::error::StoreError;
use crate::store::BlobStore;

pub const DEFAULT_BUCKET_NAME: &str = "cloud-job-results-bucket";

const MAX_JOB_RESULT: u32 = 1000;

/// Payload written by the producer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct JobMetrics {
    pub job_success: bool,
    pub job_result: u32,
}

/// `date=YYYYMMDD/metrics.json`
pub fn object_key_for(date: NaiveDate) -> String {
    format!("date={}/metrics.json", date.format("%Y%m%d"))
}

pub struct MockProducer {
    store: Arc<dyn BlobStore>,
    bucket: String,
}

impl MockProducer {
    pub fn new(store: Arc<dyn BlobStore>, bucket: impl Into<String>) -> Self {
        Self {
            store,
            bucket: bucket.into(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Uploads a successful job result for `date` and returns the object key.
    /// An existing file for the same day is overwritten.
    pub async fn produce(&self, date: NaiveDate, job_result: u32) -> Result<String, StoreError> {
        let key = object_key_for(date);
        let body = serde_json::to_vec(&JobMetrics {
            job_success: true,
            job_result,
        })
        .map_err(|e| StoreError::Encode(e.to_string()))?;

        self.store.put(&self.bucket, &key, body).await?;
        info!("New file uploaded to s3://{}/{}", self.bucket, key);
        Ok(key)
    }

    /// Uploads a random job result for the current UTC day.
    pub async fn produce_today(&self) -> Result<String, StoreError> {
        let job_result = rand::thread_rng().gen_range(0..=MAX_JOB_RESULT);
        self.produce(Utc::now().date_naive(), job_result).await
    }
}
