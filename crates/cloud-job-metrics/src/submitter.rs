// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Drains the queue and reports each metrics file to the agent.
//!
//! Every received message is acknowledged once it has been handled, whether
//! it was submitted or skipped. The drain stops when the queue reports no
//! visible message, or at the first error that is not a skip.

use std::sync::Arc;

use dogstatsd::AlertType;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::agent::MetricsAgent;
use crate::error::BridgeError;
use crate::handler::ResourceHandler;

pub const METRIC_TAGS: &[&str] = &["cloud_job_metric"];
pub const JOB_SUCCESS_FIELD: &str = "job_success";

const SUCCESS_TITLE: &str = "Job Success!";
const SUCCESS_TEXT: &str = "Cloud process completed successfully.";
const FAILURE_TITLE: &str = "Job Failure!";
const FAILURE_TEXT: &str = "Cloud process encountered a failure!";

/// What a single payload was reported as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    Success { gauges: usize },
    Failure,
}

/// Counters for one drain run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DrainSummary {
    pub successes: usize,
    pub failures: usize,
    pub gauges: usize,
    pub skipped_test_events: usize,
    pub skipped_invalid_keys: usize,
    pub skipped_missing_payloads: usize,
}

impl DrainSummary {
    pub fn processed(&self) -> usize {
        self.successes
            + self.failures
            + self.skipped_test_events
            + self.skipped_invalid_keys
            + self.skipped_missing_payloads
    }
}

pub struct MetricSubmitter {
    handler: ResourceHandler,
    agent: Arc<dyn MetricsAgent>,
}

impl MetricSubmitter {
    pub fn new(handler: ResourceHandler, agent: Arc<dyn MetricsAgent>) -> Self {
        Self { handler, agent }
    }

    pub fn handler(&self) -> &ResourceHandler {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut ResourceHandler {
        &mut self.handler
    }

    /// Reports one payload, expected to look like `{"job_success": 1, "job_result": 12345}`.
    ///
    /// A truthy `job_success` produces a success event followed by one gauge per
    /// other numeric field. Anything else produces a single failure event.
    pub async fn submit(&self, metrics: &Value) -> Submission {
        let fields = match metrics.as_object() {
            Some(fields) if fields.get(JOB_SUCCESS_FIELD).is_some_and(is_truthy) => fields,
            _ => {
                self.agent
                    .event(FAILURE_TITLE, FAILURE_TEXT, AlertType::Error, METRIC_TAGS)
                    .await;
                return Submission::Failure;
            }
        };

        self.agent
            .event(SUCCESS_TITLE, SUCCESS_TEXT, AlertType::Success, METRIC_TAGS)
            .await;

        let mut gauges = 0;
        for (name, value) in fields.iter().filter(|(name, _)| *name != JOB_SUCCESS_FIELD) {
            match value.as_f64() {
                Some(number) => {
                    debug!("Submitting gauge {}={}", name, number);
                    self.agent.gauge(name, number, METRIC_TAGS).await;
                    gauges += 1;
                }
                None => warn!("Skipping non-numeric metric '{}': {}", name, value),
            }
        }
        Submission::Success { gauges }
    }

    /// Processes every visible message, then returns what was done.
    pub async fn run(&mut self) -> Result<DrainSummary, BridgeError> {
        info!("Processing available messages in queue");
        let mut summary = DrainSummary::default();

        while self.handler.has_next().await? {
            if self.handler.is_test_event() {
                info!("Found S3 test event in queue, skipping and deleting message");
                self.handler.acknowledge().await?;
                summary.skipped_test_events += 1;
                continue;
            }

            if !self.handler.key_is_valid() {
                info!(
                    "Object key ({}) is invalid, skipping and deleting message",
                    self.handler.object_key().unwrap_or("<none>")
                );
                self.handler.acknowledge().await?;
                summary.skipped_invalid_keys += 1;
                continue;
            }

            let Some(metrics) = self.handler.fetch_object().await?.filter(is_truthy) else {
                info!(
                    "No data in object '{}', skipping and deleting message",
                    self.handler.object_key().unwrap_or("<none>")
                );
                self.handler.acknowledge().await?;
                summary.skipped_missing_payloads += 1;
                continue;
            };

            info!("Sending data to Datadog via DogStatsD");
            match self.submit(&metrics).await {
                Submission::Success { gauges } => {
                    summary.successes += 1;
                    summary.gauges += gauges;
                }
                Submission::Failure => summary.failures += 1,
            }
            self.handler.acknowledge().await?;
        }

        info!(
            "No more messages visible in the queue, processed {} ({} succeeded, {} failed, {} skipped)",
            summary.processed(),
            summary.successes,
            summary.failures,
            summary.skipped_test_events
                + summary.skipped_invalid_keys
                + summary.skipped_missing_payloads
        );
        Ok(summary)
    }
}

/// JSON truthiness: `false`, `null`, zero, and empty strings, arrays and objects are falsy.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}
