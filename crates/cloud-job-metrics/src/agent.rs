// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use dogstatsd::{AlertType, DogStatsDClient};
use tracing::error;

/// The two calls the submitter makes against a metrics-collection agent.
///
/// Submissions are fire-and-forget: implementations report their own failures.
#[async_trait]
pub trait MetricsAgent: Send + Sync {
    async fn event(&self, title: &str, text: &str, alert_type: AlertType, tags: &[&str]);

    async fn gauge(&self, name: &str, value: f64, tags: &[&str]);
}

#[async_trait]
impl MetricsAgent for DogStatsDClient {
    async fn event(&self, title: &str, text: &str, alert_type: AlertType, tags: &[&str]) {
        if let Err(e) = DogStatsDClient::event(self, title, text, alert_type, tags).await {
            error!("Failed to send event '{}' to DogStatsD: {}", title, e);
        }
    }

    async fn gauge(&self, name: &str, value: f64, tags: &[&str]) {
        if let Err(e) = DogStatsDClient::gauge(self, name, value, tags).await {
            error!("Failed to send gauge '{}' to DogStatsD: {}", name, e);
        }
    }
}
