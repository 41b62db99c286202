// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

use std::process::ExitCode;
use std::sync::Arc;

use tracing::{debug, error, info};

use cloud_job_metrics::{
    config::{self, BridgeConfig},
    handler::ResourceHandler,
    queue::SqsQueue,
    store::S3Store,
    submitter::MetricSubmitter,
};
use cloud_job_metrics_submitter::{aws, logging};
use dogstatsd::DogStatsDClient;

#[tokio::main]
pub async fn main() -> ExitCode {
    let log_level = config::log_level_from_env();
    logging::init(&log_level);

    let config = match BridgeConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Error creating config on metrics submitter startup: {e}");
            return ExitCode::FAILURE;
        }
    };
    debug!("Starting metrics submitter for {}", config.queue_url);

    let endpoint_url = config.aws_endpoint_url.as_deref();
    let sdk_config = aws::load_sdk_config(endpoint_url).await;
    let queue = Arc::new(SqsQueue::from_sdk_config(&sdk_config, &config.queue_url));
    let store = Arc::new(S3Store::from_sdk_config(
        &sdk_config,
        aws::force_path_style(endpoint_url),
    ));

    let agent = match DogStatsDClient::new(&config.dogstatsd_config()).await {
        Ok(client) => Arc::new(client),
        Err(e) => {
            error!("Error creating DogStatsD client: {e}");
            return ExitCode::FAILURE;
        }
    };

    let handler = ResourceHandler::new(queue, store);
    let mut submitter = MetricSubmitter::new(handler, agent);

    match submitter.run().await {
        Ok(summary) => {
            info!(
                "Drain complete: {} submitted, {} failed, {} gauges sent",
                summary.successes, summary.failures, summary.gauges
            );
            ExitCode::SUCCESS
        }
        Err(e) if e.is_fatal() => {
            error!("{e}. Check the {} setting.", config::QUEUE_URL_VAR);
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("Error while draining queue: {e}");
            ExitCode::FAILURE
        }
    }
}
