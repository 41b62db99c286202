// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

use std::process::ExitCode;
use std::sync::Arc;

use tracing::error;

use cloud_job_metrics::{
    config::{self, ProducerConfig},
    producer::MockProducer,
    store::S3Store,
};
use cloud_job_metrics_submitter::{aws, logging};

#[tokio::main]
pub async fn main() -> ExitCode {
    logging::init(&config::log_level_from_env());

    let config = match ProducerConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Error creating config on mock producer startup: {e}");
            return ExitCode::FAILURE;
        }
    };

    let endpoint_url = config.aws_endpoint_url.as_deref();
    let sdk_config = aws::load_sdk_config(endpoint_url).await;
    let store = Arc::new(S3Store::from_sdk_config(
        &sdk_config,
        aws::force_path_style(endpoint_url),
    ));

    let producer = MockProducer::new(store, config.bucket_name.as_str());
    match producer.produce_today().await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Error uploading mock job result: {e}");
            ExitCode::FAILURE
        }
    }
}
