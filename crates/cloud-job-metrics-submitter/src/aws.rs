// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use aws_config::{BehaviorVersion, SdkConfig};
use tracing::debug;

/// Loads credentials and region from the default provider chain, optionally
/// pointing every client at `endpoint_url` (e.g., LocalStack).
pub async fn load_sdk_config(endpoint_url: Option<&str>) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(endpoint_url) = endpoint_url {
        debug!("Using AWS endpoint override {}", endpoint_url);
        loader = loader.endpoint_url(endpoint_url);
    }
    loader.load().await
}

/// S3 needs path-style addressing behind an endpoint override, virtual-host
/// style bucket names do not resolve there.
pub fn force_path_style(endpoint_url: Option<&str>) -> bool {
    endpoint_url.is_some()
}
