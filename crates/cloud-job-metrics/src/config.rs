// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::error::ConfigError;
use crate::producer::DEFAULT_BUCKET_NAME;
use dogstatsd::dogstatsd::{DEFAULT_HOST, DEFAULT_PORT};
use dogstatsd::util::parse_metric_namespace;
use dogstatsd::DogStatsDClientConfig;
use std::env;

pub const QUEUE_URL_VAR: &str = "SQS_QUEUE_URL";
pub const BUCKET_NAME_VAR: &str = "S3_BUCKET_NAME";
pub const LOG_LEVEL_VAR: &str = "LOG_LEVEL";

const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Reads the log level the way every binary does, before any other configuration.
pub fn log_level_from_env() -> String {
    env::var(LOG_LEVEL_VAR)
        .map(|val| val.to_lowercase())
        .unwrap_or_else(|_| "info".to_string())
}

/// Configuration for the metrics submitter
#[derive(Debug, Clone, PartialEq)]
pub struct BridgeConfig {
    /// SQS queue URL to drain (required)
    pub queue_url: String,
    /// DogStatsD agent host
    pub statsd_host: String,
    /// DogStatsD agent port
    pub statsd_port: u16,
    /// Optional prefix for every gauge name
    pub metric_namespace: Option<String>,
    /// Endpoint override for the AWS clients (e.g., LocalStack)
    pub aws_endpoint_url: Option<String>,
    /// Log level (e.g., trace, debug, info, warn, error)
    pub log_level: String,
}

impl BridgeConfig {
    /// Creates a configuration for `queue_url` with every optional setting defaulted.
    pub fn new(queue_url: impl Into<String>) -> Self {
        Self {
            queue_url: queue_url.into(),
            statsd_host: DEFAULT_HOST.to_string(),
            statsd_port: DEFAULT_PORT,
            metric_namespace: None,
            aws_endpoint_url: None,
            log_level: "info".to_string(),
        }
    }

    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let queue_url = env::var(QUEUE_URL_VAR)
            .ok()
            .filter(|url| !url.trim().is_empty())
            .ok_or(ConfigError::MissingVar(QUEUE_URL_VAR))?;
        let statsd_host = env::var("STATSD_HOST")
            .ok()
            .filter(|host| !host.is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let statsd_port = env::var("STATSD_PORT")
            .ok()
            .and_then(|port| port.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);
        let metric_namespace = env::var("DD_STATSD_METRIC_NAMESPACE")
            .ok()
            .and_then(|val| parse_metric_namespace(&val));
        let aws_endpoint_url = env::var("AWS_ENDPOINT_URL").ok();

        let config = Self {
            queue_url,
            statsd_host,
            statsd_port,
            metric_namespace,
            aws_endpoint_url,
            log_level: log_level_from_env(),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.queue_url.trim().is_empty() {
            return Err(ConfigError::MissingVar(QUEUE_URL_VAR));
        }

        if self.statsd_port == 0 {
            return Err(ConfigError::Invalid(
                "DogStatsD port must be greater than 0".to_string(),
            ));
        }

        if self.statsd_host.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "STATSD_HOST cannot be empty".to_string(),
            ));
        }

        validate_log_level(&self.log_level)
    }

    pub fn dogstatsd_config(&self) -> DogStatsDClientConfig {
        DogStatsDClientConfig {
            host: self.statsd_host.clone(),
            port: self.statsd_port,
            metric_namespace: self.metric_namespace.clone(),
        }
    }
}

/// Configuration for the mock data producer
#[derive(Debug, Clone, PartialEq)]
pub struct ProducerConfig {
    pub bucket_name: String,
    pub aws_endpoint_url: Option<String>,
    pub log_level: String,
}

impl ProducerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            bucket_name: env::var(BUCKET_NAME_VAR)
                .unwrap_or_else(|_| DEFAULT_BUCKET_NAME.to_string()),
            aws_endpoint_url: env::var("AWS_ENDPOINT_URL").ok(),
            log_level: log_level_from_env(),
        };

        if config.bucket_name.trim().is_empty() {
            return Err(ConfigError::Invalid(format!(
                "{BUCKET_NAME_VAR} cannot be empty"
            )));
        }
        validate_log_level(&config.log_level)?;
        Ok(config)
    }
}

fn validate_log_level(log_level: &str) -> Result<(), ConfigError> {
    if !VALID_LOG_LEVELS.contains(&log_level) {
        return Err(ConfigError::Invalid(format!(
            "Invalid log level '{}'. Must be one of: trace, debug, info, warn, error",
            log_level
        )));
    }
    Ok(())
}
