// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use tracing::debug;
use tracing_subscriber::EnvFilter;

// HTTP and AWS SDK internals are silenced, they log every request at debug
const SILENCED_TARGETS: &str = "h2=off,hyper=off,rustls=off,aws_smithy_runtime=off,aws_config=off";

pub fn env_filter_directives(log_level: &str) -> String {
    format!("{SILENCED_TARGETS},{log_level}")
}

/// Installs the global fmt subscriber. Must run once, before anything logs.
pub fn init(log_level: &str) {
    #[allow(clippy::expect_used)]
    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_new(env_filter_directives(log_level))
                .expect("could not parse log level in configuration"),
        )
        .with_level(true)
        .with_thread_names(false)
        .with_thread_ids(false)
        .with_line_number(false)
        .with_file(false)
        .with_target(true)
        .without_time()
        .finish();

    #[allow(clippy::expect_used)]
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    debug!("Logging subsystem enabled");
}
