// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Bridge between S3 object-created notifications delivered through SQS and a
//! local Datadog Agent.
//!
//! The [`submitter::MetricSubmitter`] drains the queue one message at a time
//! through a [`handler::ResourceHandler`], fetches the referenced metrics file
//! and reports it as a success event plus gauges, or as a failure event.

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod agent;
pub mod config;
pub mod error;
pub mod handler;
pub mod message;
pub mod producer;
pub mod queue;
pub mod store;
pub mod submitter;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use dogstatsd::AlertType;
