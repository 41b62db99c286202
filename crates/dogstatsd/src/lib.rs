// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Minimal DogStatsD client.
//!
//! Encodes events and gauges into DogStatsD datagrams and ships them to a
//! local Datadog Agent over UDP. There is no client-side aggregation: every
//! call produces exactly one datagram.

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod datagram;
pub mod dogstatsd;
pub mod errors;
pub mod util;

pub use crate::datagram::AlertType;
pub use crate::dogstatsd::{DogStatsDClient, DogStatsDClientConfig};
