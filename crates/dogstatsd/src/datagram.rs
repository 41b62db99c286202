// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! DogStatsD datagram encoding.
//!
//! Only the two message kinds the client sends are supported:
//!
//! - gauges: `<name>:<value>|g|#<tags>`
//! - events: `_e{<title_len>,<text_len>}:<title>|<text>|t:<alert_type>|#<tags>`
//!
//! See <https://docs.datadoghq.com/developers/dogstatsd/datagram_shell/>.

use crate::errors::EncodeError;
use crate::util::escape_event_text;

/// Severity attached to an event, rendered as the `t:` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum AlertType {
    #[display("info")]
    Info,
    #[display("success")]
    Success,
    #[display("warning")]
    Warning,
    #[display("error")]
    Error,
}

/// A point-in-time gauge sample
#[derive(Debug, Clone, PartialEq)]
pub struct Gauge<'a> {
    pub name: &'a str,
    pub value: f64,
    pub tags: &'a [&'a str],
}

/// A Datadog event
#[derive(Debug, Clone, PartialEq)]
pub struct Event<'a> {
    pub title: &'a str,
    pub text: &'a str,
    pub alert_type: AlertType,
    pub tags: &'a [&'a str],
}

impl Gauge<'_> {
    /// Encodes the gauge, prefixing the name with `namespace` when one is set.
    pub fn encode(&self, namespace: Option<&str>) -> Result<String, EncodeError> {
        if self.name.is_empty() {
            return Err(EncodeError::EmptyName);
        }
        if !self.value.is_finite() {
            return Err(EncodeError::NonFiniteValue(self.name.to_string()));
        }

        let mut datagram = match namespace {
            Some(ns) => format!("{}.{}:{}|g", ns, self.name, self.value),
            None => format!("{}:{}|g", self.name, self.value),
        };
        push_tags(&mut datagram, self.tags);
        Ok(datagram)
    }
}

impl Event<'_> {
    pub fn encode(&self) -> Result<String, EncodeError> {
        if self.title.is_empty() {
            return Err(EncodeError::EmptyTitle);
        }

        let title = escape_event_text(self.title);
        let text = escape_event_text(self.text);
        let mut datagram = format!(
            "_e{{{},{}}}:{}|{}|t:{}",
            title.len(),
            text.len(),
            title,
            text,
            self.alert_type
        );
        push_tags(&mut datagram, self.tags);
        Ok(datagram)
    }
}

fn push_tags(datagram: &mut String, tags: &[&str]) {
    if tags.is_empty() {
        return;
    }
    datagram.push_str("|#");
    datagram.push_str(&tags.join(","));
}
