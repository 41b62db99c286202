// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Utility functions for DogStatsD operations.

use std::borrow::Cow;

/// Parses and validates a metric namespace.
///
/// A namespace is accepted when, after trimming whitespace, it starts with an
/// ASCII letter and only contains ASCII alphanumerics, underscores or periods.
/// Anything else is logged and dropped so a bad setting never blocks startup.
///
/// # Examples
///
/// ```
/// use dogstatsd::util::parse_metric_namespace;
///
/// assert_eq!(parse_metric_namespace("cloud_jobs"), Some("cloud_jobs".to_string()));
/// assert_eq!(parse_metric_namespace(" jobs.batch "), Some("jobs.batch".to_string()));
/// assert_eq!(parse_metric_namespace("9jobs"), None);
/// assert_eq!(parse_metric_namespace("cloud-jobs"), None);
/// ```
pub fn parse_metric_namespace(namespace: &str) -> Option<String> {
    let trimmed = namespace.trim();
    let first_char = trimmed.chars().next()?;

    if !first_char.is_ascii_alphabetic() {
        tracing::warn!(
            "metric namespace must start with a letter, got: '{}'. Ignoring namespace.",
            trimmed
        );
        return None;
    }

    if let Some(invalid_char) = trimmed
        .chars()
        .find(|&ch| !ch.is_ascii_alphanumeric() && ch != '_' && ch != '.')
    {
        tracing::warn!(
            "metric namespace contains invalid character '{}' in '{}'. Ignoring namespace.",
            invalid_char,
            trimmed
        );
        return None;
    }

    Some(trimmed.to_string())
}

/// Escapes newlines in event titles and texts, which would otherwise split the datagram.
pub fn escape_event_text(text: &str) -> Cow<'_, str> {
    if text.contains('\n') {
        Cow::Owned(text.replace('\n', "\\n"))
    } else {
        Cow::Borrowed(text)
    }
}
