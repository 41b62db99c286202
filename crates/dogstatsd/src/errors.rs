// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

/// Errors raised while encoding a datagram
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum EncodeError {
    #[error("metric name cannot be empty")]
    EmptyName,

    #[error("gauge value for '{0}' is not a finite number")]
    NonFiniteValue(String),

    #[error("event title cannot be empty")]
    EmptyTitle,
}

/// Errors raised by the DogStatsD client
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Failed to encode datagram: {0}")]
    Encode(#[from] EncodeError),

    #[error("Failed to bind local UDP socket: {0}")]
    Bind(std::io::Error),

    #[error("Failed to connect to DogStatsD agent at {addr}: {source}")]
    Connect {
        addr: String,
        source: std::io::Error,
    },

    #[error("Failed to send datagram: {0}")]
    Send(std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = EncodeError::NonFiniteValue("job_result".to_string());
        assert_eq!(
            error.to_string(),
            "gauge value for 'job_result' is not a finite number"
        );

        let error = ClientError::from(EncodeError::EmptyTitle);
        assert_eq!(
            error.to_string(),
            "Failed to encode datagram: event title cannot be empty"
        );
    }
}
