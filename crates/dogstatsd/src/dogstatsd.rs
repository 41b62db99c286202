// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! DogStatsD client implementation for shipping events and gauges.
//!
//! The client encodes one datagram per call and writes it to a connected UDP
//! socket. Delivery is fire-and-forget, as with any statsd client: a
//! successful send only means the datagram left the local socket.

use std::sync::{Arc, Mutex};

use tokio::net::UdpSocket;
use tracing::{debug, trace};

use crate::datagram::{AlertType, Event, Gauge};
use crate::errors::ClientError;

pub const DEFAULT_HOST: &str = "datadog-agent";
pub const DEFAULT_PORT: u16 = 8125;

// Local bind address, the kernel picks the port
const LOCAL_BIND_ADDR: &str = "0.0.0.0:0";

/// Configuration for the DogStatsD client
#[derive(Debug, Clone, PartialEq)]
pub struct DogStatsDClientConfig {
    /// Agent host to send datagrams to (e.g., "datadog-agent", "127.0.0.1")
    pub host: String,
    /// Agent DogStatsD port (e.g., 8125)
    pub port: u16,
    /// Optional namespace to prepend to all gauge names (e.g., "myapp")
    pub metric_namespace: Option<String>,
}

impl Default for DogStatsDClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            metric_namespace: None,
        }
    }
}

// Transport abstracts where encoded datagrams go.
enum Transport {
    /// Connected UDP socket (default transport)
    UdpSocket(UdpSocket),

    /// Capture writer for testing - keeps every datagram in memory
    #[allow(dead_code)]
    Capture(Arc<Mutex<Vec<String>>>),
}

impl Transport {
    async fn write(&self, datagram: &str) -> Result<(), ClientError> {
        match self {
            Transport::UdpSocket(socket) => {
                let sent = socket
                    .send(datagram.as_bytes())
                    .await
                    .map_err(ClientError::Send)?;
                trace!("Sent {} bytes to agent", sent);
                Ok(())
            }
            Transport::Capture(sink) => {
                if let Ok(mut sink) = sink.lock() {
                    sink.push(datagram.to_string());
                }
                Ok(())
            }
        }
    }
}

/// DogStatsD client to encode and send events and gauges.
pub struct DogStatsDClient {
    transport: Transport,
    metric_namespace: Option<String>,
}

impl DogStatsDClient {
    /// Creates a new client bound to an ephemeral local port and connected to the agent.
    ///
    /// Connecting resolves `host` once, so an unknown host fails here rather than on first send.
    pub async fn new(config: &DogStatsDClientConfig) -> Result<DogStatsDClient, ClientError> {
        let socket = UdpSocket::bind(LOCAL_BIND_ADDR)
            .await
            .map_err(ClientError::Bind)?;

        let addr = format!("{}:{}", config.host, config.port);
        socket
            .connect(&addr)
            .await
            .map_err(|source| ClientError::Connect {
                addr: addr.clone(),
                source,
            })?;
        debug!("DogStatsD client sending to {}", addr);

        Ok(DogStatsDClient {
            transport: Transport::UdpSocket(socket),
            metric_namespace: config.metric_namespace.clone(),
        })
    }

    /// Sends an event datagram.
    pub async fn event(
        &self,
        title: &str,
        text: &str,
        alert_type: AlertType,
        tags: &[&str],
    ) -> Result<(), ClientError> {
        let datagram = Event {
            title,
            text,
            alert_type,
            tags,
        }
        .encode()?;
        debug!("Sending event: {}", datagram);
        self.transport.write(&datagram).await
    }

    /// Sends a gauge datagram.
    pub async fn gauge(&self, name: &str, value: f64, tags: &[&str]) -> Result<(), ClientError> {
        let datagram = Gauge { name, value, tags }.encode(self.metric_namespace.as_deref())?;
        debug!("Sending gauge: {}", datagram);
        self.transport.write(&datagram).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn capture_client(metric_namespace: Option<String>) -> (DogStatsDClient, Arc<Mutex<Vec<String>>>) {
        let sink = Arc::new(Mutex::new(Vec::new()));
        let client = DogStatsDClient {
            transport: Transport::Capture(Arc::clone(&sink)),
            metric_namespace,
        };
        (client, sink)
    }

    #[tokio::test]
    async fn test_client_sends_event_and_gauge() {
        let (client, sink) = capture_client(None);

        client
            .event(
                "Job Failure!",
                "Cloud process encountered a failure!",
                AlertType::Error,
                &["cloud_job_metric"],
            )
            .await
            .unwrap();
        client
            .gauge("job_result", 42.0, &["cloud_job_metric"])
            .await
            .unwrap();

        let sent = sink.lock().unwrap();
        assert_eq!(
            *sent,
            vec![
                "_e{12,36}:Job Failure!|Cloud process encountered a failure!|t:error|#cloud_job_metric",
                "job_result:42|g|#cloud_job_metric",
            ]
        );
    }

    #[tokio::test]
    async fn test_client_applies_namespace_to_gauges_only() {
        let (client, sink) = capture_client(Some("cloud".to_string()));

        client.gauge("job_result", 1.5, &[]).await.unwrap();
        client
            .event("title", "text", AlertType::Info, &[])
            .await
            .unwrap();

        let sent = sink.lock().unwrap();
        assert_eq!(sent[0], "cloud.job_result:1.5|g");
        assert_eq!(sent[1], "_e{5,4}:title|text|t:info");
    }

    #[tokio::test]
    async fn test_client_encode_error_sends_nothing() {
        let (client, sink) = capture_client(None);

        let result = client.gauge("job_result", f64::NAN, &[]).await;

        assert!(matches!(result, Err(ClientError::Encode(_))));
        assert!(sink.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_client_connect_unknown_host_fails() {
        let config = DogStatsDClientConfig {
            host: "host.invalid".to_string(),
            ..Default::default()
        };

        let result = DogStatsDClient::new(&config).await;

        assert!(matches!(result, Err(ClientError::Connect { .. })));
    }

    #[test]
    fn test_default_config() {
        let config = DogStatsDClientConfig::default();
        assert_eq!(config.host, "datadog-agent");
        assert_eq!(config.port, 8125);
        assert_eq!(config.metric_namespace, None);
    }
}
