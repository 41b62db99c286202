// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Helper functions for integration tests

use std::sync::Arc;

use cloud_job_metrics::handler::ResourceHandler;
use cloud_job_metrics::submitter::MetricSubmitter;
use cloud_job_metrics::test_utils::{InMemoryQueue, InMemoryStore, RecordingAgent};
use dogstatsd::{DogStatsDClient, DogStatsDClientConfig};
use tokio::net::UdpSocket;
use tokio::time::{timeout, Duration};

pub const BUCKET: &str = "cloud-job-results-bucket";

/// In-memory queue, store and agent wired into a submitter
pub struct Harness {
    pub queue: Arc<InMemoryQueue>,
    pub store: Arc<InMemoryStore>,
    pub agent: Arc<RecordingAgent>,
    pub submitter: MetricSubmitter,
}

impl Harness {
    pub fn new() -> Self {
        let queue = Arc::new(InMemoryQueue::new());
        let store = Arc::new(InMemoryStore::new());
        let agent = Arc::new(RecordingAgent::new());
        let handler = ResourceHandler::new(queue.clone(), store.clone());
        let submitter = MetricSubmitter::new(handler, agent.clone());
        Self {
            queue,
            store,
            agent,
            submitter,
        }
    }

    /// Stores `payload` under `key` and enqueues the matching notification.
    pub fn publish(&self, key: &str, payload: &str) -> String {
        self.store.insert(BUCKET, key, payload.as_bytes());
        self.queue.push_notification(BUCKET, key)
    }
}

/// Binds a local socket standing in for the agent and a client pointed at it.
pub async fn udp_agent(metric_namespace: Option<&str>) -> (UdpSocket, DogStatsDClient) {
    let agent = UdpSocket::bind("127.0.0.1:0")
        .await
        .expect("unable to bind agent socket");
    let port = agent.local_addr().expect("no local addr").port();
    let client = DogStatsDClient::new(&DogStatsDClientConfig {
        host: "127.0.0.1".to_string(),
        port,
        metric_namespace: metric_namespace.map(str::to_string),
    })
    .await
    .expect("failed to create client");
    (agent, client)
}

pub async fn receive_datagram(agent: &UdpSocket) -> String {
    let mut buf = [0; 8192];
    match timeout(Duration::from_millis(1000), agent.recv_from(&mut buf)).await {
        Ok(Ok((amt, _))) => String::from_utf8(buf[..amt].to_vec()).expect("datagram is not utf-8"),
        Ok(Err(e)) => panic!("unable to receive datagram: {e}"),
        Err(_) => panic!("timed out before agent received datagram"),
    }
}
