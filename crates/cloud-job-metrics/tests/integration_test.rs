// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

mod common;

use std::sync::Arc;

use chrono::NaiveDate;
use cloud_job_metrics::error::{BridgeError, QueueError, StoreError};
use cloud_job_metrics::handler::ResourceHandler;
use cloud_job_metrics::producer::MockProducer;
use cloud_job_metrics::submitter::{DrainSummary, MetricSubmitter};
use cloud_job_metrics::test_utils::{test_event_body, AgentCall, InMemoryQueue, InMemoryStore};
use cloud_job_metrics::AlertType;
use common::helpers::{receive_datagram, udp_agent, Harness, BUCKET};

fn tags() -> Vec<String> {
    vec!["cloud_job_metric".to_string()]
}

#[tokio::test]
async fn test_successful_job_is_reported_and_acknowledged() {
    let mut harness = Harness::new();
    let token = harness.publish(
        "date=20200112/metrics.json",
        r#"{"job_success": 1, "job_result": 123}"#,
    );

    let summary = harness.submitter.run().await.unwrap();

    assert_eq!(
        harness.agent.calls(),
        vec![
            AgentCall::Event {
                title: "Job Success!".to_string(),
                text: "Cloud process completed successfully.".to_string(),
                alert_type: AlertType::Success,
                tags: tags(),
            },
            AgentCall::Gauge {
                name: "job_result".to_string(),
                value: 123.0,
                tags: tags(),
            },
        ]
    );
    assert_eq!(
        summary,
        DrainSummary {
            successes: 1,
            gauges: 1,
            ..Default::default()
        }
    );
    assert_eq!(harness.queue.deleted(), vec![token]);
    assert_eq!(harness.queue.visible_len(), 0);
    assert_eq!(harness.queue.in_flight_len(), 0);
}

#[tokio::test]
async fn test_failed_job_is_reported_and_acknowledged() {
    let mut harness = Harness::new();
    harness.publish(
        "date=20200112/metrics.json",
        r#"{"job_success": 0, "job_result": 123}"#,
    );

    let summary = harness.submitter.run().await.unwrap();

    assert_eq!(
        harness.agent.calls(),
        vec![AgentCall::Event {
            title: "Job Failure!".to_string(),
            text: "Cloud process encountered a failure!".to_string(),
            alert_type: AlertType::Error,
            tags: tags(),
        }]
    );
    assert_eq!(summary.failures, 1);
    assert_eq!(harness.queue.deleted().len(), 1);
}

#[tokio::test]
async fn test_empty_queue_sends_nothing() {
    let mut harness = Harness::new();

    let summary = harness.submitter.run().await.unwrap();

    assert_eq!(summary, DrainSummary::default());
    assert!(harness.agent.calls().is_empty());
    assert!(harness.queue.deleted().is_empty());
    assert_eq!(harness.queue.receive_calls().len(), 1);
}

#[tokio::test]
async fn test_skipped_messages_are_acknowledged_without_metrics() {
    let mut harness = Harness::new();
    harness.queue.push_body(test_event_body(BUCKET));
    harness.publish("test.json", r#"{"job_success": 1, "job_result": 1}"#);
    harness.queue.push_notification(BUCKET, "date=20200113/metrics.json");
    harness.publish("date=20200114/metrics.json", "{}");

    let summary = harness.submitter.run().await.unwrap();

    assert!(harness.agent.calls().is_empty());
    assert_eq!(
        summary,
        DrainSummary {
            skipped_test_events: 1,
            skipped_invalid_keys: 1,
            skipped_missing_payloads: 2,
            ..Default::default()
        }
    );
    assert_eq!(harness.queue.deleted().len(), 4);
    assert_eq!(harness.queue.in_flight_len(), 0);
}

#[tokio::test]
async fn test_unrecognized_bodies_are_skipped() {
    let mut harness = Harness::new();
    harness.queue.push_body("not json at all");
    harness.queue.push_body(r#"{"Records": []}"#);

    let summary = harness.submitter.run().await.unwrap();

    assert_eq!(summary.skipped_invalid_keys, 2);
    assert_eq!(harness.queue.deleted().len(), 2);
}

#[tokio::test]
async fn test_percent_encoded_key_is_fetched_decoded() {
    let mut harness = Harness::new();
    harness.store.insert(
        BUCKET,
        "date=20200112/job metrics.json",
        br#"{"job_success": true, "job_result": 9}"#,
    );
    harness
        .queue
        .push_notification(BUCKET, "date%3D20200112/job%20metrics.json");

    let summary = harness.submitter.run().await.unwrap();

    assert_eq!(summary.successes, 1);
    assert_eq!(harness.agent.gauges().len(), 1);
}

#[tokio::test]
async fn test_drains_every_visible_message_in_order() {
    let mut harness = Harness::new();
    harness.publish(
        "date=20200112/metrics.json",
        r#"{"job_success": 1, "job_result": 1}"#,
    );
    harness.publish(
        "date=20200113/metrics.json",
        r#"{"job_success": 0, "job_result": 2}"#,
    );
    harness.publish(
        "date=20200114/metrics.json",
        r#"{"job_success": 1, "job_result": 3, "duration": 0.5}"#,
    );

    let summary = harness.submitter.run().await.unwrap();

    assert_eq!(summary.successes, 2);
    assert_eq!(summary.failures, 1);
    assert_eq!(summary.gauges, 3);
    let gauge_values: Vec<f64> = harness
        .agent
        .gauges()
        .into_iter()
        .filter_map(|call| match call {
            AgentCall::Gauge { value, .. } => Some(value),
            AgentCall::Event { .. } => None,
        })
        .collect();
    assert_eq!(gauge_values, vec![1.0, 3.0, 0.5]);
    // one receive per message plus the final empty one
    assert_eq!(harness.queue.receive_calls().len(), 4);
}

#[tokio::test]
async fn test_missing_queue_is_fatal() {
    let mut harness = Harness::new();
    harness.queue.fail_receive_with(QueueError::NonExistentQueue(
        "http://localstack:4566/000000000000/missing".to_string(),
    ));

    let err = harness.submitter.run().await.unwrap_err();

    assert!(err.is_fatal());
    assert_eq!(
        err.to_string(),
        "SQS queue does not exist (http://localstack:4566/000000000000/missing)"
    );
    assert!(harness.agent.calls().is_empty());
}

#[tokio::test]
async fn test_invalid_queue_address_is_fatal() {
    let mut harness = Harness::new();
    harness
        .queue
        .fail_receive_with(QueueError::InvalidAddress("not-a-url".to_string()));

    let err = harness.submitter.run().await.unwrap_err();

    assert_eq!(err, BridgeError::InvalidQueueAddress("not-a-url".to_string()));
    assert!(err.is_fatal());
}

#[tokio::test]
async fn test_store_error_stops_the_drain_without_acknowledging() {
    let mut harness = Harness::new();
    harness.publish(
        "date=20200112/metrics.json",
        r#"{"job_success": 1, "job_result": 123}"#,
    );
    harness
        .store
        .fail_get_with(StoreError::Service("AccessDenied".to_string()));

    let err = harness.submitter.run().await.unwrap_err();

    assert!(!err.is_fatal());
    assert!(harness.queue.deleted().is_empty());
    assert_eq!(harness.queue.in_flight_len(), 1);

    // the message comes back once its visibility timeout expires
    harness.queue.expire_visibility();
    let summary = harness.submitter.run().await.unwrap();
    assert_eq!(summary.successes, 1);
    assert_eq!(harness.queue.deleted().len(), 1);
}

#[tokio::test]
async fn test_produced_file_is_submitted_over_udp() {
    let queue = Arc::new(InMemoryQueue::new());
    let store = Arc::new(InMemoryStore::new());
    let producer = MockProducer::new(store.clone(), BUCKET);
    let key = producer
        .produce(NaiveDate::from_ymd_opt(2020, 1, 12).unwrap(), 123)
        .await
        .unwrap();
    queue.push_notification(BUCKET, &key);

    let (agent_socket, client) = udp_agent(None).await;
    let handler = ResourceHandler::new(queue.clone(), store);
    let mut submitter = MetricSubmitter::new(handler, Arc::new(client));

    let summary = submitter.run().await.unwrap();

    assert_eq!(summary.successes, 1);
    assert_eq!(
        receive_datagram(&agent_socket).await,
        "_e{12,37}:Job Success!|Cloud process completed successfully.|t:success|#cloud_job_metric"
    );
    assert_eq!(
        receive_datagram(&agent_socket).await,
        "job_result:123|g|#cloud_job_metric"
    );
}

#[tokio::test]
async fn test_namespace_prefixes_gauges_only() {
    let queue = Arc::new(InMemoryQueue::new());
    let store = Arc::new(InMemoryStore::new());
    store.insert(
        BUCKET,
        "date=20200112/metrics.json",
        br#"{"job_success": 1, "job_result": 5}"#,
    );
    queue.push_notification(BUCKET, "date=20200112/metrics.json");

    let (agent_socket, client) = udp_agent(Some("cloud")).await;
    let handler = ResourceHandler::new(queue, store);
    let mut submitter = MetricSubmitter::new(handler, Arc::new(client));

    submitter.run().await.unwrap();

    assert!(receive_datagram(&agent_socket)
        .await
        .starts_with("_e{12,37}:Job Success!|"));
    assert_eq!(
        receive_datagram(&agent_socket).await,
        "cloud.job_result:5|g|#cloud_job_metric"
    );
}
