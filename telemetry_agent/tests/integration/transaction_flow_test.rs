// /////////////////////////////////////////////////////////////////////////////
// Telemetry Agent
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Transaction Flow Tests
//!
//! Drives the public surface the way an instrumented service would: name
//! canonicalization, apdex resolution, attribute capture, commit under
//! concurrency, and rotation.

use chrono::{DateTime, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::Duration;

use telemetry_agent::infrastructure::collectors::TransactionEvent;
use telemetry_agent::{
    AgentConfig, ApdexZone, AttributeStore, AttributeValue, ConnectReply, HarvestCoordinator, MetricTable,
    TransactionCommit,
};

use crate::common::find_metric;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

fn commit_for(reply: &ConnectReply, config: &AgentConfig, path: &str, duration: Duration) -> Option<TransactionCommit> {
    let name = reply.full_transaction_name(path, true)?;
    let threshold = reply.apdex_threshold(&name);
    let zone = ApdexZone::classify(duration, threshold);

    let filter = config.attribute_filter();
    let mut attrs = AttributeStore::new();
    attrs
        .add_user("customer", AttributeValue::from("zip"), &filter)
        .unwrap();
    config.apply_host_display_name(&mut attrs, &filter);
    attrs.close();

    let mut metrics = MetricTable::new(reply.harvest_limits().max_metrics, now());
    metrics.add_duration(&name, "", duration, duration, true);
    metrics.add_apdex("Apdex", threshold, zone, true);

    Some(TransactionCommit {
        event: TransactionEvent {
            name,
            timestamp: now(),
            duration,
            zone: Some(zone),
            attrs: Arc::new(attrs),
            ..TransactionEvent::default()
        },
        metrics,
        errors: Vec::new(),
        traces: Vec::new(),
    })
}

#[test]
fn test_full_transaction_flow() {
    crate::common::init_tracing();
    let reply = ConnectReply::default();
    let config = AgentConfig {
        host_display_name: Some("my-host".to_string()),
        ..AgentConfig::default()
    };
    let coordinator = HarvestCoordinator::with_rng(&reply, now(), StdRng::seed_from_u64(1));

    // 1.2s against the default 0.5s threshold lands in the tolerating zone.
    let commit = commit_for(&reply, &config, "/hello", Duration::from_millis(1200)).unwrap();
    assert_eq!(commit.event.name, "WebTransaction/Go/hello");
    coordinator.commit(commit);

    let end = now() + chrono::Duration::minutes(1);
    let payloads = coordinator.rotate(end);

    let metrics_body = payloads
        .iter()
        .find(|p| p.endpoint() == "metric_data")
        .unwrap()
        .data("12345", end)
        .unwrap();
    let duration_metric = find_metric(&metrics_body, "WebTransaction/Go/hello").unwrap();
    assert_eq!(duration_metric[0], 1.0);
    assert_eq!(duration_metric[1], 1.2);
    assert_eq!(find_metric(&metrics_body, "Apdex"), Some([0.0, 1.0, 0.0, 0.5, 0.5, 0.0]));

    let events_body = payloads
        .iter()
        .find(|p| p.endpoint() == "analytic_event_data")
        .unwrap()
        .data("12345", end)
        .unwrap();
    let json: serde_json::Value = serde_json::from_str(&events_body).unwrap();
    let event = &json[2][0];
    assert_eq!(event[0]["name"], "WebTransaction/Go/hello");
    assert_eq!(event[0]["nr.apdexPerfZone"], "T");
    assert_eq!(event[1]["customer"], "zip");
    assert_eq!(event[2]["host.displayName"], "my-host");
}

#[test]
fn test_ignored_path_records_nothing() {
    let reply: ConnectReply =
        serde_json::from_str(r#"{"url_rules": [{"match_expression": ".*zip.*$", "ignore": true}]}"#).unwrap();
    let config = AgentConfig::default();
    assert!(commit_for(&reply, &config, "/zap/zip/zep", Duration::from_millis(10)).is_none());
}

#[test]
fn test_key_transaction_apdex_applies() {
    let reply: ConnectReply =
        serde_json::from_str(r#"{"apdex_t": 1.3, "key_transactions": {"WebTransaction/Go/zip": 2.2}}"#).unwrap();
    let config = AgentConfig::default();

    // 2.0s satisfies the 2.2s key-transaction threshold...
    let commit = commit_for(&reply, &config, "/zip", Duration::from_secs(2)).unwrap();
    assert_eq!(commit.event.zone, Some(ApdexZone::Satisfied));

    // ...but tolerates against the 1.3s default elsewhere.
    let commit = commit_for(&reply, &config, "/zap", Duration::from_secs(2)).unwrap();
    assert_eq!(commit.event.zone, Some(ApdexZone::Tolerating));
}

#[test]
fn test_concurrent_commits_are_all_counted() {
    let reply = ConnectReply::default();
    let config = AgentConfig::default();
    let coordinator = Arc::new(HarvestCoordinator::with_rng(&reply, now(), StdRng::seed_from_u64(2)));

    let threads: Vec<_> = (0..8)
        .map(|_| {
            let coordinator = Arc::clone(&coordinator);
            let reply = reply.clone();
            let config = config.clone();
            std::thread::spawn(move || {
                for _ in 0..50 {
                    let commit = commit_for(&reply, &config, "/hello", Duration::from_millis(100)).unwrap();
                    coordinator.commit(commit);
                }
            })
        })
        .collect();
    for thread in threads {
        thread.join().unwrap();
    }

    let end = now() + chrono::Duration::minutes(1);
    let payloads = coordinator.rotate(end);
    let metrics_body = payloads
        .iter()
        .find(|p| p.endpoint() == "metric_data")
        .unwrap()
        .data("12345", end)
        .unwrap();

    let duration_metric = find_metric(&metrics_body, "WebTransaction/Go/hello").unwrap();
    assert_eq!(duration_metric[0], 400.0);
    assert_eq!(
        find_metric(&metrics_body, "Supportability/AnalyticsEvents/TotalEventsSeen"),
        Some([400.0, 0.0, 0.0, 0.0, 0.0, 0.0])
    );
}
