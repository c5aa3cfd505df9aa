// /////////////////////////////////////////////////////////////////////////////
// Telemetry Agent
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Harvest Cycle Tests
//!
//! End-to-end coverage of the harvest lifecycle: payload enumeration,
//! merge-back after a failed delivery, and the period-start carry.

use chrono::{DateTime, TimeZone, Utc};
use std::time::Duration;

use telemetry_agent::infrastructure::collectors::{
    CustomEvent, ErrorEvent, TracedError, TransactionEvent,
};
use telemetry_agent::{AttributeValue, EventStamp, Harvest, HarvestLimits};

use crate::common::find_metric;

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

fn stamp() -> EventStamp {
    EventStamp::new(0.4).unwrap()
}

fn populated_harvest(opened: DateTime<Utc>) -> Harvest {
    let mut harvest = Harvest::new(opened, &HarvestLimits::default());
    harvest.metrics.add_count("zip", 1.0, true);
    harvest.txn_events.add(
        TransactionEvent {
            name: "finalName".to_string(),
            timestamp: opened,
            duration: Duration::from_secs(1),
            ..TransactionEvent::default()
        },
        stamp(),
    );
    let custom = CustomEvent::new(
        "myEvent",
        [("zip".to_string(), AttributeValue::from(1_i64))],
        opened,
    )
    .unwrap();
    harvest.custom_events.add(custom, stamp());
    harvest.error_events.add(
        ErrorEvent {
            klass: "klass".to_string(),
            msg: "msg".to_string(),
            when: opened,
            txn_name: "finalName".to_string(),
            duration: Duration::from_secs(1),
            ..ErrorEvent::default()
        },
        stamp(),
    );
    harvest.error_traces.add(TracedError {
        when: opened,
        txn_name: "finalName".to_string(),
        msg: "msg".to_string(),
        klass: "klass".to_string(),
        stack: vec!["handler".to_string()],
        request_uri: "requestURI".to_string(),
        ..TracedError::default()
    });
    harvest
}

#[test]
fn test_merge_failed_harvest() {
    crate::common::init_tracing();
    let start1 = start();
    let start2 = start1 + chrono::Duration::minutes(1);

    let harvest = populated_harvest(start1);
    assert_eq!(harvest.metrics.period_start(), start1);
    assert_eq!(harvest.metrics.failed_harvests(), 0);
    assert_eq!(harvest.custom_events.failed_harvests(), 0);
    assert_eq!(harvest.txn_events.failed_harvests(), 0);
    assert_eq!(harvest.error_events.failed_harvests(), 0);
    assert_eq!(harvest.error_traces.len(), 1);

    let mut next = Harvest::new(start2, &HarvestLimits::default());
    assert_eq!(next.metrics.period_start(), start2);

    // Every payload fails transport and folds back.
    for payload in harvest.into_payloads() {
        payload.merge_into(&mut next);
    }

    assert_eq!(next.metrics.period_start(), start1);
    assert_eq!(next.metrics.failed_harvests(), 1);
    assert_eq!(next.custom_events.failed_harvests(), 1);
    assert_eq!(next.txn_events.failed_harvests(), 1);
    assert_eq!(next.error_events.failed_harvests(), 1);

    assert_eq!(next.metrics.get("zip", "").unwrap().count, 1.0);
    assert_eq!(next.txn_events.num_saved(), 1);
    assert_eq!(next.custom_events.num_saved(), 1);
    assert_eq!(next.error_events.num_saved(), 1);
    // Error traces are deliberately not merged.
    assert!(next.error_traces.is_empty());
}

#[test]
fn test_second_consecutive_failure_discards_events_but_not_metrics() {
    let start1 = start();
    let start2 = start1 + chrono::Duration::minutes(1);
    let start3 = start1 + chrono::Duration::minutes(2);

    let mut second = Harvest::new(start2, &HarvestLimits::default());
    for payload in populated_harvest(start1).into_payloads() {
        payload.merge_into(&mut second);
    }

    let mut third = Harvest::new(start3, &HarvestLimits::default());
    for payload in second.into_payloads() {
        payload.merge_into(&mut third);
    }

    // Two consecutive event failures exhaust the data budget.
    assert_eq!(third.txn_events.num_saved(), 0);
    assert_eq!(third.custom_events.num_saved(), 0);
    assert_eq!(third.error_events.num_saved(), 0);

    // Metrics survive longer and still carry the original period start.
    assert_eq!(third.metrics.get("zip", "").unwrap().count, 1.0);
    assert_eq!(third.metrics.period_start(), start1);
    assert_eq!(third.metrics.failed_harvests(), 2);
}

#[test]
fn test_payload_bodies_round_trip_the_records() {
    let mut harvest = populated_harvest(start());
    harvest.create_final_metrics();

    for payload in harvest.into_payloads() {
        let body = payload
            .data("12345", start() + chrono::Duration::minutes(1))
            .unwrap_or_else(|| panic!("{} should have data", payload.endpoint()));
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json[0], "12345");

        match payload.endpoint() {
            "metric_data" => {
                assert_eq!(find_metric(&body, "zip"), Some([1.0, 0.0, 0.0, 0.0, 0.0, 0.0]));
                assert_eq!(
                    find_metric(&body, "Instance/Reporting"),
                    Some([1.0, 0.0, 0.0, 0.0, 0.0, 0.0])
                );
            }
            "error_data" => {
                assert_eq!(json[1][0][1], "finalName");
                assert_eq!(json[1][0][3], "klass");
            }
            "analytic_event_data" => {
                assert_eq!(json[2][0][0]["name"], "finalName");
            }
            "error_event_data" => {
                assert_eq!(json[2][0][0]["error.message"], "msg");
            }
            "custom_event_data" => {
                assert_eq!(json[2][0][0]["type"], "myEvent");
                assert_eq!(json[2][0][1]["zip"], 1);
            }
            other => panic!("unexpected endpoint {}", other),
        }
    }
}
