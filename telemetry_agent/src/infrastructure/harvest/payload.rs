// /////////////////////////////////////////////////////////////////////////////
// Telemetry Agent
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Harvest Payloads
//!
//! The tagged payload variants a rotated harvest breaks into. Each
//! variant knows its collector endpoint, its wire serialization, and how
//! to fold itself back into the next harvest when the transport reports a
//! retry-worthy failure. The transport decides retry versus discard; this
//! module only provides the folding primitive.

use chrono::{DateTime, Utc};

use telemetry_agent_domain::entities::MetricTable;

use crate::infrastructure::collectors::{
    CustomEventBuffer, ErrorEventBuffer, ErrorTraceBuffer, TransactionEventBuffer,
};
use crate::infrastructure::harvest::Harvest;
use crate::infrastructure::serialization::{time_to_float_seconds, JsonBuffer};

/// One deliverable slice of a rotated harvest.
#[derive(Debug)]
pub enum HarvestPayload {
    Metrics(MetricTable),
    ErrorTraces(ErrorTraceBuffer),
    TxnEvents(TransactionEventBuffer),
    ErrorEvents(ErrorEventBuffer),
    CustomEvents(CustomEventBuffer),
}

impl HarvestPayload {
    /// Gets the collector endpoint this payload posts to
    pub fn endpoint(&self) -> &'static str {
        match self {
            HarvestPayload::Metrics(_) => "metric_data",
            HarvestPayload::ErrorTraces(_) => "error_data",
            HarvestPayload::TxnEvents(_) => "analytic_event_data",
            HarvestPayload::ErrorEvents(_) => "error_event_data",
            HarvestPayload::CustomEvents(_) => "custom_event_data",
        }
    }

    /// Serializes the payload body. `None` means there is nothing to
    /// send and the caller may skip transport.
    pub fn data(&self, agent_run_id: &str, now: DateTime<Utc>) -> Option<String> {
        match self {
            HarvestPayload::Metrics(table) => metrics_json(table, agent_run_id, now),
            HarvestPayload::ErrorTraces(traces) => traces.collector_json(agent_run_id),
            HarvestPayload::TxnEvents(events) => events.collector_json(agent_run_id),
            HarvestPayload::ErrorEvents(events) => events.collector_json(agent_run_id),
            HarvestPayload::CustomEvents(events) => events.collector_json(agent_run_id),
        }
    }

    /// Folds a retry-worthy payload into the next harvest.
    ///
    /// Error traces are deliberately not merged: they are cheap to lose
    /// and must not grow without bound across failures.
    pub fn merge_into(self, next: &mut Harvest) {
        match self {
            HarvestPayload::Metrics(table) => next.metrics.merge_failed(table),
            HarvestPayload::ErrorTraces(_) => {}
            HarvestPayload::TxnEvents(events) => next.txn_events.merge_failed(events),
            HarvestPayload::ErrorEvents(events) => next.error_events.merge_failed(events),
            HarvestPayload::CustomEvents(events) => next.custom_events.merge_failed(events),
        }
    }
}

/// Writes the metric payload
/// `[run_id, start_epoch_s, end_epoch_s, [[{"name", "scope"?}, six-tuple], ...]]`.
fn metrics_json(table: &MetricTable, agent_run_id: &str, now: DateTime<Utc>) -> Option<String> {
    if table.is_empty() {
        return None;
    }
    let mut buf = JsonBuffer::with_capacity(64 * table.len());
    buf.raw("[");
    buf.string(agent_run_id);
    buf.raw(",");
    buf.float(time_to_float_seconds(table.period_start()));
    buf.raw(",");
    buf.float(time_to_float_seconds(now));
    buf.raw(",[");
    for (i, (key, data)) in table.iter().enumerate() {
        if i > 0 {
            buf.raw(",");
        }
        buf.raw("[{\"name\":");
        buf.string(&key.name);
        if !key.is_unscoped() {
            buf.raw(",\"scope\":");
            buf.string(&key.scope);
        }
        buf.raw("},[");
        for (j, value) in data.as_array().iter().enumerate() {
            if j > 0 {
                buf.raw(",");
            }
            buf.float(*value);
        }
        buf.raw("]]");
    }
    buf.raw("]]");
    Some(buf.into_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::Value;
    use std::time::Duration;
    use telemetry_agent_domain::entities::metric_table::MAX_METRICS;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_endpoints_and_order_fixed() {
        let harvest = Harvest::new(start(), &crate::infrastructure::harvest::HarvestLimits::default());
        let endpoints: Vec<_> = harvest.into_payloads().iter().map(|p| p.endpoint()).collect();
        assert_eq!(
            endpoints,
            vec![
                "metric_data",
                "error_data",
                "analytic_event_data",
                "error_event_data",
                "custom_event_data"
            ]
        );
    }

    #[test]
    fn test_metrics_payload_shape() {
        let mut table = MetricTable::new(MAX_METRICS, start());
        table.add_count("zip", 1.0, true);
        table.add_duration(
            "External/all",
            "WebTransaction/Go/hello",
            Duration::from_secs(2),
            Duration::from_secs(1),
            false,
        );

        let end = start() + chrono::Duration::minutes(1);
        let payload = HarvestPayload::Metrics(table);
        let json: Value = serde_json::from_str(&payload.data("12345", end).unwrap()).unwrap();

        assert_eq!(json[0], "12345");
        assert_eq!(json[1].as_f64().unwrap(), 1_748_779_200.0);
        assert_eq!(json[2].as_f64().unwrap(), 1_748_779_260.0);

        let entries = json[3].as_array().unwrap();
        assert_eq!(entries.len(), 2);

        let unscoped = entries
            .iter()
            .find(|e| e[0]["name"] == "zip")
            .expect("zip metric present");
        assert!(unscoped[0].get("scope").is_none());
        assert_eq!(unscoped[1], serde_json::json!([1.0, 0.0, 0.0, 0.0, 0.0, 0.0]));

        let scoped = entries
            .iter()
            .find(|e| e[0]["name"] == "External/all")
            .expect("scoped metric present");
        assert_eq!(scoped[0]["scope"], "WebTransaction/Go/hello");
        assert_eq!(scoped[1], serde_json::json!([1.0, 2.0, 1.0, 2.0, 2.0, 4.0]));
    }

    #[test]
    fn test_empty_metric_table_has_no_payload() {
        let table = MetricTable::new(MAX_METRICS, start());
        let payload = HarvestPayload::Metrics(table);
        assert!(payload.data("12345", start()).is_none());
    }
}
