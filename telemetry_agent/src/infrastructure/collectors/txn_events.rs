// /////////////////////////////////////////////////////////////////////////////
// Telemetry Agent
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Transaction Events
//!
//! The timing summary recorded for every completed transaction. Events
//! serialize as `[intrinsics, user_attrs, agent_attrs]` with optional
//! fields (queueing, apdex zone, roundtrip totals) omitted when empty.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use telemetry_agent_domain::entities::AttributeStore;
use telemetry_agent_domain::value_objects::{ApdexZone, Destinations};

use crate::infrastructure::collectors::analytics_events::{AnalyticsEventBuffer, CollectorEvent};
use crate::infrastructure::collectors::{write_attribute_object, RoundtripTotals};
use crate::infrastructure::serialization::{duration_to_float_seconds, time_to_float_seconds, JsonBuffer};

/// Reservoir of transaction events for one harvest.
pub type TransactionEventBuffer = AnalyticsEventBuffer<TransactionEvent>;

/// Timing summary of one completed transaction.
#[derive(Debug, Clone)]
pub struct TransactionEvent {
    pub name: String,
    pub timestamp: DateTime<Utc>,
    pub duration: Duration,
    pub zone: Option<ApdexZone>,
    pub queuing: Duration,
    pub totals: RoundtripTotals,
    pub attrs: Arc<AttributeStore>,
}

impl Default for TransactionEvent {
    fn default() -> Self {
        TransactionEvent {
            name: String::new(),
            timestamp: DateTime::<Utc>::UNIX_EPOCH,
            duration: Duration::ZERO,
            zone: None,
            queuing: Duration::ZERO,
            totals: RoundtripTotals::default(),
            attrs: Arc::new(AttributeStore::new()),
        }
    }
}

impl CollectorEvent for TransactionEvent {
    fn write_json(&self, buf: &mut JsonBuffer) {
        buf.raw("[{\"type\":\"Transaction\",\"name\":");
        buf.string(&self.name);
        buf.raw(",\"timestamp\":");
        buf.float(time_to_float_seconds(self.timestamp));
        buf.raw(",\"duration\":");
        buf.float(duration_to_float_seconds(self.duration));

        if let Some(zone) = self.zone {
            buf.raw(",\"nr.apdexPerfZone\":");
            buf.string(zone.label());
        }
        if self.queuing > Duration::ZERO {
            buf.raw(",\"queueDuration\":");
            buf.float(duration_to_float_seconds(self.queuing));
        }
        if self.totals.external_call_count > 0 {
            buf.raw(",\"externalCallCount\":");
            buf.uint(self.totals.external_call_count);
            buf.raw(",\"externalDuration\":");
            buf.float(duration_to_float_seconds(self.totals.external_duration));
        }
        if self.totals.datastore_call_count > 0 {
            // "database" rather than "datastore" is the wire contract.
            buf.raw(",\"databaseCallCount\":");
            buf.uint(self.totals.datastore_call_count);
            buf.raw(",\"databaseDuration\":");
            buf.float(duration_to_float_seconds(self.totals.datastore_duration));
        }

        buf.raw("},");
        write_attribute_object(buf, self.attrs.user_view(Destinations::TXN_EVENT));
        buf.raw(",");
        write_attribute_object(buf, self.attrs.agent_view(Destinations::TXN_EVENT));
        buf.raw("]");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::Value;
    use telemetry_agent_domain::services::attribute_filter::{AttributeFilter, AttributeSettings};
    use telemetry_agent_domain::value_objects::AttributeValue;

    fn render(event: &TransactionEvent) -> Value {
        let mut buf = JsonBuffer::new();
        event.write_json(&mut buf);
        serde_json::from_str(buf.as_str()).unwrap()
    }

    #[test]
    fn test_minimal_event_shape() {
        let event = TransactionEvent {
            name: "WebTransaction/Go/hello".to_string(),
            timestamp: Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
            duration: Duration::from_millis(250),
            ..TransactionEvent::default()
        };
        let json = render(&event);

        assert_eq!(json[0]["type"], "Transaction");
        assert_eq!(json[0]["name"], "WebTransaction/Go/hello");
        assert_eq!(json[0]["duration"], 0.25);
        assert!(json[0].get("queueDuration").is_none());
        assert!(json[0].get("nr.apdexPerfZone").is_none());
        assert_eq!(json[1], serde_json::json!({}));
        assert_eq!(json[2], serde_json::json!({}));
    }

    #[test]
    fn test_optional_intrinsics_present_when_set() {
        let event = TransactionEvent {
            name: "WebTransaction/Go/zip".to_string(),
            timestamp: Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
            duration: Duration::from_secs(1),
            zone: Some(ApdexZone::Frustrated),
            queuing: Duration::from_millis(50),
            totals: RoundtripTotals {
                external_call_count: 2,
                external_duration: Duration::from_millis(300),
                datastore_call_count: 3,
                datastore_duration: Duration::from_millis(400),
            },
            ..TransactionEvent::default()
        };
        let json = render(&event);

        assert_eq!(json[0]["nr.apdexPerfZone"], "F");
        assert_eq!(json[0]["queueDuration"], 0.05);
        assert_eq!(json[0]["externalCallCount"], 2);
        assert_eq!(json[0]["externalDuration"], 0.3);
        assert_eq!(json[0]["databaseCallCount"], 3);
        assert_eq!(json[0]["databaseDuration"], 0.4);
    }

    #[test]
    fn test_attributes_filtered_to_txn_event_destination() {
        let filter = AttributeFilter::new(&AttributeSettings::default());
        let mut attrs = AttributeStore::new();
        attrs
            .add_user("myStr", AttributeValue::from("hello"), &filter)
            .unwrap();

        let event = TransactionEvent {
            attrs: Arc::new(attrs),
            ..TransactionEvent::default()
        };
        let json = render(&event);
        assert_eq!(json[1]["myStr"], "hello");
    }
}
