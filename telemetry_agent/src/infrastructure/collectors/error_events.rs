// /////////////////////////////////////////////////////////////////////////////
// Telemetry Agent
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Error Events
//!
//! Per-error records sampled alongside transaction events. An error event
//! carries the error class and message plus the timing context of the
//! transaction it occurred in.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use telemetry_agent_domain::entities::AttributeStore;
use telemetry_agent_domain::value_objects::Destinations;

use crate::infrastructure::collectors::analytics_events::{AnalyticsEventBuffer, CollectorEvent};
use crate::infrastructure::collectors::{write_attribute_object, RoundtripTotals};
use crate::infrastructure::serialization::{duration_to_float_seconds, time_to_float_seconds, JsonBuffer};

/// Reservoir of error events for one harvest.
pub type ErrorEventBuffer = AnalyticsEventBuffer<ErrorEvent>;

/// One error observed during a transaction.
#[derive(Debug, Clone)]
pub struct ErrorEvent {
    pub klass: String,
    pub msg: String,
    pub when: DateTime<Utc>,
    pub txn_name: String,
    pub duration: Duration,
    pub queuing: Duration,
    pub totals: RoundtripTotals,
    pub attrs: Arc<AttributeStore>,
}

impl Default for ErrorEvent {
    fn default() -> Self {
        ErrorEvent {
            klass: String::new(),
            msg: String::new(),
            when: DateTime::<Utc>::UNIX_EPOCH,
            txn_name: String::new(),
            duration: Duration::ZERO,
            queuing: Duration::ZERO,
            totals: RoundtripTotals::default(),
            attrs: Arc::new(AttributeStore::new()),
        }
    }
}

impl CollectorEvent for ErrorEvent {
    fn write_json(&self, buf: &mut JsonBuffer) {
        buf.raw("[{\"type\":\"TransactionError\",\"error.class\":");
        buf.string(&self.klass);
        buf.raw(",\"error.message\":");
        buf.string(&self.msg);
        buf.raw(",\"timestamp\":");
        buf.float(time_to_float_seconds(self.when));
        buf.raw(",\"transactionName\":");
        buf.string(&self.txn_name);
        buf.raw(",\"duration\":");
        buf.float(duration_to_float_seconds(self.duration));

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
        write_attribute_object(buf, self.attrs.user_view(Destinations::ERROR_EVENT));
        buf.raw(",");
        write_attribute_object(buf, self.attrs.agent_view(Destinations::ERROR_EVENT));
        buf.raw("]");
    }
}
