// /////////////////////////////////////////////////////////////////////////////
// Telemetry Agent
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Event Collectors
//!
//! Typed, capacity-bounded containers for the terminal records a
//! transaction produces, each serializing to the collector's array
//! format:
//!
//! - [`analytics_events`]: the generic priority-sampled reservoir
//! - [`txn_events`] / [`error_events`] / [`custom_events`]: the three
//!   reservoir-backed event channels
//! - [`error_traces`]: the first-N error trace buffer
//!
//! Every event is a self-contained three-element array - intrinsics,
//! user attributes, agent attributes - with timestamps in float seconds.

pub mod analytics_events;
pub mod custom_events;
pub mod error_events;
pub mod error_traces;
pub mod txn_events;

pub use analytics_events::{AnalyticsEventBuffer, CollectorEvent};
pub use custom_events::{CustomEvent, CustomEventBuffer};
pub use error_events::{ErrorEvent, ErrorEventBuffer};
pub use error_traces::{ErrorTraceBuffer, TracedError, MAX_HARVEST_ERRORS};
pub use txn_events::{TransactionEvent, TransactionEventBuffer};

use std::time::Duration;

use telemetry_agent_domain::value_objects::AttributeValue;

use crate::infrastructure::serialization::JsonBuffer;

/// External and datastore roundtrip totals accumulated over one
/// transaction, attached to both transaction and error events.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoundtripTotals {
    pub external_call_count: u64,
    pub external_duration: Duration,
    pub datastore_call_count: u64,
    pub datastore_duration: Duration,
}

/// Writes one attribute value in its wire form.
pub(crate) fn write_attribute_value(buf: &mut JsonBuffer, value: &AttributeValue) {
    match value {
        AttributeValue::Text(s) => buf.string(s),
        AttributeValue::Integer(i) => buf.int(*i),
        AttributeValue::Float(f) => buf.float(*f),
        AttributeValue::Boolean(b) => buf.bool(*b),
    }
}

/// Writes an attribute iterator as a JSON object.
pub(crate) fn write_attribute_object<'a>(
    buf: &mut JsonBuffer,
    attrs: impl Iterator<Item = (&'a str, &'a AttributeValue)>,
) {
    buf.raw("{");
    for (i, (key, value)) in attrs.enumerate() {
        if i > 0 {
            buf.raw(",");
        }
        buf.string(key);
        buf.raw(":");
        write_attribute_value(buf, value);
    }
    buf.raw("}");
}
