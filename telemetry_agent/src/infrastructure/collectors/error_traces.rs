// /////////////////////////////////////////////////////////////////////////////
// Telemetry Agent
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Error Traces
//!
//! Full error records with stack traces, kept first-come up to a small
//! per-harvest cap. Traces are cheap to lose and expensive to keep, so
//! unlike the event reservoirs they do not participate in merge-back: a
//! failed harvest drops its traces.
//!
//! Trace timestamps are float milliseconds on the wire; the event
//! payloads use float seconds.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use telemetry_agent_domain::entities::AttributeStore;
use telemetry_agent_domain::value_objects::Destinations;

use crate::infrastructure::collectors::write_attribute_object;
use crate::infrastructure::serialization::{time_to_float_millis, JsonBuffer};

/// Maximum number of error traces kept per harvest.
pub const MAX_HARVEST_ERRORS: usize = 20;

/// One fully traced error.
#[derive(Debug, Clone)]
pub struct TracedError {
    pub when: DateTime<Utc>,
    pub txn_name: String,
    pub msg: String,
    pub klass: String,
    pub stack: Vec<String>,
    pub request_uri: String,
    pub attrs: Arc<AttributeStore>,
}

impl Default for TracedError {
    fn default() -> Self {
        TracedError {
            when: DateTime::<Utc>::UNIX_EPOCH,
            txn_name: String::new(),
            msg: String::new(),
            klass: String::new(),
            stack: Vec::new(),
            request_uri: String::new(),
            attrs: Arc::new(AttributeStore::new()),
        }
    }
}

impl TracedError {
    fn write_json(&self, buf: &mut JsonBuffer) {
        buf.raw("[");
        buf.float(time_to_float_millis(self.when));
        buf.raw(",");
        buf.string(&self.txn_name);
        buf.raw(",");
        buf.string(&self.msg);
        buf.raw(",");
        buf.string(&self.klass);
        buf.raw(",{\"stack_trace\":[");
        for (i, frame) in self.stack.iter().enumerate() {
            if i > 0 {
                buf.raw(",");
            }
            buf.string(frame);
        }
        buf.raw("],\"agentAttributes\":");
        write_attribute_object(buf, self.attrs.agent_view(Destinations::ERROR_TRACE));
        buf.raw(",\"userAttributes\":");
        write_attribute_object(buf, self.attrs.user_view(Destinations::ERROR_TRACE));
        buf.raw(",\"intrinsics\":{},\"request_uri\":");
        buf.string(&self.request_uri);
        buf.raw("}]");
    }
}

/// First-come error trace buffer for one harvest.
#[derive(Debug, Default)]
pub struct ErrorTraceBuffer {
    traces: Vec<TracedError>,
    capacity: usize,
}

impl ErrorTraceBuffer {
    /// Creates an empty buffer of the given capacity
    pub fn new(capacity: usize) -> Self {
        ErrorTraceBuffer {
            traces: Vec::new(),
            capacity,
        }
    }

    /// Keeps the trace if the buffer still has room.
    pub fn add(&mut self, trace: TracedError) {
        if self.traces.len() < self.capacity {
            self.traces.push(trace);
        }
    }

    /// Gets the number of stored traces
    pub fn len(&self) -> usize {
        self.traces.len()
    }

    /// Checks whether the buffer holds no traces
    pub fn is_empty(&self) -> bool {
        self.traces.is_empty()
    }

    /// Iterates the stored traces
    pub fn iter(&self) -> impl Iterator<Item = &TracedError> {
        self.traces.iter()
    }

    /// Serializes the collector payload `[run_id, [trace, ...]]`, `None`
    /// when empty.
    pub fn collector_json(&self, agent_run_id: &str) -> Option<String> {
        if self.traces.is_empty() {
            return None;
        }
        let mut buf = JsonBuffer::with_capacity(512 * self.traces.len());
        buf.raw("[");
        buf.string(agent_run_id);
        buf.raw(",[");
        for (i, trace) in self.traces.iter().enumerate() {
            if i > 0 {
                buf.raw(",");
            }
            trace.write_json(&mut buf);
        }
        buf.raw("]]");
        Some(buf.into_string())
    }
}
