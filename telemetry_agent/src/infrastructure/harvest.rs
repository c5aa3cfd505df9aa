// /////////////////////////////////////////////////////////////////////////////
// Telemetry Agent
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Harvest
//!
//! One reporting period's worth of accumulated telemetry. A harvest owns
//! the metric table, the three event reservoirs, and the error trace
//! buffer; it is created when a period starts and consumed into payloads
//! when the period ends.
//!
//! ## Lifecycle
//!
//! 1. `Harvest::new(now, limits)` opens the period with
//!    `metric_period_start = now`.
//! 2. Transactions fold their terminal records in (under the
//!    coordinator's lock).
//! 3. At rotation, `create_final_metrics` injects the supportability
//!    metrics exactly once, then `into_payloads` consumes the harvest
//!    into the ordered payload list.
//! 4. A payload the transport could not deliver folds into the *next*
//!    harvest via [`payload::HarvestPayload::merge_into`].
//!
//! Empty payloads still appear in the list; the caller may skip their
//! transport.

pub mod payload;

pub use payload::HarvestPayload;

use chrono::{DateTime, Utc};

use telemetry_agent_domain::entities::metric_table::{names, MAX_METRICS};
use telemetry_agent_domain::entities::MetricTable;

use crate::infrastructure::collectors::{
    CustomEventBuffer, ErrorEventBuffer, ErrorTraceBuffer, TransactionEventBuffer, MAX_HARVEST_ERRORS,
};

/// Default transaction event reservoir capacity.
pub const MAX_TXN_EVENTS: usize = 10 * 1000;

/// Default custom event reservoir capacity.
pub const MAX_CUSTOM_EVENTS: usize = 10 * 1000;

/// Default error event reservoir capacity.
pub const MAX_ERROR_EVENTS: usize = 100;

/// Per-harvest container capacities, from the collector reply.
#[derive(Debug, Clone, Copy)]
pub struct HarvestLimits {
    pub max_metrics: usize,
    pub max_txn_events: usize,
    pub max_custom_events: usize,
    pub max_error_events: usize,
    pub max_error_traces: usize,
}

impl Default for HarvestLimits {
    fn default() -> Self {
        HarvestLimits {
            max_metrics: MAX_METRICS,
            max_txn_events: MAX_TXN_EVENTS,
            max_custom_events: MAX_CUSTOM_EVENTS,
            max_error_events: MAX_ERROR_EVENTS,
            max_error_traces: MAX_HARVEST_ERRORS,
        }
    }
}

/// All telemetry accumulated for one reporting period.
#[derive(Debug)]
pub struct Harvest {
    pub metrics: MetricTable,
    pub custom_events: CustomEventBuffer,
    pub txn_events: TransactionEventBuffer,
    pub error_events: ErrorEventBuffer,
    pub error_traces: ErrorTraceBuffer,
}

impl Harvest {
    /// Opens a fresh harvest whose metric period starts at `now`
    pub fn new(now: DateTime<Utc>, limits: &HarvestLimits) -> Self {
        Harvest {
            metrics: MetricTable::new(limits.max_metrics, now),
            custom_events: CustomEventBuffer::new(limits.max_custom_events),
            txn_events: TransactionEventBuffer::new(limits.max_txn_events),
            error_events: ErrorEventBuffer::new(limits.max_error_events),
            error_traces: ErrorTraceBuffer::new(limits.max_error_traces),
        }
    }

    /// Injects the supportability metrics. Called exactly once per
    /// harvest, immediately before serialization.
    pub fn create_final_metrics(&mut self) {
        self.metrics.add_single_count(names::INSTANCE_REPORTING, true);

        self.metrics
            .add_count(names::CUSTOM_EVENTS_SEEN, self.custom_events.num_seen() as f64, true);
        self.metrics
            .add_count(names::CUSTOM_EVENTS_SENT, self.custom_events.num_saved() as f64, true);

        self.metrics
            .add_count(names::TXN_EVENTS_SEEN, self.txn_events.num_seen() as f64, true);
        self.metrics
            .add_count(names::TXN_EVENTS_SENT, self.txn_events.num_saved() as f64, true);

        self.metrics
            .add_count(names::ERROR_EVENTS_SEEN, self.error_events.num_seen() as f64, true);
        self.metrics
            .add_count(names::ERROR_EVENTS_SENT, self.error_events.num_saved() as f64, true);

        let dropped = self.metrics.num_dropped();
        if dropped > 0 {
            self.metrics.add_count(names::METRICS_DROPPED, dropped as f64, true);
        }
    }

    /// Consumes the harvest into its ordered payload list: metrics,
    /// error traces, transaction events, error events, custom events.
    pub fn into_payloads(self) -> Vec<HarvestPayload> {
        vec![
            HarvestPayload::Metrics(self.metrics),
            HarvestPayload::ErrorTraces(self.error_traces),
            HarvestPayload::TxnEvents(self.txn_events),
            HarvestPayload::ErrorEvents(self.error_events),
            HarvestPayload::CustomEvents(self.custom_events),
        ]
    }
}
