// /////////////////////////////////////////////////////////////////////////////
// Telemetry Agent
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Harvest Coordinator
//!
//! The synchronization point between concurrently finishing transactions
//! and the periodic harvest cycle. A single mutex guards the current
//! harvest:
//!
//! - Each in-flight transaction accumulates its attribute store and
//!   local metric buffer exclusively, lock-free. Transaction end takes
//!   the lock once, folds everything in, and releases.
//! - The periodic trigger swaps in a fresh harvest under the same lock,
//!   then finalizes and serializes the detached generation outside it.
//!   No operation performs I/O while holding the lock.
//!
//! Reservoir stamps come from an injected seedable RNG behind its own
//! mutex; stamps are drawn before the harvest lock is taken so the
//! critical section stays a handful of map operations.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

use telemetry_agent_domain::entities::metric_table::names;
use telemetry_agent_domain::entities::MetricTable;
use telemetry_agent_domain::error::AgentError;
use telemetry_agent_domain::value_objects::{AttributeValue, EventStamp};

use crate::infrastructure::collectors::{CustomEvent, ErrorEvent, TracedError, TransactionEvent};
use crate::infrastructure::config::ConnectReply;
use crate::infrastructure::harvest::{Harvest, HarvestLimits, HarvestPayload};

/// The terminal records of one finished transaction, folded into the
/// current harvest in a single lock acquisition.
#[derive(Debug)]
pub struct TransactionCommit {
    pub event: TransactionEvent,
    pub metrics: MetricTable,
    pub errors: Vec<ErrorEvent>,
    pub traces: Vec<TracedError>,
}

/// Owns the current harvest and serializes access to it.
pub struct HarvestCoordinator {
    current: Mutex<Harvest>,
    limits: HarvestLimits,
    rng: Mutex<StdRng>,
}

impl HarvestCoordinator {
    /// Creates a coordinator configured from the collector reply, with
    /// an OS-seeded stamp source.
    pub fn new(reply: &ConnectReply, now: DateTime<Utc>) -> Self {
        Self::with_rng(reply, now, StdRng::from_os_rng())
    }

    /// Creates a coordinator with an explicit stamp source, so tests can
    /// make reservoir sampling deterministic.
    pub fn with_rng(reply: &ConnectReply, now: DateTime<Utc>, rng: StdRng) -> Self {
        let limits = reply.harvest_limits();
        let mut harvest = Harvest::new(now, &limits);

        // Rules dropped at compile time surface once, in the first
        // generation's supportability metrics.
        let dropped_rules = reply.naming.dropped();
        if dropped_rules > 0 {
            harvest
                .metrics
                .add_count(names::NAME_RULES_DROPPED, dropped_rules as f64, true);
        }

        HarvestCoordinator {
            current: Mutex::new(harvest),
            limits,
            rng: Mutex::new(rng),
        }
    }

    fn next_stamp(&self) -> EventStamp {
        EventStamp::random(&mut *self.rng.lock())
    }

    /// Folds a finished transaction's terminal records into the current
    /// harvest.
    pub fn commit(&self, commit: TransactionCommit) {
        let event_stamp = self.next_stamp();
        let error_stamps: Vec<EventStamp> = commit.errors.iter().map(|_| self.next_stamp()).collect();

        let mut harvest = self.current.lock();
        harvest.metrics.merge(commit.metrics);
        harvest.txn_events.add(commit.event, event_stamp);
        for (error, stamp) in commit.errors.into_iter().zip(error_stamps) {
            harvest.error_events.add(error, stamp);
        }
        for trace in commit.traces {
            harvest.error_traces.add(trace);
        }
    }

    /// Validates and records a caller-supplied custom event.
    ///
    /// # Errors
    ///
    /// Propagates the creation errors of [`CustomEvent::new`]; a
    /// rejected event changes nothing.
    pub fn record_custom_event(
        &self,
        event_type: &str,
        params: impl IntoIterator<Item = (String, AttributeValue)>,
        now: DateTime<Utc>,
    ) -> Result<(), AgentError> {
        let event = CustomEvent::new(event_type, params, now)?;
        let stamp = self.next_stamp();
        self.current.lock().custom_events.add(event, stamp);
        Ok(())
    }

    /// Atomically starts a new reporting period and returns the finished
    /// generation's payloads.
    ///
    /// The swap happens under the lock; finalization and serialization
    /// run on the detached harvest afterwards.
    pub fn rotate(&self, now: DateTime<Utc>) -> Vec<HarvestPayload> {
        let fresh = Harvest::new(now, &self.limits);
        let mut finished = std::mem::replace(&mut *self.current.lock(), fresh);

        finished.create_final_metrics();
        debug!(
            metrics = finished.metrics.len(),
            txn_events = finished.txn_events.num_saved(),
            error_events = finished.error_events.num_saved(),
            custom_events = finished.custom_events.num_saved(),
            error_traces = finished.error_traces.len(),
            "rotated harvest"
        );
        finished.into_payloads()
    }

    /// Folds a payload the transport could not deliver back into the
    /// current harvest. The transport decides retry versus discard.
    pub fn merge_failed_payload(&self, payload: HarvestPayload) {
        debug!(endpoint = payload.endpoint(), "merging failed payload into next harvest");
        let mut harvest = self.current.lock();
        payload.merge_into(&mut harvest);
    }
}
