// /////////////////////////////////////////////////////////////////////////////
// Telemetry Agent
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Metric Table Entity
//!
//! This module provides the keyed timeslice aggregation at the heart of
//! the harvest core. Every observation - request durations, error counts,
//! apdex buckets, supportability counters - folds into a six-float record
//! keyed by `(name, scope)`, and the whole table ships to the collector
//! once per reporting period.
//!
//! ## Overview
//!
//! The metric table provides:
//!
//! - **Aggregation**: count, total, exclusive, min, max, and
//!   sum-of-squares per key
//! - **Scoping**: an empty scope marks a roll-up; a non-empty scope nests
//!   the metric under a transaction name
//! - **Bounded memory**: a fixed capacity from server configuration;
//!   over-capacity unforced inserts are dropped and counted
//! - **Merge-back**: a failed harvest folds into the next one, carrying
//!   the earlier period start so the collector sees one continuous window
//!
//! ## Apdex Encoding
//!
//! Apdex buckets reuse the same six floats: the first three slots hold the
//! satisfied/tolerating/frustrated counters and min/max hold the threshold
//! bounds. The standard merge rule (sum the first three, min/max the next
//! two) is therefore correct for apdex entries as well.
//!
//! ## Invariants
//!
//! - `count ≥ 1` for every observation-driven entry
//! - `min ≤ max` and `exclusive ≤ total` for duration entries
//! - table size never exceeds its capacity plus the forced entries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::value_objects::ApdexZone;

/// Well-known metric names emitted by the harvest core.
pub mod names {
    pub const INSTANCE_REPORTING: &str = "Instance/Reporting";
    pub const CUSTOM_EVENTS_SEEN: &str = "Supportability/Events/Customer/Seen";
    pub const CUSTOM_EVENTS_SENT: &str = "Supportability/Events/Customer/Sent";
    pub const TXN_EVENTS_SEEN: &str = "Supportability/AnalyticsEvents/TotalEventsSeen";
    pub const TXN_EVENTS_SENT: &str = "Supportability/AnalyticsEvents/TotalEventsSent";
    pub const ERROR_EVENTS_SEEN: &str = "Supportability/Events/TransactionError/Seen";
    pub const ERROR_EVENTS_SENT: &str = "Supportability/Events/TransactionError/Sent";
    pub const METRICS_DROPPED: &str = "Supportability/MetricsDropped";
    pub const NAME_RULES_DROPPED: &str = "Supportability/TxnNameRules/Dropped";
}

/// Default metric table capacity when the collector does not override it.
pub const MAX_METRICS: usize = 2 * 1000;

/// Merge-back attempts after which an unreported metric table is dropped.
pub const FAILED_METRIC_ATTEMPTS_LIMIT: u32 = 5;

/// Metric identity: name plus optional transaction scope.
///
/// An empty scope marks the unscoped roll-up.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MetricKey {
    pub name: String,
    pub scope: String,
}

impl MetricKey {
    /// Creates an unscoped (roll-up) key
    pub fn unscoped(name: impl Into<String>) -> Self {
        MetricKey {
            name: name.into(),
            scope: String::new(),
        }
    }

    /// Creates a key scoped under a transaction name
    pub fn scoped(name: impl Into<String>, scope: impl Into<String>) -> Self {
        MetricKey {
            name: name.into(),
            scope: scope.into(),
        }
    }

    /// Checks whether this key is a roll-up
    pub fn is_unscoped(&self) -> bool {
        self.scope.is_empty()
    }
}

/// The six-float aggregate stored per metric key.
///
/// Pure counters leave everything but `count` at zero. Apdex entries
/// reuse `count`/`total`/`exclusive` as the satisfied/tolerating/
/// frustrated buckets and `min`/`max` as the threshold bounds.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricData {
    pub count: f64,
    pub total: f64,
    pub exclusive: f64,
    pub min: f64,
    pub max: f64,
    pub sum_squares: f64,
}

impl MetricData {
    /// Data for a pure counter
    pub fn from_count(count: f64) -> Self {
        MetricData {
            count,
            ..MetricData::default()
        }
    }

    /// Data for a single duration observation, in seconds
    pub fn from_duration(total: Duration, exclusive: Duration) -> Self {
        let total = total.as_secs_f64();
        MetricData {
            count: 1.0,
            total,
            exclusive: exclusive.as_secs_f64(),
            min: total,
            max: total,
            sum_squares: total * total,
        }
    }

    /// Data for a single apdex observation
    pub fn from_apdex(zone: ApdexZone, threshold: Duration) -> Self {
        let threshold = threshold.as_secs_f64();
        let (satisfied, tolerating, frustrated) = match zone {
            ApdexZone::Satisfied => (1.0, 0.0, 0.0),
            ApdexZone::Tolerating => (0.0, 1.0, 0.0),
            ApdexZone::Frustrated => (0.0, 0.0, 1.0),
        };
        MetricData {
            count: satisfied,
            total: tolerating,
            exclusive: frustrated,
            min: threshold,
            max: threshold,
            sum_squares: 0.0,
        }
    }

    /// Folds another aggregate into this one.
    pub fn aggregate(&mut self, other: &MetricData) {
        self.count += other.count;
        self.total += other.total;
        self.exclusive += other.exclusive;
        if other.min < self.min {
            self.min = other.min;
        }
        if other.max > self.max {
            self.max = other.max;
        }
        self.sum_squares += other.sum_squares;
    }

    /// The collector array form `[count, total, exclusive, min, max, sos]`
    pub fn as_array(&self) -> [f64; 6] {
        [
            self.count,
            self.total,
            self.exclusive,
            self.min,
            self.max,
            self.sum_squares,
        ]
    }
}

#[derive(Debug, Clone)]
struct Metric {
    data: MetricData,
    forced: bool,
}

/// Keyed timeslice metric aggregation for one reporting period.
///
/// The table owns its period start so that a failed harvest can hand the
/// original window boundary to its successor. Capacity bounds only
/// unforced entries: supportability and other forced metrics always land.
#[derive(Debug, Clone)]
pub struct MetricTable {
    metrics: HashMap<MetricKey, Metric>,
    capacity: usize,
    num_dropped: u64,
    period_start: DateTime<Utc>,
    failed_harvests: u32,
}

impl MetricTable {
    /// Creates an empty table for a period starting at `period_start`
    pub fn new(capacity: usize, period_start: DateTime<Utc>) -> Self {
        MetricTable {
            metrics: HashMap::new(),
            capacity,
            num_dropped: 0,
            period_start,
            failed_harvests: 0,
        }
    }

    fn add(&mut self, key: MetricKey, data: MetricData, forced: bool) {
        if let Some(existing) = self.metrics.get_mut(&key) {
            existing.data.aggregate(&data);
            existing.forced = existing.forced || forced;
            return;
        }
        if !forced && self.metrics.len() >= self.capacity {
            self.num_dropped += 1;
            return;
        }
        self.metrics.insert(key, Metric { data, forced });
    }

    /// Adds `count` to an unscoped counter metric
    pub fn add_count(&mut self, name: &str, count: f64, forced: bool) {
        self.add(MetricKey::unscoped(name), MetricData::from_count(count), forced);
    }

    /// Increments an unscoped counter metric by one
    pub fn add_single_count(&mut self, name: &str, forced: bool) {
        self.add_count(name, 1.0, forced);
    }

    /// Records a duration observation under `(name, scope)`
    pub fn add_duration(&mut self, name: &str, scope: &str, total: Duration, exclusive: Duration, forced: bool) {
        self.add(
            MetricKey::scoped(name, scope),
            MetricData::from_duration(total, exclusive),
            forced,
        );
    }

    /// Records an apdex observation under the unscoped `name`
    pub fn add_apdex(&mut self, name: &str, threshold: Duration, zone: ApdexZone, forced: bool) {
        self.add(
            MetricKey::unscoped(name),
            MetricData::from_apdex(zone, threshold),
            forced,
        );
    }

    /// Gets the aggregate stored under `(name, scope)`
    pub fn get(&self, name: &str, scope: &str) -> Option<&MetricData> {
        self.metrics
            .get(&MetricKey {
                name: name.to_string(),
                scope: scope.to_string(),
            })
            .map(|m| &m.data)
    }

    /// Checks whether the table holds no metrics
    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Gets the number of stored metrics
    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    /// Iterates over all stored `(key, data)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&MetricKey, &MetricData)> {
        self.metrics.iter().map(|(k, m)| (k, &m.data))
    }

    /// Gets the count of unforced inserts dropped at capacity
    pub fn num_dropped(&self) -> u64 {
        self.num_dropped
    }

    /// Gets the start of the reporting window this table covers
    pub fn period_start(&self) -> DateTime<Utc> {
        self.period_start
    }

    /// Gets how many consecutive harvests of this data have failed
    pub fn failed_harvests(&self) -> u32 {
        self.failed_harvests
    }

    /// Folds every entry of `other` into this table.
    ///
    /// Merged entries keep their forced flag, so a forced metric from a
    /// failed harvest cannot be squeezed out by capacity in its new home.
    pub fn merge(&mut self, other: MetricTable) {
        for (key, metric) in other.metrics {
            self.add(key, metric.data, metric.forced);
        }
    }

    /// Folds back a table whose harvest could not be delivered.
    ///
    /// The earlier period start wins, so the next payload still covers the
    /// full unreported window. After [`FAILED_METRIC_ATTEMPTS_LIMIT`]
    /// consecutive failures the data is abandoned.
    pub fn merge_failed(&mut self, other: MetricTable) {
        let fails = other.failed_harvests + 1;
        if fails >= FAILED_METRIC_ATTEMPTS_LIMIT {
            return;
        }
        if other.period_start < self.period_start {
            self.period_start = other.period_start;
        }
        self.failed_harvests = fails;
        self.merge(other);
    }
}
