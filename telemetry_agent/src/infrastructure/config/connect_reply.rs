// /////////////////////////////////////////////////////////////////////////////
// Telemetry Agent
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Connect Reply
//!
//! The collector's configuration snapshot, received once at connect time
//! and immutable afterwards. Rename rules deserialize straight into their
//! compiled form, so an invalid pattern is dropped (and counted) the
//! moment the reply is parsed, never at apply time.

use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;

use telemetry_agent_domain::entities::metric_table::MAX_METRICS;
use telemetry_agent_domain::services::transaction_naming::{self, TransactionNameRules};

use crate::infrastructure::collectors::MAX_HARVEST_ERRORS;
use crate::infrastructure::harvest::{HarvestLimits, MAX_CUSTOM_EVENTS, MAX_ERROR_EVENTS, MAX_TXN_EVENTS};

/// Default apdex threshold in seconds.
pub const DEFAULT_APDEX_THRESHOLD_SECONDS: f64 = 0.5;

/// Collector configuration snapshot.
///
/// Unknown reply fields are ignored; missing fields take the defaults
/// below, so `ConnectReply::default()` describes a collector that has
/// sent nothing unusual.
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectReply {
    #[serde(default = "default_apdex_t")]
    pub apdex_t: f64,
    #[serde(rename = "key_transactions", default)]
    pub key_txn_apdex: HashMap<String, f64>,
    #[serde(flatten)]
    pub naming: TransactionNameRules,
    #[serde(default = "default_max_txn_events")]
    pub max_transaction_events: usize,
    #[serde(default = "default_max_custom_events")]
    pub max_custom_events: usize,
    #[serde(default = "default_max_error_events")]
    pub max_error_events: usize,
    #[serde(default = "default_max_metrics")]
    pub max_metrics: usize,
}

fn default_apdex_t() -> f64 {
    DEFAULT_APDEX_THRESHOLD_SECONDS
}

fn default_max_txn_events() -> usize {
    MAX_TXN_EVENTS
}

fn default_max_custom_events() -> usize {
    MAX_CUSTOM_EVENTS
}

fn default_max_error_events() -> usize {
    MAX_ERROR_EVENTS
}

fn default_max_metrics() -> usize {
    MAX_METRICS
}

impl Default for ConnectReply {
    fn default() -> Self {
        ConnectReply {
            apdex_t: DEFAULT_APDEX_THRESHOLD_SECONDS,
            key_txn_apdex: HashMap::new(),
            naming: TransactionNameRules::default(),
            max_transaction_events: MAX_TXN_EVENTS,
            max_custom_events: MAX_CUSTOM_EVENTS,
            max_error_events: MAX_ERROR_EVENTS,
            max_metrics: MAX_METRICS,
        }
    }
}

impl ConnectReply {
    /// Resolves the apdex threshold for a final transaction name: the
    /// key-transaction entry if one exists, otherwise `apdex_t`.
    pub fn apdex_threshold(&self, final_name: &str) -> Duration {
        let seconds = self
            .key_txn_apdex
            .get(final_name)
            .copied()
            .unwrap_or(self.apdex_t);
        Duration::from_secs_f64(seconds)
    }

    /// Canonicalizes a raw request path into the final transaction name.
    /// `None` means an ignore rule matched and nothing is recorded.
    pub fn full_transaction_name(&self, path: &str, is_web: bool) -> Option<String> {
        transaction_naming::full_transaction_name(path, is_web, &self.naming)
    }

    /// Gets the per-harvest container capacities
    pub fn harvest_limits(&self) -> HarvestLimits {
        HarvestLimits {
            max_metrics: self.max_metrics,
            max_txn_events: self.max_transaction_events,
            max_custom_events: self.max_custom_events,
            max_error_events: self.max_error_events,
            max_error_traces: MAX_HARVEST_ERRORS,
        }
    }
}
