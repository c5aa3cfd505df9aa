// /////////////////////////////////////////////////////////////////////////////
// Telemetry Agent
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Agent Configuration
//!
//! Host-side settings the harvest core consumes: the attribute filtering
//! snapshot and the optional host display name surfaced as an agent
//! attribute on every transaction.

use serde::{Deserialize, Serialize};

use telemetry_agent_domain::entities::attribute_store::agent_keys;
use telemetry_agent_domain::entities::AttributeStore;
use telemetry_agent_domain::services::{AttributeFilter, AttributeSettings};
use telemetry_agent_domain::value_objects::AttributeValue;

/// Host application configuration snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub host_display_name: Option<String>,
    pub attributes: AttributeSettings,
}

impl AgentConfig {
    /// Compiles the attribute destination filter from this snapshot
    pub fn attribute_filter(&self) -> AttributeFilter {
        AttributeFilter::new(&self.attributes)
    }

    /// Populates the configured host display name onto a transaction's
    /// attribute store.
    pub fn apply_host_display_name(&self, store: &mut AttributeStore, filter: &AttributeFilter) {
        if let Some(name) = &self.host_display_name {
            store.add_agent(agent_keys::HOST_DISPLAY_NAME, AttributeValue::text(name.clone()), filter);
        }
    }
}
