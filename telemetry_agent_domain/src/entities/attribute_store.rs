// /////////////////////////////////////////////////////////////////////////////
// Telemetry Agent
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Attribute Store Entity
//!
//! Per-transaction attribute state. A store lives exactly as long as its
//! transaction: instrumentation adds user attributes while the request is
//! in flight, the agent adds its own attributes (response code, request
//! headers, host display name), and `close()` seals the store when the
//! transaction ends. Every attribute's destination mask is computed at
//! insertion from the active [`AttributeFilter`] and frozen.
//!
//! User and agent attributes are separated structurally, not semantically:
//! both follow the same destination rules, agent attributes merely have
//! internal producers and per-key default destinations (the `User-Agent`
//! and referer headers only reach error destinations by default).
//!
//! ## Lifecycle
//!
//! - A transaction may be ended exactly once; user attribute calls after
//!   `close()` return [`AgentError::AlreadyEnded`].
//! - At most [`MAX_USER_ATTRIBUTES`] user attributes are accepted;
//!   re-assigning an existing key does not count against the cap.

use std::collections::HashMap;

use crate::error::agent_error::MAX_USER_ATTRIBUTES;
use crate::error::AgentError;
use crate::services::attribute_filter::AttributeFilter;
use crate::value_objects::{AttributeValue, Destinations};

/// Maximum byte length of an attribute key.
pub const MAX_KEY_BYTES: usize = 255;

/// Well-known agent attribute keys and their default destinations.
pub mod agent_keys {
    use crate::value_objects::Destinations;

    pub const HOST_DISPLAY_NAME: &str = "host.displayName";
    pub const RESPONSE_CODE: &str = "httpResponseCode";
    pub const REQUEST_METHOD: &str = "request.method";
    pub const REQUEST_ACCEPT_HEADER: &str = "request.headers.accept";
    pub const REQUEST_CONTENT_TYPE: &str = "request.headers.contentType";
    pub const REQUEST_CONTENT_LENGTH: &str = "request.headers.contentLength";
    pub const REQUEST_HOST: &str = "request.headers.host";
    pub const REQUEST_USER_AGENT: &str = "request.headers.User-Agent";
    pub const REQUEST_REFERER: &str = "request.headers.referer";
    pub const RESPONSE_CONTENT_TYPE: &str = "response.headers.contentType";
    pub const RESPONSE_CONTENT_LENGTH: &str = "response.headers.contentLength";

    /// Default destination set for an agent attribute key.
    ///
    /// Request `User-Agent` and referer headers are error-only: they help
    /// diagnose failures but are too high-cardinality for routine events.
    pub fn default_destinations(key: &str) -> Destinations {
        match key {
            REQUEST_USER_AGENT | REQUEST_REFERER => Destinations::ERRORS,
            _ => Destinations::all(),
        }
    }
}

/// A stored attribute: validated value plus frozen destination mask.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub value: AttributeValue,
    pub destinations: Destinations,
}

/// Per-transaction attribute state with a close-once lifecycle.
#[derive(Debug, Default)]
pub struct AttributeStore {
    user: HashMap<String, Attribute>,
    agent: HashMap<String, Attribute>,
    closed: bool,
}

impl AttributeStore {
    /// Creates an empty store for a new transaction
    pub fn new() -> Self {
        AttributeStore::default()
    }

    /// Adds a user attribute.
    ///
    /// # Errors
    ///
    /// - [`AgentError::AlreadyEnded`] if the transaction has finished
    /// - [`AgentError::InvalidAttribute`] if the key exceeds
    ///   [`MAX_KEY_BYTES`]
    /// - [`AgentError::NumAttributesExceeded`] once
    ///   [`MAX_USER_ATTRIBUTES`] distinct keys are stored
    pub fn add_user(
        &mut self,
        key: impl Into<String>,
        value: AttributeValue,
        filter: &AttributeFilter,
    ) -> Result<(), AgentError> {
        if self.closed {
            return Err(AgentError::AlreadyEnded);
        }
        let key = key.into();
        if key.len() > MAX_KEY_BYTES {
            return Err(AgentError::invalid_attribute(format!(
                "attribute key exceeds {} bytes: {}...",
                MAX_KEY_BYTES,
                &key[..32.min(key.len())]
            )));
        }
        if self.user.len() >= MAX_USER_ATTRIBUTES && !self.user.contains_key(&key) {
            return Err(AgentError::NumAttributesExceeded);
        }
        let destinations = filter.destinations_for(&key, Destinations::all());
        self.user.insert(key, Attribute { value, destinations });
        Ok(())
    }

    /// Adds an agent attribute under its default destination set.
    ///
    /// Agent attributes are produced internally, so lifecycle and key
    /// validation do not apply; the destination filter still does.
    pub fn add_agent(&mut self, key: &str, value: AttributeValue, filter: &AttributeFilter) {
        let defaults = agent_keys::default_destinations(key);
        let destinations = filter.destinations_for(key, defaults);
        self.agent.insert(key.to_string(), Attribute { value, destinations });
    }

    /// Seals the store when the transaction ends
    pub fn close(&mut self) {
        self.closed = true;
    }

    /// Checks whether the transaction has ended
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Gets the number of stored user attributes
    pub fn user_len(&self) -> usize {
        self.user.len()
    }

    /// Iterates user attributes visible to `destination`
    pub fn user_view(&self, destination: Destinations) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.user
            .iter()
            .filter(move |(_, attr)| attr.destinations.contains(destination))
            .map(|(key, attr)| (key.as_str(), &attr.value))
    }

    /// Iterates agent attributes visible to `destination`
    pub fn agent_view(&self, destination: Destinations) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.agent
            .iter()
            .filter(move |(_, attr)| attr.destinations.contains(destination))
            .map(|(key, attr)| (key.as_str(), &attr.value))
    }

    /// Gets a user attribute's frozen destination mask (for diagnostics)
    pub fn user_destinations(&self, key: &str) -> Option<Destinations> {
        self.user.get(key).map(|attr| attr.destinations)
    }
}
