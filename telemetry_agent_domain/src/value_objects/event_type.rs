// /////////////////////////////////////////////////////////////////////////////
// Telemetry Agent
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Custom Event Type Value Object
//!
//! Caller-supplied custom events carry a type name the collector indexes
//! on. The grammar is `[A-Za-z0-9:_]{1,255}`; anything else is rejected at
//! creation so malformed types never reach a payload.

use crate::error::AgentError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

static EVENT_TYPE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9:_]{1,255}$").expect("event type pattern is valid"));

/// Validated custom event type name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventType(String);

impl EventType {
    /// Creates a validated event type.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::EventTypeInvalid`] if the name is empty,
    /// longer than 255 characters, or contains characters outside
    /// `[A-Za-z0-9:_]`.
    pub fn new(name: impl Into<String>) -> Result<Self, AgentError> {
        let name = name.into();
        if !EVENT_TYPE_PATTERN.is_match(&name) {
            return Err(AgentError::event_type_invalid(name));
        }
        Ok(EventType(name))
    }

    /// Gets the type name
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
