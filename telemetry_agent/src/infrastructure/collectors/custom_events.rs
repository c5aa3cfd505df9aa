// /////////////////////////////////////////////////////////////////////////////
// Telemetry Agent
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Custom Events
//!
//! Caller-supplied events: a validated type name plus a parameter map
//! held to the same rules as transaction attributes. Validation happens
//! once at creation; a stored custom event is always serializable.

use chrono::{DateTime, Utc};
use telemetry_agent_domain::error::agent_error::MAX_USER_ATTRIBUTES;
use telemetry_agent_domain::error::AgentError;
use telemetry_agent_domain::value_objects::attribute_value::MAX_TEXT_BYTES;
use telemetry_agent_domain::value_objects::{AttributeValue, EventType};

use crate::infrastructure::collectors::analytics_events::{AnalyticsEventBuffer, CollectorEvent};
use crate::infrastructure::collectors::write_attribute_value;
use crate::infrastructure::serialization::{time_to_float_seconds, JsonBuffer};

/// Reservoir of custom events for one harvest.
pub type CustomEventBuffer = AnalyticsEventBuffer<CustomEvent>;

/// A validated caller-supplied event.
#[derive(Debug, Clone)]
pub struct CustomEvent {
    event_type: EventType,
    timestamp: DateTime<Utc>,
    params: Vec<(String, AttributeValue)>,
}

impl CustomEvent {
    /// Validates and creates a custom event.
    ///
    /// Parameters follow the attribute rules: keys at most 255 bytes, at
    /// most [`MAX_USER_ATTRIBUTES`] of them, float values finite, and
    /// oversized string values truncated rather than rejected.
    ///
    /// # Errors
    ///
    /// - [`AgentError::EventTypeInvalid`] for a malformed type name
    /// - [`AgentError::InvalidAttribute`] for an oversized key or a
    ///   non-finite float value
    /// - [`AgentError::NumAttributesExceeded`] for too many parameters
    pub fn new(
        event_type: &str,
        params: impl IntoIterator<Item = (String, AttributeValue)>,
        now: DateTime<Utc>,
    ) -> Result<Self, AgentError> {
        let event_type = EventType::new(event_type)?;

        let mut validated = Vec::new();
        for (key, value) in params {
            if validated.len() >= MAX_USER_ATTRIBUTES {
                return Err(AgentError::NumAttributesExceeded);
            }
            if key.len() > MAX_TEXT_BYTES {
                return Err(AgentError::invalid_attribute(format!(
                    "custom event parameter key exceeds {} bytes",
                    MAX_TEXT_BYTES
                )));
            }
            let value = match value {
                AttributeValue::Float(f) if !f.is_finite() => {
                    return Err(AgentError::invalid_attribute(format!(
                        "custom event parameter {} is not finite",
                        key
                    )));
                }
                AttributeValue::Text(s) => AttributeValue::text(s),
                other => other,
            };
            validated.push((key, value));
        }

        Ok(CustomEvent {
            event_type,
            timestamp: now,
            params: validated,
        })
    }

    /// Gets the event type name
    pub fn event_type(&self) -> &str {
        self.event_type.as_str()
    }

    /// Gets the validated parameters
    pub fn params(&self) -> &[(String, AttributeValue)] {
        &self.params
    }
}

impl CollectorEvent for CustomEvent {
    fn write_json(&self, buf: &mut JsonBuffer) {
        buf.raw("[{\"type\":");
        buf.string(self.event_type.as_str());
        buf.raw(",\"timestamp\":");
        buf.float(time_to_float_seconds(self.timestamp));
        buf.raw("},{");
        for (i, (key, value)) in self.params.iter().enumerate() {
            if i > 0 {
                buf.raw(",");
            }
            buf.string(key);
            buf.raw(":");
            write_attribute_value(buf, value);
        }
        // Custom events carry no agent attributes.
        buf.raw("},{}]");
    }
}
