// /////////////////////////////////////////////////////////////////////////////
// Telemetry Agent
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Domain Error System
//!
//! This module provides the error system for the telemetry agent domain.
//! Every failure the harvest core can surface to an instrumentation caller
//! is enumerated here, categorized so callers can handle validation
//! failures, lifecycle violations, and configuration problems separately.
//!
//! ## Error Categories
//!
//! ### Validation Errors
//! - **InvalidAttribute**: attribute key or value outside the allowed set
//! - **EventTypeInvalid**: custom event type fails the type grammar
//! - **NumAttributesExceeded**: per-transaction user attribute cap reached
//!
//! ### Lifecycle Errors
//! - **AlreadyEnded**: operation attempted on a finished transaction
//!
//! ### Configuration and System Errors
//! - **InvalidConfiguration**: malformed collector or host settings
//! - **SerializationError**: payload or configuration (de)serialization
//!   failure
//! - **InternalError**: unexpected internal failure
//!
//! ## Recovery
//!
//! Every variant is recoverable at the caller site: the agent records the
//! failure and keeps observing, it never aborts the host service. Rule
//! compilation errors never reach this type at all; invalid rules are
//! dropped at configuration load with a log line.

use thiserror::Error;

/// Domain-specific errors for the telemetry harvest core.
///
/// Each variant represents a specific failure mode with enough context for
/// the instrumentation layer to report it to the host application. Errors
/// are designed to be cheap to construct and cloneable for logging.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AgentError {
    #[error("Invalid attribute: {0}")]
    InvalidAttribute(String),

    #[error("Transaction has already ended")]
    AlreadyEnded,

    #[error("Invalid event type: {0}")]
    EventTypeInvalid(String),

    #[error("Attribute limit of {MAX_USER_ATTRIBUTES} exceeded")]
    NumAttributesExceeded,

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Maximum number of user attributes accepted per transaction.
pub const MAX_USER_ATTRIBUTES: usize = 64;

impl AgentError {
    /// Creates a new invalid attribute error
    pub fn invalid_attribute(msg: impl Into<String>) -> Self {
        Self::InvalidAttribute(msg.into())
    }

    /// Creates a new invalid event type error
    pub fn event_type_invalid(msg: impl Into<String>) -> Self {
        Self::EventTypeInvalid(msg.into())
    }

    /// Creates a new configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    /// Creates a new internal error
    pub fn internal_error(msg: impl Into<String>) -> Self {
        Self::InternalError(msg.into())
    }

    /// Checks if the error is a validation failure (as opposed to a
    /// lifecycle or system failure)
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            AgentError::InvalidAttribute(_) | AgentError::EventTypeInvalid(_) | AgentError::NumAttributesExceeded
        )
    }

    /// Gets the error category
    pub fn category(&self) -> &'static str {
        match self {
            AgentError::InvalidAttribute(_) => "attribute",
            AgentError::AlreadyEnded => "lifecycle",
            AgentError::EventTypeInvalid(_) => "event",
            AgentError::NumAttributesExceeded => "attribute",
            AgentError::InvalidConfiguration(_) => "configuration",
            AgentError::SerializationError(_) => "serialization",
            AgentError::InternalError(_) => "internal",
        }
    }
}

impl From<serde_json::Error> for AgentError {
    fn from(err: serde_json::Error) -> Self {
        AgentError::SerializationError(err.to_string())
    }
}
