// /////////////////////////////////////////////////////////////////////////////
// Telemetry Agent
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Event Stamp Value Object
//!
//! The reservoir priority assigned to every analytics event at insertion.
//! A stamp is a uniform float in `[0, 1)`; when a buffer is full, the
//! incoming event lands at slot `floor(stamp * capacity)` and wins only if
//! its stamp is lower than the incumbent's. Stamps come from an injected
//! random source so tests can seed the sampling deterministically.

use crate::error::AgentError;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Uniform reservoir priority in `[0, 1)`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct EventStamp(f64);

impl EventStamp {
    /// Creates a stamp from a raw priority.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InternalError`] if the value is outside
    /// `[0, 1)`; stamps are produced by the agent itself, so an
    /// out-of-range value is a programming error at the call site.
    pub fn new(value: f64) -> Result<Self, AgentError> {
        if !(0.0..1.0).contains(&value) {
            return Err(AgentError::internal_error(format!(
                "event stamp {} outside [0, 1)",
                value
            )));
        }
        Ok(EventStamp(value))
    }

    /// Draws a stamp from the supplied random source.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        // Rng::random::<f64> is uniform over [0, 1) by contract.
        EventStamp(rng.random::<f64>())
    }

    /// Gets the raw priority
    pub fn value(&self) -> f64 {
        self.0
    }

    /// Reservoir slot this stamp maps to for a buffer of `capacity`.
    ///
    /// The stamp contract guarantees the result is in
    /// `0..capacity` for any non-zero capacity.
    pub fn slot(&self, capacity: usize) -> usize {
        (self.0 * capacity as f64) as usize
    }
}
