// /////////////////////////////////////////////////////////////////////////////
// Telemetry Agent
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Apdex Zone Value Object
//!
//! Apdex scores a transaction's duration against a threshold `T`:
//! satisfied when `duration ≤ T`, tolerating when `duration ≤ 4T`, and
//! frustrated otherwise. The zone feeds both the apdex metric bucket and
//! the `nr.apdexPerfZone` intrinsic on transaction events.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// User-satisfaction classification of a completed transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApdexZone {
    Satisfied,
    Tolerating,
    Frustrated,
}

impl ApdexZone {
    /// Classifies a duration against an apdex threshold.
    pub fn classify(duration: Duration, threshold: Duration) -> Self {
        if duration <= threshold {
            ApdexZone::Satisfied
        } else if duration <= threshold * 4 {
            ApdexZone::Tolerating
        } else {
            ApdexZone::Frustrated
        }
    }

    /// Single-letter wire label used in event intrinsics.
    pub fn label(&self) -> &'static str {
        match self {
            ApdexZone::Satisfied => "S",
            ApdexZone::Tolerating => "T",
            ApdexZone::Frustrated => "F",
        }
    }
}
