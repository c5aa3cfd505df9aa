// /////////////////////////////////////////////////////////////////////////////
// Telemetry Agent
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Serialization Infrastructure
//!
//! Wire-format helpers shared by every collector payload. The collector
//! speaks positional JSON arrays with fixed numeric semantics, so the
//! writers live here rather than behind a general-purpose serializer.

pub mod json_buffer;

pub use json_buffer::JsonBuffer;

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Epoch timestamp as float seconds, the unit used by event payloads.
pub fn time_to_float_seconds(when: DateTime<Utc>) -> f64 {
    when.timestamp_micros() as f64 / 1_000_000.0
}

/// Epoch timestamp as float milliseconds, the unit used by error traces.
pub fn time_to_float_millis(when: DateTime<Utc>) -> f64 {
    when.timestamp_micros() as f64 / 1_000.0
}

/// Duration as float seconds.
pub fn duration_to_float_seconds(duration: Duration) -> f64 {
    duration.as_secs_f64()
}
