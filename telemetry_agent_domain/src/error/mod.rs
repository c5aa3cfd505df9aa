// /////////////////////////////////////////////////////////////////////////////
// Telemetry Agent
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Domain Error Module
//!
//! Error types for the telemetry agent domain. See [`AgentError`] for the
//! full catalog of failure modes surfaced to instrumentation callers.

pub mod agent_error;

pub use agent_error::AgentError;
