// /////////////////////////////////////////////////////////////////////////////
// Telemetry Agent
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Configuration Snapshots
//!
//! The two immutable configuration inputs the harvest core consumes:
//!
//! - [`ConnectReply`]: the collector's connect-time snapshot (apdex
//!   thresholds, rename rules, reservoir capacities)
//! - [`AgentConfig`]: the host application's settings (attribute
//!   filtering, host display name)
//!
//! Parsing configuration *files* is out of scope; these types are the
//! already-parsed snapshots handed to the core.

pub mod agent_config;
pub mod connect_reply;

pub use agent_config::AgentConfig;
pub use connect_reply::ConnectReply;
