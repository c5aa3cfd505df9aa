// /////////////////////////////////////////////////////////////////////////////
// Telemetry Agent
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Telemetry Agent
//!
//! The in-process telemetry collection and harvest core of an application
//! performance monitoring agent. Embedded in a host service, it turns raw
//! per-request observations - timings, errors, custom events, attributes -
//! into collector wire-format payloads under bounded memory.
//!
//! ## Architecture Overview
//!
//! The crate follows the workspace's domain/infrastructure split:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Application Layer                          │
//! │  (HarvestCoordinator: the one lock in the system)           │
//! └─────────────────────────────────────────────────────────────┘
//!                                │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Domain Layer                             │
//! │  (MetricTable, AttributeStore, naming rules, value objects) │
//! └─────────────────────────────────────────────────────────────┘
//!                                │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                Infrastructure Layer                         │
//! │  (Reservoir buffers, wire serialization, config snapshots)  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Core Concepts
//!
//! ### Harvest
//! One reporting period's accumulated telemetry: a metric table, three
//! reservoir-sampled event buffers, and an error trace buffer. A periodic
//! trigger atomically swaps in a fresh harvest and enumerates the
//! finished generation's payloads; a payload the transport could not
//! deliver folds back into the next generation, once.
//!
//! ### Reservoir Sampling
//! Event buffers hold a uniform random sample of an unbounded stream.
//! Every event gets a priority stamp in `[0, 1)` at insertion; a full
//! buffer replaces at `floor(stamp * capacity)` only when the incoming
//! stamp is lower. Memory stays bounded no matter the request rate.
//!
//! ### Attributes
//! Validated key/value pairs with a per-attribute destination mask,
//! frozen at insertion from the host's include/exclude configuration.
//!
//! ## Boundaries
//!
//! The HTTP transport, the instrumentation API surface, and
//! configuration-file parsing live outside this crate. The core consumes
//! a clock, a random source, and configuration snapshots; it exposes
//! payload producers and merge-back. It guarantees bounded memory and
//! best-effort retry of one harvest - never delivery.

pub mod application;
pub mod infrastructure;

// Tests are organized as:
// - Unit tests: #[cfg(test)] modules within each source file
// - Integration tests: separate files in tests/ directory

// Re-export domain types for convenient access
pub use telemetry_agent_domain::{
    AgentError, ApdexZone, AttributeFilter, AttributeSettings, AttributeStore, AttributeValue, Destinations,
    EventStamp, EventType, MetricData, MetricKey, MetricTable,
};

pub use application::{HarvestCoordinator, TransactionCommit};
pub use infrastructure::config::{AgentConfig, ConnectReply};
pub use infrastructure::harvest::{Harvest, HarvestLimits, HarvestPayload};
