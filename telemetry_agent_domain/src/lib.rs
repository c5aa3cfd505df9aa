// /////////////////////////////////////////////////////////////////////////////
// Telemetry Agent
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Telemetry Agent Domain
//!
//! The domain layer of the in-process telemetry harvest core. It holds
//! the business rules of observation - what an attribute may contain,
//! where it may travel, how timeslice metrics aggregate, and how raw
//! request paths canonicalize into transaction names - independent of
//! wire formats, locking, and transport.
//!
//! ## Module Structure
//!
//! ### Entities
//! Mutable aggregates with identity through time:
//!
//! - `MetricTable`: keyed `(count, total, exclusive, min, max,
//!   sum-of-squares)` aggregation under a fixed capacity, carrying its
//!   reporting-period start across failed harvests
//! - `AttributeStore`: one transaction's user and agent attributes with a
//!   close-once lifecycle
//!
//! ### Value Objects
//! Immutable, self-validating concepts:
//!
//! - `AttributeValue`: the four collector value shapes, with truncation
//!   and finiteness rules applied at construction
//! - `Destinations`: the frozen per-attribute consumer bitmask
//! - `EventStamp`: reservoir priority in `[0, 1)`
//! - `EventType`: validated custom event type name
//! - `ApdexZone`: satisfied/tolerating/frustrated classification
//!
//! ### Domain Services
//! Stateless rule evaluation:
//!
//! - `AttributeFilter`: compiled include/exclude matching per destination
//! - `transaction_naming`: URL rules, transaction-name rules, and segment
//!   terms applied in collector order
//!
//! ## Error Handling
//!
//! Every fallible operation returns [`AgentError`]; the domain never
//! panics on caller input and never aborts the host service.

pub mod entities;
pub mod error;
pub mod services;
pub mod value_objects;

// Re-export commonly used types for convenient access
pub use entities::{AttributeStore, MetricData, MetricKey, MetricTable};
pub use error::AgentError;
pub use services::{AttributeFilter, AttributeSettings};
pub use value_objects::{ApdexZone, AttributeValue, Destinations, EventStamp, EventType};
