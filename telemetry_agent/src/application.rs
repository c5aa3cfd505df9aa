// /////////////////////////////////////////////////////////////////////////////
// Telemetry Agent
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Application Layer
//!
//! Coordination between concurrently running transactions and the
//! periodic harvest cycle. The domain and infrastructure layers are
//! lock-free; everything that needs synchronization lives here.

pub mod services;

pub use services::harvest_coordinator::{HarvestCoordinator, TransactionCommit};
