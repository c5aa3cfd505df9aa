// /////////////////////////////////////////////////////////////////////////////
// Telemetry Agent
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Attribute Destinations
//!
//! Bitmask over the consumers an attribute may reach. The mask is computed
//! once from configuration when the attribute is recorded and frozen; a
//! later configuration change never rewrites attributes already stored.

use bitflags::bitflags;

bitflags! {
    /// Set of attribute consumers.
    ///
    /// Each recorded attribute carries the subset of destinations it is
    /// allowed to appear in. Serialization for a given payload intersects
    /// against the single destination it is building. The mask never
    /// leaves the process, so it has no wire form.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Destinations: u8 {
        const TXN_EVENT   = 1 << 0;
        const ERROR_EVENT = 1 << 1;
        const ERROR_TRACE = 1 << 2;
        const TXN_TRACE   = 1 << 3;
        const BROWSER     = 1 << 4;
    }
}

impl Destinations {
    /// Every destination except the browser, which is opt-in.
    pub const DEFAULT_ENABLED: Destinations = Destinations::TXN_EVENT
        .union(Destinations::ERROR_EVENT)
        .union(Destinations::ERROR_TRACE)
        .union(Destinations::TXN_TRACE);

    /// Destinations that receive error data.
    pub const ERRORS: Destinations = Destinations::ERROR_EVENT.union(Destinations::ERROR_TRACE);
}
