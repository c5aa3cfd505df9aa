// /////////////////////////////////////////////////////////////////////////////
// Telemetry Agent
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Analytics Event Reservoir
//!
//! This module provides the generic, fixed-capacity event buffer behind
//! every event channel. The buffer holds at most `capacity` events under
//! an unbounded offer stream, replacing uniformly at random so the
//! retained set stays a fair sample of everything seen.
//!
//! ## Sampling Contract
//!
//! Each offered event carries an externally assigned [`EventStamp`] - a
//! uniform priority in `[0, 1)`:
//!
//! - While `len < capacity` the event is appended.
//! - Otherwise the event targets slot `floor(stamp * capacity)` and wins
//!   only if its stamp is lower than the incumbent's.
//!
//! Replacement is deterministic given the stamp, so concurrent inserts
//! serialized by the harvest lock never reorder observationally.
//! `num_seen` counts every offer; `num_saved` is the retained count. Both
//! feed supportability metrics at harvest finalization.
//!
//! ## Merge-Back
//!
//! When a harvest fails to ship, its buffer folds into the successor via
//! [`AnalyticsEventBuffer::merge_failed`]. After
//! [`FAILED_EVENT_ATTEMPTS_LIMIT`] consecutive failures of the same
//! generation the data budget is exhausted and the buffer is discarded.

use telemetry_agent_domain::value_objects::EventStamp;

use crate::infrastructure::serialization::JsonBuffer;

/// Consecutive failed harvests after which an event buffer is discarded.
pub const FAILED_EVENT_ATTEMPTS_LIMIT: u32 = 2;

/// Events that know their collector wire form.
pub trait CollectorEvent {
    /// Writes the event's self-contained JSON array
    fn write_json(&self, buf: &mut JsonBuffer);
}

#[derive(Debug, Clone)]
struct StampedEvent<E> {
    stamp: EventStamp,
    event: E,
}

/// Fixed-capacity, priority-sampled event reservoir.
#[derive(Debug)]
pub struct AnalyticsEventBuffer<E> {
    events: Vec<StampedEvent<E>>,
    capacity: usize,
    num_seen: u64,
    failed_harvests: u32,
}

impl<E: CollectorEvent> AnalyticsEventBuffer<E> {
    /// Creates an empty buffer of the given capacity
    pub fn new(capacity: usize) -> Self {
        AnalyticsEventBuffer {
            events: Vec::with_capacity(capacity),
            capacity,
            num_seen: 0,
            failed_harvests: 0,
        }
    }

    /// Offers an event to the reservoir under the supplied stamp.
    pub fn add(&mut self, event: E, stamp: EventStamp) {
        self.num_seen += 1;
        if self.capacity == 0 {
            return;
        }
        if self.events.len() < self.capacity {
            self.events.push(StampedEvent { stamp, event });
            return;
        }
        let slot = stamp.slot(self.capacity);
        if stamp < self.events[slot].stamp {
            self.events[slot] = StampedEvent { stamp, event };
        }
    }

    /// Gets the total number of events offered
    pub fn num_seen(&self) -> u64 {
        self.num_seen
    }

    /// Gets the number of events currently retained
    pub fn num_saved(&self) -> u64 {
        self.events.len() as u64
    }

    /// Gets the reservoir capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Gets how many consecutive harvests of this data have failed
    pub fn failed_harvests(&self) -> u32 {
        self.failed_harvests
    }

    /// Checks whether the buffer holds no events
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    fn merge_events(&mut self, other: Self) {
        let seen_before = self.num_seen;
        let other_seen = other.num_seen;
        for stamped in other.events {
            self.add(stamped.event, stamped.stamp);
        }
        // Re-offering must not inflate the seen count: the merged total
        // is the sum of both generations' offers.
        self.num_seen = seen_before + other_seen;
    }

    /// Folds back a buffer whose harvest could not be delivered.
    ///
    /// Each retained event is re-offered under the normal replacement
    /// rule. Once the same generation has failed
    /// [`FAILED_EVENT_ATTEMPTS_LIMIT`] times it is dropped instead.
    pub fn merge_failed(&mut self, other: Self) {
        let fails = other.failed_harvests + 1;
        if fails >= FAILED_EVENT_ATTEMPTS_LIMIT {
            return;
        }
        self.failed_harvests = fails;
        self.merge_events(other);
    }

    /// Serializes the collector payload
    /// `[run_id, {"reservoir_size", "events_seen"}, [event, ...]]`.
    /// Empty buffers produce `None`; there is nothing to send.
    pub fn collector_json(&self, agent_run_id: &str) -> Option<String> {
        if self.events.is_empty() {
            return None;
        }
        let mut buf = JsonBuffer::with_capacity(256 * self.events.len());
        buf.raw("[");
        buf.string(agent_run_id);
        buf.raw(",{\"reservoir_size\":");
        buf.uint(self.capacity as u64);
        buf.raw(",\"events_seen\":");
        buf.uint(self.num_seen);
        buf.raw("},[");
        for (i, stamped) in self.events.iter().enumerate() {
            if i > 0 {
                buf.raw(",");
            }
            stamped.event.write_json(&mut buf);
        }
        buf.raw("]]");
        Some(buf.into_string())
    }
}
