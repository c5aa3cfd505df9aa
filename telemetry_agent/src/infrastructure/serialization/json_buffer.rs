// /////////////////////////////////////////////////////////////////////////////
// Telemetry Agent
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # JSON Wire Buffer
//!
//! This module provides the low-level JSON writers behind every collector
//! payload. The collector's array formats are positional and the numeric
//! semantics are fixed - integers always decimal, floats with enough
//! precision to round-trip, no locale influence - so payloads are built
//! with an explicit buffer instead of a general serializer.
//!
//! ## String Escaping
//!
//! Escaping covers `"`, `\`, all control characters, and the JavaScript
//! line separators U+2028/U+2029, which are legal JSON but break direct
//! `eval` of a payload on the collector side.
//!
//! ## Numeric Semantics
//!
//! Rust's float formatting emits the shortest representation that parses
//! back to the same bits, which is exactly the round-trip guarantee the
//! wire format asks for. Non-finite floats are rejected upstream by
//! attribute validation; feeding one to the buffer is a programming
//! error, checked in debug builds.

use std::fmt::Write;

/// Growable buffer with collector JSON semantics.
#[derive(Debug, Default)]
pub struct JsonBuffer {
    buf: String,
}

impl JsonBuffer {
    /// Creates an empty buffer
    pub fn new() -> Self {
        JsonBuffer::default()
    }

    /// Creates a buffer with a pre-sized backing allocation
    pub fn with_capacity(capacity: usize) -> Self {
        JsonBuffer {
            buf: String::with_capacity(capacity),
        }
    }

    /// Appends structural tokens verbatim (`[`, `,`, `{"key":`, ...)
    pub fn raw(&mut self, tokens: &str) {
        self.buf.push_str(tokens);
    }

    /// Appends a quoted, escaped JSON string
    pub fn string(&mut self, value: &str) {
        self.buf.push('"');
        for ch in value.chars() {
            match ch {
                '"' => self.buf.push_str("\\\""),
                '\\' => self.buf.push_str("\\\\"),
                '\u{08}' => self.buf.push_str("\\b"),
                '\u{0c}' => self.buf.push_str("\\f"),
                '\n' => self.buf.push_str("\\n"),
                '\r' => self.buf.push_str("\\r"),
                '\t' => self.buf.push_str("\\t"),
                '\u{2028}' => self.buf.push_str("\\u2028"),
                '\u{2029}' => self.buf.push_str("\\u2029"),
                c if (c as u32) < 0x20 => {
                    let _ = write!(self.buf, "\\u{:04x}", c as u32);
                }
                c => self.buf.push(c),
            }
        }
        self.buf.push('"');
    }

    /// Appends a signed integer in decimal
    pub fn int(&mut self, value: i64) {
        let _ = write!(self.buf, "{}", value);
    }

    /// Appends an unsigned integer in decimal
    pub fn uint(&mut self, value: u64) {
        let _ = write!(self.buf, "{}", value);
    }

    /// Appends a finite float with round-trip precision
    pub fn float(&mut self, value: f64) {
        debug_assert!(value.is_finite(), "non-finite float reached the wire buffer");
        let _ = write!(self.buf, "{}", value);
    }

    /// Appends a boolean literal
    pub fn bool(&mut self, value: bool) {
        self.buf.push_str(if value { "true" } else { "false" });
    }

    /// Gets the accumulated JSON
    pub fn as_str(&self) -> &str {
        &self.buf
    }

    /// Gets the buffer length in bytes
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Checks whether the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Consumes the buffer into its payload string
    pub fn into_string(self) -> String {
        self.buf
    }
}
