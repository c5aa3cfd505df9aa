// /////////////////////////////////////////////////////////////////////////////
// Telemetry Agent
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Common Test Helpers
//!
//! Shared utilities for integration tests: assertions over serialized
//! metric payloads.

use serde_json::Value;

/// Installs a test subscriber so `RUST_LOG`-gated agent output is
/// visible under `cargo test -- --nocapture`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Parses a metric payload body into `(name, scope, six-tuple)` rows.
///
/// # Panics
///
/// Panics if the payload is not the collector's
/// `[run_id, start, end, [[{name, scope?}, [..6 floats]], ...]]` shape.
pub fn metric_rows(payload_body: &str) -> Vec<(String, String, [f64; 6])> {
    let json: Value = serde_json::from_str(payload_body).expect("metric payload is valid JSON");
    json[3]
        .as_array()
        .expect("metric entries array")
        .iter()
        .map(|entry| {
            let name = entry[0]["name"].as_str().expect("metric name").to_string();
            let scope = entry[0]["scope"].as_str().unwrap_or("").to_string();
            let values = entry[1].as_array().expect("six-tuple");
            let mut data = [0.0; 6];
            for (i, value) in values.iter().enumerate() {
                data[i] = value.as_f64().expect("metric value");
            }
            (name, scope, data)
        })
        .collect()
}

/// Gets the unscoped six-tuple recorded under `name`, if present.
pub fn find_metric(payload_body: &str, name: &str) -> Option<[f64; 6]> {
    metric_rows(payload_body)
        .into_iter()
        .find(|(n, scope, _)| n == name && scope.is_empty())
        .map(|(_, _, data)| data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_rows_parses_payload_shape() {
        let body = r#"["run",1.0,2.0,[[{"name":"zip"},[1,0,0,0,0,0]],[{"name":"zap","scope":"s"},[2,3,4,5,6,7]]]]"#;
        let rows = metric_rows(body);
        assert_eq!(rows.len(), 2);
        assert_eq!(find_metric(body, "zip"), Some([1.0, 0.0, 0.0, 0.0, 0.0, 0.0]));
        assert_eq!(find_metric(body, "zap"), None);
        assert_eq!(rows[1].1, "s");
    }
}
