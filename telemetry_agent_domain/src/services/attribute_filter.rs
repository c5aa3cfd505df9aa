// /////////////////////////////////////////////////////////////////////////////
// Telemetry Agent
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Attribute Filter Service
//!
//! Compiles host attribute settings into an immutable filter that maps an
//! attribute key to the set of destinations it may reach. The filter is
//! built once at configuration time; `destinations_for` is a pure
//! function of `(key, settings snapshot)`, so the mask frozen onto an
//! attribute at insertion is reproducible.
//!
//! ## Resolution
//!
//! Starting from the attribute's default destinations:
//!
//! 1. Destinations disabled by flag (globally or per destination) are
//!    removed. The browser destination is disabled unless opted in.
//! 2. A global exclude match removes the attribute from everything.
//! 3. A per-destination exclude match removes that destination.
//! 4. A configured (non-empty) per-destination include list intersects:
//!    the destination survives only if the key matches an entry.
//!
//! List entries support a single trailing `*` wildcard, which turns the
//! entry into a prefix match; entries are otherwise exact.

use serde::{Deserialize, Serialize};

use crate::value_objects::Destinations;

/// Per-destination attribute settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestinationSettings {
    pub enabled: bool,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl Default for DestinationSettings {
    fn default() -> Self {
        DestinationSettings {
            enabled: true,
            include: Vec::new(),
            exclude: Vec::new(),
        }
    }
}

/// Host-side attribute configuration snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeSettings {
    pub enabled: bool,
    pub exclude: Vec<String>,
    pub txn_events: DestinationSettings,
    pub error_events: DestinationSettings,
    pub error_traces: DestinationSettings,
    pub txn_traces: DestinationSettings,
    pub browser: DestinationSettings,
}

impl Default for AttributeSettings {
    fn default() -> Self {
        AttributeSettings {
            enabled: true,
            exclude: Vec::new(),
            txn_events: DestinationSettings::default(),
            error_events: DestinationSettings::default(),
            error_traces: DestinationSettings::default(),
            txn_traces: DestinationSettings::default(),
            browser: DestinationSettings {
                enabled: false,
                ..DestinationSettings::default()
            },
        }
    }
}

/// Exact-or-trailing-wildcard key matcher.
#[derive(Debug, Clone, Default)]
struct Matcher {
    patterns: Vec<Pattern>,
}

#[derive(Debug, Clone)]
struct Pattern {
    text: String,
    wildcard: bool,
}

impl Matcher {
    fn new(entries: &[String]) -> Self {
        let patterns = entries
            .iter()
            .map(|entry| match entry.strip_suffix('*') {
                Some(prefix) => Pattern {
                    text: prefix.to_string(),
                    wildcard: true,
                },
                None => Pattern {
                    text: entry.clone(),
                    wildcard: false,
                },
            })
            .collect();
        Matcher { patterns }
    }

    fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    fn matches(&self, key: &str) -> bool {
        self.patterns.iter().any(|p| {
            if p.wildcard {
                key.starts_with(&p.text)
            } else {
                key == p.text
            }
        })
    }
}

#[derive(Debug, Clone)]
struct DestinationFilter {
    destination: Destinations,
    include: Matcher,
    exclude: Matcher,
}

/// Immutable attribute destination filter compiled from settings.
#[derive(Debug, Clone)]
pub struct AttributeFilter {
    enabled: Destinations,
    global_exclude: Matcher,
    filters: Vec<DestinationFilter>,
}

impl AttributeFilter {
    /// Compiles the filter from a settings snapshot
    pub fn new(settings: &AttributeSettings) -> Self {
        let dests = [
            (Destinations::TXN_EVENT, &settings.txn_events),
            (Destinations::ERROR_EVENT, &settings.error_events),
            (Destinations::ERROR_TRACE, &settings.error_traces),
            (Destinations::TXN_TRACE, &settings.txn_traces),
            (Destinations::BROWSER, &settings.browser),
        ];

        let mut enabled = Destinations::empty();
        let mut filters = Vec::with_capacity(dests.len());
        for (destination, dest_settings) in dests {
            if settings.enabled && dest_settings.enabled {
                enabled |= destination;
            }
            filters.push(DestinationFilter {
                destination,
                include: Matcher::new(&dest_settings.include),
                exclude: Matcher::new(&dest_settings.exclude),
            });
        }

        AttributeFilter {
            enabled,
            global_exclude: Matcher::new(&settings.exclude),
            filters,
        }
    }

    /// Resolves the destinations a key may reach, starting from
    /// `defaults`. Pure with respect to the settings snapshot.
    pub fn destinations_for(&self, key: &str, defaults: Destinations) -> Destinations {
        let mut result = defaults & self.enabled;
        if result.is_empty() {
            return result;
        }
        if self.global_exclude.matches(key) {
            return Destinations::empty();
        }
        for filter in &self.filters {
            if !result.contains(filter.destination) {
                continue;
            }
            if filter.exclude.matches(key) {
                result.remove(filter.destination);
            } else if !filter.include.is_empty() && !filter.include.matches(key) {
                result.remove(filter.destination);
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_pass_everything_but_browser() {
        let filter = AttributeFilter::new(&AttributeSettings::default());
        let dests = filter.destinations_for("zip", Destinations::all());
        assert_eq!(dests, Destinations::DEFAULT_ENABLED);
    }

    #[test]
    fn test_per_destination_excludes() {
        let settings = AttributeSettings {
            txn_events: DestinationSettings {
                exclude: vec!["only_errors".to_string()],
                ..DestinationSettings::default()
            },
            error_events: DestinationSettings {
                exclude: vec!["only_txn_events".to_string()],
                ..DestinationSettings::default()
            },
            ..AttributeSettings::default()
        };
        let filter = AttributeFilter::new(&settings);

        let only_errors = filter.destinations_for("only_errors", Destinations::all());
        assert!(!only_errors.contains(Destinations::TXN_EVENT));
        assert!(only_errors.contains(Destinations::ERROR_EVENT));

        let only_txn = filter.destinations_for("only_txn_events", Destinations::all());
        assert!(only_txn.contains(Destinations::TXN_EVENT));
        assert!(!only_txn.contains(Destinations::ERROR_EVENT));
    }

    #[test]
    fn test_global_exclude_removes_everywhere() {
        let settings = AttributeSettings {
            exclude: vec!["completely_excluded".to_string()],
            ..AttributeSettings::default()
        };
        let filter = AttributeFilter::new(&settings);
        assert!(filter
            .destinations_for("completely_excluded", Destinations::all())
            .is_empty());
        assert!(!filter.destinations_for("other", Destinations::all()).is_empty());
    }

    #[test]
    fn test_disabled_globally() {
        let settings = AttributeSettings {
            enabled: false,
            ..AttributeSettings::default()
        };
        let filter = AttributeFilter::new(&settings);
        assert!(filter.destinations_for("anything", Destinations::all()).is_empty());
    }

    #[test]
    fn test_disabled_per_destination() {
        let settings = AttributeSettings {
            txn_events: DestinationSettings {
                enabled: false,
                ..DestinationSettings::default()
            },
            ..AttributeSettings::default()
        };
        let filter = AttributeFilter::new(&settings);
        let dests = filter.destinations_for("zip", Destinations::all());
        assert!(!dests.contains(Destinations::TXN_EVENT));
        assert!(dests.contains(Destinations::ERROR_EVENT));
    }

    #[test]
    fn test_trailing_wildcard() {
        let settings = AttributeSettings {
            exclude: vec!["secret.*".to_string()],
            ..AttributeSettings::default()
        };
        let filter = AttributeFilter::new(&settings);
        assert!(filter
            .destinations_for("secret.token", Destinations::all())
            .is_empty());
        assert!(!filter.destinations_for("secrets", Destinations::all()).is_empty());
    }

    #[test]
    fn test_include_intersects() {
        let settings = AttributeSettings {
            txn_events: DestinationSettings {
                include: vec!["wanted".to_string()],
                ..DestinationSettings::default()
            },
            ..AttributeSettings::default()
        };
        let filter = AttributeFilter::new(&settings);
        assert!(filter
            .destinations_for("wanted", Destinations::all())
            .contains(Destinations::TXN_EVENT));
        let unlisted = filter.destinations_for("unlisted", Destinations::all());
        assert!(!unlisted.contains(Destinations::TXN_EVENT));
        assert!(unlisted.contains(Destinations::ERROR_EVENT));
    }

    #[test]
    fn test_resolution_is_pure() {
        let settings = AttributeSettings {
            exclude: vec!["zip*".to_string()],
            ..AttributeSettings::default()
        };
        let filter = AttributeFilter::new(&settings);
        let first = filter.destinations_for("zipper", Destinations::all());
        let second = filter.destinations_for("zipper", Destinations::all());
        assert_eq!(first, second);
    }
}
