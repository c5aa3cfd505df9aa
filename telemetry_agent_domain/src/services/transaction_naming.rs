// /////////////////////////////////////////////////////////////////////////////
// Telemetry Agent
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Transaction Naming Service
//!
//! This module canonicalizes raw request paths into final transaction
//! names using the collector-supplied rule sets. Canonicalization keeps
//! name cardinality bounded: operators rename noisy paths, ignore
//! uninteresting ones, and collapse high-cardinality path segments to
//! `*`.
//!
//! ## Rule Application Order
//!
//! 1. **URL rules** run against the raw path. A matching `ignore` rule
//!    ends the transaction's reporting entirely.
//! 2. The prefix is attached: `WebTransaction/Go/` for web transactions,
//!    `OtherTransaction/Go/` for background work. A leading `/` on the
//!    rewritten path is dropped first; an empty path yields the bare
//!    prefix.
//! 3. **Transaction-name rules** run against the prefixed name with the
//!    same grammar.
//! 4. **Segment terms** apply the longest matching prefix rule: every
//!    path segment not on the allowlist becomes `*`, and runs of `*`
//!    collapse to one.
//!
//! Rules order by `eval_order` (stable, so insertion order breaks ties)
//! and are precompiled when the configuration loads; a pattern that fails
//! to compile is dropped with a warning and counted, never retried at
//! apply time. Replacement strings may reference capture groups as
//! `\1`..`\9`.

use regex::Regex;
use serde::{Deserialize, Deserializer};
use std::collections::HashSet;
use tracing::warn;

/// Name prefix for web transactions.
pub const WEB_PREFIX: &str = "WebTransaction/Go/";

/// Name prefix for background transactions.
pub const BACKGROUND_PREFIX: &str = "OtherTransaction/Go/";

/// One rename rule as it appears in the collector reply.
#[derive(Debug, Clone, Deserialize)]
pub struct NameRuleSpec {
    pub match_expression: String,
    #[serde(default)]
    pub replacement: String,
    #[serde(default)]
    pub ignore: bool,
    #[serde(default)]
    pub each_segment: bool,
    #[serde(default)]
    pub replace_all: bool,
    #[serde(default)]
    pub eval_order: i64,
    #[serde(default)]
    pub terminate_chain: bool,
}

#[derive(Debug, Clone)]
struct NameRule {
    pattern: Regex,
    replacement: String,
    ignore: bool,
    each_segment: bool,
    replace_all: bool,
    terminate_chain: bool,
}

/// Rewrites `\1`..`\9` back-references into the regex crate's `${n}`
/// form, escaping any literal `$` first.
fn rewrite_backrefs(replacement: &str) -> String {
    let mut out = replacement.replace('$', "$$");
    for n in 1..=9 {
        out = out.replace(&format!("\\{}", n), &format!("${{{}}}", n));
    }
    out
}

/// An ordered, precompiled rename rule chain.
#[derive(Debug, Clone, Default)]
pub struct NameRuleSet {
    rules: Vec<NameRule>,
    dropped: usize,
}

impl NameRuleSet {
    /// Compiles rule specs, dropping (and counting) invalid patterns.
    pub fn compile(specs: Vec<NameRuleSpec>) -> Self {
        let mut indexed: Vec<(i64, NameRule)> = Vec::with_capacity(specs.len());
        let mut dropped = 0;
        for spec in specs {
            match Regex::new(&spec.match_expression) {
                Ok(pattern) => indexed.push((
                    spec.eval_order,
                    NameRule {
                        pattern,
                        replacement: rewrite_backrefs(&spec.replacement),
                        ignore: spec.ignore,
                        each_segment: spec.each_segment,
                        replace_all: spec.replace_all,
                        terminate_chain: spec.terminate_chain,
                    },
                )),
                Err(err) => {
                    warn!(
                        pattern = %spec.match_expression,
                        error = %err,
                        "dropping transaction name rule with invalid pattern"
                    );
                    dropped += 1;
                }
            }
        }
        indexed.sort_by_key(|(order, _)| *order);
        NameRuleSet {
            rules: indexed.into_iter().map(|(_, rule)| rule).collect(),
            dropped,
        }
    }

    /// Gets the number of rules dropped at compile time
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Gets the number of active rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Checks whether the chain holds no rules
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Runs the chain over `name`. `None` means an ignore rule matched
    /// and the transaction must not be recorded.
    pub fn apply(&self, name: &str) -> Option<String> {
        let mut name = name.to_string();
        for rule in &self.rules {
            if rule.ignore {
                if rule.pattern.is_match(&name) {
                    return None;
                }
                continue;
            }

            let matched = if rule.each_segment {
                let mut any = false;
                let segments: Vec<String> = name
                    .split('/')
                    .map(|segment| {
                        if rule.pattern.is_match(segment) {
                            any = true;
                            if rule.replace_all {
                                rule.pattern.replace_all(segment, rule.replacement.as_str()).into_owned()
                            } else {
                                rule.pattern.replace(segment, rule.replacement.as_str()).into_owned()
                            }
                        } else {
                            segment.to_string()
                        }
                    })
                    .collect();
                name = segments.join("/");
                any
            } else if rule.pattern.is_match(&name) {
                name = if rule.replace_all {
                    rule.pattern.replace_all(&name, rule.replacement.as_str()).into_owned()
                } else {
                    rule.pattern.replace(&name, rule.replacement.as_str()).into_owned()
                };
                true
            } else {
                false
            };

            if matched && rule.terminate_chain {
                break;
            }
        }
        Some(name)
    }
}

impl<'de> Deserialize<'de> for NameRuleSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let specs = Vec::<NameRuleSpec>::deserialize(deserializer)?;
        Ok(NameRuleSet::compile(specs))
    }
}

/// One segment-term rule as it appears in the collector reply.
#[derive(Debug, Clone, Deserialize)]
pub struct SegmentTermSpec {
    pub prefix: String,
    pub terms: Vec<String>,
}

#[derive(Debug, Clone)]
struct SegmentTermRule {
    prefix: String,
    terms: HashSet<String>,
}

/// Per-prefix segment allowlists.
#[derive(Debug, Clone, Default)]
pub struct SegmentTerms {
    rules: Vec<SegmentTermRule>,
}

impl SegmentTerms {
    /// Builds the rule set; a repeated prefix keeps the later rule.
    pub fn new(specs: Vec<SegmentTermSpec>) -> Self {
        let mut rules: Vec<SegmentTermRule> = Vec::with_capacity(specs.len());
        for spec in specs {
            let rule = SegmentTermRule {
                prefix: spec.prefix,
                terms: spec.terms.into_iter().collect(),
            };
            if let Some(existing) = rules.iter_mut().find(|r| r.prefix == rule.prefix) {
                *existing = rule;
            } else {
                rules.push(rule);
            }
        }
        SegmentTerms { rules }
    }

    /// Checks whether any rules are configured
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Collapses non-allowlisted segments of `name` under the longest
    /// matching prefix rule. Names with no matching prefix pass through.
    pub fn apply(&self, name: &str) -> String {
        let rule = self
            .rules
            .iter()
            .filter(|r| name.starts_with(&r.prefix))
            .max_by_key(|r| r.prefix.len());
        let Some(rule) = rule else {
            return name.to_string();
        };

        let remainder = &name[rule.prefix.len()..];
        if remainder.is_empty() {
            // A bare prefix has no segments to collapse.
            return name.to_string();
        }
        let mut collapsed: Vec<&str> = Vec::new();
        for segment in remainder.split('/') {
            if rule.terms.contains(segment) {
                collapsed.push(segment);
            } else if collapsed.last() != Some(&"*") {
                collapsed.push("*");
            }
        }
        format!("{}{}", rule.prefix, collapsed.join("/"))
    }
}

impl<'de> Deserialize<'de> for SegmentTerms {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let specs = Vec::<SegmentTermSpec>::deserialize(deserializer)?;
        Ok(SegmentTerms::new(specs))
    }
}

/// The three collector-supplied rule sets, compiled and immutable.
///
/// Deserializes under the collector's reply field names, so a connect
/// reply can embed it directly.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TransactionNameRules {
    pub url_rules: NameRuleSet,
    #[serde(rename = "transaction_name_rules")]
    pub txn_name_rules: NameRuleSet,
    #[serde(rename = "transaction_segment_terms")]
    pub segment_terms: SegmentTerms,
}

impl TransactionNameRules {
    /// Total rules dropped at compile time across both chains
    pub fn dropped(&self) -> usize {
        self.url_rules.dropped() + self.txn_name_rules.dropped()
    }
}

/// Canonicalizes a raw request path into the final transaction name.
///
/// Returns `None` when an ignore rule matched: the transaction must not
/// be recorded at all.
pub fn full_transaction_name(path: &str, is_web: bool, rules: &TransactionNameRules) -> Option<String> {
    let rewritten = rules.url_rules.apply(path)?;
    let prefix = if is_web { WEB_PREFIX } else { BACKGROUND_PREFIX };
    let trimmed = rewritten.strip_prefix('/').unwrap_or(&rewritten);
    let name = format!("{}{}", prefix, trimmed);
    let name = rules.txn_name_rules.apply(&name)?;
    Some(rules.segment_terms.apply(&name))
}
