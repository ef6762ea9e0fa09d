//! Question Classifier - maps free-text questions to intents
//!
//! Provides:
//! - A fixed, ordered rule table evaluated with partial matching
//! - Identifier extraction via capture groups
//! - Total (non-panicking) parameter access

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of question intents.
///
/// Defined at build time; extending it is a code change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Lookup by transformer code
    TransformerCode,
    /// Lookup by fuse type
    FuseType,
    /// Surge protector documentation
    SurgeProtectors,
    /// Power pole and line documentation
    PowerPolesLines,
    /// Outlet and switch documentation
    OutletsSwitches,
    /// Outage type documentation
    OutageType,
}

impl Intent {
    /// Stable snake_case slug, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::TransformerCode => "transformer_code",
            Intent::FuseType => "fuse_type",
            Intent::SurgeProtectors => "surge_protectors",
            Intent::PowerPolesLines => "power_poles_lines",
            Intent::OutletsSwitches => "outlets_switches",
            Intent::OutageType => "outage_type",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered substrings captured during classification.
///
/// Access is total: reading past the end returns `None` instead of
/// panicking, so zero-capture intents can be handled uniformly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSet(Vec<String>);

impl ParameterSet {
    /// Get the parameter at `index`, if captured.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    /// The first captured parameter, if any.
    pub fn first(&self) -> Option<&str> {
        self.get(0)
    }

    /// Number of captured parameters.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no parameter was captured.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the captured parameters in capture-group order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl From<Vec<String>> for ParameterSet {
    fn from(params: Vec<String>) -> Self {
        Self(params)
    }
}

/// A classified question: the matched intent and its captured parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub intent: Intent,
    pub params: ParameterSet,
}

impl Classification {
    /// Key used to query backends: the first captured parameter, or the
    /// intent slug for rules without a capture group (used as a
    /// document-category prefix).
    pub fn lookup_key(&self) -> &str {
        self.params.first().unwrap_or_else(|| self.intent.as_str())
    }
}

/// Rule table in declaration order.
///
/// Order is the tie-breaker when a question satisfies more than one
/// pattern. Matching is case-sensitive and unanchored; `\w+` captures a
/// maximal run of word characters.
const RULES: &[(Intent, &str)] = &[
    (Intent::TransformerCode, r"Find .* transformer code (\w+)"),
    (Intent::FuseType, r"Find .* fuse type (\w+)"),
    (Intent::SurgeProtectors, r"Find .* Surge protectors"),
    (Intent::PowerPolesLines, r"Find .* Power poles and lines"),
    (Intent::OutletsSwitches, r"Find .* Outlets and switches type"),
    (Intent::OutageType, r"Find .* outage type"),
];

/// Question classifier over the fixed rule table.
pub struct QuestionClassifier {
    rules: Vec<(Intent, Regex)>,
}

impl QuestionClassifier {
    /// Compile the rule table.
    pub fn new() -> Self {
        let rules = RULES
            .iter()
            .map(|(intent, pattern)| {
                // The table is static; a pattern that fails to compile is a
                // build defect, not a runtime condition.
                (*intent, Regex::new(pattern).expect("rule pattern compiles"))
            })
            .collect();

        Self { rules }
    }

    /// Classify a question against the rules in declaration order.
    ///
    /// Returns the first matching rule's intent and captured parameters,
    /// or `None` when no rule matches. Deterministic, no side effects.
    pub fn classify(&self, question: &str) -> Option<Classification> {
        for (intent, pattern) in &self.rules {
            if let Some(caps) = pattern.captures(question) {
                let mut params = Vec::with_capacity(caps.len().saturating_sub(1));
                for group in 1..caps.len() {
                    if let Some(m) = caps.get(group) {
                        params.push(m.as_str().to_string());
                    }
                }
                return Some(Classification {
                    intent: *intent,
                    params: ParameterSet(params),
                });
            }
        }
        None
    }
}

impl Default for QuestionClassifier {
    fn default() -> Self {
        Self::new()
    }
}
