//! Response Aggregator - merges backend results into one context string
//!
//! Provides:
//! - A tagged result type covering every backend outcome
//! - Insertion-ordered named response collection
//! - Space-joined combined context for the generation call

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Outcome of a single backend lookup.
///
/// Every branch has a textual rendering, so a missing or failed lookup
/// stays visible in the combined context instead of silently vanishing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum BackendResponse {
    /// The backend returned data.
    Found(Value),
    /// The backend answered, but had nothing for the key.
    NotFound,
    /// The lookup failed; the reason is carried into the context.
    Error(String),
}

impl fmt::Display for BackendResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Plain strings render bare; structured values as compact JSON.
            BackendResponse::Found(Value::String(text)) => f.write_str(text),
            BackendResponse::Found(value) => write!(f, "{value}"),
            BackendResponse::NotFound => f.write_str("none"),
            BackendResponse::Error(reason) => write!(f, "error: {reason}"),
        }
    }
}

/// Insertion-ordered collection of named backend responses.
///
/// One instance lives for exactly one question; nothing is shared across
/// requests. Re-adding a name overwrites its value in place, keeping the
/// name's first-insertion position.
#[derive(Debug, Default)]
pub struct ResponseAggregator {
    entries: Vec<(String, BackendResponse)>,
}

impl ResponseAggregator {
    /// Create an empty aggregator for a new question.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `response` under `name`, overwriting any previous value.
    pub fn add_response(&mut self, name: &str, response: BackendResponse) {
        if let Some(entry) = self.entries.iter_mut().find(|(n, _)| n == name) {
            entry.1 = response;
        } else {
            self.entries.push((name.to_string(), response));
        }
    }

    /// Join every stored response's rendering with a single space, in
    /// first-insertion order.
    pub fn combined_context(&self) -> String {
        self.entries
            .iter()
            .map(|(_, response)| response.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Number of named responses currently held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no response has been added.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries in first-insertion order.
    pub fn responses(&self) -> impl Iterator<Item = (&str, &BackendResponse)> {
        self.entries
            .iter()
            .map(|(name, response)| (name.as_str(), response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_add_response_is_idempotent() {
        let mut aggregator = ResponseAggregator::new();
        aggregator.add_response("orders", BackendResponse::Found(json!({"id": "T1"})));
        let once = aggregator.combined_context();

        aggregator.add_response("orders", BackendResponse::Found(json!({"id": "T1"})));

        assert_eq!(aggregator.combined_context(), once);
        assert_eq!(aggregator.len(), 1);
    }

    #[test]
    fn test_overwrite_replaces_value_in_place() {
        let mut aggregator = ResponseAggregator::new();
        aggregator.add_response("orders", BackendResponse::Found(json!("v1")));
        aggregator.add_response("metadata", BackendResponse::Found(json!("rows")));
        aggregator.add_response("orders", BackendResponse::Found(json!("v2")));

        let context = aggregator.combined_context();

        assert_eq!(context, "v2 rows");
        assert_eq!(aggregator.len(), 2);
    }

    #[test]
    fn test_first_insertion_order_is_preserved() {
        let mut aggregator = ResponseAggregator::new();
        aggregator.add_response("a", BackendResponse::Found(json!("first")));
        aggregator.add_response("b", BackendResponse::Found(json!("second")));
        aggregator.add_response("a", BackendResponse::Found(json!("updated")));

        let names: Vec<&str> = aggregator.responses().map(|(name, _)| name).collect();

        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(aggregator.combined_context(), "updated second");
    }

    #[test]
    fn test_not_found_renders_explicit_token() {
        let mut aggregator = ResponseAggregator::new();
        aggregator.add_response("orders", BackendResponse::NotFound);
        aggregator.add_response("documents", BackendResponse::Found(json!(["assets/T1/manual.pdf"])));

        assert_eq!(
            aggregator.combined_context(),
            "none [\"assets/T1/manual.pdf\"]"
        );
    }

    #[test]
    fn test_error_marker_is_part_of_context() {
        let mut aggregator = ResponseAggregator::new();
        aggregator.add_response("metadata", BackendResponse::Error("connection reset".to_string()));

        assert_eq!(aggregator.combined_context(), "error: connection reset");
    }

    #[test]
    fn test_empty_aggregator_yields_empty_context() {
        let aggregator = ResponseAggregator::new();

        assert!(aggregator.is_empty());
        assert_eq!(aggregator.combined_context(), "");
    }

    #[test]
    fn test_structured_values_render_as_compact_json() {
        let response = BackendResponse::Found(json!({"code": "T1", "kva": 500}));

        assert_eq!(response.to_string(), r#"{"code":"T1","kva":500}"#);
    }
}
