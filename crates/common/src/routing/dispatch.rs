//! Static intent dispatch table
//!
//! Maps each intent to the ordered list of backends to query. The plan is
//! resolved once from the classification result; nothing re-routes at
//! runtime based on partial results.

use crate::routing::Intent;
use serde::Serialize;

/// The backends a question can fan out to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// DynamoDB order store
    Orders,
    /// Postgres asset-metadata store
    Metadata,
    /// S3 document store
    Documents,
}

impl BackendKind {
    /// Name under which this backend's response is aggregated.
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Orders => "orders",
            BackendKind::Metadata => "metadata",
            BackendKind::Documents => "documents",
        }
    }
}

/// Ordered backends to query for an intent.
///
/// Identifier-bearing intents hit the stores keyed by that identifier; the
/// metadata table only holds transformers, so fuse lookups skip it.
/// Zero-capture intents resolve to the document store alone, keyed by the
/// intent slug as a category prefix.
pub fn plan_for(intent: Intent) -> &'static [BackendKind] {
    match intent {
        Intent::TransformerCode => &[
            BackendKind::Orders,
            BackendKind::Metadata,
            BackendKind::Documents,
        ],
        Intent::FuseType => &[BackendKind::Orders, BackendKind::Documents],
        Intent::SurgeProtectors
        | Intent::PowerPolesLines
        | Intent::OutletsSwitches
        | Intent::OutageType => &[BackendKind::Documents],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transformer_code_queries_all_backends() {
        assert_eq!(
            plan_for(Intent::TransformerCode),
            &[
                BackendKind::Orders,
                BackendKind::Metadata,
                BackendKind::Documents
            ]
        );
    }

    #[test]
    fn test_fuse_type_skips_metadata() {
        assert_eq!(
            plan_for(Intent::FuseType),
            &[BackendKind::Orders, BackendKind::Documents]
        );
    }

    #[test]
    fn test_zero_capture_intents_query_documents_only() {
        for intent in [
            Intent::SurgeProtectors,
            Intent::PowerPolesLines,
            Intent::OutletsSwitches,
            Intent::OutageType,
        ] {
            assert_eq!(plan_for(intent), &[BackendKind::Documents]);
        }
    }

    #[test]
    fn test_backend_names_are_stable() {
        assert_eq!(BackendKind::Orders.as_str(), "orders");
        assert_eq!(BackendKind::Metadata.as_str(), "metadata");
        assert_eq!(BackendKind::Documents.as_str(), "documents");
    }
}
