//! Postgres asset-metadata store
//!
//! Wraps the repository so the pipeline sees the same trait seam as the
//! AWS-backed stores. Rows are serialized to a JSON array for aggregation.

use crate::backends::MetadataLookup;
use crate::db::Repository;
use crate::errors::Result;
use crate::routing::BackendResponse;
use async_trait::async_trait;
use tracing::debug;

/// SeaORM-backed metadata store client.
pub struct PostgresMetadataStore {
    repository: Repository,
}

impl PostgresMetadataStore {
    /// Create a store over the shared repository.
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl MetadataLookup for PostgresMetadataStore {
    async fn asset_rows(&self, code: &str) -> Result<BackendResponse> {
        let rows = self.repository.transformers_by_code(code).await?;

        if rows.is_empty() {
            debug!(code, "no metadata rows");
            return Ok(BackendResponse::NotFound);
        }

        debug!(code, rows = rows.len(), "metadata rows found");
        Ok(BackendResponse::Found(serde_json::to_value(rows)?))
    }
}
