//! Backend data sources
//!
//! Each store sits behind an `async_trait` seam so the pipeline and its
//! tests stay independent of the concrete clients. The production
//! implementations wrap AWS SDK and SeaORM clients and are constructed
//! once at startup, then injected.

mod documents;
mod metadata;
mod orders;

pub use documents::S3DocumentStore;
pub use metadata::PostgresMetadataStore;
pub use orders::DynamoOrderStore;

use crate::config::AwsConfig;
use crate::errors::Result;
use crate::routing::BackendResponse;
use async_trait::async_trait;
use std::sync::Arc;

/// Order store lookup (key-value, by order id).
#[async_trait]
pub trait OrderLookup: Send + Sync {
    /// Fetch the order record for `order_id`.
    ///
    /// An absent record is `Ok(NotFound)`; transport failures are errors.
    async fn order_details(&self, order_id: &str) -> Result<BackendResponse>;
}

/// Asset-metadata store lookup (relational, by asset code).
#[async_trait]
pub trait MetadataLookup: Send + Sync {
    /// Fetch all metadata rows matching `code` as a JSON array.
    async fn asset_rows(&self, code: &str) -> Result<BackendResponse>;
}

/// Document store search and retrieval (blob keys under a category prefix).
#[async_trait]
pub trait DocumentSearch: Send + Sync {
    /// List document keys stored under `prefix`.
    async fn search_documents(&self, prefix: &str) -> Result<BackendResponse>;

    /// Fetch a single document's raw bytes by key.
    async fn fetch_document(&self, key: &str) -> Result<Vec<u8>>;
}

/// Process-scoped backend clients, bundled for injection.
#[derive(Clone)]
pub struct Backends {
    pub orders: Arc<dyn OrderLookup>,
    pub metadata: Arc<dyn MetadataLookup>,
    pub documents: Arc<dyn DocumentSearch>,
}

/// Load the shared AWS SDK configuration, applying optional region and
/// profile overrides.
pub async fn load_aws_config(config: &AwsConfig) -> aws_config::SdkConfig {
    let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());

    if let Some(ref region) = config.region {
        loader = loader.region(aws_config::Region::new(region.clone()));
    }
    if let Some(ref profile) = config.profile {
        loader = loader.profile_name(profile);
    }

    loader.load().await
}
