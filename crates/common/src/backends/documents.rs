//! S3 document store
//!
//! Provides:
//! - Key listing under a category prefix (`<prefix>/<key>`)
//! - Raw document retrieval by key

use crate::backends::DocumentSearch;
use crate::config::DocumentsConfig;
use crate::errors::{AppError, Result};
use crate::routing::BackendResponse;
use async_trait::async_trait;
use aws_sdk_s3::Client as S3Client;
use serde_json::Value;
use tracing::debug;

/// S3-backed document store client.
pub struct S3DocumentStore {
    client: S3Client,
    bucket: String,
    key_prefix: String,
}

impl S3DocumentStore {
    /// Create a store over the shared AWS configuration.
    pub fn new(sdk_config: &aws_config::SdkConfig, config: &DocumentsConfig) -> Self {
        Self::with_client(S3Client::new(sdk_config), config)
    }

    /// Create a store with an existing client.
    pub fn with_client(client: S3Client, config: &DocumentsConfig) -> Self {
        Self {
            client,
            bucket: config.bucket.clone(),
            key_prefix: config.key_prefix.clone(),
        }
    }

    /// Full listing prefix for a lookup key.
    fn listing_prefix(&self, key: &str) -> String {
        format!("{}/{}", self.key_prefix.trim_end_matches('/'), key)
    }
}

#[async_trait]
impl DocumentSearch for S3DocumentStore {
    async fn search_documents(&self, prefix: &str) -> Result<BackendResponse> {
        let full_prefix = self.listing_prefix(prefix);

        let result = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(&full_prefix)
            .send()
            .await
            .map_err(|e| AppError::DocumentStore {
                message: format!("ListObjectsV2 under '{full_prefix}' failed: {e}"),
            })?;

        let keys: Vec<Value> = result
            .contents
            .unwrap_or_default()
            .into_iter()
            .filter_map(|object| object.key)
            .map(Value::String)
            .collect();

        debug!(bucket = %self.bucket, prefix = %full_prefix, count = keys.len(), "document listing");

        if keys.is_empty() {
            return Ok(BackendResponse::NotFound);
        }
        Ok(BackendResponse::Found(Value::Array(keys)))
    }

    async fn fetch_document(&self, key: &str) -> Result<Vec<u8>> {
        let result = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                let service_error = e.into_service_error();
                if service_error.is_no_such_key() {
                    AppError::DocumentNotFound {
                        key: key.to_string(),
                    }
                } else {
                    AppError::DocumentStore {
                        message: format!("GetObject '{key}' failed: {service_error}"),
                    }
                }
            })?;

        let bytes = result
            .body
            .collect()
            .await
            .map_err(|e| AppError::DocumentStore {
                message: format!("reading body of '{key}' failed: {e}"),
            })?;

        Ok(bytes.into_bytes().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_s3::Client;

    fn store(prefix: &str) -> S3DocumentStore {
        let sdk_config = aws_config::SdkConfig::builder()
            .behavior_version(aws_config::BehaviorVersion::latest())
            .build();
        S3DocumentStore::with_client(
            Client::new(&sdk_config),
            &DocumentsConfig {
                bucket: "documents".to_string(),
                key_prefix: prefix.to_string(),
            },
        )
    }

    #[test]
    fn test_listing_prefix_joins_with_slash() {
        assert_eq!(store("assets").listing_prefix("T123"), "assets/T123");
    }

    #[test]
    fn test_listing_prefix_tolerates_trailing_slash() {
        assert_eq!(
            store("assets/").listing_prefix("surge_protectors"),
            "assets/surge_protectors"
        );
    }
}
