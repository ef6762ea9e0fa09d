//! Document retrieval handler

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};

use crate::AppState;
use gridsage_common::errors::Result;

/// Fetch a document's raw bytes by its store key
pub async fn fetch_document(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<impl IntoResponse> {
    let bytes = state.backends.documents.fetch_document(&key).await?;

    tracing::info!(key = %key, size = bytes.len(), "Document fetched");

    Ok((
        [(header::CONTENT_TYPE, "application/octet-stream")],
        bytes,
    ))
}
