//! Question answering handler

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use validator::Validate;

use crate::AppState;
use gridsage_common::{
    errors::{AppError, Result},
    metrics,
    routing::{Intent, ParameterSet},
};

/// Ask request
#[derive(Debug, Deserialize, Validate)]
pub struct AskRequest {
    #[validate(length(min = 1, max = 2000))]
    pub question: String,

    #[serde(default)]
    pub options: AskOptions,
}

#[derive(Debug, Default, Deserialize)]
pub struct AskOptions {
    /// Include the combined backend context in the response (debugging aid)
    #[serde(default)]
    pub include_context: bool,
}

/// Ask response
#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub question: String,
    pub intent: Intent,
    pub parameters: ParameterSet,
    pub answer: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,

    pub processing_time_ms: u64,
}

/// Answer a natural-language question
pub async fn ask(
    State(state): State<AppState>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResponse>> {
    let start = Instant::now();

    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let answered = state.service.answer(&request.question).await?;

    let processing_time_ms = start.elapsed().as_millis() as u64;
    metrics::record_question(answered.intent.as_str(), processing_time_ms as f64 / 1000.0);

    tracing::info!(
        intent = %answered.intent,
        latency_ms = processing_time_ms,
        "Question answered"
    );

    Ok(Json(AskResponse {
        question: request.question,
        intent: answered.intent,
        parameters: answered.parameters,
        answer: answered.answer,
        context: request
            .options
            .include_context
            .then_some(answered.combined_context),
        processing_time_ms,
    }))
}
