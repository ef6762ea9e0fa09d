//! Answer generation via Bedrock
//!
//! Provides:
//! - The `AnswerGenerator` seam used by the pipeline
//! - A Bedrock Runtime client speaking the Titan text-generation format

use crate::config::GenerationConfig;
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use aws_sdk_bedrockruntime::primitives::Blob;
use aws_sdk_bedrockruntime::Client as BedrockClient;
use serde_json::{json, Value};
use tracing::debug;

/// Text-generation seam.
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    /// Generate an answer from the original question and the combined
    /// backend context. Failures are fatal to the request.
    async fn generate(&self, question: &str, context: &str) -> Result<String>;
}

/// Bedrock Runtime answer generator.
pub struct BedrockGenerator {
    client: BedrockClient,
    model_id: String,
    max_tokens: i32,
    temperature: f32,
}

impl BedrockGenerator {
    /// Create a generator over the shared AWS configuration.
    pub fn new(sdk_config: &aws_config::SdkConfig, config: &GenerationConfig) -> Self {
        Self::with_client(BedrockClient::new(sdk_config), config)
    }

    /// Create a generator with an existing client.
    pub fn with_client(client: BedrockClient, config: &GenerationConfig) -> Self {
        Self {
            client,
            model_id: config.model_id.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }
}

#[async_trait]
impl AnswerGenerator for BedrockGenerator {
    async fn generate(&self, question: &str, context: &str) -> Result<String> {
        let body = build_request_body(question, context, self.max_tokens, self.temperature);
        let payload = serde_json::to_vec(&body)?;

        let result = self
            .client
            .invoke_model()
            .model_id(&self.model_id)
            .content_type("application/json")
            .accept("application/json")
            .body(Blob::new(payload))
            .send()
            .await
            .map_err(|e| AppError::Generation {
                message: format!("InvokeModel '{}' failed: {}", self.model_id, e),
            })?;

        let response: Value =
            serde_json::from_slice(result.body.as_ref()).map_err(|e| AppError::Generation {
                message: format!("model returned malformed JSON: {e}"),
            })?;

        let answer = extract_output_text(&response)?;
        debug!(model = %self.model_id, answer_chars = answer.len(), "generation complete");

        Ok(answer)
    }
}

/// Build the Titan text-generation request body.
///
/// The model input is the question and the combined context joined by a
/// single space.
fn build_request_body(question: &str, context: &str, max_tokens: i32, temperature: f32) -> Value {
    json!({
        "inputText": format!("{question} {context}"),
        "textGenerationConfig": {
            "maxTokenCount": max_tokens,
            "temperature": temperature,
        }
    })
}

/// Pull the generated text out of a Titan response body.
fn extract_output_text(response: &Value) -> Result<String> {
    response["results"]
        .get(0)
        .and_then(|result| result["outputText"].as_str())
        .map(str::to_string)
        .ok_or_else(|| AppError::Generation {
            message: "model response contained no output text".to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_concatenates_question_and_context() {
        let body = build_request_body("Find transformer T1", "ctx-a ctx-b", 512, 0.2);

        assert_eq!(body["inputText"], "Find transformer T1 ctx-a ctx-b");
        assert_eq!(body["textGenerationConfig"]["maxTokenCount"], 512);
    }

    #[test]
    fn test_output_text_is_extracted_from_first_result() {
        let response = serde_json::json!({
            "results": [
                {"outputText": "the answer", "completionReason": "FINISH"},
                {"outputText": "ignored"}
            ]
        });

        assert_eq!(extract_output_text(&response).unwrap(), "the answer");
    }

    #[test]
    fn test_missing_output_text_is_a_generation_error() {
        let response = serde_json::json!({"results": []});

        let err = extract_output_text(&response).unwrap_err();
        assert!(matches!(err, AppError::Generation { .. }));
    }
}
