//! Per-question answering pipeline
//!
//! Wires the classifier, the dispatch table, the backend clients, and the
//! generation client into a single `answer` call. Backend clients are
//! process-scoped and injected once; the aggregator is constructed fresh
//! for every question so no state crosses requests.

use crate::backends::Backends;
use crate::errors::{AppError, Result};
use crate::generation::AnswerGenerator;
use crate::metrics;
use crate::routing::dispatch::{self, BackendKind};
use crate::routing::{
    BackendResponse, Intent, ParameterSet, QuestionClassifier, ResponseAggregator,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Result of answering one question.
#[derive(Debug, Clone, Serialize)]
pub struct AnsweredQuestion {
    /// Matched intent
    pub intent: Intent,

    /// Parameters captured during classification
    pub parameters: ParameterSet,

    /// Space-joined backend context handed to the generation call
    pub combined_context: String,

    /// Generated answer text
    pub answer: String,
}

/// Question-answering service.
pub struct QuestionService {
    classifier: QuestionClassifier,
    backends: Backends,
    generator: Arc<dyn AnswerGenerator>,
}

impl QuestionService {
    /// Create a service over process-scoped backend clients.
    pub fn new(backends: Backends, generator: Arc<dyn AnswerGenerator>) -> Self {
        Self {
            classifier: QuestionClassifier::new(),
            backends,
            generator,
        }
    }

    /// Answer a question end to end.
    ///
    /// Classification misses are client errors and stop the request before
    /// any backend is called. Lookup failures degrade into `error:` markers
    /// inside the combined context; only generation failures are fatal.
    pub async fn answer(&self, question: &str) -> Result<AnsweredQuestion> {
        let classification = self.classifier.classify(question).ok_or_else(|| {
            metrics::record_classification_miss();
            AppError::InvalidQuestion {
                message: "question matched no known pattern".to_string(),
            }
        })?;

        let intent = classification.intent;
        let key = classification.lookup_key().to_string();
        let mut aggregator = ResponseAggregator::new();

        for backend in dispatch::plan_for(intent) {
            let start = Instant::now();
            let result = self.lookup(*backend, &key).await;

            let outcome = match &result {
                Ok(BackendResponse::Found(_)) => "found",
                Ok(BackendResponse::NotFound) => "not_found",
                Ok(BackendResponse::Error(_)) | Err(_) => "error",
            };
            metrics::record_backend(backend.as_str(), start.elapsed().as_secs_f64(), outcome);

            let response = result.unwrap_or_else(|err| {
                warn!(
                    backend = backend.as_str(),
                    error = %err,
                    "backend lookup failed, continuing with error marker"
                );
                BackendResponse::Error(err.to_string())
            });

            aggregator.add_response(backend.as_str(), response);
        }

        let combined_context = aggregator.combined_context();

        let start = Instant::now();
        let answer = match self.generator.generate(question, &combined_context).await {
            Ok(answer) => {
                metrics::record_generation(start.elapsed().as_secs_f64(), true);
                answer
            }
            Err(err) => {
                metrics::record_generation(start.elapsed().as_secs_f64(), false);
                return Err(err);
            }
        };

        info!(
            intent = %intent,
            backends = aggregator.len(),
            context_chars = combined_context.len(),
            "question answered"
        );

        Ok(AnsweredQuestion {
            intent,
            parameters: classification.params,
            combined_context,
            answer,
        })
    }

    async fn lookup(&self, backend: BackendKind, key: &str) -> Result<BackendResponse> {
        match backend {
            BackendKind::Orders => self.backends.orders.order_details(key).await,
            BackendKind::Metadata => self.backends.metadata.asset_rows(key).await,
            BackendKind::Documents => self.backends.documents.search_documents(key).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::{DocumentSearch, MetadataLookup, OrderLookup};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeOrders {
        calls: AtomicUsize,
        last_key: Mutex<Option<String>>,
    }

    #[async_trait]
    impl OrderLookup for FakeOrders {
        async fn order_details(&self, order_id: &str) -> Result<BackendResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_key.lock().unwrap() = Some(order_id.to_string());
            Ok(BackendResponse::Found(json!({
                "order_id": order_id,
                "status": "open"
            })))
        }
    }

    #[derive(Default)]
    struct FakeMetadata {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl MetadataLookup for FakeMetadata {
        async fn asset_rows(&self, code: &str) -> Result<BackendResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(BackendResponse::Found(json!([{ "code": code, "kva": 500 }])))
        }
    }

    #[derive(Default)]
    struct FakeDocuments {
        calls: AtomicUsize,
        last_key: Mutex<Option<String>>,
        fail: bool,
    }

    #[async_trait]
    impl DocumentSearch for FakeDocuments {
        async fn search_documents(&self, prefix: &str) -> Result<BackendResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_key.lock().unwrap() = Some(prefix.to_string());
            if self.fail {
                return Err(AppError::DocumentStore {
                    message: "bucket unreachable".to_string(),
                });
            }
            Ok(BackendResponse::Found(json!([format!("assets/{prefix}/manual.pdf")])))
        }

        async fn fetch_document(&self, _key: &str) -> Result<Vec<u8>> {
            Ok(Vec::new())
        }
    }

    #[derive(Default)]
    struct FakeGenerator {
        calls: AtomicUsize,
        last_input: Mutex<Option<(String, String)>>,
        fail: bool,
    }

    #[async_trait]
    impl AnswerGenerator for FakeGenerator {
        async fn generate(&self, question: &str, context: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_input.lock().unwrap() =
                Some((question.to_string(), context.to_string()));
            if self.fail {
                return Err(AppError::Generation {
                    message: "model unavailable".to_string(),
                });
            }
            Ok("generated answer".to_string())
        }
    }

    struct Fixture {
        orders: Arc<FakeOrders>,
        metadata: Arc<FakeMetadata>,
        documents: Arc<FakeDocuments>,
        generator: Arc<FakeGenerator>,
        service: QuestionService,
    }

    fn fixture(documents_fail: bool, generation_fail: bool) -> Fixture {
        let orders = Arc::new(FakeOrders::default());
        let metadata = Arc::new(FakeMetadata::default());
        let documents = Arc::new(FakeDocuments {
            fail: documents_fail,
            ..FakeDocuments::default()
        });
        let generator = Arc::new(FakeGenerator {
            fail: generation_fail,
            ..FakeGenerator::default()
        });

        let service = QuestionService::new(
            Backends {
                orders: orders.clone(),
                metadata: metadata.clone(),
                documents: documents.clone(),
            },
            generator.clone(),
        );

        Fixture {
            orders,
            metadata,
            documents,
            generator,
            service,
        }
    }

    #[tokio::test]
    async fn test_transformer_question_queries_all_backends() {
        let fx = fixture(false, false);
        let question = "Find customers with transformer code T123";

        let answered = fx.service.answer(question).await.unwrap();

        assert_eq!(answered.intent, Intent::TransformerCode);
        assert_eq!(answered.parameters.first(), Some("T123"));
        assert_eq!(answered.answer, "generated answer");

        assert_eq!(fx.orders.calls.load(Ordering::SeqCst), 1);
        assert_eq!(fx.metadata.calls.load(Ordering::SeqCst), 1);
        assert_eq!(fx.documents.calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            fx.orders.last_key.lock().unwrap().as_deref(),
            Some("T123")
        );

        // Combined context carries all three stringified results,
        // space-joined, in dispatch order.
        assert_eq!(
            answered.combined_context,
            format!(
                "{} {} {}",
                json!({"order_id": "T123", "status": "open"}),
                json!([{ "code": "T123", "kva": 500 }]),
                json!(["assets/T123/manual.pdf"]),
            )
        );

        // The generator sees the original question plus that context.
        let (gen_question, gen_context) =
            fx.generator.last_input.lock().unwrap().clone().unwrap();
        assert_eq!(gen_question, question);
        assert_eq!(gen_context, answered.combined_context);
    }

    #[tokio::test]
    async fn test_unclassified_question_is_client_error_without_backend_calls() {
        let fx = fixture(false, false);

        let err = fx.service.answer("hello").await.unwrap_err();

        assert!(matches!(err, AppError::InvalidQuestion { .. }));
        assert_eq!(fx.orders.calls.load(Ordering::SeqCst), 0);
        assert_eq!(fx.metadata.calls.load(Ordering::SeqCst), 0);
        assert_eq!(fx.documents.calls.load(Ordering::SeqCst), 0);
        assert_eq!(fx.generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_zero_capture_intent_dispatches_with_slug_key() {
        let fx = fixture(false, false);

        let answered = fx
            .service
            .answer("Find incidents involving Surge protectors")
            .await
            .unwrap();

        assert_eq!(answered.intent, Intent::SurgeProtectors);
        assert!(answered.parameters.is_empty());
        assert_eq!(fx.orders.calls.load(Ordering::SeqCst), 0);
        assert_eq!(fx.metadata.calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            fx.documents.last_key.lock().unwrap().as_deref(),
            Some("surge_protectors")
        );
    }

    #[tokio::test]
    async fn test_failed_lookup_becomes_error_marker_in_context() {
        let fx = fixture(true, false);

        let answered = fx
            .service
            .answer("Find customers with transformer code T5")
            .await
            .unwrap();

        assert!(answered
            .combined_context
            .contains("error: Document store error: bucket unreachable"));
        // The request still reached the generator.
        assert_eq!(fx.generator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_generation_failure_is_fatal() {
        let fx = fixture(false, true);

        let err = fx
            .service
            .answer("Find customers with transformer code T5")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Generation { .. }));
        assert_eq!(fx.orders.calls.load(Ordering::SeqCst), 1);
    }
}
