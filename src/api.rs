//! HTTP surface for the docsum server.
//!
//! This module exposes a compact Axum router with a handful of endpoints:
//!
//! - `GET /` – Welcome message.
//! - `POST /process` – Run the full document pipeline over raw text and return
//!   the combined summary, named entities, and sentiment, along with chunk
//!   accounting for the summarization pass.
//! - `GET /metrics` – Observe processing counters.
//! - `GET /health` – Liveness probe echoing the configured model endpoint.
//!
//! File-format extraction is deliberately not offered here; callers submit text
//! that is already plain.

use crate::analysis::{Entity, Sentiment};
use crate::config::get_config;
use crate::service::DocumentApi;
use crate::summarizer::SummaryStatus;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

/// Build the HTTP router exposing the document API surface.
pub fn create_router<S>(service: Arc<S>) -> Router
where
    S: DocumentApi + 'static,
{
    Router::new()
        .route("/", get(welcome))
        .route("/process", post(process_document::<S>))
        .route("/metrics", get(get_metrics::<S>))
        .route("/health", get(get_health))
        .with_state(service)
}

/// Greeting retained from the first version of this service.
async fn welcome() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Welcome to the Intelligent Document Summarization API"
    }))
}

/// Request body for the `POST /process` endpoint.
#[derive(Deserialize)]
struct ProcessRequest {
    /// Plain document text to analyze.
    text: String,
    /// Optional document name echoed back in the response.
    #[serde(default)]
    filename: Option<String>,
}

/// Success response for the `POST /process` endpoint.
#[derive(Serialize)]
struct ProcessResponse {
    /// Fixed `"success"` marker.
    status: &'static str,
    /// Document name supplied by the caller, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    filename: Option<String>,
    /// Combined summary, or a sentinel message on the non-summarized paths.
    summary: String,
    /// How the summarization pass terminated.
    summary_status: SummaryStatus,
    /// Total chunks planned for the document.
    chunk_count: usize,
    /// Chunks that produced a summary fragment.
    summarized_chunks: usize,
    /// Chunks skipped for falling below the minimum token threshold.
    skipped_chunks: usize,
    /// Deduplicated named entities found in the document.
    entities: Vec<Entity>,
    /// Aggregated document sentiment.
    sentiment: Sentiment,
}

/// Run the document pipeline over submitted text.
///
/// Rejects empty or whitespace-only text with `400`; every other input resolves
/// to `200` with either a real summary or a sentinel message, matching the
/// engine's no-error contract.
async fn process_document<S>(
    State(service): State<Arc<S>>,
    Json(request): Json<ProcessRequest>,
) -> Result<Json<ProcessResponse>, ApiError>
where
    S: DocumentApi,
{
    if request.text.trim().is_empty() {
        return Err(ApiError::bad_request("Document text must not be empty"));
    }

    let report = service
        .process_document(request.text, request.filename)
        .await;

    Ok(Json(ProcessResponse {
        status: "success",
        filename: report.filename,
        summary: report.outcome.summary,
        summary_status: report.outcome.status,
        chunk_count: report.outcome.chunk_count,
        summarized_chunks: report.outcome.summarized_chunks,
        skipped_chunks: report.outcome.skipped_chunks,
        entities: report.entities,
        sentiment: report.sentiment,
    }))
}

/// Return a concise metrics snapshot with document and chunk counters.
async fn get_metrics<S>(State(service): State<Arc<S>>) -> Json<crate::metrics::MetricsSnapshot>
where
    S: DocumentApi,
{
    Json(service.metrics_snapshot())
}

/// Liveness probe echoing the configured inference endpoint.
async fn get_health() -> Json<serde_json::Value> {
    let config = get_config();
    Json(json!({
        "status": "ok",
        "model_server": config.model_server_url,
        "summarization_model": config.summarization_model,
    }))
}

struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::create_router;
    use crate::analysis::{Entity, Sentiment};
    use crate::config::{CONFIG, Config};
    use crate::metrics::MetricsSnapshot;
    use crate::service::{DocumentApi, ProcessReport};
    use crate::summarizer::{SummaryOutcome, SummaryStatus};
    use async_trait::async_trait;
    use axum::{
        body::{Body, to_bytes},
        http::{Method, Request, StatusCode},
    };
    use serde_json::json;
    use std::sync::{Arc, Once};
    use tokio::sync::Mutex;
    use tower::ServiceExt;

    #[derive(Clone, Debug)]
    struct ProcessCall {
        text: String,
        filename: Option<String>,
    }

    struct StubDocumentService {
        calls: Arc<Mutex<Vec<ProcessCall>>>,
        report: ProcessReport,
    }

    impl StubDocumentService {
        fn new(report: ProcessReport) -> Self {
            Self {
                calls: Arc::new(Mutex::new(Vec::new())),
                report,
            }
        }

        async fn recorded_calls(&self) -> Vec<ProcessCall> {
            self.calls.lock().await.clone()
        }
    }

    #[async_trait]
    impl DocumentApi for StubDocumentService {
        async fn process_document(
            &self,
            text: String,
            filename: Option<String>,
        ) -> ProcessReport {
            let mut guard = self.calls.lock().await;
            guard.push(ProcessCall {
                text,
                filename: filename.clone(),
            });
            let mut report = self.report.clone();
            report.filename = filename;
            report
        }

        fn metrics_snapshot(&self) -> MetricsSnapshot {
            MetricsSnapshot {
                documents_processed: 3,
                chunks_summarized: 7,
                chunks_skipped: 2,
                model_failures: 1,
            }
        }
    }

    fn sample_report() -> ProcessReport {
        ProcessReport {
            filename: None,
            outcome: SummaryOutcome {
                status: SummaryStatus::Summarized,
                summary: "A concise summary.".into(),
                chunk_count: 3,
                summarized_chunks: 2,
                skipped_chunks: 1,
            },
            entities: vec![Entity {
                text: "Geneva".into(),
                label: "LOC".into(),
            }],
            sentiment: Sentiment {
                label: "POSITIVE".into(),
                score: 0.93,
            },
        }
    }

    fn ensure_test_config() {
        static INIT: Once = Once::new();
        INIT.call_once(|| {
            let _ = CONFIG.set(Config {
                model_server_url: "http://127.0.0.1:9090".into(),
                summarization_model: "t5-base".into(),
                sentiment_model: "sst-2".into(),
                ner_model: "bert-ner".into(),
                tokenizer_encoding: Some("whitespace".into()),
                model_max_length: 512,
                max_summary_length: 250,
                min_summary_length: 50,
                min_chunk_tokens: 50,
                batch_size: 8,
                worker_count: 4,
                request_timeout_secs: 120,
                server_port: None,
            });
        });
    }

    #[tokio::test]
    async fn welcome_returns_the_original_greeting() {
        ensure_test_config();
        let service = Arc::new(StubDocumentService::new(sample_report()));
        let app = create_router(service);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(
            json["message"],
            "Welcome to the Intelligent Document Summarization API"
        );
    }

    #[tokio::test]
    async fn process_route_returns_the_full_report() {
        ensure_test_config();
        let service = Arc::new(StubDocumentService::new(sample_report()));
        let app = create_router(service.clone());

        let payload = json!({
            "text": "A document worth reading.",
            "filename": "notes.txt"
        });
        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/process")
                    .header("content-type", "application/json")
                    .body(Body::from(payload.to_string()))
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(json["status"], "success");
        assert_eq!(json["filename"], "notes.txt");
        assert_eq!(json["summary"], "A concise summary.");
        assert_eq!(json["summary_status"], "summarized");
        assert_eq!(json["chunk_count"], 3);
        assert_eq!(json["summarized_chunks"], 2);
        assert_eq!(json["skipped_chunks"], 1);
        assert_eq!(json["entities"][0]["text"], "Geneva");
        assert_eq!(json["sentiment"]["label"], "POSITIVE");

        let calls = service.recorded_calls().await;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].text, "A document worth reading.");
        assert_eq!(calls[0].filename.as_deref(), Some("notes.txt"));
    }

    #[tokio::test]
    async fn empty_text_is_rejected_before_the_pipeline() {
        ensure_test_config();
        let service = Arc::new(StubDocumentService::new(sample_report()));
        let app = create_router(service.clone());

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/process")
                    .header("content-type", "application/json")
                    .body(Body::from(json!({ "text": "   \n " }).to_string()))
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(json["error"], "Document text must not be empty");
        assert!(service.recorded_calls().await.is_empty());
    }

    #[tokio::test]
    async fn metrics_route_serializes_the_snapshot() {
        ensure_test_config();
        let service = Arc::new(StubDocumentService::new(sample_report()));
        let app = create_router(service);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/metrics")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(json["documents_processed"], 3);
        assert_eq!(json["chunks_summarized"], 7);
        assert_eq!(json["chunks_skipped"], 2);
        assert_eq!(json["model_failures"], 1);
    }

    #[tokio::test]
    async fn health_route_echoes_the_model_endpoint() {
        ensure_test_config();
        let service = Arc::new(StubDocumentService::new(sample_report()));
        let app = create_router(service);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(json["status"], "ok");
        assert_eq!(json["model_server"], "http://127.0.0.1:9090");
    }
}
