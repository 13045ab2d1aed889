//! Document service coordinating the summarization, sentiment, and entity passes.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::analysis::{Entity, EntityExtractor, Sentiment, SentimentAnalyzer};
use crate::config::get_config;
use crate::metrics::{MetricsSnapshot, ProcessingMetrics};
use crate::model::{EntityModel, InferenceServerClient, SentimentModel, SummarizationModel};
use crate::segmenter::RuleSegmenter;
use crate::summarizer::{
    ChunkedSummarizer, EngineSettings, InferencePool, SummaryOutcome, SummaryStatus,
};
use crate::tokenizer::build_tokenizer;

/// Full analysis of one submitted document.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessReport {
    /// Name the caller supplied for the document, if any.
    pub filename: Option<String>,
    /// Summarization outcome; carries sentinel text on the non-summarized paths.
    pub outcome: SummaryOutcome,
    /// Deduplicated named entities found in the document.
    pub entities: Vec<Entity>,
    /// Aggregated document sentiment.
    pub sentiment: Sentiment,
}

/// Abstraction over the document pipeline used by the HTTP surface.
#[async_trait]
pub trait DocumentApi: Send + Sync {
    /// Run the summarization, entity, and sentiment passes over `text`.
    async fn process_document(&self, text: String, filename: Option<String>) -> ProcessReport;

    /// Retrieve the current metrics snapshot for diagnostics.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

/// Coordinates the document pipeline and owns its long-lived handles.
///
/// The tokenizer, inference client, and worker pool are constructed once here
/// and shared read-only across requests. Construct the service once near
/// process start and share it through an `Arc`.
pub struct DocumentService {
    engine: ChunkedSummarizer,
    sentiment: SentimentAnalyzer,
    entities: EntityExtractor,
    pool: Arc<InferencePool>,
    metrics: Arc<ProcessingMetrics>,
}

impl DocumentService {
    /// Build a new document service from the loaded configuration.
    pub fn new() -> Self {
        let config = get_config();
        let client = Arc::new(
            InferenceServerClient::from_config().expect("Failed to build inference client"),
        );
        let tokenizer = build_tokenizer(config.tokenizer_encoding.as_deref());
        let pool = Arc::new(InferencePool::spawn(
            Arc::clone(&client) as Arc<dyn SummarizationModel>,
            config.worker_count,
        ));
        let engine = ChunkedSummarizer::new(
            Arc::new(RuleSegmenter),
            tokenizer,
            Arc::clone(&pool),
            EngineSettings::from_config(config),
        );
        let sentiment = SentimentAnalyzer::new(Arc::clone(&client) as Arc<dyn SentimentModel>);
        let entities = EntityExtractor::new(client as Arc<dyn EntityModel>);

        Self {
            engine,
            sentiment,
            entities,
            pool,
            metrics: Arc::new(ProcessingMetrics::new()),
        }
    }

    /// Run all three passes over a document and record metrics.
    pub async fn process_document(&self, text: String, filename: Option<String>) -> ProcessReport {
        tracing::info!(
            filename = filename.as_deref().unwrap_or("<unnamed>"),
            bytes = text.len(),
            "Processing document"
        );

        let (outcome, entities, sentiment) = tokio::join!(
            self.engine.summarize(&text),
            self.entities.extract(&text),
            self.sentiment.analyze(&text),
        );

        self.metrics.record_document(
            outcome.summarized_chunks as u64,
            outcome.skipped_chunks as u64,
        );
        if outcome.status == SummaryStatus::Failed {
            self.metrics.record_model_failure();
        }
        tracing::info!(
            status = ?outcome.status,
            chunks = outcome.chunk_count,
            summarized = outcome.summarized_chunks,
            skipped = outcome.skipped_chunks,
            entities = entities.len(),
            sentiment = %sentiment.label,
            "Document processed"
        );

        ProcessReport {
            filename,
            outcome,
            entities,
            sentiment,
        }
    }

    /// Return the current processing metrics snapshot.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Stop the inference workers after draining queued jobs.
    pub async fn shutdown(&self) {
        self.pool.shutdown().await;
    }
}

impl Default for DocumentService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentApi for DocumentService {
    async fn process_document(&self, text: String, filename: Option<String>) -> ProcessReport {
        DocumentService::process_document(self, text, filename).await
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        DocumentService::metrics_snapshot(self)
    }
}
