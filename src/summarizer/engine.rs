//! Orchestration of segment, plan, summarize, and merge for one document.

use std::sync::Arc;

use tokio::time::timeout;

use crate::model::SummaryParams;
use crate::segmenter::SentenceSegmenter;
use crate::tokenizer::Tokenizer;

use super::chunker::{ChunkPlan, plan_chunks};
use super::pool::{InferencePool, PoolError};
use super::types::{EngineSettings, SummaryOutcome, SummaryStatus};

/// Sentinel returned when no chunk meets the minimum token threshold.
pub const TOO_SHORT_MESSAGE: &str = "Text is too short to summarize.";
/// Sentinel returned when the model call fails or times out.
pub const SUMMARIZATION_ERROR_MESSAGE: &str = "Error during summarization.";
/// Sentinel returned when the engine cannot run the request at all.
pub const INTERNAL_ERROR_MESSAGE: &str = "An error occurred during summarization.";

/// Summarizes documents of arbitrary length against a fixed model context window.
///
/// The engine owns no model state itself; segmenter, tokenizer, and pool are
/// shared read-only handles constructed once at startup. Every failure path
/// resolves to a [`SummaryOutcome`] carrying a sentinel string, never an `Err`.
pub struct ChunkedSummarizer {
    segmenter: Arc<dyn SentenceSegmenter>,
    tokenizer: Arc<dyn Tokenizer>,
    pool: Arc<InferencePool>,
    settings: EngineSettings,
}

impl ChunkedSummarizer {
    /// Assemble an engine from its collaborators.
    pub fn new(
        segmenter: Arc<dyn SentenceSegmenter>,
        tokenizer: Arc<dyn Tokenizer>,
        pool: Arc<InferencePool>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            segmenter,
            tokenizer,
            pool,
            settings,
        }
    }

    /// Summarize `text`, chunking it to fit the model's context window.
    pub async fn summarize(&self, text: &str) -> SummaryOutcome {
        let sentences = self.segmenter.segment(text);
        let plan = plan_chunks(
            &sentences,
            self.tokenizer.as_ref(),
            self.settings.max_model_length,
            self.settings.min_chunk_tokens,
        );

        let eligible = plan.eligible_texts();
        if eligible.is_empty() {
            tracing::debug!(
                sentences = sentences.len(),
                chunks = plan.len(),
                "No chunk meets the minimum token threshold"
            );
            return SummaryOutcome {
                status: SummaryStatus::TooShort,
                summary: TOO_SHORT_MESSAGE.to_string(),
                chunk_count: plan.len(),
                summarized_chunks: 0,
                skipped_chunks: plan.skipped_count(),
            };
        }
        if plan.skipped_count() > 0 {
            tracing::debug!(
                skipped = plan.skipped_count(),
                min_chunk_tokens = self.settings.min_chunk_tokens,
                "Skipping chunks below the minimum token threshold"
            );
        }

        let params = SummaryParams {
            max_length: self.settings.max_summary_length,
            min_length: self.settings.min_summary_length,
        };
        let batch = eligible.len();
        let deadline = self.settings.request_timeout;

        match timeout(deadline, self.pool.submit_and_wait(eligible, params)).await {
            Ok(Ok(fragments)) => {
                debug_assert_eq!(fragments.len(), batch);
                let summary = plan.merge_fragments(&fragments);
                SummaryOutcome {
                    status: SummaryStatus::Summarized,
                    summary,
                    chunk_count: plan.len(),
                    summarized_chunks: batch,
                    skipped_chunks: plan.skipped_count(),
                }
            }
            Ok(Err(PoolError::Model(error))) => {
                tracing::error!(error = %error, batch, "Summarization model call failed");
                failed_outcome(&plan, SUMMARIZATION_ERROR_MESSAGE)
            }
            Ok(Err(PoolError::Closed)) => {
                tracing::error!("Inference pool rejected the summarization job");
                failed_outcome(&plan, INTERNAL_ERROR_MESSAGE)
            }
            Err(_) => {
                tracing::error!(
                    timeout_secs = deadline.as_secs(),
                    batch,
                    "Summarization timed out"
                );
                failed_outcome(&plan, SUMMARIZATION_ERROR_MESSAGE)
            }
        }
    }
}

fn failed_outcome(plan: &ChunkPlan, message: &str) -> SummaryOutcome {
    SummaryOutcome {
        status: SummaryStatus::Failed,
        summary: message.to_string(),
        chunk_count: plan.len(),
        summarized_chunks: 0,
        skipped_chunks: plan.skipped_count(),
    }
}
