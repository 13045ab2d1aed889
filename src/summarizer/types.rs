//! Shared types for the summarization engine.

use std::time::Duration;

use serde::Serialize;

use crate::config::Config;

/// Terminal state of a summarization request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryStatus {
    /// At least one chunk was summarized and merged into the combined summary.
    Summarized,
    /// Every chunk fell below the minimum token threshold; no model call was made.
    TooShort,
    /// The model call failed or timed out; `summary` carries the error sentinel.
    Failed,
}

/// Result of running one document through the engine.
///
/// `summary` always holds a displayable string. On the non-`Summarized` paths it
/// carries the fixed sentinel messages, so callers that only look at the string
/// keep working while `status` disambiguates for those that care.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryOutcome {
    /// How the request terminated.
    pub status: SummaryStatus,
    /// Combined summary or sentinel message.
    pub summary: String,
    /// Total chunks planned for the document.
    pub chunk_count: usize,
    /// Chunks that produced a summary fragment.
    pub summarized_chunks: usize,
    /// Chunks excluded for falling below the minimum token threshold.
    pub skipped_chunks: usize,
}

/// Tunables governing chunk planning and generation.
#[derive(Debug, Clone, Copy)]
pub struct EngineSettings {
    /// Maximum input tokens per chunk.
    pub max_model_length: usize,
    /// Upper bound on generated tokens per fragment.
    pub max_summary_length: usize,
    /// Lower bound on generated tokens per fragment.
    pub min_summary_length: usize,
    /// Chunks below this token count are not summarized.
    pub min_chunk_tokens: usize,
    /// Deadline covering queue wait plus model inference.
    pub request_timeout: Duration,
}

impl EngineSettings {
    /// Derive engine settings from the loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_model_length: config.model_max_length,
            max_summary_length: config.max_summary_length,
            min_summary_length: config.min_summary_length,
            min_chunk_tokens: config.min_chunk_tokens,
            request_timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }
}
