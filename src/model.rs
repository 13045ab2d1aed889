//! HTTP client for the model inference sidecar.
//!
//! The sidecar hosts transformers-style pipelines behind task endpoints
//! (`/summarization`, `/sentiment`, `/ner`). Each request names the model,
//! carries a batch of inputs, and optionally forwards generation parameters.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::get_config;

/// Errors returned while interacting with the inference server.
#[derive(Debug, Error)]
pub enum ModelClientError {
    /// Base URL failed to parse or normalize.
    #[error("Invalid inference server URL: {0}")]
    InvalidUrl(String),
    /// HTTP layer failed before receiving a response.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Inference server responded with an unexpected status code.
    #[error("Unexpected inference server response ({status}): {body}")]
    UnexpectedStatus {
        /// HTTP status returned from the inference server.
        status: StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
    /// Response payload did not match the pipeline contract.
    #[error("Malformed inference server response: {0}")]
    InvalidResponse(String),
}

/// Length bounds forwarded to the summarization pipeline.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SummaryParams {
    /// Upper bound on generated summary tokens.
    pub max_length: usize,
    /// Lower bound on generated summary tokens.
    pub min_length: usize,
}

/// Classification result returned by the sentiment pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct LabelScore {
    /// Predicted label, e.g. `POSITIVE` or `NEGATIVE`.
    pub label: String,
    /// Confidence score in `[0, 1]`.
    pub score: f64,
}

/// Entity span returned by the token-classification pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct EntitySpan {
    /// Surface text of the entity.
    #[serde(rename = "word")]
    pub text: String,
    /// Aggregated entity label, e.g. `PER` or `LOC`.
    #[serde(rename = "entity_group")]
    pub label: String,
}

/// Interface implemented by summarization backends.
#[async_trait]
pub trait SummarizationModel: Send + Sync {
    /// Summarize each text, preserving input order.
    async fn summarize_batch(
        &self,
        texts: &[String],
        params: &SummaryParams,
    ) -> Result<Vec<String>, ModelClientError>;
}

/// Interface implemented by sentiment backends.
#[async_trait]
pub trait SentimentModel: Send + Sync {
    /// Classify the sentiment of a single text.
    async fn classify(&self, text: &str) -> Result<Vec<LabelScore>, ModelClientError>;
}

/// Interface implemented by named-entity recognition backends.
#[async_trait]
pub trait EntityModel: Send + Sync {
    /// Extract entity spans from a single text.
    async fn extract(&self, text: &str) -> Result<Vec<EntitySpan>, ModelClientError>;
}

/// Lightweight HTTP client for the inference sidecar.
pub struct InferenceServerClient {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    pub(crate) summarization_model: String,
    pub(crate) sentiment_model: String,
    pub(crate) ner_model: String,
    pub(crate) batch_size: usize,
}

#[derive(Serialize)]
struct PipelineRequest<'a> {
    model: &'a str,
    inputs: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    parameters: Option<&'a SummaryParams>,
}

#[derive(Deserialize)]
struct SummaryFragment {
    summary_text: String,
}

impl InferenceServerClient {
    /// Construct a new client using configuration derived from the environment.
    pub fn from_config() -> Result<Self, ModelClientError> {
        let config = get_config();
        let client = Client::builder().user_agent("docsum/0.1").build()?;
        let base_url =
            normalize_base_url(&config.model_server_url).map_err(ModelClientError::InvalidUrl)?;
        tracing::debug!(
            url = %base_url,
            summarization_model = %config.summarization_model,
            sentiment_model = %config.sentiment_model,
            ner_model = %config.ner_model,
            batch_size = config.batch_size,
            "Initialized inference client"
        );

        Ok(Self {
            client,
            base_url,
            summarization_model: config.summarization_model.clone(),
            sentiment_model: config.sentiment_model.clone(),
            ner_model: config.ner_model.clone(),
            batch_size: config.batch_size,
        })
    }

    async fn pipeline_request<R>(
        &self,
        task: &str,
        body: &PipelineRequest<'_>,
    ) -> Result<R, ModelClientError>
    where
        R: serde::de::DeserializeOwned,
    {
        let url = format_endpoint(&self.base_url, task);
        let response = self.client.post(url).json(body).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = ModelClientError::UnexpectedStatus { status, body };
            tracing::error!(task, error = %error, "Inference request failed");
            return Err(error);
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl SummarizationModel for InferenceServerClient {
    async fn summarize_batch(
        &self,
        texts: &[String],
        params: &SummaryParams,
    ) -> Result<Vec<String>, ModelClientError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut summaries = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size.max(1)) {
            let request = PipelineRequest {
                model: &self.summarization_model,
                inputs: batch,
                parameters: Some(params),
            };
            let fragments: Vec<SummaryFragment> =
                self.pipeline_request("summarization", &request).await?;
            if fragments.len() != batch.len() {
                return Err(ModelClientError::InvalidResponse(format!(
                    "expected {} summaries, received {}",
                    batch.len(),
                    fragments.len()
                )));
            }
            summaries.extend(fragments.into_iter().map(|fragment| fragment.summary_text));
        }

        Ok(summaries)
    }
}

#[async_trait]
impl SentimentModel for InferenceServerClient {
    async fn classify(&self, text: &str) -> Result<Vec<LabelScore>, ModelClientError> {
        let inputs = [text.to_string()];
        let request = PipelineRequest {
            model: &self.sentiment_model,
            inputs: &inputs,
            parameters: None,
        };
        let mut results: Vec<Vec<LabelScore>> = self.pipeline_request("sentiment", &request).await?;
        if results.len() != 1 {
            return Err(ModelClientError::InvalidResponse(format!(
                "expected 1 sentiment result, received {}",
                results.len()
            )));
        }
        Ok(results.remove(0))
    }
}

#[async_trait]
impl EntityModel for InferenceServerClient {
    async fn extract(&self, text: &str) -> Result<Vec<EntitySpan>, ModelClientError> {
        let inputs = [text.to_string()];
        let request = PipelineRequest {
            model: &self.ner_model,
            inputs: &inputs,
            parameters: None,
        };
        let mut results: Vec<Vec<EntitySpan>> = self.pipeline_request("ner", &request).await?;
        if results.len() != 1 {
            return Err(ModelClientError::InvalidResponse(format!(
                "expected 1 entity result, received {}",
                results.len()
            )));
        }
        Ok(results.remove(0))
    }
}

fn normalize_base_url(url: &str) -> Result<String, String> {
    let mut parsed = reqwest::Url::parse(url).map_err(|err| err.to_string())?;
    let path = parsed.path().trim_end_matches('/').to_string();
    parsed.set_path(&path);
    Ok(parsed.to_string())
}

fn format_endpoint(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}
