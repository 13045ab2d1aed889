use serde::Deserialize;
use std::env;
use std::sync::OnceLock;
use thiserror::Error;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
    /// Parsed values violate a relationship the pipeline depends on.
    #[error("Configuration constraint violated: {0}")]
    Constraint(String),
}

/// Runtime configuration for the docsum server.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Base URL of the inference sidecar hosting the transformer pipelines.
    pub model_server_url: String,
    /// Model identifier used for summarization requests.
    pub summarization_model: String,
    /// Model identifier used for sentiment classification requests.
    pub sentiment_model: String,
    /// Model identifier used for named-entity recognition requests.
    pub ner_model: String,
    /// Optional tokenizer encoding override (`cl100k_base`, `whitespace`, ...).
    pub tokenizer_encoding: Option<String>,
    /// Maximum input tokens the summarization model accepts per chunk.
    pub model_max_length: usize,
    /// Maximum tokens requested for each summary fragment.
    pub max_summary_length: usize,
    /// Minimum tokens requested for each summary fragment.
    pub min_summary_length: usize,
    /// Chunks below this token count are skipped as too short to summarize.
    pub min_chunk_tokens: usize,
    /// Number of texts bundled into one sidecar request.
    pub batch_size: usize,
    /// Number of workers draining the inference queue.
    pub worker_count: usize,
    /// Deadline in seconds covering queue wait plus model inference.
    pub request_timeout_secs: u64,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
}

const DEFAULT_SUMMARIZATION_MODEL: &str = "t5-base";
const DEFAULT_SENTIMENT_MODEL: &str = "distilbert-base-uncased-finetuned-sst-2-english";
const DEFAULT_NER_MODEL: &str = "dslim/bert-base-NER";

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            model_server_url: load_env("MODEL_SERVER_URL")?,
            summarization_model: load_env_optional("SUMMARIZATION_MODEL")
                .unwrap_or_else(|| DEFAULT_SUMMARIZATION_MODEL.to_string()),
            sentiment_model: load_env_optional("SENTIMENT_MODEL")
                .unwrap_or_else(|| DEFAULT_SENTIMENT_MODEL.to_string()),
            ner_model: load_env_optional("NER_MODEL")
                .unwrap_or_else(|| DEFAULT_NER_MODEL.to_string()),
            tokenizer_encoding: load_env_optional("TOKENIZER_ENCODING"),
            model_max_length: load_env_parsed("MODEL_MAX_LENGTH", 512)?,
            max_summary_length: load_env_parsed("MAX_SUMMARY_LENGTH", 250)?,
            min_summary_length: load_env_parsed("MIN_SUMMARY_LENGTH", 50)?,
            min_chunk_tokens: load_env_parsed("MIN_CHUNK_TOKENS", 50)?,
            batch_size: load_env_parsed("SUMMARIZER_BATCH_SIZE", 8)?,
            worker_count: load_env_parsed("SUMMARIZER_MAX_WORKERS", 4)?,
            request_timeout_secs: load_env_parsed("SUMMARIZER_TIMEOUT_SECS", 120)?,
            server_port: load_env_optional("SERVER_PORT")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".into()))
                })
                .transpose()?,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.model_max_length == 0 {
            return Err(ConfigError::Constraint(
                "MODEL_MAX_LENGTH must be greater than zero".into(),
            ));
        }
        if self.max_summary_length == 0 {
            return Err(ConfigError::Constraint(
                "MAX_SUMMARY_LENGTH must be greater than zero".into(),
            ));
        }
        if self.min_summary_length == 0 {
            return Err(ConfigError::Constraint(
                "MIN_SUMMARY_LENGTH must be greater than zero".into(),
            ));
        }
        if self.min_summary_length > self.max_summary_length {
            return Err(ConfigError::Constraint(
                "MIN_SUMMARY_LENGTH must not exceed MAX_SUMMARY_LENGTH".into(),
            ));
        }
        if self.batch_size == 0 {
            return Err(ConfigError::Constraint(
                "SUMMARIZER_BATCH_SIZE must be greater than zero".into(),
            ));
        }
        if self.worker_count == 0 {
            return Err(ConfigError::Constraint(
                "SUMMARIZER_MAX_WORKERS must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

fn load_env(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::MissingVariable(key.to_string()))
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn load_env_parsed<T: std::str::FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    match load_env_optional(key) {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from the environment and install it in the global cache.
pub fn init_config() {
    dotenvy::dotenv().ok();
    let config = Config::from_env().expect("Failed to load config from environment");
    tracing::debug!(
        model_server = %config.model_server_url,
        summarization_model = %config.summarization_model,
        model_max_length = config.model_max_length,
        workers = config.worker_count,
        server_port = ?config.server_port,
        "Loaded configuration"
    );
    CONFIG.set(config).expect("Failed to set config");
}
