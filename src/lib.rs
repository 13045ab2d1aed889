#![deny(missing_docs)]

//! Core library for the docsum summarization server.

/// Sentiment scoring and named-entity extraction passes.
pub mod analysis;
/// HTTP routing and REST handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// Structured logging and tracing setup.
pub mod logging;
/// Processing counters exposed for observability.
pub mod metrics;
/// Clients for the model inference sidecar.
pub mod model;
/// Sentence segmentation for document text.
pub mod segmenter;
/// Document pipeline orchestration.
pub mod service;
/// Token-aware chunked summarization engine.
pub mod summarizer;
/// Token counting backends.
pub mod tokenizer;
