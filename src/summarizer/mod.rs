//! Chunked summarization engine: token-aware chunk planning, pooled model
//! invocation, and order-preserving merge of summary fragments.

mod chunker;
mod engine;
mod pool;
mod types;

pub use chunker::{ChunkPlan, PlannedChunk, plan_chunks, truncate_to_token_budget};
pub use engine::{
    ChunkedSummarizer, INTERNAL_ERROR_MESSAGE, SUMMARIZATION_ERROR_MESSAGE, TOO_SHORT_MESSAGE,
};
pub use pool::{InferencePool, PoolError};
pub use types::{EngineSettings, SummaryOutcome, SummaryStatus};
