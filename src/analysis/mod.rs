//! Auxiliary document analyses run alongside summarization.

mod entities;
mod sentiment;

pub use entities::{Entity, EntityExtractor};
pub use sentiment::{Sentiment, SentimentAnalyzer};
