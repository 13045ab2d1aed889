//! Sentiment scoring with preprocessing, aggregation, and caching.
//!
//! Input text is cleaned before classification: emoji are spelled out as
//! words, URLs, @mentions, and #hashtags are stripped, whitespace is
//! collapsed, and the result is capped at 2000 characters. Long inputs may
//! come back from the classifier as several chunk results; those are
//! aggregated into a single label. Results are cached by the preprocessed
//! text so repeated submissions skip the sidecar entirely.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, OnceLock};

use lru::LruCache;
use regex::Regex;
use serde::Serialize;

use crate::model::{LabelScore, SentimentModel};

const MAX_INPUT_CHARS: usize = 2000;
const CACHE_CAPACITY: usize = 1024;
// Longest registry entries are ZWJ family and kiss sequences.
const MAX_EMOJI_SCALARS: usize = 8;

/// Aggregated sentiment for one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sentiment {
    /// `POSITIVE`, `NEGATIVE`, `MIXED`, `NEUTRAL`, or `ERROR`.
    pub label: String,
    /// Aggregated confidence score.
    pub score: f64,
}

impl Sentiment {
    fn neutral() -> Self {
        Self {
            label: "NEUTRAL".to_string(),
            score: 0.0,
        }
    }

    fn error() -> Self {
        Self {
            label: "ERROR".to_string(),
            score: 0.0,
        }
    }
}

/// Scores document sentiment through the classifier sidecar.
pub struct SentimentAnalyzer {
    model: Arc<dyn SentimentModel>,
    cache: Mutex<LruCache<String, Sentiment>>,
}

impl SentimentAnalyzer {
    /// Create an analyzer backed by `model`.
    pub fn new(model: Arc<dyn SentimentModel>) -> Self {
        let capacity = NonZeroUsize::new(CACHE_CAPACITY).expect("cache capacity is non-zero");
        Self {
            model,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Analyze `text`, returning a sentiment on every path.
    ///
    /// Empty-after-preprocessing input yields `NEUTRAL`; classifier failures
    /// yield `ERROR`. Neither is an `Err`, so document processing never fails
    /// because sentiment did.
    pub async fn analyze(&self, text: &str) -> Sentiment {
        let cleaned = preprocess(text);
        if cleaned.is_empty() {
            tracing::warn!("Input text is empty after preprocessing");
            return Sentiment::neutral();
        }

        if let Ok(mut cache) = self.cache.lock() {
            if let Some(hit) = cache.get(&cleaned) {
                return hit.clone();
            }
        }

        let sentiment = match self.model.classify(&cleaned).await {
            Ok(results) => aggregate(&results),
            Err(error) => {
                tracing::error!(error = %error, "Sentiment analysis failed");
                Sentiment::error()
            }
        };

        // Transient failures stay out of the cache so recovery is visible.
        if sentiment.label != "ERROR" {
            if let Ok(mut cache) = self.cache.lock() {
                cache.put(cleaned, sentiment.clone());
            }
        }
        sentiment
    }
}

fn strip_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(http\S+)|([@#]\w+)").expect("valid strip pattern"))
}

fn preprocess(text: &str) -> String {
    let spoken = demojize(text);
    let stripped = strip_pattern().replace_all(&spoken, "");
    let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.chars().take(MAX_INPUT_CHARS).collect()
}

/// Replace emoji with their CLDR names so they still carry weight with the
/// classifier instead of vanishing as unknown symbols.
///
/// Prefixes are tried longest first, so flags and ZWJ sequences resolve as one
/// unit rather than per scalar. Names are padded with spaces; the whitespace
/// collapse in [`preprocess`] tidies up afterwards.
fn demojize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(first) = rest.chars().next() {
        // ASCII never opens a registry entry we care about; keycap sequences
        // stay as typed.
        if first.is_ascii() {
            out.push(first);
            rest = &rest[first.len_utf8()..];
            continue;
        }
        let ends: Vec<usize> = rest
            .char_indices()
            .take(MAX_EMOJI_SCALARS)
            .map(|(start, ch)| start + ch.len_utf8())
            .collect();
        let hit = ends
            .iter()
            .rev()
            .find_map(|&end| emojis::get(&rest[..end]).map(|emoji| (end, emoji)));
        match hit {
            Some((end, emoji)) => {
                out.push(' ');
                out.push_str(emoji.name());
                out.push(' ');
                rest = &rest[end..];
            }
            None => {
                out.push(first);
                rest = &rest[first.len_utf8()..];
            }
        }
    }
    out
}

fn aggregate(results: &[LabelScore]) -> Sentiment {
    let positive: Vec<f64> = results
        .iter()
        .filter(|result| result.label == "POSITIVE")
        .map(|result| result.score)
        .collect();
    let negative: Vec<f64> = results
        .iter()
        .filter(|result| result.label == "NEGATIVE")
        .map(|result| result.score)
        .collect();

    if !positive.is_empty() && negative.is_empty() {
        Sentiment {
            label: "POSITIVE".to_string(),
            score: mean(&positive),
        }
    } else if !negative.is_empty() && positive.is_empty() {
        Sentiment {
            label: "NEGATIVE".to_string(),
            score: mean(&negative),
        }
    } else if positive.is_empty() && negative.is_empty() {
        // Classifier spoke a dialect outside the POSITIVE/NEGATIVE pair.
        results
            .first()
            .map(|result| Sentiment {
                label: result.label.clone(),
                score: result.score,
            })
            .unwrap_or_else(Sentiment::neutral)
    } else {
        let count = (positive.len() + negative.len()) as f64;
        let score = (positive.iter().sum::<f64>() - negative.iter().sum::<f64>()) / count;
        Sentiment {
            label: "MIXED".to_string(),
            score,
        }
    }
}

fn mean(scores: &[f64]) -> f64 {
    scores.iter().sum::<f64>() / scores.len() as f64
}
