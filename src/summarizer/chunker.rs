//! Greedy token-budgeted chunk planning.
//!
//! Sentences are accumulated in order until the next one would push the running
//! token total past `max_model_length`; the open chunk is then closed and a new
//! one started. A sentence that alone exceeds the budget is truncated to the
//! budget and emitted as its own chunk, so no sentence is ever dropped. Chunks
//! below the minimum token threshold are kept in the plan but flagged ineligible,
//! which preserves chunk ordering for the final merge.

use crate::tokenizer::Tokenizer;

/// A chunk prepared for summarization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedChunk {
    /// Sentences of the chunk joined by single spaces.
    pub text: String,
    /// Token count of the chunk under the planning tokenizer.
    pub token_count: usize,
    /// Whether the chunk meets the minimum token threshold for summarization.
    pub eligible: bool,
}

/// Ordered chunk layout for one document.
#[derive(Debug, Clone, Default)]
pub struct ChunkPlan {
    /// All planned chunks in document order, eligible or not.
    pub chunks: Vec<PlannedChunk>,
}

impl ChunkPlan {
    /// Number of chunks in the plan.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether the plan contains no chunks at all.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Texts of the eligible chunks, in document order.
    pub fn eligible_texts(&self) -> Vec<String> {
        self.chunks
            .iter()
            .filter(|chunk| chunk.eligible)
            .map(|chunk| chunk.text.clone())
            .collect()
    }

    /// Number of chunks that qualify for summarization.
    pub fn eligible_count(&self) -> usize {
        self.chunks.iter().filter(|chunk| chunk.eligible).count()
    }

    /// Number of chunks excluded for being below the minimum token threshold.
    pub fn skipped_count(&self) -> usize {
        self.chunks.iter().filter(|chunk| !chunk.eligible).count()
    }

    /// Join summary fragments with a single space, in chunk order.
    ///
    /// `fragments` must correspond one-to-one with the eligible chunks; skipped
    /// chunks contribute nothing and do not shift the relative fragment order.
    pub fn merge_fragments(&self, fragments: &[String]) -> String {
        debug_assert_eq!(fragments.len(), self.eligible_count());
        fragments.join(" ")
    }
}

/// Partition `sentences` into token-budgeted chunks.
pub fn plan_chunks(
    sentences: &[String],
    tokenizer: &dyn Tokenizer,
    max_model_length: usize,
    min_chunk_tokens: usize,
) -> ChunkPlan {
    let mut chunks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut running_total = 0usize;

    for sentence in sentences {
        let sentence_tokens = tokenizer.count(sentence);
        if running_total + sentence_tokens <= max_model_length {
            current.push(sentence);
            running_total += sentence_tokens;
            continue;
        }

        if !current.is_empty() {
            push_chunk(&mut chunks, current.join(" "), running_total, min_chunk_tokens);
            current.clear();
            running_total = 0;
        }

        if sentence_tokens <= max_model_length {
            current.push(sentence);
            running_total = sentence_tokens;
        } else {
            let truncated = truncate_to_token_budget(sentence, tokenizer, max_model_length);
            let truncated_tokens = tokenizer.count(&truncated);
            push_chunk(&mut chunks, truncated, truncated_tokens, min_chunk_tokens);
        }
    }

    if !current.is_empty() {
        push_chunk(&mut chunks, current.join(" "), running_total, min_chunk_tokens);
    }

    ChunkPlan { chunks }
}

fn push_chunk(
    chunks: &mut Vec<PlannedChunk>,
    text: String,
    token_count: usize,
    min_chunk_tokens: usize,
) {
    let eligible = token_count >= min_chunk_tokens;
    chunks.push(PlannedChunk {
        text,
        token_count,
        eligible,
    });
}

/// Truncate `text` to the longest prefix whose token count stays within `budget`.
///
/// The cut lands on a char boundary. Token counts are treated as monotone in the
/// prefix length for the binary search; a short correction walk afterwards covers
/// the rare BPE merges that break monotonicity locally.
pub fn truncate_to_token_budget(text: &str, tokenizer: &dyn Tokenizer, budget: usize) -> String {
    if tokenizer.count(text) <= budget {
        return text.to_string();
    }

    let mut boundaries: Vec<usize> = text.char_indices().map(|(index, _)| index).collect();
    boundaries.push(text.len());

    let mut low = 0usize;
    let mut high = boundaries.len() - 1;
    while low < high {
        let mid = (low + high + 1) / 2;
        if tokenizer.count(&text[..boundaries[mid]]) <= budget {
            low = mid;
        } else {
            high = mid - 1;
        }
    }

    let mut cut = low;
    while cut > 0 && tokenizer.count(&text[..boundaries[cut]]) > budget {
        cut -= 1;
    }

    text[..boundaries[cut]].trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::WhitespaceTokenizer;

    fn sentences(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|part| part.to_string()).collect()
    }

    #[test]
    fn single_chunk_when_everything_fits() {
        let input = sentences(&["one two three", "four five six seven", "eight"]);
        let plan = plan_chunks(&input, &WhitespaceTokenizer, 10, 2);

        assert_eq!(plan.len(), 1);
        assert_eq!(plan.chunks[0].text, "one two three four five six seven eight");
        assert_eq!(plan.chunks[0].token_count, 8);
        assert!(plan.chunks[0].eligible);
    }

    #[test]
    fn closes_chunk_when_budget_would_overflow() {
        let input = sentences(&["one two three", "four five six seven", "eight"]);
        let plan = plan_chunks(&input, &WhitespaceTokenizer, 5, 1);

        assert_eq!(plan.len(), 2);
        assert_eq!(plan.chunks[0].text, "one two three");
        assert_eq!(plan.chunks[0].token_count, 3);
        assert_eq!(plan.chunks[1].text, "four five six seven eight");
        assert_eq!(plan.chunks[1].token_count, 5);
    }

    #[test]
    fn never_splits_a_sentence_that_fits_the_budget() {
        let input = sentences(&["alpha beta gamma", "delta epsilon", "zeta eta theta iota"]);
        let plan = plan_chunks(&input, &WhitespaceTokenizer, 5, 1);

        for chunk in &plan.chunks {
            assert!(chunk.token_count <= 5);
        }
        let rejoined: Vec<String> = plan.chunks.iter().map(|chunk| chunk.text.clone()).collect();
        assert_eq!(rejoined.join(" "), input.join(" "));
    }

    #[test]
    fn oversized_sentence_is_truncated_to_the_budget() {
        let words: Vec<String> = (1..=20).map(|n| format!("w{n}")).collect();
        let input = vec![words.join(" ")];
        let plan = plan_chunks(&input, &WhitespaceTokenizer, 10, 2);

        assert_eq!(plan.len(), 1);
        assert_eq!(plan.chunks[0].token_count, 10);
        assert_eq!(plan.chunks[0].text, words[..10].join(" "));
        assert!(plan.chunks[0].eligible);
    }

    #[test]
    fn oversized_sentence_flushes_the_open_chunk_first() {
        let long: String = (1..=12).map(|n| format!("x{n}")).collect::<Vec<_>>().join(" ");
        let input = sentences(&["alpha beta", &long]);
        let plan = plan_chunks(&input, &WhitespaceTokenizer, 10, 1);

        assert_eq!(plan.len(), 2);
        assert_eq!(plan.chunks[0].text, "alpha beta");
        assert_eq!(plan.chunks[1].token_count, 10);
        assert!(plan.chunks[1].text.starts_with("x1 "));
    }

    #[test]
    fn short_chunks_are_flagged_ineligible() {
        let input = sentences(&["one two", "three four five six"]);
        let plan = plan_chunks(&input, &WhitespaceTokenizer, 4, 3);

        assert_eq!(plan.len(), 2);
        assert!(!plan.chunks[0].eligible);
        assert!(plan.chunks[1].eligible);
        assert_eq!(plan.eligible_texts(), vec!["three four five six"]);
        assert_eq!(plan.eligible_count(), 1);
        assert_eq!(plan.skipped_count(), 1);
    }

    #[test]
    fn merge_keeps_fragment_order_across_skips() {
        let plan = ChunkPlan {
            chunks: vec![
                PlannedChunk {
                    text: "tiny".into(),
                    token_count: 1,
                    eligible: false,
                },
                PlannedChunk {
                    text: "first real chunk".into(),
                    token_count: 3,
                    eligible: true,
                },
                PlannedChunk {
                    text: "small".into(),
                    token_count: 1,
                    eligible: false,
                },
                PlannedChunk {
                    text: "second real chunk".into(),
                    token_count: 3,
                    eligible: true,
                },
            ],
        };
        let fragments = vec!["First summary.".to_string(), "Second summary.".to_string()];

        assert_eq!(plan.merge_fragments(&fragments), "First summary. Second summary.");
    }

    #[test]
    fn merge_is_idempotent_over_a_fragment_list() {
        let plan = ChunkPlan {
            chunks: vec![PlannedChunk {
                text: "chunk".into(),
                token_count: 5,
                eligible: true,
            }],
        };
        let fragments = vec!["Stable output.".to_string()];

        let first = plan.merge_fragments(&fragments);
        let second = plan.merge_fragments(&fragments);
        assert_eq!(first, second);
    }

    #[test]
    fn empty_sentence_list_yields_an_empty_plan() {
        let plan = plan_chunks(&[], &WhitespaceTokenizer, 10, 2);
        assert!(plan.is_empty());
        assert_eq!(plan.eligible_count(), 0);
    }

    #[test]
    fn truncate_returns_input_within_budget() {
        let text = "short enough already";
        assert_eq!(
            truncate_to_token_budget(text, &WhitespaceTokenizer, 10),
            text
        );
    }

    #[test]
    fn truncate_cuts_to_exactly_the_budget() {
        let words: Vec<String> = (1..=20).map(|n| format!("w{n}")).collect();
        let text = words.join(" ");
        let truncated = truncate_to_token_budget(&text, &WhitespaceTokenizer, 10);

        assert_eq!(WhitespaceTokenizer.count(&truncated), 10);
        assert_eq!(truncated, words[..10].join(" "));
    }

    #[test]
    fn truncate_respects_multibyte_boundaries() {
        let text = "héllo wörld żółw ćma über naïve œuvre émigré fjörd løve exträ wørds";
        let truncated = truncate_to_token_budget(&text, &WhitespaceTokenizer, 5);

        assert!(WhitespaceTokenizer.count(&truncated) <= 5);
        assert!(text.starts_with(&truncated));
    }
}
