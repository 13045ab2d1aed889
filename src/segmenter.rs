//! Rule-based sentence segmentation.
//!
//! Chunk planning operates on whole sentences, so the splitter needs boundaries that
//! survive abbreviations ("Dr. Smith"), initials, decimals, and ellipses. A terminator
//! run (`.`, `!`, `?`, `…`) followed by whitespace ends a sentence when the next
//! non-space character looks like a sentence opener; newlines always force a break.

/// Splits document text into sentences.
pub trait SentenceSegmenter: Send + Sync {
    /// Produce the sentences of `text` in order. Whitespace-only input yields none.
    fn segment(&self, text: &str) -> Vec<String>;
}

/// Default segmenter driven by punctuation heuristics.
pub struct RuleSegmenter;

/// Lower-cased words that end with a period without ending a sentence.
const ABBREVIATIONS: &[&str] = &[
    "al", "approx", "apr", "aug", "ave", "co", "corp", "dec", "dept", "dr", "e.g", "est", "etc",
    "feb", "fig", "gen", "gov", "i.e", "inc", "jan", "jr", "jul", "jun", "ltd", "mar", "messrs",
    "mr", "mrs", "ms", "mt", "no", "nov", "oct", "p", "pp", "prof", "rep", "rev", "sen", "sep",
    "sept", "sr", "st", "u.k", "u.s", "vol", "vs",
];

impl SentenceSegmenter for RuleSegmenter {
    fn segment(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        let mut sentences = Vec::new();
        let mut current = String::new();
        let mut i = 0;

        while i < chars.len() {
            let ch = chars[i];
            if ch == '\n' || ch == '\r' {
                flush(&mut current, &mut sentences);
                i += 1;
                continue;
            }

            current.push(ch);
            i += 1;
            if !is_terminator(ch) {
                continue;
            }

            let mut periods = usize::from(ch == '.');
            let mut strong = matches!(ch, '!' | '?');
            let mut ellipsis = ch == '…';
            while i < chars.len() {
                let next = chars[i];
                if is_terminator(next) {
                    periods += usize::from(next == '.');
                    strong |= matches!(next, '!' | '?');
                    ellipsis |= next == '…';
                } else if !is_closer(next) {
                    break;
                }
                current.push(next);
                i += 1;
            }

            let at_end = i >= chars.len();
            if !at_end && !chars[i].is_whitespace() {
                // Mid-token period: decimals, version strings, bare URLs.
                continue;
            }

            let breaks = if strong {
                true
            } else {
                let opener_ahead = match next_nonspace(&chars, i) {
                    None => true,
                    Some(next) => starts_sentence(next),
                };
                if ellipsis || periods > 1 {
                    opener_ahead
                } else {
                    opener_ahead && !ends_with_abbreviation(&current)
                }
            };
            if breaks {
                flush(&mut current, &mut sentences);
            }
        }

        flush(&mut current, &mut sentences);
        sentences
    }
}

fn flush(current: &mut String, sentences: &mut Vec<String>) {
    let sentence = current.trim();
    if !sentence.is_empty() {
        sentences.push(sentence.to_string());
    }
    current.clear();
}

fn is_terminator(ch: char) -> bool {
    matches!(ch, '.' | '!' | '?' | '…')
}

fn is_closer(ch: char) -> bool {
    matches!(ch, '"' | '\'' | ')' | ']' | '”' | '’' | '»')
}

fn next_nonspace(chars: &[char], from: usize) -> Option<char> {
    chars[from..].iter().copied().find(|c| !c.is_whitespace())
}

fn starts_sentence(ch: char) -> bool {
    ch.is_uppercase() || ch.is_numeric() || matches!(ch, '"' | '\'' | '“' | '‘' | '(' | '[' | '«')
}

/// Check whether the sentence buffer ends in an abbreviation or a single initial.
fn ends_with_abbreviation(sentence: &str) -> bool {
    let trimmed = sentence.trim_end_matches(|c: char| is_terminator(c) || is_closer(c));
    let word = trimmed
        .rsplit(char::is_whitespace)
        .next()
        .unwrap_or("")
        .trim_start_matches(|c: char| !c.is_alphanumeric());
    if word.is_empty() {
        return false;
    }

    let mut letters = word.chars();
    if let (Some(first), None) = (letters.next(), letters.next()) {
        if first.is_alphabetic() && first.is_uppercase() {
            return true;
        }
    }

    ABBREVIATIONS.contains(&word.to_lowercase().as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(text: &str) -> Vec<String> {
        RuleSegmenter.segment(text)
    }

    #[test]
    fn splits_on_terminator_runs() {
        let sentences = segment("First point. Second point! Third one?");
        assert_eq!(
            sentences,
            vec!["First point.", "Second point!", "Third one?"]
        );
    }

    #[test]
    fn keeps_abbreviations_attached() {
        let sentences = segment("Dr. Smith arrived early. He sat down.");
        assert_eq!(sentences, vec!["Dr. Smith arrived early.", "He sat down."]);
    }

    #[test]
    fn keeps_initials_attached() {
        let sentences = segment("J. R. R. Tolkien wrote it. Everyone read it.");
        assert_eq!(sentences.len(), 2);
        assert!(sentences[0].starts_with("J. R. R. Tolkien"));
    }

    #[test]
    fn ignores_decimal_points() {
        let sentences = segment("Pi is roughly 3.14 in class. Engineers round it.");
        assert_eq!(sentences.len(), 2);
        assert!(sentences[0].contains("3.14"));
    }

    #[test]
    fn groups_interrobang_runs() {
        let sentences = segment("What?! Really.");
        assert_eq!(sentences, vec!["What?!", "Really."]);
    }

    #[test]
    fn ellipsis_breaks_only_before_an_opener() {
        assert_eq!(segment("He paused... then spoke.").len(), 1);
        assert_eq!(segment("He paused... Then spoke.").len(), 2);
    }

    #[test]
    fn newlines_force_breaks() {
        let sentences = segment("alpha beta\ngamma delta");
        assert_eq!(sentences, vec!["alpha beta", "gamma delta"]);
    }

    #[test]
    fn absorbs_closing_quotes() {
        let sentences = segment("\"Stop!\" She froze.");
        assert_eq!(sentences, vec!["\"Stop!\"", "She froze."]);
    }

    #[test]
    fn empty_and_whitespace_yield_nothing() {
        assert!(segment("").is_empty());
        assert!(segment("   \n\t  ").is_empty());
    }

    #[test]
    fn trailing_fragment_is_flushed() {
        let sentences = segment("An unfinished thought");
        assert_eq!(sentences, vec!["An unfinished thought"]);
    }
}
