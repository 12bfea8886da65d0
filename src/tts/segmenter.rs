//! Text segmentation for length-limited synthesis.
//!
//! The model only accepts a bounded amount of text per call, so long input is
//! split into chunks that stay under a character budget. Sentence boundaries
//! are preferred; sentences that are too long on their own fall back to word
//! boundaries.

use std::sync::LazyLock;

use regex::Regex;

/// Default character budget per chunk.
pub const DEFAULT_MAX_CHARS: usize = 400;

/// Terminal punctuation followed by a whitespace run.
static SENTENCE_BOUNDARY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[.!?]\s+").expect("valid sentence boundary regex"));

/// Split text into chunks of at most `max_chars` characters.
///
/// Sentences are packed greedily into chunks. A sentence longer than the
/// budget is broken at word boundaries and its pieces are emitted on their own,
/// never merged with the following sentence. A single word longer than the
/// budget is emitted whole, so that is the only chunk that may exceed it.
///
/// Lengths are counted in characters, not bytes. Empty or whitespace-only
/// input yields no chunks.
///
/// # Arguments
/// * `text` - Input text
/// * `max_chars` - Character budget per chunk
///
/// # Returns
/// Ordered, trimmed, non-empty chunks.
pub fn split_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for sentence in split_sentences(text) {
        let candidate = join(&current, sentence);
        if char_len(&candidate) <= max_chars {
            current = candidate;
            continue;
        }

        if !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
        }

        if char_len(sentence) <= max_chars {
            current = sentence.to_string();
        } else {
            chunks.extend(split_words(sentence, max_chars));
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks.retain(|chunk| !chunk.trim().is_empty());
    chunks
}

/// Split text at `.`, `!` or `?` followed by whitespace.
///
/// The punctuation stays with the preceding sentence and the whitespace run is
/// dropped. Abbreviations are not special-cased.
fn split_sentences(text: &str) -> impl Iterator<Item = &str> {
    let mut sentences = Vec::new();
    let mut start = 0;

    for boundary in SENTENCE_BOUNDARY.find_iter(text) {
        // Punctuation marks are single-byte, so the sentence ends one byte in
        let end = boundary.start() + 1;
        sentences.push(&text[start..end]);
        start = boundary.end();
    }
    sentences.push(&text[start..]);

    sentences.into_iter().map(str::trim).filter(|s| !s.is_empty())
}

/// Greedily pack the words of an over-long sentence into chunks.
fn split_words(sentence: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for word in sentence.split_whitespace() {
        let candidate = join(&current, word);
        if char_len(&candidate) <= max_chars {
            current = candidate;
        } else {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            current = word.to_string();
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

/// Join two pieces with a single space, trimming the result.
fn join(current: &str, next: &str) -> String {
    format!("{} {}", current, next).trim().to_string()
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize(text: &str) -> String {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_two_sentences_do_not_merge() {
        let chunks = split_text("Hello world. This is a test.", 15);
        assert_eq!(chunks, vec!["Hello world.", "This is a test."]);
    }

    #[test]
    fn test_long_sentence_wraps_at_words() {
        let chunks = split_text("A very long single sentence without any punctuation marks at all", 20);
        assert_eq!(chunks, vec!["A very long single", "sentence without any", "punctuation marks at", "all"]);
        assert!(chunks.iter().all(|c| c.chars().count() <= 20));
    }

    #[test]
    fn test_short_text_is_single_chunk() {
        assert_eq!(split_text("Short.", DEFAULT_MAX_CHARS), vec!["Short."]);
    }

    #[test]
    fn test_overlong_word_is_emitted_whole() {
        let word = "x".repeat(50);
        let chunks = split_text(&word, 20);
        assert_eq!(chunks, vec![word]);
    }

    #[test]
    fn test_overlong_word_between_short_words() {
        let long = "y".repeat(30);
        let text = format!("aa bb {} cc dd", long);
        let chunks = split_text(&text, 10);
        assert_eq!(chunks, vec!["aa bb".to_string(), long, "cc dd".to_string()]);
    }

    #[test]
    fn test_empty_and_whitespace_input() {
        for n in [1, 15, DEFAULT_MAX_CHARS] {
            assert!(split_text("", n).is_empty());
            assert!(split_text("   ", n).is_empty());
            assert!(split_text("\n\t  \n", n).is_empty());
        }
    }

    #[test]
    fn test_text_within_limit_without_breaks_is_trimmed() {
        let text = "  no sentence breaks in here at all  ";
        assert_eq!(split_text(text, 100), vec![text.trim()]);
    }

    #[test]
    fn test_sentence_exactly_at_limit_fits() {
        let sentence = "Exactly twenty char";
        let sentence = format!("{}.", sentence);
        assert_eq!(sentence.chars().count(), 20);
        assert_eq!(split_text(&sentence, 20), vec![sentence]);
    }

    #[test]
    fn test_sentences_merge_up_to_limit() {
        let chunks = split_text("One. Two. Three. Four.", 10);
        assert_eq!(chunks, vec!["One. Two.", "Three.", "Four."]);
    }

    #[test]
    fn test_word_split_does_not_merge_with_next_sentence() {
        let text = "This sentence is far too long to fit. Ok.";
        let chunks = split_text(text, 12);
        assert_eq!(chunks, vec!["This", "sentence is", "far too long", "to fit.", "Ok."]);
    }

    #[test]
    fn test_boundary_punctuation_variants() {
        let chunks = split_text("Really? Yes! Done.", 7);
        assert_eq!(chunks, vec!["Really?", "Yes!", "Done."]);
    }

    #[test]
    fn test_abbreviations_and_decimals_are_not_special() {
        // "Dr." followed by a space is a boundary; "3.14" has no whitespace after the dot
        let chunks = split_text("Dr. Smith paid 3.14 dollars.", 12);
        assert_eq!(chunks, vec!["Dr.", "Smith paid", "3.14", "dollars."]);
    }

    #[test]
    fn test_newlines_count_as_boundary_whitespace() {
        let chunks = split_text("First line.\n\nSecond line.", 12);
        assert_eq!(chunks, vec!["First line.", "Second line."]);
    }

    #[test]
    fn test_lengths_are_counted_in_chars() {
        // Each sentence is 6 chars but more than 6 bytes
        let chunks = split_text("Héllo. Wörld.", 6);
        assert_eq!(chunks, vec!["Héllo.", "Wörld."]);
    }

    #[test]
    fn test_invariants_over_mixed_text() {
        let text = "The quick brown fox jumps over the lazy dog. Pack my box with five dozen liquor jugs! \
                    How vexingly quick daft zebras jump?  Sphinx of black quartz, judge my vow. \
                    Supercalifragilisticexpialidocious is a rather long word indeed.";
        for max_chars in [5, 12, 20, 40, 80, 400] {
            let chunks = split_text(text, max_chars);

            assert!(!chunks.is_empty());
            assert!(chunks.iter().all(|c| !c.trim().is_empty() && c.trim() == c.as_str()));

            for chunk in &chunks {
                let len = chunk.chars().count();
                let solitary_word = !chunk.contains(char::is_whitespace);
                assert!(len <= max_chars || solitary_word, "chunk {:?} exceeds {}", chunk, max_chars);
            }

            assert_eq!(chunks.join(" "), normalize(text));
        }
    }
}
