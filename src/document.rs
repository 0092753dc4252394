//! The in-progress manuscript text and the text hygiene applied to
//! generated content before it is appended.

use once_cell::sync::Lazy;
use regex::Regex;

/// Filler the model tends to wrap around the actual prose. Each pattern
/// is removed before the word-count check; the list is fixed and ordered.
static FILLER_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // Assistant preambles: "Here is the continuation:", "Sure, here's the next part:"
        r"(?i)^\s*(sure[,!]?\s+)?here('|\x{2019})?s?\s+(is\s+)?(the\s+)?(continuation|next\s+(part|section|paragraph)|story)\b[^\n]*\n+",
        // Heading the prompt explicitly forbids: "Chapter 3", "Bab 3"
        r"(?i)^\s*(chapter|bab)\s+\d+[^\n]*\n+",
        r"(?i)^\s*continuation:?\s*\n+",
        // Markdown fences around the prose
        r"^\s*```[a-zA-Z]*\n",
        r"\n```\s*$",
        // Trailing sign-offs
        r"(?i)\n+\s*\(?\s*to be continued\.{0,3}\s*\)?\s*$",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("filler pattern is valid"))
    .collect()
});

/// Strip known filler prefixes/suffixes from generated text.
pub fn strip_filler(text: &str) -> String {
    let mut out = text.to_string();
    for pattern in FILLER_PATTERNS.iter() {
        out = pattern.replace(&out, "").into_owned();
    }
    out.trim().to_string()
}

/// Whitespace-separated word count. Additive across a blank-line append:
/// `count_words(a) + count_words(b) == count_words(a ++ "\n\n" ++ b)`.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// The growing chapter text. Append-only during a generation cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    text: String,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        Document { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn word_count(&self) -> usize {
        count_words(&self.text)
    }

    /// The last `max_chars` characters, used as continuation context.
    /// Slices on a character boundary so multibyte text is safe.
    pub fn tail(&self, max_chars: usize) -> &str {
        let total = self.text.chars().count();
        if total <= max_chars {
            return &self.text;
        }
        self.text
            .char_indices()
            .nth(total - max_chars)
            .map(|(idx, _)| &self.text[idx..])
            .unwrap_or(&self.text)
    }

    /// The last sentence of the document, if any. Sentence boundaries are
    /// `.`, `!` and `?`, matching how the prompt quotes the ending point.
    pub fn last_sentence(&self) -> Option<&str> {
        self.text
            .split_terminator(['.', '!', '?'])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .next_back()
    }

    /// Append generated text, separated from existing content by a blank
    /// line. An empty document takes the text without a separator.
    pub fn append_generated(&mut self, text: &str) {
        if self.text.is_empty() {
            self.text.push_str(text);
        } else {
            self.text.push_str("\n\n");
            self.text.push_str(text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[test]
    fn test_count_words_simple() {
        assert_eq!(count_words("the quick brown fox"), 4);
    }

    #[test]
    fn test_count_words_empty() {
        assert_eq!(count_words(""), 0);
        assert_eq!(count_words("   \n\t "), 0);
    }

    #[test]
    fn test_count_words_collapses_whitespace() {
        assert_eq!(count_words("a  b\n\nc\td"), 4);
    }

    #[test]
    fn test_append_to_empty_has_no_separator() {
        let mut doc = Document::new();
        doc.append_generated("first paragraph");
        assert_eq!(doc.text(), "first paragraph");
    }

    #[test]
    fn test_append_uses_blank_line_separator() {
        let mut doc = Document::from_text("first");
        doc.append_generated("second");
        assert_eq!(doc.text(), "first\n\nsecond");
    }

    #[test]
    fn test_append_word_count_is_additive() {
        let mut doc = Document::from_text("one two three");
        let before = doc.word_count();
        doc.append_generated("four five");
        assert_eq!(doc.word_count(), before + 2);
    }

    proptest! {
        #[test]
        fn prop_blank_line_append_is_word_additive(
            a in "[a-z]{1,8}( [a-z]{1,8}){0,20}",
            b in "[a-z]{1,8}( [a-z]{1,8}){0,20}",
        ) {
            let mut doc = Document::from_text(a.clone());
            doc.append_generated(&b);
            prop_assert_eq!(doc.word_count(), count_words(&a) + count_words(&b));
        }
    }

    #[test]
    fn test_tail_shorter_than_limit_returns_all() {
        let doc = Document::from_text("short text");
        assert_eq!(doc.tail(1000), "short text");
    }

    #[test]
    fn test_tail_returns_last_chars() {
        let doc = Document::from_text("abcdefghij");
        assert_eq!(doc.tail(4), "ghij");
    }

    #[test]
    fn test_tail_respects_multibyte_boundaries() {
        let doc = Document::from_text("héllo wörld");
        // Must not panic on a byte boundary inside a multibyte char.
        assert_eq!(doc.tail(5), "wörld");
    }

    #[test]
    fn test_last_sentence() {
        let doc = Document::from_text("First one. Second one! The third?");
        assert_eq!(doc.last_sentence(), Some("The third"));
    }

    #[test]
    fn test_last_sentence_empty_document() {
        assert_eq!(Document::new().last_sentence(), None);
    }

    #[test]
    fn test_last_sentence_without_terminator() {
        let doc = Document::from_text("He opened the door. She waited");
        assert_eq!(doc.last_sentence(), Some("She waited"));
    }

    #[rstest]
    #[case("Here's the continuation:\nThe door creaked open.", "The door creaked open.")]
    #[case("Here is the next part:\nRain fell on the roof.", "Rain fell on the roof.")]
    #[case("Sure, here's the story:\nOnce more he ran.", "Once more he ran.")]
    #[case("Chapter 4: The Storm\nWind howled outside.", "Wind howled outside.")]
    #[case("Bab 2\nAngin bertiup kencang.", "Angin bertiup kencang.")]
    #[case("Continuation:\nShe kept walking.", "She kept walking.")]
    #[case("The end drew near.\n\nTo be continued...", "The end drew near.")]
    #[case("```\nProse inside a fence.\n```", "Prose inside a fence.")]
    fn test_strip_filler(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(strip_filler(input), expected);
    }

    #[test]
    fn test_strip_filler_leaves_clean_text_alone() {
        let text = "The rain had stopped by the time she reached the gate.";
        assert_eq!(strip_filler(text), text);
    }

    #[test]
    fn test_strip_filler_does_not_touch_mid_text_mentions() {
        let text = "He said the chapter 3 ledger was missing.";
        assert_eq!(strip_filler(text), text);
    }
}
