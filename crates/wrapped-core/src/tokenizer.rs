//! Word and emoji extraction from message bodies.

use std::collections::HashSet;

use regex::Regex;

/// Words too common in group chatter to say anything about it.
pub const DEFAULT_STOP_WORDS: &[&str] = &[
    "para", "como", "that", "this", "with", "what", "from", "have", "your", "about", "would",
    "it’s", "like", "join", "will", "using", "just", "more", "link", "visit",
];

/// Tokens shorter than this many characters are dropped.
pub const MIN_WORD_CHARS: usize = 4;

/// Tokens starting with this prefix are treated as links and dropped.
pub const URL_PREFIX: &str = "http";

/// Splits message text into countable words.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    stop_words: HashSet<String>,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::with_stop_words(DEFAULT_STOP_WORDS.iter().copied())
    }
}

impl Tokenizer {
    pub fn with_stop_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            stop_words: words.into_iter().map(Into::into).collect(),
        }
    }

    /// Lowercase, strip ASCII punctuation, split on whitespace and filter.
    ///
    /// Surviving tokens keep their order of appearance.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let cleaned: String = text
            .chars()
            .filter(|c| !c.is_ascii_punctuation())
            .collect::<String>()
            .to_lowercase();

        cleaned
            .split_whitespace()
            .filter(|word| self.keep(word))
            .map(str::to_string)
            .collect()
    }

    fn keep(&self, word: &str) -> bool {
        word.chars().count() >= MIN_WORD_CHARS
            && !word.chars().all(char::is_numeric)
            && !word.starts_with(URL_PREFIX)
            && !self.stop_words.contains(word)
    }
}

// ── Emoji ─────────────────────────────────────────────────────────────────────

/// Per-character emoji membership test.
///
/// A character counts when it is pictographic or a regional-indicator letter
/// (the halves of a flag). Multi-character sequences are counted per character.
#[derive(Debug, Clone)]
pub struct EmojiCounter {
    re: Regex,
}

impl Default for EmojiCounter {
    fn default() -> Self {
        Self {
            re: Regex::new(r"[\p{Extended_Pictographic}\x{1F1E6}-\x{1F1FF}]")
                .expect("regex is valid"),
        }
    }
}

impl EmojiCounter {
    pub fn count(&self, text: &str) -> u64 {
        self.re.find_iter(text).count() as u64
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
