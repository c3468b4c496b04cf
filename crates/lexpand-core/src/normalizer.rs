//! Normalizer — turns raw query text and artifact aliases into one comparable form.
//!
//! Lowercase, strip punctuation (hyphens survive), collapse whitespace, trim.
//! Aliases go through the same function at load time so lookups are plain
//! byte comparisons.

use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

static PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s-]").expect("punctuation pattern is valid"));

/// Normalized query text plus the byte range of each token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedQuery {
    text: String,
    tokens: Vec<Range<usize>>,
}

impl NormalizedQuery {
    pub fn new(raw: &str) -> Self {
        let text = normalize(raw);
        let mut tokens = Vec::new();
        let mut start = 0;
        for word in text.split(' ') {
            if !word.is_empty() {
                tokens.push(start..start + word.len());
            }
            start += word.len() + 1;
        }
        Self { text, tokens }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    pub fn token(&self, index: usize) -> &str {
        &self.text[self.tokens[index].clone()]
    }

    /// Byte range spanning tokens `range.start..range.end`.
    pub fn byte_range(&self, range: Range<usize>) -> Range<usize> {
        self.tokens[range.start].start..self.tokens[range.end - 1].end
    }

    /// Text of tokens `range.start..range.end`, single-space separated.
    pub fn slice(&self, range: Range<usize>) -> &str {
        &self.text[self.byte_range(range)]
    }
}

/// Normalize `input`: `"  Is  SF   available???  "` becomes `"is sf available"`.
pub fn normalize(input: &str) -> String {
    let lowered = input.to_lowercase();
    let stripped = PUNCTUATION.replace_all(&lowered, "");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}
