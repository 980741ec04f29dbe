//! Output validation and the fallback path.
//!
//! Cleaning is aggressive. When it leaves too little prose behind, the caller
//! gets a lightly normalized copy of the original instead.

use crate::error::{Error, Result};
use crate::options::CleanOptions;
use crate::stages;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static RE_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b[a-zA-Z]{2,}\b").unwrap());

static RE_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[(?:equation|math|code block|code|link|email)\]").unwrap()
});

/// Outcome of checking cleaned text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Whether the text can be used as is.
    pub valid: bool,
    /// ASCII words of two letters or more, placeholders excluded.
    pub word_count: usize,
    /// Placeholder tokens (`[equation]`, `[math]`, `[code block]`, ...).
    pub placeholder_count: usize,
    /// Trimmed length in characters.
    pub length: usize,
    /// Non-fatal findings.
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// Converts a failed validation into [`Error::ValidationFailed`].
    pub fn check(&self, options: &CleanOptions) -> Result<()> {
        if self.valid {
            return Ok(());
        }
        Err(Error::ValidationFailed {
            word_count: self.word_count,
            length: self.length,
            min_words: options.min_words,
            min_chars: options.effective_min_chars(),
        })
    }

    /// Placeholders per prose word (0 when there are no words).
    pub fn placeholder_ratio(&self) -> f64 {
        if self.word_count == 0 {
            0.0
        } else {
            self.placeholder_count as f64 / self.word_count as f64
        }
    }
}

/// Checks cleaned text against the word and length minimums.
pub fn validate(cleaned: &str, options: &CleanOptions) -> ValidationResult {
    let prose = RE_PLACEHOLDER.replace_all(cleaned, " ");
    let word_count = RE_WORD.find_iter(&prose).count();
    let placeholder_count = RE_PLACEHOLDER.find_iter(cleaned).count();
    let length = cleaned.trim().chars().count();
    let min_chars = options.effective_min_chars();

    let mut warnings = Vec::new();
    if word_count < options.min_words {
        warnings.push(format!(
            "only {} words remain (need {})",
            word_count, options.min_words
        ));
    }
    if length < min_chars {
        warnings.push(format!(
            "only {} characters remain (need {})",
            length, min_chars
        ));
    }

    let valid = warnings.is_empty();
    let mut result = ValidationResult {
        valid,
        word_count,
        placeholder_count,
        length,
        warnings,
    };

    let ratio = result.placeholder_ratio();
    if valid && ratio > options.thresholds.placeholder_warning_ratio {
        result.warnings.push(format!(
            "placeholder ratio {:.2} exceeds {:.2}",
            ratio, options.thresholds.placeholder_warning_ratio
        ));
    }

    result
}

/// The lightly normalized original returned when cleaning is rejected.
///
/// Only the safety stages run (invisible and control characters, HTML tags)
/// before whitespace normalization. The result is cut to `max_length`
/// characters without an ellipsis.
pub fn fallback(original: &str, max_length: usize) -> String {
    let text = stages::strip_invisible(original);
    let text = stages::strip_control(&text);
    let text = stages::strip_html(&text);
    let mut text = stages::whitespace_normalize(&text);
    while stages::contains_tag_like(&text) {
        text = stages::whitespace_normalize(&stages::strip_tag_like(&text));
    }
    text.chars().take(max_length).collect()
}
