//! Options for controlling the sanitizer pipeline.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Options for a single cleaning call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanOptions {
    /// Hard cap on output length, in characters.
    pub max_length: usize,

    /// Minimum number of prose words the cleaned text must keep.
    pub min_words: usize,

    /// Minimum trimmed length (characters) the cleaned text must keep.
    pub min_chars: usize,

    /// Strip every non-ASCII character after normalization.
    pub aggressive_unicode: bool,

    /// Skip the Unicode math normalizer.
    pub preserve_equations: bool,

    /// Suppress warning log lines.
    pub silent: bool,

    /// Tunable heuristics for the equation and line-quality filters.
    pub thresholds: EquationThresholds,
}

impl Default for CleanOptions {
    fn default() -> Self {
        Self {
            max_length: 5000,
            min_words: 10,
            min_chars: 50,
            aggressive_unicode: false,
            preserve_equations: false,
            silent: false,
            thresholds: EquationThresholds::default(),
        }
    }
}

impl CleanOptions {
    /// Creates new options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for prompts that must be plain ASCII prose.
    pub fn strict() -> Self {
        Self {
            min_words: 20,
            aggressive_unicode: true,
            ..Self::default()
        }
    }

    /// Options for short selections where little prose is expected.
    pub fn lenient() -> Self {
        Self {
            min_words: 3,
            min_chars: 15,
            preserve_equations: true,
            ..Self::default()
        }
    }

    /// Sets the output length cap.
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    /// Sets the minimum word count for validation.
    pub fn with_min_words(mut self, min_words: usize) -> Self {
        self.min_words = min_words;
        self
    }

    /// Sets the minimum trimmed length for validation.
    pub fn with_min_chars(mut self, min_chars: usize) -> Self {
        self.min_chars = min_chars;
        self
    }

    /// Replaces the heuristic thresholds.
    pub fn with_thresholds(mut self, thresholds: EquationThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Strips every non-ASCII character after normalization.
    pub fn aggressive_unicode(mut self) -> Self {
        self.aggressive_unicode = true;
        self
    }

    /// Keeps Unicode math symbols as they are.
    pub fn preserve_equations(mut self) -> Self {
        self.preserve_equations = true;
        self
    }

    /// Suppresses warning log lines.
    pub fn silent(mut self) -> Self {
        self.silent = true;
        self
    }

    /// Minimum trimmed length actually enforced.
    ///
    /// A cap below `min_chars` would make every input fail validation, so the
    /// smaller of the two wins.
    pub fn effective_min_chars(&self) -> usize {
        self.min_chars.min(self.max_length)
    }

    /// Checks the options for values the pipeline cannot honor.
    pub fn validate(&self) -> Result<()> {
        let t = &self.thresholds;
        let ratios = [
            ("min_letter_ratio", t.min_letter_ratio),
            ("placeholder_warning_ratio", t.placeholder_warning_ratio),
        ];
        for (name, value) in ratios {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidOptions(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        if t.letter_run < 2 {
            return Err(Error::InvalidOptions(format!(
                "letter_run must be at least 2, got {}",
                t.letter_run
            )));
        }
        if t.max_brace_passes == 0 {
            return Err(Error::InvalidOptions(
                "max_brace_passes must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Parses options from a JSON document. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Serializes the options as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Empirically tuned constants behind the equation heuristics.
///
/// These reproduce the pass/fail decisions of the reference corpus. Do not
/// recalibrate them without a regression corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EquationThresholds {
    /// Space-separated single letters that collapse to `[equation]`.
    pub letter_run: usize,
    /// `lhs=rhs` fragments at or above this length become `[equation]`.
    pub max_fragment_length: usize,
    /// Single-letter tokens a kept `lhs=rhs` fragment may contain.
    pub max_single_letters: usize,
    /// Fragments with this many spaces or more become `[equation]`.
    pub max_spaces: usize,
    /// Lines longer than 15 chars need at least this letter ratio.
    pub min_letter_ratio: f64,
    /// Lines with more `[equation]` tokens than this are dropped.
    pub max_equations_per_line: usize,
    /// Upper bound on brace-collapsing passes.
    pub max_brace_passes: usize,
    /// Placeholder/word ratio above which a warning is attached.
    pub placeholder_warning_ratio: f64,
}

impl Default for EquationThresholds {
    fn default() -> Self {
        Self {
            letter_run: 7,
            max_fragment_length: 30,
            max_single_letters: 5,
            max_spaces: 10,
            min_letter_ratio: 0.25,
            max_equations_per_line: 4,
            max_brace_passes: 5,
            placeholder_warning_ratio: 0.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = CleanOptions::default();
        assert_eq!(options.max_length, 5000);
        assert_eq!(options.min_words, 10);
        assert_eq!(options.min_chars, 50);
        assert!(!options.aggressive_unicode);
        assert!(!options.preserve_equations);
        assert!(!options.silent);
        assert_eq!(options.thresholds.letter_run, 7);
    }

    #[test]
    fn test_presets() {
        let strict = CleanOptions::strict();
        assert!(strict.aggressive_unicode);
        assert!(strict.min_words > CleanOptions::default().min_words);

        let lenient = CleanOptions::lenient();
        assert!(lenient.preserve_equations);
        assert!(lenient.min_chars < CleanOptions::default().min_chars);
    }

    #[test]
    fn test_builder_chain() {
        let options = CleanOptions::new()
            .with_max_length(800)
            .with_min_words(4)
            .aggressive_unicode()
            .silent();
        assert_eq!(options.max_length, 800);
        assert_eq!(options.min_words, 4);
        assert!(options.aggressive_unicode);
        assert!(options.silent);
    }

    #[test]
    fn test_effective_min_chars_clamped_by_cap() {
        let options = CleanOptions::default().with_max_length(20);
        assert_eq!(options.effective_min_chars(), 20);
        assert_eq!(CleanOptions::default().effective_min_chars(), 50);
    }

    #[test]
    fn test_json_partial_config() {
        let options = CleanOptions::from_json(r#"{"max_length": 1200, "silent": true}"#).unwrap();
        assert_eq!(options.max_length, 1200);
        assert!(options.silent);
        assert_eq!(options.min_words, 10);
        assert_eq!(options.thresholds, EquationThresholds::default());
    }

    #[test]
    fn test_json_rejects_bad_ratio() {
        let result = CleanOptions::from_json(r#"{"thresholds": {"min_letter_ratio": -1.0}}"#);
        assert!(matches!(result, Err(Error::InvalidOptions(_))));
    }

    #[test]
    fn test_json_rejects_malformed() {
        let result = CleanOptions::from_json("{not json");
        assert!(matches!(result, Err(Error::Json(_))));
    }

    #[test]
    fn test_json_roundtrip_preserves_thresholds() {
        let mut thresholds = EquationThresholds::default();
        thresholds.max_fragment_length = 42;
        let options = CleanOptions::default().with_thresholds(thresholds);
        let parsed = CleanOptions::from_json(&options.to_json().unwrap()).unwrap();
        assert_eq!(parsed, options);
    }
}
