//! # promptsafe
//!
//! Sanitizes scraped or extracted text (web pages, PDFs, selections) before it
//! is interpolated into a language-model prompt.
//!
//! The pipeline strips invisible and control characters, HTML, URLs, code,
//! tables, encyclopedia boilerplate, LaTeX and formula fragments, normalizes
//! Unicode math to ASCII, and caps the length. If too little prose survives,
//! a lightly normalized copy of the input is returned instead.
//!
//! ## Quick Start
//!
//! ```
//! use promptsafe::{clean, CleanOptions};
//!
//! let text = "Photosynthesis\u{200B} converts light energy into chemical energy.[12] \
//!             Plants, algae and cyanobacteria use it to make sugar from carbon dioxide and water.";
//!
//! let cleaned = clean(text, &CleanOptions::default());
//! assert!(!cleaned.contains("[12]"));
//! assert!(!cleaned.contains('\u{200B}'));
//! ```
//!
//! ## Features
//!
//! - `async`: Tokio wrappers in [`async_api`]

pub mod diagnostics;
pub mod error;
pub mod options;
pub mod pipeline;
pub mod stages;
pub mod validate;

#[cfg(feature = "async")]
pub mod async_api;

// Re-exports
pub use diagnostics::{analyze_impact, debug_steps, debug_steps_with, DebugTrace, ImpactReport};
pub use error::{Error, Result};
pub use options::{CleanOptions, EquationThresholds};
pub use pipeline::Stage;
pub use validate::{fallback, validate, ValidationResult};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// How a cleaning call ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum Outcome {
    /// The cleaned text passed validation.
    Accepted,
    /// Cleaning was rejected; the text is the normalized original.
    Fallback { reason: String },
}

/// Cleaned text together with how it was produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanReport {
    pub text: String,
    pub outcome: Outcome,
    /// Validation of the pipeline output. `None` when the pipeline itself failed.
    pub validation: Option<ValidationResult>,
}

impl CleanReport {
    /// Returns true if the fallback text was returned.
    pub fn is_fallback(&self) -> bool {
        matches!(self.outcome, Outcome::Fallback { .. })
    }
}

/// Cleans text for use in a prompt.
///
/// Never fails: invalid options, a failing stage or a validation failure all
/// produce the fallback text (see [`fallback`]).
///
/// # Example
///
/// ```
/// use promptsafe::{clean, CleanOptions};
///
/// let options = CleanOptions::default().with_max_length(200).silent();
/// let cleaned = clean("<p>Short</p>", &options);
/// assert_eq!(cleaned, "Short");
/// ```
pub fn clean(text: &str, options: &CleanOptions) -> String {
    clean_with_report(text, options).text
}

/// Cleans text and reports whether the fallback path was taken.
pub fn clean_with_report(text: &str, options: &CleanOptions) -> CleanReport {
    let pipeline_output = options
        .validate()
        .and_then(|()| pipeline::run_stages(text, options, |_, _| {}));

    let (err, validation) = match pipeline_output {
        Ok(cleaned) => {
            let validation = validate::validate(&cleaned, options);
            match validation.check(options) {
                Ok(()) => {
                    if !options.silent {
                        for warning in &validation.warnings {
                            log::warn!("{}", warning);
                        }
                    }
                    return CleanReport {
                        text: cleaned,
                        outcome: Outcome::Accepted,
                        validation: Some(validation),
                    };
                }
                Err(err) => (err, Some(validation)),
            }
        }
        Err(err) => (err, None),
    };

    if !options.silent {
        log::warn!("Using normalized input instead of cleaned text: {}", err);
    }

    CleanReport {
        text: validate::fallback(text, options.max_length),
        outcome: Outcome::Fallback {
            reason: err.reason(),
        },
        validation,
    }
}

/// Cleans text, returning an error instead of the fallback text.
///
/// # Example
///
/// ```
/// use promptsafe::{try_clean, CleanOptions, Error};
///
/// let result = try_clean("[1][2] $$x$$", &CleanOptions::default());
/// assert!(matches!(result, Err(Error::ValidationFailed { .. })));
/// ```
pub fn try_clean(text: &str, options: &CleanOptions) -> Result<String> {
    options.validate()?;
    let cleaned = pipeline::run_stages(text, options, |_, _| {})?;
    validate::validate(&cleaned, options).check(options)?;
    Ok(cleaned)
}

/// Cleans many texts in parallel. Output order matches input order.
pub fn clean_batch<S>(texts: &[S], options: &CleanOptions) -> Vec<String>
where
    S: AsRef<str> + Sync,
{
    texts
        .par_iter()
        .map(|text| clean(text.as_ref(), options))
        .collect()
}

/// Builder for sanitizing text.
///
/// Provides a fluent API over [`CleanOptions`].
///
/// # Example
///
/// ```
/// use promptsafe::Sanitizer;
///
/// let sanitizer = Sanitizer::new().max_length(1000).min_words(3).silent();
/// let cleaned = sanitizer.clean("Water (H₂O) boils at 100°C at sea level pressure.");
/// assert!(cleaned.contains("H_2O"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Sanitizer {
    options: CleanOptions,
}

impl Sanitizer {
    /// Creates a new Sanitizer with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a Sanitizer from existing options.
    pub fn with_options(options: CleanOptions) -> Self {
        Self { options }
    }

    /// Sets the output length cap.
    pub fn max_length(mut self, max_length: usize) -> Self {
        self.options.max_length = max_length;
        self
    }

    /// Sets the minimum word count.
    pub fn min_words(mut self, min_words: usize) -> Self {
        self.options.min_words = min_words;
        self
    }

    /// Sets the minimum trimmed length.
    pub fn min_chars(mut self, min_chars: usize) -> Self {
        self.options.min_chars = min_chars;
        self
    }

    /// Strips all non-ASCII characters after normalization.
    pub fn aggressive_unicode(mut self) -> Self {
        self.options.aggressive_unicode = true;
        self
    }

    /// Keeps Unicode math symbols.
    pub fn preserve_equations(mut self) -> Self {
        self.options.preserve_equations = true;
        self
    }

    /// Suppresses warning log lines.
    pub fn silent(mut self) -> Self {
        self.options.silent = true;
        self
    }

    /// Returns the configured options.
    pub fn options(&self) -> &CleanOptions {
        &self.options
    }

    /// Cleans text (see [`clean`]).
    pub fn clean(&self, text: &str) -> String {
        clean(text, &self.options)
    }

    /// Cleans text and reports the outcome.
    pub fn clean_with_report(&self, text: &str) -> CleanReport {
        clean_with_report(text, &self.options)
    }

    /// Cleans text, returning errors instead of falling back.
    pub fn try_clean(&self, text: &str) -> Result<String> {
        try_clean(text, &self.options)
    }

    /// Cleans many texts in parallel.
    pub fn clean_batch<S>(&self, texts: &[S]) -> Vec<String>
    where
        S: AsRef<str> + Sync,
    {
        clean_batch(texts, &self.options)
    }

    /// Traces each stage for one input.
    pub fn debug(&self, text: &str) -> DebugTrace {
        debug_steps_with(text, &self.options)
    }

    /// Cleans text and measures what was removed.
    pub fn analyze(&self, text: &str) -> ImpactReport {
        analyze_impact(text, &self.clean(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WIKIPEDIA: &str = concat!(
        "Navier–Stokes equations\n",
        "From Wikipedia, the free encyclopedia\n",
        "Jump to navigation Jump to search\n",
        "The Navier–Stokes equations are partial differential equations which describe the motion of viscous fluid substances.[13] They were named after Claude-Louis Navier and George Gabriel Stokes.[1][2]\n",
        "Main article: Fluid dynamics.\n",
        r"The momentum equation is {\displaystyle \rho \left({\frac {\partial \mathbf {u} }{\partial t}}+\mathbf {u} \cdot \nabla \mathbf {u} \right)=-\nabla p+\mu \nabla ^{2}\mathbf {u} } for an incompressible flow.",
        "\n",
        "The equations are central to computational fluid dynamics and are used to model weather, ocean currents and air flow around a wing.[13]\n",
    );

    const CHEMISTRY: &str = "Water (H₂O) is a polar molecule with a bent shape and a bond angle of about 104.5°. \
        One mole of water contains about 6.022 × 10²³ molecules and has a mass of 18 g. \
        Droplets smaller than 10 µm evaporate quickly, and the density of liquid water is close to 1 g/cm³ at 4°C.";

    const ALGORITHM: &str = "QuickSort Algorithm\n\n\
        QuickSort is a divide and conquer algorithm. Its average time complexity is O(n log n), while the worst case is quadratic.\n\n\
        ```python\ndef quicksort(arr):\n    return sorted(arr)\n```\n\n\
        Read more at https://example.com/quicksort or write to author@example.com for questions about the implementation.";

    const SYMBOLS_ONLY: &str = "[1][2]$$x$$\\begin{equation}E=mc^2\\end{equation}[3]";

    fn quiet() -> CleanOptions {
        CleanOptions::default().silent()
    }

    // ==================== Scenario Tests ====================

    #[test]
    fn test_wikipedia_latex_article() {
        let report = clean_with_report(WIKIPEDIA, &quiet());
        assert_eq!(report.outcome, Outcome::Accepted);

        let cleaned = &report.text;
        assert!(!cleaned.contains("\\displaystyle"));
        assert!(!cleaned.contains("[13]"));
        assert!(!cleaned.contains("Main article:"));
        assert!(!cleaned.contains("Wikipedia"));
        assert!(cleaned.contains("Navier"));
        assert!(cleaned.contains("computational fluid dynamics"));
        assert!(cleaned.contains("[equation]"));

        let impact = analyze_impact(WIKIPEDIA, cleaned);
        assert!(
            (20.0..=60.0).contains(&impact.removed.percentage),
            "removed {}%",
            impact.removed.percentage
        );
    }

    #[test]
    fn test_unicode_chemistry() {
        let report = clean_with_report(CHEMISTRY, &quiet());
        assert_eq!(report.outcome, Outcome::Accepted);

        let cleaned = &report.text;
        for symbol in ['₂', '²', '³', '×', 'µ', '°'] {
            assert!(!cleaned.contains(symbol), "{} survived", symbol);
        }
        assert!(cleaned.contains("H_2O"));
        assert!(cleaned.contains("10^23"));
        assert!(cleaned.contains("104.5 degrees"));
        assert!(cleaned.contains("10 um"));
    }

    #[test]
    fn test_code_urls_and_email() {
        let cleaned = clean(ALGORITHM, &quiet());
        assert!(cleaned.contains("[code block]"));
        assert!(!cleaned.contains("```"));
        assert!(!cleaned.contains("def quicksort"));
        assert!(!cleaned.contains("https://"));
        assert!(!cleaned.contains("@example.com"));
        assert!(cleaned.contains("time complexity"));
        assert!(cleaned.contains("QuickSort Algorithm"));
    }

    #[test]
    fn test_zero_width_characters() {
        let input = "Pho\u{200B}tosyn\u{200B}thesis con\u{200B}verts light en\u{200B}ergy into \
                     chem\u{200B}ical en\u{200B}ergy that plants store in glu\u{200B}cose molecules.";
        let cleaned = clean(input, &quiet());
        assert_eq!(
            cleaned,
            "Photosynthesis converts light energy into chemical energy that plants store in glucose molecules."
        );
        assert!(!cleaned.chars().any(stages::is_invisible));
    }

    #[test]
    fn test_symbol_only_input_falls_back() {
        let options = quiet();
        let report = clean_with_report(SYMBOLS_ONLY, &options);
        assert!(report.is_fallback());
        assert_eq!(
            report.outcome,
            Outcome::Fallback {
                reason: "validation failed".into()
            }
        );
        let validation = report.validation.unwrap();
        assert_eq!(validation.word_count, 0);
        assert_eq!(
            report.text,
            stages::whitespace_normalize(SYMBOLS_ONLY)
                .chars()
                .take(options.max_length)
                .collect::<String>()
        );
    }

    // ==================== Property Checks ====================

    #[test]
    fn test_idempotent_on_accepted_output() {
        let options = quiet();
        for input in [WIKIPEDIA, CHEMISTRY, ALGORITHM] {
            let once = clean(input, &options);
            let twice = clean(&once, &options);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_ascii_operators_survive_second_pass() {
        let options = quiet();
        let input = "The lemma states that a ≤ b → c holds for every ordered field we consider here.";
        let once = clean(input, &options);
        assert_eq!(
            once,
            "The lemma states that a <= b -> c holds for every ordered field we consider here."
        );
        assert_eq!(clean(&once, &options), once);
    }

    #[test]
    fn test_plus_minus_survives_second_pass() {
        let options = quiet();
        let input = "The measured output was 5 ± 0.2 volts across the resistor during every trial.";
        let once = clean(input, &options);
        assert_eq!(
            once,
            "The measured output was 5 +/- 0.2 volts across the resistor during every trial."
        );
        assert_eq!(clean(&once, &options), once);
    }

    #[test]
    fn test_length_cap() {
        let options = quiet().with_max_length(100);
        for input in [WIKIPEDIA, CHEMISTRY, ALGORITHM, SYMBOLS_ONLY] {
            assert!(clean(input, &options).chars().count() <= 100);
        }
    }

    #[test]
    fn test_symbol_soup_does_not_panic() {
        let cleaned = clean("∑∫√∞≈≠ {{{ \\\\ $$ }}} <<>> &#;", &quiet());
        assert!(!cleaned.contains('\u{0}'));
    }

    #[test]
    fn test_empty_input() {
        let report = clean_with_report("", &quiet());
        assert!(report.is_fallback());
        assert_eq!(report.text, "");
    }

    // ==================== Options ====================

    #[test]
    fn test_aggressive_unicode() {
        let options = quiet().aggressive_unicode();
        let cleaned = clean(WIKIPEDIA, &options);
        assert!(cleaned.is_ascii());
        assert!(cleaned.contains("Navier-Stokes equations"));
        assert!(!cleaned.contains("NavierStokes"));
    }

    #[test]
    fn test_aggressive_unicode_keeps_words_apart() {
        let options = quiet().aggressive_unicode();
        let input = "The Navier–Stokes equations don’t have a general closed-form solution, \
                     so engineers solve them numerically on a mesh.";
        let cleaned = clean(input, &options);
        assert_eq!(
            cleaned,
            "The Navier-Stokes equations don't have a general closed-form solution, \
             so engineers solve them numerically on a mesh."
        );
    }

    #[test]
    fn test_preserve_equations_skips_unicode_math() {
        let options = quiet().preserve_equations();
        let cleaned = clean(CHEMISTRY, &options);
        assert!(cleaned.contains("H₂O"));
        assert!(cleaned.contains("10²³"));
    }

    #[test]
    fn test_invalid_options_fall_back() {
        let mut options = quiet();
        options.thresholds.max_brace_passes = 0;
        let report = clean_with_report(CHEMISTRY, &options);
        assert!(report.is_fallback());
        assert!(report.validation.is_none());
        assert!(matches!(
            try_clean(CHEMISTRY, &options),
            Err(Error::InvalidOptions(_))
        ));
    }

    #[test]
    fn test_try_clean() {
        assert!(try_clean(CHEMISTRY, &quiet()).is_ok());
        assert!(matches!(
            try_clean(SYMBOLS_ONLY, &quiet()),
            Err(Error::ValidationFailed { word_count: 0, .. })
        ));
    }

    #[test]
    fn test_clean_batch_preserves_order() {
        let inputs = vec![CHEMISTRY.to_string(), ALGORITHM.to_string(), String::new()];
        let results = clean_batch(&inputs, &quiet());
        assert_eq!(results.len(), 3);
        assert_eq!(results[0], clean(CHEMISTRY, &quiet()));
        assert_eq!(results[1], clean(ALGORITHM, &quiet()));
        assert_eq!(results[2], "");
    }

    #[test]
    fn test_sanitizer_builder() {
        let sanitizer = Sanitizer::new().max_length(300).min_words(5).silent();
        assert_eq!(sanitizer.options().max_length, 300);
        assert_eq!(sanitizer.options().min_words, 5);

        let cleaned = sanitizer.clean(CHEMISTRY);
        assert!(cleaned.chars().count() <= 300);
        assert_eq!(sanitizer.debug(CHEMISTRY).final_text(), cleaned);

        let impact = sanitizer.analyze(CHEMISTRY);
        assert_eq!(impact.cleaned.length, cleaned.chars().count());
    }

    #[test]
    fn test_report_serializes_outcome() {
        let report = clean_with_report(SYMBOLS_ONLY, &quiet());
        let json = serde_json::to_string(&report.outcome).unwrap();
        assert_eq!(json, r#"{"status":"fallback","reason":"validation failed"}"#);
    }
}
