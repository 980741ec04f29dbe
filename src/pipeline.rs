//! Ordered stage list and the compositor that runs it.
//!
//! Stages are pure `&str -> String` transforms. Later stages assume the earlier
//! ones already ran, so [`Stage::ALL`] is the only valid order.

use crate::error::{Error, Result};
use crate::options::CleanOptions;
use crate::stages;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

/// One transformation of the sanitizer pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    /// Zero-width, bidi-control and private-use code points.
    Invisible,
    /// C0/C1 control characters other than newline and tab.
    ControlChars,
    /// HTML tags and entities.
    Html,
    /// URLs and email addresses.
    Urls,
    /// Fenced, inline and indented code.
    Code,
    /// Table separators and cell delimiters.
    Tables,
    /// Encyclopedia boilerplate and citation markers.
    Citations,
    /// `$...$`, `$$...$$`, `\(...\)` and `\[...\]`.
    MathDelimiters,
    /// LaTeX commands, environments and noise lines.
    Latex,
    /// Mathematical alphanumerics, scripts, Greek letters and operators.
    UnicodeMath,
    /// Plain-looking formula fragments.
    Equations,
    /// Emoji and pictographs.
    Emoji,
    /// Everything outside ASCII (only with `aggressive_unicode`).
    AsciiOnly,
    /// Whitespace normalization and line de-duplication.
    Compose,
    /// Sentence-aware length cap.
    Truncate,
}

impl Stage {
    /// Every stage in pipeline order.
    pub const ALL: [Stage; 15] = [
        Stage::Invisible,
        Stage::ControlChars,
        Stage::Html,
        Stage::Urls,
        Stage::Code,
        Stage::Tables,
        Stage::Citations,
        Stage::MathDelimiters,
        Stage::Latex,
        Stage::UnicodeMath,
        Stage::Equations,
        Stage::Emoji,
        Stage::AsciiOnly,
        Stage::Compose,
        Stage::Truncate,
    ];

    /// Stable kebab-case name used in logs and debug traces.
    pub fn name(self) -> &'static str {
        match self {
            Stage::Invisible => "invisible",
            Stage::ControlChars => "control-chars",
            Stage::Html => "html",
            Stage::Urls => "urls",
            Stage::Code => "code",
            Stage::Tables => "tables",
            Stage::Citations => "citations",
            Stage::MathDelimiters => "math-delimiters",
            Stage::Latex => "latex",
            Stage::UnicodeMath => "unicode-math",
            Stage::Equations => "equations",
            Stage::Emoji => "emoji",
            Stage::AsciiOnly => "ascii-only",
            Stage::Compose => "compose",
            Stage::Truncate => "truncate",
        }
    }

    /// Whether the stage runs under the given options.
    pub fn is_enabled(self, options: &CleanOptions) -> bool {
        match self {
            Stage::UnicodeMath => !options.preserve_equations,
            Stage::AsciiOnly => options.aggressive_unicode,
            _ => true,
        }
    }

    /// Applies this stage alone.
    pub fn apply(self, input: &str, options: &CleanOptions) -> String {
        match self {
            Stage::Invisible => stages::strip_invisible(input),
            Stage::ControlChars => stages::strip_control(input),
            Stage::Html => stages::strip_html(input),
            Stage::Urls => stages::strip_urls(input),
            Stage::Code => stages::strip_code(input),
            Stage::Tables => stages::strip_tables(input),
            Stage::Citations => stages::strip_citations(input),
            Stage::MathDelimiters => stages::strip_math_delimiters(input),
            Stage::Latex => stages::clean_latex(input, &options.thresholds),
            Stage::UnicodeMath => stages::normalize_unicode_math(input),
            Stage::Equations => stages::clean_equations(input, &options.thresholds),
            Stage::Emoji => stages::strip_emoji(input),
            Stage::AsciiOnly => stages::ascii_only(input),
            Stage::Compose => stages::compose(input),
            Stage::Truncate => stages::truncate(input, options.max_length),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Runs every enabled stage in order, reporting each intermediate state.
///
/// A panicking stage is caught here and surfaces as [`Error::StagePanicked`].
pub fn run_stages<F>(text: &str, options: &CleanOptions, mut observe: F) -> Result<String>
where
    F: FnMut(Stage, &str),
{
    let mut current = text.to_string();

    for stage in Stage::ALL {
        if !stage.is_enabled(options) {
            continue;
        }

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| stage.apply(&current, options)));
        current = outcome.map_err(|payload| Error::StagePanicked {
            stage,
            message: panic_message(payload.as_ref()),
        })?;

        log::debug!("{}: {} chars", stage, current.chars().count());
        observe(stage, &current);
    }

    Ok(current)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
