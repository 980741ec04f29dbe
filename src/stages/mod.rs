//! Individual sanitizer stages.
//!
//! Each function is a pure string transform. They are public so callers and
//! tests can run a single stage in isolation; [`crate::pipeline`] composes them.

mod characters;
mod citations;
mod compose;
mod equation;
mod latex;
mod markup;
mod tables;
mod unicode_math;

pub use characters::{ascii_only, is_emoji, is_invisible, strip_control, strip_emoji, strip_invisible};
pub use citations::strip_citations;
pub use compose::{compose, dedup_lines, truncate, whitespace_normalize, ELLIPSIS};
pub use equation::clean_equations;
pub use latex::{clean_latex, filter_noise_lines, strip_math_delimiters};
pub use markup::{
    contains_tag_like, decode_entities, strip_code, strip_html, strip_tag_like, strip_urls,
};
pub use tables::strip_tables;
pub use unicode_math::normalize_unicode_math;

/// Placeholder for removed formulas.
pub const EQUATION: &str = "[equation]";
/// Placeholder for removed brace groups that still held LaTeX.
pub const MATH: &str = "[math]";
/// Placeholder for removed fenced code.
pub const CODE_BLOCK: &str = "[code block]";

/// Every placeholder the pipeline may insert.
pub const PLACEHOLDERS: [&str; 3] = [EQUATION, MATH, CODE_BLOCK];

/// Removes every placeholder token, leaving a space in its place.
pub(crate) fn without_placeholders(text: &str) -> String {
    let mut out = text.to_string();
    for token in PLACEHOLDERS {
        if out.contains(token) {
            out = out.replace(token, " ");
        }
    }
    out
}
