//! Property-based tests for the cleaning pipeline
//!
//! Tests invariants:
//! - Output never exceeds max_length characters
//! - No control characters other than newline survive
//! - No zero-width or other invisible characters survive
//! - No tag-shaped `<...>` text survives
//! - Accepted output is a fixed point of cleaning, math included

use proptest::prelude::*;
use regex::Regex;

use promptsafe::stages::is_invisible;
use promptsafe::{clean, clean_with_report, CleanOptions};

// ============================================================================
// Strategies for generating test inputs
// ============================================================================

/// Generate fragments of the noise seen in scraped documents
fn arb_fragment() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z]{2,12}",
        "[a-zA-Z ,.]{1,60}",
        Just("<p>".to_string()),
        Just("</div>".to_string()),
        Just("<".to_string()),
        Just(">".to_string()),
        Just("&lt;b&gt;".to_string()),
        Just("&lt;".to_string()),
        Just("&gt;".to_string()),
        Just("&#8203;".to_string()),
        Just("&amp;".to_string()),
        Just("$x^2$".to_string()),
        Just("$$\\int_0^1 f(x)\\,dx$$".to_string()),
        Just("\\frac{a}{b}".to_string()),
        Just("{\\displaystyle E=mc^{2}}".to_string()),
        Just("\\alpha".to_string()),
        Just("y = a b c d".to_string()),
        Just("x₂ + y² → z".to_string()),
        Just("∑∫∂∇≤≥≠".to_string()),
        Just("𝑥𝑦𝑧".to_string()),
        Just("[12]".to_string()),
        Just("https://example.com/page".to_string()),
        Just("| a | b |".to_string()),
        Just("```rust\nfn main() {}\n```".to_string()),
        Just("`code`".to_string()),
        Just("\u{200B}".to_string()),
        Just("\u{FEFF}".to_string()),
        Just("\u{202E}".to_string()),
        Just("\u{E000}".to_string()),
        Just("\u{0000}".to_string()),
        Just("\u{0007}".to_string()),
        Just("\u{009B}".to_string()),
        Just("\r\n".to_string()),
        Just("\t".to_string()),
        Just("\n".to_string()),
        Just("😀".to_string()),
        Just("🇺🇸".to_string()),
        Just("…".to_string()),
    ]
}

/// Generate documents stitched together from noise fragments
fn arb_noisy_text() -> impl Strategy<Value = String> {
    proptest::collection::vec(arb_fragment(), 0..40).prop_map(|parts| parts.join(" "))
}

/// Generate arbitrary Unicode text, newlines included
fn arb_any_text() -> impl Strategy<Value = String> {
    "(?s).{0,300}"
}

fn arb_input() -> impl Strategy<Value = String> {
    prop_oneof![arb_noisy_text(), arb_any_text()]
}

fn arb_prose_word() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("river"),
        Just("carbon"),
        Just("energy"),
        Just("cells"),
        Just("gradually"),
        Just("measured"),
        Just("across"),
        Just("several"),
        Just("seasons"),
        Just("northern"),
        Just("forests"),
        Just("absorb"),
        Just("sunlight"),
    ]
}

/// Generate plain prose that no stage should rewrite
fn arb_prose() -> impl Strategy<Value = String> {
    let sentence = proptest::collection::vec(arb_prose_word(), 4..12)
        .prop_map(|words| words.join(" ") + ".");
    proptest::collection::vec(sentence, 1..8).prop_map(|sentences| sentences.join("\n"))
}

/// Generate Unicode math tokens that normalize to ASCII operators or words
fn arb_math_token() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("≤"),
        Just("≥"),
        Just("≠"),
        Just("≈"),
        Just("→"),
        Just("←"),
        Just("↔"),
        Just("±"),
        Just("∞"),
        Just("√2"),
        Just("°"),
        Just("H₂O"),
        Just("10⁻³"),
        Just("α"),
        Just("λ"),
    ]
}

/// Generate prose with math tokens between the words
fn arb_math_prose() -> impl Strategy<Value = String> {
    let sentence = (
        proptest::collection::vec(arb_prose_word(), 4..10),
        proptest::collection::vec(arb_math_token(), 0..4),
    )
        .prop_map(|(words, tokens)| {
            let mut parts = Vec::new();
            for (i, word) in words.iter().enumerate() {
                parts.push(*word);
                if i + 1 < words.len() {
                    if let Some(token) = tokens.get(i) {
                        parts.push(*token);
                    }
                }
            }
            parts.join(" ") + "."
        });
    proptest::collection::vec(sentence, 1..6).prop_map(|sentences| sentences.join("\n"))
}

fn options(max_length: usize) -> CleanOptions {
    CleanOptions::default()
        .with_max_length(max_length)
        .with_min_words(3)
        .with_min_chars(10)
        .silent()
}

fn tag_shape() -> Regex {
    Regex::new(r"<[A-Za-z/!?][^>]*>").unwrap()
}

// ============================================================================
// Output invariants
// ============================================================================

proptest! {
    /// Property: output length never exceeds max_length
    #[test]
    fn prop_length_capped(text in arb_input(), max_length in 1usize..400) {
        let cleaned = clean(&text, &options(max_length));
        prop_assert!(
            cleaned.chars().count() <= max_length,
            "{} chars for max_length {}",
            cleaned.chars().count(),
            max_length
        );
    }

    /// Property: only newline survives among control characters
    #[test]
    fn prop_no_control_chars(text in arb_input()) {
        let cleaned = clean(&text, &options(5000));
        prop_assert!(
            cleaned.chars().all(|c| c == '\n' || !c.is_control()),
            "control character in {:?}",
            cleaned
        );
        prop_assert!(!cleaned.contains('\r'));
    }

    /// Property: invisible characters are always removed
    #[test]
    fn prop_no_invisible_chars(text in arb_input()) {
        let cleaned = clean(&text, &options(5000));
        prop_assert!(
            !cleaned.chars().any(is_invisible),
            "invisible character in {:?}",
            cleaned
        );
    }

    /// Property: nothing shaped like an HTML tag survives
    #[test]
    fn prop_no_tag_shapes(text in arb_input()) {
        let cleaned = clean(&text, &options(5000));
        prop_assert!(!tag_shape().is_match(&cleaned), "tag in {:?}", cleaned);
    }

    /// Property: the same holds when the fallback path is forced
    #[test]
    fn prop_fallback_is_safe(text in arb_input(), max_length in 1usize..400) {
        let strict = CleanOptions::default()
            .with_max_length(max_length)
            .with_min_words(10_000)
            .silent();
        let report = clean_with_report(&text, &strict);
        prop_assert!(report.is_fallback());
        prop_assert!(report.text.chars().count() <= max_length);
        prop_assert!(report.text.chars().all(|c| c == '\n' || !c.is_control()));
        prop_assert!(!report.text.chars().any(is_invisible));
        prop_assert!(!tag_shape().is_match(&report.text));
    }

    /// Property: accepted prose comes back unchanged on a second pass
    #[test]
    fn prop_accepted_prose_is_fixed_point(text in arb_prose()) {
        let options = options(5000);
        let report = clean_with_report(&text, &options);
        if !report.is_fallback() {
            prop_assert_eq!(clean(&report.text, &options), report.text);
        }
    }

    /// Property: ASCII operators produced from Unicode math survive a second pass
    #[test]
    fn prop_accepted_math_prose_is_fixed_point(text in arb_math_prose()) {
        let options = options(5000);
        let report = clean_with_report(&text, &options);
        if !report.is_fallback() {
            prop_assert!(report.text.is_ascii());
            prop_assert_eq!(clean(&report.text, &options), report.text);
        }
    }
}
