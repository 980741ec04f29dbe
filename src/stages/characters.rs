//! Character-class stages: invisible marks, control bytes, emoji, non-ASCII.
//!
//! All of these iterate Unicode scalar values, so supplementary-plane
//! characters are never split.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

// ============================================================================
// Stage 1: Invisible characters
// ============================================================================

/// Check if character is invisible formatting that should be removed
pub fn is_invisible(c: char) -> bool {
    matches!(
        c,
        '\u{200B}'..='\u{200D}'   // Zero-width space, non-joiner, joiner
        | '\u{200E}' | '\u{200F}' // LRM, RLM
        | '\u{202A}'..='\u{202E}' // Bidi embeddings and overrides
        | '\u{2060}'..='\u{2064}' // Word joiner, invisible operators
        | '\u{2066}'..='\u{2069}' // Bidi isolates
        | '\u{FEFF}'              // BOM
        | '\u{00AD}'              // Soft hyphen
    ) || is_pua_char(c)
}

/// Check if character is in Private Use Area
fn is_pua_char(c: char) -> bool {
    let code = c as u32;
    // Basic PUA: U+E000 to U+F8FF
    // Supplementary PUA-A: U+F0000 to U+FFFFD
    // Supplementary PUA-B: U+100000 to U+10FFFD
    (0xE000..=0xF8FF).contains(&code)
        || (0xF0000..=0xFFFFD).contains(&code)
        || (0x100000..=0x10FFFD).contains(&code)
}

/// Stage 1: Remove zero-width, bidi-control, soft-hyphen and PUA code points.
pub fn strip_invisible(input: &str) -> String {
    input.chars().filter(|&c| !is_invisible(c)).collect()
}

// ============================================================================
// Stage 2: Control characters
// ============================================================================

/// Stage 2: Remove control characters so the text embeds safely in JSON.
///
/// Newlines survive; `\r\n` and lone `\r` become `\n`. Tabs survive until
/// whitespace composition folds them into spaces.
pub fn strip_control(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\n' | '\t' => result.push(c),
            '\r' => {
                if chars.peek() != Some(&'\n') {
                    result.push('\n');
                }
            }
            c if c.is_control() => {}
            c => result.push(c),
        }
    }

    result
}

// ============================================================================
// Stage 12: Emoji
// ============================================================================

/// Check if character belongs to an emoji or pictograph block
pub fn is_emoji(c: char) -> bool {
    let code = c as u32;
    (0x1F300..=0x1FAFF).contains(&code) // Pictographs, emoticons, transport, supplemental
        || (0x1F000..=0x1F2FF).contains(&code) // Mahjong, cards, enclosed alphanumerics, flags
        || (0x2600..=0x27BF).contains(&code) // Miscellaneous symbols, dingbats
        || matches!(c, '\u{FE0E}' | '\u{FE0F}' | '\u{20E3}') // Variation selectors, keycap
}

/// Stage 12: Remove emoji.
pub fn strip_emoji(input: &str) -> String {
    input.chars().filter(|&c| !is_emoji(c)).collect()
}

// ============================================================================
// Aggressive mode
// ============================================================================

/// Typographic punctuation folded to ASCII before the filter
const PUNCTUATION_MAPPINGS: &[(char, &str)] = &[
    // Dashes and hyphens
    ('\u{2010}', "-"),
    ('\u{2011}', "-"),
    ('\u{2012}', "-"),
    ('\u{2013}', "-"),
    ('\u{2014}', "-"),
    ('\u{2015}', "-"),
    ('\u{2212}', "-"),
    // Quotes
    ('\u{2018}', "'"),
    ('\u{2019}', "'"),
    ('\u{201A}', "'"),
    ('\u{201B}', "'"),
    ('\u{2039}', "'"),
    ('\u{203A}', "'"),
    ('\u{201C}', "\""),
    ('\u{201D}', "\""),
    ('\u{201E}', "\""),
    ('\u{201F}', "\""),
    ('\u{00AB}', "\""),
    ('\u{00BB}', "\""),
    // Ellipsis and list markers
    ('\u{2026}', "..."),
    ('\u{2022}', "-"),
    ('\u{00B7}', " "),
];

/// Get the ASCII replacement for typographic punctuation
fn get_punctuation_replacement(c: char) -> Option<&'static str> {
    PUNCTUATION_MAPPINGS
        .iter()
        .find(|(mark, _)| *mark == c)
        .map(|(_, replacement)| *replacement)
}

/// Normalize fullwidth characters to ASCII equivalents
fn normalize_fullwidth(c: char) -> Option<char> {
    match c {
        '\u{3000}' => Some(' '), // Ideographic space -> regular space
        '\u{FF01}'..='\u{FF5E}' => {
            // Fullwidth ASCII variants (！to ～)
            let offset = c as u32 - 0xFF01;
            char::from_u32(0x21 + offset)
        }
        _ => None,
    }
}

/// Fold text to ASCII.
///
/// Typographic punctuation and fullwidth forms map to their ASCII
/// counterparts, accented letters lose their marks (`é` -> `e`) and combining
/// marks are dropped. Anything left without an ASCII form becomes a space so
/// neighbouring words stay apart.
pub fn ascii_only(input: &str) -> String {
    let mut result = String::with_capacity(input.len());

    for c in input.chars() {
        if c.is_ascii() {
            result.push(c);
        } else if let Some(replacement) = get_punctuation_replacement(c) {
            result.push_str(replacement);
        } else if let Some(normalized) = normalize_fullwidth(c) {
            result.push(normalized);
        } else if is_combining_mark(c) {
            continue;
        } else {
            let base: String = std::iter::once(c).nfkd().filter(char::is_ascii).collect();
            if base.is_empty() {
                result.push(' ');
            } else {
                result.push_str(&base);
            }
        }
    }

    result
}
