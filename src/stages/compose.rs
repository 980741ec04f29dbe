//! Final compose and length cap (stages 13 and 14).

use super::{contains_tag_like, strip_tag_like};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

/// Marker appended when text is cut mid-sentence.
pub const ELLIPSIS: &str = "...";

static RE_SPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]+").unwrap());

static RE_LINE_EDGE_SPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" ?\n ?").unwrap());

static RE_BLANK_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// No-break, typographic and ideographic spaces
fn is_unicode_space(c: char) -> bool {
    matches!(
        c,
        '\u{00A0}' | '\u{1680}' | '\u{2000}'..='\u{200A}' | '\u{202F}' | '\u{205F}' | '\u{3000}'
    )
}

/// Normalize whitespace: NFC, Unicode spaces to ASCII, runs of spaces/tabs to
/// one space, no spaces around a newline, at most one blank line in a row,
/// trimmed ends.
pub fn whitespace_normalize(input: &str) -> String {
    let text: String = input
        .nfc()
        .map(|c| if is_unicode_space(c) { ' ' } else { c })
        .collect();

    let text = RE_SPACE_RUN.replace_all(&text, " ");
    let text = RE_LINE_EDGE_SPACE.replace_all(&text, "\n");
    let text = RE_BLANK_RUN.replace_all(&text, "\n\n");
    text.trim().to_string()
}

/// Trim every line, drop repeated lines (case-insensitive) and keep at most one
/// blank line between paragraphs.
pub fn dedup_lines(input: &str) -> String {
    let mut seen = HashSet::new();
    let mut lines: Vec<&str> = Vec::new();
    let mut blank_pending = false;

    for line in input.split('\n') {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            blank_pending = !lines.is_empty();
            continue;
        }
        if !seen.insert(trimmed.to_lowercase()) {
            continue;
        }
        if blank_pending {
            lines.push("");
            blank_pending = false;
        }
        lines.push(trimmed);
    }

    lines.join("\n")
}

/// Stage 13: Final whitespace normalization and line dedup.
///
/// Tag-shaped text is blanked out again here. Earlier stages can turn a stray
/// `<` into the start of one (`<b → c` becomes `<b -> c`), and dropping a
/// duplicate line can join `<a` with a later `>`.
pub fn compose(input: &str) -> String {
    let mut text = dedup_lines(&whitespace_normalize(input));
    while contains_tag_like(&text) {
        text = dedup_lines(&whitespace_normalize(&strip_tag_like(&text)));
    }
    text
}

/// Stage 14: Cap `input` at `max_length` characters.
///
/// Prefers to cut at the last `.` (kept) or newline (dropped) when it falls in
/// the final 20% of the window. Otherwise the text is hard-cut and ends with
/// [`ELLIPSIS`], which counts toward the cap.
pub fn truncate(input: &str, max_length: usize) -> String {
    if input.chars().count() <= max_length {
        return input.to_string();
    }

    let head: Vec<char> = input.chars().take(max_length).collect();
    if max_length <= ELLIPSIS.len() {
        return head.into_iter().collect();
    }

    if let Some(pos) = head.iter().rposition(|&c| c == '.' || c == '\n') {
        if pos * 5 > max_length * 4 {
            let keep = if head[pos] == '.' { pos + 1 } else { pos };
            let cut: String = head[..keep].iter().collect();
            return cut.trim_end().to_string();
        }
    }

    let cut: String = head[..max_length - ELLIPSIS.len()].iter().collect();
    let mut cut = cut.trim_end().to_string();
    cut.push_str(ELLIPSIS);
    cut
}
