//! Markup stages: HTML, URLs and code.

use super::CODE_BLOCK;
use regex::{Captures, Regex};
use std::sync::LazyLock;

// ============================================================================
// Stage 3: HTML tags and entities
// ============================================================================

static RE_HTML_COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());

static RE_SCRIPT_STYLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b.*?</script\s*>|<style\b.*?</style\s*>").unwrap()
});

// A tag opens with a letter, `/`, `!` or `?` so `a <= b -> c` is never one.
// The same shape is used for markup and for tags that only appear once
// entities are decoded (`&lt;b&gt;`).
static RE_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[A-Za-z/!?][^>]*>").unwrap());

static RE_ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|[a-zA-Z]+);").unwrap());

/// Named entity table (entity name -> plain replacement)
const NAMED_ENTITIES: &[(&str, &str)] = &[
    ("lt", "<"),
    ("gt", ">"),
    ("amp", "&"),
    ("quot", "\""),
    ("apos", "'"),
    ("nbsp", " "),
    ("mdash", "-"),
    ("ndash", "-"),
    ("hellip", "..."),
    ("rsquo", "'"),
    ("lsquo", "'"),
    ("rdquo", "\""),
    ("ldquo", "\""),
    ("middot", " "),
    ("bull", "-"),
    ("deg", " degrees"),
];

/// Stage 3: Strip HTML tags and decode entities.
///
/// Numeric entities decode only to printable ASCII; anything else becomes a
/// space so no new Unicode enters the pipeline here.
pub fn strip_html(input: &str) -> String {
    if !input.contains('<') && !input.contains('&') {
        return input.to_string();
    }

    let result = RE_HTML_COMMENT.replace_all(input, " ");
    let result = RE_SCRIPT_STYLE.replace_all(&result, " ");
    let result = RE_TAG.replace_all(&result, " ");
    let result = decode_entities(&result);
    strip_tag_like(&result)
}

/// Blank out anything shaped like `<tag ...>`, `</tag>` or `<!...>`.
///
/// Later stages can pull a stray `<` and a new `>` together (`<b → c` becomes
/// `<b -> c`), so the compose stage runs this again as a guard.
pub fn strip_tag_like(input: &str) -> String {
    let mut text = input.to_string();
    // Every pass drops at least one `<`
    while contains_tag_like(&text) {
        text = RE_TAG.replace_all(&text, " ").into_owned();
    }
    text
}

/// Check if text contains anything shaped like an HTML tag
pub fn contains_tag_like(input: &str) -> bool {
    input.contains('<') && RE_TAG.is_match(input)
}

/// Decode the fixed named-entity table plus `&#NNN;` / `&#xHHH;` in one pass.
///
/// Unknown named entities are left as they are. Decoding is single-pass, so
/// `&amp;lt;` yields `&lt;` rather than `<`.
pub fn decode_entities(input: &str) -> String {
    if !input.contains('&') {
        return input.to_string();
    }

    RE_ENTITY
        .replace_all(input, |caps: &Captures| {
            let body = &caps[1];
            match decode_entity(body) {
                Some(decoded) => decoded,
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

fn decode_entity(body: &str) -> Option<String> {
    if let Some(numeric) = body.strip_prefix('#') {
        let code = match numeric.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => numeric.parse::<u32>().ok(),
        };
        let decoded = match code {
            Some(code @ 32..=126) => char::from_u32(code).map(String::from),
            _ => None,
        };
        return Some(decoded.unwrap_or_else(|| " ".to_string()));
    }

    NAMED_ENTITIES
        .iter()
        .find(|(name, _)| *name == body)
        .map(|(_, replacement)| replacement.to_string())
}

// ============================================================================
// Stage 4: URLs and email addresses
// ============================================================================

static RE_URL_OR_EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)https?://\S+|\bwww\.\S+|\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b",
    )
    .unwrap()
});

/// Stage 4: Replace URLs and email addresses with a space.
pub fn strip_urls(input: &str) -> String {
    RE_URL_OR_EMAIL.replace_all(input, " ").into_owned()
}

// ============================================================================
// Stage 5: Code
// ============================================================================

static RE_FENCED_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```[\w+.#-]*.*?```").unwrap());

static RE_INLINE_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`[^`\n]+`").unwrap());

/// Stage 5: Replace fenced blocks with `[code block]`, drop inline code and
/// lines indented by four or more spaces.
pub fn strip_code(input: &str) -> String {
    let fenced = RE_FENCED_CODE.replace_all(input, format!(" {} ", CODE_BLOCK).as_str());
    // An unterminated fence has nothing left to pair with
    let fenced = fenced.replace("```", " ");
    let inline = RE_INLINE_CODE.replace_all(&fenced, " ");

    inline
        .split('\n')
        .filter(|line| !is_indented_code(line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Check if line looks like indented code (4+ leading spaces, non-blank)
fn is_indented_code(line: &str) -> bool {
    let rest = line.trim_start_matches(' ');
    line.len() - rest.len() >= 4 && !rest.trim().is_empty()
}
