//! Stage 7: encyclopedia boilerplate and citation markers.

use regex::Regex;
use std::sync::LazyLock;

// Page chrome copied along with article text
static RE_BOILERPLATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)Jump to (?:navigation|search|content)|From Wikipedia, the free encyclopedia",
    )
    .unwrap()
});

static RE_EDITORIAL_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\[(?:edit|citation needed|clarification needed|when\?|who\?)\]").unwrap()
});

// [12], [1,2,3], [4-6], [note 3], [a]
static RE_CITATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\d+(?:\s*[,\u{2013}-]\s*\d+)*\]|\[(?:note|nb) ?\d+\]|\[[a-z]\]").unwrap()
});

// Reference backlinks: "^ Smith, J. (2001)..."
static RE_BACKLINK_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*\^.*$").unwrap());

// "Main article: X." / "See also: Y" up to the next sentence boundary
static RE_CROSS_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)\b(?:Main articles?|See also|Further information):[^.\n]*(?:\.|$)").unwrap()
});

/// Stage 7: Remove encyclopedia navigation text, editorial markers, numeric
/// citations, reference backlinks and cross-reference fragments.
pub fn strip_citations(input: &str) -> String {
    let result = RE_BOILERPLATE.replace_all(input, " ");
    let result = RE_EDITORIAL_MARKER.replace_all(&result, "");
    let result = RE_CITATION.replace_all(&result, "");
    let result = RE_BACKLINK_LINE.replace_all(&result, "");
    RE_CROSS_REFERENCE.replace_all(&result, " ").into_owned()
}
