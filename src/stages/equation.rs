//! Stage 11: equation-fragment heuristics.
//!
//! Catches formula remnants that survived the delimiter and LaTeX stages as
//! plain-looking text: runs of bare variables, `lhs = rhs` fragments, defining
//! clauses. Every cut-off is an [`EquationThresholds`] field.

use super::{CODE_BLOCK, EQUATION, MATH};
use crate::options::EquationThresholds;
use regex::{Captures, Regex};
use std::sync::LazyLock;

// Placeholders are swapped for private-use sentinels while the heuristics run
// so no rule can match inside them. Stage 1 strips private-use code points, so
// the input cannot already contain these.
const EQ_MARK: char = '\u{E000}';
const MATH_MARK: char = '\u{E001}';
const CODE_MARK: char = '\u{E002}';

const EQ_SLOT: &str = " \u{E000} ";

const GREEK: &str = "alpha|beta|gamma|delta|epsilon|zeta|eta|theta|iota|kappa|lambda|mu|nu|xi|omicron|pi|rho|sigma|tau|upsilon|phi|chi|psi|omega";

static RE_GREEK_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"(?i)\b(?:{})\b", GREEK)).unwrap());

static RE_SINGLE_LETTER_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Za-z]\b(?:[ \t]+[A-Za-z]\b)+").unwrap());

static RE_SINGLE_LETTER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b[A-Za-z]\b").unwrap());

static RE_THREE_SPACED_VARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Za-z]\b[ \t]+[A-Za-z]\b[ \t]+[A-Za-z]\b").unwrap()
});

// v = ... alpha ...
static RE_GREEK_ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\b[A-Za-z]\w*[ \t]*=[^\n=]{{0,80}}?(?i:\b(?:{})\b)[^\n.;]*",
        GREEK
    ))
    .unwrap()
});

// y = a b c d
static RE_BARE_VARIABLES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Za-z]\w?[ \t]*=[ \t]*-?[ \t]*[A-Za-z]\w?\b(?:[ \t]+[A-Za-z]\w?\b){3,}")
        .unwrap()
});

// w_ij = f(... long argument ...)
static RE_SUBSCRIPT_ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Za-z]+_[A-Za-z0-9]+[ \t]*=[ \t]*[A-Za-z]+[ \t]*\([^)\n]{20,}\)").unwrap()
});

static RE_PARENTHETICAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\([^()\n]*\)").unwrap());

// ", where v is the velocity of the particle."
static RE_WHERE_CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r",?[ \t]*\bwhere[ \t]+[A-Za-z]\w{0,2}[ \t]+is[ \t]+the[ \t]+[^.\n]*\.").unwrap()
});

static RE_GENERIC_ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z][A-Za-z0-9_/ \t()\[\]]{0,60}=\S[^\n.;]{0,150}").unwrap()
});

static RE_DUPLICATE_EQUATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[equation\](?:[ \t]*\.?[ \t]*\[equation\])+").unwrap()
});

static RE_DUPLICATE_MATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[math\](?:[ \t]*\.?[ \t]*\[math\])+").unwrap());

/// Stage 11: Collapse formula-shaped fragments into `[equation]`.
///
/// Rules run in this order:
/// 1. runs of `letter_run`+ single letters become `[equation]`
/// 2. `lhs = rhs` naming a Greek letter within 80 chars becomes `[equation]`
/// 3. `var = var var var var` becomes `[equation]`
/// 4. `name_ij = f(...)` with a long argument becomes `[equation]`
/// 5. parentheticals holding 6+ single letters are removed
/// 6. remaining runs of 5 single letters or more are removed
/// 7. `where <var> is the <description>.` clauses are removed
/// 8. other `lhs=rhs` fragments are kept only when short and plain
/// 9. leftover operator glyphs are mopped up and adjacent placeholders merged
pub fn clean_equations(input: &str, thresholds: &EquationThresholds) -> String {
    let mut result = protect_placeholders(input);

    let letter_run = thresholds.letter_run;
    result = collapse_letter_runs(&result, |count| {
        (count >= letter_run).then(|| EQ_SLOT.to_string())
    });
    result = RE_GREEK_ASSIGNMENT.replace_all(&result, EQ_SLOT).into_owned();
    result = RE_BARE_VARIABLES.replace_all(&result, EQ_SLOT).into_owned();
    result = RE_SUBSCRIPT_ASSIGNMENT
        .replace_all(&result, EQ_SLOT)
        .into_owned();

    result = RE_PARENTHETICAL
        .replace_all(&result, |caps: &Captures| {
            if RE_SINGLE_LETTER.find_iter(&caps[0]).count() >= 6 {
                " ".to_string()
            } else {
                caps[0].to_string()
            }
        })
        .into_owned();

    result = collapse_letter_runs(&result, |count| (count >= 5).then(|| " ".to_string()));
    result = RE_WHERE_CLAUSE.replace_all(&result, ".").into_owned();

    result = RE_GENERIC_ASSIGNMENT
        .replace_all(&result, |caps: &Captures| {
            let fragment = &caps[0];
            if is_plain_assignment(fragment, thresholds) {
                fragment.split_whitespace().collect::<Vec<_>>().join(" ")
            } else {
                EQ_SLOT.to_string()
            }
        })
        .into_owned();

    result = result
        .replace(['⋅', '·', '×', '∇', '∂'], " ")
        .replace('−', "-");

    let result = restore_placeholders(&result);
    let result = RE_DUPLICATE_EQUATION.replace_all(&result, EQUATION);
    RE_DUPLICATE_MATH.replace_all(&result, MATH).into_owned()
}

/// Short `lhs=rhs` fragments with few variables read as prose ("n=5").
fn is_plain_assignment(fragment: &str, thresholds: &EquationThresholds) -> bool {
    let length = fragment.chars().count();
    let single_letters = RE_SINGLE_LETTER.find_iter(fragment).count();
    let spaces = fragment.chars().filter(|&c| c == ' ').count();

    let has_greek = RE_GREEK_NAME.is_match(fragment);
    let has_subscript = fragment.contains('_');
    let has_spaced_vars = RE_THREE_SPACED_VARS.is_match(fragment);

    length < thresholds.max_fragment_length
        && single_letters <= thresholds.max_single_letters
        && spaces < thresholds.max_spaces
        && !has_greek
        && !has_subscript
        && !has_spaced_vars
}

/// Rewrite runs of space-separated single letters; `decide` gets the run length
/// and returns the replacement, or `None` to keep the run.
fn collapse_letter_runs<F>(input: &str, decide: F) -> String
where
    F: Fn(usize) -> Option<String>,
{
    RE_SINGLE_LETTER_RUN
        .replace_all(input, |caps: &Captures| {
            let count = caps[0].split_whitespace().count();
            decide(count).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn protect_placeholders(input: &str) -> String {
    input
        .replace(EQUATION, &EQ_MARK.to_string())
        .replace(MATH, &MATH_MARK.to_string())
        .replace(CODE_BLOCK, &CODE_MARK.to_string())
}

fn restore_placeholders(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 32);
    for c in input.chars() {
        match c {
            EQ_MARK => out.push_str(EQUATION),
            MATH_MARK => out.push_str(MATH),
            CODE_MARK => out.push_str(CODE_BLOCK),
            _ => out.push(c),
        }
    }
    out
}
