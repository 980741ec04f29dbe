//! Math delimiters and LaTeX remnants.
//!
//! Stage 8 replaces delimited math wholesale. Stage 9 works through whatever
//! LaTeX survived (Wikipedia's `{\displaystyle ...}` copies, environments, bare
//! commands) and then drops the noise lines those steps leave behind.

use super::{without_placeholders, EQUATION, MATH};
use crate::options::EquationThresholds;
use regex::{Captures, Regex};
use std::sync::LazyLock;

// ============================================================================
// Stage 8: Math delimiters
// ============================================================================

static RE_DISPLAY_DOLLAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\$\$.+?\$\$").unwrap());

// `$x$` style: no newline, at most 200 chars, no whitespace just inside the
// delimiters (keeps "$5 and $10" intact)
static RE_INLINE_DOLLAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$[^$\s](?:[^$\n]{0,198}[^$\s])?\$").unwrap());

static RE_PAREN_MATH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)\\\(.+?\\\)").unwrap());

static RE_BRACKET_MATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\\\[.+?\\\]").unwrap());

/// Stage 8: Replace `$$...$$`, `$...$`, `\(...\)` and `\[...\]` with `[equation]`.
pub fn strip_math_delimiters(input: &str) -> String {
    if !input.contains(['$', '\\']) {
        return input.to_string();
    }

    let replacement = format!(" {} ", EQUATION);
    let result = RE_DISPLAY_DOLLAR.replace_all(input, replacement.as_str());
    let result = RE_INLINE_DOLLAR.replace_all(&result, replacement.as_str());
    let result = RE_PAREN_MATH.replace_all(&result, replacement.as_str());
    RE_BRACKET_MATH
        .replace_all(&result, replacement.as_str())
        .into_owned()
}

// ============================================================================
// Stage 9: LaTeX environments and commands
// ============================================================================

const DISPLAYSTYLE: &str = "{\\displaystyle";

static RE_ENVIRONMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\\begin\{[A-Za-z*]+\}.*?\\end\{[A-Za-z*]+\}").unwrap()
});

// \command, \command[opt], \command{arg}, \command[opt]{arg}
static RE_COMMAND_WITH_ARGS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\[A-Za-z]+(?:\[[^\]\n]*\])?(?:\{[^{}]*\})?").unwrap()
});

static RE_INNER_BRACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{([^{}]*)\}").unwrap());

static RE_LONE_COMMAND: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\\[A-Za-z]+").unwrap());

static RE_LETTER_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\p{L}{2,}").unwrap());

/// Stage 9: Clean LaTeX remnants, then drop formula-only noise lines.
///
/// The sub-steps are order-sensitive:
/// 1. `{\displaystyle ...}` groups become `[equation]`
/// 2. `\begin{env}...\end{env}` becomes `[equation]`
/// 3. commands with their optional/brace arguments are removed
/// 4. brace groups collapse innermost-first: `[math]` if they still hold a
///    backslash, a space otherwise (bounded passes)
/// 5. lone commands and stray backslashes are removed
/// 6. noise lines are filtered
pub fn clean_latex(input: &str, thresholds: &EquationThresholds) -> String {
    let mut result = input.to_string();

    if result.contains(['\\', '{', '}']) {
        let equation = format!(" {} ", EQUATION);

        result = replace_displaystyle(&result);
        result = RE_ENVIRONMENT
            .replace_all(&result, equation.as_str())
            .into_owned();
        result = RE_COMMAND_WITH_ARGS.replace_all(&result, " ").into_owned();
        result = collapse_braces(&result, thresholds.max_brace_passes);
        result = RE_LONE_COMMAND.replace_all(&result, " ").replace('\\', " ");
    }

    filter_noise_lines(&result, thresholds)
}

/// Replace every `{\displaystyle ...}` group with `[equation]`.
///
/// Braces are matched by depth. An unbalanced group runs to the end of its line.
fn replace_displaystyle(input: &str) -> String {
    if !input.contains(DISPLAYSTYLE) {
        return input.to_string();
    }

    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find(DISPLAYSTYLE) {
        out.push_str(&rest[..start]);
        let group = &rest[start..];
        let end = matching_brace(group)
            .unwrap_or_else(|| group.find('\n').unwrap_or(group.len()));
        out.push(' ');
        out.push_str(EQUATION);
        out.push(' ');
        rest = &group[end..];
    }

    out.push_str(rest);
    out
}

/// Byte offset just past the brace closing the group that opens at offset 0.
fn matching_brace(group: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in group.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }
    None
}

fn collapse_braces(input: &str, max_passes: usize) -> String {
    let mut result = input.to_string();

    for _ in 0..max_passes {
        if !RE_INNER_BRACES.is_match(&result) {
            break;
        }
        result = RE_INNER_BRACES
            .replace_all(&result, |caps: &Captures| {
                if caps[1].contains('\\') {
                    format!(" {} ", MATH)
                } else {
                    " ".to_string()
                }
            })
            .into_owned();
    }

    result
}

/// Drop lines that carry no prose: very short fragments, symbol soup, lines
/// with too few letters, and lines crowded with `[equation]` tokens.
///
/// Blank lines are paragraph breaks and always survive.
pub fn filter_noise_lines(input: &str, thresholds: &EquationThresholds) -> String {
    input
        .split('\n')
        .filter(|line| !is_noise_line(line, thresholds))
        .collect::<Vec<_>>()
        .join("\n")
}

fn is_noise_line(line: &str, thresholds: &EquationThresholds) -> bool {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return false;
    }

    if trimmed.chars().count() < 3 {
        return true;
    }

    if trimmed.matches(EQUATION).count() > thresholds.max_equations_per_line {
        return true;
    }

    let prose = without_placeholders(trimmed);
    let prose = prose.trim();
    if prose.is_empty() {
        return false;
    }

    if !RE_LETTER_WORD.is_match(prose) {
        return true;
    }

    let length = prose.chars().count();
    if length > 15 {
        let letters = prose.chars().filter(|c| c.is_alphabetic()).count();
        if (letters as f64 / length as f64) < thresholds.min_letter_ratio {
            return true;
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean(input: &str) -> String {
        clean_latex(input, &EquationThresholds::default())
    }

    #[test]
    fn test_display_dollar() {
        let result = strip_math_delimiters("Energy $$E = mc^2$$ is conserved");
        assert_eq!(result, "Energy  [equation]  is conserved");
    }

    #[test]
    fn test_inline_dollar() {
        let result = strip_math_delimiters("where $x^2 + y^2$ holds");
        assert_eq!(result, "where  [equation]  holds");
    }

    #[test]
    fn test_prices_are_not_math() {
        let input = "It costs $5 and $10 today";
        assert_eq!(strip_math_delimiters(input), input);
    }

    #[test]
    fn test_inline_dollar_does_not_cross_lines() {
        let input = "a $x\ny$ b";
        assert_eq!(strip_math_delimiters(input), input);
    }

    #[test]
    fn test_paren_and_bracket_math() {
        let result = strip_math_delimiters(r"inline \(a+b\) and display \[\int f\] end");
        assert_eq!(result.matches("[equation]").count(), 2);
        assert!(!result.contains(r"\("));
        assert!(!result.contains(r"\["));
    }

    #[test]
    fn test_displaystyle_nested_braces() {
        let input = r"The momentum equation {\displaystyle \rho \left({\frac {\partial \mathbf {u} }{\partial t}}\right)} governs the flow of fluids.";
        let result = clean(input);
        assert!(!result.contains("displaystyle"));
        assert!(!result.contains('\\'));
        assert!(result.contains("[equation]"));
        assert!(result.contains("governs the flow of fluids."));
    }

    #[test]
    fn test_unbalanced_displaystyle_runs_to_line_end() {
        let result = replace_displaystyle("a {\\displaystyle x + {y\nnext line");
        assert_eq!(result, "a  [equation] \nnext line");
    }

    #[test]
    fn test_environment_replaced() {
        let input = "The system is solved as follows \\begin{align} x &= 1 \\\\ y &= 2 \\end{align} in closed form.";
        let result = clean(input);
        assert!(result.contains("[equation]"));
        assert!(!result.contains("begin"));
        assert!(!result.contains("align"));
    }

    #[test]
    fn test_commands_stripped() {
        let input = "The vector \\mathbf{v} points along \\textit[it]{the} flow direction.";
        let result = clean(input);
        assert!(!result.contains('\\'));
        assert!(!result.contains("mathbf"));
        assert!(result.contains("points along"));
    }

    #[test]
    fn test_brace_collapse_marks_math() {
        let result = collapse_braces("a {\\, x} b {plain} c", 5);
        assert_eq!(result, "a  [math]  b   c");
    }

    #[test]
    fn test_brace_collapse_nested() {
        let result = collapse_braces("{{x}{y}} z", 5);
        assert_eq!(result.trim(), "z");
    }

    #[test]
    fn test_brace_collapse_bounded() {
        let result = collapse_braces("{{{x}}}", 1);
        assert_eq!(result, "{{ }}");
    }

    #[test]
    fn test_noise_lines_dropped() {
        let input = "Real sentence about fluids.\n= + - ( )\nx\n12.5 / 3.7 * 88 - 41 + 90\nAnother real sentence.";
        let result = clean(input);
        assert_eq!(result, "Real sentence about fluids.\nAnother real sentence.");
    }

    #[test]
    fn test_equation_only_line_kept() {
        let input = "Prose first.\n [equation] \nProse after.";
        assert_eq!(clean(input), input);
    }

    #[test]
    fn test_crowded_equation_line_dropped() {
        let line = "[equation] a [equation] b [equation] c [equation] d [equation] words";
        assert_eq!(clean(line), "");
    }

    #[test]
    fn test_blank_lines_survive_filter() {
        let input = "First paragraph here.\n\nSecond paragraph here.";
        assert_eq!(clean(input), input);
    }

    #[test]
    fn test_non_latin_prose_kept() {
        let input = "광합성은 빛 에너지를 화학 에너지로 바꾸는 과정이다.";
        assert_eq!(clean(input), input);
    }
}
