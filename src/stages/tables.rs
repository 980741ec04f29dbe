//! Stage 6: table artifacts.

/// Characters that only carry table layout
fn is_table_format_char(c: char) -> bool {
    matches!(c, '-' | '=' | '|' | ':' | '+') || c.is_whitespace()
}

/// Check if a line is a table separator or a pipe-heavy table row
fn is_table_artifact(line: &str) -> bool {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return false;
    }

    // Separator made only of layout characters: |---|:--:|, +===+, ----
    if trimmed.chars().all(is_table_format_char) {
        return true;
    }

    let pipes = line.chars().filter(|&c| c == '|').count();
    if pipes > 3 {
        let total = line.chars().count();
        let formatting = line.chars().filter(|&c| is_table_format_char(c)).count();
        if formatting as f64 / total as f64 > 0.7 {
            return true;
        }
    }

    false
}

/// Stage 6: Drop table separator lines and pipe-heavy rows, then blank out the
/// `|` and `+` cell delimiters left on table rows.
///
/// A `+` outside a row holding `|` is prose (`C+`, `5 +/- 0.2`) and stays.
pub fn strip_tables(input: &str) -> String {
    if !input.contains(['|', '+', '-', '=', ':']) {
        return input.to_string();
    }

    input
        .split('\n')
        .filter(|line| !is_table_artifact(line))
        .map(|line| {
            if line.contains('|') {
                line.replace(['|', '+'], " ")
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
