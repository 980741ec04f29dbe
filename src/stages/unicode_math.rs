//! Stage 10: Unicode math normalization.
//!
//! Converts typeset math into ASCII a language model reads reliably:
//! mathematical alphanumerics (U+1D400 block) fold to plain letters, Greek
//! letters and word-like operators spell out, superscript/subscript runs become
//! `^`/`_` suffixes, and relational symbols become ASCII digraphs.

use unicode_normalization::UnicodeNormalization;

/// Greek letters spelled out (lowercase, uppercase, variant forms)
const GREEK_NAMES: &[(char, &str)] = &[
    ('α', "alpha"),
    ('β', "beta"),
    ('γ', "gamma"),
    ('δ', "delta"),
    ('ε', "epsilon"),
    ('ζ', "zeta"),
    ('η', "eta"),
    ('θ', "theta"),
    ('ι', "iota"),
    ('κ', "kappa"),
    ('λ', "lambda"),
    ('μ', "mu"),
    ('ν', "nu"),
    ('ξ', "xi"),
    ('ο', "omicron"),
    ('π', "pi"),
    ('ρ', "rho"),
    ('σ', "sigma"),
    ('ς', "sigma"),
    ('τ', "tau"),
    ('υ', "upsilon"),
    ('φ', "phi"),
    ('χ', "chi"),
    ('ψ', "psi"),
    ('ω', "omega"),
    ('ϵ', "epsilon"),
    ('ϑ', "theta"),
    ('ϕ', "phi"),
    ('ϖ', "pi"),
    ('ϱ', "rho"),
    ('ϰ', "kappa"),
    ('Α', "Alpha"),
    ('Β', "Beta"),
    ('Γ', "Gamma"),
    ('Δ', "Delta"),
    ('Ε', "Epsilon"),
    ('Ζ', "Zeta"),
    ('Η', "Eta"),
    ('Θ', "Theta"),
    ('Ι', "Iota"),
    ('Κ', "Kappa"),
    ('Λ', "Lambda"),
    ('Μ', "Mu"),
    ('Ν', "Nu"),
    ('Ξ', "Xi"),
    ('Ο', "Omicron"),
    ('Π', "Pi"),
    ('Ρ', "Rho"),
    ('Σ', "Sigma"),
    ('Τ', "Tau"),
    ('Υ', "Upsilon"),
    ('Φ', "Phi"),
    ('Χ', "Chi"),
    ('Ψ', "Psi"),
    ('Ω', "Omega"),
    ('∆', "Delta"), // Increment
];

/// Operators that read as words; separated from neighbouring alphanumerics
const OPERATOR_WORDS: &[(char, &str)] = &[
    ('∫', "integral"),
    ('∬', "double-integral"),
    ('∭', "triple-integral"),
    ('∮', "contour-integral"),
    ('∑', "sum"),
    ('∏', "product"),
    ('√', "sqrt"),
    ('∞', "infinity"),
    ('∂', "partial"),
    ('∇', "nabla"),
    ('ℏ', "h-bar"),
    ('×', "x"),
    ('°', "degrees"),
    // Set theory and logic
    ('∈', "in"),
    ('∉', "not in"),
    ('∀', "forall"),
    ('∃', "exists"),
    ('∧', "and"),
    ('∨', "or"),
    ('¬', "not"),
    ('∪', "union"),
    ('∩', "intersection"),
    ('∅', "empty set"),
    ('⊂', "subset"),
    ('⊆', "subset"),
    ('∝', "proportional to"),
];

/// Symbols replaced in place
const OPERATOR_GLYPHS: &[(char, &str)] = &[
    ('≈', "~"),
    ('∼', "~"),
    ('≠', "!="),
    ('≤', "<="),
    ('≥', ">="),
    ('≡', "=="),
    ('±', "+/-"),
    ('∓', "-/+"),
    ('÷', "/"),
    ('−', "-"),
    ('∗', "*"),
    ('→', "->"),
    ('←', "<-"),
    ('↔', "<->"),
    ('⇒', "=>"),
    ('⇔', "<=>"),
    ('′', "'"),
    ('″', "''"),
    // Number sets and letterlike symbols
    ('ℝ', "R"),
    ('ℤ', "Z"),
    ('ℕ', "N"),
    ('ℚ', "Q"),
    ('ℂ', "C"),
    ('ℓ', "l"),
    ('µ', "u"), // Micro sign: "µm" reads as "um"
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Script {
    Super,
    Sub,
}

impl Script {
    fn marker(self) -> char {
        match self {
            Script::Super => '^',
            Script::Sub => '_',
        }
    }
}

/// Map a superscript or subscript code point to its script and ASCII base
fn script_char(c: char) -> Option<(Script, char)> {
    let sup = match c {
        '⁰' => Some('0'),
        '¹' => Some('1'),
        '²' => Some('2'),
        '³' => Some('3'),
        '⁴' => Some('4'),
        '⁵' => Some('5'),
        '⁶' => Some('6'),
        '⁷' => Some('7'),
        '⁸' => Some('8'),
        '⁹' => Some('9'),
        '⁺' => Some('+'),
        '⁻' => Some('-'),
        '⁼' => Some('='),
        '⁽' => Some('('),
        '⁾' => Some(')'),
        'ⁿ' => Some('n'),
        'ⁱ' => Some('i'),
        _ => None,
    };
    if let Some(base) = sup {
        return Some((Script::Super, base));
    }

    let sub = match c {
        '₀'..='₉' => char::from_u32(c as u32 - '₀' as u32 + '0' as u32),
        '₊' => Some('+'),
        '₋' => Some('-'),
        '₌' => Some('='),
        '₍' => Some('('),
        '₎' => Some(')'),
        'ₐ' => Some('a'),
        'ₑ' => Some('e'),
        'ₒ' => Some('o'),
        'ₓ' => Some('x'),
        'ₕ' => Some('h'),
        'ₖ' => Some('k'),
        'ₗ' => Some('l'),
        'ₘ' => Some('m'),
        'ₙ' => Some('n'),
        'ₚ' => Some('p'),
        'ₛ' => Some('s'),
        'ₜ' => Some('t'),
        _ => None,
    };
    sub.map(|base| (Script::Sub, base))
}

/// Mathematical Alphanumeric Symbols block (bold, italic, script, fraktur, ...)
fn is_math_alphanumeric(c: char) -> bool {
    matches!(c, '\u{1D400}'..='\u{1D7FF}' | '\u{210E}')
}

fn lookup(table: &[(char, &'static str)], c: char) -> Option<&'static str> {
    table.iter().find(|(k, _)| *k == c).map(|(_, v)| *v)
}

/// Stage 10: Normalize Unicode math to ASCII tokens.
pub fn normalize_unicode_math(input: &str) -> String {
    if input.is_ascii() {
        return input.to_string();
    }

    let mut out = String::with_capacity(input.len() + input.len() / 8);
    let mut chars = input.chars().peekable();
    let mut run: Option<Script> = None;

    while let Some(c) = chars.next() {
        if let Some((script, base)) = script_char(c) {
            if run != Some(script) {
                // Only mark a script that trails a token: x², 10²³, H₂O, (a+b)²
                let trails_token = out
                    .chars()
                    .next_back()
                    .is_some_and(|p| p.is_alphanumeric() || p == ')');
                if trails_token {
                    out.push(script.marker());
                }
                run = Some(script);
            }
            out.push(base);
            continue;
        }
        run = None;

        let next = chars.peek().copied();
        if is_math_alphanumeric(c) {
            // NFKC folds 𝑎 -> a, 𝐀 -> A, 𝛼 -> α, 𝟐 -> 2
            for plain in std::iter::once(c).nfkc() {
                push_symbol(&mut out, plain, next);
            }
        } else {
            push_symbol(&mut out, c, next);
        }
    }

    out
}

fn push_symbol(out: &mut String, c: char, next: Option<char>) {
    if let Some(word) = lookup(GREEK_NAMES, c).or_else(|| lookup(OPERATOR_WORDS, c)) {
        push_word(out, word, next);
    } else if let Some(glyph) = lookup(OPERATOR_GLYPHS, c) {
        out.push_str(glyph);
    } else {
        out.push(c);
    }
}

/// Push a spelled-out token, keeping it apart from adjacent letters and digits
fn push_word(out: &mut String, word: &str, next: Option<char>) {
    if out.chars().next_back().is_some_and(char::is_alphanumeric) {
        out.push(' ');
    }
    out.push_str(word);
    if next.is_some_and(char::is_alphanumeric) {
        out.push(' ');
    }
}
