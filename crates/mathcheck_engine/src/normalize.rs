//! Text clean-up before any symbolic work.
//!
//! Student input arrives with typographic operators, superscripts and stray
//! whitespace. Everything here is pure string processing; all regex use is
//! confined to this module.

use crate::report::ErrorKind;
use mathcheck_ast::RelOp;
use regex::{Captures, Regex};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::LazyLock;

/// Names only ever used in call position.
const FUNCTION_NAMES: &[&str] = &[
    "sin", "cos", "tan", "sec", "csc", "cot", "asin", "acos", "atan", "arcsin", "arccos",
    "arctan", "sinh", "cosh", "tanh", "ln", "log", "exp", "sqrt", "abs", "fact",
];

const CONSTANT_NAMES: &[&str] = &["pi", "e"];

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z_][A-Za-z0-9_]*").expect("valid regex literal"));

static ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([A-Za-z][A-Za-z0-9_]*)\s*=\s*(\S(?:.*\S)?)\s*$").expect("valid regex literal")
});

static DECIMAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?$").expect("valid regex literal")
});

static FRACTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([+-]?(?:\d+(?:\.\d*)?|\.\d+))/([+-]?(?:\d+(?:\.\d*)?|\.\d+))$")
        .expect("valid regex literal")
});

static NON_FINITE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[+-]?(?:inf|infinity|nan|∞)$").expect("valid regex literal")
});

static INTEGRATION_CONSTANT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*\+\s*[CcK](?:_?\d+)?\s*$").expect("valid regex literal")
});

/// Canonical text plus the variable the text is about, if one was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedExpression {
    text: String,
    variable: Option<String>,
}

impl NormalizedExpression {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn variable(&self) -> Option<&str> {
        self.variable.as_deref()
    }

    pub fn variable_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.variable.as_deref().unwrap_or(default)
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

impl fmt::Display for NormalizedExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Canonicalize `text` and discover its variable. Never fails.
pub fn normalize(text: &str) -> NormalizedExpression {
    let text = canonicalize(text);
    let variable = discover_variable(&text);
    NormalizedExpression { text, variable }
}

fn superscript(c: char) -> Option<char> {
    Some(match c {
        '⁰' => '0',
        '¹' => '1',
        '²' => '2',
        '³' => '3',
        '⁴' => '4',
        '⁵' => '5',
        '⁶' => '6',
        '⁷' => '7',
        '⁸' => '8',
        '⁹' => '9',
        '⁻' => '-',
        _ => return None,
    })
}

/// ASCII operators, `^` exponents and single spaces.
///
/// Whitespace between the end of one operand and the start of the next is
/// multiplication: `2 x`, `x sin(x)`, `(x + 1) (x - 1)` and `pi r^2` all gain
/// a `*`. A space between a function name and its `(` is dropped. Any other
/// whitespace collapses to one space.
pub fn canonicalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.trim().chars().peekable();
    let mut pending_space = false;

    while let Some(c) = chars.next() {
        if c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space {
            match space_between(&out, c) {
                Space::Keep => out.push(' '),
                Space::Multiply => out.push('*'),
                Space::Drop => {}
            }
            pending_space = false;
        }

        match c {
            '×' | '·' | '⋅' | '∗' => out.push('*'),
            '÷' | '∕' => out.push('/'),
            '−' | '–' | '—' => out.push('-'),
            '≤' => out.push_str("<="),
            '≥' => out.push_str(">="),
            '≠' => out.push_str("!="),
            '*' if chars.peek() == Some(&'*') => {
                chars.next();
                out.push('^');
            }
            '=' if chars.peek() == Some(&'=') => {
                chars.next();
                out.push('=');
            }
            c => match superscript(c) {
                Some(first) => {
                    out.push('^');
                    out.push(first);
                    while let Some(next) = chars.peek().copied().and_then(superscript) {
                        out.push(next);
                        chars.next();
                    }
                }
                None => out.push(c),
            },
        }
    }
    out
}

enum Space {
    Keep,
    Multiply,
    Drop,
}

fn ends_operand(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | ')' | ']' | '!' | 'π')
}

fn starts_operand(c: char) -> bool {
    c.is_ascii_alphabetic() || matches!(c, '_' | '(' | '[' | 'π' | '√' | '∛' | '∜')
}

/// Identifier at the very end of `text`, if any (`sin` in `2sin`).
fn trailing_identifier(text: &str) -> Option<&str> {
    let run_start = text
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_alphanumeric() || *c == '_')
        .last()
        .map(|(i, _)| i)?;
    let run = &text[run_start..];
    let ident_start = run.find(|c: char| c.is_ascii_alphabetic() || c == '_')?;
    Some(&run[ident_start..])
}

/// What a run of whitespace between `before` and `next` turns into.
fn space_between(before: &str, next: char) -> Space {
    let Some(last) = before.chars().last() else {
        return Space::Keep;
    };
    if !ends_operand(last) || !starts_operand(next) {
        return Space::Keep;
    }
    match trailing_identifier(before) {
        Some(name) if FUNCTION_NAMES.contains(&name) => {
            if next == '(' {
                Space::Drop
            } else {
                Space::Keep
            }
        }
        _ => Space::Multiply,
    }
}

fn is_known_name(token: &str) -> bool {
    FUNCTION_NAMES.contains(&token) || CONSTANT_NAMES.contains(&token)
}

/// First alphabetic character of the first identifier that is not a known
/// function or constant.
pub fn discover_variable(text: &str) -> Option<String> {
    IDENTIFIER
        .find_iter(text)
        .map(|m| m.as_str())
        .find(|token| !is_known_name(token))
        .and_then(|token| token.chars().find(|c| c.is_ascii_alphabetic()))
        .map(String::from)
}

/// Every identifier in `text` that is not a known function or constant.
pub fn free_variables(text: &str) -> Vec<String> {
    IDENTIFIER
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|token| !is_known_name(token))
        .map(String::from)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Parse a plain number: decimal, scientific, or a `p/q` fraction.
pub fn parse_number(text: &str) -> Result<f64, ErrorKind> {
    let compact: String = canonicalize(text).chars().filter(|c| !c.is_whitespace()).collect();

    if NON_FINITE.is_match(&compact) {
        return Err(ErrorKind::InvalidValue);
    }
    if DECIMAL.is_match(&compact) {
        let value: f64 = compact.parse().map_err(|_| ErrorKind::InvalidFormat)?;
        return finite(value);
    }
    if let Some(caps) = FRACTION.captures(&compact) {
        let numerator: f64 = caps[1].parse().map_err(|_| ErrorKind::InvalidFormat)?;
        let denominator: f64 = caps[2].parse().map_err(|_| ErrorKind::InvalidFormat)?;
        if denominator == 0.0 {
            return Err(ErrorKind::InvalidValue);
        }
        return finite(numerator / denominator);
    }
    Err(ErrorKind::InvalidFormat)
}

fn finite(value: f64) -> Result<f64, ErrorKind> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ErrorKind::InvalidValue)
    }
}

/// Read `<variable> = <number>`.
pub fn parse_assignment(text: &str) -> Result<(String, f64), ErrorKind> {
    let text = canonicalize(text);
    let caps = ASSIGNMENT.captures(&text).ok_or(ErrorKind::InvalidFormat)?;
    let value = parse_number(&caps[2])?;
    Ok((caps[1].to_string(), value))
}

/// Replace whole-word occurrences of `var` with `(value)`.
pub fn substitute_word(text: &str, var: &str, value: &str) -> String {
    IDENTIFIER
        .replace_all(text, |caps: &Captures| {
            if &caps[0] == var {
                format!("({})", value)
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

/// Remove a trailing `+ C`, `+ C1`, `+ C_2`, `+ c` or `+ K`.
pub fn strip_integration_constant(text: &str) -> String {
    INTEGRATION_CONSTANT.replace(text, "").trim().to_string()
}

/// Two sides of a relational statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    pub lhs: String,
    pub op: RelOp,
    pub rhs: String,
}

/// Split `text` on its relational operator. `Ok(None)` when there is none;
/// more than one operator or an empty side is [`ErrorKind::InvalidFormat`].
pub fn split_relation(text: &str) -> Result<Option<Relation>, ErrorKind> {
    let bytes = text.as_bytes();
    let mut found: Option<(usize, usize, RelOp)> = None;
    let mut i = 0;

    while i < bytes.len() {
        let next = bytes.get(i + 1).copied();
        let hit = match (bytes[i], next) {
            (b'<', Some(b'=')) => Some((2, RelOp::Leq)),
            (b'>', Some(b'=')) => Some((2, RelOp::Geq)),
            (b'!', Some(b'=')) => Some((2, RelOp::Neq)),
            (b'=', _) => Some((1, RelOp::Eq)),
            (b'<', _) => Some((1, RelOp::Lt)),
            (b'>', _) => Some((1, RelOp::Gt)),
            _ => None,
        };
        match hit {
            Some((len, op)) => {
                if found.is_some() {
                    return Err(ErrorKind::InvalidFormat);
                }
                found = Some((i, len, op));
                i += len;
            }
            None => i += 1,
        }
    }

    let Some((at, len, op)) = found else {
        return Ok(None);
    };
    let lhs = text[..at].trim();
    let rhs = text[at + len..].trim();
    if lhs.is_empty() || rhs.is_empty() {
        return Err(ErrorKind::InvalidFormat);
    }
    Ok(Some(Relation {
        lhs: lhs.to_string(),
        op,
        rhs: rhs.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonicalize_operators() {
        assert_eq!(canonicalize("  3 × 4 ÷ 2 − 1 "), "3 * 4 / 2 - 1");
        assert_eq!(canonicalize("x² + 2·x³"), "x^2 + 2*x^3");
        assert_eq!(canonicalize("x⁻¹"), "x^-1");
        assert_eq!(canonicalize("x**2 == 4"), "x^2 = 4");
        assert_eq!(canonicalize("x ≤ 3"), "x <= 3");
    }

    #[test]
    fn test_canonicalize_whitespace() {
        assert_eq!(canonicalize("x   +\t1"), "x + 1");
        assert_eq!(canonicalize("2 x + 3 (x - 1)"), "2*x + 3*(x - 1)");
        assert_eq!(canonicalize("(x + 1) (x - 1)"), "(x + 1)*(x - 1)");
        assert_eq!(canonicalize("x y"), "x*y");
        assert_eq!(canonicalize("x² sin(x)"), "x^2*sin(x)");
        assert_eq!(canonicalize("pi r^2"), "pi*r^2");
        assert_eq!(canonicalize("2 √x"), "2*√x");
    }

    #[test]
    fn test_canonicalize_function_spacing() {
        assert_eq!(canonicalize("sin (x)"), "sin(x)");
        assert_eq!(canonicalize("2x sin (x)"), "2x*sin(x)");
        // no call without parentheses, so the space stays and parsing fails
        assert_eq!(canonicalize("sin x"), "sin x");
        // numbers next to numbers are never multiplied
        assert_eq!(canonicalize("2 3"), "2 3");
        assert_eq!(canonicalize("x = 4"), "x = 4");
        assert_eq!(canonicalize("3! 2"), "3! 2");
    }

    #[test]
    fn test_discover_variable() {
        assert_eq!(normalize("2x + 3 = 7").variable(), Some("x"));
        assert_eq!(normalize("sin(t) + cos(t)").variable(), Some("t"));
        assert_eq!(normalize("e^(2y) + pi").variable(), Some("y"));
        assert_eq!(normalize("sqrt(abs(z))").variable(), Some("z"));
        assert_eq!(normalize("3 + 4").variable(), None);
        assert_eq!(normalize("3 + 4").variable_or("x"), "x");
    }

    #[test]
    fn test_free_variables() {
        assert_eq!(free_variables("x * y + sin(x) + e"), vec!["x", "y"]);
        assert!(free_variables("ln(pi)").is_empty());
    }

    #[test]
    fn test_parse_assignment() {
        assert_eq!(parse_assignment("x = 4"), Ok(("x".to_string(), 4.0)));
        assert_eq!(parse_assignment("y=-2.5"), Ok(("y".to_string(), -2.5)));
        assert_eq!(parse_assignment("x = − 3"), Ok(("x".to_string(), -3.0)));
        assert_eq!(parse_assignment("x = 1/4"), Ok(("x".to_string(), 0.25)));
        assert_eq!(parse_assignment("4"), Err(ErrorKind::InvalidFormat));
        assert_eq!(parse_assignment("x = four"), Err(ErrorKind::InvalidFormat));
        assert_eq!(parse_assignment("x = inf"), Err(ErrorKind::InvalidValue));
        assert_eq!(parse_assignment("x = 1e999"), Err(ErrorKind::InvalidValue));
        assert_eq!(parse_assignment("x = 1/0"), Err(ErrorKind::InvalidValue));
    }

    #[test]
    fn test_substitute_word() {
        assert_eq!(substitute_word("2x + x2 + exp(x)", "x", "4"), "2(4) + x2 + exp((4))");
        assert_eq!(substitute_word("x^2 + 5x", "x", "-1"), "(-1)^2 + 5(-1)");
    }

    #[test]
    fn test_strip_integration_constant() {
        assert_eq!(strip_integration_constant("x^2 + 3x + C"), "x^2 + 3x");
        assert_eq!(strip_integration_constant("x^2+C1"), "x^2");
        assert_eq!(strip_integration_constant("ln(x) + c"), "ln(x)");
        assert_eq!(strip_integration_constant("sin(x) + K"), "sin(x)");
        assert_eq!(strip_integration_constant("x + Cx"), "x + Cx");
        assert_eq!(strip_integration_constant("x^2"), "x^2");
    }

    #[test]
    fn test_split_relation() {
        let rel = split_relation("2x + 3 = 7").expect("ok").expect("relation");
        assert_eq!((rel.lhs.as_str(), rel.op, rel.rhs.as_str()), ("2x + 3", RelOp::Eq, "7"));
        let rel = split_relation("x >= 2").expect("ok").expect("relation");
        assert_eq!(rel.op, RelOp::Geq);
        assert_eq!(split_relation("x + 1"), Ok(None));
        assert_eq!(split_relation("x = 1 = 2"), Err(ErrorKind::InvalidFormat));
        assert_eq!(split_relation("= 2"), Err(ErrorKind::InvalidFormat));
    }
}
