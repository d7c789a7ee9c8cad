//! Expression tokenizer.
//!
//! Splits one side of an assignment (or a whole code line) into an ordered
//! sequence of tokens. The tokenizer stays deliberately permissive: unknown
//! punctuation becomes an opaque operator token so that the classifier, not
//! the tokenizer, decides whether a line fits any accepted grammar.

use crate::error::EngineError;

/// One symbolic piece of an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// A variable or function name.
    Symbol(String),
    /// A numeric literal, keeping its source text for lossless echo.
    Number { value: f64, text: String },
    /// An operator or other punctuation, passed through verbatim.
    Op(String),
    OpenParen,
    CloseParen,
}

impl Token {
    pub fn number(value: f64) -> Self {
        Token::Number {
            value,
            text: value.to_string(),
        }
    }

    pub fn is_op(&self, op: &str) -> bool {
        matches!(self, Token::Op(o) if o == op)
    }

    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Token::Symbol(s) => Some(s),
            _ => None,
        }
    }

    /// Source-level text of the token, used for error messages.
    pub fn text(&self) -> &str {
        match self {
            Token::Symbol(s) => s,
            Token::Number { text, .. } => text,
            Token::Op(op) => op,
            Token::OpenParen => "(",
            Token::CloseParen => ")",
        }
    }
}

/// Reconstruct a readable source form of a token sequence.
pub fn tokens_to_text(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(Token::text)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Operators recognized as two-character units.
const TWO_CHAR_OPS: [&str; 6] = ["**", "//", "<=", ">=", "==", "!="];

/// Tokenize an expression string.
///
/// Fails on malformed numeric literals and unbalanced parentheses; any
/// other character sequence tokenizes cleanly.
pub fn tokenize(expr: &str) -> Result<Vec<Token>, EngineError> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = expr.chars().collect();
    let mut i = 0;
    let mut depth: i32 = 0;

    while i < chars.len() {
        let ch = chars[i];

        if ch.is_whitespace() {
            i += 1;
            continue;
        }

        if ch == '(' {
            depth += 1;
            tokens.push(Token::OpenParen);
            i += 1;
            continue;
        }

        if ch == ')' {
            depth -= 1;
            if depth < 0 {
                return Err(EngineError::syntax(format!(
                    "unbalanced closing parenthesis in `{expr}`"
                )));
            }
            tokens.push(Token::CloseParen);
            i += 1;
            continue;
        }

        if ch.is_alphabetic() || ch == '_' {
            let start = i;
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            tokens.push(Token::Symbol(chars[start..i].iter().collect()));
            continue;
        }

        if ch.is_ascii_digit() || (ch == '.' && chars.get(i + 1).is_some_and(|c| c.is_ascii_digit()))
        {
            let start = i;
            let mut seen_dot = false;
            while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                if chars[i] == '.' {
                    if seen_dot {
                        return Err(EngineError::syntax(format!(
                            "malformed numeric literal in `{expr}`"
                        )));
                    }
                    seen_dot = true;
                }
                i += 1;
            }
            // Optional exponent part, e.g. 1.5e-3
            if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
                let mut j = i + 1;
                if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
                    j += 1;
                }
                if j < chars.len() && chars[j].is_ascii_digit() {
                    while j < chars.len() && chars[j].is_ascii_digit() {
                        j += 1;
                    }
                    i = j;
                }
            }
            let text: String = chars[start..i].iter().collect();
            let value: f64 = text
                .parse()
                .map_err(|_| EngineError::syntax(format!("malformed numeric literal `{text}`")))?;
            tokens.push(Token::Number { value, text });
            continue;
        }

        // Two-character operators take precedence over their prefixes.
        let pair: String = chars[i..(i + 2).min(chars.len())].iter().collect();
        if TWO_CHAR_OPS.contains(&pair.as_str()) {
            tokens.push(Token::Op(pair));
            i += 2;
            continue;
        }

        tokens.push(Token::Op(ch.to_string()));
        i += 1;
    }

    if depth != 0 {
        return Err(EngineError::syntax(format!(
            "unbalanced parentheses in `{expr}`"
        )));
    }

    Ok(tokens)
}
