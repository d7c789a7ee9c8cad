//! Token conversion.
//!
//! Rewrites each calculation line's symbolic tokens into the numerically
//! substituted form shown beneath the symbolic form: every symbol right of
//! the `=` is replaced by its computed value, operators and grouping stay
//! unchanged.

use crate::cell::{Line, Results};
use crate::error::EngineError;
use crate::tokens::{Token, tokens_to_text};

/// Fill the numeric form of a classified line.
pub fn convert_line(line: Line, results: &Results) -> Result<Line, EngineError> {
    match line {
        Line::LongCalc(mut calc) => {
            calc.substituted = substitute_rhs(&calc.tokens, results)?;
            Ok(Line::LongCalc(calc))
        }
        Line::NumericCalc(mut calc) => {
            // Already numeric; the symbolic and numeric forms coincide.
            calc.substituted = calc.tokens.clone();
            Ok(Line::NumericCalc(calc))
        }
        Line::InputDeclaration(mut calc) => {
            calc.substituted = if calc.tokens.iter().any(|t| t.is_op("=")) {
                calc.tokens.clone()
            } else {
                // Bare echo: substitute the value for the symbol itself.
                substitute_all(&calc.tokens, results)?
            };
            Ok(Line::InputDeclaration(calc))
        }
        Line::Conditional(mut cond) => {
            cond.branch = match cond.branch {
                Some(branch) => Some(Box::new(convert_line(*branch, results)?)),
                None => None,
            };
            Ok(Line::Conditional(cond))
        }
        other => Ok(other),
    }
}

/// Substitute symbols right of the first `=`; a line without `=` (free
/// code kept as a symbolic calculation) is left untouched.
fn substitute_rhs(tokens: &[Token], results: &Results) -> Result<Vec<Token>, EngineError> {
    let Some(eq) = tokens.iter().position(|t| t.is_op("=")) else {
        return Ok(tokens.to_vec());
    };
    let mut out = tokens[..=eq].to_vec();
    out.extend(substitute_all(&tokens[eq + 1..], results)?);
    Ok(out)
}

fn substitute_all(tokens: &[Token], results: &Results) -> Result<Vec<Token>, EngineError> {
    tokens
        .iter()
        .map(|t| match t {
            Token::Symbol(name) => results
                .get(name)
                .copied()
                .map(Token::number)
                .ok_or_else(|| EngineError::missing(name, &tokens_to_text(tokens))),
            other => Ok(other.clone()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CalcLine;
    use crate::tokens::tokenize;
    use pretty_assertions::assert_eq;

    fn results() -> Results {
        let mut r = Results::new();
        r.insert("x".to_string(), 3.0);
        r.insert("y".to_string(), 7.0);
        r
    }

    #[test]
    fn substitutes_symbols_right_of_equals() {
        let line = Line::LongCalc(CalcLine::new(
            tokenize("z = x * 2 + y").unwrap(),
            String::new(),
        ));
        let converted = convert_line(line, &results()).unwrap();
        match converted {
            Line::LongCalc(c) => {
                assert_eq!(tokens_to_text(&c.substituted), "z = 3 * 2 + 7");
                // Symbolic form untouched.
                assert_eq!(tokens_to_text(&c.tokens), "z = x * 2 + y");
            }
            other => panic!("unexpected line {other:?}"),
        }
    }

    #[test]
    fn missing_operand_is_fatal() {
        let line = Line::LongCalc(CalcLine::new(tokenize("z = w + 1").unwrap(), String::new()));
        let err = convert_line(line, &results()).unwrap_err();
        assert!(matches!(err, EngineError::MissingResult { name, .. } if name == "w"));
    }

    #[test]
    fn bare_input_echo_substitutes_its_value() {
        let line = Line::InputDeclaration(CalcLine::new(tokenize("y").unwrap(), String::new()));
        let converted = convert_line(line, &results()).unwrap();
        match converted {
            Line::InputDeclaration(c) => assert_eq!(tokens_to_text(&c.substituted), "7"),
            other => panic!("unexpected line {other:?}"),
        }
    }

    #[test]
    fn headings_pass_through() {
        let line = Line::Heading(crate::cell::HeadingLine {
            text: "1. Analysis".to_string(),
            rendered: String::new(),
        });
        assert!(matches!(
            convert_line(line, &results()).unwrap(),
            Line::Heading(_)
        ));
    }
}
