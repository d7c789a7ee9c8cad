//! Result binding.
//!
//! Attaches the previously computed value of each line's declared name.
//! Blank, heading and input-declaration lines are already fully resolved
//! by the classifier and pass through untouched.

use crate::cell::{CalcLine, Line, Results};
use crate::error::EngineError;
use crate::tokens::{Token, tokens_to_text};

/// Attach the declared name's value to a classified line.
pub fn bind_result(line: Line, results: &Results) -> Result<Line, EngineError> {
    match line {
        Line::Parameter(mut calc) => {
            bind_calc(&mut calc, results, true)?;
            Ok(Line::Parameter(calc))
        }
        Line::NumericCalc(mut calc) => {
            bind_calc(&mut calc, results, false)?;
            Ok(Line::NumericCalc(calc))
        }
        Line::LongCalc(mut calc) => {
            bind_calc(&mut calc, results, false)?;
            Ok(Line::LongCalc(calc))
        }
        Line::Conditional(mut cond) => {
            cond.branch = match cond.branch {
                Some(branch) => Some(Box::new(bind_result(*branch, results)?)),
                None => None,
            };
            Ok(Line::Conditional(cond))
        }
        other => Ok(other),
    }
}

/// Look up the declared name. For assignment lines that is the symbol
/// left of `=`; a bare single-symbol line declares itself when
/// `bind_bare` is set (parameter echo). Lines with no declared name,
/// such as free-form code kept as a symbolic calculation, stay unbound.
fn bind_calc(calc: &mut CalcLine, results: &Results, bind_bare: bool) -> Result<(), EngineError> {
    let name = match declared_name(&calc.tokens, bind_bare) {
        Some(name) => name.to_string(),
        None => return Ok(()),
    };
    let value = results
        .get(&name)
        .copied()
        .ok_or_else(|| EngineError::missing(&name, &tokens_to_text(&calc.tokens)))?;
    calc.result = Some(value);
    Ok(())
}

fn declared_name(tokens: &[Token], bind_bare: bool) -> Option<&str> {
    if tokens.iter().any(|t| t.is_op("=")) {
        return tokens.first().and_then(Token::as_symbol);
    }
    match tokens {
        [Token::Symbol(name)] if bind_bare => Some(name),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::tokenize;

    fn results() -> Results {
        let mut r = Results::new();
        r.insert("a".to_string(), 7.5);
        r
    }

    #[test]
    fn binds_assignment_result() {
        let line = Line::NumericCalc(CalcLine::new(tokenize("a = 3 + 4.5").unwrap(), String::new()));
        let bound = bind_result(line, &results()).unwrap();
        match bound {
            Line::NumericCalc(c) => assert_eq!(c.result, Some(7.5)),
            other => panic!("unexpected line {other:?}"),
        }
    }

    #[test]
    fn binds_bare_parameter_echo() {
        let line = Line::Parameter(CalcLine::new(tokenize("a").unwrap(), String::new()));
        let bound = bind_result(line, &results()).unwrap();
        match bound {
            Line::Parameter(c) => assert_eq!(c.result, Some(7.5)),
            other => panic!("unexpected line {other:?}"),
        }
    }

    #[test]
    fn missing_name_is_fatal() {
        let line = Line::LongCalc(CalcLine::new(tokenize("b = a + 1").unwrap(), String::new()));
        let err = bind_result(line, &results()).unwrap_err();
        match err {
            EngineError::MissingResult { name, line } => {
                assert_eq!(name, "b");
                assert!(line.contains("b = a + 1"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn free_form_long_calc_stays_unbound() {
        let line = Line::LongCalc(CalcLine::new(
            tokenize("governing load case").unwrap(),
            String::new(),
        ));
        let bound = bind_result(line, &results()).unwrap();
        match bound {
            Line::LongCalc(c) => assert_eq!(c.result, None),
            other => panic!("unexpected line {other:?}"),
        }
    }
}
