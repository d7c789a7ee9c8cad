//! Conditional calculation lines.
//!
//! A conditional calculation spans one `if` branch line and any number of
//! sibling `elif`/`else` lines, each holding `keyword condition : assignment`.
//! The builder evaluates the branch conditions against the results mapping
//! in order and keeps only the first branch that holds; the surviving
//! branch's assignment is classified like any other code line. When no
//! branch holds, the conditional renders empty and is dropped at assembly.

use crate::cell::{ConditionalLine, Mode, Results};
use crate::error::EngineError;
use crate::tokens::{Token, tokenize, tokens_to_text};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Keyword {
    If,
    Elif,
    Else,
}

/// One parsed branch line, not yet evaluated.
#[derive(Debug, Clone)]
pub struct Branch {
    keyword: Keyword,
    condition: Vec<Token>,
    body: String,
    comment: String,
}

/// True iff the code line opens a conditional calculation.
pub fn is_branch_start(code: &str) -> bool {
    starts_with_keyword(code, "if")
}

/// True iff the code line continues an open conditional calculation.
pub fn is_continuation(code: &str) -> bool {
    starts_with_keyword(code, "elif") || starts_with_keyword(code, "else")
}

/// True iff the code line is any conditional branch.
pub fn is_branch_syntax(code: &str) -> bool {
    is_branch_start(code) || is_continuation(code)
}

fn starts_with_keyword(code: &str, keyword: &str) -> bool {
    let code = code.trim_start();
    code.strip_prefix(keyword)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with([' ', ':', '(']))
}

impl Branch {
    /// Parse `keyword condition : assignment` into its parts.
    pub fn parse(code: &str, comment: String) -> Result<Branch, EngineError> {
        let code = code.trim();
        let (keyword, rest) = if let Some(rest) = code.strip_prefix("elif") {
            (Keyword::Elif, rest)
        } else if let Some(rest) = code.strip_prefix("else") {
            (Keyword::Else, rest)
        } else if let Some(rest) = code.strip_prefix("if") {
            (Keyword::If, rest)
        } else {
            return Err(EngineError::syntax(format!(
                "`{code}` is not a conditional branch"
            )));
        };

        let Some((cond_text, body)) = rest.split_once(':') else {
            return Err(EngineError::syntax(format!(
                "conditional branch `{code}` is missing a `:`"
            )));
        };
        let condition = tokenize(cond_text)?;
        if keyword == Keyword::Else && !condition.is_empty() {
            return Err(EngineError::syntax(format!(
                "`else` branch `{code}` must not carry a condition"
            )));
        }
        if keyword != Keyword::Else && condition.is_empty() {
            return Err(EngineError::syntax(format!(
                "conditional branch `{code}` is missing its condition"
            )));
        }

        Ok(Branch {
            keyword,
            condition,
            body: body.trim().to_string(),
            comment,
        })
    }
}

/// Select the first branch whose condition holds and classify its
/// assignment, producing a single conditional line.
pub fn build(
    branches: Vec<Branch>,
    results: &Results,
    mode: Mode,
) -> Result<ConditionalLine, EngineError> {
    for branch in branches {
        if !evaluate(&branch.condition, results)? {
            continue;
        }
        let body = super::classify_line(&branch.body, results, mode)?;
        return Ok(ConditionalLine {
            condition: branch.condition,
            branch: Some(Box::new(body)),
            comment: branch.comment,
            rendered: String::new(),
        });
    }
    // No branch held; the line deliberately produces no output.
    Ok(ConditionalLine {
        condition: Vec::new(),
        branch: None,
        comment: String::new(),
        rendered: String::new(),
    })
}

/// Evaluate a branch condition against the results mapping. Supported
/// shape: `operand cmp operand` with operands being previously computed
/// names or numeric literals; an empty condition (`else`) always holds.
fn evaluate(condition: &[Token], results: &Results) -> Result<bool, EngineError> {
    if condition.is_empty() {
        return Ok(true);
    }
    let [lhs, cmp, rhs] = condition else {
        return Err(EngineError::syntax(format!(
            "unsupported condition `{}`",
            tokens_to_text(condition)
        )));
    };
    let lhs = operand_value(lhs, condition, results)?;
    let rhs = operand_value(rhs, condition, results)?;
    let Token::Op(cmp) = cmp else {
        return Err(EngineError::syntax(format!(
            "unsupported condition `{}`",
            tokens_to_text(condition)
        )));
    };
    match cmp.as_str() {
        "<" => Ok(lhs < rhs),
        "<=" => Ok(lhs <= rhs),
        ">" => Ok(lhs > rhs),
        ">=" => Ok(lhs >= rhs),
        "==" => Ok(lhs == rhs),
        "!=" => Ok(lhs != rhs),
        other => Err(EngineError::syntax(format!(
            "unsupported comparison operator `{other}`"
        ))),
    }
}

fn operand_value(
    token: &Token,
    condition: &[Token],
    results: &Results,
) -> Result<f64, EngineError> {
    match token {
        Token::Number { value, .. } => Ok(*value),
        Token::Symbol(name) => results
            .get(name)
            .copied()
            .ok_or_else(|| EngineError::missing(name, &tokens_to_text(condition))),
        other => Err(EngineError::syntax(format!(
            "`{}` cannot appear as a condition operand",
            other.text()
        ))),
    }
}
