//! Line classification.
//!
//! Assigns each raw source line to one of the [`Line`] kinds under a given
//! cell [`Mode`]. Classification is a first-match-wins walk through an
//! ordered test list; the three mode-specific lists are kept side by side
//! below so their priority differences stay auditable.

pub mod conditional;

use crate::cell::{CalcLine, Cell, HeadingLine, Line, Mode, Results};
use crate::error::EngineError;
use crate::tokens::{Token, tokenize};

/// Mode-independent pre-classification of a raw source line.
#[derive(Debug, Clone, PartialEq)]
pub enum Preclass {
    /// Whitespace-only, comment-only, or explicitly ignored line.
    Blank,
    /// Heading/prose line; text with leading `#` markers stripped.
    Heading(String),
    /// Code with its trailing annotation split off.
    Code { code: String, comment: String },
}

/// Apply the mode-independent tests: blank, heading marker, comment-only,
/// `ignore` suffix, then comment extraction.
pub fn preclassify(raw: &str) -> Preclass {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Preclass::Blank;
    }
    if trimmed.starts_with("##") {
        // The whole remainder is heading text; no comment extraction.
        return Preclass::Heading(trimmed.trim_start_matches('#').trim().to_string());
    }
    if trimmed.starts_with('#') {
        return Preclass::Blank;
    }
    if trimmed.ends_with("ignore") {
        return Preclass::Blank;
    }
    let (code, comment) = split_comment(trimmed);
    Preclass::Code {
        code: code.trim().to_string(),
        comment: comment.trim().to_string(),
    }
}

/// Split a line on its first unescaped `#` into `(code, comment)`.
fn split_comment(line: &str) -> (&str, &str) {
    let mut prev = '\0';
    for (i, ch) in line.char_indices() {
        if ch == '#' && prev != '\\' {
            return (&line[..i], &line[i + 1..]);
        }
        prev = ch;
    }
    (line, "")
}

/// Classify one raw source line in isolation.
///
/// A conditional branch line classifies on its own; branch grouping across
/// sibling lines happens in [`categorize_source`].
pub fn classify_line(raw: &str, results: &Results, mode: Mode) -> Result<Line, EngineError> {
    match preclassify(raw) {
        Preclass::Code { code, comment } if conditional::is_branch_start(&code) => {
            let branch = conditional::Branch::parse(&code, comment)?;
            Ok(Line::Conditional(conditional::build(
                vec![branch],
                results,
                mode,
            )?))
        }
        pre => classify_preclassified(pre, results, mode),
    }
}

/// Classify every line of the cell source, grouping conditional branch
/// lines and binding declared-name results along the way.
pub fn categorize_source(cell: &mut Cell) -> Result<(), EngineError> {
    let source = cell.source.trim_end().to_string();
    let mut out = Vec::new();
    let mut iter = source.split('\n').peekable();

    while let Some(raw) = iter.next() {
        let line = match preclassify(raw) {
            Preclass::Code { code, comment } if conditional::is_branch_start(&code) => {
                let mut branches = vec![conditional::Branch::parse(&code, comment)?];
                while let Some(next) = iter.peek() {
                    match preclassify(next) {
                        Preclass::Code { code, comment }
                            if conditional::is_continuation(&code) =>
                        {
                            branches.push(conditional::Branch::parse(&code, comment)?);
                            iter.next();
                        }
                        _ => break,
                    }
                }
                Line::Conditional(conditional::build(branches, &cell.results, cell.mode)?)
            }
            pre => classify_preclassified(pre, &cell.results, cell.mode)?,
        };
        let line = crate::bind::bind_result(line, &cell.results)?;
        out.push(line);
    }

    cell.lines = out;
    Ok(())
}

fn classify_preclassified(
    pre: Preclass,
    results: &Results,
    mode: Mode,
) -> Result<Line, EngineError> {
    match pre {
        Preclass::Blank => Ok(Line::Blank),
        Preclass::Heading(text) => Ok(Line::Heading(HeadingLine {
            text,
            rendered: String::new(),
        })),
        Preclass::Code { code, comment } => match mode {
            Mode::Input => classify_input_code(&code, comment, results),
            Mode::Report => classify_report_code(&code, comment, results),
            Mode::Standard => classify_standard_code(&code, comment, results),
        },
    }
}

// The three mode tables. Order matters; first match wins.

/// `input`: heading, conditional, input declaration, numeric, `=`,
/// fallback prose. Never a grammar error.
fn classify_input_code(
    code: &str,
    comment: String,
    results: &Results,
) -> Result<Line, EngineError> {
    if code.starts_with("##") {
        return Ok(Line::Heading(HeadingLine {
            text: code.trim_start_matches('#').trim().to_string(),
            rendered: String::new(),
        }));
    }
    if conditional::is_branch_syntax(code) {
        return classify_line_conditional(code, comment, results, Mode::Input);
    }
    if test_for_input_line(code) {
        let tokens = split_input_line(code, results)?;
        return Ok(Line::InputDeclaration(CalcLine::new(tokens, comment)));
    }
    // Narrative text that does not tokenize stays prose.
    let Ok(tokens) = tokenize(code) else {
        return Ok(prose(code));
    };
    if test_for_numeric_line(&tokens) {
        return Ok(Line::NumericCalc(CalcLine::new(tokens, comment)));
    }
    if tokens.iter().any(|t| t.is_op("=")) {
        return Ok(Line::LongCalc(CalcLine::new(tokens, comment)));
    }
    Ok(prose(code))
}

/// `report`: parameter, conditional, numeric, fallback long calculation;
/// lines that do not tokenize degrade to prose. Never an error.
fn classify_report_code(
    code: &str,
    comment: String,
    results: &Results,
) -> Result<Line, EngineError> {
    if test_for_parameter_line(code) {
        return Ok(Line::Parameter(CalcLine::new(tokenize(code)?, comment)));
    }
    if conditional::is_branch_syntax(code) {
        return classify_line_conditional(code, comment, results, Mode::Report);
    }
    // Narrative text that does not tokenize stays prose.
    let Ok(tokens) = tokenize(code) else {
        return Ok(prose(code));
    };
    if test_for_numeric_line(&tokens) {
        return Ok(Line::NumericCalc(CalcLine::new(tokens, comment)));
    }
    Ok(Line::LongCalc(CalcLine::new(tokens, comment)))
}

/// `standard`: blank literal, parameter, conditional, numeric, `=`,
/// single token; anything else is a grammar error.
fn classify_standard_code(
    code: &str,
    comment: String,
    results: &Results,
) -> Result<Line, EngineError> {
    if code.trim().is_empty() {
        return Ok(Line::Blank);
    }
    if test_for_parameter_line(code) {
        return Ok(Line::Parameter(CalcLine::new(tokenize(code)?, comment)));
    }
    if conditional::is_branch_syntax(code) {
        return classify_line_conditional(code, comment, results, Mode::Standard);
    }
    let tokens = tokenize(code)?;
    if test_for_numeric_line(&tokens) {
        return Ok(Line::NumericCalc(CalcLine::new(tokens, comment)));
    }
    if tokens.iter().any(|t| t.is_op("=")) {
        return Ok(Line::LongCalc(CalcLine::new(tokens, comment)));
    }
    if tokens.len() == 1 {
        return Ok(Line::Parameter(CalcLine::new(tokens, comment)));
    }
    Err(EngineError::Grammar {
        line: code.to_string(),
    })
}

fn prose(code: &str) -> Line {
    Line::Heading(HeadingLine {
        text: code.to_string(),
        rendered: String::new(),
    })
}

fn classify_line_conditional(
    code: &str,
    comment: String,
    results: &Results,
    mode: Mode,
) -> Result<Line, EngineError> {
    let branch = conditional::Branch::parse(code, comment)?;
    Ok(Line::Conditional(conditional::build(
        vec![branch],
        results,
        mode,
    )?))
}

// Grammar predicates.

/// True iff the line declares a value rather than performs a multi-term
/// calculation: an `=` assignment whose right-hand side reduces to a
/// single term.
pub fn test_for_parameter_line(code: &str) -> bool {
    if conditional::is_branch_syntax(code) || code.contains(':') {
        return false;
    }
    let Ok(tokens) = tokenize(code) else {
        return false;
    };
    // The assignment `=` must be its own token; the `=` inside a
    // comparison operator does not count.
    let Some(eq) = tokens.iter().position(|t| t.is_op("=")) else {
        return false;
    };
    is_single_term(&tokens[eq + 1..])
}

/// True iff the line is a bare single token (echo of a computed value) or
/// a parameter-shaped assignment.
pub fn test_for_input_line(code: &str) -> bool {
    if test_for_parameter_line(code) {
        return true;
    }
    matches!(tokenize(code).as_deref(), Ok([Token::Symbol(_)]))
}

/// True iff, dropping the declared name and its `=`, the remaining token
/// sequence contains no symbolic operands, so the calculation renders
/// directly as `name = number` with no separate symbolic-display step.
pub fn test_for_numeric_line(tokens: &[Token]) -> bool {
    let Some(eq) = tokens.iter().position(|t| t.is_op("=")) else {
        return false;
    };
    let rhs = &tokens[eq + 1..];
    !rhs.is_empty() && rhs.iter().all(|t| !matches!(t, Token::Symbol(_)))
}

/// A single term: one operand token, a parenthesis-wrapped single term,
/// or a unary-minus number.
fn is_single_term(tokens: &[Token]) -> bool {
    match tokens {
        [t] => !matches!(t, Token::Op(_)),
        [Token::Op(op), Token::Number { .. }] if op == "-" => true,
        [Token::OpenParen, inner @ .., Token::CloseParen] => is_single_term(inner),
        _ => false,
    }
}

/// Resolve an input declaration at classification time: attach the
/// previously computed value of the declared name.
fn split_input_line(code: &str, results: &Results) -> Result<Vec<Token>, EngineError> {
    let tokens = tokenize(code)?;
    if !tokens.iter().any(|t| t.is_op("=")) {
        // Bare echo; the converter substitutes the value.
        return Ok(tokens);
    }
    let Some(name) = tokens.first().and_then(Token::as_symbol) else {
        return Ok(tokens);
    };
    let value = results
        .get(name)
        .copied()
        .ok_or_else(|| EngineError::missing(name, code))?;
    Ok(vec![
        Token::Symbol(name.to_string()),
        Token::Op("=".to_string()),
        Token::number(value),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn results() -> Results {
        let mut r = Results::new();
        r.insert("q".to_string(), 9.0);
        r.insert("a".to_string(), 5.0);
        r.insert("p".to_string(), 5.0);
        r.insert("x".to_string(), 3.0);
        r.insert("y".to_string(), 6.0);
        r
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("# a plain comment")]
    #[case("x = 5 # ignore")]
    #[case("anything at all ignore")]
    fn blank_and_ignored_lines(#[case] raw: &str) {
        for mode in [Mode::Standard, Mode::Report, Mode::Input] {
            let line = classify_line(raw, &results(), mode).unwrap();
            assert!(matches!(line, Line::Blank), "{raw:?} under {mode:?}");
        }
    }

    #[test]
    fn heading_keeps_whole_remainder() {
        assert_eq!(
            preclassify("## 1.2 Load Combination # not a comment"),
            Preclass::Heading("1.2 Load Combination # not a comment".to_string())
        );
    }

    #[test]
    fn comment_split_honours_escape() {
        assert_eq!(
            preclassify(r"x = 5 \# kPa # note"),
            Preclass::Code {
                code: r"x = 5 \# kPa".to_string(),
                comment: "note".to_string(),
            }
        );
    }

    #[test]
    fn bare_assigned_name_is_a_parameter_in_standard_mode() {
        let line = classify_line("q", &results(), Mode::Standard).unwrap();
        assert!(matches!(line, Line::Parameter(_)));
    }

    #[test]
    fn unrecognized_standard_line_is_a_grammar_error() {
        let err = classify_line("q ~ 3", &results(), Mode::Standard).unwrap_err();
        assert!(matches!(err, EngineError::Grammar { .. }));
        assert!(err.to_string().contains("q ~ 3"));
    }

    #[rstest]
    #[case("q ~ 3")]
    #[case("some free narrative text")]
    #[case("F = m * a")]
    #[case("a = 5")]
    #[case("see section 3.2.1 for details")]
    #[case("governing case (see appendix")]
    fn report_mode_never_raises_grammar_errors(#[case] raw: &str) {
        assert!(classify_line(raw, &results(), Mode::Report).is_ok());
    }

    #[rstest]
    #[case("see section 3.2.1 for details")]
    #[case("governing case (see appendix")]
    fn untokenizable_narrative_degrades_to_prose(#[case] raw: &str) {
        for mode in [Mode::Report, Mode::Input] {
            let line = classify_line(raw, &results(), mode).unwrap();
            match line {
                Line::Heading(h) => assert_eq!(h.text, raw),
                other => panic!("expected prose under {mode:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn bare_comparison_is_not_a_parameter() {
        assert!(!test_for_parameter_line("a <= 5"));
        assert!(!test_for_parameter_line("a == 5"));
        let err = classify_line("a <= 5", &results(), Mode::Standard).unwrap_err();
        assert!(matches!(err, EngineError::Grammar { .. }));
    }

    #[test]
    fn report_mode_prefers_parameter_over_long_calc() {
        let line = classify_line("p = 5 # load", &results(), Mode::Report).unwrap();
        match line {
            Line::Parameter(c) => assert_eq!(c.comment, "load"),
            other => panic!("expected parameter, got {other:?}"),
        }
    }

    #[test]
    fn report_mode_fallback_is_a_long_calc() {
        let line = classify_line("q ~ 3", &results(), Mode::Report).unwrap();
        assert!(matches!(line, Line::LongCalc(_)));
    }

    #[test]
    fn numeric_calc_wins_over_long_calc() {
        let line = classify_line("a = 2 + 3", &results(), Mode::Report).unwrap();
        assert!(matches!(line, Line::NumericCalc(_)));
    }

    #[test]
    fn symbolic_rhs_is_a_long_calc() {
        let line = classify_line("y = x * 2", &results(), Mode::Standard).unwrap();
        assert!(matches!(line, Line::LongCalc(_)));
    }

    #[test]
    fn input_mode_echoes_declarations() {
        let line = classify_line("a = 5", &results(), Mode::Input).unwrap();
        match line {
            Line::InputDeclaration(c) => {
                assert_eq!(c.tokens.len(), 3);
                assert_eq!(c.tokens[2], Token::number(5.0));
            }
            other => panic!("expected input declaration, got {other:?}"),
        }
    }

    #[test]
    fn input_mode_falls_back_to_prose() {
        let line = classify_line("governing load case", &results(), Mode::Input).unwrap();
        match line {
            Line::Heading(h) => assert_eq!(h.text, "governing load case"),
            other => panic!("expected prose heading, got {other:?}"),
        }
    }

    #[test]
    fn parameter_test_accepts_wrapped_and_unary_forms() {
        assert!(test_for_parameter_line("a = 5"));
        assert!(test_for_parameter_line("a = (5)"));
        assert!(test_for_parameter_line("a = -5"));
        assert!(test_for_parameter_line("a = q"));
        assert!(!test_for_parameter_line("a = q + 1"));
        assert!(!test_for_parameter_line("if a = 5"));
        assert!(!test_for_parameter_line("a"));
    }

    #[test]
    fn numeric_test_requires_an_assignment() {
        assert!(test_for_numeric_line(&tokenize("a = 2 + 3").unwrap()));
        assert!(!test_for_numeric_line(&tokenize("q").unwrap()));
        assert!(!test_for_numeric_line(&tokenize("y = x + 1").unwrap()));
        assert!(!test_for_numeric_line(&tokenize("a =").unwrap()));
    }

    #[test]
    fn categorize_source_groups_conditional_branches() {
        let mut cell = Cell::new(
            "p = 5\nif x > 4: y = x * 2\nelse: y = x\nq",
            results(),
            Mode::Report,
        );
        categorize_source(&mut cell).unwrap();
        assert_eq!(cell.lines.len(), 3);
        assert!(matches!(cell.lines[0], Line::Parameter(_)));
        assert!(matches!(cell.lines[1], Line::Conditional(_)));
    }

    #[test]
    fn categorize_source_reports_missing_results() {
        let mut cell = Cell::new("w = 2 + 2", Results::new(), Mode::Report);
        let err = categorize_source(&mut cell).unwrap_err();
        match err {
            EngineError::MissingResult { name, .. } => assert_eq!(name, "w"),
            other => panic!("expected missing result, got {other:?}"),
        }
    }
}
