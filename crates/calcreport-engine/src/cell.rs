//! Cell and line data model.
//!
//! A cell is one contiguous block of source lines processed together under
//! one mode and one results mapping. Each source line is classified into a
//! [`Line`] variant, then moved through the binder, converter, renderer and
//! assembler stages in place.

use std::collections::BTreeMap;

use crate::tokens::Token;

/// A computed numeric result supplied by the caller.
pub type Value = f64;

/// Read-only `name -> value` mapping of previously evaluated calculations.
pub type Results = BTreeMap<String, Value>;

/// Classification ruleset selector for a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Strict: unrecognized lines are a grammar error.
    Standard,
    /// Report document: unrecognized code degrades to a long calculation,
    /// free-form text degrades to prose.
    Report,
    /// Input echo: declarations are displayed as `name = value`.
    Input,
}

impl Mode {
    pub fn parse(s: &str) -> Option<Mode> {
        match s {
            "standard" => Some(Mode::Standard),
            "report" => Some(Mode::Report),
            "input" => Some(Mode::Input),
            _ => None,
        }
    }
}

/// Shared payload of every calculation-producing line kind.
///
/// `rendered` stays empty until the render stage has run; an empty
/// `rendered` after rendering means the line produces no output.
#[derive(Debug, Clone, Default)]
pub struct CalcLine {
    /// Symbolic form as tokenized from the source.
    pub tokens: Vec<Token>,
    /// Numeric form with result values substituted for symbols.
    pub substituted: Vec<Token>,
    /// Value of the declared name, attached by the binder.
    pub result: Option<Value>,
    /// Trailing annotation text, empty if none.
    pub comment: String,
    /// Typeset output, filled by the renderer.
    pub rendered: String,
}

impl CalcLine {
    pub fn new(tokens: Vec<Token>, comment: String) -> Self {
        CalcLine {
            tokens,
            comment,
            ..CalcLine::default()
        }
    }
}

/// A prose or heading line. The text is stored with its leading `#`
/// markers already stripped; the heading level is detected at render time.
#[derive(Debug, Clone)]
pub struct HeadingLine {
    pub text: String,
    pub rendered: String,
}

/// A resolved conditional calculation: the branch whose condition held
/// against the results mapping, or no branch at all (which renders empty
/// and is dropped at assembly).
#[derive(Debug, Clone)]
pub struct ConditionalLine {
    pub condition: Vec<Token>,
    pub branch: Option<Box<Line>>,
    pub comment: String,
    pub rendered: String,
}

/// Tagged union over the line kinds the classifier can produce.
#[derive(Debug, Clone)]
pub enum Line {
    Blank,
    Heading(HeadingLine),
    Parameter(CalcLine),
    NumericCalc(CalcLine),
    LongCalc(CalcLine),
    Conditional(ConditionalLine),
    InputDeclaration(CalcLine),
}

impl Line {
    /// Typeset output of the line; empty until rendered, and empty after
    /// rendering for lines that deliberately produce no output.
    pub fn rendered(&self) -> &str {
        match self {
            Line::Blank => "",
            Line::Heading(h) => &h.rendered,
            Line::Conditional(c) => &c.rendered,
            Line::Parameter(c)
            | Line::NumericCalc(c)
            | Line::LongCalc(c)
            | Line::InputDeclaration(c) => &c.rendered,
        }
    }
}

/// One cell moving through the pipeline.
#[derive(Debug)]
pub struct Cell {
    pub source: String,
    pub mode: Mode,
    pub results: Results,
    pub lines: Vec<Line>,
    /// Cell-level precision override, falling back to the configured value.
    pub precision: Option<usize>,
    /// Cell-level scientific-notation override.
    pub scientific_notation: Option<bool>,
    /// Final Markdown document, filled by the assembler.
    pub document: String,
}

impl Cell {
    pub fn new(source: impl Into<String>, results: Results, mode: Mode) -> Self {
        Cell {
            source: source.into(),
            mode,
            results,
            lines: Vec::new(),
            precision: None,
            scientific_notation: None,
            document: String::new(),
        }
    }
}
