//! Precision/notation rendering.
//!
//! Turns each classified line's tokens into its typeset LaTeX string,
//! honoring precision, scientific notation and decimal-separator
//! configuration. Assignment `=` signs become `&=` alignment markers so
//! stacked lines line up in the final aligned block.

use std::sync::OnceLock;

use regex::Regex;

use crate::cell::{CalcLine, Line};
use crate::numeric::{NumericFormatter, format_scientific, round_value, swap_decimal_separator};
use crate::tokens::Token;

/// Per-run output configuration.
#[derive(Debug, Clone)]
pub struct FormatOptions {
    pub display_precision: usize,
    pub use_scientific_notation: bool,
    pub decimal_separator: String,
    /// Token separating the stacked steps of a long calculation.
    pub line_break: String,
    /// Spacing token placed before an inline comment.
    pub comment_space: String,
    pub formatter: NumericFormatter,
}

impl Default for FormatOptions {
    fn default() -> Self {
        FormatOptions {
            display_precision: 3,
            use_scientific_notation: false,
            decimal_separator: ".".to_string(),
            line_break: "\\\\".to_string(),
            comment_space: "\\;".to_string(),
            formatter: NumericFormatter::Latex,
        }
    }
}

/// Heading levels recognized from a numbered heading prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingLevel {
    /// `1.` style top-level heading.
    Top,
    /// `1.1` style sub-heading.
    Sub,
    /// Plain description text.
    Paragraph,
}

static SUB_HEADING_RE: OnceLock<Regex> = OnceLock::new();
static TOP_HEADING_RE: OnceLock<Regex> = OnceLock::new();

/// Detect the heading level of stripped heading text. The dotted
/// two-level pattern is tested first: `1.1 Loads` is a sub-heading while
/// `1. Loads` is a top heading.
pub fn heading_level(text: &str) -> HeadingLevel {
    let sub = SUB_HEADING_RE.get_or_init(|| Regex::new(r"^\d+\.\d+").expect("Invalid heading regex"));
    let top = TOP_HEADING_RE.get_or_init(|| Regex::new(r"^\d+\.").expect("Invalid heading regex"));
    if sub.is_match(text) {
        HeadingLevel::Sub
    } else if top.is_match(text) {
        HeadingLevel::Top
    } else {
        HeadingLevel::Paragraph
    }
}

/// Render one line's typeset output, resolving numeric tokens under the
/// given precision and notation.
pub fn render_line(line: &mut Line, precision: usize, scientific: bool, options: &FormatOptions) {
    let ctx = RenderCtx {
        precision,
        scientific,
        options,
    };
    match line {
        Line::Blank => {}
        Line::Heading(h) => h.rendered = ctx.heading(&h.text),
        Line::Parameter(c) => c.rendered = ctx.parameter(c),
        Line::NumericCalc(c) => c.rendered = ctx.numeric_calc(c),
        Line::LongCalc(c) => c.rendered = ctx.long_calc(c),
        Line::InputDeclaration(c) => c.rendered = ctx.input_declaration(c),
        Line::Conditional(cond) => {
            if let Some(branch) = cond.branch.as_deref_mut() {
                render_line(branch, precision, scientific, options);
                let branch_tex = branch.rendered().to_string();
                cond.rendered = format!(
                    "&\\text{{Since, }} {}: {} {}{}",
                    ctx.tokens(&cond.condition, false),
                    options.line_break,
                    branch_tex,
                    ctx.comment_suffix(&cond.comment),
                );
            }
            // No selected branch: rendered stays empty and the line is
            // dropped at assembly.
        }
    }
}

struct RenderCtx<'a> {
    precision: usize,
    scientific: bool,
    options: &'a FormatOptions,
}

impl RenderCtx<'_> {
    fn value(&self, v: f64) -> String {
        let formatted = if self.scientific {
            format_scientific(v, self.precision, self.options.formatter)
        } else {
            round_value(v, self.precision).to_string()
        };
        swap_decimal_separator(&formatted, &self.options.decimal_separator)
    }

    /// Render a token sequence. With `align` set, the first `=` becomes
    /// the `&=` alignment marker.
    fn tokens(&self, tokens: &[Token], align: bool) -> String {
        let mut pieces: Vec<String> = Vec::new();
        let mut aligned = !align;
        let mut iter = tokens.iter();
        while let Some(token) = iter.next() {
            match token {
                Token::Symbol(name) => pieces.push(latex_symbol(name)),
                Token::Number { value, .. } => pieces.push(self.value(*value)),
                Token::OpenParen => pieces.push("\\left(".to_string()),
                Token::CloseParen => pieces.push("\\right)".to_string()),
                Token::Op(op) => match op.as_str() {
                    "=" if !aligned => {
                        aligned = true;
                        pieces.push("&=".to_string());
                    }
                    "*" => pieces.push("\\cdot".to_string()),
                    "**" => {
                        // Exponent binds to the following operand; a
                        // parenthesized operand moves into the superscript
                        // whole, without its outer parens.
                        let exponent = match iter.next() {
                            Some(Token::OpenParen) => {
                                self.tokens(&balanced_group(&mut iter), false)
                            }
                            Some(t) => self.single_token(t),
                            None => String::new(),
                        };
                        match pieces.last_mut() {
                            Some(base) => base.push_str(&format!(" ^ {{{exponent}}}")),
                            None => pieces.push(format!("^ {{{exponent}}}")),
                        }
                    }
                    "<" => pieces.push("\\lt".to_string()),
                    ">" => pieces.push("\\gt".to_string()),
                    "<=" => pieces.push("\\leq".to_string()),
                    ">=" => pieces.push("\\geq".to_string()),
                    "==" => pieces.push("=".to_string()),
                    "!=" => pieces.push("\\neq".to_string()),
                    other => pieces.push(other.to_string()),
                },
            }
        }
        pieces.join(" ")
    }

    fn single_token(&self, token: &Token) -> String {
        match token {
            Token::Symbol(name) => latex_symbol(name),
            Token::Number { value, .. } => self.value(*value),
            other => other.text().to_string(),
        }
    }

    fn comment_suffix(&self, comment: &str) -> String {
        if comment.is_empty() {
            return String::new();
        }
        format!(" {} \\textrm{{({comment})}}", self.options.comment_space)
    }

    fn parameter(&self, c: &CalcLine) -> String {
        let Some(name) = c.tokens.first().and_then(Token::as_symbol) else {
            return String::new();
        };
        let Some(value) = c.result else {
            return String::new();
        };
        format!(
            "{} &= {}{}",
            latex_symbol(name),
            self.value(value),
            self.comment_suffix(&c.comment)
        )
    }

    fn numeric_calc(&self, c: &CalcLine) -> String {
        let Some(eq) = c.tokens.iter().position(|t| t.is_op("=")) else {
            return String::new();
        };
        let lhs = self.tokens(&c.tokens[..eq], false);
        let rhs = &c.tokens[eq + 1..];
        let result = c.result.map(|v| self.value(v));
        match (rhs, result) {
            // A bare number needs no repeated result.
            ([Token::Number { .. }], Some(value)) => {
                format!("{lhs} &= {value}{}", self.comment_suffix(&c.comment))
            }
            (_, Some(value)) => format!(
                "{lhs} &= {} = {value}{}",
                self.tokens(rhs, false),
                self.comment_suffix(&c.comment)
            ),
            (_, None) => format!(
                "{lhs} &= {}{}",
                self.tokens(rhs, false),
                self.comment_suffix(&c.comment)
            ),
        }
    }

    fn long_calc(&self, c: &CalcLine) -> String {
        let Some(eq) = c.tokens.iter().position(|t| t.is_op("=")) else {
            // Free-form code kept as a symbolic calculation: bare display
            // with the alignment marker applied positionally.
            return format!(
                "& {}{}",
                self.bare_display(&c.tokens),
                self.comment_suffix(&c.comment)
            );
        };
        let lb = &self.options.line_break;
        let lhs = self.tokens(&c.tokens[..eq], false);
        let symbolic = self.tokens(&c.tokens[eq + 1..], false);
        let numeric = if c.substituted.len() > eq {
            self.tokens(&c.substituted[eq + 1..], false)
        } else {
            symbolic.clone()
        };
        let mut rendered = format!("{lhs} &= {symbolic} {lb} &= {numeric}");
        if let Some(value) = c.result {
            rendered.push_str(&format!(" {lb} &= {}", self.value(value)));
        }
        rendered.push_str(&self.comment_suffix(&c.comment));
        rendered
    }

    fn input_declaration(&self, c: &CalcLine) -> String {
        if c.tokens.iter().any(|t| t.is_op("=")) {
            return format!(
                "{}{}",
                self.tokens(&c.tokens, true),
                self.comment_suffix(&c.comment)
            );
        }
        let tokens = if c.substituted.is_empty() {
            &c.tokens
        } else {
            &c.substituted
        };
        format!(
            "& {}{}",
            self.bare_display(tokens),
            self.comment_suffix(&c.comment)
        )
    }

    /// Join rendered tokens with the comment-space token so bare symbol
    /// displays keep their spacing inside math mode.
    fn bare_display(&self, tokens: &[Token]) -> String {
        tokens
            .iter()
            .map(|t| self.single_token(t))
            .collect::<Vec<_>>()
            .join(&format!(" {} ", self.options.comment_space))
    }

    /// Math-centric heading style: each level maps to a distinct size and
    /// indent.
    fn heading(&self, text: &str) -> String {
        let (indent_em, size, brk) = match heading_level(text) {
            HeadingLevel::Sub => (2, "\\large ", format!("{}\n", self.options.line_break)),
            HeadingLevel::Top => (0, "\\Large ", format!("{}\n", self.options.line_break)),
            HeadingLevel::Paragraph => (4, "\\small ", "\\\\".to_string()),
        };
        format!("\\hspace{{{indent_em}em}}\\text{{\\textbf{{{size}{text}}}}}{brk}")
    }
}

/// Collect the tokens up to the parenthesis matching an already consumed
/// opening one.
fn balanced_group<'a>(iter: &mut impl Iterator<Item = &'a Token>) -> Vec<Token> {
    let mut depth = 1usize;
    let mut group = Vec::new();
    for token in iter {
        match token {
            Token::OpenParen => depth += 1,
            Token::CloseParen => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            _ => {}
        }
        group.push(token.clone());
    }
    group
}

/// Greek letter names rendered with their LaTeX commands.
const GREEK: [&str; 36] = [
    "alpha", "beta", "gamma", "delta", "epsilon", "zeta", "eta", "theta", "iota", "kappa",
    "lambda", "mu", "nu", "xi", "pi", "rho", "sigma", "tau", "upsilon", "phi", "chi", "psi",
    "omega", "Gamma", "Delta", "Theta", "Lambda", "Xi", "Pi", "Sigma", "Upsilon", "Phi", "Psi",
    "Omega", "nabla", "infty",
];

/// Typeset a symbol name: Greek words get their LaTeX command and the
/// first underscore starts a subscript group.
pub fn latex_symbol(name: &str) -> String {
    match name.split_once('_') {
        Some((base, sub)) => format!("{}_{{{}}}", greek(base), greek(sub)),
        None => greek(name),
    }
}

fn greek(word: &str) -> String {
    if GREEK.contains(&word) {
        format!("\\{word}")
    } else {
        word.to_string()
    }
}
