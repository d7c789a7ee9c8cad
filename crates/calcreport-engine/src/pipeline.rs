//! Cell pipeline.
//!
//! Sequences the stages for one cell: strip the cell-mode marker,
//! classify and bind each line, substitute numeric forms, render, and
//! assemble the block document.

use crate::assemble::assemble;
use crate::cell::{Cell, Mode, Results};
use crate::classify::categorize_source;
use crate::convert::convert_line;
use crate::error::EngineError;
use crate::render::{FormatOptions, render_line};

/// Remove a leading cell-mode marker comment (`# %%…` tag line) before
/// the source reaches the classifier.
pub fn strip_marker_comment(source: &str) -> &str {
    let Some(first) = source.lines().next() else {
        return source;
    };
    let trimmed = first.trim();
    if trimmed.starts_with('#') && trimmed.trim_start_matches('#').trim_start().starts_with("%%") {
        source.split_once('\n').map_or("", |(_, rest)| rest)
    } else {
        source
    }
}

/// Run the full pipeline for one cell, storing and returning the final
/// Markdown document.
pub fn render_cell(cell: &mut Cell, options: &FormatOptions) -> Result<String, EngineError> {
    categorize_source(cell)?;

    let precision = cell.precision.unwrap_or(options.display_precision);
    let scientific = cell
        .scientific_notation
        .unwrap_or(options.use_scientific_notation);

    let lines = std::mem::take(&mut cell.lines);
    let mut rendered = Vec::with_capacity(lines.len());
    for line in lines {
        let mut line = convert_line(line, &cell.results)?;
        render_line(&mut line, precision, scientific, options);
        rendered.push(line);
    }
    cell.lines = rendered;

    cell.document = assemble(&cell.lines, cell.mode);
    Ok(cell.document.clone())
}

/// Convenience entry point: render one source block against a results
/// mapping.
pub fn render_report(
    source: &str,
    results: Results,
    mode: Mode,
    precision: Option<usize>,
    scientific: Option<bool>,
    options: &FormatOptions,
) -> Result<String, EngineError> {
    let mut cell = Cell::new(strip_marker_comment(source), results, mode);
    cell.precision = precision;
    cell.scientific_notation = scientific;
    render_cell(&mut cell, options)
}
