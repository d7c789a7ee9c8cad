//! # calcreport-engine
//!
//! Turns a block of source lines holding arithmetic variable assignments,
//! parameter declarations, conditional calculations and free-text
//! annotations into a Markdown document with embedded aligned math blocks.
//!
//! The pipeline runs one [`Cell`] at a time: classify each line under the
//! cell's [`Mode`], bind previously computed results, substitute numeric
//! forms, render LaTeX, and assemble the block document.

pub mod assemble;
pub mod bind;
pub mod cell;
pub mod classify;
pub mod convert;
pub mod error;
pub mod numeric;
pub mod pipeline;
pub mod render;
pub mod tokens;

// Re-export key types for easier usage
pub use cell::{CalcLine, Cell, ConditionalLine, HeadingLine, Line, Mode, Results, Value};
pub use error::EngineError;
pub use numeric::NumericFormatter;
pub use pipeline::{render_cell, render_report, strip_marker_comment};
pub use render::{FormatOptions, HeadingLevel};
pub use tokens::{Token, tokenize};
