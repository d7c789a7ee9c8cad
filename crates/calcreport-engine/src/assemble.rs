//! Block assembly.
//!
//! Walks the rendered line sequence and produces the final Markdown
//! document: runs of consecutive math lines merge into one delimited
//! aligned block, and every heading/prose line forces a block boundary.

use crate::cell::{Line, Mode};
use crate::render::{HeadingLevel, heading_level};

/// Assemble rendered lines into the ordered block document.
pub fn assemble(lines: &[Line], mode: Mode) -> String {
    let mut blocks: Vec<String> = Vec::new();
    let mut pending_math: Vec<String> = Vec::new();

    for line in lines {
        if line.rendered().is_empty() {
            continue;
        }
        match line {
            Line::Heading(h) => {
                flush_math(&mut blocks, &mut pending_math, mode);
                blocks.push(heading_block(&h.text));
            }
            math => pending_math.push(math.rendered().to_string()),
        }
    }
    flush_math(&mut blocks, &mut pending_math, mode);

    blocks.join("\n\n")
}

/// Merge the pending math lines into one aligned display block.
fn flush_math(blocks: &mut Vec<String>, pending_math: &mut Vec<String>, mode: Mode) {
    if pending_math.is_empty() {
        return;
    }
    let body = pending_math.join(" \\\\\n");
    let block = match mode {
        // Input cells use an inline-math wrapper with a fixed indent.
        Mode::Input => {
            format!("$\n\\hspace{{2em}}\\begin{{aligned}}\n{body}\n\\end{{aligned}}\n$")
        }
        Mode::Standard | Mode::Report => {
            format!("$$\n\\begin{{aligned}}\n{body}\n\\end{{aligned}}\n$$")
        }
    };
    blocks.push(block);
    pending_math.clear();
}

fn heading_block(text: &str) -> String {
    match heading_level(text) {
        HeadingLevel::Sub => format!("### {text}"),
        HeadingLevel::Top => format!("## {text}"),
        HeadingLevel::Paragraph => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{CalcLine, HeadingLine};
    use pretty_assertions::assert_eq;

    fn math_line(rendered: &str) -> Line {
        Line::NumericCalc(CalcLine {
            rendered: rendered.to_string(),
            ..CalcLine::default()
        })
    }

    fn heading(text: &str) -> Line {
        Line::Heading(HeadingLine {
            text: text.to_string(),
            rendered: format!("\\text{{{text}}}"),
        })
    }

    #[test]
    fn consecutive_math_lines_merge_into_one_block() {
        let lines = vec![math_line("a &= 3"), math_line("b &= 4")];
        let doc = assemble(&lines, Mode::Report);
        assert_eq!(
            doc,
            "$$\n\\begin{aligned}\na &= 3 \\\\\nb &= 4\n\\end{aligned}\n$$"
        );
    }

    #[test]
    fn heading_forces_a_block_boundary() {
        let lines = vec![
            math_line("a &= 3"),
            heading("2. Analysis"),
            math_line("b &= 4"),
        ];
        let doc = assemble(&lines, Mode::Report);
        let blocks: Vec<&str> = doc.split("\n\n").collect();
        assert_eq!(blocks.len(), 3);
        assert!(blocks[0].starts_with("$$"));
        assert_eq!(blocks[1], "## 2. Analysis");
        assert!(blocks[2].starts_with("$$"));
    }

    #[test]
    fn heading_levels_map_to_markdown_markers() {
        let lines = vec![
            heading("1.2 Load Combination"),
            heading("2. Analysis"),
            heading("Summary"),
        ];
        let doc = assemble(&lines, Mode::Report);
        assert_eq!(doc, "### 1.2 Load Combination\n\n## 2. Analysis\n\nSummary");
    }

    #[test]
    fn empty_rendered_lines_are_dropped() {
        let lines = vec![
            Line::Blank,
            math_line("a &= 3"),
            Line::NumericCalc(CalcLine::default()),
            math_line("b &= 4"),
        ];
        let doc = assemble(&lines, Mode::Report);
        // The unrendered line between the two must not split the block.
        assert_eq!(doc.matches("$$").count(), 2);
        assert!(doc.contains("a &= 3 \\\\\nb &= 4"));
    }

    #[test]
    fn input_mode_wraps_math_inline_with_indent() {
        let lines = vec![math_line("a &= 3")];
        let doc = assemble(&lines, Mode::Input);
        assert_eq!(
            doc,
            "$\n\\hspace{2em}\\begin{aligned}\na &= 3\n\\end{aligned}\n$"
        );
    }

    #[test]
    fn trailing_math_is_flushed_at_end_of_input() {
        let lines = vec![heading("Summary"), math_line("a &= 3")];
        let doc = assemble(&lines, Mode::Report);
        assert!(doc.ends_with("\\end{aligned}\n$$"));
    }

    #[test]
    fn no_lines_yields_an_empty_document() {
        assert_eq!(assemble(&[], Mode::Report), "");
    }
}
