#![forbid(unsafe_code)]
//! Spark Report turns multi-persona ideation Markdown into one self-contained
//! HTML page with sidebar navigation, scroll spy and print styling.
//!
//! # Example
//!
//! ```no_run
//! let markdown = "# Spark Report: Pricing\n\n## Seed: Ava\n\n### Tiered plans\n\nStart small.";
//! let html = spark_report::convert_markdown_to_html(markdown, &spark_report::ReportOptions::default());
//! assert!(html.contains("persona-section"));
//! ```

pub mod inline;
pub mod metadata;
pub mod parser;
pub mod persona;
pub mod render;

use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::Path;

pub use metadata::Metadata;
pub use parser::{Document, Phase, TocEntry, parse_markdown};
pub use persona::{PersonaColor, PersonaPalette};
pub use render::render_html;

pub const DEFAULT_MERMAID_SRC: &str = "https://cdn.jsdelivr.net/npm/mermaid@11/dist/mermaid.min.js";

/// Page-level text and asset locations used when assembling a report.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// `<title>` when the document has no level-1 heading.
    pub default_title: String,
    /// Stripped from the start of the visible heading.
    pub title_prefix: String,
    pub brand: String,
    pub eyebrow: String,
    pub footer: String,
    pub mermaid_src: String,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            default_title: "Spark Report".to_string(),
            title_prefix: "Spark Report:".to_string(),
            brand: "SPARK".to_string(),
            eyebrow: "SPARK REPORT".to_string(),
            footer: "Generated by Spark".to_string(),
            mermaid_src: DEFAULT_MERMAID_SRC.to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("no input: pass a Markdown file or pipe one on standard input")]
    MissingInput,
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, ReportError>;

/// Converts a Markdown report into a complete HTML page.
///
/// Persona colors are allocated per call, so repeated conversions in one
/// process never share persona identities.
pub fn convert_markdown_to_html(markdown: &str, options: &ReportOptions) -> String {
    let mut palette = PersonaPalette::new();
    let document = parse_markdown(markdown, &mut palette);
    render_html(&document, &palette, options)
}

/// Reads the whole input from `path`, or from standard input when the path is
/// absent or `-`.
pub fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => Ok(fs::read_to_string(path)?),
        _ => {
            let mut stdin = io::stdin();
            if stdin.is_terminal() {
                return Err(ReportError::MissingInput);
            }
            let mut buf = String::new();
            stdin.read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversions_do_not_share_persona_colors() {
        let options = ReportOptions::default();
        let first = convert_markdown_to_html("## Seed: Ava\n### One\n", &options);
        let second = convert_markdown_to_html("## Seed: Kai\n### One\n", &options);
        assert!(first.contains("persona-section persona-teal"));
        assert!(second.contains("persona-section persona-teal"));
        assert!(!second.contains("persona-amber"));
    }

    #[test]
    fn empty_document_uses_default_title() {
        let html = convert_markdown_to_html("", &ReportOptions::default());
        assert!(html.contains("<title>Spark Report</title>"));
        assert!(!html.contains("class=\"toc\""));
        assert!(!html.contains("mermaid.min.js"));
    }

    #[test]
    fn read_input_reports_missing_file() {
        let err = read_input(Some(Path::new("/definitely/not/here.md"))).expect_err("missing file");
        assert!(matches!(err, ReportError::Io(_)));
    }
}
