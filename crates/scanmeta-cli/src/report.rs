//! # Report Rendering
//!
//! Text output groups errors under their location and ends with a tally.
//! JSON output carries the same entries plus a summary. Neither includes
//! timestamps, so unchanged input renders byte-identically.

use std::fmt;

use scanmeta_core::{Report, Summary, ValidationResult};
use serde::{Deserialize, Serialize};

/// Output format for reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

/// Text rendering of a validation report.
pub struct TextReport<'a>(pub &'a Report);

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary = self.0.summary();
        writeln!(f, "Validating metadata files...")?;
        writeln!(f)?;
        writeln!(
            f,
            "Validated {} files ({} valid)",
            summary.total, summary.valid
        )?;

        for result in self.0.invalid() {
            writeln!(f)?;
            writeln!(f, "FAIL: {}", result.location)?;
            for error in &result.errors {
                writeln!(f, "  - {error}")?;
            }
        }

        writeln!(f)?;
        if summary.invalid == 0 {
            writeln!(f, "All files valid!")
        } else {
            writeln!(f, "{} file(s) with errors", summary.invalid)
        }
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    summary: Summary,
    results: &'a [ValidationResult],
}

/// JSON rendering of a validation report.
pub fn render_json(report: &Report) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&JsonReport {
        summary: report.summary(),
        results: report.entries(),
    })
}

/// Render a report in the requested format.
pub fn render(report: &Report, format: OutputFormat) -> serde_json::Result<String> {
    match format {
        OutputFormat::Text => Ok(TextReport(report).to_string()),
        OutputFormat::Json => render_json(report).map(|mut s| {
            s.push('\n');
            s
        }),
    }
}
