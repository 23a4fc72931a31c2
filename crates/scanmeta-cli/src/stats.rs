//! # Stats Subcommand
//!
//! Prints record counts per type.

use anyhow::Result;
use clap::Args;
use serde_json::json;

use scanmeta_check::{DatasetStats, FsSource};

use crate::report::OutputFormat;
use crate::Workspace;

/// Arguments for the `scanmeta stats` subcommand.
#[derive(Args, Debug, Default)]
pub struct StatsArgs {
    /// Output format.
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,
}

/// Execute the stats subcommand.
pub fn run_stats(args: &StatsArgs, ws: &Workspace) -> Result<u8> {
    let source = FsSource::new(&ws.dataset_root);
    let stats = DatasetStats::collect(&source);
    print!("{}", render_stats(&stats, args.format.unwrap_or_default())?);
    Ok(0)
}

/// Render counts as an aligned table or a JSON object.
pub fn render_stats(stats: &DatasetStats, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Json => {
            let doc = json!({ "counts": stats, "total": stats.total() });
            format!("{}\n", serde_json::to_string_pretty(&doc)?)
        }
        OutputFormat::Text => {
            let mut out = String::from("Dataset statistics:\n");
            for (record_type, count) in stats.iter() {
                out.push_str(&format!("  {:<13} {count:>6}\n", record_type.as_str()));
            }
            out.push_str(&format!("  {:<13} {:>6}\n", "total", stats.total()));
            out
        }
    })
}
