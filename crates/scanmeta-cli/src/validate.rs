//! # Validate Subcommand
//!
//! Runs the full pipeline over the dataset, or validates one file when a
//! path is given, and prints the report.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::Args;

use scanmeta_check::{pipeline, FsSource, ValidationPlan, Validator};
use scanmeta_core::{RecordType, Report};
use scanmeta_schema::SchemaRegistry;

use crate::config::CheckConfig;
use crate::report::{self, OutputFormat};
use crate::Workspace;

/// Arguments for the `scanmeta validate` subcommand.
#[derive(Args, Debug, Default)]
pub struct ValidateArgs {
    /// Validate one file; its record type is inferred from where it sits
    /// under the dataset root.
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Validate only these record types (comma-separated). Ignores the
    /// config file's `skip` list.
    #[arg(long, value_delimiter = ',', value_name = "TYPES")]
    pub only: Vec<RecordType>,

    /// Leave these record types out (comma-separated).
    #[arg(long, value_delimiter = ',', value_name = "TYPES")]
    pub skip: Vec<RecordType>,

    /// Do not run duplicate detection.
    #[arg(long)]
    pub no_duplicates: bool,

    /// Report format.
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,
}

/// Execute the validate subcommand.
///
/// Returns exit code: 0 when every result is valid, 1 otherwise.
pub fn run_validate(args: &ValidateArgs, ws: &Workspace) -> Result<u8> {
    let registry = crate::schemas::load_registry(&ws.schema_dir)?;
    let report = validation_report(args, ws, &registry)?;

    let format = args.format.or(ws.config.format).unwrap_or_default();
    let rendered = report::render(&report, format).context("failed to render report")?;
    print!("{rendered}");

    Ok(report.exit_code())
}

/// Produce the report the subcommand prints.
pub fn validation_report(
    args: &ValidateArgs,
    ws: &Workspace,
    registry: &SchemaRegistry,
) -> Result<Report> {
    let source = FsSource::new(&ws.dataset_root);

    if let Some(path) = &args.path {
        let rel = dataset_relative(path, &ws.dataset_root)?;
        let Some(record_type) = RecordType::from_path(&rel) else {
            bail!("cannot determine record type for {rel}: not a dataset record location");
        };
        tracing::info!(path = %rel, record_type = %record_type, "validating single file");
        return Ok(Validator::new(&source, registry).validate_file(record_type, &rel));
    }

    let plan = build_plan(args, &ws.config)?;
    Ok(pipeline::run(&source, registry, &plan))
}

/// Combine `--only`, `--skip`, `--no-duplicates`, and the config file into
/// a plan.
pub fn build_plan(args: &ValidateArgs, config: &CheckConfig) -> Result<ValidationPlan> {
    let plan = if args.only.is_empty() {
        ValidationPlan::all().skip(config.skipped_types()?)
    } else {
        ValidationPlan::only(args.only.iter().copied())
    };
    Ok(plan
        .skip(args.skip.iter().copied())
        .with_duplicates(config.duplicates && !args.no_duplicates))
}

/// Express `path` relative to the dataset root with `/` separators.
fn dataset_relative(path: &Path, dataset_root: &Path) -> Result<String> {
    let resolved = crate::resolve_path(path, dataset_root);
    let file = std::fs::canonicalize(&resolved)
        .with_context(|| format!("path does not exist: {}", path.display()))?;
    let root = std::fs::canonicalize(dataset_root)
        .with_context(|| format!("dataset root does not exist: {}", dataset_root.display()))?;
    let rel = file.strip_prefix(&root).map_err(|_| {
        anyhow!(
            "{} is outside the dataset root {}",
            file.display(),
            root.display()
        )
    })?;

    let parts = rel
        .iter()
        .map(|part| {
            part.to_str()
                .ok_or_else(|| anyhow!("non UTF-8 path: {}", rel.display()))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(parts.join("/"))
}
