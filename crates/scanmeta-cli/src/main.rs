//! # scanmeta CLI entry point
//!
//! Parses command-line arguments, installs logging, resolves the dataset
//! root and config file, and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use scanmeta_cli::config::CheckConfig;
use scanmeta_cli::schemas::{run_schemas, SchemasArgs};
use scanmeta_cli::stats::{run_stats, StatsArgs};
use scanmeta_cli::validate::{run_validate, ValidateArgs};
use scanmeta_cli::Workspace;

/// Validator for the OpenScan metadata dataset.
///
/// Checks every token, network, app, organization, supporter, donation,
/// event map, and address record against its JSON Schema and the dataset's
/// consistency rules.
#[derive(Parser, Debug)]
#[command(name = "scanmeta", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    /// Path to configuration file (default: scanmeta.yaml at the dataset root).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Dataset root directory (default: nearest ancestor holding data/ and schemas/).
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Schema directory (default: <root>/schemas).
    #[arg(long, global = true)]
    schema_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate the dataset, or a single record file.
    Validate(ValidateArgs),

    /// Count records per type.
    Stats(StatsArgs),

    /// Compile the schema set and list the record types it covers.
    Schemas(SchemasArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level. Logs go to stderr so the
    // report on stdout stays machine-readable.
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    tracing::debug!("scanmeta CLI starting");

    // Resolve the dataset root: walk up from CWD looking for `data/` and `schemas/`.
    let repo_root = match &cli.root {
        Some(root) => root.clone(),
        None => resolve_repo_root().unwrap_or_else(|| {
            tracing::warn!("Could not locate dataset root; using current directory");
            std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
        }),
    };

    let config = match CheckConfig::discover(cli.config.as_deref(), &repo_root) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{e:#}");
            return ExitCode::from(1);
        }
    };

    let ws = Workspace::resolve(&repo_root, cli.root, cli.schema_dir, config);
    tracing::debug!(
        dataset_root = %ws.dataset_root.display(),
        schema_dir = %ws.schema_dir.display(),
        "resolved workspace"
    );

    let result = match cli.command {
        Commands::Validate(args) => run_validate(&args, &ws),
        Commands::Stats(args) => run_stats(&args, &ws),
        Commands::Schemas(args) => run_schemas(&args, &ws),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

/// Walk up from the current directory to find the dataset root.
///
/// The root is identified by the presence of both `data/` and `schemas/`
/// directories.
fn resolve_repo_root() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    let mut dir = cwd.as_path();
    loop {
        if dir.join("data").is_dir() && dir.join("schemas").is_dir() {
            return Some(dir.to_path_buf());
        }
        dir = dir.parent()?;
    }
}
