//! # Schemas Subcommand
//!
//! Loads and compiles the schema directory, then lists the record types it
//! covers. A broken or missing schema makes the command fail, so CI can
//! check the schema set without a dataset.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use scanmeta_core::RecordType;
use scanmeta_schema::SchemaRegistry;

use crate::report::OutputFormat;
use crate::Workspace;

/// Arguments for the `scanmeta schemas` subcommand.
#[derive(Args, Debug, Default)]
pub struct SchemasArgs {
    /// Output format.
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,
}

#[derive(Serialize)]
struct SchemaEntry {
    record_type: RecordType,
    schema: &'static str,
    storage: &'static str,
}

/// Load the registry from `schema_dir`, failing on any broken schema.
pub fn load_registry(schema_dir: &Path) -> Result<SchemaRegistry> {
    let registry = SchemaRegistry::load(schema_dir)
        .with_context(|| format!("failed to load JSON schemas from {}", schema_dir.display()))?;
    tracing::info!(schema_count = registry.len(), "loaded schema registry");
    Ok(registry)
}

/// Execute the schemas subcommand.
pub fn run_schemas(args: &SchemasArgs, ws: &Workspace) -> Result<u8> {
    let registry = load_registry(&ws.schema_dir)?;
    let entries: Vec<SchemaEntry> = registry
        .record_types()
        .map(|ty| SchemaEntry {
            record_type: ty,
            schema: ty.schema_file(),
            storage: ty.storage().path(),
        })
        .collect();

    match args.format.unwrap_or_default() {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        OutputFormat::Text => {
            println!("Schemas in {}:", ws.schema_dir.display());
            for entry in &entries {
                println!(
                    "  {:<13} {:<26} {}",
                    entry.record_type.as_str(),
                    entry.schema,
                    entry.storage
                );
            }
            println!("\n{} record type(s) compiled.", entries.len());
        }
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_directory_fails_with_context() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_registry(&dir.path().join("schemas")).unwrap_err();
        assert!(format!("{err:#}").contains("failed to load JSON schemas"));
    }
}
