//! # Configuration File
//!
//! `scanmeta.yaml` at the dataset root (or the file named by `--config`)
//! sets defaults for the validate subcommand. Every field is optional, and
//! command-line flags take precedence.
//!
//! ```yaml
//! dataset_root: .
//! schema_dir: schemas
//! skip: [donations, supporters]
//! duplicates: true
//! format: text
//! ```
//!
//! Relative paths are resolved against the directory holding the config
//! file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use scanmeta_core::RecordType;
use serde::Deserialize;

use crate::report::OutputFormat;

/// Filename looked up at the dataset root when `--config` is not given.
pub const CONFIG_FILE: &str = "scanmeta.yaml";

/// Contents of `scanmeta.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CheckConfig {
    /// Dataset root; the directory holding `data/`.
    pub dataset_root: Option<PathBuf>,
    /// Directory holding the `*.schema.json` files.
    pub schema_dir: Option<PathBuf>,
    /// Record types to leave out of validation.
    pub skip: Vec<String>,
    /// Whether duplicate detection runs.
    pub duplicates: bool,
    /// Report format.
    pub format: Option<OutputFormat>,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            dataset_root: None,
            schema_dir: None,
            skip: Vec::new(),
            duplicates: true,
            format: None,
        }
    }
}

impl CheckConfig {
    /// Parse a config document.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).context("invalid scanmeta config")
    }

    /// Read and parse the config file at `path`, resolving its relative
    /// paths against the file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config = Self::from_yaml_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Ok(config.relative_to(base))
    }

    /// Load the explicit config file if one was given, otherwise
    /// `scanmeta.yaml` under `search_root` if it exists, otherwise the
    /// defaults.
    pub fn discover(explicit: Option<&Path>, search_root: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let candidate = search_root.join(CONFIG_FILE);
        if candidate.is_file() {
            tracing::debug!(path = %candidate.display(), "using config file");
            Self::load(&candidate)
        } else {
            Ok(Self::default())
        }
    }

    /// The `skip` list as record types.
    pub fn skipped_types(&self) -> Result<Vec<RecordType>> {
        self.skip
            .iter()
            .map(|name| {
                name.parse::<RecordType>()
                    .with_context(|| format!("invalid entry in config `skip` list: {name}"))
            })
            .collect()
    }

    fn relative_to(mut self, base: &Path) -> Self {
        let resolve = |path: PathBuf| {
            if path.is_absolute() {
                path
            } else {
                base.join(path)
            }
        };
        self.dataset_root = self.dataset_root.map(resolve);
        self.schema_dir = self.schema_dir.map(resolve);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_default() {
        let config = CheckConfig::from_yaml_str("").unwrap();
        assert_eq!(config, CheckConfig::default());
        assert!(config.duplicates);
    }

    #[test]
    fn full_document_parses() {
        let config = CheckConfig::from_yaml_str(
            "dataset_root: ..\nschema_dir: schemas\nskip: [donations, event-map]\nduplicates: false\nformat: json\n",
        )
        .unwrap();
        assert_eq!(config.dataset_root, Some(PathBuf::from("..")));
        assert!(!config.duplicates);
        assert_eq!(config.format, Some(OutputFormat::Json));
        assert_eq!(
            config.skipped_types().unwrap(),
            vec![RecordType::Donation, RecordType::EventMap]
        );
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(CheckConfig::from_yaml_str("dupes: false\n").is_err());
    }

    #[test]
    fn bad_skip_entry_is_an_error() {
        let config = CheckConfig::from_yaml_str("skip: [rpcs]\n").unwrap();
        let err = config.skipped_types().unwrap_err();
        assert!(format!("{err:#}").contains("rpcs"));
    }

    #[test]
    fn relative_paths_follow_the_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "schema_dir: schemas\ndataset_root: /srv/metadata\n").unwrap();

        let config = CheckConfig::load(&path).unwrap();
        assert_eq!(config.schema_dir, Some(dir.path().join("schemas")));
        assert_eq!(config.dataset_root, Some(PathBuf::from("/srv/metadata")));
    }

    #[test]
    fn discover_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            CheckConfig::discover(None, dir.path()).unwrap(),
            CheckConfig::default()
        );

        std::fs::write(dir.path().join(CONFIG_FILE), "duplicates: false\n").unwrap();
        assert!(!CheckConfig::discover(None, dir.path()).unwrap().duplicates);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.yaml");
        assert!(CheckConfig::discover(Some(&missing), dir.path()).is_err());
    }
}
