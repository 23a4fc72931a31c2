//! # scanmeta-cli: The `scanmeta` Command
//!
//! ## Subcommands
//!
//! - `scanmeta validate`: Validate the whole dataset, or one file.
//! - `scanmeta stats`: Count records per type.
//! - `scanmeta schemas`: Load and compile the schema set, then list it.
//!
//! The exit code gates CI: 0 when every record is valid, 1 when any record
//! is invalid or the run could not start (unreadable config, broken schema).
//!
//! ```bash
//! scanmeta validate
//! scanmeta validate --skip donations,supporters --format json
//! scanmeta validate data/tokens/1/0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48.json
//! ```

pub mod config;
pub mod report;
pub mod schemas;
pub mod stats;
pub mod validate;

use std::path::{Path, PathBuf};

use config::CheckConfig;

/// Where a subcommand reads from, after merging flags, config, and defaults.
#[derive(Debug, Clone)]
pub struct Workspace {
    /// Directory holding `data/`.
    pub dataset_root: PathBuf,
    /// Directory holding the `*.schema.json` files.
    pub schema_dir: PathBuf,
    /// The loaded config file, or defaults.
    pub config: CheckConfig,
}

impl Workspace {
    /// Merge the sources of each setting. Flags win over the config file,
    /// which wins over `repo_root`.
    pub fn resolve(
        repo_root: &Path,
        root_flag: Option<PathBuf>,
        schema_flag: Option<PathBuf>,
        config: CheckConfig,
    ) -> Self {
        let dataset_root = root_flag
            .or_else(|| config.dataset_root.clone())
            .unwrap_or_else(|| repo_root.to_path_buf());
        let schema_dir = schema_flag
            .or_else(|| config.schema_dir.clone())
            .unwrap_or_else(|| dataset_root.join("schemas"));
        Self {
            dataset_root,
            schema_dir,
            config,
        }
    }
}

/// Resolve a path that may be relative to the dataset root.
///
/// If the path is absolute, returns it as-is. If relative and the file
/// exists relative to `dataset_root`, uses that. Otherwise returns the path
/// relative to the current directory.
pub fn resolve_path(path: &Path, dataset_root: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    let root_relative = dataset_root.join(path);
    if root_relative.exists() {
        root_relative
    } else {
        path.to_path_buf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config_and_repo_root() {
        let config = CheckConfig {
            dataset_root: Some(PathBuf::from("/cfg/root")),
            schema_dir: Some(PathBuf::from("/cfg/schemas")),
            ..CheckConfig::default()
        };
        let ws = Workspace::resolve(
            Path::new("/repo"),
            Some(PathBuf::from("/flag/root")),
            None,
            config,
        );
        assert_eq!(ws.dataset_root, PathBuf::from("/flag/root"));
        assert_eq!(ws.schema_dir, PathBuf::from("/cfg/schemas"));
    }

    #[test]
    fn schema_dir_defaults_under_dataset_root() {
        let ws = Workspace::resolve(Path::new("/repo"), None, None, CheckConfig::default());
        assert_eq!(ws.dataset_root, PathBuf::from("/repo"));
        assert_eq!(ws.schema_dir, PathBuf::from("/repo/schemas"));
    }

    #[test]
    fn resolve_path_prefers_dataset_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("data")).unwrap();
        std::fs::write(dir.path().join("data/networks.json"), "{}").unwrap();
        assert_eq!(
            resolve_path(Path::new("data/networks.json"), dir.path()),
            dir.path().join("data/networks.json")
        );
        assert_eq!(
            resolve_path(Path::new("elsewhere.json"), dir.path()),
            PathBuf::from("elsewhere.json")
        );
    }
}
