//! # Dataset Sources
//!
//! A [`DatasetSource`] is the only way the validator touches storage. Paths
//! are relative to the dataset root and use `/` separators. Directory
//! listings are sorted by name, which is what makes reports reproducible
//! across runs and platforms.
//!
//! Two implementations are provided: [`FsSource`] over a directory on disk
//! and [`MemorySource`] over an in-memory map of files.
//!
//! [`documents`] turns a source into a lazy walk over the JSON files below a
//! directory. Nothing is read until the walk reaches it, and calling
//! [`documents`] again starts a fresh walk.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

/// Errors raised by a [`DatasetSource`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// A directory exists but could not be listed.
    #[error("cannot read directory {path}: {reason}")]
    DirectoryUnreadable {
        /// Directory relative to the dataset root.
        path: String,
        /// Underlying error.
        reason: String,
    },

    /// A file exists but could not be read.
    #[error("cannot read file {path}: {reason}")]
    FileUnreadable {
        /// File relative to the dataset root.
        path: String,
        /// Underlying error.
        reason: String,
    },

    /// The file does not exist.
    #[error("file not found: {0}")]
    NotFound(String),
}

/// Read access to a dataset tree.
///
/// A missing directory lists as empty. Only a directory that exists and
/// cannot be listed is an error.
pub trait DatasetSource {
    /// Names of the subdirectories directly inside `dir`, sorted.
    fn subdirs(&self, dir: &str) -> Result<Vec<String>, SourceError>;

    /// Names of the files directly inside `dir`, sorted.
    fn files(&self, dir: &str) -> Result<Vec<String>, SourceError>;

    /// Full contents of the file at `path`.
    fn read(&self, path: &str) -> Result<Vec<u8>, SourceError>;

    /// Whether a file or directory exists at `path`.
    fn exists(&self, path: &str) -> bool;
}

/// Join a relative directory and an entry name with `/`.
pub fn join(dir: &str, name: &str) -> String {
    let dir = dir.trim_end_matches('/');
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{dir}/{name}")
    }
}

/// The directory part of a relative path (`""` for top-level entries).
pub fn parent(path: &str) -> &str {
    path.rsplit_once('/').map_or("", |(dir, _)| dir)
}

/// The last component of a relative path.
pub fn file_name(path: &str) -> &str {
    path.rsplit_once('/').map_or(path, |(_, name)| name)
}

fn is_json(name: &str) -> bool {
    name.ends_with(".json")
}

/// One JSON file reached by a [`Documents`] walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Path relative to the dataset root. For a directory that could not be
    /// listed, this is the directory itself.
    pub path: String,
    /// File contents, or the error that prevented reading them.
    pub contents: Result<Vec<u8>, SourceError>,
}

enum Pending {
    File(String),
    Failed(String, SourceError),
}

/// Lazy depth-first walk over every `*.json` file below a directory.
///
/// Within a directory, files come first in name order, then each
/// subdirectory in name order.
pub struct Documents<'a> {
    source: &'a dyn DatasetSource,
    dirs: Vec<String>,
    ready: VecDeque<Pending>,
}

/// Start a walk over the JSON files below `dir`.
pub fn documents<'a>(source: &'a dyn DatasetSource, dir: &str) -> Documents<'a> {
    Documents {
        source,
        dirs: vec![dir.to_string()],
        ready: VecDeque::new(),
    }
}

impl Documents<'_> {
    fn expand(&mut self, dir: String) {
        let files = match self.source.files(&dir) {
            Ok(files) => files,
            Err(e) => {
                tracing::warn!(dir = %dir, error = %e, "skipping unreadable directory");
                self.ready.push_back(Pending::Failed(dir, e));
                return;
            }
        };
        self.ready.extend(
            files
                .into_iter()
                .filter(|name| is_json(name))
                .map(|name| Pending::File(join(&dir, &name))),
        );

        match self.source.subdirs(&dir) {
            Ok(subdirs) => {
                self.dirs
                    .extend(subdirs.into_iter().rev().map(|name| join(&dir, &name)));
            }
            Err(e) => {
                tracing::warn!(dir = %dir, error = %e, "skipping unreadable directory");
                self.ready.push_back(Pending::Failed(dir, e));
            }
        }
    }
}

impl Iterator for Documents<'_> {
    type Item = Document;

    fn next(&mut self) -> Option<Document> {
        loop {
            match self.ready.pop_front() {
                Some(Pending::File(path)) => {
                    let contents = self.source.read(&path);
                    return Some(Document { path, contents });
                }
                Some(Pending::Failed(path, error)) => {
                    return Some(Document {
                        path,
                        contents: Err(error),
                    });
                }
                None => {
                    let dir = self.dirs.pop()?;
                    self.expand(dir);
                }
            }
        }
    }
}

/// A dataset rooted at a directory on disk.
#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    /// Open the dataset rooted at `root`. Nothing is read until queried.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The dataset root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, rel: &str) -> PathBuf {
        rel.split('/')
            .filter(|part| !part.is_empty() && *part != ".")
            .fold(self.root.clone(), |path, part| path.join(part))
    }

    fn list(&self, dir: &str, want_dirs: bool) -> Result<Vec<String>, SourceError> {
        let unreadable = |e: std::io::Error| SourceError::DirectoryUnreadable {
            path: dir.to_string(),
            reason: e.to_string(),
        };

        let entries = match std::fs::read_dir(self.resolve(dir)) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(unreadable(e)),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(&unreadable)?;
            let path = entry.path();
            let matches = if want_dirs {
                path.is_dir()
            } else {
                path.is_file()
            };
            if !matches {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(name) => {
                    tracing::warn!(dir = %dir, name = ?name, "skipping entry with non UTF-8 name");
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

impl DatasetSource for FsSource {
    fn subdirs(&self, dir: &str) -> Result<Vec<String>, SourceError> {
        self.list(dir, true)
    }

    fn files(&self, dir: &str) -> Result<Vec<String>, SourceError> {
        self.list(dir, false)
    }

    fn read(&self, path: &str) -> Result<Vec<u8>, SourceError> {
        std::fs::read(self.resolve(path)).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SourceError::NotFound(path.to_string())
            } else {
                SourceError::FileUnreadable {
                    path: path.to_string(),
                    reason: e.to_string(),
                }
            }
        })
    }

    fn exists(&self, path: &str) -> bool {
        self.resolve(path).exists()
    }
}

/// A dataset held in memory, keyed by relative path.
///
/// Directories are implied by the paths of the files they contain.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: BTreeMap<String, Vec<u8>>,
    unreadable: BTreeSet<String>,
}

fn clean(path: &str) -> &str {
    path.trim_start_matches("./").trim_matches('/')
}

impl MemorySource {
    /// An empty dataset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file.
    pub fn insert(&mut self, path: &str, contents: impl Into<Vec<u8>>) {
        self.files.insert(clean(path).to_string(), contents.into());
    }

    /// Add or replace a file holding the JSON rendering of `value`.
    pub fn insert_json(&mut self, path: &str, value: &Value) {
        self.insert(path, value.to_string());
    }

    /// Builder form of [`MemorySource::insert_json`].
    pub fn with_json(mut self, path: &str, value: Value) -> Self {
        self.insert_json(path, &value);
        self
    }

    /// Make listing `dir` fail, as an unreadable directory on disk would.
    pub fn mark_unreadable(&mut self, dir: &str) {
        self.unreadable.insert(clean(dir).to_string());
    }

    fn children(&self, dir: &str) -> Result<(BTreeSet<&str>, BTreeSet<&str>), SourceError> {
        let dir = clean(dir);
        if self.unreadable.contains(dir) {
            return Err(SourceError::DirectoryUnreadable {
                path: dir.to_string(),
                reason: "permission denied".to_string(),
            });
        }
        let prefix = if dir.is_empty() {
            String::new()
        } else {
            format!("{dir}/")
        };

        let mut dirs = BTreeSet::new();
        let mut files = BTreeSet::new();
        for key in self.files.keys() {
            if let Some(rest) = key.strip_prefix(prefix.as_str()) {
                match rest.split_once('/') {
                    Some((sub, _)) => dirs.insert(sub),
                    None => files.insert(rest),
                };
            }
        }
        Ok((dirs, files))
    }
}

impl DatasetSource for MemorySource {
    fn subdirs(&self, dir: &str) -> Result<Vec<String>, SourceError> {
        let (dirs, _) = self.children(dir)?;
        Ok(dirs.into_iter().map(str::to_string).collect())
    }

    fn files(&self, dir: &str) -> Result<Vec<String>, SourceError> {
        let (_, files) = self.children(dir)?;
        Ok(files.into_iter().map(str::to_string).collect())
    }

    fn read(&self, path: &str) -> Result<Vec<u8>, SourceError> {
        self.files
            .get(clean(path))
            .cloned()
            .ok_or_else(|| SourceError::NotFound(path.to_string()))
    }

    fn exists(&self, path: &str) -> bool {
        let path = clean(path);
        if self.files.contains_key(path) {
            return true;
        }
        let prefix = format!("{path}/");
        self.files.keys().any(|key| key.starts_with(&prefix))
    }
}
