//! # Report Locations
//!
//! A [`Location`] names where a validation result applies: a whole file, or
//! one element of an aggregate file. Locations render as plain strings
//! (`data/apps/uniswap.json`, `data/organizations.json[2] (id: acme)`) and
//! serialize as those same strings.

use serde::{Serialize, Serializer};

/// Where a validation result applies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Location {
    /// A file, relative to the dataset root.
    File(String),
    /// The `index`-th element of the array inside an aggregate file.
    Element {
        /// The aggregate file, relative to the dataset root.
        file: String,
        /// Zero-based array index.
        index: usize,
        /// Identity of the element, e.g. `id: acme`, when it has one.
        label: Option<String>,
    },
}

impl Location {
    /// Location of a whole file.
    pub fn file(path: impl Into<String>) -> Self {
        Self::File(path.into())
    }

    /// Location of an unlabelled aggregate element.
    pub fn element(file: impl Into<String>, index: usize) -> Self {
        Self::Element {
            file: file.into(),
            index,
            label: None,
        }
    }

    /// Attach an identity label to an element location. File locations are
    /// returned unchanged.
    pub fn with_label(self, label: impl Into<String>) -> Self {
        match self {
            Self::Element { file, index, .. } => Self::Element {
                file,
                index,
                label: Some(label.into()),
            },
            file @ Self::File(_) => file,
        }
    }

    /// The file this location points into.
    pub fn path(&self) -> &str {
        match self {
            Self::File(path) => path,
            Self::Element { file, .. } => file,
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => f.write_str(path),
            Self::Element { file, index, label } => {
                write!(f, "{file}[{index}]")?;
                if let Some(label) = label {
                    write!(f, " ({label})")?;
                }
                Ok(())
            }
        }
    }
}

impl Serialize for Location {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
