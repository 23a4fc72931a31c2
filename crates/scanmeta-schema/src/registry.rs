//! # Schema Registry
//!
//! Loads the schema directory once at startup and compiles one
//! [`DocumentSchema`] per [`RecordType`].
//!
//! ## Schema Resolution
//!
//! Every `*.schema.json` file in the directory is parsed and indexed twice:
//! by its `$id` (or `https://schemas.openscan.dev/metadata/<filename>` when
//! it has none) and by its bare filename. Record schemas share definitions
//! through relative `$ref`s such as `common.schema.json#/definitions/link`,
//! which the local retriever resolves from that index.
//!
//! ## Failure policy
//!
//! Loading is all-or-nothing. An unreadable directory, a file that is not
//! JSON, a record type without a schema, or a schema that does not compile
//! aborts construction. There is no partially-populated registry.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use scanmeta_core::RecordType;
use serde_json::Value;
use thiserror::Error;

use crate::compiled::{CompiledSchema, DocumentSchema, SchemaCheck};

/// URI prefix given to schemas that do not declare an `$id`.
pub const SCHEMA_URI_PREFIX: &str = "https://schemas.openscan.dev/metadata/";

/// Errors raised while building the registry. All of them are fatal.
#[derive(Error, Debug)]
pub enum SchemaRegistryError {
    /// The schema directory could not be listed.
    #[error("cannot read schema directory {path}: {reason}")]
    DirectoryUnreadable {
        /// The directory that was scanned.
        path: String,
        /// Underlying error.
        reason: String,
    },

    /// A schema file could not be read or is not valid JSON.
    #[error("failed to load schema {path}: {reason}")]
    SchemaLoadError {
        /// Path of the offending schema file.
        path: String,
        /// Underlying error.
        reason: String,
    },

    /// No schema exists for a record type.
    #[error("no schema for record type '{record_type}' (expected {file})")]
    SchemaNotFound {
        /// The record type without a schema.
        record_type: RecordType,
        /// The filename that was looked up.
        file: &'static str,
    },

    /// A schema is not a valid JSON Schema, or one of its `$ref`s does not
    /// resolve.
    #[error("failed to compile schema {schema}: {reason}")]
    SchemaCompileError {
        /// Schema filename.
        schema: String,
        /// Underlying error.
        reason: String,
    },
}

/// Read-only mapping from record type to its compiled schema.
#[derive(Default)]
pub struct SchemaRegistry {
    schema_dir: Option<PathBuf>,
    schemas: BTreeMap<RecordType, Box<dyn DocumentSchema>>,
}

impl std::fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaRegistry")
            .field("schema_dir", &self.schema_dir)
            .field("record_types", &self.schemas.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl SchemaRegistry {
    /// Load and compile the schemas for every record type from `schema_dir`.
    ///
    /// # Errors
    ///
    /// Any [`SchemaRegistryError`]; see the module docs for the policy.
    pub fn load(schema_dir: impl Into<PathBuf>) -> Result<Self, SchemaRegistryError> {
        let schema_dir = schema_dir.into();
        let documents = read_schema_dir(&schema_dir)?;
        let mut registry = Self::from_documents(documents)?;
        registry.schema_dir = Some(schema_dir);
        Ok(registry)
    }

    /// Compile a registry from schema documents keyed by filename.
    ///
    /// Every record type's [`RecordType::schema_file`] must be present.
    /// Extra documents (such as `common.schema.json`) are only used to
    /// resolve `$ref`s.
    ///
    /// # Errors
    ///
    /// [`SchemaRegistryError::SchemaNotFound`] or
    /// [`SchemaRegistryError::SchemaCompileError`].
    pub fn from_documents(documents: BTreeMap<String, Value>) -> Result<Self, SchemaRegistryError> {
        let resources = index_resources(&documents);
        let mut schemas: BTreeMap<RecordType, Box<dyn DocumentSchema>> = BTreeMap::new();

        for record_type in RecordType::ALL {
            let file = record_type.schema_file();
            let schema = documents
                .get(file)
                .ok_or(SchemaRegistryError::SchemaNotFound { record_type, file })?;
            let compiled = CompiledSchema::compile_with(record_type, file, schema, resources.clone())?;
            tracing::debug!(record_type = %record_type, schema = file, "compiled schema");
            schemas.insert(record_type, Box::new(compiled));
        }

        Ok(Self {
            schema_dir: None,
            schemas,
        })
    }

    /// Register (or replace) the schema capability for one record type.
    ///
    /// Useful for assembling a registry from hand-built schemas.
    pub fn insert(&mut self, schema: Box<dyn DocumentSchema>) {
        self.schemas.insert(schema.record_type(), schema);
    }

    /// The directory the registry was loaded from, if any.
    pub fn schema_dir(&self) -> Option<&Path> {
        self.schema_dir.as_deref()
    }

    /// The schema capability for a record type.
    pub fn get(&self, record_type: RecordType) -> Option<&dyn DocumentSchema> {
        self.schemas.get(&record_type).map(|s| s.as_ref())
    }

    /// Record types with a registered schema, in declaration order.
    pub fn record_types(&self) -> impl Iterator<Item = RecordType> + '_ {
        self.schemas.keys().copied()
    }

    /// Number of registered record types.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Whether no schema is registered.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Structurally validate `document` as a record of `record_type`.
    ///
    /// Returns `None` when no schema is registered for the type.
    pub fn validate(&self, record_type: RecordType, document: &Value) -> Option<SchemaCheck> {
        self.get(record_type).map(|schema| schema.check(document))
    }
}

/// Read every `*.schema.json` file directly inside `dir`.
fn read_schema_dir(dir: &Path) -> Result<BTreeMap<String, Value>, SchemaRegistryError> {
    let entries = std::fs::read_dir(dir).map_err(|e| SchemaRegistryError::DirectoryUnreadable {
        path: dir.display().to_string(),
        reason: e.to_string(),
    })?;

    let mut documents = BTreeMap::new();
    for entry in entries {
        let entry = entry.map_err(|e| SchemaRegistryError::DirectoryUnreadable {
            path: dir.display().to_string(),
            reason: e.to_string(),
        })?;
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !name.ends_with(".schema.json") || !path.is_file() {
            continue;
        }

        let content =
            std::fs::read_to_string(&path).map_err(|e| SchemaRegistryError::SchemaLoadError {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        let schema: Value =
            serde_json::from_str(&content).map_err(|e| SchemaRegistryError::SchemaLoadError {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        documents.insert(name.to_string(), schema);
    }

    tracing::info!(dir = %dir.display(), count = documents.len(), "loaded schema files");
    Ok(documents)
}

/// Index schema documents by `$id` (or a derived URI) and by filename.
fn index_resources(documents: &BTreeMap<String, Value>) -> HashMap<String, Value> {
    let mut resources = HashMap::new();
    for (filename, schema) in documents {
        let schema_id = schema
            .get("$id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("{SCHEMA_URI_PREFIX}{filename}"));
        resources.insert(schema_id, schema.clone());
        resources.insert(filename.clone(), schema.clone());
    }
    resources
}
