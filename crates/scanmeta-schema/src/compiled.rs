//! # Compiled Schemas
//!
//! [`DocumentSchema`] is the capability the validator receives for one
//! record type. [`CompiledSchema`] implements it on top of a
//! `jsonschema::Validator`.

use std::collections::HashMap;
use std::fmt;

use scanmeta_core::RecordType;
use serde_json::Value;

use crate::registry::SchemaRegistryError;

/// A single schema violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON Pointer to the violating field in the document (empty for root).
    pub instance_path: String,
    /// JSON Pointer to the schema keyword that failed.
    pub schema_path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "(root) {}", self.message)
        } else {
            write!(f, "{} {}", self.instance_path, self.message)
        }
    }
}

/// Outcome of a structural check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaCheck {
    /// Every violation, in the order the validator reported them.
    pub violations: Vec<Violation>,
}

impl SchemaCheck {
    /// True when there are no violations.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Violations rendered as `<field-path> <message>` strings.
    pub fn messages(&self) -> Vec<String> {
        self.violations.iter().map(|v| v.to_string()).collect()
    }
}

/// Structural validation capability for one record type.
pub trait DocumentSchema: Send + Sync {
    /// The record type this schema describes.
    fn record_type(&self) -> RecordType;

    /// Check a document, collecting every violation.
    fn check(&self, document: &Value) -> SchemaCheck;
}

/// Resolves `$ref` URIs from schemas already loaded in memory.
///
/// Lookups try the full URI first, then the bare filename, so that a
/// relative `$ref: "common.schema.json#/definitions/link"` resolves whether
/// or not the referencing schema declares an `$id`.
pub(crate) struct LocalSchemaRetriever {
    pub(crate) schemas: HashMap<String, Value>,
}

impl jsonschema::Retrieve for LocalSchemaRetriever {
    fn retrieve(
        &self,
        uri: &jsonschema::Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let uri_str = uri.as_str();
        let without_fragment = uri_str.split('#').next().unwrap_or(uri_str);

        if let Some(value) = self.schemas.get(without_fragment) {
            return Ok(value.clone());
        }

        let filename = without_fragment.rsplit('/').next().unwrap_or(without_fragment);
        self.schemas
            .get(filename)
            .cloned()
            .ok_or_else(|| format!("schema not found for URI: {uri_str}").into())
    }
}

/// A schema compiled for one record type.
pub struct CompiledSchema {
    record_type: RecordType,
    source: String,
    validator: jsonschema::Validator,
}

impl fmt::Debug for CompiledSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledSchema")
            .field("record_type", &self.record_type)
            .field("source", &self.source)
            .finish()
    }
}

impl CompiledSchema {
    /// Compile a self-contained schema (no cross-file `$ref`s).
    ///
    /// # Errors
    ///
    /// Returns [`SchemaRegistryError::SchemaCompileError`] if the schema is
    /// not a valid JSON Schema.
    pub fn compile(record_type: RecordType, schema: &Value) -> Result<Self, SchemaRegistryError> {
        Self::compile_with(record_type, record_type.schema_file(), schema, HashMap::new())
    }

    /// Compile a schema, resolving `$ref`s against `resources` (keyed by
    /// `$id` URI and by filename).
    pub(crate) fn compile_with(
        record_type: RecordType,
        source: &str,
        schema: &Value,
        resources: HashMap<String, Value>,
    ) -> Result<Self, SchemaRegistryError> {
        let validator = jsonschema::options()
            .with_draft(jsonschema::Draft::Draft7)
            .should_validate_formats(true)
            .with_retriever(LocalSchemaRetriever { schemas: resources })
            .build(schema)
            .map_err(|e| SchemaRegistryError::SchemaCompileError {
                schema: source.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            record_type,
            source: source.to_string(),
            validator,
        })
    }
}

impl DocumentSchema for CompiledSchema {
    fn record_type(&self) -> RecordType {
        self.record_type
    }

    fn check(&self, document: &Value) -> SchemaCheck {
        let violations = self
            .validator
            .iter_errors(document)
            .map(|err| Violation {
                instance_path: err.instance_path.to_string(),
                schema_path: err.schema_path.to_string(),
                message: err.to_string(),
            })
            .collect();
        SchemaCheck { violations }
    }
}
