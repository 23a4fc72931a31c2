//! # Structural and Semantic Validation
//!
//! [`Validator::validate_all`] enumerates every record of one type, checks
//! it against the type's schema, and then runs the type's semantic rules.
//! Every document yields exactly one [`ValidationResult`]: valid, or
//! invalid with the messages that explain why.
//!
//! ## Per-document sequence
//!
//! 1. Read failure → one result: `Failed to read file: …`.
//! 2. Parse failure → one result: `Failed to parse JSON: …`.
//! 3. Schema violations → one result listing every `<field-path> <message>`.
//!    Semantic rules are skipped.
//! 4. Otherwise → one result carrying every semantic message (possibly none).
//!
//! Aggregate files are parsed once and each array element gets its own
//! result at `file[index]`. A missing aggregate file contributes nothing.

use scanmeta_core::{ChainId, Location, RecordType, Report, Storage, ValidationResult};
use scanmeta_schema::SchemaRegistry;
use serde_json::Value;

use crate::semantic::{self, RuleContext};
use crate::source::{self, DatasetSource, Document};

/// Validates records read from a [`DatasetSource`] against a
/// [`SchemaRegistry`].
pub struct Validator<'a> {
    source: &'a dyn DatasetSource,
    registry: &'a SchemaRegistry,
}

impl<'a> Validator<'a> {
    /// Create a validator. Nothing is read until a `validate_*` call.
    pub fn new(source: &'a dyn DatasetSource, registry: &'a SchemaRegistry) -> Self {
        Self { source, registry }
    }

    /// Validate every record of `record_type`.
    pub fn validate_all(&self, record_type: RecordType) -> Report {
        let report = match record_type.storage() {
            Storage::Directory {
                dir,
                chain_partitioned,
            } => self.validate_directory(record_type, dir, chain_partitioned),
            Storage::Aggregate { file, key } => self.validate_aggregate(record_type, file, key),
        };
        let summary = report.summary();
        tracing::info!(
            record_type = %record_type,
            total = summary.total,
            invalid = summary.invalid,
            "validated records"
        );
        report
    }

    /// Validate the single file at `path`, which must hold records of
    /// `record_type`.
    ///
    /// For an aggregate type this validates every element of the file.
    pub fn validate_file(&self, record_type: RecordType, path: &str) -> Report {
        match record_type.storage() {
            Storage::Directory {
                chain_partitioned, ..
            } => {
                let document = Document {
                    path: path.to_string(),
                    contents: self.source.read(path),
                };
                let mut report = Report::new();
                report.push(self.check_document(record_type, document, chain_partitioned));
                report
            }
            Storage::Aggregate { key, .. } => self.validate_aggregate(record_type, path, key),
        }
    }

    fn validate_directory(
        &self,
        record_type: RecordType,
        dir: &str,
        chain_partitioned: bool,
    ) -> Report {
        source::documents(self.source, dir)
            .map(|document| self.check_document(record_type, document, chain_partitioned))
            .collect()
    }

    fn check_document(
        &self,
        record_type: RecordType,
        document: Document,
        chain_partitioned: bool,
    ) -> ValidationResult {
        tracing::debug!(path = %document.path, "validating");
        let location = Location::file(document.path.as_str());

        let bytes = match document.contents {
            Ok(bytes) => bytes,
            Err(e) => return ValidationResult::single(location, format!("Failed to read file: {e}")),
        };
        let value: Value = match serde_json::from_slice(&bytes) {
            Ok(value) => value,
            Err(e) => {
                return ValidationResult::single(location, format!("Failed to parse JSON: {e}"))
            }
        };

        let chain_dir = if chain_partitioned {
            chain_dir_of(&document.path)
        } else {
            None
        };
        self.check_value(record_type, location, &value, chain_dir)
    }

    fn validate_aggregate(&self, record_type: RecordType, file: &str, key: &str) -> Report {
        let mut report = Report::new();
        if !self.source.exists(file) {
            tracing::debug!(file, "aggregate file absent, nothing to validate");
            return report;
        }

        let location = Location::file(file);
        let bytes = match self.source.read(file) {
            Ok(bytes) => bytes,
            Err(e) => {
                report.push(ValidationResult::single(
                    location,
                    format!("Failed to read file: {e}"),
                ));
                return report;
            }
        };
        let value: Value = match serde_json::from_slice(&bytes) {
            Ok(value) => value,
            Err(e) => {
                report.push(ValidationResult::single(
                    location,
                    format!("Failed to parse JSON: {e}"),
                ));
                return report;
            }
        };
        let Some(elements) = value.get(key).and_then(Value::as_array) else {
            report.push(ValidationResult::single(
                location,
                format!("expected a top-level \"{key}\" array"),
            ));
            return report;
        };

        for (index, element) in elements.iter().enumerate() {
            let location = element_location(record_type, file, index, element);
            report.push(self.check_value(record_type, location, element, None));
        }
        report
    }

    fn check_value(
        &self,
        record_type: RecordType,
        location: Location,
        value: &Value,
        chain_dir: Option<ChainId>,
    ) -> ValidationResult {
        let Some(check) = self.registry.validate(record_type, value) else {
            return ValidationResult::single(
                location,
                format!("no schema registered for record type {record_type}"),
            );
        };
        if !check.is_valid() {
            return ValidationResult::invalid(location, check.messages());
        }

        let ctx = RuleContext {
            source: self.source,
            chain_dir,
        };
        ValidationResult::from_errors(location, semantic::check(record_type, value, &ctx))
    }
}

/// Chain id named by the directory that directly contains `path`, if that
/// directory name is numeric.
pub fn chain_dir_of(path: &str) -> Option<ChainId> {
    ChainId::from_dir_name(source::file_name(source::parent(path))).ok()
}

/// Location of an aggregate element, labelled with its identity field.
pub fn element_location(
    record_type: RecordType,
    file: &str,
    index: usize,
    element: &Value,
) -> Location {
    let location = Location::element(file, index);
    let label = record_type.label_field().and_then(|field| {
        let value = match element.get(field)? {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        Some(format!("{field}: {value}"))
    });
    match label {
        Some(label) => location.with_label(label),
        None => location,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;
    use scanmeta_schema::{CompiledSchema, SchemaRegistry};
    use serde_json::json;

    const ADDR: &str = "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48";

    fn permissive_registry() -> SchemaRegistry {
        let mut registry = SchemaRegistry::default();
        for ty in RecordType::ALL {
            let schema = json!({"type": "object"});
            registry.insert(Box::new(CompiledSchema::compile(ty, &schema).unwrap()));
        }
        registry
    }

    fn strict_token_registry() -> SchemaRegistry {
        let mut registry = permissive_registry();
        let schema = json!({
            "type": "object",
            "required": ["address", "chainId", "name"],
            "properties": { "chainId": {"type": "integer"} }
        });
        registry.insert(Box::new(
            CompiledSchema::compile(RecordType::Token, &schema).unwrap(),
        ));
        registry
    }

    fn locations(report: &Report) -> Vec<String> {
        report.entries().iter().map(|r| r.location.to_string()).collect()
    }

    #[test]
    fn chain_dir_is_the_direct_parent() {
        assert_eq!(chain_dir_of("data/tokens/10/0xa.json"), Some(ChainId::new(10)));
        assert_eq!(chain_dir_of("data/tokens/0xa.json"), None);
        assert_eq!(chain_dir_of("data/tokens/1x/0xa.json"), None);
    }

    #[test]
    fn element_labels_follow_identity_field() {
        let org = element_location(RecordType::Organization, "data/organizations.json", 2, &json!({"id": "acme"}));
        assert_eq!(org.to_string(), "data/organizations.json[2] (id: acme)");
        let net = element_location(RecordType::Network, "data/networks.json", 0, &json!({"chainId": 1}));
        assert_eq!(net.to_string(), "data/networks.json[0] (chainId: 1)");
        let bare = element_location(RecordType::Network, "data/networks.json", 1, &json!({}));
        assert_eq!(bare.to_string(), "data/networks.json[1]");
    }

    #[test]
    fn every_document_gets_one_result() {
        let source = MemorySource::new()
            .with_json("data/apps/a.json", json!({"id": "a"}))
            .with_json("data/apps/b.json", json!({"id": "b"}));
        let registry = permissive_registry();
        let report = Validator::new(&source, &registry).validate_all(RecordType::App);
        assert_eq!(locations(&report), vec!["data/apps/a.json", "data/apps/b.json"]);
        assert!(report.is_success());
    }

    #[test]
    fn malformed_json_yields_single_parse_error() {
        let mut source = MemorySource::new();
        source.insert("data/apps/broken.json", "{ not json");
        let registry = permissive_registry();
        let report = Validator::new(&source, &registry).validate_all(RecordType::App);
        assert_eq!(report.len(), 1);
        let entry = &report.entries()[0];
        assert!(!entry.valid);
        assert_eq!(entry.errors.len(), 1);
        assert!(entry.errors[0].starts_with("Failed to parse JSON: "));
    }

    #[test]
    fn schema_failure_skips_semantic_rules() {
        let source = MemorySource::new().with_json(
            "data/tokens/10/bad.json",
            json!({"address": "nope", "chainId": "1"}),
        );
        let registry = strict_token_registry();
        let report = Validator::new(&source, &registry).validate_all(RecordType::Token);
        let entry = &report.entries()[0];
        assert!(!entry.valid);
        assert!(entry.errors.iter().any(|e| e.contains("name")));
        assert!(entry.errors.iter().all(|e| !e.starts_with("Invalid address")));
        assert!(entry.errors.iter().all(|e| !e.starts_with("chainId mismatch")));
    }

    #[test]
    fn semantic_errors_follow_a_schema_pass() {
        let source = MemorySource::new().with_json(
            "data/tokens/10/0xa.json",
            json!({"address": ADDR, "chainId": 1, "name": "USD Coin"}),
        );
        let registry = strict_token_registry();
        let report = Validator::new(&source, &registry).validate_all(RecordType::Token);
        assert_eq!(
            report.entries()[0].errors,
            vec!["chainId mismatch: file is in 10/ but chainId is 1"]
        );
    }

    #[test]
    fn apps_are_not_chain_checked() {
        let source = MemorySource::new().with_json("data/apps/10/x.json", json!({"chainId": 1}));
        let registry = permissive_registry();
        let report = Validator::new(&source, &registry).validate_all(RecordType::App);
        assert!(report.is_success());
    }

    #[test]
    fn aggregate_elements_are_validated_individually() {
        let source = MemorySource::new().with_json(
            "data/organizations.json",
            json!({"organizations": [
                {"id": "acme"},
                {"id": "globex", "logo": "assets/orgs/globex.svg"}
            ]}),
        );
        let registry = permissive_registry();
        let report = Validator::new(&source, &registry).validate_all(RecordType::Organization);
        assert_eq!(
            locations(&report),
            vec![
                "data/organizations.json[0] (id: acme)",
                "data/organizations.json[1] (id: globex)"
            ]
        );
        assert!(report.entries()[0].valid);
        assert_eq!(
            report.entries()[1].errors,
            vec!["Referenced logo not found: assets/orgs/globex.svg"]
        );
    }

    #[test]
    fn missing_aggregate_file_contributes_nothing() {
        let source = MemorySource::new();
        let registry = permissive_registry();
        let report = Validator::new(&source, &registry).validate_all(RecordType::Donation);
        assert!(report.is_empty());
    }

    #[test]
    fn aggregate_without_array_is_reported() {
        let source = MemorySource::new().with_json("data/networks.json", json!({"chains": []}));
        let registry = permissive_registry();
        let report = Validator::new(&source, &registry).validate_all(RecordType::Network);
        assert_eq!(report.len(), 1);
        assert_eq!(
            report.entries()[0].errors,
            vec!["expected a top-level \"networks\" array"]
        );
    }

    #[test]
    fn unregistered_type_is_reported_per_document() {
        let source = MemorySource::new().with_json("data/apps/a.json", json!({}));
        let registry = SchemaRegistry::default();
        let report = Validator::new(&source, &registry).validate_all(RecordType::App);
        assert_eq!(
            report.entries()[0].errors,
            vec!["no schema registered for record type app"]
        );
    }

    #[test]
    fn single_file_validation() {
        let source = MemorySource::new().with_json(
            "data/addresses/1/0xa.json",
            json!({"address": "0x12", "chainId": 1}),
        );
        let registry = permissive_registry();
        let report = Validator::new(&source, &registry)
            .validate_file(RecordType::Address, "data/addresses/1/0xa.json");
        assert_eq!(report.entries()[0].errors, vec!["Invalid address format: 0x12"]);
    }

    #[test]
    fn single_missing_file_is_a_read_error() {
        let source = MemorySource::new();
        let registry = permissive_registry();
        let report =
            Validator::new(&source, &registry).validate_file(RecordType::App, "data/apps/x.json");
        assert!(report.entries()[0].errors[0].starts_with("Failed to read file: "));
    }
}
