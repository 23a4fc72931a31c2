//! # Validation Pipeline
//!
//! Runs the passes in a fixed order and merges their reports:
//!
//! 1. Structural and semantic validation of token, app, organization,
//!    network, supporter, donation.
//! 2. Duplicate detection.
//! 3. Structural and semantic validation of event-map, address.
//!
//! A [`ValidationPlan`] narrows which record types take part. Duplicate
//! scopes follow the plan: a scope runs only when its record type is
//! enabled.

use std::collections::BTreeSet;

use scanmeta_core::{RecordType, Report};
use scanmeta_schema::SchemaRegistry;

use crate::duplicates::{DuplicateChecker, DuplicateScope};
use crate::source::DatasetSource;
use crate::validator::Validator;

/// Record types validated before the duplicate pass.
pub const FIRST_PASS: [RecordType; 6] = [
    RecordType::Token,
    RecordType::App,
    RecordType::Organization,
    RecordType::Network,
    RecordType::Supporter,
    RecordType::Donation,
];

/// Record types validated after the duplicate pass.
pub const FINAL_PASS: [RecordType; 2] = [RecordType::EventMap, RecordType::Address];

/// Which passes a run includes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationPlan {
    record_types: BTreeSet<RecordType>,
    duplicates: bool,
}

impl Default for ValidationPlan {
    fn default() -> Self {
        Self::all()
    }
}

impl ValidationPlan {
    /// Every record type plus duplicate detection.
    pub fn all() -> Self {
        Self {
            record_types: RecordType::ALL.into_iter().collect(),
            duplicates: true,
        }
    }

    /// Only the given record types (duplicate detection stays on for them).
    pub fn only(record_types: impl IntoIterator<Item = RecordType>) -> Self {
        Self {
            record_types: record_types.into_iter().collect(),
            duplicates: true,
        }
    }

    /// Remove record types from the plan.
    pub fn skip(mut self, record_types: impl IntoIterator<Item = RecordType>) -> Self {
        for ty in record_types {
            self.record_types.remove(&ty);
        }
        self
    }

    /// Turn duplicate detection on or off.
    pub fn with_duplicates(mut self, enabled: bool) -> Self {
        self.duplicates = enabled;
        self
    }

    /// Whether `record_type` is validated.
    pub fn includes(&self, record_type: RecordType) -> bool {
        self.record_types.contains(&record_type)
    }

    /// Whether duplicate detection runs.
    pub fn duplicates(&self) -> bool {
        self.duplicates
    }

    /// Duplicate scopes this plan runs, in check order.
    pub fn duplicate_scopes(&self) -> Vec<DuplicateScope> {
        if !self.duplicates {
            return Vec::new();
        }
        DuplicateScope::ALL
            .into_iter()
            .filter(|scope| self.includes(scope.record_type()))
            .collect()
    }
}

/// Run the plan against a dataset and return the merged report.
pub fn run(source: &dyn DatasetSource, registry: &SchemaRegistry, plan: &ValidationPlan) -> Report {
    let validator = Validator::new(source, registry);
    let mut report = Report::new();

    for record_type in FIRST_PASS.into_iter().filter(|ty| plan.includes(*ty)) {
        report.merge(validator.validate_all(record_type));
    }

    let scopes = plan.duplicate_scopes();
    if !scopes.is_empty() {
        report.merge(DuplicateChecker::new(source).check(&scopes));
    }

    for record_type in FINAL_PASS.into_iter().filter(|ty| plan.includes(*ty)) {
        report.merge(validator.validate_all(record_type));
    }

    let summary = report.summary();
    tracing::info!(
        total = summary.total,
        valid = summary.valid,
        invalid = summary.invalid,
        "validation complete"
    );
    report
}
