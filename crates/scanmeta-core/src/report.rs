//! # Validation Results and Reports
//!
//! A [`ValidationResult`] records the outcome for one location. A [`Report`]
//! is an append-only, ordered list of results. Each validation pass builds
//! and returns its own report; the caller merges them in pass order with
//! [`Report::merge`].
//!
//! Reports contain no timestamps or other run-dependent data, so validating
//! an unchanged dataset twice yields equal (and identically serialized)
//! reports.

use serde::Serialize;

use crate::location::Location;

/// Outcome of validating one location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    /// Where the result applies.
    pub location: Location,
    /// Whether the location passed every check.
    pub valid: bool,
    /// Human-readable problems, in the order they were found.
    pub errors: Vec<String>,
}

impl ValidationResult {
    /// A passing result.
    pub fn valid(location: Location) -> Self {
        Self {
            location,
            valid: true,
            errors: Vec::new(),
        }
    }

    /// A failing result with the given errors.
    pub fn invalid(location: Location, errors: Vec<String>) -> Self {
        Self {
            location,
            valid: false,
            errors,
        }
    }

    /// A failing result with a single error.
    pub fn single(location: Location, error: impl Into<String>) -> Self {
        Self::invalid(location, vec![error.into()])
    }

    /// Valid when `errors` is empty, invalid otherwise.
    pub fn from_errors(location: Location, errors: Vec<String>) -> Self {
        if errors.is_empty() {
            Self::valid(location)
        } else {
            Self::invalid(location, errors)
        }
    }
}

/// Aggregate counts over a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Number of results.
    pub total: usize,
    /// Number of passing results.
    pub valid: usize,
    /// Number of failing results.
    pub invalid: usize,
}

/// Ordered accumulation of validation results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Report {
    entries: Vec<ValidationResult>,
}

impl Report {
    /// An empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one result.
    pub fn push(&mut self, result: ValidationResult) {
        self.entries.push(result);
    }

    /// Append every result of `other`, preserving its order.
    pub fn merge(&mut self, other: Report) {
        self.entries.extend(other.entries);
    }

    /// All results in insertion order.
    pub fn entries(&self) -> &[ValidationResult] {
        &self.entries
    }

    /// Number of results.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the report holds no results.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Failing results in insertion order.
    pub fn invalid(&self) -> impl Iterator<Item = &ValidationResult> {
        self.entries.iter().filter(|r| !r.valid)
    }

    /// Total / valid / invalid counts.
    pub fn summary(&self) -> Summary {
        let valid = self.entries.iter().filter(|r| r.valid).count();
        Summary {
            total: self.entries.len(),
            valid,
            invalid: self.entries.len() - valid,
        }
    }

    /// True when every result is valid (an empty report is a success).
    pub fn is_success(&self) -> bool {
        self.entries.iter().all(|r| r.valid)
    }

    /// Process exit code for CI gating: 0 when all results are valid, 1
    /// otherwise.
    pub fn exit_code(&self) -> u8 {
        if self.is_success() {
            0
        } else {
            1
        }
    }
}

impl FromIterator<ValidationResult> for Report {
    fn from_iter<I: IntoIterator<Item = ValidationResult>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl Extend<ValidationResult> for Report {
    fn extend<I: IntoIterator<Item = ValidationResult>>(&mut self, iter: I) {
        self.entries.extend(iter);
    }
}

impl IntoIterator for Report {
    type Item = ValidationResult;
    type IntoIter = std::vec::IntoIter<ValidationResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(path: &str) -> ValidationResult {
        ValidationResult::valid(Location::file(path))
    }

    fn bad(path: &str, err: &str) -> ValidationResult {
        ValidationResult::single(Location::file(path), err)
    }

    #[test]
    fn from_errors_picks_validity() {
        assert!(ValidationResult::from_errors(Location::file("a"), vec![]).valid);
        let r = ValidationResult::from_errors(Location::file("a"), vec!["x".into(), "y".into()]);
        assert!(!r.valid);
        assert_eq!(r.errors, vec!["x", "y"]);
    }

    #[test]
    fn empty_report_is_success() {
        let report = Report::new();
        assert!(report.is_success());
        assert_eq!(report.exit_code(), 0);
        assert_eq!(
            report.summary(),
            Summary {
                total: 0,
                valid: 0,
                invalid: 0
            }
        );
    }

    #[test]
    fn one_invalid_entry_fails_the_report() {
        let report: Report = vec![ok("a"), bad("b", "broken"), ok("c")].into_iter().collect();
        assert!(!report.is_success());
        assert_eq!(report.exit_code(), 1);
        assert_eq!(report.summary().invalid, 1);
        assert_eq!(report.summary().valid, 2);
        let invalid: Vec<_> = report.invalid().map(|r| r.location.to_string()).collect();
        assert_eq!(invalid, vec!["b"]);
    }

    #[test]
    fn merge_preserves_pass_order() {
        let mut first: Report = vec![ok("a")].into_iter().collect();
        let second: Report = vec![bad("b", "dup"), ok("c")].into_iter().collect();
        first.merge(second);
        let order: Vec<_> = first.entries().iter().map(|r| r.location.to_string()).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn serializes_as_entry_array() {
        let report: Report = vec![bad("data/apps/x.json", "oops")].into_iter().collect();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"location": "data/apps/x.json", "valid": false, "errors": ["oops"]}
            ])
        );
    }
}
