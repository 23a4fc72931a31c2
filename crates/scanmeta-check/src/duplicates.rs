//! # Cross-Record Duplicate Detection
//!
//! Each [`DuplicateScope`] maps a normalized key to the first location that
//! used it. A later record with the same key produces one invalid result at
//! its own location, naming the original. First occurrence wins, and
//! scanning is a single pass per scope.
//!
//! Addresses are compared by their lowercase form only. EIP-55 checksums
//! are not consulted.
//!
//! Only records that can be read and parsed take part. An unreadable
//! directory or a malformed file contributes no keys; the structural pass
//! already reports those problems.

use std::collections::HashMap;

use scanmeta_core::{normalize_address, Location, RecordType, Report, Storage, ValidationResult};
use serde_json::Value;

use crate::semantic::{self, non_empty_str};
use crate::source::{self, DatasetSource};
use crate::validator::element_location;

/// A set of records that must not share a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DuplicateScope {
    /// Token addresses within one chain directory.
    TokenAddresses,
    /// Address-record addresses within one chain directory.
    AddressRecords,
    /// App ids across `data/apps/`.
    AppIds,
    /// Organization ids across `data/organizations.json`.
    OrganizationIds,
    /// Network chain ids across `data/networks.json`.
    NetworkChainIds,
}

impl DuplicateScope {
    /// Every scope, in the order they are checked.
    pub const ALL: [DuplicateScope; 5] = [
        DuplicateScope::TokenAddresses,
        DuplicateScope::AppIds,
        DuplicateScope::AddressRecords,
        DuplicateScope::OrganizationIds,
        DuplicateScope::NetworkChainIds,
    ];

    /// The record type whose records this scope covers.
    pub fn record_type(&self) -> RecordType {
        match self {
            Self::TokenAddresses => RecordType::Token,
            Self::AddressRecords => RecordType::Address,
            Self::AppIds => RecordType::App,
            Self::OrganizationIds => RecordType::Organization,
            Self::NetworkChainIds => RecordType::Network,
        }
    }
}

/// First-wins index for one scope.
struct FirstSeen {
    seen: HashMap<String, Location>,
    report: Report,
}

impl FirstSeen {
    fn new() -> Self {
        Self {
            seen: HashMap::new(),
            report: Report::new(),
        }
    }

    fn observe(
        &mut self,
        key: String,
        location: Location,
        describe: impl FnOnce(&str, &Location) -> String,
    ) {
        match self.seen.get(&key) {
            Some(original) => {
                let message = describe(&key, original);
                self.report.push(ValidationResult::single(location, message));
            }
            None => {
                self.seen.insert(key, location);
            }
        }
    }
}

/// Runs duplicate scopes over a [`DatasetSource`].
pub struct DuplicateChecker<'a> {
    source: &'a dyn DatasetSource,
}

impl<'a> DuplicateChecker<'a> {
    /// Create a checker. Nothing is read until a check runs.
    pub fn new(source: &'a dyn DatasetSource) -> Self {
        Self { source }
    }

    /// Run every scope.
    pub fn check_duplicates(&self) -> Report {
        self.check(&DuplicateScope::ALL)
    }

    /// Run the given scopes, in order.
    pub fn check(&self, scopes: &[DuplicateScope]) -> Report {
        let mut report = Report::new();
        for scope in scopes {
            let found = match scope {
                DuplicateScope::TokenAddresses => {
                    self.per_chain_addresses(RecordType::Token, "token address")
                }
                DuplicateScope::AddressRecords => {
                    self.per_chain_addresses(RecordType::Address, "address")
                }
                DuplicateScope::AppIds => self.app_ids(),
                DuplicateScope::OrganizationIds => {
                    self.aggregate_keys(RecordType::Organization, "id", "organization ID")
                }
                DuplicateScope::NetworkChainIds => {
                    self.aggregate_keys(RecordType::Network, "chainId", "network chainId")
                }
            };
            tracing::info!(scope = ?scope, duplicates = found.len(), "duplicate check");
            report.merge(found);
        }
        report
    }

    /// Parsed documents directly inside `dir`. Unreadable or malformed
    /// inputs are skipped.
    fn parsed_files(&self, dir: &str) -> Vec<(String, Value)> {
        let names = match self.source.files(dir) {
            Ok(names) => names,
            Err(e) => {
                tracing::warn!(dir, error = %e, "skipping unreadable directory in duplicate check");
                return Vec::new();
            }
        };
        names
            .into_iter()
            .filter(|name| name.ends_with(".json"))
            .filter_map(|name| {
                let path = source::join(dir, &name);
                let bytes = self.source.read(&path).ok()?;
                let value = serde_json::from_slice::<Value>(&bytes).ok()?;
                Some((path, value))
            })
            .collect()
    }

    fn per_chain_addresses(&self, record_type: RecordType, noun: &str) -> Report {
        let dir = record_type.storage().path();
        let chains = match self.source.subdirs(dir) {
            Ok(chains) => chains,
            Err(e) => {
                tracing::warn!(dir, error = %e, "skipping unreadable directory in duplicate check");
                return Report::new();
            }
        };

        let mut report = Report::new();
        for chain in chains {
            let mut index = FirstSeen::new();
            for (path, value) in self.parsed_files(&source::join(dir, &chain)) {
                let Some(address) = non_empty_str(&value, "address") else {
                    continue;
                };
                index.observe(normalize_address(address), Location::file(path), |key, original| {
                    format!("Duplicate {noun} {key} (also in {original})")
                });
            }
            report.merge(index.report);
        }
        report
    }

    fn app_ids(&self) -> Report {
        let mut index = FirstSeen::new();
        for (path, value) in self.parsed_files(RecordType::App.storage().path()) {
            let Some(id) = non_empty_str(&value, "id") else {
                continue;
            };
            index.observe(id.to_string(), Location::file(path), |key, original| {
                format!("Duplicate app ID \"{key}\" (also in {original})")
            });
        }
        index.report
    }

    fn aggregate_keys(&self, record_type: RecordType, field: &str, noun: &str) -> Report {
        let Storage::Aggregate { file, key } = record_type.storage() else {
            return Report::new();
        };
        let Some(elements) = self
            .source
            .read(file)
            .ok()
            .and_then(|bytes| serde_json::from_slice::<Value>(&bytes).ok())
            .and_then(|mut value| value.get_mut(key).map(Value::take))
        else {
            return Report::new();
        };
        let Value::Array(elements) = elements else {
            return Report::new();
        };

        let mut index = FirstSeen::new();
        for (i, element) in elements.iter().enumerate() {
            let (id, quoted) = match element.get(field) {
                Some(Value::String(s)) if !s.is_empty() => (s.clone(), true),
                Some(value) if value.is_number() => {
                    let key = semantic::integer(value)
                        .map_or_else(|| value.to_string(), |n| n.to_string());
                    (key, false)
                }
                _ => continue,
            };
            let location = element_location(record_type, file, i, element);
            index.observe(id, location, |key, original| {
                if quoted {
                    format!("Duplicate {noun} \"{key}\" (also in {original})")
                } else {
                    format!("Duplicate {noun} {key} (also in {original})")
                }
            });
        }
        index.report
    }
}
