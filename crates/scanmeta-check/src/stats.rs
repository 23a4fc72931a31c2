//! # Dataset Statistics
//!
//! Record counts per type, counted the way the published manifest counts
//! them: one per file for tokens, apps, and address records; one per array
//! element for the aggregate types; one per topic key for event maps.
//!
//! Tokens, address records, and event maps are counted only inside numeric
//! `<chainId>/` directories. Files that cannot be read or parsed are not
//! counted.

use std::collections::BTreeMap;

use scanmeta_core::{ChainId, RecordType, Storage};
use serde::Serialize;
use serde_json::Value;

use crate::source::{self, DatasetSource};

/// Number of records per type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DatasetStats {
    counts: BTreeMap<RecordType, usize>,
}

impl DatasetStats {
    /// Count the records of every type.
    pub fn collect(source: &dyn DatasetSource) -> Self {
        let counts = RecordType::ALL
            .into_iter()
            .map(|ty| (ty, count(source, ty)))
            .collect();
        Self { counts }
    }

    /// Records of one type.
    pub fn get(&self, record_type: RecordType) -> usize {
        self.counts.get(&record_type).copied().unwrap_or(0)
    }

    /// Records across all types.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// `(type, count)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (RecordType, usize)> + '_ {
        self.counts.iter().map(|(ty, n)| (*ty, *n))
    }
}

fn parse(source: &dyn DatasetSource, path: &str) -> Option<Value> {
    let bytes = source.read(path).ok()?;
    serde_json::from_slice(&bytes).ok()
}

fn count(source: &dyn DatasetSource, record_type: RecordType) -> usize {
    match record_type.storage() {
        Storage::Aggregate { file, key } => parse(source, file)
            .and_then(|value| value.get(key).and_then(Value::as_array).map(Vec::len))
            .unwrap_or(0),
        Storage::Directory {
            dir,
            chain_partitioned: false,
        } => source::documents(source, dir)
            .filter(|doc| {
                doc.contents
                    .as_ref()
                    .is_ok_and(|bytes| serde_json::from_slice::<Value>(bytes).is_ok())
            })
            .count(),
        Storage::Directory {
            dir,
            chain_partitioned: true,
        } => chain_dirs(source, dir)
            .iter()
            .flat_map(|chain_dir| {
                source
                    .files(chain_dir)
                    .unwrap_or_default()
                    .into_iter()
                    .filter(|name| name.ends_with(".json"))
                    .map(move |name| source::join(chain_dir, &name))
            })
            .filter_map(|path| parse(source, &path))
            .map(|value| {
                if record_type == RecordType::EventMap {
                    value.as_object().map_or(0, |map| map.len())
                } else {
                    1
                }
            })
            .sum(),
    }
}

fn chain_dirs(source: &dyn DatasetSource, dir: &str) -> Vec<String> {
    source
        .subdirs(dir)
        .unwrap_or_default()
        .into_iter()
        .filter(|name| ChainId::from_dir_name(name).is_ok())
        .map(|name| source::join(dir, &name))
        .collect()
}
