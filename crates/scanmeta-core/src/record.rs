//! # Record Types and Storage Layout
//!
//! The dataset holds eight kinds of record. How a kind is stored is a fixed
//! property of the kind:
//!
//! | Record type    | Storage                                   |
//! |----------------|-------------------------------------------|
//! | `token`        | `data/tokens/<chainId>/*.json`            |
//! | `app`          | `data/apps/*.json`                        |
//! | `event-map`    | `data/events/<chainId>/*.json`            |
//! | `address`      | `data/addresses/<chainId>/*.json`         |
//! | `organization` | `data/organizations.json` → `organizations` |
//! | `network`      | `data/networks.json` → `networks`         |
//! | `supporter`    | `data/supporters.json` → `supporters`     |
//! | `donation`     | `data/donations.json` → `donations`       |
//!
//! Paths are relative to the dataset root and always use `/` separators so
//! that rendered report locations do not depend on the host platform.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ScanmetaError;

/// The kind of a dataset record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecordType {
    /// A fungible or non-fungible token contract on one chain.
    Token,
    /// A blockchain network.
    Network,
    /// A wallet, dapp, exchange, or tool.
    App,
    /// A foundation, company, or other organization.
    Organization,
    /// A paying supporter of the dataset.
    Supporter,
    /// An on-chain donation.
    Donation,
    /// A mapping from topic0 hash to event description for one chain.
    EventMap,
    /// A labelled account or contract address on one chain.
    Address,
}

/// Where the records of one [`RecordType`] live under the dataset root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    /// One JSON file per record under `dir`.
    Directory {
        /// Directory relative to the dataset root.
        dir: &'static str,
        /// Whether records sit in `<chainId>/` subdirectories.
        chain_partitioned: bool,
    },
    /// Records are the elements of an array inside a single JSON file.
    Aggregate {
        /// File relative to the dataset root.
        file: &'static str,
        /// Top-level key holding the array.
        key: &'static str,
    },
}

impl Storage {
    /// The directory or file this storage is rooted at.
    pub fn path(&self) -> &'static str {
        match self {
            Self::Directory { dir, .. } => dir,
            Self::Aggregate { file, .. } => file,
        }
    }
}

impl RecordType {
    /// All record types, in declaration order.
    pub const ALL: [RecordType; 8] = [
        RecordType::Token,
        RecordType::Network,
        RecordType::App,
        RecordType::Organization,
        RecordType::Supporter,
        RecordType::Donation,
        RecordType::EventMap,
        RecordType::Address,
    ];

    /// Canonical kebab-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Token => "token",
            Self::Network => "network",
            Self::App => "app",
            Self::Organization => "organization",
            Self::Supporter => "supporter",
            Self::Donation => "donation",
            Self::EventMap => "event-map",
            Self::Address => "address",
        }
    }

    /// Filename of the schema describing one record of this type.
    pub fn schema_file(&self) -> &'static str {
        match self {
            Self::Token => "token.schema.json",
            Self::Network => "network.schema.json",
            Self::App => "app.schema.json",
            Self::Organization => "organization.schema.json",
            Self::Supporter => "supporter.schema.json",
            Self::Donation => "donation.schema.json",
            Self::EventMap => "event.schema.json",
            Self::Address => "address.schema.json",
        }
    }

    /// The storage shape of this type.
    pub fn storage(&self) -> Storage {
        match self {
            Self::Token => Storage::Directory {
                dir: "data/tokens",
                chain_partitioned: true,
            },
            Self::App => Storage::Directory {
                dir: "data/apps",
                chain_partitioned: false,
            },
            Self::EventMap => Storage::Directory {
                dir: "data/events",
                chain_partitioned: true,
            },
            Self::Address => Storage::Directory {
                dir: "data/addresses",
                chain_partitioned: true,
            },
            Self::Organization => Storage::Aggregate {
                file: "data/organizations.json",
                key: "organizations",
            },
            Self::Network => Storage::Aggregate {
                file: "data/networks.json",
                key: "networks",
            },
            Self::Supporter => Storage::Aggregate {
                file: "data/supporters.json",
                key: "supporters",
            },
            Self::Donation => Storage::Aggregate {
                file: "data/donations.json",
                key: "donations",
            },
        }
    }

    /// The field that identifies an element of an aggregate file, used to
    /// label its report location.
    pub fn label_field(&self) -> Option<&'static str> {
        match self {
            Self::Organization | Self::Supporter => Some("id"),
            Self::Network => Some("chainId"),
            Self::Donation => Some("txHash"),
            Self::Token | Self::App | Self::EventMap | Self::Address => None,
        }
    }

    /// Infer the record type from a path relative to the dataset root.
    ///
    /// Directory-stored types match any `.json` file beneath their directory;
    /// aggregate types match their exact file.
    pub fn from_path(rel_path: &str) -> Option<RecordType> {
        let rel_path = rel_path.trim_start_matches("./");
        Self::ALL.into_iter().find(|ty| match ty.storage() {
            Storage::Directory { dir, .. } => rel_path
                .strip_prefix(dir)
                .is_some_and(|rest| rest.starts_with('/') && rest.ends_with(".json")),
            Storage::Aggregate { file, .. } => rel_path == file,
        })
    }
}

impl std::fmt::Display for RecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = ScanmetaError;

    /// Accepts the canonical name, the plural directory name, and the
    /// `event`/`events` shorthand.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "token" | "tokens" => Ok(Self::Token),
            "network" | "networks" => Ok(Self::Network),
            "app" | "apps" => Ok(Self::App),
            "organization" | "organizations" | "org" | "orgs" => Ok(Self::Organization),
            "supporter" | "supporters" => Ok(Self::Supporter),
            "donation" | "donations" => Ok(Self::Donation),
            "event-map" | "event" | "events" => Ok(Self::EventMap),
            "address" | "addresses" => Ok(Self::Address),
            _ => Err(ScanmetaError::UnknownRecordType(s.to_string())),
        }
    }
}
