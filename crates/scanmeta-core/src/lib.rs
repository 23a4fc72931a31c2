#![deny(missing_docs)]

//! # scanmeta-core: Foundational Types for the Metadata Validator
//!
//! This crate defines the types every other crate in the workspace shares.
//! It has no internal crate dependencies: only `serde` and `thiserror` from
//! the external ecosystem.
//!
//! ## Design Principles
//!
//! 1. **Single [`RecordType`] enum.** The eight kinds of dataset record are a
//!    closed set. Each variant knows where it lives on disk ([`Storage`]) and
//!    which schema file describes it, so no pass keeps its own path table.
//!
//! 2. **Locations are values.** A [`Location`] is either a file path or an
//!    element of an aggregate file. It renders the same way every run, which
//!    keeps reports byte-identical for an unchanged dataset.
//!
//! 3. **Results are accumulated, not shared.** Every pass returns its own
//!    [`Report`]; the orchestrator merges them. There is no global result list.
//!
//! 4. **Format checks live on the primitives.** [`HexAddress`], [`TopicHash`]
//!    and [`ChainId`] validate at construction time and report a
//!    [`FormatError`] carrying the rejected input.

pub mod error;
pub mod identity;
pub mod location;
pub mod record;
pub mod report;

// Re-export primary types at crate root for ergonomic imports.
pub use error::{FormatError, ScanmetaError};
pub use identity::{normalize_address, ChainId, HexAddress, TopicHash};
pub use location::Location;
pub use record::{RecordType, Storage};
pub use report::{Report, Summary, ValidationResult};
