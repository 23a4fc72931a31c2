#![deny(missing_docs)]

//! # scanmeta-check: Dataset Validation Engine
//!
//! Reads a metadata dataset through a [`DatasetSource`], validates every
//! record against the [`scanmeta_schema::SchemaRegistry`], applies the
//! per-type semantic rules, and detects duplicate identifiers across
//! records.
//!
//! ## Passes
//!
//! - [`Validator`] validates all records of one type.
//! - [`DuplicateChecker`] runs the cross-record duplicate scopes.
//! - [`pipeline::run`] runs both in the fixed order and merges their
//!   reports.
//!
//! Passes share nothing except the source they read from. Each returns its
//! own [`scanmeta_core::Report`].
//!
//! ## Example
//!
//! ```no_run
//! use scanmeta_check::{pipeline, FsSource, ValidationPlan};
//! use scanmeta_schema::SchemaRegistry;
//!
//! let registry = SchemaRegistry::load("schemas").unwrap();
//! let source = FsSource::new(".");
//! let report = pipeline::run(&source, &registry, &ValidationPlan::all());
//! std::process::exit(i32::from(report.exit_code()));
//! ```

pub mod duplicates;
pub mod pipeline;
pub mod semantic;
pub mod source;
pub mod stats;
pub mod validator;

pub use duplicates::{DuplicateChecker, DuplicateScope};
pub use pipeline::ValidationPlan;
pub use source::{documents, DatasetSource, Document, Documents, FsSource, MemorySource, SourceError};
pub use stats::DatasetStats;
pub use validator::Validator;
