//! # scanmeta-schema: Structural Validation
//!
//! Binds each [`RecordType`](scanmeta_core::RecordType) to the JSON Schema
//! that describes one record of that type, and exposes the compiled schemas
//! as [`DocumentSchema`] capabilities.
//!
//! ## Responsibilities
//!
//! - **Loading:** read every `*.schema.json` in the schema directory so that
//!   shared definitions (`common.schema.json`) are available to `$ref`.
//! - **Compilation:** compile one validator per record type at startup, with
//!   format validation (`uri`, `date-time`, ...) enabled. A missing,
//!   malformed, or uncompilable schema is a fatal [`SchemaRegistryError`].
//! - **Checking:** [`DocumentSchema::check`] returns every violation as a
//!   [`Violation`] (`<field-path> <message>`), never the first one only.
//!
//! ## Design
//!
//! The registry is built once and is read-only afterwards. `$ref`s are
//! resolved from the loaded schemas only; the validator never touches the
//! network.

pub mod compiled;
pub mod registry;

pub use compiled::{CompiledSchema, DocumentSchema, SchemaCheck, Violation};
pub use registry::{SchemaRegistry, SchemaRegistryError, SCHEMA_URI_PREFIX};
