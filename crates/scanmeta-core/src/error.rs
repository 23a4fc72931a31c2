//! # Error Hierarchy
//!
//! Structured error types shared by the scanmeta crates, built with
//! `thiserror`. No `Box<dyn Error>`, no `.unwrap()` outside tests.
//!
//! Note that these errors describe failures of the tool itself or of a
//! primitive's constructor. Problems found *in the dataset* are never
//! returned as errors: they become entries in a [`crate::Report`].

use thiserror::Error;

/// Errors raised when parsing names the user supplies, such as record types
/// given on the command line or in the config file.
#[derive(Error, Debug)]
pub enum ScanmetaError {
    /// A record type name did not match any known record type.
    #[error("unknown record type: \"{0}\" (expected one of token, network, app, organization, supporter, donation, event-map, address)")]
    UnknownRecordType(String),
}

/// Format errors for the hex and numeric primitives.
///
/// Each variant carries the rejected input so the message can be copied
/// straight into a report entry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// Address is not `0x` followed by 40 hexadecimal characters.
    #[error("Invalid address format: {0}")]
    InvalidAddress(String),

    /// Topic hash is not `0x` followed by 64 lowercase hexadecimal characters.
    #[error("Invalid topic0 hash format: {0}")]
    InvalidTopicHash(String),

    /// Chain id is not a non-negative decimal integer.
    #[error("invalid chain id: \"{0}\" (expected a decimal integer)")]
    InvalidChainId(String),
}
