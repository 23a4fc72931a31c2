//! # Identity Primitives
//!
//! Newtypes for the identifiers that key dataset records: contract and
//! account addresses, event topic hashes, and chain ids. Each validates its
//! format at construction time.
//!
//! ## Address casing
//!
//! [`HexAddress`] accepts any mix of upper- and lowercase hex digits and
//! keeps the original casing. Only the raw hex shape is verified: mixed-case
//! EIP-55 checksums are *not* checked, and two addresses are the same record
//! when their lowercase forms are equal (see [`normalize_address`]).

use serde::{Deserialize, Serialize};

use crate::error::FormatError;

/// Length of `0x` plus 40 hex digits.
const ADDRESS_LEN: usize = 42;

/// Length of `0x` plus 64 hex digits.
const TOPIC_HASH_LEN: usize = 66;

/// Lowercase an address for identity comparison.
///
/// This is the only normalization applied when detecting duplicate
/// addresses.
pub fn normalize_address(address: &str) -> String {
    address.to_ascii_lowercase()
}

/// A 20-byte hex address, `0x` followed by 40 hex digits in any case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HexAddress(String);

impl HexAddress {
    /// Create an address from a string, validating its format.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::InvalidAddress`] if the string is not `0x`
    /// followed by exactly 40 hexadecimal characters.
    pub fn new(value: impl Into<String>) -> Result<Self, FormatError> {
        let s = value.into();
        if Self::is_valid(&s) {
            Ok(Self(s))
        } else {
            Err(FormatError::InvalidAddress(s))
        }
    }

    /// Check the address shape without constructing.
    pub fn is_valid(s: &str) -> bool {
        s.len() == ADDRESS_LEN
            && s.starts_with("0x")
            && s[2..].chars().all(|c| c.is_ascii_hexdigit())
    }

    /// Access the address as written.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The lowercase form used as the record identity.
    pub fn normalized(&self) -> String {
        normalize_address(&self.0)
    }
}

impl std::fmt::Display for HexAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An event signature hash (topic0): `0x` followed by 64 lowercase hex digits.
///
/// Unlike addresses, topic hashes are keys in event-map files and must be
/// written in lowercase; `0xABC…` is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TopicHash(String);

impl TopicHash {
    /// Create a topic hash from a string, validating its format.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::InvalidTopicHash`] if the string is not `0x`
    /// followed by exactly 64 lowercase hexadecimal characters.
    pub fn new(value: impl Into<String>) -> Result<Self, FormatError> {
        let s = value.into();
        if Self::is_valid(&s) {
            Ok(Self(s))
        } else {
            Err(FormatError::InvalidTopicHash(s))
        }
    }

    /// Check the topic hash shape without constructing.
    pub fn is_valid(s: &str) -> bool {
        s.len() == TOPIC_HASH_LEN
            && s.starts_with("0x")
            && s[2..]
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
    }

    /// Access the hash string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TopicHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Numeric identifier of a blockchain network.
///
/// Chain-partitioned directories (`data/tokens/<chainId>/`) are named by
/// the decimal chain id; [`ChainId::from_dir_name`] recovers it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(u64);

impl ChainId {
    /// Wrap a raw chain id.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Parse a chain id from a directory name.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::InvalidChainId`] unless the name is a
    /// non-empty run of ASCII digits that fits in a `u64`.
    pub fn from_dir_name(name: &str) -> Result<Self, FormatError> {
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_digit()) {
            return Err(FormatError::InvalidChainId(name.to_string()));
        }
        name.parse::<u64>()
            .map(Self)
            .map_err(|_| FormatError::InvalidChainId(name.to_string()))
    }

    /// Access the numeric value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ChainId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
