//! # Semantic Rules
//!
//! Checks that JSON Schema cannot express: address shape, agreement between
//! a record's `chainId` and the directory it sits in, NFT decimals, and
//! existence of referenced files. They run only on documents that already
//! passed their schema, and every rule runs, so one document can collect
//! several messages.
//!
//! | Record type                        | Rules                                   |
//! |------------------------------------|-----------------------------------------|
//! | token                              | address, chain dir, NFT decimals, files |
//! | address                            | address, chain dir, files               |
//! | app, organization, network         | files                                   |
//! | event-map                          | topic keys                              |
//! | supporter, donation                | none                                    |

use scanmeta_core::{ChainId, HexAddress, RecordType, TopicHash};
use serde_json::Value;

use crate::source::DatasetSource;

/// Fields that name a file relative to the dataset root.
pub const REFERENCE_FIELDS: [&str; 2] = ["profile", "logo"];

/// What the rules may consult besides the document itself.
pub struct RuleContext<'a> {
    /// Used to resolve `profile` and `logo` references.
    pub source: &'a dyn DatasetSource,
    /// Chain id parsed from the enclosing `<chainId>/` directory, if the
    /// document sits in one.
    pub chain_dir: Option<ChainId>,
}

/// Run every semantic rule for `record_type` and collect the messages.
pub fn check(record_type: RecordType, document: &Value, ctx: &RuleContext<'_>) -> Vec<String> {
    let mut errors = Vec::new();
    match record_type {
        RecordType::Token => {
            errors.extend(address_format(document));
            errors.extend(chain_location(document, ctx.chain_dir));
            errors.extend(nft_decimals(document));
            errors.extend(referenced_files(document, ctx.source));
        }
        RecordType::Address => {
            errors.extend(address_format(document));
            errors.extend(chain_location(document, ctx.chain_dir));
            errors.extend(referenced_files(document, ctx.source));
        }
        RecordType::App | RecordType::Organization | RecordType::Network => {
            errors.extend(referenced_files(document, ctx.source));
        }
        RecordType::EventMap => errors.extend(topic_keys(document)),
        RecordType::Supporter | RecordType::Donation => {}
    }
    errors
}

pub(crate) fn non_empty_str<'v>(document: &'v Value, field: &str) -> Option<&'v str> {
    document
        .get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// A JSON number holding a non-negative whole value, whether written as
/// `10` or `10.0`.
pub(crate) fn integer(value: &Value) -> Option<u64> {
    value.as_u64().or_else(|| {
        let f = value.as_f64()?;
        (f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64).then_some(f as u64)
    })
}

/// `address`, when present, is `0x` followed by 40 hex digits.
pub fn address_format(document: &Value) -> Option<String> {
    let address = non_empty_str(document, "address")?;
    HexAddress::new(address).err().map(|e| e.to_string())
}

/// The declared `chainId` equals the chain directory the file sits in.
///
/// Documents outside a numeric chain directory are not checked.
pub fn chain_location(document: &Value, chain_dir: Option<ChainId>) -> Option<String> {
    let expected = chain_dir?;
    let declared = document.get("chainId");
    if declared.and_then(integer) == Some(expected.as_u64()) {
        return None;
    }
    let shown = match declared {
        Some(value) => value.to_string(),
        None => "missing".to_string(),
    };
    Some(format!(
        "chainId mismatch: file is in {expected}/ but chainId is {shown}"
    ))
}

/// A token with a `type` other than `ERC20` is an NFT and has no decimals.
pub fn nft_decimals(document: &Value) -> Option<String> {
    let token_type = non_empty_str(document, "type")?;
    if token_type == "ERC20" {
        return None;
    }
    let decimals = document.get("decimals");
    if decimals.and_then(integer) == Some(0) {
        return None;
    }
    let shown = match decimals {
        Some(value) => value.to_string(),
        None => "missing".to_string(),
    };
    Some(format!(
        "NFT tokens ({token_type}) should have decimals = 0, got {shown}"
    ))
}

/// Every `profile` / `logo` path exists under the dataset root. A leading
/// `/` is ignored.
pub fn referenced_files(document: &Value, source: &dyn DatasetSource) -> Vec<String> {
    REFERENCE_FIELDS
        .iter()
        .filter_map(|field| {
            let reference = non_empty_str(document, field)?;
            let path = reference.trim_start_matches('/');
            if source.exists(path) {
                None
            } else {
                Some(format!("Referenced {field} not found: {reference}"))
            }
        })
        .collect()
}

/// Every top-level key of an event map is a lowercase topic0 hash.
pub fn topic_keys(document: &Value) -> Vec<String> {
    let Some(map) = document.as_object() else {
        return Vec::new();
    };
    map.keys()
        .filter_map(|key| TopicHash::new(key.as_str()).err())
        .map(|e| e.to_string())
        .collect()
}
