//! Runtime schema validation for API payloads
//!
//! Every response body goes through [`decode`] before it reaches a caller:
//! serde checks the structural shape (required fields, JSON types) and each
//! record's [`Schema::check`] then walks the typed value for semantic
//! constraints such as token address formats. Unknown fields are ignored so
//! the client keeps working when the remote API adds fields.

use alloy::primitives::Address;
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::api::types::BlockchainType;

/// One mismatched field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    /// JSON path of the field, e.g. `tokens[1].token`. `$` is the document root.
    pub path: String,
    pub message: String,
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// A payload or argument set that failed its schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub struct ValidationError {
    pub schema: &'static str,
    pub issues: Vec<FieldIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}", self.schema)?;
        for (i, issue) in self.issues.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{}{}", sep, issue)?;
        }
        Ok(())
    }
}

impl ValidationError {
    pub fn single(schema: &'static str, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            schema,
            issues: vec![FieldIssue {
                path: path.into(),
                message: message.into(),
            }],
        }
    }

    /// Whether any issue points at `field` (matched against the last path segment).
    pub fn mentions(&self, field: &str) -> bool {
        self.issues.iter().any(|issue| {
            issue.path == field
                || issue.path.ends_with(&format!(".{}", field))
                || issue.message.contains(&format!("`{}`", field))
        })
    }
}

/// Collects issues for one schema while walking a value.
#[derive(Debug)]
pub struct Issues {
    schema: &'static str,
    items: Vec<FieldIssue>,
}

impl Issues {
    pub fn new(schema: &'static str) -> Self {
        Self {
            schema,
            items: Vec::new(),
        }
    }

    pub fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.items.push(FieldIssue {
            path: path.into(),
            message: message.into(),
        });
    }

    /// Require `value` to be a token address, optionally of a given chain family.
    pub fn address(&mut self, path: impl Into<String>, value: &str, family: Option<BlockchainType>) {
        let ok = match family {
            Some(BlockchainType::Evm) => is_evm_address(value),
            Some(BlockchainType::Svm) => is_svm_address(value),
            None => is_token_address(value),
        };
        if !ok {
            let expected = match family {
                Some(BlockchainType::Evm) => "an EVM address (0x + 40 hex chars)",
                Some(BlockchainType::Svm) => "a Solana address (base58, 32-44 chars)",
                None => "an EVM or Solana token address",
            };
            self.push(path, format!("expected {}, got {:?}", expected, value));
        }
    }

    pub fn non_empty(&mut self, path: impl Into<String>, value: &str) {
        if value.trim().is_empty() {
            self.push(path, "must not be empty");
        }
    }

    pub fn finite(&mut self, path: impl Into<String>, value: f64) {
        if !value.is_finite() {
            self.push(path, format!("expected a finite number, got {}", value));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn finish(self) -> Result<(), ValidationError> {
        if self.items.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                schema: self.schema,
                issues: self.items,
            })
        }
    }
}

/// A named, validating decoder for one payload shape.
pub trait Schema: DeserializeOwned {
    const NAME: &'static str;

    /// Semantic checks beyond what the structural decode enforces.
    fn check(&self, _issues: &mut Issues) {}
}

/// Decode and validate a JSON value against `T`'s schema.
pub fn decode<T: Schema>(value: Value) -> Result<T, ValidationError> {
    let record: T =
        serde_path_to_error::deserialize(value).map_err(|e| structural_error(T::NAME, &e))?;
    let mut issues = Issues::new(T::NAME);
    record.check(&mut issues);
    issues.finish()?;
    Ok(record)
}

/// Attach the failing field's path to a serde error. A missing field is
/// reported by its parent, so its name is appended to that path.
fn structural_error(
    schema: &'static str,
    err: &serde_path_to_error::Error<serde_json::Error>,
) -> ValidationError {
    let message = err.inner().to_string();
    let parent = err.path().to_string();
    let parent = (parent != ".").then_some(parent);

    let path = match (parent, missing_field_name(&message)) {
        (Some(parent), Some(field)) => format!("{}.{}", parent, field),
        (None, Some(field)) => field.to_string(),
        (Some(parent), None) => parent,
        (None, None) => "$".to_string(),
    };
    ValidationError::single(schema, path, message)
}

/// serde reports missing fields as ``missing field `name` ``.
fn missing_field_name(message: &str) -> Option<&str> {
    let rest = message.strip_prefix("missing field `")?;
    rest.split('`').next()
}

pub fn is_evm_address(value: &str) -> bool {
    match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => hex.len() == 40 && Address::from_str(hex).is_ok(),
        None => false,
    }
}

const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

pub fn is_svm_address(value: &str) -> bool {
    (32..=44).contains(&value.len()) && value.chars().all(|c| BASE58_ALPHABET.contains(c))
}

pub fn is_token_address(value: &str) -> bool {
    is_evm_address(value) || is_svm_address(value)
}

/// Infer the chain family from an address format.
pub fn address_family(value: &str) -> Option<BlockchainType> {
    if is_evm_address(value) {
        Some(BlockchainType::Evm)
    } else if is_svm_address(value) {
        Some(BlockchainType::Svm)
    } else {
        None
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    String(String),
}

fn coerce<E: de::Error>(raw: NumberOrString) -> Result<f64, E> {
    match raw {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| E::custom(format!("expected a number or numeric string, got {:?}", s))),
    }
}

/// Numeric field that may arrive as a JSON number or a numeric string.
pub fn number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    coerce(NumberOrString::deserialize(deserializer)?)
}

/// Optional variant of [`number`]; use with `#[serde(default)]`.
pub fn optional_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    match Option::<NumberOrString>::deserialize(deserializer)? {
        Some(raw) => coerce(raw).map(Some),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Holding {
        token: String,
        #[serde(deserialize_with = "number")]
        amount: f64,
        #[serde(default, deserialize_with = "optional_number")]
        price: Option<f64>,
    }

    impl Schema for Holding {
        const NAME: &'static str = "Holding";

        fn check(&self, issues: &mut Issues) {
            issues.address("token", &self.token, None);
        }
    }

    #[test]
    fn numeric_strings_are_coerced() {
        let h: Holding = decode(json!({
            "token": "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2",
            "amount": "1.25",
            "price": "3500.5"
        }))
        .unwrap();
        assert_eq!(h.amount, 1.25);
        assert_eq!(h.price, Some(3500.5));
    }

    #[test]
    fn unknown_fields_are_ignored_and_zero_is_valid() {
        let h: Holding = decode(json!({
            "token": "So11111111111111111111111111111111111111112",
            "amount": 0,
            "somethingNew": {"nested": true}
        }))
        .unwrap();
        assert_eq!(h.amount, 0.0);
        assert!(h.price.is_none());
    }

    #[test]
    fn missing_field_is_named() {
        let err = decode::<Holding>(json!({ "token": "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2" }))
            .unwrap_err();
        assert_eq!(err.schema, "Holding");
        assert_eq!(err.issues[0].path, "amount");
        assert!(err.mentions("amount"));
    }

    #[test]
    fn bad_numeric_string_is_rejected() {
        let err = decode::<Holding>(json!({
            "token": "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2",
            "amount": "lots"
        }))
        .unwrap_err();
        assert!(err.to_string().contains("numeric string"));
        assert_eq!(err.issues[0].path, "amount");
    }

    #[test]
    fn type_mismatch_reports_field_path() {
        let err = decode::<Holding>(json!({
            "token": "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2",
            "amount": true
        }))
        .unwrap_err();
        assert_eq!(err.issues[0].path, "amount");
        assert!(err.mentions("amount"));

        let err = decode::<Holding>(json!({ "token": 7, "amount": 1 })).unwrap_err();
        assert_eq!(err.issues[0].path, "token");
    }

    #[test]
    fn non_object_document_is_rooted() {
        let err = decode::<Holding>(json!("not a holding")).unwrap_err();
        assert_eq!(err.issues[0].path, "$");
    }

    #[test]
    fn address_pattern_mismatch_reports_path() {
        let err = decode::<Holding>(json!({ "token": "not-an-address", "amount": 1 })).unwrap_err();
        assert_eq!(err.issues.len(), 1);
        assert_eq!(err.issues[0].path, "token");
        assert!(err.to_string().starts_with("invalid Holding: token: expected"));
    }

    #[test]
    fn address_formats() {
        assert!(is_evm_address("0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2"));
        assert!(!is_evm_address("C02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2"));
        assert!(!is_evm_address("0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc"));
        assert!(!is_evm_address("0xZ02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2"));

        assert!(is_svm_address("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v"));
        assert!(!is_svm_address("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt10"));
        assert!(!is_svm_address("short"));

        assert_eq!(
            address_family("0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2"),
            Some(BlockchainType::Evm)
        );
        assert_eq!(
            address_family("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v"),
            Some(BlockchainType::Svm)
        );
        assert_eq!(address_family("nope"), None);
    }

    #[test]
    fn issues_accumulate() {
        let mut issues = Issues::new("Thing");
        issues.non_empty("id", "  ");
        issues.finite("price", f64::NAN);
        issues.address("token", "0x123", Some(BlockchainType::Evm));
        let err = issues.finish().unwrap_err();
        assert_eq!(err.issues.len(), 3);
        assert!(err.mentions("price"));
    }
}
