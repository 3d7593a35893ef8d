//! Record representation and typed encode/decode helpers.
//!
//! The engine is untyped: every stage operates on [`Value`] records. The
//! typed combinator layer in `sluice-flow` erases user closures down to
//! `Value -> Value` functions through [`encode`] and [`decode`].

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::RuntimeError;

/// The engine-level record representation.
pub type Value = serde_json::Value;

/// Encode a typed record into its engine representation.
pub fn encode<T: Serialize>(record: &T) -> Result<Value, RuntimeError> {
    serde_json::to_value(record).map_err(|e| RuntimeError::Data(e.to_string()))
}

/// Decode an engine record back into its typed form.
pub fn decode<T: DeserializeOwned>(value: Value) -> Result<T, RuntimeError> {
    serde_json::from_value(value).map_err(|e| RuntimeError::Data(e.to_string()))
}

/// Canonical text key for a record, used for identity-based operations
/// such as `distinct`.
pub fn identity_key(value: &Value) -> String {
    value.to_string()
}
