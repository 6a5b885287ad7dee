//! Loosely-typed product record.
//!
//! The products API is the source of truth for the record's shape, so a
//! [`Product`] keeps the JSON object exactly as received. Fields are read and
//! written by name and anything this crate does not know about round-trips
//! unchanged on update.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::asset::{AssetRole, EncodedAsset};
use crate::CoreError;

/// Identifier used to address `/products/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProductId(String);

impl ProductId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<i64> for ProductId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Product(Map<String, Value>);

impl Product {
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn set(&mut self, field: &str, value: impl Into<Value>) {
        self.0.insert(field.to_owned(), value.into());
    }

    /// Returns the record's identifier.
    ///
    /// Integer and non-empty string `id` values are accepted. Anything else,
    /// including `null` and floats, counts as missing.
    #[must_use]
    pub fn id(&self) -> Option<ProductId> {
        match self.0.get("id")? {
            Value::Number(n) if n.is_i64() || n.is_u64() => Some(ProductId(n.to_string())),
            Value::String(s) if !s.is_empty() => Some(ProductId(s.clone())),
            _ => None,
        }
    }

    /// Like [`Product::id`], but a missing identifier is an error.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MissingId`] when the record has no usable `id`.
    pub fn require_id(&self) -> Result<ProductId, CoreError> {
        self.id().ok_or(CoreError::MissingId)
    }

    /// The stored local path for `role`, if the record has a non-empty one.
    #[must_use]
    pub fn asset_path(&self, role: AssetRole) -> Option<&str> {
        self.0
            .get(role.path_field())
            .and_then(Value::as_str)
            .filter(|p| !p.is_empty())
    }

    /// Sets `<role>_base64` and `<role>_name` from an encoded asset.
    pub fn attach_asset(&mut self, role: AssetRole, asset: EncodedAsset) {
        self.set(role.payload_field(), asset.base64);
        self.set(role.name_field(), asset.name);
    }

    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

/// Compact JSON, fields in the order they were received.
impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = serde_json::to_string(&self.0).map_err(|_| fmt::Error)?;
        f.write_str(&rendered)
    }
}

#[cfg(test)]
#[path = "product_test.rs"]
mod tests;
