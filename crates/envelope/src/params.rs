//! Request parameters supplied by the caller.
//!
//! A [`ParameterSet`] is a unique-keyed map of named fields. Which fields are
//! required is decided per command and dialect by the
//! [catalog](crate::catalog); the set itself performs no validation beyond
//! key uniqueness.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{EnvelopeError, Result};

/// Well-known parameter field names.
pub mod field {
    /// Customer (sender) identifier issued by the bank.
    pub const CUSTOMER_ID: &str = "customer_id";
    /// Target environment, e.g. `PRODUCTION` or `TEST`.
    pub const ENVIRONMENT: &str = "environment";
    /// Raw payload content for uploads.
    pub const CONTENT: &str = "content";
    /// File status selector for listings (`NEW`, `DOWNLOADED`, `ALL`).
    pub const STATUS: &str = "status";
    /// Response language (`FI`, `SE`, `EN`).
    pub const LANGUAGE: &str = "language";
    /// Target identifier (file reference or upload folder).
    pub const TARGET_ID: &str = "target_id";
    /// File type code agreed with the bank.
    pub const FILE_TYPE: &str = "file_type";
    /// PKCS#10 request for the signing certificate, base64.
    pub const SIGNING_CSR: &str = "signing_csr";
    /// PKCS#10 request for the encryption certificate, base64.
    pub const ENCRYPTION_CSR: &str = "encryption_csr";
    /// One-time PIN authorizing certificate issuance.
    pub const PIN: &str = "pin";
}

/// Named request fields with unique keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterSet {
    values: BTreeMap<String, String>,
}

impl ParameterSet {
    /// Creates an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a field, returning the previous value if the key was present.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.values.insert(name.into(), value.into())
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Removes a field, returning its value if present.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.values.remove(name)
    }

    /// Looks up a field.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Looks up a field, failing with [`EnvelopeError::MissingParameter`]
    /// when it is absent or blank.
    pub fn require(&self, name: &str) -> Result<&str> {
        match self.get(name) {
            Some(value) if !value.trim().is_empty() => Ok(value),
            _ => Err(EnvelopeError::MissingParameter {
                name: name.to_string(),
            }),
        }
    }

    /// Whether the field is present.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
