use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

/// Synthetic field name used when a failure cannot be tied to a declared field.
pub const BODY_FIELD: &str = "body";

/// Field-keyed validation failures.
///
/// A value of this type only exists when validation failed, so it always
/// holds at least one entry. Each field appears once; the first message
/// recorded for a field is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(transparent)]
#[error("{} field(s) failed validation", .0.len())]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    /// Build a map holding a single failure.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = BTreeMap::new();
        errors.insert(field.into(), message.into());
        Self(errors)
    }

    /// Build a map from accumulated failures; `None` when nothing failed.
    pub(crate) fn from_collected(errors: BTreeMap<String, String>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(Self(errors))
        }
    }

    /// Message recorded for a field.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Number of offending fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Offending field names in sorted order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

/// Insert unless the field already carries a message.
pub(crate) fn record(errors: &mut BTreeMap<String, String>, field: &str, message: String) {
    errors.entry(field.to_string()).or_insert(message);
}
