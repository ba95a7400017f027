use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identifier of a single device transaction to harvest.
///
/// Opaque once produced; candidate lists may carry these as strings or bare
/// numbers, normalized to trimmed strings when loaded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelevantNumber(String);

impl RelevantNumber {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RelevantNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RelevantNumber {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl From<String> for RelevantNumber {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

/// One transaction line as reported by the device.
///
/// Only `totalAmount` is interpreted. Every other field is carried through
/// untouched so persisted invoices stay faithful to the device reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(rename = "totalAmount")]
    pub total_amount: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LineItem {
    pub fn new(total_amount: f64) -> Self {
        Self {
            total_amount,
            extra: Map::new(),
        }
    }
}

/// The device's reply for one relevant number: a status tag plus, on
/// success, the transaction's line items. Unknown fields are preserved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTransaction {
    /// Status tag; drives classification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messages: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<LineItem>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
