//! Intermediate output model produced by data object readers.
//!
//! Readers from any source kind normalize into these records. Only the
//! resulting objects survive a scan; the per-declaration working state a
//! reader builds them from is discarded as it goes.

use serde::{Deserialize, Serialize};

/// A discrete legal value of an attribute, with its describing label.
///
/// For copybook sources these come from condition-name entries attached to
/// the field declared immediately above them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeCode {
    /// The code value.
    pub value: String,
    /// Human-readable label for the value.
    pub description: String,
}

impl AttributeCode {
    /// Create a code from a value and its description.
    pub fn new(value: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            description: description.into(),
        }
    }
}

/// One scanned attribute of a data object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Attribute {
    /// Attribute name.
    pub name: String,
    /// 1-based position in declaration order.
    pub seq_no: u32,
    /// Resolved data type in the target system's notation.
    pub data_type: String,
    /// Resolved common type, empty when no common-type rule matched.
    pub common_type: String,
    /// Default value, empty when the source declares none.
    pub default_value: String,
    /// Discrete legal values attached to this attribute.
    pub codes: Vec<AttributeCode>,
}

impl Attribute {
    /// Append a code to this attribute.
    pub fn add_code(&mut self, code: AttributeCode) {
        self.codes.push(code);
    }
}

/// A scanned data object: one copybook, table, or document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DataObject {
    /// Namespace the object belongs to.
    pub namespace: String,
    /// Object name, derived from the source.
    pub name: String,
    /// Attributes in declaration order.
    pub attributes: Vec<Attribute>,
}
