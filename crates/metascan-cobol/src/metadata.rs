//! Declaration records: classification of one data-description entry.
//!
//! A [`FieldMetadata`] is built per reconstructed declaration, consumed by
//! the reader, and discarded; only the attributes assembled from it
//! survive a scan.

use std::fmt;

use metascan_core::Result;

use crate::syntax;

/// Canonical category of a classified declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldCategory {
    /// Unsigned integral numeric (`PIC 9(5)`).
    UnsignedInt,
    /// Signed integral numeric (`PIC S9(5)`).
    SignedInt,
    /// Unsigned numeric with decimal positions (`PIC 9(3)V99`).
    UnsignedDecimal,
    /// Signed numeric with decimal positions (`PIC S9(3)V99`).
    SignedDecimal,
    /// Alphabetic (`PIC A(5)`).
    Alpha,
    /// Alphanumeric or alphanumeric-edited (`PIC X(5)`, `PIC AX/X99`).
    AlphaNum,
    /// Single-precision internal floating point (USAGE COMP-1).
    Float4,
    /// Double-precision internal floating point (USAGE COMP-2).
    Float8,
    /// A picture or usage present but matching no known shape.
    Unclassified,
}

impl FieldCategory {
    /// The raw type token used for rule lookup and `%type%` substitution.
    /// Unclassified entries carry their declared type instead; see
    /// [`FieldMetadata::type_string`].
    pub fn type_token(&self) -> &'static str {
        match self {
            FieldCategory::UnsignedInt => "UINT",
            FieldCategory::SignedInt => "SINT",
            FieldCategory::UnsignedDecimal => "UNUM",
            FieldCategory::SignedDecimal => "SNUM",
            FieldCategory::Alpha => "ALPHA",
            FieldCategory::AlphaNum => "ALPHANUM",
            FieldCategory::Float4 => "FLOAT4",
            FieldCategory::Float8 => "FLOAT8",
            FieldCategory::Unclassified => "",
        }
    }
}

/// A classified COBOL data-description entry.
///
/// `category` is `None` for purely structural entries (group headers and
/// the like) that declare neither a picture nor a usage.
#[derive(Debug, Clone)]
pub struct FieldMetadata {
    /// Level number (1-49, or the special levels 66, 77, 88).
    pub level: u32,
    /// Data name; empty for FILLER and anonymous entries.
    pub data_name: String,
    /// Classified category, `None` for structural entries.
    pub category: Option<FieldCategory>,
    /// Raw type string: the category token, or the `[CK]`-prefixed
    /// declared type for unclassified entries. Empty for structural
    /// entries.
    pub type_string: String,
    /// Total digit or character count after decimal-point removal.
    pub size: usize,
    /// Digits to the right of the decimal point; positive only for the
    /// decimal categories.
    pub decimal_digits: usize,
    /// Normalized usage (`COMPUTATIONAL-3` collapses to `COMP-3`, binary
    /// forms to `COMP`).
    pub usage: String,
    /// Picture and raw usage phrase as declared, for diagnostics and
    /// fallback mapping.
    pub declared_type: String,
    /// VALUE clause content: a default value, or the condition value of a
    /// level-88 entry.
    pub value: String,
}

impl FieldMetadata {
    /// Scan and classify one reconstructed declaration.
    pub fn parse(declaration: &str) -> Result<Self> {
        let tokens = syntax::tokenize(declaration);

        let level = syntax::level_number(&tokens)?;
        let data_name = syntax::data_name(&tokens).to_string();
        let picture = syntax::picture_string(&tokens).to_string();
        let usage_phrase = syntax::usage_phrase(&tokens).to_string();
        let usage = normalize_usage(&usage_phrase);
        let value = syntax::value(&tokens);

        let expanded = syntax::expand_picture(&picture)?.to_uppercase();

        let mut category = None;
        let mut type_string = String::new();
        let mut size = 0;
        let mut decimal_digits = 0;

        if syntax::is_numeric_plus(&expanded) {
            let c_digits = syntax::characteristic_digits(&expanded);
            let m_digits = syntax::mantissa_digits(&expanded);
            let signed = syntax::is_signed(&expanded);
            let cat = match (m_digits > 0, signed) {
                (false, false) => FieldCategory::UnsignedInt,
                (false, true) => FieldCategory::SignedInt,
                (true, false) => FieldCategory::UnsignedDecimal,
                (true, true) => FieldCategory::SignedDecimal,
            };
            category = Some(cat);
            type_string = cat.type_token().to_string();
            size = c_digits + m_digits;
            decimal_digits = m_digits;
        } else if syntax::is_alphabetic(&expanded) {
            category = Some(FieldCategory::Alpha);
            type_string = FieldCategory::Alpha.type_token().to_string();
            size = expanded.len();
        } else if syntax::is_alphanumeric_plus(&expanded) {
            category = Some(FieldCategory::AlphaNum);
            type_string = FieldCategory::AlphaNum.type_token().to_string();
            // Editing characters take no part in the field's size.
            size = expanded
                .chars()
                .filter(|c| !matches!(c, 'B' | '0' | '/'))
                .count();
        } else if syntax::is_float4(&usage_phrase) {
            category = Some(FieldCategory::Float4);
            type_string = FieldCategory::Float4.type_token().to_string();
        } else if syntax::is_float8(&usage_phrase) {
            category = Some(FieldCategory::Float8);
            type_string = FieldCategory::Float8.type_token().to_string();
        } else if !picture.is_empty() || !usage_phrase.is_empty() {
            category = Some(FieldCategory::Unclassified);
            type_string = if usage_phrase.is_empty() {
                format!("[CK] {picture}")
            } else {
                format!("[CK] {picture} USAGE {usage_phrase}")
            };
        }

        let declared_type = if usage_phrase.is_empty() {
            picture.clone()
        } else if picture.is_empty() {
            usage_phrase.clone()
        } else {
            format!("{picture} {usage_phrase}")
        };
        tracing::trace!(declared = %declared_type, resolved = %type_string, "classified declaration");

        Ok(Self {
            level,
            data_name,
            category,
            type_string,
            size,
            decimal_digits,
            usage,
            declared_type,
            value,
        })
    }

    /// True when this entry can become an attribute: it has a usable data
    /// name and a classified or diagnostic type.
    pub fn is_attribute(&self) -> bool {
        !self.data_name.is_empty() && !self.type_string.is_empty()
    }

    /// True for condition-name entries.
    pub fn is_condition_name(&self) -> bool {
        self.level == 88
    }
}

/// Fixed-width diagnostic row: level, name, type, size, scale, usage,
/// value.
impl fmt::Display for FieldMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:03} : {:>15} : {:>15} : {:03} : {:03} : {:>20} : {:>20}",
            self.level,
            self.data_name,
            self.type_string,
            self.size,
            self.decimal_digits,
            self.usage,
            self.value
        )
    }
}

/// Collapse the long USAGE forms to their canonical short form before rule
/// lookup.
fn normalize_usage(phrase: &str) -> String {
    match phrase {
        "COMPUTATIONAL-1" => "COMP-1",
        "COMPUTATIONAL-2" => "COMP-2",
        "COMPUTATIONAL-3" => "COMP-3",
        "COMP-4" | "COMPUTATIONAL-4" | "BINARY" => "COMP",
        "COMPUTATIONAL-5" => "COMP-5",
        other => other,
    }
    .to_string()
}
