//! Serialized value form
//!
//! The in-memory shape a converter produces and consumes. Records are
//! positional: field order matches the record schema's field order, and an
//! absent field is an explicit `Null`.

use rust_decimal::Decimal;

/// A value laid out per a generated Avro schema.
#[derive(Debug, Clone, PartialEq)]
pub enum AvroValue {
    /// Absent optional field
    Null,
    Boolean(bool),
    Int(i32),
    String(String),
    /// Decimal logical-type value, rescaled to the schema's scale
    Decimal(Decimal),
    /// Positional record fields
    Record(Vec<AvroValue>),
    Array(Vec<AvroValue>),
}

impl AvroValue {
    /// Short label for the value's variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "Null",
            Self::Boolean(_) => "Boolean",
            Self::Int(_) => "Int",
            Self::String(_) => "String",
            Self::Decimal(_) => "Decimal",
            Self::Record(_) => "Record",
            Self::Array(_) => "Array",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_record(&self) -> Option<&[AvroValue]> {
        match self {
            Self::Record(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[AvroValue]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}
