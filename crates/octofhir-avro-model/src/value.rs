//! FHIR object model - runtime representation of structured resource values
//!
//! This module defines the FhirValue enum and supporting types that stand in
//! for a full FHIR object model during schema compilation and conversion.
//! Composites carry insertion-ordered named fields plus URL-keyed extension
//! entries; polymorphic choice elements carry an explicit type tag so that
//! converters dispatch on the tag rather than on runtime shape.

use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A structured FHIR value as seen by the schema converters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum FhirValue {
    /// Boolean primitive
    Boolean(bool),
    /// Integer primitive (also unsignedInt and positiveInt)
    Integer(i32),
    /// Decimal primitive
    Decimal(Decimal),
    /// String-valued primitive (string, code, uri, date, ...)
    String(String),
    /// Record-shaped element with ordered named children
    Composite(CompositeValue),
    /// Polymorphic element carrying exactly one of several declared types
    Choice(ChoiceValue),
    /// Repeated element
    Collection(Vec<FhirValue>),
}

impl FhirValue {
    /// Short label for the value's variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Boolean(_) => "Boolean",
            Self::Integer(_) => "Integer",
            Self::Decimal(_) => "Decimal",
            Self::String(_) => "String",
            Self::Composite(_) => "Composite",
            Self::Choice(_) => "Choice",
            Self::Collection(_) => "Collection",
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i32> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Self::Decimal(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_composite(&self) -> Option<&CompositeValue> {
        match self {
            Self::Composite(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_collection(&self) -> Option<&[FhirValue]> {
        match self {
            Self::Collection(items) => Some(items),
            _ => None,
        }
    }
}

impl From<CompositeValue> for FhirValue {
    fn from(value: CompositeValue) -> Self {
        Self::Composite(value)
    }
}

/// A record-shaped element: ordered named fields plus extension entries.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CompositeValue {
    /// Declared FHIR type of this composite (e.g. "Patient", "HumanName")
    pub type_name: String,
    /// Named child values in declaration order
    pub fields: IndexMap<String, FhirValue>,
    /// Extension entries attached to this element
    pub extensions: Vec<ExtensionValue>,
}

impl CompositeValue {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: IndexMap::new(),
            extensions: Vec::new(),
        }
    }

    /// Get a child value by property name.
    pub fn field(&self, name: &str) -> Option<&FhirValue> {
        self.fields.get(name)
    }

    /// Set (or replace) a child value.
    pub fn set_field(&mut self, name: &str, value: FhirValue) {
        self.fields.insert(name.to_string(), value);
    }

    /// Append a value to a repeated child, creating the collection on first
    /// use. A previously set scalar is folded into the new collection.
    pub fn push_repeated(&mut self, name: &str, value: FhirValue) {
        match self.fields.get_mut(name) {
            Some(FhirValue::Collection(items)) => items.push(value),
            Some(existing) => {
                let first = std::mem::replace(existing, FhirValue::Collection(Vec::new()));
                if let FhirValue::Collection(items) = existing {
                    items.push(first);
                    items.push(value);
                }
            }
            None => {
                self.fields
                    .insert(name.to_string(), FhirValue::Collection(vec![value]));
            }
        }
    }

    /// Append an extension entry.
    pub fn add_extension(&mut self, url: impl Into<String>, value: FhirValue) {
        self.extensions.push(ExtensionValue {
            url: url.into(),
            value,
        });
    }

    /// All extension entries carrying the given URL, in attachment order.
    pub fn extensions_for<'a>(&'a self, url: &'a str) -> impl Iterator<Item = &'a ExtensionValue> {
        self.extensions.iter().filter(move |e| e.url == url)
    }
}

/// One URL-identified extension entry on a composite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtensionValue {
    /// Identifying extension URL
    pub url: String,
    /// Extension content: a primitive for leaf extensions, a composite for
    /// structured (parent) extensions
    pub value: FhirValue,
}

/// A choice element value: the declared candidate type name plus the value.
///
/// The tag is authoritative; converters match it against their candidate set
/// instead of inspecting the value's shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceValue {
    /// Candidate type name (e.g. "Quantity", "String")
    pub type_name: String,
    /// The single populated value
    pub value: Box<FhirValue>,
}

impl ChoiceValue {
    pub fn new(type_name: impl Into<String>, value: FhirValue) -> Self {
        Self {
            type_name: type_name.into(),
            value: Box::new(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_repeated_creates_and_appends() {
        let mut comp = CompositeValue::new("Patient");
        comp.push_repeated("name", FhirValue::String("a".into()));
        comp.push_repeated("name", FhirValue::String("b".into()));

        assert_eq!(
            comp.field("name"),
            Some(&FhirValue::Collection(vec![
                FhirValue::String("a".into()),
                FhirValue::String("b".into()),
            ]))
        );
    }

    #[test]
    fn test_push_repeated_folds_scalar() {
        let mut comp = CompositeValue::new("Patient");
        comp.set_field("name", FhirValue::String("a".into()));
        comp.push_repeated("name", FhirValue::String("b".into()));

        let items = comp.field("name").and_then(|v| v.as_collection()).unwrap();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_extensions_for_filters_by_url() {
        let mut comp = CompositeValue::new("Patient");
        comp.add_extension("http://example.com/a", FhirValue::Boolean(true));
        comp.add_extension("http://example.com/b", FhirValue::Integer(1));
        comp.add_extension("http://example.com/a", FhirValue::Boolean(false));

        let matched: Vec<_> = comp.extensions_for("http://example.com/a").collect();
        assert_eq!(matched.len(), 2);
        assert_eq!(matched[0].value, FhirValue::Boolean(true));
        assert_eq!(matched[1].value, FhirValue::Boolean(false));
    }
}
