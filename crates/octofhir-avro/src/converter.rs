//! Converter contract and scalar leaf converters
//!
//! An [`AvroConverter`] is the compiled artifact for one element: it carries
//! the target schema, a pure forward projection from a structured value, and
//! a factory producing the reverse field setter. Reverse mappings go through
//! [`AvroFieldSetter`], whose `to_fhir` returns `None` for write-inert
//! setters so reliance on such a field for reconstruction is detectable.
//!
//! The leaf type table is an exact enumeration of the FHIR primitive names;
//! looking up a name outside it yields `None`.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;

use octofhir_avro_model::{CompositeValue, ConversionError, ElementDefinition, FhirValue};

use crate::schema::AvroSchema;
use crate::value::AvroValue;

/// Shared handle to a compiled converter.
pub type ConverterRef = Arc<dyn AvroConverter>;

/// Shared handle to a reverse field setter.
pub type SetterRef = Arc<dyn AvroFieldSetter>;

/// A compiled schema/converter pair for one element type.
pub trait AvroConverter: Send + Sync {
    /// The target schema this converter writes and reads.
    fn data_type(&self) -> &AvroSchema;

    /// Label for the element type handled, for downstream identification.
    fn element_type(&self) -> &str;

    /// Project a structured value into its serialized form.
    fn from_fhir(&self, value: &FhirValue) -> Result<AvroValue, ConversionError>;

    /// Build the reverse mapping for the given source-side element
    /// definitions. Converters other than choice use only the first entry.
    fn field_setter(&self, elements: &[ElementDefinition]) -> SetterRef;

    /// The identifying URL when this converter carries an extension identity.
    fn extension_url(&self) -> Option<&str> {
        None
    }
}

/// Reverse mapping: reconstructs source-model values and mutates a parent
/// composite with them.
pub trait AvroFieldSetter: Send + Sync {
    /// Reconstruct a structured value from its serialized form. `Ok(None)`
    /// means this setter reconstructs nothing; write-inert setters (the
    /// synthesized reference convenience fields) answer `None` always.
    fn to_fhir(&self, value: &AvroValue) -> Result<Option<FhirValue>, ConversionError>;

    /// Set the reconstructed value as a named property on the parent.
    fn set_field(
        &self,
        parent: &mut CompositeValue,
        element: &ElementDefinition,
        value: &AvroValue,
    ) -> Result<(), ConversionError> {
        if let Some(reconstructed) = self.to_fhir(value)? {
            parent.set_field(&element.name, reconstructed);
        }
        Ok(())
    }

    /// Append the reconstructed value to a repeated property on the parent,
    /// preserving serialized order.
    fn append(
        &self,
        parent: &mut CompositeValue,
        element: &ElementDefinition,
        value: &AvroValue,
    ) -> Result<(), ConversionError> {
        if let Some(reconstructed) = self.to_fhir(value)? {
            parent.push_repeated(&element.name, reconstructed);
        }
        Ok(())
    }
}

/// Field setter that does nothing, for synthesized fields whose authoritative
/// value is restored through another field.
pub struct NoOpFieldSetter;

impl AvroFieldSetter for NoOpFieldSetter {
    fn to_fhir(&self, _value: &AvroValue) -> Result<Option<FhirValue>, ConversionError> {
        Ok(None)
    }
}

// === Scalar converters ===

/// Decimal logical-type precision shared by schema and converter.
pub const DECIMAL_PRECISION: u32 = 12;
/// Decimal logical-type scale shared by schema and converter.
pub const DECIMAL_SCALE: u32 = 4;

struct StringConverter {
    schema: AvroSchema,
}

impl AvroConverter for StringConverter {
    fn data_type(&self) -> &AvroSchema {
        &self.schema
    }

    fn element_type(&self) -> &str {
        "String"
    }

    fn from_fhir(&self, value: &FhirValue) -> Result<AvroValue, ConversionError> {
        value
            .as_str()
            .map(|s| AvroValue::String(s.to_string()))
            .ok_or_else(|| ConversionError::mismatch("String", value.kind()))
    }

    fn field_setter(&self, _elements: &[ElementDefinition]) -> SetterRef {
        Arc::new(StringSetter)
    }
}

struct StringSetter;

impl AvroFieldSetter for StringSetter {
    fn to_fhir(&self, value: &AvroValue) -> Result<Option<FhirValue>, ConversionError> {
        match value {
            AvroValue::Null => Ok(None),
            AvroValue::String(s) => Ok(Some(FhirValue::String(s.clone()))),
            other => Err(ConversionError::mismatch("String", other.kind())),
        }
    }
}

struct BooleanConverter {
    schema: AvroSchema,
}

impl AvroConverter for BooleanConverter {
    fn data_type(&self) -> &AvroSchema {
        &self.schema
    }

    fn element_type(&self) -> &str {
        "Boolean"
    }

    fn from_fhir(&self, value: &FhirValue) -> Result<AvroValue, ConversionError> {
        value
            .as_boolean()
            .map(AvroValue::Boolean)
            .ok_or_else(|| ConversionError::mismatch("Boolean", value.kind()))
    }

    fn field_setter(&self, _elements: &[ElementDefinition]) -> SetterRef {
        Arc::new(BooleanSetter)
    }
}

struct BooleanSetter;

impl AvroFieldSetter for BooleanSetter {
    fn to_fhir(&self, value: &AvroValue) -> Result<Option<FhirValue>, ConversionError> {
        match value {
            AvroValue::Null => Ok(None),
            AvroValue::Boolean(b) => Ok(Some(FhirValue::Boolean(*b))),
            other => Err(ConversionError::mismatch("Boolean", other.kind())),
        }
    }
}

struct IntegerConverter {
    schema: AvroSchema,
}

impl AvroConverter for IntegerConverter {
    fn data_type(&self) -> &AvroSchema {
        &self.schema
    }

    fn element_type(&self) -> &str {
        "Integer"
    }

    fn from_fhir(&self, value: &FhirValue) -> Result<AvroValue, ConversionError> {
        value
            .as_integer()
            .map(AvroValue::Int)
            .ok_or_else(|| ConversionError::mismatch("Integer", value.kind()))
    }

    fn field_setter(&self, _elements: &[ElementDefinition]) -> SetterRef {
        Arc::new(IntegerSetter)
    }
}

struct IntegerSetter;

impl AvroFieldSetter for IntegerSetter {
    fn to_fhir(&self, value: &AvroValue) -> Result<Option<FhirValue>, ConversionError> {
        match value {
            AvroValue::Null => Ok(None),
            AvroValue::Int(i) => Ok(Some(FhirValue::Integer(*i))),
            other => Err(ConversionError::mismatch("Integer", other.kind())),
        }
    }
}

struct DecimalConverter {
    schema: AvroSchema,
}

impl AvroConverter for DecimalConverter {
    fn data_type(&self) -> &AvroSchema {
        &self.schema
    }

    fn element_type(&self) -> &str {
        "Decimal"
    }

    fn from_fhir(&self, value: &FhirValue) -> Result<AvroValue, ConversionError> {
        let mut decimal = value
            .as_decimal()
            .ok_or_else(|| ConversionError::mismatch("Decimal", value.kind()))?;
        decimal.rescale(DECIMAL_SCALE);
        Ok(AvroValue::Decimal(decimal))
    }

    fn field_setter(&self, _elements: &[ElementDefinition]) -> SetterRef {
        Arc::new(DecimalSetter)
    }
}

struct DecimalSetter;

impl AvroFieldSetter for DecimalSetter {
    fn to_fhir(&self, value: &AvroValue) -> Result<Option<FhirValue>, ConversionError> {
        match value {
            AvroValue::Null => Ok(None),
            AvroValue::Decimal(d) => Ok(Some(FhirValue::Decimal(*d))),
            other => Err(ConversionError::mismatch("Decimal", other.kind())),
        }
    }
}

// String-like primitive type names, all serialized as plain strings.
// base64Binary is carried as a string for now, matching the source layout.
const STRING_TYPES: &[&str] = &[
    "id",
    "code",
    "markdown",
    "date",
    "instant",
    "datetime",
    "dateTime",
    "time",
    "string",
    "oid",
    "xhtml",
    "base64Binary",
    "uri",
];

const INTEGER_TYPES: &[&str] = &["integer", "unsignedInt", "positiveInt"];

static LEAF_CONVERTERS: Lazy<HashMap<&'static str, ConverterRef>> = Lazy::new(|| {
    let string: ConverterRef = Arc::new(StringConverter {
        schema: AvroSchema::String,
    });
    let boolean: ConverterRef = Arc::new(BooleanConverter {
        schema: AvroSchema::Boolean,
    });
    let integer: ConverterRef = Arc::new(IntegerConverter {
        schema: AvroSchema::Int,
    });
    let decimal: ConverterRef = Arc::new(DecimalConverter {
        schema: AvroSchema::Decimal {
            precision: DECIMAL_PRECISION,
            scale: DECIMAL_SCALE,
        },
    });

    let mut table: HashMap<&'static str, ConverterRef> = HashMap::new();
    for &name in STRING_TYPES {
        table.insert(name, Arc::clone(&string));
    }
    for &name in INTEGER_TYPES {
        table.insert(name, Arc::clone(&integer));
    }
    table.insert("boolean", boolean);
    table.insert("decimal", decimal);
    table
});

/// Look up the pre-built scalar converter for a primitive type name.
/// Returns `None` for any name outside the enumerated primitive set.
pub fn leaf_converter(primitive_type: &str) -> Option<ConverterRef> {
    LEAF_CONVERTERS.get(primitive_type).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal::Decimal;

    #[rstest]
    #[case("id")]
    #[case("code")]
    #[case("markdown")]
    #[case("date")]
    #[case("instant")]
    #[case("datetime")]
    #[case("dateTime")]
    #[case("time")]
    #[case("string")]
    #[case("oid")]
    #[case("xhtml")]
    #[case("base64Binary")]
    #[case("uri")]
    fn test_string_like_types_map_to_string_schema(#[case] name: &str) {
        let converter = leaf_converter(name).unwrap();
        assert_eq!(converter.data_type(), &AvroSchema::String);
    }

    #[rstest]
    #[case("integer")]
    #[case("unsignedInt")]
    #[case("positiveInt")]
    fn test_integer_like_types_map_to_int_schema(#[case] name: &str) {
        let converter = leaf_converter(name).unwrap();
        assert_eq!(converter.data_type(), &AvroSchema::Int);
    }

    #[test]
    fn test_boolean_schema_is_plain() {
        let converter = leaf_converter("boolean").unwrap();
        assert_eq!(converter.data_type(), &AvroSchema::Boolean);
    }

    #[test]
    fn test_decimal_schema_is_fixed_precision() {
        let converter = leaf_converter("decimal").unwrap();
        assert_eq!(
            converter.data_type(),
            &AvroSchema::Decimal {
                precision: 12,
                scale: 4
            }
        );
    }

    #[test]
    fn test_unknown_primitive_is_absent() {
        assert!(leaf_converter("Quantity").is_none());
        assert!(leaf_converter("").is_none());
    }

    #[test]
    fn test_decimal_rescales_to_schema_scale() {
        let converter = leaf_converter("decimal").unwrap();
        let projected = converter
            .from_fhir(&FhirValue::Decimal(Decimal::new(15, 1)))
            .unwrap();
        assert_eq!(projected, AvroValue::Decimal(Decimal::new(15000, 4)));
    }

    #[test]
    fn test_scalar_round_trip() {
        let converter = leaf_converter("string").unwrap();
        let projected = converter
            .from_fhir(&FhirValue::String("active".into()))
            .unwrap();
        let setter = converter.field_setter(&[]);
        assert_eq!(
            setter.to_fhir(&projected).unwrap(),
            Some(FhirValue::String("active".into()))
        );
    }

    #[test]
    fn test_scalar_mismatch_is_error() {
        let converter = leaf_converter("boolean").unwrap();
        assert!(converter.from_fhir(&FhirValue::String("true".into())).is_err());
    }
}
