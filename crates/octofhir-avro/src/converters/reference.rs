//! Synthesized per-target-type reference convenience fields
//!
//! A reference record carries, next to its declared children, one `<Type>Id`
//! field per candidate target type. The forward mapping projects the trailing
//! segment of a relative reference URI when it points at that candidate; the
//! reverse mapping is deliberately a no-op, since the authoritative value is
//! restored exclusively through the ordinary `reference` child.

use std::sync::Arc;

use octofhir_avro_model::{ConversionError, ElementDefinition, FhirValue};

use crate::converter::{AvroConverter, NoOpFieldSetter, SetterRef};
use crate::names;
use crate::schema::AvroSchema;
use crate::value::AvroValue;

/// Forward-rich, reverse-inert converter extracting the relative id of a URI
/// that targets one candidate type.
pub struct RelativeValueConverter {
    prefix: String,
    schema: AvroSchema,
}

impl RelativeValueConverter {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            prefix: format!("{}/", type_name.into()),
            schema: AvroSchema::String,
        }
    }
}

impl AvroConverter for RelativeValueConverter {
    fn data_type(&self) -> &AvroSchema {
        &self.schema
    }

    fn element_type(&self) -> &str {
        "String"
    }

    fn from_fhir(&self, value: &FhirValue) -> Result<AvroValue, ConversionError> {
        let uri = value
            .as_str()
            .ok_or_else(|| ConversionError::mismatch("String", value.kind()))?;
        if uri.starts_with(&self.prefix) {
            Ok(AvroValue::String(names::trailing_segment(uri).to_string()))
        } else {
            Ok(AvroValue::Null)
        }
    }

    fn field_setter(&self, _elements: &[ElementDefinition]) -> SetterRef {
        // The value is set from the primary reference field, never from here.
        Arc::new(NoOpFieldSetter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use octofhir_avro_model::CompositeValue;

    #[test]
    fn test_matching_candidate_yields_relative_id() {
        let converter = RelativeValueConverter::new("Patient");
        let projected = converter
            .from_fhir(&FhirValue::String("Patient/123".into()))
            .unwrap();
        assert_eq!(projected, AvroValue::String("123".into()));
    }

    #[test]
    fn test_candidate_mismatch_yields_absent() {
        let converter = RelativeValueConverter::new("Patient");
        let projected = converter
            .from_fhir(&FhirValue::String("Observation/123".into()))
            .unwrap();
        assert_eq!(projected, AvroValue::Null);
    }

    #[test]
    fn test_bare_type_prefix_without_separator_is_absent() {
        let converter = RelativeValueConverter::new("Patient");
        let projected = converter
            .from_fhir(&FhirValue::String("PatientX/123".into()))
            .unwrap();
        assert_eq!(projected, AvroValue::Null);
    }

    #[test]
    fn test_reverse_mapping_is_inert() {
        let converter = RelativeValueConverter::new("Patient");
        let setter = converter.field_setter(&[]);
        assert_eq!(
            setter.to_fhir(&AvroValue::String("123".into())).unwrap(),
            None
        );

        let mut parent = CompositeValue::new("Reference");
        let element = ElementDefinition::new("reference", "uri");
        setter
            .set_field(&mut parent, &element, &AvroValue::String("123".into()))
            .unwrap();
        assert!(parent.fields.is_empty());
    }
}
