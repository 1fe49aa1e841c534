//! Multi-valued wrapper
//!
//! Wraps one element converter so its schema becomes the repeated form and
//! its mappings iterate the collection. Order is preserved in both
//! directions; the reverse mapping appends one reconstructed value per
//! serialized item to the parent's repeated field, never reordering or
//! deduplicating.

use std::sync::Arc;

use octofhir_avro_model::{CompositeValue, ConversionError, ElementDefinition, FhirValue};

use crate::converter::{AvroConverter, AvroFieldSetter, ConverterRef, SetterRef};
use crate::schema::AvroSchema;
use crate::value::AvroValue;

pub struct MultiValuedConverter {
    element: ConverterRef,
    schema: AvroSchema,
}

impl MultiValuedConverter {
    pub fn new(element: ConverterRef) -> Self {
        let schema = AvroSchema::array(element.data_type().clone());
        Self { element, schema }
    }
}

impl AvroConverter for MultiValuedConverter {
    fn data_type(&self) -> &AvroSchema {
        &self.schema
    }

    fn element_type(&self) -> &str {
        self.element.element_type()
    }

    fn from_fhir(&self, value: &FhirValue) -> Result<AvroValue, ConversionError> {
        let items = value
            .as_collection()
            .ok_or_else(|| ConversionError::mismatch("Collection", value.kind()))?;
        let converted: Result<Vec<AvroValue>, ConversionError> =
            items.iter().map(|item| self.element.from_fhir(item)).collect();
        Ok(AvroValue::Array(converted?))
    }

    fn field_setter(&self, elements: &[ElementDefinition]) -> SetterRef {
        Arc::new(MultiValuedSetter {
            element: self.element.field_setter(elements),
        })
    }

    fn extension_url(&self) -> Option<&str> {
        self.element.extension_url()
    }
}

struct MultiValuedSetter {
    element: SetterRef,
}

impl MultiValuedSetter {
    fn append_items(
        &self,
        parent: &mut CompositeValue,
        element: &ElementDefinition,
        value: &AvroValue,
    ) -> Result<(), ConversionError> {
        if value.is_null() {
            return Ok(());
        }
        let items = value
            .as_array()
            .ok_or_else(|| ConversionError::mismatch("Array", value.kind()))?;
        for item in items {
            self.element.append(parent, element, item)?;
        }
        Ok(())
    }
}

impl AvroFieldSetter for MultiValuedSetter {
    fn to_fhir(&self, value: &AvroValue) -> Result<Option<FhirValue>, ConversionError> {
        if value.is_null() {
            return Ok(None);
        }
        let items = value
            .as_array()
            .ok_or_else(|| ConversionError::mismatch("Array", value.kind()))?;
        let mut reconstructed = Vec::with_capacity(items.len());
        for item in items {
            if let Some(inner) = self.element.to_fhir(item)? {
                reconstructed.push(inner);
            }
        }
        Ok(Some(FhirValue::Collection(reconstructed)))
    }

    fn set_field(
        &self,
        parent: &mut CompositeValue,
        element: &ElementDefinition,
        value: &AvroValue,
    ) -> Result<(), ConversionError> {
        self.append_items(parent, element, value)
    }

    fn append(
        &self,
        parent: &mut CompositeValue,
        element: &ElementDefinition,
        value: &AvroValue,
    ) -> Result<(), ConversionError> {
        self.append_items(parent, element, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::leaf_converter;
    use pretty_assertions::assert_eq;

    fn strings() -> MultiValuedConverter {
        MultiValuedConverter::new(leaf_converter("string").unwrap())
    }

    #[test]
    fn test_schema_is_repeated_form() {
        assert_eq!(
            strings().data_type(),
            &AvroSchema::array(AvroSchema::String)
        );
    }

    #[test]
    fn test_forward_preserves_order() {
        let converter = strings();
        let source = FhirValue::Collection(vec![
            FhirValue::String("a".into()),
            FhirValue::String("b".into()),
            FhirValue::String("c".into()),
        ]);
        assert_eq!(
            converter.from_fhir(&source).unwrap(),
            AvroValue::Array(vec![
                AvroValue::String("a".into()),
                AvroValue::String("b".into()),
                AvroValue::String("c".into()),
            ])
        );
    }

    #[test]
    fn test_reverse_appends_in_serialized_order() {
        let converter = strings();
        let setter = converter.field_setter(&[]);
        let mut parent = CompositeValue::new("Patient");
        let element = ElementDefinition::new("name", "string");

        let serialized = AvroValue::Array(vec![
            AvroValue::String("x".into()),
            AvroValue::String("y".into()),
            AvroValue::String("z".into()),
        ]);
        setter.set_field(&mut parent, &element, &serialized).unwrap();

        assert_eq!(
            parent.field("name"),
            Some(&FhirValue::Collection(vec![
                FhirValue::String("x".into()),
                FhirValue::String("y".into()),
                FhirValue::String("z".into()),
            ]))
        );
    }
}
