//! Composite converter: record assembly and disassembly
//!
//! Projects a composite value into a positional record, one output field per
//! declared child, and reconstructs the composite from such a record. Fields
//! flagged as extensions are populated from the composite's extension entries
//! by URL instead of from a named property; a composite converter that itself
//! carries an extension URL files its reconstructed value as an extension on
//! the parent rather than as a property.

use std::sync::Arc;

use octofhir_avro_model::{
    CompositeValue, ConversionError, ElementDefinition, FhirValue, StructureField,
};

use crate::converter::{AvroConverter, AvroFieldSetter, ConverterRef, SetterRef};
use crate::schema::AvroSchema;
use crate::value::AvroValue;

pub struct CompositeConverter {
    element_type: String,
    children: Vec<StructureField<ConverterRef>>,
    schema: AvroSchema,
    extension_url: Option<String>,
}

impl CompositeConverter {
    pub fn new(
        element_type: impl Into<String>,
        children: Vec<StructureField<ConverterRef>>,
        schema: AvroSchema,
    ) -> Self {
        Self {
            element_type: element_type.into(),
            children,
            schema,
            extension_url: None,
        }
    }

    /// A composite keyed by an extension identity (a parent extension).
    pub fn with_extension_url(
        element_type: impl Into<String>,
        children: Vec<StructureField<ConverterRef>>,
        schema: AvroSchema,
        extension_url: impl Into<String>,
    ) -> Self {
        Self {
            element_type: element_type.into(),
            children,
            schema,
            extension_url: Some(extension_url.into()),
        }
    }

    fn convert_extension_child(
        &self,
        composite: &CompositeValue,
        field: &StructureField<ConverterRef>,
    ) -> Result<AvroValue, ConversionError> {
        let url = field.extension_url.as_deref().unwrap_or_default();
        let mut matched = composite.extensions_for(url).map(|e| e.value.clone());

        if field.result.data_type().is_array() {
            let values: Vec<FhirValue> = matched.collect();
            if values.is_empty() {
                return Ok(AvroValue::Null);
            }
            return field.result.from_fhir(&FhirValue::Collection(values));
        }

        match matched.next() {
            Some(value) => field.result.from_fhir(&value),
            None => Ok(AvroValue::Null),
        }
    }
}

impl AvroConverter for CompositeConverter {
    fn data_type(&self) -> &AvroSchema {
        &self.schema
    }

    fn element_type(&self) -> &str {
        &self.element_type
    }

    fn from_fhir(&self, value: &FhirValue) -> Result<AvroValue, ConversionError> {
        let composite = value
            .as_composite()
            .ok_or_else(|| ConversionError::mismatch("Composite", value.kind()))?;

        let mut fields = Vec::with_capacity(self.children.len());
        for field in &self.children {
            let converted = if field.is_extension {
                self.convert_extension_child(composite, field)?
            } else {
                let property = field
                    .property_name
                    .as_deref()
                    .unwrap_or(field.field_name.as_str());
                match composite.field(property) {
                    Some(child_value) => field.result.from_fhir(child_value)?,
                    None => AvroValue::Null,
                }
            };
            fields.push(converted);
        }
        Ok(AvroValue::Record(fields))
    }

    fn field_setter(&self, _elements: &[ElementDefinition]) -> SetterRef {
        let children = self
            .children
            .iter()
            .map(|field| {
                let property = field
                    .property_name
                    .clone()
                    .unwrap_or_else(|| field.field_name.clone());
                let element = ElementDefinition::new(property, field.result.element_type());
                let setter = field.result.field_setter(std::slice::from_ref(&element));
                ChildSetter { element, setter }
            })
            .collect();

        Arc::new(CompositeSetter {
            element_type: self.element_type.clone(),
            extension_url: self.extension_url.clone(),
            children,
        })
    }

    fn extension_url(&self) -> Option<&str> {
        self.extension_url.as_deref()
    }
}

struct ChildSetter {
    element: ElementDefinition,
    setter: SetterRef,
}

struct CompositeSetter {
    element_type: String,
    extension_url: Option<String>,
    children: Vec<ChildSetter>,
}

impl AvroFieldSetter for CompositeSetter {
    fn to_fhir(&self, value: &AvroValue) -> Result<Option<FhirValue>, ConversionError> {
        let fields = value
            .as_record()
            .ok_or_else(|| ConversionError::mismatch("Record", value.kind()))?;
        if fields.len() != self.children.len() {
            return Err(ConversionError::FieldCountMismatch {
                expected: self.children.len(),
                found: fields.len(),
            });
        }

        let mut composite = CompositeValue::new(self.element_type.as_str());
        for (child, field_value) in self.children.iter().zip(fields) {
            if field_value.is_null() {
                continue;
            }
            child
                .setter
                .set_field(&mut composite, &child.element, field_value)?;
        }
        Ok(Some(FhirValue::Composite(composite)))
    }

    fn set_field(
        &self,
        parent: &mut CompositeValue,
        element: &ElementDefinition,
        value: &AvroValue,
    ) -> Result<(), ConversionError> {
        let Some(reconstructed) = self.to_fhir(value)? else {
            return Ok(());
        };
        match &self.extension_url {
            Some(url) => parent.add_extension(url.clone(), reconstructed),
            None => parent.set_field(&element.name, reconstructed),
        }
        Ok(())
    }

    fn append(
        &self,
        parent: &mut CompositeValue,
        element: &ElementDefinition,
        value: &AvroValue,
    ) -> Result<(), ConversionError> {
        let Some(reconstructed) = self.to_fhir(value)? else {
            return Ok(());
        };
        match &self.extension_url {
            Some(url) => parent.add_extension(url.clone(), reconstructed),
            None => parent.push_repeated(&element.name, reconstructed),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::leaf_converter;
    use crate::schema::{FieldSchema, RecordSchema, nullable};
    use pretty_assertions::assert_eq;

    fn name_converter() -> CompositeConverter {
        let family = leaf_converter("string").unwrap();
        let given = leaf_converter("string").unwrap();
        let children = vec![
            StructureField::property("family", "family", Arc::clone(&family)),
            StructureField::property("given", "given", Arc::clone(&given)),
        ];
        let schema = AvroSchema::record(RecordSchema {
            name: "PatientName".into(),
            namespace: "org.octofhir.avro".into(),
            doc: "Structure for FHIR type HumanName".into(),
            fields: children
                .iter()
                .map(|f| FieldSchema {
                    name: f.field_name.clone(),
                    doc: String::new(),
                    schema: nullable(f.result.data_type().clone()),
                })
                .collect(),
        });
        CompositeConverter::new("HumanName", children, schema)
    }

    #[test]
    fn test_forward_assembles_positionally() {
        let converter = name_converter();
        let mut name = CompositeValue::new("HumanName");
        name.set_field("given", FhirValue::String("Ada".into()));

        let record = converter
            .from_fhir(&FhirValue::Composite(name))
            .unwrap();
        assert_eq!(
            record,
            AvroValue::Record(vec![AvroValue::Null, AvroValue::String("Ada".into())])
        );
    }

    #[test]
    fn test_round_trip_reconstructs_populated_fields() {
        let converter = name_converter();
        let mut name = CompositeValue::new("HumanName");
        name.set_field("family", FhirValue::String("Lovelace".into()));
        name.set_field("given", FhirValue::String("Ada".into()));
        let original = FhirValue::Composite(name);

        let record = converter.from_fhir(&original).unwrap();
        let setter = converter.field_setter(&[]);
        let reconstructed = setter.to_fhir(&record).unwrap().unwrap();
        assert_eq!(reconstructed, original);
    }

    #[test]
    fn test_extension_child_reads_matching_entries() {
        let flag = leaf_converter("boolean").unwrap();
        let children = vec![StructureField::extension(
            "verified",
            "http://example.com/verified",
            flag,
        )];
        let schema = AvroSchema::record(RecordSchema {
            name: "Patient".into(),
            namespace: "org.octofhir.avro".into(),
            doc: String::new(),
            fields: vec![FieldSchema {
                name: "verified".into(),
                doc: "Extension field for http://example.com/verified".into(),
                schema: nullable(AvroSchema::Boolean),
            }],
        });
        let converter = CompositeConverter::new("Patient", children, schema);

        let mut patient = CompositeValue::new("Patient");
        patient.add_extension("http://example.com/other", FhirValue::Boolean(false));
        patient.add_extension("http://example.com/verified", FhirValue::Boolean(true));

        let record = converter.from_fhir(&FhirValue::Composite(patient)).unwrap();
        assert_eq!(record, AvroValue::Record(vec![AvroValue::Boolean(true)]));
    }

    #[test]
    fn test_non_composite_input_is_error() {
        let converter = name_converter();
        assert!(converter.from_fhir(&FhirValue::Boolean(true)).is_err());
    }
}
