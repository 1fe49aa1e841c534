//! Choice converter: tagged polymorphic elements
//!
//! A choice element holds exactly one of several declared candidate types at
//! runtime. Its record schema carries one optional field per candidate; the
//! converter dispatches on the value's explicit type tag against the
//! candidate map, so exactly one field is populated per instance and an
//! undeclared tag is a conversion error.

use std::sync::Arc;

use indexmap::IndexMap;

use octofhir_avro_model::{ChoiceValue, ConversionError, ElementDefinition, FhirValue};

use crate::converter::{AvroConverter, AvroFieldSetter, ConverterRef, SetterRef};
use crate::names;
use crate::schema::AvroSchema;
use crate::value::AvroValue;

pub struct ChoiceConverter {
    element_type: String,
    choice_types: IndexMap<String, ConverterRef>,
    schema: AvroSchema,
}

impl ChoiceConverter {
    pub fn new(
        element_type: impl Into<String>,
        choice_types: IndexMap<String, ConverterRef>,
        schema: AvroSchema,
    ) -> Self {
        Self {
            element_type: element_type.into(),
            choice_types,
            schema,
        }
    }
}

impl AvroConverter for ChoiceConverter {
    fn data_type(&self) -> &AvroSchema {
        &self.schema
    }

    fn element_type(&self) -> &str {
        &self.element_type
    }

    fn from_fhir(&self, value: &FhirValue) -> Result<AvroValue, ConversionError> {
        let FhirValue::Choice(ChoiceValue { type_name, value }) = value else {
            return Err(ConversionError::mismatch("Choice", value.kind()));
        };

        let mut fields = Vec::with_capacity(self.choice_types.len());
        let mut matched = false;
        for (candidate, converter) in &self.choice_types {
            if candidate == type_name {
                fields.push(converter.from_fhir(value)?);
                matched = true;
            } else {
                fields.push(AvroValue::Null);
            }
        }
        if !matched {
            return Err(ConversionError::UnknownChoiceType(type_name.clone()));
        }
        Ok(AvroValue::Record(fields))
    }

    fn field_setter(&self, _elements: &[ElementDefinition]) -> SetterRef {
        let candidates = self
            .choice_types
            .iter()
            .map(|(type_name, converter)| {
                let element =
                    ElementDefinition::new(names::lower_camel(type_name), type_name.as_str());
                CandidateSetter {
                    type_name: type_name.clone(),
                    setter: converter.field_setter(std::slice::from_ref(&element)),
                }
            })
            .collect();
        Arc::new(ChoiceSetter { candidates })
    }
}

struct CandidateSetter {
    type_name: String,
    setter: SetterRef,
}

struct ChoiceSetter {
    candidates: Vec<CandidateSetter>,
}

impl AvroFieldSetter for ChoiceSetter {
    fn to_fhir(&self, value: &AvroValue) -> Result<Option<FhirValue>, ConversionError> {
        let fields = value
            .as_record()
            .ok_or_else(|| ConversionError::mismatch("Record", value.kind()))?;
        if fields.len() != self.candidates.len() {
            return Err(ConversionError::FieldCountMismatch {
                expected: self.candidates.len(),
                found: fields.len(),
            });
        }

        for (candidate, field_value) in self.candidates.iter().zip(fields) {
            if field_value.is_null() {
                continue;
            }
            let inner = candidate.setter.to_fhir(field_value)?;
            return Ok(inner.map(|reconstructed| {
                FhirValue::Choice(ChoiceValue::new(candidate.type_name.clone(), reconstructed))
            }));
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::leaf_converter;
    use crate::schema::{FieldSchema, RecordSchema, nullable};
    use pretty_assertions::assert_eq;

    fn value_choice() -> ChoiceConverter {
        let mut choice_types: IndexMap<String, ConverterRef> = IndexMap::new();
        choice_types.insert("String".into(), leaf_converter("string").unwrap());
        choice_types.insert("Boolean".into(), leaf_converter("boolean").unwrap());

        let fields = choice_types
            .iter()
            .map(|(name, converter)| FieldSchema {
                name: names::lower_camel(name),
                doc: "Choice field".into(),
                schema: nullable(converter.data_type().clone()),
            })
            .collect();
        let schema = AvroSchema::record(RecordSchema {
            name: "ChoiceStringBoolean".into(),
            namespace: names::ROOT_NAMESPACE.into(),
            doc: "Structure for FHIR choice type".into(),
            fields,
        });
        ChoiceConverter::new("ChoiceStringBoolean", choice_types, schema)
    }

    #[test]
    fn test_exactly_one_field_is_populated() {
        let converter = value_choice();
        let value = FhirValue::Choice(ChoiceValue::new("Boolean", FhirValue::Boolean(true)));
        let record = converter.from_fhir(&value).unwrap();
        assert_eq!(
            record,
            AvroValue::Record(vec![AvroValue::Null, AvroValue::Boolean(true)])
        );
    }

    #[test]
    fn test_undeclared_tag_is_error() {
        let converter = value_choice();
        let value = FhirValue::Choice(ChoiceValue::new("Quantity", FhirValue::Integer(1)));
        assert!(matches!(
            converter.from_fhir(&value),
            Err(ConversionError::UnknownChoiceType(_))
        ));
    }

    #[test]
    fn test_round_trip_restores_tag_and_value() {
        let converter = value_choice();
        let original = FhirValue::Choice(ChoiceValue::new(
            "String",
            FhirValue::String("high".into()),
        ));
        let record = converter.from_fhir(&original).unwrap();
        let setter = converter.field_setter(&[]);
        assert_eq!(setter.to_fhir(&record).unwrap(), Some(original));
    }

    #[test]
    fn test_all_absent_reconstructs_nothing() {
        let converter = value_choice();
        let setter = converter.field_setter(&[]);
        let record = AvroValue::Record(vec![AvroValue::Null, AvroValue::Null]);
        assert_eq!(setter.to_fhir(&record).unwrap(), None);
    }
}
