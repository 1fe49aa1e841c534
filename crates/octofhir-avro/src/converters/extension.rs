//! Leaf extension wrapper
//!
//! Wraps a single compiled child with an extension identity. The schema and
//! both mappings are the child's; the URL is carried as metadata so the
//! reverse mapping can file the reconstructed value as an extension entry on
//! the parent, and so hosts can discover which extension a field represents.

use std::sync::Arc;

use octofhir_avro_model::{CompositeValue, ConversionError, ElementDefinition, FhirValue};

use crate::converter::{AvroConverter, AvroFieldSetter, ConverterRef, SetterRef};
use crate::schema::AvroSchema;
use crate::value::AvroValue;

pub struct LeafExtensionConverter {
    extension_url: String,
    element: ConverterRef,
}

impl LeafExtensionConverter {
    pub fn new(extension_url: impl Into<String>, element: ConverterRef) -> Self {
        Self {
            extension_url: extension_url.into(),
            element,
        }
    }
}

impl AvroConverter for LeafExtensionConverter {
    fn data_type(&self) -> &AvroSchema {
        self.element.data_type()
    }

    fn element_type(&self) -> &str {
        self.element.element_type()
    }

    fn from_fhir(&self, value: &FhirValue) -> Result<AvroValue, ConversionError> {
        self.element.from_fhir(value)
    }

    fn field_setter(&self, elements: &[ElementDefinition]) -> SetterRef {
        Arc::new(LeafExtensionSetter {
            extension_url: self.extension_url.clone(),
            element: self.element.field_setter(elements),
        })
    }

    fn extension_url(&self) -> Option<&str> {
        Some(&self.extension_url)
    }
}

struct LeafExtensionSetter {
    extension_url: String,
    element: SetterRef,
}

impl AvroFieldSetter for LeafExtensionSetter {
    fn to_fhir(&self, value: &AvroValue) -> Result<Option<FhirValue>, ConversionError> {
        self.element.to_fhir(value)
    }

    fn set_field(
        &self,
        parent: &mut CompositeValue,
        _element: &ElementDefinition,
        value: &AvroValue,
    ) -> Result<(), ConversionError> {
        if let Some(reconstructed) = self.to_fhir(value)? {
            parent.add_extension(self.extension_url.clone(), reconstructed);
        }
        Ok(())
    }

    fn append(
        &self,
        parent: &mut CompositeValue,
        element: &ElementDefinition,
        value: &AvroValue,
    ) -> Result<(), ConversionError> {
        // Extension entries append naturally; repeated extensions land as
        // multiple entries under the same URL.
        self.set_field(parent, element, value)
    }
}
