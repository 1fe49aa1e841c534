//! Definition-to-Avro schema compiler
//!
//! Implements the [`DefinitionVisitor`] contract: the definition walker
//! drives a strictly bottom-up traversal and hands each operation its
//! already-compiled children; every operation returns a converter carrying
//! the Avro schema for that element. Composite, reference, and
//! parent-extension records are memoized in the [`CompilationSession`] under
//! their fully-qualified names, so recursively-referenced and repeated types
//! share one converter instance. Choice schemas are deliberately not cached;
//! each call site gets a fresh instance.

use std::sync::Arc;

use indexmap::IndexMap;
use log::debug;

use octofhir_avro_model::{DefinitionVisitor, StructureField};

use crate::converter::{ConverterRef, leaf_converter};
use crate::converters::{
    ChoiceConverter, CompositeConverter, LeafExtensionConverter, MultiValuedConverter,
    RelativeValueConverter,
};
use crate::error::SchemaError;
use crate::names;
use crate::schema::{AvroSchema, FieldSchema, RecordSchema, nullable};
use crate::session::CompilationSession;

/// Compiles structure-definition elements into Avro schema/converter pairs.
pub struct DefinitionToAvroVisitor<'a> {
    session: &'a CompilationSession,
}

impl<'a> DefinitionToAvroVisitor<'a> {
    pub fn new(session: &'a CompilationSession) -> Self {
        Self { session }
    }
}

fn field_schemas(children: &[StructureField<ConverterRef>]) -> Vec<FieldSchema> {
    children
        .iter()
        .map(|field| {
            let doc = match &field.extension_url {
                Some(url) => format!("Extension field for {url}"),
                None => format!(
                    "Field for FHIR property {}",
                    field.property_name.as_deref().unwrap_or(field.field_name.as_str())
                ),
            };
            FieldSchema {
                name: field.field_name.clone(),
                doc,
                schema: nullable(field.result.data_type().clone()),
            }
        })
        .collect()
}

impl DefinitionVisitor for DefinitionToAvroVisitor<'_> {
    type Output = ConverterRef;
    type Error = SchemaError;

    fn visit_primitive(
        &mut self,
        _element_name: &str,
        primitive_type: &str,
    ) -> Option<ConverterRef> {
        leaf_converter(primitive_type)
    }

    fn visit_composite(
        &mut self,
        _element_name: &str,
        element_path: &str,
        base_type: &str,
        type_url: &str,
        children: Vec<StructureField<ConverterRef>>,
    ) -> Result<Option<ConverterRef>, SchemaError> {
        let record_name = names::record_name_for(element_path);
        let namespace = names::namespace_for(type_url)?;
        let full_name = format!("{namespace}.{record_name}");
        let base_type = base_type.to_string();
        let origin = format!("path:{element_path}");

        let converter = self.session.get_or_insert(&full_name, &origin, move || {
            debug!("compiling composite {namespace}.{record_name} for FHIR type {base_type}");
            let fields = field_schemas(&children);
            let schema = AvroSchema::record(RecordSchema {
                name: record_name,
                namespace,
                doc: format!("Structure for FHIR type {base_type}"),
                fields,
            });
            Arc::new(CompositeConverter::new(base_type, children, schema)) as ConverterRef
        })?;
        Ok(Some(converter))
    }

    fn visit_reference(
        &mut self,
        _element_name: &str,
        reference_types: &[String],
        children: Vec<StructureField<ConverterRef>>,
    ) -> Result<Option<ConverterRef>, SchemaError> {
        // The record name reflects the set of types the reference may target.
        let type_names: Vec<String> = reference_types
            .iter()
            .map(|uri| names::trailing_segment(uri).to_string())
            .collect();
        let record_name = format!("{}Reference", type_names.concat());
        let full_name = format!("{}.{record_name}", names::ROOT_NAMESPACE);
        let origin = format!("reference:{record_name}");

        let converter = self.session.get_or_insert(&full_name, &origin, move || {
            debug!("compiling reference record {record_name} for targets {type_names:?}");

            // Convenience projections of the relative reference, one per
            // candidate type, ahead of the declared children.
            let mut with_references: Vec<StructureField<ConverterRef>> = type_names
                .iter()
                .map(|type_name| {
                    StructureField::property(
                        "reference",
                        format!("{type_name}Id"),
                        Arc::new(RelativeValueConverter::new(type_name.as_str())) as ConverterRef,
                    )
                })
                .collect();
            with_references.extend(children);

            let fields = with_references
                .iter()
                .map(|field| FieldSchema {
                    name: field.field_name.clone(),
                    doc: "Reference field".into(),
                    schema: nullable(field.result.data_type().clone()),
                })
                .collect();
            let schema = AvroSchema::record(RecordSchema {
                name: record_name.clone(),
                namespace: names::ROOT_NAMESPACE.to_string(),
                doc: format!("Structure for FHIR type {record_name}"),
                fields,
            });
            Arc::new(CompositeConverter::new(record_name, with_references, schema)) as ConverterRef
        })?;
        Ok(Some(converter))
    }

    fn visit_parent_extension(
        &mut self,
        _element_name: &str,
        extension_url: &str,
        children: Vec<StructureField<ConverterRef>>,
    ) -> Result<Option<ConverterRef>, SchemaError> {
        // An extension without declared content has no representable shape;
        // the element is omitted from its parent's schema.
        if children.is_empty() {
            return Ok(None);
        }

        let namespace = names::namespace_for(extension_url)?;
        let record_name = names::extension_record_name(extension_url);
        let full_name = format!("{namespace}.{record_name}");
        let url = extension_url.to_string();
        let origin = format!("extension:{extension_url}");

        let converter = self.session.get_or_insert(&full_name, &origin, move || {
            debug!("compiling parent extension {namespace}.{record_name} for {url}");
            let fields = field_schemas(&children);
            let schema = AvroSchema::record(RecordSchema {
                name: record_name.clone(),
                namespace,
                doc: format!("Structure for FHIR extension {url}"),
                fields,
            });
            Arc::new(CompositeConverter::with_extension_url(
                record_name,
                children,
                schema,
                url,
            )) as ConverterRef
        })?;
        Ok(Some(converter))
    }

    fn visit_leaf_extension(
        &mut self,
        _element_name: &str,
        extension_url: &str,
        element: ConverterRef,
    ) -> Result<ConverterRef, SchemaError> {
        Ok(Arc::new(LeafExtensionConverter::new(extension_url, element)) as ConverterRef)
    }

    fn visit_choice(
        &mut self,
        _element_name: &str,
        choice_types: IndexMap<String, ConverterRef>,
    ) -> Result<Option<ConverterRef>, SchemaError> {
        let concatenated: String = choice_types.keys().map(String::as_str).collect();
        let record_name = format!("Choice{concatenated}");

        let fields = choice_types
            .iter()
            .map(|(type_name, converter)| FieldSchema {
                name: names::lower_camel(type_name),
                doc: "Choice field".into(),
                schema: nullable(converter.data_type().clone()),
            })
            .collect();
        let schema = AvroSchema::record(RecordSchema {
            name: record_name.clone(),
            namespace: names::ROOT_NAMESPACE.to_string(),
            doc: "Structure for FHIR choice type".into(),
            fields,
        });

        Ok(Some(
            Arc::new(ChoiceConverter::new(record_name, choice_types, schema)) as ConverterRef,
        ))
    }

    fn visit_multi_valued(&mut self, _element_name: &str, element: ConverterRef) -> ConverterRef {
        Arc::new(MultiValuedConverter::new(element))
    }
}
