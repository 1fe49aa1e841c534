//! FHIR structure definitions to Avro
//!
//! This crate compiles a structure-definition element tree into two coupled
//! artifacts per type: an Avro record schema describing the serialized
//! layout, and a converter that projects structured FHIR values into that
//! layout and reconstructs them from it.
//!
//! The entry point is [`DefinitionToAvroVisitor`], driven bottom-up by an
//! external definition walker through the
//! [`DefinitionVisitor`](octofhir_avro_model::DefinitionVisitor) contract.
//! Compiled composite types are shared through a [`CompilationSession`],
//! which guarantees a single converter instance per fully-qualified record
//! name within one compilation run.

pub mod converter;
pub mod converters;
pub mod error;
pub mod names;
pub mod schema;
pub mod session;
pub mod value;
pub mod visitor;

pub use converter::{AvroConverter, AvroFieldSetter, ConverterRef, SetterRef, leaf_converter};
pub use error::SchemaError;
pub use schema::{AvroSchema, FieldSchema, RecordSchema, nullable};
pub use session::CompilationSession;
pub use value::AvroValue;
pub use visitor::DefinitionToAvroVisitor;
