//! FHIR structure-definition model layer
//!
//! This crate provides:
//! - The in-memory structured object model (FhirValue and friends)
//! - Field metadata handed from the definition walker to schema visitors
//! - The DefinitionVisitor contract implemented by schema compilers
//! - Value-level conversion errors

pub mod element;
pub mod error;
pub mod field;
pub mod value;
pub mod visitor;

pub use element::*;
pub use error::*;
pub use field::*;
pub use value::*;
pub use visitor::*;
