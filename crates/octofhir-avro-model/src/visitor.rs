//! Visitor contract implemented by schema compilers
//!
//! A definition walker traverses a structure-definition tree bottom-up and
//! calls one visitor operation per element shape, passing children that have
//! already been compiled. The visitor never pulls additional definition data
//! itself; it is a pure tree-to-tree transform.

use indexmap::IndexMap;

use crate::field::StructureField;

/// Compiles structure-definition elements into schema/converter pairs.
///
/// `Output` is the compiled artifact for one element (a converter carrying
/// its target schema). Operations that can yield "no representable content"
/// (an empty parent extension, for instance) return `Ok(None)`, and the
/// walker omits the element from its parent.
pub trait DefinitionVisitor {
    /// Compiled artifact per element
    type Output;
    /// Fatal compilation error; aborts the walk
    type Error;

    /// Compile a primitive element. Returns `None` for a primitive type name
    /// the visitor does not enumerate; callers are expected to restrict
    /// themselves to known names.
    fn visit_primitive(&mut self, element_name: &str, primitive_type: &str)
    -> Option<Self::Output>;

    /// Compile a record-shaped element from its ordered children.
    fn visit_composite(
        &mut self,
        element_name: &str,
        element_path: &str,
        base_type: &str,
        type_url: &str,
        children: Vec<StructureField<Self::Output>>,
    ) -> Result<Option<Self::Output>, Self::Error>;

    /// Compile a reference element restricted to the given candidate target
    /// types. Candidates may be bare type names or full type URIs; the
    /// trailing path segment identifies the type.
    fn visit_reference(
        &mut self,
        element_name: &str,
        reference_types: &[String],
        children: Vec<StructureField<Self::Output>>,
    ) -> Result<Option<Self::Output>, Self::Error>;

    /// Compile a structured extension group identified by `extension_url`.
    /// An extension with no declared children yields `Ok(None)`.
    fn visit_parent_extension(
        &mut self,
        element_name: &str,
        extension_url: &str,
        children: Vec<StructureField<Self::Output>>,
    ) -> Result<Option<Self::Output>, Self::Error>;

    /// Wrap a single-valued extension's compiled content with its identity.
    fn visit_leaf_extension(
        &mut self,
        element_name: &str,
        extension_url: &str,
        element: Self::Output,
    ) -> Result<Self::Output, Self::Error>;

    /// Compile a polymorphic element; `choice_types` maps candidate type
    /// name to compiled content in declaration order.
    fn visit_choice(
        &mut self,
        element_name: &str,
        choice_types: IndexMap<String, Self::Output>,
    ) -> Result<Option<Self::Output>, Self::Error>;

    /// Wrap a compiled element as a repeated field.
    fn visit_multi_valued(&mut self, element_name: &str, element: Self::Output) -> Self::Output;

    /// How many times the walker may expand a recursive occurrence of the
    /// type at `type_url` below `path` before truncating.
    fn max_depth(&self, type_url: &str, path: &str) -> u32 {
        let _ = (type_url, path);
        1
    }
}
