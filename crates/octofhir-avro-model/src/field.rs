//! Per-child field metadata produced by the definition walker

/// Pairs a compiled child result with the metadata a schema compiler needs to
/// lay the child out in a record: the target field name, the source property
/// it came from, and its extension identity if any.
///
/// Created once per child by the definition walker and consumed once by the
/// visitor operation it is passed to.
#[derive(Debug, Clone)]
pub struct StructureField<T> {
    /// Field identifier in the target schema
    pub field_name: String,
    /// Source property identifier; `None` for synthesized fields
    pub property_name: Option<String>,
    /// Identifying URL when this child is an extension
    pub extension_url: Option<String>,
    /// Whether the child is populated from extension entries rather than a
    /// named property
    pub is_extension: bool,
    /// The compiled child
    pub result: T,
}

impl<T> StructureField<T> {
    /// A field backed by an ordinary named property.
    pub fn property(
        property_name: impl Into<String>,
        field_name: impl Into<String>,
        result: T,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            property_name: Some(property_name.into()),
            extension_url: None,
            is_extension: false,
            result,
        }
    }

    /// A field backed by extension entries with the given URL.
    pub fn extension(field_name: impl Into<String>, url: impl Into<String>, result: T) -> Self {
        Self {
            field_name: field_name.into(),
            property_name: None,
            extension_url: Some(url.into()),
            is_extension: true,
            result,
        }
    }
}
