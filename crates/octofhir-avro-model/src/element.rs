//! Source-side element metadata handed to reverse-mapping factories

use serde::{Deserialize, Serialize};

/// Metadata for one element of the source structure definition, as needed by
/// field setters to locate and mutate the matching property on a parent
/// composite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementDefinition {
    /// Property name on the parent composite (e.g. "birthDate")
    pub name: String,
    /// Declared type name of the element (e.g. "date", "HumanName")
    pub type_name: String,
}

impl ElementDefinition {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}
