//! Structural converters produced by the schema compiler

pub mod choice;
pub mod composite;
pub mod extension;
pub mod multi;
pub mod reference;

pub use choice::ChoiceConverter;
pub use composite::CompositeConverter;
pub use extension::LeafExtensionConverter;
pub use multi::MultiValuedConverter;
pub use reference::RelativeValueConverter;
