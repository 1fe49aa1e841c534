//! Fatal compilation errors

/// Unrecoverable schema-compilation failure. Nothing partial is published:
/// these errors are raised before any cache entry is written.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SchemaError {
    #[error("unrecognized structure definition URL: {0}")]
    UnrecognizedStructureUrl(String),

    #[error(
        "record name {full_name} already compiled from \"{existing}\", \
         cannot recompile it from \"{conflicting}\""
    )]
    NameCollision {
        full_name: String,
        existing: String,
        conflicting: String,
    },
}
