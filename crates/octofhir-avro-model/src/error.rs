//! Value-level conversion errors

/// Failure while projecting a structured value to its serialized form or
/// reconstructing it back.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConversionError {
    #[error("expected {expected} value, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: String,
    },

    #[error("choice value tagged with undeclared type: {0}")]
    UnknownChoiceType(String),

    #[error("record value has {found} fields, schema declares {expected}")]
    FieldCountMismatch { expected: usize, found: usize },
}

impl ConversionError {
    /// Shorthand for the pervasive mismatch case.
    pub fn mismatch(expected: &'static str, found: impl ToString) -> Self {
        Self::TypeMismatch {
            expected,
            found: found.to_string(),
        }
    }
}
