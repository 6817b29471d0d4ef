//! Error types shared by every descent backend.

use thiserror::Error;

/// Errors that can occur while parsing text or mapping a source onto typed
/// values.
///
/// Every error is raised at its point of detection and propagates out of the
/// recursive descent unchanged; a failed decode yields no value.
#[derive(Error, Debug)]
pub enum Error {
    /// The input text was not well-formed. Carries the byte offset of the
    /// offending token and a description of what was expected there.
    #[error("parse error at offset {offset}: expected {expected}")]
    Parse { offset: usize, expected: String },

    /// A source value had a different kind than the requested read requires.
    #[error("type mismatch at {at}: expected {expected}, found {found}")]
    TypeMismatch {
        at: String,
        expected: String,
        found: String,
    },

    /// A non-nullable field was absent from the source.
    #[error("missing field {tag}")]
    MissingField { tag: String },

    /// A primitive's stored text is not a valid representation of the
    /// requested target kind.
    #[error("literal {text:?} is not a valid {target}")]
    NumericFormat { text: String, target: &'static str },

    /// A composite's shape did not match the descriptor during descent.
    #[error("unexpected structure at {at}: expected {expected}, found {found}")]
    UnexpectedStructure {
        at: String,
        expected: String,
        found: String,
    },
}

impl Error {
    pub fn type_mismatch(
        at: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Error::TypeMismatch {
            at: at.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub fn missing_field(tag: impl Into<String>) -> Self {
        Error::MissingField { tag: tag.into() }
    }

    pub fn unexpected(
        at: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Error::UnexpectedStructure {
            at: at.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }
}

/// Convenience alias used throughout descent.
pub type Result<T> = std::result::Result<T, Error>;
