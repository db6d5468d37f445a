//! Error family for option resolution

use thiserror::Error;

/// Errors raised while resolving, writing or deleting options
///
/// Every variant except [`ConfError::Store`] is a configuration or programmer
/// error and is never worth retrying. Store failures are passed through as-is.
#[derive(Debug, Error)]
pub enum ConfError {
    #[error("Option '{0}' is not registered")]
    UnknownOption(String),

    #[error("Option '{0}' is required but has no value")]
    MissingRequiredOption(String),

    #[error("Invalid value for option '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Cannot {operation} option '{key}' on the {backend} backend")]
    UnsupportedOperation {
        key: String,
        operation: &'static str,
        backend: &'static str,
    },

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Discriminant of a [`ConfError`], for callers that branch on the kind only
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfErrorKind {
    UnknownOption,
    MissingRequiredOption,
    InvalidValue,
    UnsupportedOperation,
    Store,
}

impl ConfError {
    pub fn kind(&self) -> ConfErrorKind {
        match self {
            ConfError::UnknownOption(_) => ConfErrorKind::UnknownOption,
            ConfError::MissingRequiredOption(_) => ConfErrorKind::MissingRequiredOption,
            ConfError::InvalidValue { .. } => ConfErrorKind::InvalidValue,
            ConfError::UnsupportedOperation { .. } => ConfErrorKind::UnsupportedOperation,
            ConfError::Store(_) => ConfErrorKind::Store,
        }
    }

    pub(crate) fn invalid(key: &str, reason: impl Into<String>) -> Self {
        ConfError::InvalidValue {
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unsupported(key: &str, operation: &'static str, backend: &'static str) -> Self {
        ConfError::UnsupportedOperation {
            key: key.to_string(),
            operation,
            backend,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfError>;
