//! Error types for stream generation.

use thiserror::Error;

/// Error raised while planning or materializing a directed stream.
///
/// Both variants are terminal for one generation attempt: no partially built
/// stream is ever handed back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenError {
    /// The requested ranges or register sets cannot be satisfied by the
    /// active configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// An operation was invoked on a stream that is not ready for it.
    #[error("invalid state: {0}")]
    InvalidState(String),
}

/// Coarse classification of a [`GenError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    InvalidState,
}

impl GenError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GenError::Configuration(_) => ErrorKind::Configuration,
            GenError::InvalidState(_) => ErrorKind::InvalidState,
        }
    }

    pub(crate) fn config(msg: impl Into<String>) -> Self {
        GenError::Configuration(msg.into())
    }

    pub(crate) fn state(msg: impl Into<String>) -> Self {
        GenError::InvalidState(msg.into())
    }
}

impl From<crate::config::ConfigError> for GenError {
    fn from(err: crate::config::ConfigError) -> Self {
        GenError::Configuration(err.to_string())
    }
}

/// Result type for generation operations.
pub type GenResult<T> = Result<T, GenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind() {
        assert_eq!(
            GenError::config("pool too large").kind(),
            ErrorKind::Configuration
        );
        assert_eq!(GenError::state("empty").kind(), ErrorKind::InvalidState);
    }

    #[test]
    fn test_display() {
        let err = GenError::config("range [3, 1] is empty");
        assert_eq!(err.to_string(), "configuration error: range [3, 1] is empty");
    }

    #[test]
    fn test_from_config_error() {
        let err: GenError =
            crate::config::ConfigError::Invalid("ra (sp) must be writable".into()).into();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
}
