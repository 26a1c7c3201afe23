//! Object storage errors.

use thiserror::Error;

/// Failure of a blob operation, carrying the key it concerned.
#[derive(Debug, Error)]
pub enum StorageError {
    /// No object at the key.
    #[error("no object stored at {key}")]
    NotFound {
        /// Key that was looked up.
        key: String,
    },

    /// The provider could not be set up from configuration.
    #[error("storage provider misconfigured: {0}")]
    Configuration(String),

    /// The provider rejected or failed the call.
    #[error("{0}")]
    Operation(String),
}

impl StorageError {
    /// Provider setup failure.
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Provider call failure with a free-form message.
    #[must_use]
    pub fn operation(msg: impl Into<String>) -> Self {
        Self::Operation(msg.into())
    }

    /// Classifies an OpenDAL error raised while running `op` against `key`.
    pub(crate) fn at(op: &str, key: &str, err: &opendal::Error) -> Self {
        if err.kind() == opendal::ErrorKind::NotFound {
            Self::NotFound {
                key: key.to_string(),
            }
        } else {
            Self::Operation(format!("{op} {key}: {err}"))
        }
    }
}
