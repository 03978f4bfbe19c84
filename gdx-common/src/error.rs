//! Common error types for GameDex

use thiserror::Error;

/// Common result type for GameDex operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across GameDex services
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Every listing failure means the folder cannot be served
impl From<crate::document::ListError> for Error {
    fn from(err: crate::document::ListError) -> Self {
        use crate::document::ListError;
        match err {
            ListError::PathNotFound(path)
            | ListError::NotADirectory(path)
            | ListError::Io(path, _) => Error::NotFound(path.display().to_string()),
        }
    }
}
