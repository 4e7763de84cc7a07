//! Common error types for wemkit

use thiserror::Error;

/// Common result type for wemkit operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised before any work starts: bad configuration or arguments
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input (command-line argument, language code, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
