//! Common error types for the band-management client

use thiserror::Error;

/// Common result type for band-management operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the client crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML config file could not be parsed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Identifier received from outside the client was empty or malformed
    #[error("Invalid identifier: {0:?}")]
    InvalidId(String),
}
