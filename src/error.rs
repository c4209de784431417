//! Error types for voxrelay.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelayError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Decoder errors (fatal, abort before streaming starts)
    #[error("Failed to decode audio from {path}: {message}")]
    Decode { path: String, message: String },

    #[error("Unsupported audio format: {message}")]
    UnsupportedFormat { message: String },

    // Session errors
    #[error("Connection to {endpoint} failed: {message}")]
    Connect { endpoint: String, message: String },

    #[error("Connection lost: {message}")]
    ConnectionLost { message: String },

    // Transcript sink errors (reported, never fatal to the stream)
    #[error("Failed to write transcript to {path}: {message}")]
    SinkWrite { path: String, message: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, RelayError>;
