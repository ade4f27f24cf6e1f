//! Error types for ReExplore.

use std::io;

/// Errors produced by ReExplore.
#[derive(Debug, thiserror::Error)]
pub enum ReexError {
    #[error("backend error: {0}")]
    Backend(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("capacity exceeded: {0}")]
    Capacity(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, ReexError>;
