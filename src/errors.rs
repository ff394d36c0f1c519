// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BakerError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Compilation failed for {entry}: {message}")]
    Compile { entry: String, message: String },

    #[error("Deploy failed for {entry}: {message}")]
    Deploy { entry: String, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Process definition parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BakerError {
    pub fn compile(entry: impl Into<String>, message: impl Into<String>) -> Self {
        BakerError::Compile {
            entry: entry.into(),
            message: message.into(),
        }
    }

    pub fn deploy(entry: impl Into<String>, message: impl Into<String>) -> Self {
        BakerError::Deploy {
            entry: entry.into(),
            message: message.into(),
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, BakerError>;
