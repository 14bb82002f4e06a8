use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PortcullisError {
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Config error: {0}")]
    ConfigError(String),
    #[error("Registry snapshot error: {0}")]
    SnapshotError(String),
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Not found: {0}")]
    NotFound(String),
}
