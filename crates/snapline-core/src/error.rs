//! Error types.

use crate::diagram::ElementId;
use thiserror::Error;

/// Snap configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid threshold: {0}")]
    InvalidThreshold(f64),
    #[error("Invalid grid size: {0}")]
    InvalidGridSize(f64),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Host diagram errors.
#[derive(Debug, Error)]
pub enum DiagramError {
    #[error("Element not found: {0}")]
    UnknownElement(ElementId),
    #[error("Parent not found: {0}")]
    UnknownParent(ElementId),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Invalid snap config: {0}")]
    Config(#[from] ConfigError),
}

/// Result type for diagram operations.
pub type DiagramResult<T> = Result<T, DiagramError>;
