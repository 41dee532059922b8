use crate::config::ParamType;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MtError {
    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Missing background model: {0}")]
    MissingBackground(String),

    #[error("Unsupported parameterization {param_type} for {operation}")]
    UnsupportedParameterization {
        operation: &'static str,
        param_type: ParamType,
    },

    #[error("Shape mismatch: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        expected: [usize; 3],
        found: [usize; 3],
    },

    #[error("Grid mismatch: {0}")]
    GridMismatch(String),

    #[error("Index out of range on {axis} axis: index={index}, limit={limit}")]
    IndexOutOfRange {
        axis: char,
        index: usize,
        limit: usize,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type MtResult<T> = Result<T, MtError>;
