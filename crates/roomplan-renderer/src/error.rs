//! 模型加载错误

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Model reference is empty")]
    MissingReference,

    #[error("Unsupported model format: {0}")]
    UnsupportedFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse {reference}: {message}")]
    Parse { reference: String, message: String },

    #[error("Model has no geometry: {0}")]
    EmptyGeometry(String),
}
