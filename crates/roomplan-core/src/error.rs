//! 核心模型错误

use thiserror::Error;

/// 核心模型操作错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Invalid dimension {name}: {value} (must be a positive finite number)")]
    InvalidDimension { name: &'static str, value: f64 },

    #[error("Design name must not be empty")]
    EmptyName,

    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Custom shape needs at least 3 points, got {0}")]
    TooFewPoints(usize),

    #[error("Custom shape has zero extent")]
    DegenerateShape,
}

pub type CoreResult<T> = Result<T, CoreError>;
