//! 2D编辑错误

use roomplan_core::error::CoreError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DrawError {
    #[error("A custom shape needs at least 3 points, got {0}")]
    TooFewPoints(usize),

    #[error("The drawn shape has no area")]
    DegenerateShape,

    #[error("No active design")]
    NoActiveDesign,
}

impl From<CoreError> for DrawError {
    fn from(error: CoreError) -> Self {
        match error {
            CoreError::TooFewPoints(n) => DrawError::TooFewPoints(n),
            _ => DrawError::DegenerateShape,
        }
    }
}
