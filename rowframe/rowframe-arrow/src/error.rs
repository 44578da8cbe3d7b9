use arrow::error::ArrowError;
use rowframe_core::ValueTypeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArrowConvertError {
    #[error("value type mismatch: {0}")]
    ValueType(#[from] ValueTypeError),
    #[error(transparent)]
    Arrow(#[from] ArrowError),
}

impl ArrowConvertError {
    pub(crate) fn builder(expected: &str) -> Self {
        Self::Arrow(ArrowError::InvalidArgumentError(format!(
            "expected builder type: {expected}"
        )))
    }
}
