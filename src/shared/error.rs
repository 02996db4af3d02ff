use serde::Serialize;
use thiserror::Error;

use crate::shared::errors::ConversionError;

#[derive(Error, Debug, Serialize)]
pub enum AppError {
    #[error("I/O Error: {0}")]
    Io(String),

    #[error("Settings Error: {0}")]
    Settings(String),

    #[error("Validation Error: {0}")]
    Validation(String),

    #[error("Conversion Error: {0}")]
    Conversion(#[from] ConversionError),
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Validation(format!("Serialization error: {}", err))
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_error_wraps() {
        let err: AppError = ConversionError::InvalidInput("abc".into()).into();
        assert_eq!(err.to_string(), "Conversion Error: Invalid input: abc");
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        assert!(matches!(AppError::from(io), AppError::Io(msg) if msg == "missing"));
    }
}
