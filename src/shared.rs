pub mod types;
pub mod settings;
pub mod errors;
pub mod error;

#[cfg(test)]
mod types_test;

// Re-export the error types for convenience
pub use error::{AppError, AppResult};
pub use errors::{ConversionError, ConvertResult};
