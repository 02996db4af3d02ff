//! Conversion error taxonomy
//!
//! Every converter and session operation returns `ConvertResult<T>`.
//! All variants are serializable so a frontend can render them directly.

use serde::Serialize;
use thiserror::Error;

/// Errors produced by the conversion core
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "message")]
pub enum ConversionError {
    /// Unit identifier is not part of the category's table
    #[error("Unknown unit '{unit}' for category {category}")]
    UnknownUnit { category: String, unit: String },

    /// Category identifier does not name a known category
    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    /// Value is empty, non-numeric, NaN, infinite or outside the physical domain
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Source and target units belong to different categories
    #[error("Cannot convert between {from} and {to} (incompatible categories)")]
    CategoryMismatch { from: String, to: String },

    /// A multiplicative factor was requested from an affine category
    #[error("Category {0} has no multiplicative conversion factors")]
    NonLinearCategory(String),

    /// Hand-supplied unit table violates the table invariants
    #[error("Invalid unit table: {0}")]
    InvalidTable(String),
}

impl ConversionError {
    pub fn unknown_unit(category: impl Into<String>, unit: impl Into<String>) -> Self {
        ConversionError::UnknownUnit {
            category: category.into(),
            unit: unit.into(),
        }
    }

    /// Whether the session recovers from this error locally
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ConversionError::InvalidInput(_))
    }
}

pub type ConvertResult<T> = Result<T, ConversionError>;

// Shared validation messages
pub const ERR_EMPTY_INPUT: &str = "Please enter a value";
pub const ERR_NOT_A_NUMBER: &str = "Value is not a number";
pub const ERR_NOT_FINITE: &str = "Value must be a finite number";
pub const ERR_NEGATIVE_QUANTITY: &str = "Value cannot be negative";
pub const ERR_BELOW_ABSOLUTE_ZERO: &str = "Temperature cannot be below absolute zero";
