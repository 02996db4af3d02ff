//! Unit conversion core
//!
//! Unit tables for the built-in categories, a linear converter, the affine
//! temperature converter and a conversion session with bounded history.

pub mod core;
pub mod shared;

pub use crate::core::features::unit_converter::format::{format_number, NumberFormat, NumberLocale};
pub use crate::core::features::unit_converter::registry::{
    Category, CategoryDescriptor, UnitDefinition, UnitTable,
};
pub use crate::core::features::unit_converter::session::{
    ConversionResult, ConversionSession, ConvertOutcome, SessionState,
};
pub use crate::core::features::unit_converter::{
    convert, convert_linear, convert_temperature, convert_units, get_all_units, get_categories,
    parse_text, quick_convert, units_for_category, ConversionKind, Converter, TemperatureUnit,
};
pub use crate::core::history::ConversionHistory;
pub use crate::shared::error::{AppError, AppResult};
pub use crate::shared::errors::{ConversionError, ConvertResult};
pub use crate::shared::settings::ConverterSettings;
