//! Unit conversion core
//!
//! One generic converter for every linear category plus the affine
//! temperature special case, dispatched statically through `ConversionKind`.

pub mod format;
pub mod parsing;
pub mod registry;
pub mod session;
pub mod temperature;

use enum_dispatch::enum_dispatch;

use crate::shared::error::AppResult;
use crate::shared::errors::{ConversionError, ConvertResult, ERR_NOT_FINITE};
use crate::shared::types::{
    CategoryDTO, ConvertUnitsRequest, ConvertUnitsResponse, GetUnitsResponse, ParseUnitResponse,
    UnitDTO,
};

use self::format::format_number;
use self::registry::{resolve_in, Category, UnitDefinition, UnitTable};
use self::temperature::TemperatureScale;

pub use self::temperature::{convert_temperature, TemperatureUnit};

/// Conversion behaviour shared by every category kind
#[enum_dispatch]
pub trait Converter {
    /// Declared units, in display order
    fn units(&self) -> &[UnitDefinition];

    /// Look a unit up by symbol or display name
    fn resolve(&self, unit: &str) -> Option<&UnitDefinition> {
        resolve_in(self.units(), unit)
    }

    fn is_linear(&self) -> bool;

    fn convert(&self, from: &str, to: &str, value: f64) -> ConvertResult<f64>;
}

/// Category-level dispatch flag: multiplicative table or affine scale
#[enum_dispatch(Converter)]
#[derive(Debug, Clone)]
pub enum ConversionKind {
    Linear(UnitTable),
    Temperature(TemperatureScale),
}

pub(crate) fn ensure_finite(value: f64) -> ConvertResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConversionError::InvalidInput(format!("{}: {}", ERR_NOT_FINITE, value)))
    }
}

// ============================================================================
// Conversion operations
// ============================================================================

/// `value * factor(from) / factor(to)` within a linear category
pub fn convert_linear(category: Category, from: &str, to: &str, value: f64) -> ConvertResult<f64> {
    let descriptor = category.descriptor();
    match &descriptor.kind {
        ConversionKind::Linear(table) => table.convert(from, to, value),
        ConversionKind::Temperature(_) => Err(ConversionError::NonLinearCategory(category.key().to_string())),
    }
}

/// Convert within any built-in category, dispatching on its kind
pub fn convert(category: Category, from: &str, to: &str, value: f64) -> ConvertResult<f64> {
    category.descriptor().convert(from, to, value)
}

// ============================================================================
// Frontend-facing API
// ============================================================================

/// Every unit in the registry, sorted by category then label
pub fn get_all_units() -> GetUnitsResponse {
    let mut units: Vec<UnitDTO> = Category::ALL
        .iter()
        .flat_map(|c| c.descriptor().unit_dtos())
        .collect();

    units.sort_by(|a, b| {
        a.category
            .cmp(&b.category)
            .then_with(|| a.label.cmp(&b.label))
    });

    GetUnitsResponse { units }
}

/// Units of one category, in declared order
pub fn units_for_category(category: Category) -> Vec<UnitDTO> {
    category.descriptor().unit_dtos()
}

pub fn get_categories() -> Vec<CategoryDTO> {
    Category::ALL.iter().map(|c| c.descriptor().to_dto()).collect()
}

/// Convert a request from the frontend; the category is inferred when absent.
///
/// Units resolve by symbol, name or common alias ("lbs", "kph"). Amounts
/// outside the category's physical domain are `InvalidInput`.
pub fn convert_units(request: ConvertUnitsRequest) -> AppResult<ConvertUnitsResponse> {
    let category = match request.category {
        Some(category) => category,
        None => infer_category(&request.from_unit, &request.to_unit)?,
    };
    let descriptor = category.descriptor();
    let from = lookup_unit(category, &request.from_unit)?;
    let to = lookup_unit(category, &request.to_unit)?;

    descriptor.validate_quantity(&from.symbol, request.amount)?;
    let result = descriptor.convert(&from.symbol, &to.symbol, request.amount)?;

    Ok(ConvertUnitsResponse {
        result,
        formatted_result: format_number(result),
        from_unit: from.symbol.clone(),
        to_unit: to.symbol.clone(),
        category: category.key().to_string(),
    })
}

/// Resolve `unit` within `category`, falling back to the alias table.
/// A unit that only exists in another category is a `CategoryMismatch`.
fn lookup_unit(category: Category, unit: &str) -> ConvertResult<UnitDefinition> {
    let descriptor = category.descriptor();
    if let Some(found) = descriptor.resolve(unit) {
        return Ok(found.clone());
    }
    match parsing::resolve_unit(unit) {
        Some((owner, symbol)) if owner == category => descriptor
            .resolve(&symbol)
            .cloned()
            .ok_or_else(|| ConversionError::unknown_unit(category.key(), unit)),
        Some((_, symbol)) => Err(ConversionError::CategoryMismatch {
            from: category.key().to_string(),
            to: symbol,
        }),
        None => Err(ConversionError::unknown_unit(category.key(), unit)),
    }
}

fn infer_category(from: &str, to: &str) -> ConvertResult<Category> {
    let (from_category, from_symbol) = parsing::resolve_unit(from)
        .ok_or_else(|| ConversionError::unknown_unit("any", from))?;
    match lookup_unit(from_category, to) {
        Ok(_) => Ok(from_category),
        Err(ConversionError::CategoryMismatch { to, .. }) => Err(ConversionError::CategoryMismatch {
            from: from_symbol,
            to,
        }),
        Err(err) => Err(err),
    }
}

/// Parse free text ("12 km", "2 km to miles") into amount, unit and category
pub fn parse_text(text: &str) -> AppResult<ParseUnitResponse> {
    let query = parsing::parse_query(text)?;
    Ok(ParseUnitResponse {
        amount: query.quantity.amount,
        unit: query.quantity.unit,
        category: query.quantity.category,
        target_unit: query.target,
    })
}

/// Parse a quantity from text and convert it into `target`
pub fn quick_convert(text: &str, target: &str) -> AppResult<ConvertUnitsResponse> {
    let quantity = parsing::parse_quantity(text)?;
    if let Err(ConversionError::CategoryMismatch { to, .. }) = lookup_unit(quantity.category, target) {
        return Err(ConversionError::CategoryMismatch {
            from: quantity.unit,
            to,
        }
        .into());
    }

    convert_units(ConvertUnitsRequest {
        amount: quantity.amount,
        from_unit: quantity.unit,
        to_unit: target.to_string(),
        category: Some(quantity.category),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::error::AppError;

    fn assert_close(actual: f64, expected: f64, tolerance: f64) {
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {} ± {}, got {}",
            expected,
            tolerance,
            actual
        );
    }

    #[test]
    fn test_convert_linear() {
        assert_close(convert_linear(Category::Length, "m", "ft", 1.0).unwrap(), 3.28084, 1e-5);
        assert_close(convert_linear(Category::Mass, "kg", "lb", 10.0).unwrap(), 22.0462, 1e-4);
        assert_eq!(convert_linear(Category::Length, "km", "m", 2.5).unwrap(), 2500.0);
        assert_eq!(convert_linear(Category::DigitalStorage, "KiB", "B", 1.0).unwrap(), 1024.0);
        assert_eq!(convert_linear(Category::Time, "h", "min", 2.0).unwrap(), 120.0);
    }

    #[test]
    fn test_convert_linear_errors() {
        assert_eq!(
            convert_linear(Category::Length, "m", "parsec", 1.0),
            Err(ConversionError::unknown_unit("length", "parsec"))
        );
        assert!(matches!(
            convert_linear(Category::Length, "m", "ft", f64::NAN),
            Err(ConversionError::InvalidInput(_))
        ));
        assert_eq!(
            convert_linear(Category::Temperature, "C", "F", 1.0),
            Err(ConversionError::NonLinearCategory("temperature".to_string()))
        );
    }

    #[test]
    fn test_dispatch_by_category_kind() {
        assert_eq!(convert(Category::Temperature, "C", "F", 100.0).unwrap(), 212.0);
        assert_eq!(convert(Category::Length, "m", "cm", 1.0).unwrap(), 100.0);
    }

    #[test]
    fn test_identity_for_every_unit() {
        for category in Category::ALL {
            let descriptor = category.descriptor();
            for unit in descriptor.units() {
                for value in [0.0, 1.0, -1.0, 1e6, 1e-6, 123.456] {
                    assert_eq!(descriptor.convert(&unit.symbol, &unit.symbol, value).unwrap(), value);
                }
            }
        }
    }

    #[test]
    fn test_get_all_units_sorted() {
        let response = get_all_units();
        let total: usize = Category::ALL.iter().map(|c| c.descriptor().units().len()).sum();
        assert_eq!(response.units.len(), total);
        for pair in response.units.windows(2) {
            assert!((&pair[0].category, &pair[0].label) <= (&pair[1].category, &pair[1].label));
        }
    }

    #[test]
    fn test_units_for_category_in_declared_order() {
        let units = units_for_category(Category::Temperature);
        let ids: Vec<&str> = units.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, ["C", "F", "K"]);
        assert!(units.iter().all(|u| u.category == "temperature"));
    }

    #[test]
    fn test_get_categories() {
        let categories = get_categories();
        assert_eq!(categories.len(), Category::ALL.len());
        let temperature = categories.iter().find(|c| c.key == "temperature").unwrap();
        assert!(!temperature.linear);
    }

    #[test]
    fn test_convert_units_infers_category() {
        let response = convert_units(ConvertUnitsRequest {
            amount: 100.0,
            from_unit: "C".to_string(),
            to_unit: "Fahrenheit".to_string(),
            category: None,
        })
        .unwrap();
        assert_eq!(response.result, 212.0);
        assert_eq!(response.formatted_result, "212");
        assert_eq!(response.to_unit, "F");
        assert_eq!(response.category, "temperature");
    }

    #[test]
    fn test_convert_units_category_mismatch() {
        let err = convert_units(ConvertUnitsRequest {
            amount: 1.0,
            from_unit: "kg".to_string(),
            to_unit: "L".to_string(),
            category: None,
        })
        .unwrap_err();
        assert!(matches!(
            err,
            AppError::Conversion(ConversionError::CategoryMismatch { .. })
        ));
    }

    #[test]
    fn test_convert_units_rejects_values_outside_domain() {
        let negative_mass = convert_units(ConvertUnitsRequest {
            amount: -5.0,
            from_unit: "kg".to_string(),
            to_unit: "lb".to_string(),
            category: None,
        })
        .unwrap_err();
        assert!(matches!(
            negative_mass,
            AppError::Conversion(ConversionError::InvalidInput(_))
        ));

        let below_zero = convert_units(ConvertUnitsRequest {
            amount: -10.0,
            from_unit: "K".to_string(),
            to_unit: "C".to_string(),
            category: Some(Category::Temperature),
        })
        .unwrap_err();
        assert!(matches!(
            below_zero,
            AppError::Conversion(ConversionError::InvalidInput(_))
        ));

        let cold = convert_units(ConvertUnitsRequest {
            amount: -40.0,
            from_unit: "C".to_string(),
            to_unit: "F".to_string(),
            category: None,
        })
        .unwrap();
        assert_eq!(cold.result, -40.0);
    }

    #[test]
    fn test_convert_units_resolves_aliases() {
        let response = convert_units(ConvertUnitsRequest {
            amount: 10.0,
            from_unit: "kg".to_string(),
            to_unit: "lbs".to_string(),
            category: None,
        })
        .unwrap();
        assert_eq!(response.to_unit, "lb");
        assert_eq!(response.formatted_result, "22.046226");

        let response = convert_units(ConvertUnitsRequest {
            amount: 36.0,
            from_unit: "kph".to_string(),
            to_unit: "m/s".to_string(),
            category: Some(Category::Speed),
        })
        .unwrap();
        assert_eq!(response.from_unit, "km/h");
        assert_eq!(response.formatted_result, "10");

        let err = convert_units(ConvertUnitsRequest {
            amount: 1.0,
            from_unit: "m".to_string(),
            to_unit: "furlong".to_string(),
            category: None,
        })
        .unwrap_err();
        assert!(matches!(
            err,
            AppError::Conversion(ConversionError::UnknownUnit { .. })
        ));
    }

    #[test]
    fn test_parse_text() {
        let parsed = parse_text("2 km to miles").unwrap();
        assert_eq!(parsed.amount, 2.0);
        assert_eq!(parsed.unit, "km");
        assert_eq!(parsed.category, Category::Length);
        assert_eq!(parsed.target_unit.as_deref(), Some("mi"));
    }

    #[test]
    fn test_quick_convert() {
        let response = quick_convert("1 mile", "km").unwrap();
        assert_eq!(response.formatted_result, "1.609344");
        assert_eq!(response.from_unit, "mi");

        let err = quick_convert("5 kg", "km").unwrap_err();
        assert!(matches!(
            err,
            AppError::Conversion(ConversionError::CategoryMismatch { .. })
        ));
    }
}
