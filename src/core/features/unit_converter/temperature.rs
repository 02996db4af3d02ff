// Temperature conversion
// Affine scales cannot share one multiplicative factor, so every conversion
// normalizes to Celsius first and expands to the target from there.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::registry::UnitDefinition;
use super::{ensure_finite, Converter};
use crate::shared::errors::{ConversionError, ConvertResult};

/// 0 K expressed in Celsius
pub const ABSOLUTE_ZERO_C: f64 = -273.15;

/// Tolerance for values that land on absolute zero after a round trip
const ABSOLUTE_ZERO_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum TemperatureUnit {
    Celsius,
    Fahrenheit,
    Kelvin,
}

impl TemperatureUnit {
    pub const ALL: [TemperatureUnit; 3] = [
        TemperatureUnit::Celsius,
        TemperatureUnit::Fahrenheit,
        TemperatureUnit::Kelvin,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "C",
            TemperatureUnit::Fahrenheit => "F",
            TemperatureUnit::Kelvin => "K",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "Celsius",
            TemperatureUnit::Fahrenheit => "Fahrenheit",
            TemperatureUnit::Kelvin => "Kelvin",
        }
    }

    /// Accepts symbols, names and degree-sign spellings ("°F", "degC")
    pub fn from_id(unit: &str) -> Option<Self> {
        match unit.trim().to_lowercase().as_str() {
            "c" | "°c" | "degc" | "celsius" | "centigrade" => Some(TemperatureUnit::Celsius),
            "f" | "°f" | "degf" | "fahrenheit" => Some(TemperatureUnit::Fahrenheit),
            "k" | "kelvin" | "kelvins" => Some(TemperatureUnit::Kelvin),
            _ => None,
        }
    }

    fn index(self) -> usize {
        match self {
            TemperatureUnit::Celsius => 0,
            TemperatureUnit::Fahrenheit => 1,
            TemperatureUnit::Kelvin => 2,
        }
    }

    pub fn to_celsius(self, value: f64) -> f64 {
        match self {
            TemperatureUnit::Celsius => value,
            TemperatureUnit::Fahrenheit => (value - 32.0) * 5.0 / 9.0,
            TemperatureUnit::Kelvin => value - 273.15,
        }
    }

    pub fn from_celsius(self, celsius: f64) -> f64 {
        // Explicit parentheses: (c * 9/5) + 32
        match self {
            TemperatureUnit::Celsius => celsius,
            TemperatureUnit::Fahrenheit => (celsius * 9.0 / 5.0) + 32.0,
            TemperatureUnit::Kelvin => celsius + 273.15,
        }
    }

    /// Whether `value` in this unit is colder than absolute zero
    pub fn is_below_absolute_zero(self, value: f64) -> bool {
        self.to_celsius(value) < ABSOLUTE_ZERO_C - ABSOLUTE_ZERO_EPSILON
    }
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TemperatureUnit {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TemperatureUnit::from_id(s).ok_or_else(|| ConversionError::unknown_unit("temperature", s))
    }
}

/// Convert between temperature scales.
///
/// No physical lower bound is enforced here; sessions reject values below
/// absolute zero before calling in.
pub fn convert_temperature(
    from: TemperatureUnit,
    to: TemperatureUnit,
    value: f64,
) -> ConvertResult<f64> {
    ensure_finite(value)?;
    if from == to {
        return Ok(value);
    }
    let celsius = from.to_celsius(value);
    let result = to.from_celsius(celsius);
    tracing::debug!(from = from.symbol(), to = to.symbol(), value, result, "temperature conversion");
    Ok(result)
}

/// Unit listing for the temperature category
#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureScale {
    units: Vec<UnitDefinition>,
}

impl TemperatureScale {
    pub fn new() -> Self {
        Self {
            units: TemperatureUnit::ALL
                .iter()
                .map(|t| UnitDefinition::new(t.symbol(), t.name()))
                .collect(),
        }
    }
}

impl Default for TemperatureScale {
    fn default() -> Self {
        Self::new()
    }
}

impl Converter for TemperatureScale {
    fn units(&self) -> &[UnitDefinition] {
        &self.units
    }

    fn resolve(&self, unit: &str) -> Option<&UnitDefinition> {
        TemperatureUnit::from_id(unit).map(|t| &self.units[t.index()])
    }

    fn is_linear(&self) -> bool {
        false
    }

    fn convert(&self, from: &str, to: &str, value: f64) -> ConvertResult<f64> {
        let from: TemperatureUnit = from.parse()?;
        let to: TemperatureUnit = to.parse()?;
        convert_temperature(from, to, value)
    }
}
