//! Unit registry
//!
//! Built-in categories and their unit tables are initialized once and shared
//! by `Arc` across every session. Factors express "1 unit = factor × base unit".

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::temperature::{TemperatureScale, TemperatureUnit};
use super::{ensure_finite, ConversionKind, Converter};
use crate::shared::errors::{
    ConversionError, ConvertResult, ERR_BELOW_ABSOLUTE_ZERO, ERR_NEGATIVE_QUANTITY,
};
use crate::shared::types::{CategoryDTO, UnitDTO};

/// Built-in unit categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Category {
    Length,
    #[serde(alias = "weight")]
    Mass,
    Volume,
    Area,
    Speed,
    Time,
    DigitalStorage,
    Temperature,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Length,
        Category::Mass,
        Category::Volume,
        Category::Area,
        Category::Speed,
        Category::Time,
        Category::DigitalStorage,
        Category::Temperature,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Category::Length => "length",
            Category::Mass => "mass",
            Category::Volume => "volume",
            Category::Area => "area",
            Category::Speed => "speed",
            Category::Time => "time",
            Category::DigitalStorage => "digital_storage",
            Category::Temperature => "temperature",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Length => "Length",
            Category::Mass => "Weight",
            Category::Volume => "Volume",
            Category::Area => "Area",
            Category::Speed => "Speed",
            Category::Time => "Time",
            Category::DigitalStorage => "Digital Storage",
            Category::Temperature => "Temperature",
        }
    }

    /// Shared, immutable descriptor for this category
    pub fn descriptor(self) -> Arc<CategoryDescriptor> {
        let index = Category::ALL
            .iter()
            .position(|c| *c == self)
            .unwrap_or_default();
        Arc::clone(&BUILTIN_CATEGORIES[index])
    }

    /// Find the built-in category owning `unit` (exact symbol, then name)
    pub fn of_unit(unit: &str) -> Option<Category> {
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.descriptor().units().iter().any(|u| u.symbol == unit))
            .or_else(|| {
                Category::ALL
                    .iter()
                    .copied()
                    .find(|c| c.descriptor().resolve(unit).is_some())
            })
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Category {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace([' ', '-'], "_");
        if wanted == "weight" {
            return Ok(Category::Mass);
        }
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.key() == wanted || c.label().to_lowercase().replace(' ', "_") == wanted)
            .ok_or_else(|| ConversionError::UnknownCategory(s.to_string()))
    }
}

/// A unit's identity within its category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitDefinition {
    pub symbol: String,
    pub name: String,
}

impl UnitDefinition {
    pub fn new(symbol: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
        }
    }
}

/// Resolve `unit` against `units`: exact symbol first, then case-insensitive name.
/// Symbols stay case-sensitive so `b` (bit) and `B` (byte) never collide.
pub(crate) fn resolve_in<'a>(units: &'a [UnitDefinition], unit: &str) -> Option<&'a UnitDefinition> {
    let unit = unit.trim();
    units
        .iter()
        .find(|u| u.symbol == unit)
        .or_else(|| units.iter().find(|u| u.name.eq_ignore_ascii_case(unit)))
}

/// Ordered units of a linear category with their factors to the base unit
#[derive(Debug, Clone, PartialEq)]
pub struct UnitTable {
    category: String,
    units: Vec<UnitDefinition>,
    factors: Vec<f64>,
    base: usize,
}

impl UnitTable {
    /// Build a table from hand-supplied `(symbol, name, factor)` rows.
    ///
    /// Requires at least two units, finite positive factors, exactly one
    /// base unit (factor 1) and unique symbols.
    pub fn new<S: Into<String>>(
        category: impl Into<String>,
        rows: impl IntoIterator<Item = (S, S, f64)>,
    ) -> ConvertResult<Self> {
        let table = Self::from_rows(category, rows);
        let base_count = table.factors.iter().filter(|f| **f == 1.0).count();
        if base_count != 1 {
            return Err(ConversionError::InvalidTable(format!(
                "{} must have exactly one base unit with factor 1, found {}",
                table.category, base_count
            )));
        }
        table.validate()?;
        Ok(table)
    }

    /// Currency-style ratio table: each rate is "units of X per 1 base unit".
    /// The base is the first row, so rates pegged 1:1 to it are allowed.
    pub fn from_rates<S: Into<String>>(
        category: impl Into<String>,
        base: (S, S),
        rates: impl IntoIterator<Item = (S, S, f64)>,
    ) -> ConvertResult<Self> {
        let mut rows: Vec<(String, String, f64)> = vec![(base.0.into(), base.1.into(), 1.0)];
        for (symbol, name, rate) in rates {
            let symbol: String = symbol.into();
            if !(rate.is_finite() && rate > 0.0) {
                return Err(ConversionError::InvalidTable(format!(
                    "rate for {} must be a positive number, got {}",
                    symbol, rate
                )));
            }
            rows.push((symbol, name.into(), 1.0 / rate));
        }
        let mut table = Self::from_rows(category, rows);
        table.base = 0;
        table.validate()?;
        Ok(table)
    }

    fn from_rows<S: Into<String>>(
        category: impl Into<String>,
        rows: impl IntoIterator<Item = (S, S, f64)>,
    ) -> Self {
        let mut units = Vec::new();
        let mut factors = Vec::new();
        for (symbol, name, factor) in rows {
            units.push(UnitDefinition::new(symbol, name));
            factors.push(factor);
        }
        let base = factors.iter().position(|f| *f == 1.0).unwrap_or_default();
        Self {
            category: category.into(),
            units,
            factors,
            base,
        }
    }

    pub fn validate(&self) -> ConvertResult<()> {
        if self.units.len() < 2 {
            return Err(ConversionError::InvalidTable(format!(
                "{} needs at least two units",
                self.category
            )));
        }
        let mut seen = HashSet::new();
        for (unit, factor) in self.units.iter().zip(&self.factors) {
            if !(factor.is_finite() && *factor > 0.0) {
                return Err(ConversionError::InvalidTable(format!(
                    "factor for {} must be finite and positive, got {}",
                    unit.symbol, factor
                )));
            }
            if !seen.insert(unit.symbol.as_str()) {
                return Err(ConversionError::InvalidTable(format!(
                    "duplicate unit symbol {}",
                    unit.symbol
                )));
            }
        }
        if self.factors[self.base] != 1.0 {
            return Err(ConversionError::InvalidTable(format!(
                "{} base unit {} must have factor 1",
                self.category, self.units[self.base].symbol
            )));
        }
        Ok(())
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    fn index_of(&self, unit: &str) -> ConvertResult<usize> {
        let unit = unit.trim();
        self.units
            .iter()
            .position(|u| u.symbol == unit)
            .or_else(|| self.units.iter().position(|u| u.name.eq_ignore_ascii_case(unit)))
            .ok_or_else(|| ConversionError::unknown_unit(&self.category, unit))
    }

    pub fn factor_of(&self, unit: &str) -> ConvertResult<f64> {
        self.index_of(unit).map(|i| self.factors[i])
    }

    pub fn base_unit(&self) -> &UnitDefinition {
        &self.units[self.base]
    }
}

impl Converter for UnitTable {
    fn units(&self) -> &[UnitDefinition] {
        &self.units
    }

    fn is_linear(&self) -> bool {
        true
    }

    fn convert(&self, from: &str, to: &str, value: f64) -> ConvertResult<f64> {
        ensure_finite(value)?;
        let from_index = self.index_of(from)?;
        let to_index = self.index_of(to)?;
        if from_index == to_index {
            return Ok(value);
        }
        let result = value * self.factors[from_index] / self.factors[to_index];
        tracing::debug!(
            category = %self.category,
            from = %self.units[from_index].symbol,
            to = %self.units[to_index].symbol,
            value,
            result,
            "linear conversion"
        );
        Ok(result)
    }
}

/// A category as consumed by sessions: identity plus converter
#[derive(Debug, Clone)]
pub struct CategoryDescriptor {
    pub key: String,
    pub label: String,
    /// Whether negative quantities are meaningful (temperature only, for built-ins)
    pub allows_negative: bool,
    pub kind: ConversionKind,
}

impl CategoryDescriptor {
    pub fn linear(
        key: impl Into<String>,
        label: impl Into<String>,
        table: UnitTable,
        allows_negative: bool,
    ) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            allows_negative,
            kind: ConversionKind::Linear(table),
        }
    }

    pub fn units(&self) -> &[UnitDefinition] {
        self.kind.units()
    }

    pub fn resolve(&self, unit: &str) -> Option<&UnitDefinition> {
        self.kind.resolve(unit)
    }

    pub fn is_linear(&self) -> bool {
        self.kind.is_linear()
    }

    /// The first two declared units, used as session defaults
    pub fn default_pair(&self) -> (&UnitDefinition, &UnitDefinition) {
        let units = self.units();
        (&units[0], &units[1 % units.len()])
    }

    pub fn convert(&self, from: &str, to: &str, value: f64) -> ConvertResult<f64> {
        self.kind.convert(from, to, value)
    }

    /// Physical domain check for a quantity expressed in `from`: finite, not
    /// negative unless the category allows it, not below absolute zero
    pub fn validate_quantity(&self, from: &str, value: f64) -> ConvertResult<()> {
        ensure_finite(value)?;
        if value < 0.0 && !self.allows_negative {
            return Err(ConversionError::InvalidInput(format!(
                "{} for {}",
                ERR_NEGATIVE_QUANTITY, self.label
            )));
        }
        if let ConversionKind::Temperature(_) = self.kind {
            let below = TemperatureUnit::from_id(from)
                .is_some_and(|unit| unit.is_below_absolute_zero(value));
            if below {
                return Err(ConversionError::InvalidInput(ERR_BELOW_ABSOLUTE_ZERO.to_string()));
            }
        }
        Ok(())
    }

    pub fn unit_dtos(&self) -> Vec<UnitDTO> {
        self.units()
            .iter()
            .map(|u| UnitDTO {
                id: u.symbol.clone(),
                label: u.name.clone(),
                category: self.key.clone(),
            })
            .collect()
    }

    pub fn to_dto(&self) -> CategoryDTO {
        CategoryDTO {
            key: self.key.clone(),
            label: self.label.clone(),
            linear: self.is_linear(),
            units: self.unit_dtos(),
        }
    }
}

fn builtin(category: Category, rows: &[(&str, &str, f64)]) -> Arc<CategoryDescriptor> {
    let table = UnitTable::from_rows(category.key(), rows.iter().copied());
    Arc::new(CategoryDescriptor::linear(
        category.key(),
        category.label(),
        table,
        false,
    ))
}

// Length (base: meters)
const LENGTH: &[(&str, &str, f64)] = &[
    ("m", "Meters", 1.0),
    ("ft", "Feet", 0.3048),
    ("cm", "Centimeters", 0.01),
    ("mm", "Millimeters", 0.001),
    ("km", "Kilometers", 1000.0),
    ("in", "Inches", 0.0254),
    ("yd", "Yards", 0.9144),
    ("mi", "Miles", 1609.344),
    ("nmi", "Nautical Miles", 1852.0),
];

// Mass (base: grams)
const MASS: &[(&str, &str, f64)] = &[
    ("kg", "Kilograms", 1000.0),
    ("lb", "Pounds", 453.59237),
    ("g", "Grams", 1.0),
    ("mg", "Milligrams", 0.001),
    ("oz", "Ounces", 28.349523125),
    ("t", "Metric Tons", 1_000_000.0),
    ("st", "Stones", 6350.29318),
];

// Volume (base: liters, US customary units)
const VOLUME: &[(&str, &str, f64)] = &[
    ("L", "Liters", 1.0),
    ("gal", "Gallons", 3.785411784),
    ("ml", "Milliliters", 0.001),
    ("m3", "Cubic Meters", 1000.0),
    ("fl-oz", "Fluid Ounces", 0.0295735295625),
    ("cup", "Cups", 0.2365882365),
    ("pint", "Pints", 0.473176473),
    ("quart", "Quarts", 0.946352946),
    ("tbsp", "Tablespoons", 0.01478676478125),
    ("tsp", "Teaspoons", 0.00492892159375),
];

// Area (base: square meters)
const AREA: &[(&str, &str, f64)] = &[
    ("m2", "Square Meters", 1.0),
    ("ft2", "Square Feet", 0.09290304),
    ("cm2", "Square Centimeters", 0.0001),
    ("km2", "Square Kilometers", 1_000_000.0),
    ("in2", "Square Inches", 0.00064516),
    ("yd2", "Square Yards", 0.83612736),
    ("mi2", "Square Miles", 2_589_988.110336),
    ("ac", "Acres", 4046.8564224),
    ("ha", "Hectares", 10_000.0),
];

// Speed (base: meters/second)
const SPEED: &[(&str, &str, f64)] = &[
    ("km/h", "Kilometers/Hour", 1.0 / 3.6),
    ("mph", "Miles/Hour", 0.44704),
    ("m/s", "Meters/Second", 1.0),
    ("kn", "Knots", 1852.0 / 3600.0),
    ("ft/s", "Feet/Second", 0.3048),
];

// Time (base: seconds, Julian year)
const TIME: &[(&str, &str, f64)] = &[
    ("s", "Seconds", 1.0),
    ("min", "Minutes", 60.0),
    ("ms", "Milliseconds", 0.001),
    ("h", "Hours", 3600.0),
    ("d", "Days", 86_400.0),
    ("wk", "Weeks", 604_800.0),
    ("yr", "Years", 31_557_600.0),
];

// Digital storage (base: bytes; SI prefixes decimal, IEC prefixes binary)
const DIGITAL_STORAGE: &[(&str, &str, f64)] = &[
    ("B", "Bytes", 1.0),
    ("KB", "Kilobytes", 1e3),
    ("b", "Bits", 0.125),
    ("MB", "Megabytes", 1e6),
    ("GB", "Gigabytes", 1e9),
    ("TB", "Terabytes", 1e12),
    ("KiB", "Kibibytes", 1024.0),
    ("MiB", "Mebibytes", 1_048_576.0),
    ("GiB", "Gibibytes", 1_073_741_824.0),
    ("TiB", "Tebibytes", 1_099_511_627_776.0),
];

/// Process-wide category registry, indexed in `Category::ALL` order
static BUILTIN_CATEGORIES: Lazy<Vec<Arc<CategoryDescriptor>>> = Lazy::new(|| {
    tracing::debug!("building built-in unit registry");
    Category::ALL
        .iter()
        .map(|category| match category {
            Category::Length => builtin(*category, LENGTH),
            Category::Mass => builtin(*category, MASS),
            Category::Volume => builtin(*category, VOLUME),
            Category::Area => builtin(*category, AREA),
            Category::Speed => builtin(*category, SPEED),
            Category::Time => builtin(*category, TIME),
            Category::DigitalStorage => builtin(*category, DIGITAL_STORAGE),
            Category::Temperature => Arc::new(CategoryDescriptor {
                key: category.key().to_string(),
                label: category.label().to_string(),
                allows_negative: true,
                kind: ConversionKind::Temperature(TemperatureScale::new()),
            }),
        })
        .collect()
});
