//! Free-text quantity parsing
//!
//! Extracts an amount and a unit from text such as "12 km", "3.5 meters",
//! "km 12", "100°F" or "2 km to miles" and resolves the unit against the
//! built-in registry.

use once_cell::sync::Lazy;
use regex::Regex;

use super::registry::Category;
use super::temperature::TemperatureUnit;
use crate::shared::errors::{ConversionError, ConvertResult, ERR_EMPTY_INPUT};

const ERR_CANNOT_PARSE_UNIT: &str = "Could not parse unit from text";

/// Amount plus canonical unit symbol
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedQuantity {
    pub amount: f64,
    pub unit: String,
    pub category: Category,
}

/// "{quantity} to {target}"
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionQuery {
    pub quantity: ParsedQuantity,
    pub target: Option<String>,
}

// Spelled-out names, plurals and common abbreviations (lowercase) -> symbol
const UNIT_ALIASES: &[(&str, &str)] = &[
    // Length
    ("meter", "m"), ("metre", "m"), ("metres", "m"),
    ("millimeter", "mm"), ("millimetre", "mm"), ("millimetres", "mm"),
    ("centimeter", "cm"), ("centimetre", "cm"), ("centimetres", "cm"),
    ("kilometer", "km"), ("kilometre", "km"), ("kilometres", "km"),
    ("inch", "in"), ("inches", "in"), ("\"", "in"),
    ("foot", "ft"), ("feet", "ft"), ("'", "ft"),
    ("yard", "yd"), ("yards", "yd"),
    ("mile", "mi"), ("miles", "mi"),
    ("nautical mile", "nmi"), ("nautical miles", "nmi"),
    // Mass
    ("gram", "g"), ("grams", "g"),
    ("kilogram", "kg"), ("kilo", "kg"), ("kilos", "kg"),
    ("milligram", "mg"),
    ("pound", "lb"), ("pounds", "lb"), ("lbs", "lb"),
    ("ounce", "oz"), ("ounces", "oz"),
    ("tonne", "t"), ("tonnes", "t"), ("metric ton", "t"),
    ("stone", "st"),
    // Volume
    ("l", "L"), ("liter", "L"), ("litre", "L"), ("litres", "L"),
    ("milliliter", "ml"), ("millilitre", "ml"), ("millilitres", "ml"), ("ml", "ml"),
    ("m³", "m3"), ("cubic meter", "m3"), ("cubic metre", "m3"),
    ("floz", "fl-oz"), ("fl oz", "fl-oz"), ("fluid ounce", "fl-oz"), ("fluid ounces", "fl-oz"),
    ("gallon", "gal"), ("gallons", "gal"),
    ("cups", "cup"), ("pints", "pint"), ("quarts", "quart"),
    ("tablespoon", "tbsp"), ("tablespoons", "tbsp"),
    ("teaspoon", "tsp"), ("teaspoons", "tsp"),
    // Area
    ("m²", "m2"), ("sq m", "m2"), ("square meter", "m2"), ("square metre", "m2"),
    ("ft²", "ft2"), ("sq ft", "ft2"), ("square foot", "ft2"), ("square feet", "ft2"),
    ("cm²", "cm2"), ("sq cm", "cm2"),
    ("km²", "km2"), ("sq km", "km2"), ("square kilometer", "km2"),
    ("in²", "in2"), ("sq in", "in2"), ("square inch", "in2"),
    ("yd²", "yd2"), ("sq yd", "yd2"), ("square yard", "yd2"),
    ("mi²", "mi2"), ("sq mi", "mi2"), ("square mile", "mi2"),
    ("acre", "ac"), ("acres", "ac"),
    ("hectare", "ha"), ("hectares", "ha"),
    // Speed
    ("kmh", "km/h"), ("kph", "km/h"), ("km/hr", "km/h"), ("kilometers per hour", "km/h"),
    ("mi/h", "mph"), ("miles per hour", "mph"),
    ("mps", "m/s"), ("meters per second", "m/s"),
    ("knot", "kn"), ("knots", "kn"), ("kt", "kn"),
    ("fps", "ft/s"), ("feet per second", "ft/s"),
    // Time
    ("sec", "s"), ("secs", "s"), ("second", "s"), ("seconds", "s"),
    ("minute", "min"), ("minutes", "min"), ("mins", "min"),
    ("millisecond", "ms"), ("milliseconds", "ms"),
    ("hr", "h"), ("hrs", "h"), ("hour", "h"), ("hours", "h"),
    ("day", "d"), ("days", "d"),
    ("week", "wk"), ("weeks", "wk"),
    ("year", "yr"), ("years", "yr"), ("yrs", "yr"),
    // Digital storage
    ("byte", "B"), ("bytes", "B"), ("bit", "b"), ("bits", "b"),
    ("kb", "KB"), ("mb", "MB"), ("gb", "GB"), ("tb", "TB"),
    ("kib", "KiB"), ("mib", "MiB"), ("gib", "GiB"), ("tib", "TiB"),
];

// Compile regex patterns once at module level (compile-time constants)
static RE_QUERY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(.+?)\s+(?:to|into|as|->|=)\s+(\S.*?)\s*$")
        .expect("Failed to compile query pattern")
});

static RE_NUMBER_FIRST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([+-]?(?:\d[\d.,]*|\.\d+)(?:[eE][+-]?\d+)?)\s*(\S.*?)\s*$")
        .expect("Failed to compile number-first pattern")
});

static RE_UNIT_FIRST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([^\d\s+\-.,][^\d]*?)\s*([+-]?(?:\d[\d.,]*|\.\d+)(?:[eE][+-]?\d+)?)\s*$")
        .expect("Failed to compile unit-first pattern")
});

static RE_GROUPED_THOUSANDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?\d{1,3}(?:,\d{3})+$").expect("Failed to compile grouping pattern")
});

/// Parse a numeric literal, accepting "1,000" grouping and "1,5" decimal commas
pub fn parse_number(text: &str) -> Option<f64> {
    let text = text.trim();
    let normalized = if text.contains('.') && text.contains(',') {
        text.replace(',', "")
    } else if RE_GROUPED_THOUSANDS.is_match(text) {
        text.replace(',', "")
    } else {
        text.replace(',', ".")
    };
    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Resolve a unit spelling to its category and canonical symbol
pub fn resolve_unit(text: &str) -> Option<(Category, String)> {
    let raw = text.trim().trim_end_matches('.');
    if raw.is_empty() {
        return None;
    }

    // Exact symbol
    for category in Category::ALL {
        if let Some(unit) = category.descriptor().units().iter().find(|u| u.symbol == raw) {
            return Some((category, unit.symbol.clone()));
        }
    }

    let lower = raw.to_lowercase();
    if let Some((_, symbol)) = UNIT_ALIASES.iter().find(|(alias, _)| *alias == lower) {
        return Category::of_unit(symbol).map(|c| (c, symbol.to_string()));
    }

    // Display names, singular or plural
    let plural = format!("{}s", lower);
    for category in Category::ALL {
        let descriptor = category.descriptor();
        if let Some(unit) = descriptor.resolve(&lower).or_else(|| descriptor.resolve(&plural)) {
            return Some((category, unit.symbol.clone()));
        }
    }

    TemperatureUnit::from_id(raw).map(|t| (Category::Temperature, t.symbol().to_string()))
}

fn cannot_parse(text: &str) -> ConversionError {
    ConversionError::InvalidInput(format!("{}: {}", ERR_CANNOT_PARSE_UNIT, text))
}

/// Parse "amount unit" or "unit amount"
pub fn parse_quantity(text: &str) -> ConvertResult<ParsedQuantity> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ConversionError::InvalidInput(ERR_EMPTY_INPUT.to_string()));
    }

    // Pattern 1: number followed by unit ("12km", "12 km", "12 kilometers")
    // Pattern 2: unit followed by number ("km 12")
    let candidates = [
        RE_NUMBER_FIRST.captures(trimmed).map(|c| (c[1].to_string(), c[2].to_string())),
        RE_UNIT_FIRST.captures(trimmed).map(|c| (c[2].to_string(), c[1].to_string())),
    ];

    for (number, unit) in candidates.into_iter().flatten() {
        if let (Some(amount), Some((category, symbol))) = (parse_number(&number), resolve_unit(&unit)) {
            tracing::debug!(amount, unit = %symbol, %category, input = trimmed, "parsed quantity");
            return Ok(ParsedQuantity {
                amount,
                unit: symbol,
                category,
            });
        }
    }

    tracing::debug!(input = trimmed, "failed to parse quantity");
    Err(cannot_parse(trimmed))
}

/// Parse a quantity with an optional target unit ("2 km to miles")
pub fn parse_query(text: &str) -> ConvertResult<ConversionQuery> {
    let Some(caps) = RE_QUERY.captures(text) else {
        return Ok(ConversionQuery {
            quantity: parse_quantity(text)?,
            target: None,
        });
    };

    let quantity = parse_quantity(&caps[1])?;
    let target_text = caps[2].trim();

    // Prefer the quantity's own category so short symbols resolve in context
    let descriptor = quantity.category.descriptor();
    let target = match descriptor.resolve(target_text) {
        Some(unit) => unit.symbol.clone(),
        None => match resolve_unit(target_text) {
            Some((category, symbol)) if category == quantity.category => symbol,
            Some((_, symbol)) => {
                return Err(ConversionError::CategoryMismatch {
                    from: quantity.unit,
                    to: symbol,
                })
            }
            None => return Err(cannot_parse(text.trim())),
        },
    };

    Ok(ConversionQuery {
        quantity,
        target: Some(target),
    })
}
