//! Result formatting
//!
//! Rounds to a fixed number of fraction digits, strips trailing zeros and
//! groups the integer part by thousands according to the configured locale.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

pub const DEFAULT_MAX_FRACTION_DIGITS: u8 = 6;
pub const MAX_FRACTION_DIGITS_LIMIT: u8 = 12;

/// Grouping and decimal separators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum NumberLocale {
    #[default]
    #[serde(rename = "en-US")]
    EnUs,
    #[serde(rename = "de-DE")]
    DeDe,
    #[serde(rename = "fr-FR")]
    FrFr,
    #[serde(rename = "plain")]
    Plain,
}

impl NumberLocale {
    fn group_separator(self) -> Option<char> {
        match self {
            NumberLocale::EnUs => Some(','),
            NumberLocale::DeDe => Some('.'),
            NumberLocale::FrFr => Some('\u{202f}'),
            NumberLocale::Plain => None,
        }
    }

    fn decimal_separator(self) -> char {
        match self {
            NumberLocale::EnUs | NumberLocale::Plain => '.',
            NumberLocale::DeDe | NumberLocale::FrFr => ',',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberFormat {
    pub locale: NumberLocale,
    pub max_fraction_digits: u8,
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self {
            locale: NumberLocale::EnUs,
            max_fraction_digits: DEFAULT_MAX_FRACTION_DIGITS,
        }
    }
}

impl NumberFormat {
    pub fn new(locale: NumberLocale, max_fraction_digits: u8) -> Self {
        Self {
            locale,
            max_fraction_digits: max_fraction_digits.min(MAX_FRACTION_DIGITS_LIMIT),
        }
    }

    // Examples (en-US): 130000.000 -> "130,000", 12.500 -> "12.5", 3.280839895 -> "3.28084"
    pub fn format(&self, value: f64) -> String {
        if value.is_nan() {
            return "NaN".to_string();
        }
        if value.is_infinite() {
            return if value.is_sign_positive() { "∞".to_string() } else { "-∞".to_string() };
        }

        let digits = usize::from(self.max_fraction_digits);
        let fixed = format!("{:.*}", digits, value.abs());
        let (integer, fraction) = match fixed.split_once('.') {
            Some((integer, fraction)) => (integer, fraction.trim_end_matches('0')),
            None => (fixed.as_str(), ""),
        };

        // Never render "-0" for values that round away
        let is_zero = integer.bytes().all(|b| b == b'0') && fraction.is_empty();
        let negative = value.is_sign_negative() && !is_zero;

        let mut out = String::with_capacity(fixed.len() + integer.len() / 3 + 1);
        if negative {
            out.push('-');
        }
        out.push_str(&add_thousands_separators(integer, self.locale.group_separator()));
        if !fraction.is_empty() {
            out.push(self.locale.decimal_separator());
            out.push_str(fraction);
        }
        out
    }
}

// Helper to add thousands separators to a string of ASCII digits
fn add_thousands_separators(digits: &str, separator: Option<char>) -> String {
    let Some(separator) = separator else {
        return digits.to_string();
    };
    let len = digits.len();
    let mut result = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            result.push(separator);
        }
        result.push(ch);
    }
    result
}

/// Format with the default en-US, 6 fraction digit settings
pub fn format_number(value: f64) -> String {
    NumberFormat::default().format(value)
}
