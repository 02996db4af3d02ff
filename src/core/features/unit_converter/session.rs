//! Conversion session
//!
//! Ties one category, a from/to unit pair, the current value and a bounded
//! history together. State moves `Idle -> Computed` on a successful
//! conversion, stays `Computed` across swaps and unit changes, and returns to
//! `Idle` on a category change. Rejected input switches the display to
//! `InvalidInput` without touching the last result or the history.

use std::sync::Arc;

use serde::Serialize;

use super::format::NumberFormat;
use super::parsing::parse_number;
use super::registry::{Category, CategoryDescriptor, UnitDefinition};
use crate::core::history::{ConversionHistory, DEFAULT_HISTORY_LIMIT};
use crate::shared::errors::{ConversionError, ConvertResult, ERR_EMPTY_INPUT, ERR_NOT_A_NUMBER};
use crate::shared::settings::ConverterSettings;
use crate::shared::types::HistoryEntry;

/// Text shown while the session holds rejected input
pub const INVALID_INPUT_DISPLAY: &str = "Invalid input";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionState {
    Idle,
    Computed,
    InvalidInput,
}

/// Output of one successful conversion; never mutated after creation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionResult {
    pub input: f64,
    pub output: f64,
    pub formatted: String,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConvertOutcome {
    Converted(ConversionResult),
    /// Input rejected; carries the reason
    InvalidInput(String),
}

impl ConvertOutcome {
    pub fn result(&self) -> Option<&ConversionResult> {
        match self {
            ConvertOutcome::Converted(result) => Some(result),
            ConvertOutcome::InvalidInput(_) => None,
        }
    }
}

#[derive(Debug)]
pub struct ConversionSession {
    descriptor: Arc<CategoryDescriptor>,
    from: UnitDefinition,
    to: UnitDefinition,
    input: Option<f64>,
    last_result: Option<ConversionResult>,
    state: SessionState,
    history: ConversionHistory,
    format: NumberFormat,
}

impl ConversionSession {
    pub fn new(category: Category) -> Self {
        Self::build(category.descriptor(), NumberFormat::default(), DEFAULT_HISTORY_LIMIT)
    }

    pub fn with_settings(category: Category, settings: &ConverterSettings) -> Self {
        Self::build(
            category.descriptor(),
            settings.number_format(),
            settings.preferences.history_limit,
        )
    }

    /// Session over a caller-supplied category, e.g. a rate table
    pub fn with_descriptor(descriptor: Arc<CategoryDescriptor>) -> Self {
        Self::build(descriptor, NumberFormat::default(), DEFAULT_HISTORY_LIMIT)
    }

    fn build(descriptor: Arc<CategoryDescriptor>, format: NumberFormat, history_limit: usize) -> Self {
        let (from, to) = default_units(&descriptor);
        Self {
            descriptor,
            from,
            to,
            input: None,
            last_result: None,
            state: SessionState::Idle,
            history: ConversionHistory::new(history_limit),
            format,
        }
    }

    /// Switch category; units reset to its first two, value and result clear.
    /// History is kept.
    pub fn set_category(&mut self, category: Category) {
        self.set_descriptor(category.descriptor());
    }

    pub fn set_descriptor(&mut self, descriptor: Arc<CategoryDescriptor>) {
        tracing::info!(from = %self.descriptor.key, to = %descriptor.key, "switching category");
        let (from, to) = default_units(&descriptor);
        self.descriptor = descriptor;
        self.from = from;
        self.to = to;
        self.input = None;
        self.last_result = None;
        self.state = SessionState::Idle;
    }

    pub fn set_from_unit(&mut self, unit: &str) -> ConvertResult<()> {
        self.from = self.lookup(unit)?;
        self.rerun()
    }

    pub fn set_to_unit(&mut self, unit: &str) -> ConvertResult<()> {
        self.to = self.lookup(unit)?;
        self.rerun()
    }

    /// Convert `value` with the current unit pair and record it in history.
    ///
    /// Rejected values come back as `ConvertOutcome::InvalidInput`; `Err` only
    /// signals a unit the category does not know.
    pub fn convert_now(&mut self, value: f64) -> ConvertResult<ConvertOutcome> {
        let checked = self
            .descriptor
            .validate_quantity(&self.from.symbol, value)
            .and_then(|_| self.descriptor.convert(&self.from.symbol, &self.to.symbol, value));
        let output = match checked {
            Ok(output) => output,
            Err(err) if err.is_recoverable() => return Ok(self.reject(err.to_string())),
            Err(err) => return Err(err),
        };

        let formatted = self.format.format(output);
        let line = format!(
            "{} {} = {} {}",
            self.format.format(value),
            self.from.name,
            formatted,
            self.to.name
        );
        self.history.push(HistoryEntry::new(
            line,
            self.from.symbol.as_str(),
            self.to.symbol.as_str(),
            value,
            output,
        ));

        let result = ConversionResult {
            input: value,
            output,
            formatted,
            from: self.from.symbol.clone(),
            to: self.to.symbol.clone(),
        };
        self.input = Some(value);
        self.last_result = Some(result.clone());
        self.state = SessionState::Computed;
        Ok(ConvertOutcome::Converted(result))
    }

    /// Parse a raw form field and convert it
    pub fn convert_input(&mut self, text: &str) -> ConvertResult<ConvertOutcome> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(self.reject(ERR_EMPTY_INPUT.to_string()));
        }
        match parse_number(text) {
            Some(value) => self.convert_now(value),
            None => Ok(self.reject(format!("{}: {}", ERR_NOT_A_NUMBER, text))),
        }
    }

    /// Exchange from/to; an existing result becomes the new input and the
    /// conversion runs again
    pub fn swap(&mut self) -> ConvertResult<()> {
        std::mem::swap(&mut self.from, &mut self.to);
        match self.last_result.as_ref().map(|r| r.output) {
            Some(previous_output) => self.convert_now(previous_output).map(|_| ()),
            None => Ok(()),
        }
    }

    pub fn category_key(&self) -> &str {
        &self.descriptor.key
    }

    pub fn descriptor(&self) -> &CategoryDescriptor {
        &self.descriptor
    }

    pub fn from_unit(&self) -> &UnitDefinition {
        &self.from
    }

    pub fn to_unit(&self) -> &UnitDefinition {
        &self.to
    }

    pub fn input(&self) -> Option<f64> {
        self.input
    }

    pub fn last_result(&self) -> Option<&ConversionResult> {
        self.last_result.as_ref()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// What a result field would show right now
    pub fn display(&self) -> String {
        match self.state {
            SessionState::Idle => String::new(),
            SessionState::InvalidInput => INVALID_INPUT_DISPLAY.to_string(),
            SessionState::Computed => self
                .last_result
                .as_ref()
                .map(|r| r.formatted.clone())
                .unwrap_or_default(),
        }
    }

    /// History lines, most recent first
    pub fn history(&self) -> Vec<String> {
        self.history.lines()
    }

    pub fn history_entries(&self) -> Vec<HistoryEntry> {
        self.history.entries()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn units(&self) -> &[UnitDefinition] {
        self.descriptor.units()
    }

    fn lookup(&self, unit: &str) -> ConvertResult<UnitDefinition> {
        self.descriptor
            .resolve(unit)
            .cloned()
            .ok_or_else(|| ConversionError::unknown_unit(self.descriptor.key.as_str(), unit))
    }

    fn rerun(&mut self) -> ConvertResult<()> {
        match self.input {
            Some(value) => self.convert_now(value).map(|_| ()),
            None => Ok(()),
        }
    }

    fn reject(&mut self, reason: String) -> ConvertOutcome {
        tracing::warn!(category = %self.descriptor.key, %reason, "rejected input");
        self.state = SessionState::InvalidInput;
        ConvertOutcome::InvalidInput(reason)
    }
}

fn default_units(descriptor: &CategoryDescriptor) -> (UnitDefinition, UnitDefinition) {
    let (from, to) = descriptor.default_pair();
    (from.clone(), to.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::features::unit_converter::format::NumberLocale;
    use crate::core::features::unit_converter::registry::UnitTable;

    fn converted(outcome: ConvertOutcome) -> ConversionResult {
        match outcome {
            ConvertOutcome::Converted(result) => result,
            ConvertOutcome::InvalidInput(reason) => panic!("unexpected invalid input: {}", reason),
        }
    }

    #[test]
    fn test_new_session_is_idle_with_default_units() {
        let session = ConversionSession::new(Category::Length);
        assert_eq!(session.category_key(), "length");
        assert_eq!(session.from_unit().symbol, "m");
        assert_eq!(session.to_unit().symbol, "ft");
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.display(), "");
        assert!(session.history().is_empty());
    }

    #[test]
    fn test_convert_now_records_history() {
        let mut session = ConversionSession::new(Category::Length);
        let result = converted(session.convert_now(1.0).unwrap());

        assert!((result.output - 3.28084).abs() < 1e-5);
        assert_eq!(result.formatted, "3.28084");
        assert_eq!(session.state(), SessionState::Computed);
        assert_eq!(session.display(), "3.28084");
        assert_eq!(session.history(), vec!["1 Meters = 3.28084 Feet".to_string()]);
        assert_eq!(session.input(), Some(1.0));
    }

    #[test]
    fn test_history_bound() {
        let mut session = ConversionSession::new(Category::Length);
        for i in 1..=11 {
            converted(session.convert_now(i as f64).unwrap());
        }
        let history = session.history();
        assert_eq!(history.len(), 10);
        assert!(history[0].starts_with("11 Meters"));
        assert!(history[9].starts_with("2 Meters"));
    }

    #[test]
    fn test_invalid_input_leaves_state_intact() {
        let mut session = ConversionSession::new(Category::Length);
        converted(session.convert_now(2.0).unwrap());
        let history = session.history();
        let last = session.last_result().cloned();

        for outcome in [
            session.convert_now(f64::NAN).unwrap(),
            session.convert_now(f64::INFINITY).unwrap(),
            session.convert_input("abc").unwrap(),
            session.convert_input("   ").unwrap(),
        ] {
            assert!(matches!(outcome, ConvertOutcome::InvalidInput(_)));
        }

        assert_eq!(session.history(), history);
        assert_eq!(session.last_result().cloned(), last);
        assert_eq!(session.state(), SessionState::InvalidInput);
        assert_eq!(session.display(), INVALID_INPUT_DISPLAY);

        // Recovers on the next valid value
        converted(session.convert_input("3").unwrap());
        assert_eq!(session.state(), SessionState::Computed);
    }

    #[test]
    fn test_negative_values() {
        let mut length = ConversionSession::new(Category::Length);
        assert!(matches!(
            length.convert_now(-1.0).unwrap(),
            ConvertOutcome::InvalidInput(_)
        ));
        assert!(length.history().is_empty());

        let mut temperature = ConversionSession::new(Category::Temperature);
        let result = converted(temperature.convert_now(-40.0).unwrap());
        assert_eq!(result.output, -40.0);
        assert_eq!(temperature.history(), vec!["-40 Celsius = -40 Fahrenheit".to_string()]);
    }

    #[test]
    fn test_below_absolute_zero_rejected() {
        let mut session = ConversionSession::new(Category::Temperature);
        assert!(matches!(
            session.convert_now(-300.0).unwrap(),
            ConvertOutcome::InvalidInput(_)
        ));
        session.set_from_unit("K").unwrap();
        assert!(matches!(
            session.convert_now(-1.0).unwrap(),
            ConvertOutcome::InvalidInput(_)
        ));
        converted(session.convert_now(0.0).unwrap());
    }

    #[test]
    fn test_swap_pairing() {
        let mut session = ConversionSession::new(Category::Mass);
        session.swap().unwrap();
        assert_eq!(session.from_unit().symbol, "lb");
        assert_eq!(session.to_unit().symbol, "kg");
        session.swap().unwrap();
        assert_eq!(session.from_unit().symbol, "kg");
        assert_eq!(session.to_unit().symbol, "lb");
        assert!(session.history().is_empty());
    }

    #[test]
    fn test_swap_feeds_previous_output() {
        let mut session = ConversionSession::new(Category::Length);
        converted(session.convert_now(1.0).unwrap());
        session.swap().unwrap();

        assert_eq!(session.from_unit().symbol, "ft");
        assert_eq!(session.to_unit().symbol, "m");
        let result = session.last_result().unwrap();
        assert!((result.output - 1.0).abs() < 1e-9);
        assert_eq!(session.history()[0], "3.28084 Feet = 1 Meters");

        session.swap().unwrap();
        assert_eq!(session.from_unit().symbol, "m");
        assert_eq!(session.to_unit().symbol, "ft");
        assert_eq!(session.history().len(), 3);
    }

    #[test]
    fn test_set_category_keeps_history() {
        let mut session = ConversionSession::new(Category::Length);
        converted(session.convert_now(5.0).unwrap());
        session.set_category(Category::Temperature);

        assert_eq!(session.category_key(), "temperature");
        assert_eq!(session.from_unit().symbol, "C");
        assert_eq!(session.to_unit().symbol, "F");
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.input(), None);
        assert!(session.last_result().is_none());
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn test_unit_change_reruns_conversion() {
        let mut session = ConversionSession::new(Category::Length);
        converted(session.convert_now(1500.0).unwrap());
        session.set_to_unit("Kilometers").unwrap();

        assert_eq!(session.to_unit().symbol, "km");
        assert_eq!(session.display(), "1.5");
        assert_eq!(session.history().len(), 2);

        assert_eq!(
            session.set_from_unit("parsec"),
            Err(ConversionError::unknown_unit("length", "parsec"))
        );
        assert_eq!(session.from_unit().symbol, "m");
    }

    #[test]
    fn test_with_settings() {
        let mut settings = ConverterSettings::default();
        settings.preferences.history_limit = 3;
        settings.display.locale = NumberLocale::DeDe;
        settings.display.max_fraction_digits = 2;

        let mut session = ConversionSession::with_settings(Category::Length, &settings);
        session.set_to_unit("mm").unwrap();
        let result = converted(session.convert_now(1234.5).unwrap());
        assert_eq!(result.formatted, "1.234.500");

        for i in 0..5 {
            converted(session.convert_now(i as f64).unwrap());
        }
        assert_eq!(session.history().len(), 3);
    }

    #[test]
    fn test_domain_errors_become_invalid_input() {
        use crate::shared::errors::{ERR_BELOW_ABSOLUTE_ZERO, ERR_NEGATIVE_QUANTITY};

        let mut mass = ConversionSession::new(Category::Mass);
        match mass.convert_now(-5.0).unwrap() {
            ConvertOutcome::InvalidInput(reason) => assert!(reason.contains(ERR_NEGATIVE_QUANTITY)),
            other => panic!("expected invalid input, got {:?}", other),
        }
        assert!(mass.history().is_empty());

        let mut temperature = ConversionSession::new(Category::Temperature);
        temperature.set_from_unit("K").unwrap();
        match temperature.convert_now(-10.0).unwrap() {
            ConvertOutcome::InvalidInput(reason) => assert!(reason.contains(ERR_BELOW_ABSOLUTE_ZERO)),
            other => panic!("expected invalid input, got {:?}", other),
        }
        assert_eq!(temperature.state(), SessionState::InvalidInput);
    }

    #[test]
    fn test_custom_descriptor() {
        let table = UnitTable::from_rates(
            "currency",
            ("USD", "US Dollar"),
            vec![("EUR", "Euro", 0.5)],
        )
        .unwrap();
        let descriptor = Arc::new(CategoryDescriptor::linear("currency", "Currency", table, false));
        let mut session = ConversionSession::with_descriptor(descriptor);

        let result = converted(session.convert_now(10.0).unwrap());
        assert_eq!(result.output, 5.0);
        assert_eq!(session.history(), vec!["10 US Dollar = 5 Euro".to_string()]);
    }
}
