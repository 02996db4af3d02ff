use serde::{Deserialize, Serialize};
use ts_rs::TS;
use tokio::fs;
use std::path::{Path, PathBuf};
use directories::ProjectDirs;

use crate::core::features::unit_converter::format::{
    NumberFormat, NumberLocale, DEFAULT_MAX_FRACTION_DIGITS, MAX_FRACTION_DIGITS_LIMIT,
};
use crate::core::features::unit_converter::registry::Category;
use crate::core::history::DEFAULT_HISTORY_LIMIT;
use crate::shared::error::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ConverterSettings {
    pub preferences: ConverterPreferences,
    pub display: DisplaySettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ConverterPreferences {
    pub default_category: Category,
    pub history_limit: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DisplaySettings {
    pub locale: NumberLocale,
    pub max_fraction_digits: u8,
}

impl Default for ConverterSettings {
    fn default() -> Self {
        Self {
            preferences: ConverterPreferences {
                default_category: Category::Length,
                history_limit: DEFAULT_HISTORY_LIMIT,
            },
            display: DisplaySettings {
                locale: NumberLocale::EnUs,
                max_fraction_digits: DEFAULT_MAX_FRACTION_DIGITS,
            },
        }
    }
}

impl ConverterSettings {
    pub fn get_settings_path() -> AppResult<PathBuf> {
        ProjectDirs::from("com", "antigravity", "unit-converter")
            .map(|dirs| dirs.config_dir().join("settings.json"))
            .ok_or_else(|| AppError::Settings("Failed to determine config directory".to_string()))
    }

    /// Load from the platform config directory, writing defaults on first run
    pub async fn load() -> AppResult<Self> {
        let path = Self::get_settings_path()?;

        if !path.exists() {
            let settings = Self::default();
            settings.save_to(&path).await?;
            tracing::info!(path = %path.display(), "created default settings");
            return Ok(settings);
        }

        Self::load_from(&path).await
    }

    pub async fn load_from(path: &Path) -> AppResult<Self> {
        let content = fs::read_to_string(path).await
            .map_err(|e| AppError::Settings(format!("Failed to read settings file: {}", e)))?;

        let settings: Self = serde_json::from_str(&content)
            .map_err(|e| AppError::Settings(format!("Failed to parse settings: {}", e)))?;
        settings.validate()?;

        tracing::info!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    pub async fn save(&self) -> AppResult<()> {
        let path = Self::get_settings_path()?;
        self.save_to(&path).await
    }

    pub async fn save_to(&self, path: &Path) -> AppResult<()> {
        self.validate()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await
                .map_err(|e| AppError::Settings(format!("Failed to create config directory: {}", e)))?;
        }

        let content = serde_json::to_string_pretty(self)?;

        fs::write(path, content).await
            .map_err(|e| AppError::Settings(format!("Failed to write settings file: {}", e)))?;

        tracing::info!(path = %path.display(), "saved settings");
        Ok(())
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.preferences.history_limit == 0 {
            return Err(AppError::Validation("history_limit must be at least 1".to_string()));
        }
        if self.display.max_fraction_digits > MAX_FRACTION_DIGITS_LIMIT {
            return Err(AppError::Validation(format!(
                "max_fraction_digits must be at most {}",
                MAX_FRACTION_DIGITS_LIMIT
            )));
        }
        Ok(())
    }

    pub fn number_format(&self) -> NumberFormat {
        NumberFormat::new(self.display.locale, self.display.max_fraction_digits)
    }
}
