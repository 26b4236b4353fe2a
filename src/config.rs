//! Analyzer configuration
//!
//! Settings are read from an optional JSON file. Every field has a default, so
//! a partial file only overrides what it names.

use std::path::Path;

use log::{error, info};
use serde::{Deserialize, Serialize};

use crate::core::categories::{CategoryDictionary, CategoryEntry, DEFAULT_FALLBACK};

/// Error raised when configuration values cannot be used
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration declares an empty category list")]
    EmptyCategories,

    #[error("Category at position {0} has an empty name")]
    UnnamedCategory(usize),

    #[error("Negative threshold must be a finite number, got {0}")]
    InvalidThreshold(f64),
}

/// Source column names in the uploaded spreadsheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub model: String,
    pub stars: String,
    pub text: String,
    pub pros_text: String,
    pub cons_text: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            model: "Артикул продавца".to_string(),
            stars: "Количество звезд".to_string(),
            text: "Текст отзыва".to_string(),
            pros_text: "Достоинства".to_string(),
            cons_text: "Недостатки".to_string(),
        }
    }
}

impl ColumnNames {
    /// Column names in the order model, stars, text, pros, cons
    pub fn required(&self) -> [&str; 5] {
        [
            self.model.as_str(),
            self.stars.as_str(),
            self.text.as_str(),
            self.pros_text.as_str(),
            self.cons_text.as_str(),
        ]
    }
}

/// Complete analyzer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Worksheet holding the reviews
    pub sheet_name: String,

    pub columns: ColumnNames,

    /// Highest star rating still counted as negative
    pub negative_threshold: f64,

    /// Number of models shown in the summary table
    pub top_models: usize,

    /// Replaces the built-in category dictionary when present
    pub categories: Option<Vec<CategoryEntry>>,

    pub fallback_category: Option<String>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            sheet_name: "отзывы".to_string(),
            columns: ColumnNames::default(),
            negative_threshold: 4.0,
            top_models: 20,
            categories: None,
            fallback_category: None,
        }
    }
}

impl AnalyzerConfig {
    /// Build the category dictionary this configuration describes
    pub fn dictionary(&self) -> Result<CategoryDictionary, ConfigError> {
        let fallback = self
            .fallback_category
            .clone()
            .unwrap_or_else(|| DEFAULT_FALLBACK.to_string());

        match &self.categories {
            None => {
                let default = CategoryDictionary::default();
                Ok(CategoryDictionary::new(default.categories().to_vec(), fallback))
            }
            Some(entries) => {
                if let Some(index) = entries.iter().position(|e| e.name.trim().is_empty()) {
                    return Err(ConfigError::UnnamedCategory(index));
                }
                let dictionary = CategoryDictionary::new(entries.clone(), fallback);
                if dictionary.is_empty() {
                    return Err(ConfigError::EmptyCategories);
                }
                Ok(dictionary)
            }
        }
    }

    /// Check numeric settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.negative_threshold.is_finite() {
            return Err(ConfigError::InvalidThreshold(self.negative_threshold));
        }
        self.dictionary().map(|_| ())
    }
}

/// Load configuration from file if provided
///
/// A missing or malformed file is logged and replaced by the defaults.
pub fn load_config(config_path: Option<&Path>) -> AnalyzerConfig {
    let Some(path) = config_path else {
        return AnalyzerConfig::default();
    };

    if !path.exists() {
        error!("Configuration file not found: {}", path.display());
        return AnalyzerConfig::default();
    }

    let config_str = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            error!("Failed to read configuration file {}: {}", path.display(), e);
            return AnalyzerConfig::default();
        }
    };

    match serde_json::from_str(&config_str) {
        Ok(config) => {
            info!("Loaded configuration from {}", path.display());
            config
        }
        Err(e) => {
            error!("Invalid JSON in configuration file: {}", e);
            AnalyzerConfig::default()
        }
    }
}
