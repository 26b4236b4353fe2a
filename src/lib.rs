//! Review Analyzer - complaint classification for product reviews
//!
//! This library sorts customer reviews into complaint categories by keyword
//! matching and aggregates negative-review statistics per product model and
//! per category.

pub mod config;
pub mod core;
pub mod utils;

pub use crate::config::{load_config, AnalyzerConfig, ColumnNames, ConfigError};
pub use crate::core::aggregator::{
    AnalysisReport, CategoryDetail, CategorySummary, ModelCount, ModelFilter, ModelSummary,
    ReviewAnalyzer, ALL_MODELS_LABEL,
};
pub use crate::core::categories::{CategoryDictionary, CategoryEntry, DEFAULT_FALLBACK};
pub use crate::core::classifier::Classifier;
pub use crate::core::review::Review;
pub use crate::core::selector::main_category;
pub use crate::utils::review_loader::{load_reviews, LoadError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Load and analyze a single review file
///
/// This is a convenience function for simple use cases.
///
/// # Arguments
///
/// * `file_path` - Path to the spreadsheet or CSV file
/// * `config` - Analyzer configuration
///
/// # Returns
///
/// The analysis report of the file
pub fn analyze_file<P: AsRef<std::path::Path>>(
    file_path: P,
    config: &AnalyzerConfig,
) -> anyhow::Result<AnalysisReport> {
    use anyhow::Context;

    let analyzer = ReviewAnalyzer::from_config(config)?;
    let reviews = load_reviews(file_path.as_ref(), config)
        .with_context(|| format!("Failed to load {}", file_path.as_ref().display()))?;

    Ok(analyzer.analyze(&reviews))
}
