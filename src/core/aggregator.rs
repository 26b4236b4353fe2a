//! Review statistics
//!
//! This file contains the ReviewAnalyzer, which classifies negative reviews and
//! builds the per-model and per-category views shown in reports.

use std::collections::HashMap;
use std::fmt;

use log::{debug, info};
use serde::Serialize;

use crate::config::{AnalyzerConfig, ConfigError};
use crate::core::categories::CategoryDictionary;
use crate::core::classifier::Classifier;
use crate::core::review::Review;
use crate::core::selector::main_category;

/// Label of the unfiltered model option
pub const ALL_MODELS_LABEL: &str = "Все модели";

/// Negative-review statistics of one model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSummary {
    pub model: String,
    pub negative: usize,
    pub total: usize,
    pub negative_pct: f64,
    pub main_category: String,
}

/// Exploded review count of one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySummary {
    pub category: String,
    pub count: usize,
}

/// Number of reviews of one model inside a category
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelCount {
    pub model: String,
    pub count: usize,
}

/// Selection applied to a category's review listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ModelFilter {
    All,
    Model(String),
}

impl ModelFilter {
    /// Interpret an optional model name, treating the "all models" label as no filter
    ///
    /// The label is reserved: a model whose article is literally
    /// `ALL_MODELS_LABEL` can only be selected through `ModelFilter::Model`.
    pub fn from_selection(selection: Option<&str>) -> Self {
        match selection {
            None => ModelFilter::All,
            Some(name) if name == ALL_MODELS_LABEL => ModelFilter::All,
            Some(name) => ModelFilter::Model(name.to_string()),
        }
    }

    pub fn matches(&self, review: &Review) -> bool {
        match self {
            ModelFilter::All => true,
            ModelFilter::Model(model) => review.model == *model,
        }
    }
}

impl fmt::Display for ModelFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelFilter::All => write!(f, "{}", ALL_MODELS_LABEL),
            ModelFilter::Model(model) => write!(f, "{}", model),
        }
    }
}

/// Everything known about one complaint category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryDetail {
    pub category: String,
    pub count: usize,
    /// Models with reviews in this category, most frequent first
    pub model_counts: Vec<ModelCount>,
    /// Negative reviews classified into this category, in input order
    pub reviews: Vec<Review>,
}

impl CategoryDetail {
    /// Reviews of this category passing the model filter
    pub fn reviews_for(&self, filter: &ModelFilter) -> Vec<&Review> {
        self.reviews.iter().filter(|r| filter.matches(r)).collect()
    }

    /// Filter choices: all models first, then every model of the category
    pub fn filter_options(&self) -> Vec<ModelFilter> {
        std::iter::once(ModelFilter::All)
            .chain(
                self.model_counts
                    .iter()
                    .map(|mc| ModelFilter::Model(mc.model.clone())),
            )
            .collect()
    }
}

/// Result of analyzing one upload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    /// Reviews left after dropping blank texts
    pub total_reviews: usize,
    pub negative_reviews: usize,
    /// Number of rows exposed by `top_models`
    pub top_n: usize,
    /// Every model, most negative reviews first
    pub model_summaries: Vec<ModelSummary>,
    /// Exploded category counts, most frequent first
    pub category_counts: Vec<CategorySummary>,
    /// Same order as `category_counts`
    pub category_details: Vec<CategoryDetail>,
}

impl AnalysisReport {
    pub fn top_models(&self) -> &[ModelSummary] {
        let end = self.top_n.min(self.model_summaries.len());
        &self.model_summaries[..end]
    }

    pub fn category(&self, name: &str) -> Option<&CategoryDetail> {
        self.category_details.iter().find(|d| d.category == name)
    }

    pub fn model(&self, name: &str) -> Option<&ModelSummary> {
        self.model_summaries.iter().find(|s| s.model == name)
    }
}

/// Per-model running totals, kept in first-seen order
#[derive(Default)]
struct ModelTally<'a> {
    negative: usize,
    total: usize,
    labels: Vec<&'a str>,
}

/// Classifies reviews and aggregates the statistics of one upload
pub struct ReviewAnalyzer {
    classifier: Classifier,
    negative_threshold: f64,
    top_models: usize,
}

impl ReviewAnalyzer {
    /// Create a new ReviewAnalyzer instance
    ///
    /// # Arguments
    ///
    /// * `dictionary` - Category keywords used for classification
    /// * `negative_threshold` - Highest rating counted as negative
    /// * `top_models` - Number of models exposed by the summary table
    pub fn new(dictionary: CategoryDictionary, negative_threshold: f64, top_models: usize) -> Self {
        Self {
            classifier: Classifier::new(dictionary),
            negative_threshold,
            top_models,
        }
    }

    pub fn from_config(config: &AnalyzerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(
            config.dictionary()?,
            config.negative_threshold,
            config.top_models,
        ))
    }

    /// Analyze a batch of reviews
    ///
    /// # Arguments
    ///
    /// * `reviews` - Preprocessed reviews of one upload
    ///
    /// # Returns
    ///
    /// Model and category statistics over the negative subset
    pub fn analyze(&self, reviews: &[Review]) -> AnalysisReport {
        let dictionary = self.classifier.dictionary();

        let negatives: Vec<(&Review, Vec<String>)> = reviews
            .iter()
            .filter(|r| r.is_negative(self.negative_threshold))
            .map(|r| (r, self.classifier.classify(&r.full_text)))
            .collect();

        info!(
            "Classified {} negative reviews out of {}",
            negatives.len(),
            reviews.len()
        );

        let model_summaries = self.summarize_models(reviews, &negatives);
        let category_details = Self::detail_categories(&negatives, dictionary);
        let category_counts = category_details
            .iter()
            .map(|d| CategorySummary {
                category: d.category.clone(),
                count: d.count,
            })
            .collect();

        AnalysisReport {
            total_reviews: reviews.len(),
            negative_reviews: negatives.len(),
            top_n: self.top_models,
            model_summaries,
            category_counts,
            category_details,
        }
    }

    fn summarize_models(
        &self,
        reviews: &[Review],
        negatives: &[(&Review, Vec<String>)],
    ) -> Vec<ModelSummary> {
        let mut order: Vec<&str> = Vec::new();
        let mut tallies: HashMap<&str, ModelTally> = HashMap::new();

        // Totals over every review with a model
        for review in reviews.iter().filter(|r| !r.model.is_empty()) {
            let tally = tallies.entry(review.model.as_str()).or_insert_with(|| {
                order.push(review.model.as_str());
                ModelTally::default()
            });
            tally.total += 1;
        }

        // Negative counts and the labels feeding the main category
        for (review, labels) in negatives.iter().filter(|(r, _)| !r.model.is_empty()) {
            if let Some(tally) = tallies.get_mut(review.model.as_str()) {
                tally.negative += 1;
                tally.labels.extend(labels.iter().map(String::as_str));
            }
        }

        // Build summaries in first-seen order
        let dictionary = self.classifier.dictionary();
        let mut summaries: Vec<ModelSummary> = order
            .into_iter()
            .filter_map(|model| tallies.remove(model).map(|tally| (model, tally)))
            .map(|(model, tally)| ModelSummary {
                model: model.to_string(),
                negative: tally.negative,
                total: tally.total,
                negative_pct: negative_percentage(tally.negative, tally.total),
                main_category: main_category(&tally.labels, dictionary),
            })
            .collect();

        // stable: equal counts keep first-seen order
        summaries.sort_by(|a, b| b.negative.cmp(&a.negative));

        debug!("Summarized {} models", summaries.len());
        summaries
    }

    fn detail_categories(
        negatives: &[(&Review, Vec<String>)],
        dictionary: &CategoryDictionary,
    ) -> Vec<CategoryDetail> {
        let mut details: Vec<CategoryDetail> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();

        // label-major fan-out: one row per (review, category) pair
        for (review, labels) in negatives {
            for label in labels {
                let position = *index.entry(label.as_str()).or_insert_with(|| {
                    details.push(CategoryDetail {
                        category: label.clone(),
                        count: 0,
                        model_counts: Vec::new(),
                        reviews: Vec::new(),
                    });
                    details.len() - 1
                });

                let detail = &mut details[position];
                detail.count += 1;
                detail.reviews.push((*review).clone());

                if review.model.is_empty() {
                    continue;
                }
                match detail.model_counts.iter_mut().find(|mc| mc.model == review.model) {
                    Some(mc) => mc.count += 1,
                    None => detail.model_counts.push(ModelCount {
                        model: review.model.clone(),
                        count: 1,
                    }),
                }
            }
        }

        // Most frequent first; ties keep their order
        for detail in details.iter_mut() {
            detail.model_counts.sort_by(|a, b| b.count.cmp(&a.count));
        }
        details.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| dictionary.rank(&a.category).cmp(&dictionary.rank(&b.category)))
        });

        details
    }
}

/// Share of negative reviews in percent, rounded to one decimal
///
/// Halves round to the even tenth, so 1 of 16 gives 6.2. Returns 0 when the
/// model has no reviews.
pub fn negative_percentage(negative: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let scaled = negative as f64 / total as f64 * 100.0 * 10.0;
    scaled.round_ties_even() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::categories::CategoryEntry;

    fn review(model: &str, stars: Option<f64>, text: &str) -> Review {
        Review {
            model: model.to_string(),
            stars,
            full_text: text.to_string(),
        }
    }

    fn analyzer() -> ReviewAnalyzer {
        let dictionary = CategoryDictionary::new(
            vec![
                CategoryEntry::new("Size", &["small"]),
                CategoryEntry::new("Smell", &["stinks"]),
            ],
            "Other",
        );
        ReviewAnalyzer::new(dictionary, 4.0, 20)
    }

    #[test]
    fn test_negative_percentage() {
        assert_eq!(negative_percentage(1, 2), 50.0);
        assert_eq!(negative_percentage(1, 3), 33.3);
        assert_eq!(negative_percentage(2, 3), 66.7);
        assert_eq!(negative_percentage(0, 0), 0.0);
        assert_eq!(negative_percentage(4, 4), 100.0);
    }

    #[test]
    fn test_negative_percentage_rounds_half_to_even() {
        assert_eq!(negative_percentage(1, 16), 6.2);
        assert_eq!(negative_percentage(5, 16), 31.2);
        assert_eq!(negative_percentage(3, 16), 18.8);
        assert_eq!(negative_percentage(1, 8), 12.5);
    }

    #[test]
    fn test_default_dictionary_scenario() {
        let analyzer = ReviewAnalyzer::from_config(&AnalyzerConfig::default()).unwrap();
        let reviews = vec![
            review("X", Some(3.0), "тонкая плёнка"),
            review("X", Some(5.0), "отлично"),
        ];

        let report = analyzer.analyze(&reviews);
        assert_eq!(report.negative_reviews, 1);

        let summary = report.model("X").unwrap();
        assert_eq!(summary.negative, 1);
        assert_eq!(summary.total, 2);
        assert_eq!(summary.negative_pct, 50.0);
        assert_eq!(summary.main_category, "Качество материала");

        assert_eq!(
            report.category_counts,
            vec![CategorySummary {
                category: "Качество материала".to_string(),
                count: 1
            }]
        );
    }

    #[test]
    fn test_missing_rating_counts_in_total_only() {
        let report = analyzer().analyze(&[
            review("A", None, "stinks"),
            review("A", Some(1.0), "stinks"),
        ]);
        let summary = report.model("A").unwrap();
        assert_eq!(summary.negative, 1);
        assert_eq!(summary.total, 2);
        assert_eq!(report.category("Smell").unwrap().count, 1);
    }

    #[test]
    fn test_model_without_negatives_gets_fallback() {
        let report = analyzer().analyze(&[review("A", Some(5.0), "fine")]);
        let summary = report.model("A").unwrap();
        assert_eq!(summary.negative, 0);
        assert_eq!(summary.negative_pct, 0.0);
        assert_eq!(summary.main_category, "Other");
        assert!(report.category_counts.is_empty());
    }

    #[test]
    fn test_main_category_pairs_fallback() {
        let report = analyzer().analyze(&[
            review("A", Some(1.0), "bad"),
            review("A", Some(2.0), "awful"),
            review("A", Some(3.0), "too small"),
        ]);
        assert_eq!(report.model("A").unwrap().main_category, "Other, Size");
    }

    #[test]
    fn test_top_models_sorted_and_truncated() {
        let mut reviews = Vec::new();
        for i in 0..25 {
            for _ in 0..=(i % 7) {
                reviews.push(review(&format!("M{}", i), Some(1.0), "small"));
            }
            reviews.push(review(&format!("M{}", i), Some(5.0), "ok"));
        }

        let report = analyzer().analyze(&reviews);
        let top = report.top_models();
        assert_eq!(report.model_summaries.len(), 25);
        assert_eq!(top.len(), 20);
        assert!(top.windows(2).all(|w| w[0].negative >= w[1].negative));
        assert_eq!(top[0].negative, 7);
    }

    #[test]
    fn test_ties_keep_first_seen_order() {
        let report = analyzer().analyze(&[
            review("B", Some(1.0), "small"),
            review("A", Some(1.0), "small"),
        ]);
        let models: Vec<&str> = report.model_summaries.iter().map(|s| s.model.as_str()).collect();
        assert_eq!(models, vec!["B", "A"]);
    }

    #[test]
    fn test_exploded_counts_exceed_review_count() {
        let report = analyzer().analyze(&[
            review("A", Some(2.0), "small and stinks"),
            review("B", Some(2.0), "stinks"),
        ]);
        let pairs: usize = report.category_counts.iter().map(|c| c.count).sum();
        assert_eq!(report.negative_reviews, 2);
        assert_eq!(pairs, 3);
        assert_eq!(report.category_counts[0].category, "Smell");
        assert_eq!(report.category_counts[0].count, 2);
    }

    #[test]
    fn test_category_ties_follow_dictionary_order() {
        let report = analyzer().analyze(&[
            review("A", Some(2.0), "nothing"),
            review("A", Some(2.0), "stinks"),
            review("A", Some(2.0), "small"),
        ]);
        let order: Vec<&str> = report
            .category_counts
            .iter()
            .map(|c| c.category.as_str())
            .collect();
        assert_eq!(order, vec!["Size", "Smell", "Other"]);
    }

    #[test]
    fn test_category_detail_and_filter() {
        let report = analyzer().analyze(&[
            review("A", Some(2.0), "stinks"),
            review("B", Some(3.0), "stinks badly"),
            review("B", Some(1.0), "really stinks"),
            review("C", Some(5.0), "stinks but fine"),
        ]);

        let detail = report.category("Smell").unwrap();
        assert_eq!(detail.count, 3);
        assert_eq!(
            detail.model_counts,
            vec![
                ModelCount { model: "B".to_string(), count: 2 },
                ModelCount { model: "A".to_string(), count: 1 },
            ]
        );
        assert_eq!(detail.reviews_for(&ModelFilter::All).len(), 3);

        let only_b = detail.reviews_for(&ModelFilter::Model("B".to_string()));
        assert_eq!(only_b.len(), 2);
        assert!(only_b.iter().all(|r| r.model == "B"));

        assert_eq!(
            detail.filter_options(),
            vec![
                ModelFilter::All,
                ModelFilter::Model("B".to_string()),
                ModelFilter::Model("A".to_string()),
            ]
        );
    }

    #[test]
    fn test_blank_model_excluded_from_model_tables() {
        let report = analyzer().analyze(&[
            review("", Some(1.0), "stinks"),
            review("A", Some(1.0), "stinks"),
        ]);
        assert_eq!(report.model_summaries.len(), 1);
        let detail = report.category("Smell").unwrap();
        assert_eq!(detail.count, 2);
        assert_eq!(detail.model_counts.len(), 1);
    }

    #[test]
    fn test_model_filter_selection() {
        assert_eq!(ModelFilter::from_selection(None), ModelFilter::All);
        assert_eq!(ModelFilter::from_selection(Some(ALL_MODELS_LABEL)), ModelFilter::All);
        assert_eq!(
            ModelFilter::from_selection(Some("X")),
            ModelFilter::Model("X".to_string())
        );
        assert_eq!(ModelFilter::All.to_string(), ALL_MODELS_LABEL);
    }

    #[test]
    fn test_model_named_like_all_label() {
        let literal = review(ALL_MODELS_LABEL, Some(1.0), "stinks");
        let other = review("B", Some(1.0), "stinks");

        // the label always means "no filter" when selected by name
        assert!(ModelFilter::from_selection(Some(ALL_MODELS_LABEL)).matches(&other));

        let exact = ModelFilter::Model(ALL_MODELS_LABEL.to_string());
        assert!(exact.matches(&literal));
        assert!(!exact.matches(&other));
    }

    #[test]
    fn test_empty_input() {
        let report = analyzer().analyze(&[]);
        assert_eq!(report.total_reviews, 0);
        assert!(report.model_summaries.is_empty());
        assert!(report.top_models().is_empty());
        assert!(report.category_details.is_empty());
    }
}
