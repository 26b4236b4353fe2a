//! Keyword classifier
//!
//! Assigns every complaint category whose keywords occur in a review text.

use crate::core::categories::CategoryDictionary;

/// Multi-label keyword classifier over a category dictionary
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    dictionary: CategoryDictionary,
}

impl Classifier {
    pub fn new(dictionary: CategoryDictionary) -> Self {
        Self { dictionary }
    }

    pub fn dictionary(&self) -> &CategoryDictionary {
        &self.dictionary
    }

    /// Classify one review text
    ///
    /// # Arguments
    ///
    /// * `text` - Combined review text in any case
    ///
    /// # Returns
    ///
    /// Matched categories in dictionary order, or the fallback label alone.
    /// The result is never empty.
    pub fn classify(&self, text: &str) -> Vec<String> {
        let text = text.to_lowercase();

        let matched: Vec<String> = self
            .dictionary
            .categories()
            .iter()
            .filter(|entry| entry.keywords.iter().any(|k| text.contains(k.as_str())))
            .map(|entry| entry.name.clone())
            .collect();

        if matched.is_empty() {
            vec![self.dictionary.fallback().to_string()]
        } else {
            matched
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::categories::{CategoryEntry, DEFAULT_FALLBACK};

    #[test]
    fn test_no_match_yields_fallback() {
        let classifier = Classifier::default();
        assert_eq!(classifier.classify("отлично"), vec![DEFAULT_FALLBACK.to_string()]);
        assert_eq!(classifier.classify(""), vec![DEFAULT_FALLBACK.to_string()]);
    }

    #[test]
    fn test_single_category() {
        let classifier = Classifier::default();
        assert_eq!(classifier.classify("тонкая плёнка"), vec!["Качество материала"]);
    }

    #[test]
    fn test_case_insensitive_cyrillic() {
        let classifier = Classifier::default();
        assert_eq!(classifier.classify("ВОНЯЕТ ужасно"), vec!["Запах"]);
        assert_eq!(classifier.classify("Не работает FACE ID"), vec!["Функциональные проблемы"]);
    }

    #[test]
    fn test_multiple_categories_in_declaration_order() {
        let classifier = Classifier::default();
        // "не тот" contains the "не то" keyword
        let labels = classifier.classify("Коробка мятая, брак, и размер не тот");
        assert_eq!(
            labels,
            vec!["Размер не подходит", "Брак", "Ошибка комплектации", "Доставка"]
        );
    }

    #[test]
    fn test_shared_keyword_hits_both_categories() {
        let classifier = Classifier::default();
        assert_eq!(
            classifier.classify("всё размыто"),
            vec!["Качество материала", "Визуальное искажение"]
        );
    }

    #[test]
    fn test_custom_dictionary() {
        let classifier = Classifier::new(CategoryDictionary::new(
            vec![
                CategoryEntry::new("Size", &["too small", "too big"]),
                CategoryEntry::new("Smell", &["stinks"]),
            ],
            "Other",
        ));
        assert_eq!(classifier.classify("It STINKS and is Too Small"), vec!["Size", "Smell"]);
        assert_eq!(classifier.classify("great"), vec!["Other"]);
    }
}
