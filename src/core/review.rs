//! Review records

use serde::{Deserialize, Serialize};

/// One input review after preprocessing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    /// Seller article code of the reviewed product
    pub model: String,
    /// Star rating, `None` when blank or not a number
    pub stars: Option<f64>,
    /// Review body, pros and cons joined by spaces, trimmed
    pub full_text: String,
}

impl Review {
    /// Build a review from its raw text fields
    ///
    /// Returns `None` when the combined text is blank; such rows take no part
    /// in any statistic.
    pub fn from_fields(
        model: &str,
        stars: Option<f64>,
        text: &str,
        pros_text: &str,
        cons_text: &str,
    ) -> Option<Self> {
        let full_text = [text, pros_text, cons_text].join(" ");
        let full_text = full_text.trim();

        if full_text.is_empty() {
            return None;
        }

        Some(Self {
            model: model.trim().to_string(),
            stars,
            full_text: full_text.to_string(),
        })
    }

    /// A review is negative when its rating is at or below the threshold
    pub fn is_negative(&self, threshold: f64) -> bool {
        matches!(self.stars, Some(stars) if stars <= threshold)
    }
}
