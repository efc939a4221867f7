//! Answer Engine Optimization (AEO) content score.
//!
//! Five dimensions worth up to 20 points each, summed into a 0-100 total:
//! - **Title optimization**: enriched title length
//! - **Attribute completeness**: number of key attributes
//! - **Semantic richness**: description word count plus FAQ count
//! - **Structured data**: semantic tags and use cases
//! - **Consistency**: brand and category carried through from the raw product
//!
//! Scoring never fails. Missing inputs only lower the affected dimension.

use catalog_core::model::{Enrichment, ProductRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DIMENSION_MAX: u32 = 20;

/// Raw product fields the consistency check compares against.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductContext<'a> {
    pub raw_title: &'a str,
    pub brand: Option<&'a str>,
    pub category: Option<&'a str>,
}

impl<'a> From<&'a ProductRecord> for ProductContext<'a> {
    fn from(record: &'a ProductRecord) -> Self {
        Self {
            raw_title: &record.raw_title,
            brand: record.brand.as_deref(),
            category: record.category.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreDimensions {
    pub title_optimization: u32,
    pub attribute_completeness: u32,
    pub semantic_richness: u32,
    pub structured_data: u32,
    pub consistency: u32,
}

impl ScoreDimensions {
    pub fn total(&self) -> u32 {
        self.title_optimization
            + self.attribute_completeness
            + self.semantic_richness
            + self.structured_data
            + self.consistency
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub total: u32,
    pub dimensions: ScoreDimensions,
    /// Human-readable notes keyed by dimension. Diagnostic only.
    pub details: BTreeMap<String, String>,
}

pub fn score(enriched: &Enrichment, product: &ProductContext<'_>) -> ScoreBreakdown {
    let mut details = BTreeMap::new();
    let title = enriched.enriched_title.as_deref().unwrap_or("");
    let description = enriched.long_description.as_deref().unwrap_or("");

    let (title_optimization, note) = title_points(title.chars().count());
    details.insert("title".to_string(), note.to_string());

    let attr_count = enriched.key_attributes.len();
    let (attribute_completeness, grade) = attribute_points(attr_count);
    details.insert(
        "attributes".to_string(),
        format!("{attr_count} attributes ({grade})"),
    );

    let word_count = description.split_whitespace().count();
    let faq_count = enriched.faqs.len();
    let semantic_richness = description_points(word_count) + faq_points(faq_count);
    details.insert(
        "semantic".to_string(),
        format!("{word_count} words, {faq_count} FAQs"),
    );

    let tag_count = enriched.semantic_tags.len();
    let use_case_count = enriched.use_cases.len();
    let structured_data = capped(tag_count, 2) + capped(use_case_count, 3);
    details.insert(
        "structured".to_string(),
        format!("{tag_count} tags, {use_case_count} use cases"),
    );

    let (consistency, note) = consistency_points(title, description, product);
    details.insert("consistency".to_string(), note);

    let dimensions = ScoreDimensions {
        title_optimization,
        attribute_completeness,
        semantic_richness,
        structured_data,
        consistency,
    };

    ScoreBreakdown {
        total: dimensions.total(),
        dimensions,
        details,
    }
}

/// Scores a catalog record, treating a missing enrichment as empty.
pub fn score_product(record: &ProductRecord) -> ScoreBreakdown {
    let empty = Enrichment::default();
    let enriched = record.enrichment.as_ref().unwrap_or(&empty);
    score(enriched, &ProductContext::from(record))
}

fn title_points(len: usize) -> (u32, &'static str) {
    match len {
        45..=60 => (20, "Optimal length"),
        40..=44 | 61..=70 => (15, "Acceptable length"),
        0 => (0, "Missing title"),
        _ => (10, "Suboptimal length"),
    }
}

fn attribute_points(count: usize) -> (u32, &'static str) {
    match count {
        n if n >= 7 => (20, "excellent"),
        5..=6 => (15, "good"),
        3..=4 => (10, "acceptable"),
        _ => (5, "poor"),
    }
}

fn description_points(words: usize) -> u32 {
    match words {
        150..=200 => 10,
        120..=149 | 201..=250 => 7,
        0 => 0,
        _ => 5,
    }
}

fn faq_points(count: usize) -> u32 {
    match count {
        n if n >= 5 => 10,
        3..=4 => 7,
        1..=2 => 5,
        _ => 0,
    }
}

fn capped(count: usize, per_item: u32) -> u32 {
    let count = u32::try_from(count).unwrap_or(u32::MAX);
    count.saturating_mul(per_item).min(10)
}

// Plain case-insensitive substring checks; no tokenization or stemming.
fn consistency_points(
    enriched_title: &str,
    description: &str,
    product: &ProductContext<'_>,
) -> (u32, String) {
    let mut points = DIMENSION_MAX;
    let mut issues: Vec<&str> = Vec::new();

    let enriched_title = enriched_title.to_lowercase();
    let raw_title = product.raw_title.to_lowercase();

    let brand = product.brand.unwrap_or("").to_lowercase();
    if !brand.is_empty() && raw_title.contains(&brand) && !enriched_title.contains(&brand) {
        points = points.saturating_sub(5);
        issues.push("Brand missing from enriched title");
    }

    let category = product.category.unwrap_or("").to_lowercase();
    if !category.is_empty() && !description.to_lowercase().contains(&category) {
        points = points.saturating_sub(5);
        issues.push(if issues.is_empty() {
            "Category not mentioned in description"
        } else {
            "category not mentioned"
        });
    }

    let note = if issues.is_empty() {
        "Excellent alignment".to_string()
    } else {
        issues.join(", ")
    };
    (points, note)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_bands() {
        assert_eq!(title_points(50).0, 20);
        assert_eq!(title_points(45).0, 20);
        assert_eq!(title_points(60).0, 20);
        assert_eq!(title_points(40).0, 15);
        assert_eq!(title_points(70).0, 15);
        assert_eq!(title_points(71).0, 10);
        assert_eq!(title_points(12).0, 10);
        assert_eq!(title_points(0).0, 0);
    }

    #[test]
    fn attribute_bands() {
        assert_eq!(attribute_points(8).0, 20);
        assert_eq!(attribute_points(7).0, 20);
        assert_eq!(attribute_points(6).0, 15);
        assert_eq!(attribute_points(3).0, 10);
        assert_eq!(attribute_points(2).0, 5);
        assert_eq!(attribute_points(0).0, 5);
    }

    #[test]
    fn semantic_bands() {
        assert_eq!(description_points(175) + faq_points(4), 17);
        assert_eq!(description_points(120), 7);
        assert_eq!(description_points(250), 7);
        assert_eq!(description_points(251), 5);
        assert_eq!(description_points(0) + faq_points(0), 0);
        assert_eq!(faq_points(5), 10);
        assert_eq!(faq_points(1), 5);
    }

    #[test]
    fn structured_caps_each_half_at_ten() {
        assert_eq!(capped(6, 2) + capped(3, 3), 19);
        assert_eq!(capped(40, 3), 10);
        assert_eq!(capped(0, 2), 0);
    }

    #[test]
    fn title_length_counts_characters_not_bytes() {
        let enriched = Enrichment {
            enriched_title: Some("é".repeat(50)),
            ..Enrichment::default()
        };
        let breakdown = score(&enriched, &ProductContext::default());
        assert_eq!(breakdown.dimensions.title_optimization, 20);
    }
}
