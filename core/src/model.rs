use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type ProductId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationshipType {
    SimilarTo,
    Complements,
    AlternativeTo,
    BelongsTo,
    MadeBy,
}

impl RelationshipType {
    /// Kinds a discovery provider may propose and the store may persist.
    pub const DISCOVERED: [RelationshipType; 3] = [
        RelationshipType::SimilarTo,
        RelationshipType::Complements,
        RelationshipType::AlternativeTo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipType::SimilarTo => "SIMILAR_TO",
            RelationshipType::Complements => "COMPLEMENTS",
            RelationshipType::AlternativeTo => "ALTERNATIVE_TO",
            RelationshipType::BelongsTo => "BELONGS_TO",
            RelationshipType::MadeBy => "MADE_BY",
        }
    }

    pub fn is_discovered(&self) -> bool {
        Self::DISCOVERED.contains(self)
    }
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown relationship type: {0}")]
pub struct UnknownRelationshipType(pub String);

impl FromStr for RelationshipType {
    type Err = UnknownRelationshipType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SIMILAR_TO" => Ok(RelationshipType::SimilarTo),
            "COMPLEMENTS" => Ok(RelationshipType::Complements),
            "ALTERNATIVE_TO" => Ok(RelationshipType::AlternativeTo),
            "BELONGS_TO" => Ok(RelationshipType::BelongsTo),
            "MADE_BY" => Ok(RelationshipType::MadeBy),
            other => Err(UnknownRelationshipType(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyAttribute {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faq {
    pub question: String,
    pub answer: String,
}

/// Generated content attached to a product by the enrichment step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Enrichment {
    pub enriched_title: Option<String>,
    pub long_description: Option<String>,
    pub key_attributes: Vec<KeyAttribute>,
    pub faqs: Vec<Faq>,
    pub semantic_tags: Vec<String>,
    pub use_cases: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: ProductId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    pub raw_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrichment: Option<Enrichment>,
}

impl ProductRecord {
    pub fn new(id: ProductId, raw_title: impl Into<String>) -> Self {
        Self {
            id,
            sku: None,
            raw_title: raw_title.into(),
            raw_description: None,
            category: None,
            brand: None,
            price: None,
            enrichment: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_sku(mut self, sku: impl Into<String>) -> Self {
        self.sku = Some(sku.into());
        self
    }

    pub fn with_enrichment(mut self, enrichment: Enrichment) -> Self {
        self.enrichment = Some(enrichment);
        self
    }

    /// Enriched title when one exists, otherwise the raw title.
    pub fn display_title(&self) -> &str {
        self.enrichment
            .as_ref()
            .and_then(|e| e.enriched_title.as_deref())
            .unwrap_or(&self.raw_title)
    }

    /// Long description when one exists, otherwise the raw description.
    pub fn best_description(&self) -> Option<&str> {
        self.enrichment
            .as_ref()
            .and_then(|e| e.long_description.as_deref())
            .or(self.raw_description.as_deref())
    }

    pub fn semantic_tags(&self) -> &[String] {
        self.enrichment
            .as_ref()
            .map(|e| e.semantic_tags.as_slice())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipRecord {
    pub source_id: ProductId,
    pub target_id: ProductId,
    pub relationship_type: RelationshipType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity_score: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

impl RelationshipRecord {
    pub fn new(
        source_id: ProductId,
        target_id: ProductId,
        relationship_type: RelationshipType,
        similarity_score: f32,
        reasoning: impl Into<String>,
    ) -> Self {
        Self {
            source_id,
            target_id,
            relationship_type,
            similarity_score: Some(similarity_score),
            reasoning: Some(reasoning.into()),
        }
    }

    /// Upsert identity: at most one persisted record per triple.
    pub fn triple(&self) -> (ProductId, ProductId, RelationshipType) {
        (self.source_id, self.target_id, self.relationship_type)
    }
}

/// Point-in-time read of the catalog and its persisted relationships.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    #[serde(default)]
    pub products: Vec<ProductRecord>,
    #[serde(default)]
    pub relationships: Vec<RelationshipRecord>,
}

impl CatalogSnapshot {
    pub fn product(&self, id: ProductId) -> Option<&ProductRecord> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn product_ids(&self) -> Vec<ProductId> {
        let mut ids: Vec<ProductId> = self.products.iter().map(|p| p.id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}
