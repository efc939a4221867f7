use async_trait::async_trait;
use catalog_core::model::{ProductId, ProductRecord, RelationshipType};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// What the provider is told about a product.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductSummary {
    pub id: ProductId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    pub semantic_tags: Vec<String>,
}

impl From<&ProductRecord> for ProductSummary {
    fn from(record: &ProductRecord) -> Self {
        Self {
            id: record.id,
            sku: record.sku.clone(),
            title: record.display_title().to_string(),
            description: record.best_description().map(str::to_string),
            category: record.category.clone(),
            brand: record.brand.clone(),
            price: record.price,
            semantic_tags: record.semantic_tags().to_vec(),
        }
    }
}

/// A proposal exactly as the provider returned it. Nothing here is trusted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawProposal {
    pub target_product_id: Option<ProductId>,
    pub relationship_type: Option<String>,
    pub similarity_score: Option<f64>,
    pub reasoning: Option<String>,
}

impl RawProposal {
    pub fn new(
        target_product_id: ProductId,
        relationship_type: impl Into<String>,
        similarity_score: f64,
        reasoning: impl Into<String>,
    ) -> Self {
        Self {
            target_product_id: Some(target_product_id),
            relationship_type: Some(relationship_type.into()),
            similarity_score: Some(similarity_score),
            reasoning: Some(reasoning.into()),
        }
    }
}

/// A proposal that passed validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProposedRelationship {
    pub target_product_id: ProductId,
    pub relationship_type: RelationshipType,
    pub similarity_score: f32,
    pub reasoning: String,
}

#[async_trait]
pub trait RelationshipDiscoveryProvider: Send + Sync {
    async fn propose(
        &self,
        source: &ProductSummary,
        candidates: &[ProductSummary],
    ) -> anyhow::Result<Vec<RawProposal>>;
}

#[derive(Debug, Error)]
pub enum ProposalParseError {
    #[error("provider output is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("provider output is not a JSON array")]
    NotAnArray,
}

/// Parses a provider's text reply into raw proposals.
///
/// The reply must be a JSON array, optionally inside a Markdown code fence.
/// Elements that do not decode become empty proposals, which validation
/// later drops as malformed.
pub fn parse_proposals(text: &str) -> Result<Vec<RawProposal>, ProposalParseError> {
    let body = strip_code_fence(text.trim());
    let value: serde_json::Value = serde_json::from_str(body)?;
    let serde_json::Value::Array(items) = value else {
        return Err(ProposalParseError::NotAnArray);
    };

    Ok(items
        .into_iter()
        .map(|item| serde_json::from_value(item).unwrap_or_default())
        .collect())
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop an info string such as `json` on the opening fence line.
    let rest = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

/// Replays fixed proposals per source product. Sources listed as failing
/// report the provider as unavailable.
#[derive(Default)]
pub struct StaticDiscoveryProvider {
    proposals: HashMap<ProductId, Vec<RawProposal>>,
    failing: HashSet<ProductId>,
}

impl StaticDiscoveryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_proposals(mut self, source: ProductId, proposals: Vec<RawProposal>) -> Self {
        self.proposals.insert(source, proposals);
        self
    }

    pub fn with_reply(
        self,
        source: ProductId,
        reply: &str,
    ) -> Result<Self, ProposalParseError> {
        let proposals = parse_proposals(reply)?;
        Ok(self.with_proposals(source, proposals))
    }

    pub fn failing_for(mut self, source: ProductId) -> Self {
        self.failing.insert(source);
        self
    }
}

#[async_trait]
impl RelationshipDiscoveryProvider for StaticDiscoveryProvider {
    async fn propose(
        &self,
        source: &ProductSummary,
        _candidates: &[ProductSummary],
    ) -> anyhow::Result<Vec<RawProposal>> {
        if self.failing.contains(&source.id) {
            anyhow::bail!("provider unavailable for product {}", source.id);
        }
        Ok(self.proposals.get(&source.id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_core::model::Enrichment;

    #[test]
    fn test_parse_plain_array() {
        let reply = r#"[
            {"target_product_id": 2, "relationship_type": "SIMILAR_TO",
             "similarity_score": 0.85, "reasoning": "Both are wireless earbuds"},
            {"target_product_id": 5, "relationship_type": "COMPLEMENTS"}
        ]"#;
        let proposals = parse_proposals(reply).unwrap();
        assert_eq!(proposals.len(), 2);
        assert_eq!(proposals[0].target_product_id, Some(2));
        assert_eq!(proposals[1].similarity_score, None);
    }

    #[test]
    fn test_parse_fenced_array() {
        let reply = "```json\n[{\"target_product_id\": 3, \"relationship_type\": \"ALTERNATIVE_TO\", \"similarity_score\": 0.6}]\n```";
        let proposals = parse_proposals(reply).unwrap();
        assert_eq!(proposals.len(), 1);
        assert_eq!(proposals[0].relationship_type.as_deref(), Some("ALTERNATIVE_TO"));
    }

    #[test]
    fn test_parse_rejects_non_arrays_and_garbage() {
        assert!(matches!(
            parse_proposals(r#"{"target_product_id": 1}"#),
            Err(ProposalParseError::NotAnArray)
        ));
        assert!(matches!(
            parse_proposals("I could not find any relationships."),
            Err(ProposalParseError::Json(_))
        ));
    }

    #[test]
    fn test_undecodable_elements_become_empty_proposals() {
        let proposals = parse_proposals(r#"[{"target_product_id": "two"}, 7]"#).unwrap();
        assert_eq!(proposals, vec![RawProposal::default(), RawProposal::default()]);
    }

    #[test]
    fn test_summary_falls_back_to_raw_fields() {
        let mut record = ProductRecord::new(1, "Mouse").with_brand("Acme");
        record.raw_description = Some("A mouse".to_string());
        let summary = ProductSummary::from(&record);
        assert_eq!(summary.title, "Mouse");
        assert_eq!(summary.description.as_deref(), Some("A mouse"));

        let record = record.with_enrichment(Enrichment {
            enriched_title: Some("Acme Precision Mouse".to_string()),
            long_description: Some("A precise mouse".to_string()),
            ..Enrichment::default()
        });
        let summary = ProductSummary::from(&record);
        assert_eq!(summary.title, "Acme Precision Mouse");
        assert_eq!(summary.description.as_deref(), Some("A precise mouse"));
    }
}
