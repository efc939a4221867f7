//! Graph-backed product recommendations.
//!
//! Recommendations come straight from a product's outgoing discovered edges,
//! grouped by relationship kind and ranked by similarity score.

use catalog_core::model::{ProductId, RelationshipType};
use serde::Serialize;
use std::cmp::Ordering;
use storage::index::{KnowledgeGraph, NodeKey};

pub const DEFAULT_LIMIT: usize = 5;

/// A related product as seen from the source product.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelationshipView {
    pub product_id: ProductId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    pub title: String,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub price: Option<f64>,
    pub relationship_type: RelationshipType,
    pub similarity_score: Option<f32>,
    pub reasoning: String,
}

impl RelationshipView {
    fn rank_score(&self) -> f32 {
        self.similarity_score.unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Recommendations {
    pub similar: Vec<RelationshipView>,
    pub complements: Vec<RelationshipView>,
    pub alternatives: Vec<RelationshipView>,
}

impl Recommendations {
    pub fn len(&self) -> usize {
        self.similar.len() + self.complements.len() + self.alternatives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Every outgoing discovered relationship of `product_id`, in edge order.
/// Structural edges are not included. Unknown products have none.
pub fn relationships(graph: &KnowledgeGraph, product_id: ProductId) -> Vec<RelationshipView> {
    graph
        .outgoing(&NodeKey::Product(product_id))
        .iter()
        .filter(|edge| !edge.source_derived && edge.relationship.is_discovered())
        .filter_map(|edge| {
            let NodeKey::Product(target_id) = &edge.target else {
                return None;
            };
            let target = graph.product(*target_id)?;
            Some(RelationshipView {
                product_id: target.id,
                sku: target.sku.clone(),
                title: target.display_title.clone(),
                category: target.category.clone(),
                brand: target.brand.clone(),
                price: target.price,
                relationship_type: edge.relationship,
                similarity_score: edge.similarity_score,
                reasoning: edge.reasoning.clone(),
            })
        })
        .collect()
}

/// Groups relationships by kind, highest score first (ties by lower product
/// id, absent scores rank as 0.0) and keeps at most `limit` per group.
pub fn recommendations(
    graph: &KnowledgeGraph,
    product_id: ProductId,
    limit: usize,
) -> Recommendations {
    let mut out = Recommendations::default();

    for view in relationships(graph, product_id) {
        match view.relationship_type {
            RelationshipType::SimilarTo => out.similar.push(view),
            RelationshipType::Complements => out.complements.push(view),
            RelationshipType::AlternativeTo => out.alternatives.push(view),
            RelationshipType::BelongsTo | RelationshipType::MadeBy => {}
        }
    }

    for group in [&mut out.similar, &mut out.complements, &mut out.alternatives] {
        group.sort_by(rank_order);
        group.truncate(limit);
    }

    out
}

fn rank_order(a: &RelationshipView, b: &RelationshipView) -> Ordering {
    b.rank_score()
        .total_cmp(&a.rank_score())
        .then(a.product_id.cmp(&b.product_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(id: ProductId, score: Option<f32>) -> RelationshipView {
        RelationshipView {
            product_id: id,
            sku: None,
            title: format!("Product {id}"),
            category: None,
            brand: None,
            price: None,
            relationship_type: RelationshipType::SimilarTo,
            similarity_score: score,
            reasoning: String::new(),
        }
    }

    #[test]
    fn test_rank_order_breaks_ties_by_id() {
        let mut views = vec![
            view(9, Some(0.7)),
            view(3, Some(0.9)),
            view(4, Some(0.7)),
            view(1, None),
        ];
        views.sort_by(rank_order);
        let ids: Vec<ProductId> = views.iter().map(|v| v.product_id).collect();
        assert_eq!(ids, vec![3, 4, 9, 1]);
    }

    #[test]
    fn test_missing_score_ranks_like_zero() {
        let mut views = vec![view(2, Some(0.0)), view(1, None)];
        views.sort_by(rank_order);
        assert_eq!(views[0].product_id, 1);
    }
}
