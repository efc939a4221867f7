use crate::index::graph::{BrandNode, CategoryNode, Edge, KnowledgeGraph, Node, NodeKey, ProductNode};
use catalog_core::error::{CatalogError, ErrorCode};
use catalog_core::model::{CatalogSnapshot, RelationshipType};
use serde::Serialize;
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),
    #[error("snapshot read failed: {0}")]
    SnapshotRead(#[from] anyhow::Error),
}

impl CatalogError for GraphError {
    fn error_code(&self) -> ErrorCode {
        match self {
            GraphError::InvalidSnapshot(_) => ErrorCode::InvalidArgument,
            GraphError::SnapshotRead(_) => ErrorCode::Unavailable,
        }
    }
}

/// Empty category and brand strings count as absent.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// What a build kept and what it tolerated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    pub products: usize,
    pub categories: usize,
    pub brands: usize,
    pub discovered_edges: usize,
    pub structural_edges: usize,
    /// Records whose source or target is not a product in the snapshot.
    pub dangling_skipped: usize,
    /// Records that are not a persistable discovered relationship.
    pub rejected_records: usize,
    /// Records that repeated an earlier `(source, target, type)` triple.
    pub duplicate_triples: usize,
}

/// Builds a fresh graph from a snapshot: nodes first, then persisted
/// relationships, then the structural `BELONGS_TO` / `MADE_BY` edges.
pub fn build_graph(snapshot: &CatalogSnapshot) -> Result<KnowledgeGraph, GraphError> {
    let mut graph = KnowledgeGraph::new();
    let mut report = BuildReport::default();

    let mut seen_ids = HashSet::with_capacity(snapshot.products.len());
    for product in &snapshot.products {
        if !seen_ids.insert(product.id) {
            return Err(GraphError::InvalidSnapshot(format!(
                "duplicate product id {}",
                product.id
            )));
        }
    }

    for product in &snapshot.products {
        graph.add_node(Node::Product(ProductNode {
            id: product.id,
            sku: product.sku.clone(),
            display_title: product.display_title().to_string(),
            category: present(&product.category).map(str::to_string),
            brand: present(&product.brand).map(str::to_string),
            price: product.price,
            semantic_tags: product.semantic_tags().to_vec(),
        }));
        report.products += 1;
    }

    for category in snapshot.products.iter().filter_map(|p| present(&p.category)) {
        if graph.add_node(Node::Category(CategoryNode {
            name: category.to_string(),
        })) {
            report.categories += 1;
        }
    }

    for brand in snapshot.products.iter().filter_map(|p| present(&p.brand)) {
        if graph.add_node(Node::Brand(BrandNode {
            name: brand.to_string(),
        })) {
            report.brands += 1;
        }
    }

    for record in &snapshot.relationships {
        if !record.relationship_type.is_discovered()
            || record
                .similarity_score
                .is_some_and(|score| !(0.0..=1.0).contains(&score))
        {
            debug!(
                source = record.source_id,
                target = record.target_id,
                relationship = %record.relationship_type,
                "rejecting persisted relationship record"
            );
            report.rejected_records += 1;
            continue;
        }
        if !seen_ids.contains(&record.source_id) || !seen_ids.contains(&record.target_id) {
            debug!(
                source = record.source_id,
                target = record.target_id,
                "skipping dangling relationship"
            );
            report.dangling_skipped += 1;
            continue;
        }

        let replaced = graph.upsert_edge(
            NodeKey::Product(record.source_id),
            Edge::discovered(
                record.target_id,
                record.relationship_type,
                record.similarity_score,
                record.reasoning.clone().unwrap_or_default(),
            ),
        );
        if replaced {
            report.duplicate_triples += 1;
        } else {
            report.discovered_edges += 1;
        }
    }

    for product in &snapshot.products {
        if let Some(category) = present(&product.category) {
            graph.push_edge(
                NodeKey::Product(product.id),
                Edge::structural(
                    NodeKey::Category(category.to_string()),
                    RelationshipType::BelongsTo,
                ),
            );
            report.structural_edges += 1;
        }
    }

    for product in &snapshot.products {
        if let Some(brand) = present(&product.brand) {
            graph.push_edge(
                NodeKey::Product(product.id),
                Edge::structural(NodeKey::Brand(brand.to_string()), RelationshipType::MadeBy),
            );
            report.structural_edges += 1;
        }
    }

    info!(
        products = report.products,
        categories = report.categories,
        brands = report.brands,
        discovered_edges = report.discovered_edges,
        structural_edges = report.structural_edges,
        dangling_skipped = report.dangling_skipped,
        rejected_records = report.rejected_records,
        "knowledge graph built"
    );

    graph.set_report(report);
    Ok(graph)
}
