use catalog_core::model::ProductId;
use serde::Serialize;
use std::collections::HashSet;
use storage::index::{KnowledgeGraph, Node, NodeKey};

pub const DEFAULT_RADIUS: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisualizationNode {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub node_type: String,
    pub group: String,
    pub raw_attributes: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisualizationEdge {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub edge_type: String,
    pub score: f32,
    pub reasoning: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VisualizationGraph {
    pub nodes: Vec<VisualizationNode>,
    pub edges: Vec<VisualizationEdge>,
}

/// Exports the graph for rendering.
///
/// With a center, only nodes within `radius` undirected hops are kept, along
/// with every edge between two kept nodes. Without a center, or when the
/// center is not in the graph, the whole graph is exported.
pub fn visualization_subgraph(
    graph: &KnowledgeGraph,
    center: Option<ProductId>,
    radius: usize,
) -> VisualizationGraph {
    let keep: Option<HashSet<NodeKey>> = center
        .map(|id| graph.neighborhood(&NodeKey::Product(id), radius))
        .filter(|keys| !keys.is_empty())
        .map(|keys| keys.into_iter().collect());
    let included = |key: &NodeKey| keep.as_ref().map_or(true, |set| set.contains(key));

    let nodes = graph
        .nodes()
        .filter(|node| included(&node.key()))
        .map(export_node)
        .collect();

    let edges = graph
        .edges()
        .filter(|(source, edge)| included(*source) && included(&edge.target))
        .map(|(source, edge)| VisualizationEdge {
            source: source.to_string(),
            target: edge.target.to_string(),
            edge_type: edge.relationship.to_string(),
            score: edge.similarity_score.unwrap_or(0.0),
            reasoning: edge.reasoning.clone(),
        })
        .collect();

    VisualizationGraph { nodes, edges }
}

fn export_node(node: &Node) -> VisualizationNode {
    let (label, group) = match node {
        Node::Product(product) => (
            product.display_title.clone(),
            product
                .category
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
        ),
        Node::Category(category) => (category.name.clone(), "Category".to_string()),
        Node::Brand(brand) => (brand.name.clone(), "Brand".to_string()),
    };

    VisualizationNode {
        id: node.key().to_string(),
        label,
        node_type: node.kind().to_string(),
        group,
        raw_attributes: serde_json::to_value(node).unwrap_or(serde_json::Value::Null),
    }
}
