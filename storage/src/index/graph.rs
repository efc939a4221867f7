use catalog_core::model::{ProductId, RelationshipType};
use serde::Serialize;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

use crate::builder::BuildReport;

/// Identity of a node. Renders as `"42"`, `"category:<name>"` or `"brand:<name>"`,
/// so product keys never collide with category or brand keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKey {
    Product(ProductId),
    Category(String),
    Brand(String),
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKey::Product(id) => write!(f, "{id}"),
            NodeKey::Category(name) => write!(f, "category:{name}"),
            NodeKey::Brand(name) => write!(f, "brand:{name}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductNode {
    pub id: ProductId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    pub display_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    pub semantic_tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryNode {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrandNode {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "node_type", rename_all = "snake_case")]
pub enum Node {
    Product(ProductNode),
    Category(CategoryNode),
    Brand(BrandNode),
}

impl Node {
    pub fn key(&self) -> NodeKey {
        match self {
            Node::Product(p) => NodeKey::Product(p.id),
            Node::Category(c) => NodeKey::Category(c.name.clone()),
            Node::Brand(b) => NodeKey::Brand(b.name.clone()),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Node::Product(_) => "product",
            Node::Category(_) => "category",
            Node::Brand(_) => "brand",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub target: NodeKey,
    pub relationship: RelationshipType,
    pub similarity_score: Option<f32>,
    pub reasoning: String,
    /// Set on `BELONGS_TO`/`MADE_BY` edges, which are regenerated from the
    /// source product's own fields on every build.
    pub source_derived: bool,
}

impl Edge {
    pub fn discovered(
        target: ProductId,
        relationship: RelationshipType,
        similarity_score: Option<f32>,
        reasoning: impl Into<String>,
    ) -> Self {
        Self {
            target: NodeKey::Product(target),
            relationship,
            similarity_score,
            reasoning: reasoning.into(),
            source_derived: false,
        }
    }

    pub fn structural(target: NodeKey, relationship: RelationshipType) -> Self {
        Self {
            target,
            relationship,
            similarity_score: None,
            reasoning: String::new(),
            source_derived: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    pub products: usize,
    pub categories: usize,
    pub brands: usize,
    pub discovered_edges: usize,
    pub structural_edges: usize,
}

/// Adjacency-list knowledge graph over products, categories and brands.
///
/// Only [`crate::builder::build_graph`] mutates a graph; everyone else holds it
/// behind an `Arc` and reads.
#[derive(Debug, Default)]
pub struct KnowledgeGraph {
    nodes: HashMap<NodeKey, Node>,
    order: Vec<NodeKey>,
    adjacency: HashMap<NodeKey, Vec<Edge>>,
    incoming: HashMap<NodeKey, Vec<NodeKey>>,
    report: BuildReport,
}

impl KnowledgeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` and leaves the graph untouched if the key is taken.
    pub(crate) fn add_node(&mut self, node: Node) -> bool {
        let key = node.key();
        if self.nodes.contains_key(&key) {
            return false;
        }
        self.order.push(key.clone());
        self.nodes.insert(key, node);
        true
    }

    /// Inserts a product→product edge, replacing any existing edge with the
    /// same target and relationship. Returns `true` when it replaced one.
    pub(crate) fn upsert_edge(&mut self, source: NodeKey, edge: Edge) -> bool {
        let edges = self.adjacency.entry(source.clone()).or_default();
        if let Some(existing) = edges
            .iter_mut()
            .find(|e| e.target == edge.target && e.relationship == edge.relationship)
        {
            *existing = edge;
            return true;
        }
        self.incoming
            .entry(edge.target.clone())
            .or_default()
            .push(source);
        edges.push(edge);
        false
    }

    pub(crate) fn push_edge(&mut self, source: NodeKey, edge: Edge) {
        self.incoming
            .entry(edge.target.clone())
            .or_default()
            .push(source.clone());
        self.adjacency.entry(source).or_default().push(edge);
    }

    pub(crate) fn set_report(&mut self, report: BuildReport) {
        self.report = report;
    }

    pub fn build_report(&self) -> &BuildReport {
        &self.report
    }

    pub fn contains(&self, key: &NodeKey) -> bool {
        self.nodes.contains_key(key)
    }

    pub fn node(&self, key: &NodeKey) -> Option<&Node> {
        self.nodes.get(key)
    }

    pub fn product(&self, id: ProductId) -> Option<&ProductNode> {
        match self.nodes.get(&NodeKey::Product(id)) {
            Some(Node::Product(product)) => Some(product),
            _ => None,
        }
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.order.iter().filter_map(|key| self.nodes.get(key))
    }

    pub fn outgoing(&self, key: &NodeKey) -> &[Edge] {
        self.adjacency
            .get(key)
            .map(|edges| edges.as_slice())
            .unwrap_or_default()
    }

    /// All edges as `(source, edge)`, grouped by source in node insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (&NodeKey, &Edge)> {
        self.order
            .iter()
            .flat_map(move |key| self.outgoing(key).iter().map(move |edge| (key, edge)))
    }

    /// Neighbors ignoring direction.
    pub fn neighbors_undirected<'a>(&'a self, key: &'a NodeKey) -> impl Iterator<Item = &'a NodeKey> {
        let out = self.outgoing(key).iter().map(|edge| &edge.target);
        let inc = self
            .incoming
            .get(key)
            .map(|sources| sources.as_slice())
            .unwrap_or_default()
            .iter();
        out.chain(inc)
    }

    /// Nodes within `radius` hops of `center`, treating edges as undirected.
    /// Center first, then breadth-first discovery order. Empty if `center` is unknown.
    pub fn neighborhood(&self, center: &NodeKey, radius: usize) -> Vec<NodeKey> {
        if !self.contains(center) {
            return Vec::new();
        }

        let mut visited: HashSet<&NodeKey> = HashSet::new();
        let mut frontier: VecDeque<(&NodeKey, usize)> = VecDeque::new();
        let mut result = Vec::new();

        visited.insert(center);
        frontier.push_back((center, 0));

        while let Some((current, depth)) = frontier.pop_front() {
            result.push(current.clone());
            if depth == radius {
                continue;
            }
            for neighbor in self.neighbors_undirected(current) {
                if visited.insert(neighbor) {
                    frontier.push_back((neighbor, depth + 1));
                }
            }
        }

        result
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(|v| v.len()).sum()
    }

    pub fn stats(&self) -> GraphStats {
        let mut stats = GraphStats::default();
        for node in self.nodes.values() {
            match node {
                Node::Product(_) => stats.products += 1,
                Node::Category(_) => stats.categories += 1,
                Node::Brand(_) => stats.brands += 1,
            }
        }
        for edge in self.adjacency.values().flatten() {
            if edge.source_derived {
                stats.structural_edges += 1;
            } else {
                stats.discovered_edges += 1;
            }
        }
        stats
    }
}
