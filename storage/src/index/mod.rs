pub mod graph;

pub use graph::{BrandNode, CategoryNode, Edge, GraphStats, KnowledgeGraph, Node, NodeKey, ProductNode};
