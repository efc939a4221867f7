pub mod recommend;
pub mod subgraph;

pub use recommend::{recommendations, relationships, Recommendations, RelationshipView};
pub use subgraph::{visualization_subgraph, VisualizationEdge, VisualizationGraph, VisualizationNode};
