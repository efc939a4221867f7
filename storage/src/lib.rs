pub mod builder;
pub mod index;
pub mod published;
pub mod repo;
pub mod snapshot;

pub use builder::{build_graph, BuildReport, GraphError};
pub use index::{KnowledgeGraph, Node, NodeKey};
pub use published::SharedGraph;
pub use repo::{InMemoryCatalog, RelationshipStore, RepoError};
pub use snapshot::{CatalogSnapshotReader, JsonSnapshotFile, SnapshotError};
