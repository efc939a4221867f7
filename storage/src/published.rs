use crate::builder::{build_graph, GraphError};
use crate::index::graph::KnowledgeGraph;
use crate::snapshot::CatalogSnapshotReader;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// The currently published graph. Rebuilds construct a complete new graph
/// off to the side and swap it in, so readers only ever see whole graphs.
pub struct SharedGraph {
    current: RwLock<Arc<KnowledgeGraph>>,
    rebuild_lock: Mutex<()>,
}

impl SharedGraph {
    pub fn new(graph: KnowledgeGraph) -> Self {
        Self {
            current: RwLock::new(Arc::new(graph)),
            rebuild_lock: Mutex::new(()),
        }
    }

    pub fn empty() -> Self {
        Self::new(KnowledgeGraph::new())
    }

    pub async fn current(&self) -> Arc<KnowledgeGraph> {
        self.current.read().await.clone()
    }

    pub async fn publish(&self, graph: KnowledgeGraph) -> Arc<KnowledgeGraph> {
        let graph = Arc::new(graph);
        *self.current.write().await = graph.clone();
        graph
    }

    /// Reads a fresh snapshot, builds from it and publishes the result. On
    /// error the previously published graph stays in place.
    pub async fn rebuild(
        &self,
        reader: &dyn CatalogSnapshotReader,
    ) -> Result<Arc<KnowledgeGraph>, GraphError> {
        let _guard = self.rebuild_lock.lock().await;
        let snapshot = reader.read_snapshot().await?;
        let graph = build_graph(&snapshot)?;
        Ok(self.publish(graph).await)
    }
}

impl Default for SharedGraph {
    fn default() -> Self {
        Self::empty()
    }
}
