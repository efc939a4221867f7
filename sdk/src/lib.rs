//! Single entry point over the catalog graph: owns the published graph, the
//! discovery round and the batch orchestrator, and applies configured
//! defaults for limits and radii.

use catalog_core::config::AppConfig;
use catalog_core::error::{CatalogError, ErrorCode};
use catalog_core::metrics::MetricsSnapshot;
use catalog_core::model::ProductId;
use discovery::{DiscoveryError, DiscoveryOutcome, DiscoveryRound, RelationshipDiscoveryProvider};
use jobs::{BatchOrchestrator, BatchSummary, ProgressObserver};
use query::{Recommendations, RelationshipView, VisualizationGraph};
use scoring::ScoreBreakdown;
use std::sync::Arc;
use storage::index::GraphStats;
use storage::{
    CatalogSnapshotReader, GraphError, InMemoryCatalog, KnowledgeGraph, RelationshipStore,
    SharedGraph,
};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub use catalog_core;
pub use discovery;
pub use jobs;
pub use query;
pub use scoring;
pub use storage;

#[derive(Error, Debug)]
pub enum SdkError {
    #[error("product not found: {0}")]
    ProductNotFound(ProductId),
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
}

impl CatalogError for SdkError {
    fn error_code(&self) -> ErrorCode {
        match self {
            SdkError::ProductNotFound(_) => ErrorCode::NotFound,
            SdkError::Graph(err) => err.error_code(),
            SdkError::Discovery(err) => err.error_code(),
        }
    }
}

pub struct CatalogGraphClient {
    config: AppConfig,
    reader: Arc<dyn CatalogSnapshotReader>,
    graph: Arc<SharedGraph>,
    batch: BatchOrchestrator,
}

impl CatalogGraphClient {
    pub fn new(
        config: AppConfig,
        reader: Arc<dyn CatalogSnapshotReader>,
        store: Arc<dyn RelationshipStore>,
        provider: Arc<dyn RelationshipDiscoveryProvider>,
    ) -> Self {
        let graph = Arc::new(SharedGraph::empty());
        let round = DiscoveryRound::new(
            reader.clone(),
            store,
            provider,
            graph.clone(),
            config.discovery.clone(),
        );
        Self {
            config,
            reader,
            graph,
            batch: BatchOrchestrator::new(Arc::new(round)),
        }
    }

    /// Reads and writes through one in-memory catalog.
    pub fn in_memory(
        config: AppConfig,
        catalog: Arc<InMemoryCatalog>,
        provider: Arc<dyn RelationshipDiscoveryProvider>,
    ) -> Self {
        Self::new(config, catalog.clone(), catalog, provider)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub async fn graph(&self) -> Arc<KnowledgeGraph> {
        self.graph.current().await
    }

    /// Rebuilds the graph from a fresh snapshot.
    pub async fn refresh(&self) -> Result<GraphStats, SdkError> {
        let graph = self.graph.rebuild(self.reader.as_ref()).await?;
        let stats = graph.stats();
        info!(
            products = stats.products,
            discovered_edges = stats.discovered_edges,
            "catalog graph refreshed"
        );
        Ok(stats)
    }

    /// Grouped recommendations; `limit` falls back to the configured default.
    pub async fn recommendations(
        &self,
        product_id: ProductId,
        limit: Option<usize>,
    ) -> Recommendations {
        let limit = limit.unwrap_or(self.config.recommendations.default_limit);
        query::recommendations(&*self.graph().await, product_id, limit)
    }

    pub async fn relationships(&self, product_id: ProductId) -> Vec<RelationshipView> {
        query::relationships(&*self.graph().await, product_id)
    }

    pub async fn visualization(
        &self,
        center: Option<ProductId>,
        radius: Option<usize>,
    ) -> VisualizationGraph {
        let radius = radius.unwrap_or(self.config.visualization.default_radius);
        query::visualization_subgraph(&*self.graph().await, center, radius)
    }

    pub async fn discover(
        &self,
        product_id: ProductId,
        cancel: &CancellationToken,
    ) -> Result<DiscoveryOutcome, SdkError> {
        Ok(self.batch.round().discover(product_id, cancel).await?)
    }

    pub async fn run_batch(
        &self,
        product_ids: &[ProductId],
        observer: Option<&dyn ProgressObserver>,
        cancel: &CancellationToken,
    ) -> BatchSummary {
        self.batch.run_batch(product_ids, observer, cancel).await
    }

    /// Runs a batch over every product in the current snapshot.
    pub async fn run_catalog_batch(
        &self,
        observer: Option<&dyn ProgressObserver>,
        cancel: &CancellationToken,
    ) -> Result<BatchSummary, SdkError> {
        let snapshot = self
            .reader
            .read_snapshot()
            .await
            .map_err(GraphError::SnapshotRead)?;
        Ok(self
            .run_batch(&snapshot.product_ids(), observer, cancel)
            .await)
    }

    /// Scores a product as it currently stands in the catalog.
    pub async fn score_product(&self, product_id: ProductId) -> Result<ScoreBreakdown, SdkError> {
        let snapshot = self
            .reader
            .read_snapshot()
            .await
            .map_err(GraphError::SnapshotRead)?;
        let product = snapshot
            .product(product_id)
            .ok_or(SdkError::ProductNotFound(product_id))?;
        Ok(scoring::score_product(product))
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.batch.round().metrics().snapshot()
    }
}
