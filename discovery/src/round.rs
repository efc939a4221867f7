use crate::provider::{ProductSummary, ProposedRelationship, RawProposal, RelationshipDiscoveryProvider};
use crate::validate::{validate_proposals, DroppedProposal};
use catalog_core::config::DiscoveryConfig;
use catalog_core::error::{CatalogError, ErrorCode};
use catalog_core::metrics::DiscoveryMetrics;
use catalog_core::model::{ProductId, ProductRecord, RelationshipRecord};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use storage::{CatalogSnapshotReader, GraphError, RelationshipStore, SharedGraph};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("discovery provider unavailable: {0}")]
    Unavailable(String),
    #[error("product not found: {0}")]
    ProductNotFound(ProductId),
    #[error("relationship store error: {0}")]
    Store(anyhow::Error),
    #[error("graph error: {0}")]
    Graph(#[from] GraphError),
    #[error("discovery round cancelled")]
    Cancelled,
}

impl CatalogError for DiscoveryError {
    fn error_code(&self) -> ErrorCode {
        match self {
            DiscoveryError::Unavailable(_) => ErrorCode::Unavailable,
            DiscoveryError::ProductNotFound(_) => ErrorCode::NotFound,
            DiscoveryError::Store(_) => ErrorCode::Internal,
            DiscoveryError::Graph(err) => err.error_code(),
            DiscoveryError::Cancelled => ErrorCode::Cancelled,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscoveryOutcome {
    pub product_id: ProductId,
    pub candidates: usize,
    pub accepted: Vec<ProposedRelationship>,
    pub dropped: Vec<DroppedProposal>,
    /// False when the relationships were stored but the follow-up rebuild
    /// failed; the next successful rebuild picks them up.
    pub graph_refreshed: bool,
}

/// The first `limit` products other than the source, by ascending id.
pub fn select_candidates(
    source_id: ProductId,
    products: &[ProductRecord],
    limit: usize,
) -> Vec<&ProductRecord> {
    let mut candidates: Vec<&ProductRecord> =
        products.iter().filter(|p| p.id != source_id).collect();
    candidates.sort_by_key(|p| p.id);
    candidates.truncate(limit);
    candidates
}

/// One product's pass through the discovery provider: select candidates,
/// call the provider, validate, persist, rebuild.
pub struct DiscoveryRound {
    reader: Arc<dyn CatalogSnapshotReader>,
    store: Arc<dyn RelationshipStore>,
    provider: Arc<dyn RelationshipDiscoveryProvider>,
    graph: Arc<SharedGraph>,
    config: DiscoveryConfig,
    metrics: DiscoveryMetrics,
}

impl DiscoveryRound {
    pub fn new(
        reader: Arc<dyn CatalogSnapshotReader>,
        store: Arc<dyn RelationshipStore>,
        provider: Arc<dyn RelationshipDiscoveryProvider>,
        graph: Arc<SharedGraph>,
        config: DiscoveryConfig,
    ) -> Self {
        Self {
            reader,
            store,
            provider,
            graph,
            config,
            metrics: DiscoveryMetrics::new(),
        }
    }

    pub fn with_metrics(mut self, metrics: DiscoveryMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn metrics(&self) -> &DiscoveryMetrics {
        &self.metrics
    }

    pub fn graph(&self) -> &Arc<SharedGraph> {
        &self.graph
    }

    /// Runs a round for `product_id`. Cancellation is honored up to the point
    /// of persisting; once the store write starts the round runs to completion.
    pub async fn discover(
        &self,
        product_id: ProductId,
        cancel: &CancellationToken,
    ) -> Result<DiscoveryOutcome, DiscoveryError> {
        if cancel.is_cancelled() {
            self.metrics.record_cancelled();
            return Err(DiscoveryError::Cancelled);
        }

        let snapshot = self
            .reader
            .read_snapshot()
            .await
            .map_err(GraphError::SnapshotRead)?;
        let source = snapshot
            .product(product_id)
            .ok_or(DiscoveryError::ProductNotFound(product_id))?;

        let candidates: Vec<ProductSummary> =
            select_candidates(product_id, &snapshot.products, self.config.candidate_pool_limit)
                .into_iter()
                .map(ProductSummary::from)
                .collect();

        let raw = match self
            .call_provider(&ProductSummary::from(source), &candidates, cancel)
            .await
        {
            Ok(raw) => raw,
            Err(err) => {
                if matches!(err, DiscoveryError::Cancelled) {
                    self.metrics.record_cancelled();
                }
                return Err(err);
            }
        };

        let known: HashSet<ProductId> = snapshot.products.iter().map(|p| p.id).collect();
        let validated = validate_proposals(product_id, raw, &known, &self.config);
        for dropped in &validated.dropped {
            debug!(
                product_id,
                target = ?dropped.proposal.target_product_id,
                reason = dropped.reason.as_str(),
                "dropped proposal"
            );
            self.metrics.record_drop(dropped.reason.as_str());
        }

        if cancel.is_cancelled() {
            self.metrics.record_cancelled();
            return Err(DiscoveryError::Cancelled);
        }

        let mut graph_refreshed = false;
        if !validated.accepted.is_empty() {
            let records: Vec<RelationshipRecord> = validated
                .accepted
                .iter()
                .map(|p| {
                    RelationshipRecord::new(
                        product_id,
                        p.target_product_id,
                        p.relationship_type,
                        p.similarity_score,
                        p.reasoning.clone(),
                    )
                })
                .collect();
            self.store
                .upsert_batch(&records)
                .await
                .map_err(DiscoveryError::Store)?;

            match self.graph.rebuild(self.reader.as_ref()).await {
                Ok(graph) => {
                    self.metrics
                        .set_dangling(graph.build_report().dangling_skipped);
                    graph_refreshed = true;
                }
                Err(err) => {
                    warn!(product_id, error = %err, "relationships stored but graph rebuild failed");
                }
            }
        }

        self.metrics.record_round(validated.accepted.len());
        info!(
            product_id,
            candidates = candidates.len(),
            accepted = validated.accepted.len(),
            dropped = validated.dropped.len(),
            "discovery round complete"
        );

        Ok(DiscoveryOutcome {
            product_id,
            candidates: candidates.len(),
            accepted: validated.accepted,
            dropped: validated.dropped,
            graph_refreshed,
        })
    }

    async fn call_provider(
        &self,
        source: &ProductSummary,
        candidates: &[ProductSummary],
        cancel: &CancellationToken,
    ) -> Result<Vec<RawProposal>, DiscoveryError> {
        let attempts = self.config.retry_attempts.saturating_add(1);
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            if attempt > 1 {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(DiscoveryError::Cancelled),
                    _ = tokio::time::sleep(self.config.retry_backoff()) => {}
                }
            }

            let call = tokio::time::timeout(
                self.config.provider_timeout(),
                self.provider.propose(source, candidates),
            );
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(DiscoveryError::Cancelled),
                result = call => result,
            };

            match result {
                Ok(Ok(raw)) => return Ok(raw),
                Ok(Err(err)) => {
                    warn!(product_id = source.id, attempt, error = %err, "discovery provider failed");
                    last_error = err.to_string();
                }
                Err(_) => {
                    warn!(product_id = source.id, attempt, "discovery provider timed out");
                    last_error = format!(
                        "timed out after {} ms",
                        self.config.provider_timeout_ms
                    );
                }
            }
            self.metrics.record_provider_failure();
        }

        Err(DiscoveryError::Unavailable(last_error))
    }
}
