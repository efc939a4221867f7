use crate::progress::{BatchProgress, ProgressObserver};
use catalog_core::model::ProductId;
use discovery::{DiscoveryError, DiscoveryRound};
use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub processed: usize,
    pub relationships_created: usize,
    pub failed: usize,
    pub cancelled: bool,
}

/// Runs discovery over many products, one at a time.
pub struct BatchOrchestrator {
    round: Arc<DiscoveryRound>,
}

impl BatchOrchestrator {
    pub fn new(round: Arc<DiscoveryRound>) -> Self {
        Self { round }
    }

    pub fn round(&self) -> &Arc<DiscoveryRound> {
        &self.round
    }

    /// Processes `product_ids` in ascending order, duplicates collapsed.
    ///
    /// A failing product is logged and counted but does not stop the batch.
    /// Cancellation is checked before each product; a round that is already
    /// in flight when the token fires aborts without persisting and is not
    /// counted as processed.
    pub async fn run_batch(
        &self,
        product_ids: &[ProductId],
        observer: Option<&dyn ProgressObserver>,
        cancel: &CancellationToken,
    ) -> BatchSummary {
        let mut ids = product_ids.to_vec();
        ids.sort_unstable();
        ids.dedup();

        let mut summary = BatchSummary {
            total: ids.len(),
            ..BatchSummary::default()
        };
        info!(total = summary.total, "batch discovery started");

        for product_id in ids {
            if cancel.is_cancelled() {
                summary.cancelled = true;
                break;
            }

            let found = match self.round.discover(product_id, cancel).await {
                Ok(outcome) => outcome.accepted.len(),
                Err(DiscoveryError::Cancelled) => {
                    summary.cancelled = true;
                    break;
                }
                Err(e) => {
                    error!(product_id, error = %e, "discovery failed");
                    summary.failed += 1;
                    0
                }
            };

            summary.processed += 1;
            summary.relationships_created += found;

            if let Some(observer) = observer {
                observer
                    .on_progress(&BatchProgress {
                        product_id,
                        processed: summary.processed,
                        total: summary.total,
                        relationships_found: found,
                    })
                    .await;
            }
        }

        if summary.cancelled {
            warn!(
                processed = summary.processed,
                total = summary.total,
                "batch discovery cancelled"
            );
        } else {
            info!(
                processed = summary.processed,
                relationships = summary.relationships_created,
                failed = summary.failed,
                "batch discovery finished"
            );
        }
        summary
    }
}
