use crate::snapshot::CatalogSnapshotReader;
use async_trait::async_trait;
use catalog_core::model::{
    CatalogSnapshot, Enrichment, ProductId, ProductRecord, RelationshipRecord, RelationshipType,
};
use std::collections::BTreeMap;
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Error, Debug, PartialEq)]
pub enum RepoError {
    #[error("product not found: {0}")]
    NotFound(ProductId),
    #[error("invalid relationship record: {0}")]
    InvalidRecord(String),
}

/// Writes and reads persisted discovered relationships.
///
/// Upserts are keyed by `(source, target, type)`: writing the same triple again
/// replaces the earlier record.
#[async_trait]
pub trait RelationshipStore: Send + Sync {
    /// All-or-nothing: either every record is stored or none is.
    async fn upsert_batch(&self, records: &[RelationshipRecord]) -> anyhow::Result<()>;

    async fn upsert(&self, record: RelationshipRecord) -> anyhow::Result<()> {
        self.upsert_batch(std::slice::from_ref(&record)).await
    }

    async fn relationships_from(&self, source: ProductId)
        -> anyhow::Result<Vec<RelationshipRecord>>;
}

type Triple = (ProductId, ProductId, RelationshipType);

/// Catalog held in memory. Serves snapshots and stores relationships.
#[derive(Default)]
pub struct InMemoryCatalog {
    products: RwLock<BTreeMap<ProductId, ProductRecord>>,
    relationships: RwLock<BTreeMap<Triple, RelationshipRecord>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_products(products: impl IntoIterator<Item = ProductRecord>) -> Self {
        let products = products.into_iter().map(|p| (p.id, p)).collect();
        Self {
            products: RwLock::new(products),
            relationships: RwLock::new(BTreeMap::new()),
        }
    }

    pub async fn put_product(&self, product: ProductRecord) {
        self.products.write().await.insert(product.id, product);
    }

    pub async fn set_enrichment(
        &self,
        id: ProductId,
        enrichment: Enrichment,
    ) -> Result<(), RepoError> {
        let mut products = self.products.write().await;
        let product = products.get_mut(&id).ok_or(RepoError::NotFound(id))?;
        product.enrichment = Some(enrichment);
        Ok(())
    }

    pub async fn product(&self, id: ProductId) -> Option<ProductRecord> {
        self.products.read().await.get(&id).cloned()
    }

    pub async fn relationship_count(&self) -> usize {
        self.relationships.read().await.len()
    }
}

fn validate_record(record: &RelationshipRecord) -> Result<(), RepoError> {
    if !record.relationship_type.is_discovered() {
        return Err(RepoError::InvalidRecord(format!(
            "{} relationships are derived, not stored",
            record.relationship_type
        )));
    }
    if record.source_id == record.target_id {
        return Err(RepoError::InvalidRecord(format!(
            "self relationship on product {}",
            record.source_id
        )));
    }
    Ok(())
}

#[async_trait]
impl RelationshipStore for InMemoryCatalog {
    async fn upsert_batch(&self, records: &[RelationshipRecord]) -> anyhow::Result<()> {
        for record in records {
            validate_record(record)?;
        }

        let mut relationships = self.relationships.write().await;
        for record in records {
            relationships.insert(record.triple(), record.clone());
        }
        Ok(())
    }

    async fn relationships_from(
        &self,
        source: ProductId,
    ) -> anyhow::Result<Vec<RelationshipRecord>> {
        let relationships = self.relationships.read().await;
        Ok(relationships
            .values()
            .filter(|r| r.source_id == source)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CatalogSnapshotReader for InMemoryCatalog {
    async fn read_snapshot(&self) -> anyhow::Result<CatalogSnapshot> {
        let products = self.products.read().await;
        let relationships = self.relationships.read().await;
        Ok(CatalogSnapshot {
            products: products.values().cloned().collect(),
            relationships: relationships.values().cloned().collect(),
        })
    }
}
