use async_trait::async_trait;
use catalog_core::model::CatalogSnapshot;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot encoding error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Source of point-in-time catalog reads.
#[async_trait]
pub trait CatalogSnapshotReader: Send + Sync {
    async fn read_snapshot(&self) -> anyhow::Result<CatalogSnapshot>;
}

/// A catalog snapshot persisted as a single JSON document.
pub struct JsonSnapshotFile {
    path: PathBuf,
}

impl JsonSnapshotFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Atomically writes to a temp file then renames.
    pub async fn write(&self, snapshot: &CatalogSnapshot) -> Result<(), SnapshotError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).await?;
            }
        }

        let data = serde_json::to_vec_pretty(snapshot)?;
        let tmp_path = self.path.with_extension("tmp");

        fs::write(&tmp_path, data).await?;
        fs::rename(&tmp_path, &self.path).await?;

        Ok(())
    }

    pub async fn read(&self) -> Result<CatalogSnapshot, SnapshotError> {
        let data = fs::read(&self.path).await?;
        Ok(serde_json::from_slice(&data)?)
    }
}

#[async_trait]
impl CatalogSnapshotReader for JsonSnapshotFile {
    async fn read_snapshot(&self) -> anyhow::Result<CatalogSnapshot> {
        Ok(self.read().await?)
    }
}
