use catalog_core::model::{CatalogSnapshot, ProductRecord, RelationshipRecord, RelationshipType};
use storage::{CatalogSnapshotReader, JsonSnapshotFile, SharedGraph};
use tempfile::tempdir;

fn sample_snapshot() -> CatalogSnapshot {
    CatalogSnapshot {
        products: vec![
            ProductRecord::new(1, "Espresso Machine")
                .with_sku("ESP-001")
                .with_category("Kitchen")
                .with_brand("Brewly"),
            ProductRecord::new(2, "Milk Frother").with_category("Kitchen"),
        ],
        relationships: vec![RelationshipRecord::new(
            1,
            2,
            RelationshipType::Complements,
            0.82,
            "Frothed milk for lattes",
        )],
    }
}

#[tokio::test]
async fn test_json_snapshot_write_then_read() {
    let dir = tempdir().unwrap();
    let file = JsonSnapshotFile::new(dir.path().join("nested/catalog.json"));

    file.write(&sample_snapshot()).await.unwrap();
    let loaded = file.read_snapshot().await.unwrap();

    assert_eq!(loaded, sample_snapshot());
    assert!(!file.path().with_extension("tmp").exists());
}

#[tokio::test]
async fn test_missing_snapshot_file_keeps_previous_graph() {
    let dir = tempdir().unwrap();
    let file = JsonSnapshotFile::new(dir.path().join("catalog.json"));
    file.write(&sample_snapshot()).await.unwrap();

    let shared = SharedGraph::empty();
    let first = shared.rebuild(&file).await.unwrap();
    assert_eq!(first.stats().products, 2);

    std::fs::remove_file(file.path()).unwrap();
    assert!(shared.rebuild(&file).await.is_err());

    let current = shared.current().await;
    assert_eq!(current.stats().products, 2);
    assert_eq!(current.product(1).unwrap().sku.as_deref(), Some("ESP-001"));
}

#[tokio::test]
async fn test_readers_keep_their_graph_across_publish() {
    let shared = SharedGraph::empty();
    let before = shared.current().await;

    let dir = tempdir().unwrap();
    let file = JsonSnapshotFile::new(dir.path().join("catalog.json"));
    file.write(&sample_snapshot()).await.unwrap();
    shared.rebuild(&file).await.unwrap();

    assert_eq!(before.node_count(), 0);
    assert_eq!(shared.current().await.node_count(), 4);
}
