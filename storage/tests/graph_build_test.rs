use catalog_core::model::{
    CatalogSnapshot, Enrichment, ProductRecord, RelationshipRecord, RelationshipType,
};
use storage::index::{Node, NodeKey};
use storage::{build_graph, InMemoryCatalog, RelationshipStore, SharedGraph};

fn catalog_products() -> Vec<ProductRecord> {
    vec![
        ProductRecord::new(1, "Acme Wireless Mouse")
            .with_category("Peripherals")
            .with_brand("Acme")
            .with_price(29.99)
            .with_enrichment(Enrichment {
                enriched_title: Some("Acme Ergonomic Wireless Mouse".to_string()),
                semantic_tags: vec!["wireless".to_string(), "ergonomic".to_string()],
                ..Enrichment::default()
            }),
        ProductRecord::new(2, "Acme Keyboard")
            .with_category("Peripherals")
            .with_brand("Acme"),
        ProductRecord::new(3, "Mouse Pad").with_category("Accessories"),
        ProductRecord::new(4, "USB Hub"),
    ]
}

fn count_edges(graph: &storage::KnowledgeGraph, id: u64, kind: RelationshipType) -> usize {
    graph
        .outgoing(&NodeKey::Product(id))
        .iter()
        .filter(|e| e.relationship == kind)
        .count()
}

#[test]
fn test_product_nodes_use_display_title_and_keep_absent_fields() {
    let snapshot = CatalogSnapshot {
        products: catalog_products(),
        relationships: vec![],
    };
    let graph = build_graph(&snapshot).unwrap();

    let mouse = graph.product(1).unwrap();
    assert_eq!(mouse.display_title, "Acme Ergonomic Wireless Mouse");
    assert_eq!(mouse.price, Some(29.99));
    assert_eq!(mouse.semantic_tags, vec!["wireless", "ergonomic"]);

    let hub = graph.product(4).unwrap();
    assert_eq!(hub.display_title, "USB Hub");
    assert!(hub.category.is_none());
    assert!(hub.brand.is_none());
    assert!(hub.price.is_none());
}

#[test]
fn test_category_and_brand_nodes_follow_first_seen_order() {
    let snapshot = CatalogSnapshot {
        products: catalog_products(),
        relationships: vec![],
    };
    let graph = build_graph(&snapshot).unwrap();

    let keys: Vec<String> = graph.nodes().map(|n| n.key().to_string()).collect();
    assert_eq!(
        keys,
        vec![
            "1",
            "2",
            "3",
            "4",
            "category:Peripherals",
            "category:Accessories",
            "brand:Acme"
        ]
    );
    assert!(matches!(
        graph.node(&NodeKey::Brand("Acme".to_string())),
        Some(Node::Brand(_))
    ));
}

#[tokio::test]
async fn test_rebuild_regenerates_exactly_one_structural_edge_each() {
    let catalog = InMemoryCatalog::with_products(catalog_products());
    let shared = SharedGraph::empty();

    for _ in 0..3 {
        let graph = shared.rebuild(&catalog).await.unwrap();
        assert_eq!(count_edges(&graph, 1, RelationshipType::BelongsTo), 1);
        assert_eq!(count_edges(&graph, 1, RelationshipType::MadeBy), 1);
        assert_eq!(count_edges(&graph, 3, RelationshipType::BelongsTo), 1);
        assert_eq!(count_edges(&graph, 3, RelationshipType::MadeBy), 0);
    }

    // Structural edges never reach the store.
    assert_eq!(catalog.relationship_count().await, 0);
}

#[tokio::test]
async fn test_upserted_triple_appears_once_with_latest_score() {
    let catalog = InMemoryCatalog::with_products(catalog_products());
    catalog
        .upsert(RelationshipRecord::new(1, 2, RelationshipType::Complements, 0.7, "pairs well"))
        .await
        .unwrap();
    catalog
        .upsert(RelationshipRecord::new(1, 2, RelationshipType::Complements, 0.95, "desk setup"))
        .await
        .unwrap();

    let shared = SharedGraph::empty();
    let graph = shared.rebuild(&catalog).await.unwrap();

    let edges: Vec<_> = graph
        .outgoing(&NodeKey::Product(1))
        .iter()
        .filter(|e| e.relationship == RelationshipType::Complements)
        .collect();
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].similarity_score, Some(0.95));
    assert_eq!(edges[0].reasoning, "desk setup");
    assert!(!edges[0].source_derived);
}

#[test]
fn test_dangling_relationships_are_skipped_and_counted() {
    let snapshot = CatalogSnapshot {
        products: catalog_products(),
        relationships: vec![
            RelationshipRecord::new(1, 2, RelationshipType::SimilarTo, 0.8, "same family"),
            RelationshipRecord::new(1, 404, RelationshipType::SimilarTo, 0.9, "gone"),
            RelationshipRecord::new(505, 1, RelationshipType::AlternativeTo, 0.9, "gone too"),
        ],
    };
    let graph = build_graph(&snapshot).unwrap();

    let report = graph.build_report();
    assert_eq!(report.discovered_edges, 1);
    assert_eq!(report.dangling_skipped, 2);
    assert!(!graph.contains(&NodeKey::Product(404)));
    assert_eq!(count_edges(&graph, 1, RelationshipType::SimilarTo), 1);
}

#[test]
fn test_empty_category_and_brand_are_treated_as_absent() {
    let snapshot = CatalogSnapshot {
        products: vec![
            ProductRecord::new(1, "Mouse").with_category("").with_brand(""),
            ProductRecord::new(2, "Keyboard").with_category("Peripherals"),
        ],
        relationships: vec![],
    };
    let graph = build_graph(&snapshot).unwrap();

    let keys: Vec<String> = graph.nodes().map(|n| n.key().to_string()).collect();
    assert_eq!(keys, vec!["1", "2", "category:Peripherals"]);
    assert!(graph.outgoing(&NodeKey::Product(1)).is_empty());
    assert_eq!(graph.build_report().structural_edges, 1);

    let product = graph.product(1).unwrap();
    assert_eq!(product.category, None);
    assert_eq!(product.brand, None);
}

#[test]
fn test_duplicate_triples_in_snapshot_collapse_to_last() {
    let snapshot = CatalogSnapshot {
        products: catalog_products(),
        relationships: vec![
            RelationshipRecord::new(1, 3, RelationshipType::Complements, 0.6, "old"),
            RelationshipRecord::new(1, 3, RelationshipType::Complements, 0.8, "new"),
        ],
    };
    let graph = build_graph(&snapshot).unwrap();
    assert_eq!(graph.build_report().duplicate_triples, 1);

    let edge = graph
        .outgoing(&NodeKey::Product(1))
        .iter()
        .find(|e| e.relationship == RelationshipType::Complements)
        .unwrap();
    assert_eq!(edge.similarity_score, Some(0.8));
}
