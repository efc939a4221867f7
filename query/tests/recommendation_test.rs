use catalog_core::model::{CatalogSnapshot, ProductRecord, RelationshipRecord, RelationshipType};
use query::{recommendations, relationships};
use storage::build_graph;

fn products(n: u64) -> Vec<ProductRecord> {
    (1..=n)
        .map(|id| {
            ProductRecord::new(id, format!("Product {id}"))
                .with_category("Lighting")
                .with_brand("Lumen")
        })
        .collect()
}

fn rel(target: u64, kind: RelationshipType, score: f32) -> RelationshipRecord {
    RelationshipRecord::new(1, target, kind, score, format!("reason {target}"))
}

#[test]
fn test_groups_are_capped_and_sorted_by_score() {
    let snapshot = CatalogSnapshot {
        products: products(10),
        relationships: vec![
            rel(2, RelationshipType::SimilarTo, 0.6),
            rel(3, RelationshipType::SimilarTo, 0.9),
            rel(4, RelationshipType::SimilarTo, 0.7),
            rel(5, RelationshipType::SimilarTo, 0.7),
            rel(6, RelationshipType::SimilarTo, 0.55),
            rel(7, RelationshipType::SimilarTo, 0.95),
            rel(8, RelationshipType::SimilarTo, 0.5),
            rel(9, RelationshipType::Complements, 0.8),
            rel(10, RelationshipType::AlternativeTo, 0.65),
        ],
    };
    let graph = build_graph(&snapshot).unwrap();

    let recs = recommendations(&graph, 1, 5);
    let similar: Vec<u64> = recs.similar.iter().map(|v| v.product_id).collect();
    assert_eq!(similar, vec![7, 3, 4, 5, 2]);
    assert_eq!(recs.complements.len(), 1);
    assert_eq!(recs.complements[0].product_id, 9);
    assert_eq!(recs.alternatives[0].product_id, 10);
    assert_eq!(recs.alternatives[0].reasoning, "reason 10");
    assert_eq!(recs.len(), 7);
}

#[test]
fn test_structural_edges_never_surface() {
    let graph = build_graph(&CatalogSnapshot {
        products: products(3),
        relationships: vec![],
    })
    .unwrap();

    assert!(relationships(&graph, 1).is_empty());
    assert!(recommendations(&graph, 1, 5).is_empty());
}

#[test]
fn test_unknown_product_has_no_recommendations() {
    let graph = build_graph(&CatalogSnapshot {
        products: products(2),
        relationships: vec![rel(2, RelationshipType::SimilarTo, 0.9)],
    })
    .unwrap();

    assert!(recommendations(&graph, 404, 5).is_empty());
}

#[test]
fn test_view_carries_target_product_fields() {
    let mut catalog = products(2);
    catalog[1] = ProductRecord::new(2, "Desk Lamp")
        .with_sku("LMP-002")
        .with_price(49.5)
        .with_category("Lighting");
    let graph = build_graph(&CatalogSnapshot {
        products: catalog,
        relationships: vec![rel(2, RelationshipType::Complements, 0.75)],
    })
    .unwrap();

    let views = relationships(&graph, 1);
    assert_eq!(views.len(), 1);
    let view = &views[0];
    assert_eq!(view.title, "Desk Lamp");
    assert_eq!(view.sku.as_deref(), Some("LMP-002"));
    assert_eq!(view.price, Some(49.5));
    assert_eq!(view.brand, None);
    assert_eq!(view.similarity_score, Some(0.75));
}
