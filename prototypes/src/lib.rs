//! Deterministic synthetic catalogs for benchmarks and load experiments.

use catalog_core::model::{
    CatalogSnapshot, Enrichment, Faq, KeyAttribute, ProductId, ProductRecord, RelationshipRecord,
    RelationshipType,
};
use discovery::{RawProposal, StaticDiscoveryProvider};

const CATEGORIES: [&str; 6] = ["Lighting", "Audio", "Kitchen", "Outdoor", "Office", "Bath"];
const BRANDS: [&str; 4] = ["Lumen", "Acme", "Northwind", "Contoso"];
const KINDS: [RelationshipType; 3] = RelationshipType::DISCOVERED;

/// `n` products with ids `1..=n`. Every third product carries an enrichment,
/// every fifth has no brand.
pub fn synthetic_products(n: u64) -> Vec<ProductRecord> {
    (1..=n)
        .map(|id| {
            let category = CATEGORIES[(id % CATEGORIES.len() as u64) as usize];
            let mut product = ProductRecord::new(id, format!("Item {id} {category}"))
                .with_sku(format!("SKU-{id:06}"))
                .with_category(category)
                .with_price(5.0 + (id % 200) as f64);
            if id % 5 != 0 {
                let brand = BRANDS[(id % BRANDS.len() as u64) as usize];
                product = product.with_brand(brand);
            }
            if id % 3 == 0 {
                product = product.with_enrichment(synthetic_enrichment(id, category));
            }
            product
        })
        .collect()
}

fn synthetic_enrichment(id: ProductId, category: &str) -> Enrichment {
    Enrichment {
        enriched_title: Some(format!(
            "Item {id} premium {category} essential for everyday home use"
        )),
        long_description: Some(format!("A dependable {category} product. ").repeat(40)),
        key_attributes: (0..6)
            .map(|i| KeyAttribute {
                name: format!("attr{i}"),
                value: format!("value{i}"),
            })
            .collect(),
        faqs: (0..3)
            .map(|i| Faq {
                question: format!("Question {i}?"),
                answer: format!("Answer {i}."),
            })
            .collect(),
        semantic_tags: vec![category.to_lowercase(), "home".to_string(), "gift".to_string()],
        use_cases: vec!["daily".to_string(), "travel".to_string()],
    }
}

/// Discovered relationships linking each product to its next `fan_out` ids,
/// cycling through the discovered kinds.
pub fn synthetic_relationships(n: u64, fan_out: u64) -> Vec<RelationshipRecord> {
    let mut out = Vec::new();
    for source in 1..=n {
        for step in 1..=fan_out {
            let target = (source + step - 1) % n + 1;
            if target == source {
                continue;
            }
            let kind = KINDS[((source + step) % 3) as usize];
            let score = 0.5 + ((source * 7 + step) % 50) as f32 / 100.0;
            out.push(RelationshipRecord::new(
                source,
                target,
                kind,
                score,
                format!("synthetic link {source}->{target}"),
            ));
        }
    }
    out
}

pub fn synthetic_catalog(n: u64, fan_out: u64) -> CatalogSnapshot {
    CatalogSnapshot {
        products: synthetic_products(n),
        relationships: synthetic_relationships(n, fan_out),
    }
}

/// A provider that proposes the next `fan_out` products for every source.
pub fn synthetic_provider(n: u64, fan_out: u64) -> StaticDiscoveryProvider {
    synthetic_relationships(n, fan_out)
        .into_iter()
        .fold(
            std::collections::BTreeMap::<ProductId, Vec<RawProposal>>::new(),
            |mut by_source, record| {
                by_source.entry(record.source_id).or_default().push(RawProposal::new(
                    record.target_id,
                    record.relationship_type.as_str(),
                    f64::from(record.similarity_score.unwrap_or(0.5)),
                    record.reasoning.unwrap_or_default(),
                ));
                by_source
            },
        )
        .into_iter()
        .fold(StaticDiscoveryProvider::new(), |provider, (source, proposals)| {
            provider.with_proposals(source, proposals)
        })
}
