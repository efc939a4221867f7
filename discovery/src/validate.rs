use crate::provider::{ProposedRelationship, RawProposal};
use catalog_core::config::DiscoveryConfig;
use catalog_core::model::{ProductId, RelationshipType};
use serde::Serialize;
use std::collections::HashSet;

/// Score assumed when a provider omits one.
pub const DEFAULT_SIMILARITY: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    Malformed,
    UnknownRelationshipType,
    SelfReference,
    UnknownTarget,
    ScoreOutOfRange,
    BelowThreshold,
    Duplicate,
    OverLimit,
}

impl DropReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DropReason::Malformed => "malformed",
            DropReason::UnknownRelationshipType => "unknown_relationship_type",
            DropReason::SelfReference => "self_reference",
            DropReason::UnknownTarget => "unknown_target",
            DropReason::ScoreOutOfRange => "score_out_of_range",
            DropReason::BelowThreshold => "below_threshold",
            DropReason::Duplicate => "duplicate",
            DropReason::OverLimit => "over_limit",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DroppedProposal {
    pub proposal: RawProposal,
    pub reason: DropReason,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Validated {
    pub accepted: Vec<ProposedRelationship>,
    pub dropped: Vec<DroppedProposal>,
}

/// Filters raw provider output down to persistable relationships.
///
/// Proposals are taken in provider order. The first `max_proposals` that pass
/// every check are accepted; later valid ones are dropped as `OverLimit`.
/// A repeated `(target, type)` pair keeps the first occurrence.
pub fn validate_proposals(
    source_id: ProductId,
    raw: Vec<RawProposal>,
    known_products: &HashSet<ProductId>,
    config: &DiscoveryConfig,
) -> Validated {
    let mut out = Validated::default();
    let mut seen: HashSet<(ProductId, RelationshipType)> = HashSet::new();

    for proposal in raw {
        match check(source_id, &proposal, known_products, config) {
            Err(reason) => out.dropped.push(DroppedProposal { proposal, reason }),
            Ok(candidate) => {
                let reason = if !seen.insert((candidate.target_product_id, candidate.relationship_type)) {
                    Some(DropReason::Duplicate)
                } else if out.accepted.len() >= config.max_proposals {
                    Some(DropReason::OverLimit)
                } else {
                    None
                };
                match reason {
                    Some(reason) => out.dropped.push(DroppedProposal { proposal, reason }),
                    None => out.accepted.push(candidate),
                }
            }
        }
    }

    out
}

fn check(
    source_id: ProductId,
    proposal: &RawProposal,
    known_products: &HashSet<ProductId>,
    config: &DiscoveryConfig,
) -> Result<ProposedRelationship, DropReason> {
    let target = proposal.target_product_id.ok_or(DropReason::Malformed)?;

    let relationship_type = proposal
        .relationship_type
        .as_deref()
        .and_then(|kind| kind.trim().parse::<RelationshipType>().ok())
        .filter(RelationshipType::is_discovered)
        .ok_or(DropReason::UnknownRelationshipType)?;

    if target == source_id {
        return Err(DropReason::SelfReference);
    }
    if !known_products.contains(&target) {
        return Err(DropReason::UnknownTarget);
    }

    let score = proposal.similarity_score.unwrap_or(DEFAULT_SIMILARITY);
    if !(0.0..=1.0).contains(&score) {
        return Err(DropReason::ScoreOutOfRange);
    }
    if score < f64::from(config.min_similarity) {
        return Err(DropReason::BelowThreshold);
    }

    Ok(ProposedRelationship {
        target_product_id: target,
        relationship_type,
        similarity_score: score as f32,
        reasoning: proposal.reasoning.clone().unwrap_or_default(),
    })
}
