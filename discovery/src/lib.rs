pub mod provider;
pub mod round;
pub mod validate;

pub use provider::{
    parse_proposals, ProductSummary, ProposedRelationship, RawProposal,
    RelationshipDiscoveryProvider, StaticDiscoveryProvider,
};
pub use round::{select_candidates, DiscoveryError, DiscoveryOutcome, DiscoveryRound};
pub use validate::{validate_proposals, DropReason, DroppedProposal, Validated};
