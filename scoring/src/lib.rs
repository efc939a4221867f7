pub mod aeo;

pub use aeo::{score, score_product, ProductContext, ScoreBreakdown, ScoreDimensions};
