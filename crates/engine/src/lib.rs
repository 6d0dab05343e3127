pub mod miles;
pub mod reward;
pub mod scorer;

pub use miles::{MilesConverter, MilesRow};
pub use reward::{RewardEngine, RewardError, EXCLUSION_THRESHOLD};
pub use scorer::{PartialRatioScorer, SimilarityScorer};
