pub mod matrix;
pub mod rates;
pub mod transaction;

pub use matrix::PointsMatrix;
pub use rates::{
    GeneralPointRule, MilesRateRule, RateDataError, RateTables, SpecialPointRule, SpendingType,
};
pub use transaction::Transaction;
