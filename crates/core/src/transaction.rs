use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single cleaned statement line. The upstream extraction step has already
/// typed the fields; this core never re-parses free text into numbers.
///
/// Transactions live in an ordered sequence and the position in that sequence
/// is the row identity used by every engine pass and by classifier verdicts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDate,
    pub spending_detail: String,
    /// Non-negative; statements feed the engine charges, not refunds.
    pub spending_amount: Decimal,
    pub currency: String,
}

impl Transaction {
    pub fn new(
        date: NaiveDate,
        spending_detail: impl Into<String>,
        spending_amount: Decimal,
        currency: impl Into<String>,
    ) -> Self {
        Transaction {
            date,
            spending_detail: spending_detail.into(),
            spending_amount,
            currency: currency.into(),
        }
    }
}
