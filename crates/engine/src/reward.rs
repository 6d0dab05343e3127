use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use thiserror::Error;

use milemax_classify::{ClassifyError, ConditionClassifier, Verdict};
use milemax_core::{PointsMatrix, RateTables, SpecialPointRule, SpendingType, Transaction};

use crate::scorer::SimilarityScorer;

/// A spending detail is excluded when its best similarity score against any
/// exclusion phrase is strictly greater than this.
pub const EXCLUSION_THRESHOLD: u8 = 80;

#[derive(Debug, Error)]
pub enum RewardError {
    #[error("No general point rule for card '{card}' (special rule '{condition}')")]
    MissingCardRule { card: String, condition: String },
    #[error(
        "Classifier returned {actual} verdicts for {expected} transactions \
         (rule '{condition}', card '{card}')"
    )]
    VerdictCountMismatch {
        card: String,
        condition: String,
        expected: usize,
        actual: usize,
    },
    #[error(
        "Classifier verdict at position {position} refers to transaction \
         {transaction_index} (rule '{condition}')"
    )]
    VerdictOutOfOrder {
        condition: String,
        position: usize,
        transaction_index: usize,
    },
    #[error("Classification failed for rule '{condition}': {source}")]
    Classify {
        condition: String,
        #[source]
        source: ClassifyError,
    },
}

/// Applies the three earning passes to a transaction set against the rate
/// tables: general (exception-filtered flat rate), itemized (per-transaction
/// classifier-gated bonus), cumulative (threshold-triggered bonus on a
/// running sum), then recomputes the totals row.
///
/// Passes run in strict sequence — the cumulative accumulator only sees the
/// verdicts of its own rule, and the itemized pass must never retroactively
/// change which transactions feed the running sum.
pub struct RewardEngine<'a, S, C> {
    rates: &'a RateTables,
    scorer: S,
    classifier: C,
}

impl<'a, S: SimilarityScorer, C: ConditionClassifier> RewardEngine<'a, S, C> {
    pub fn new(rates: &'a RateTables, scorer: S, classifier: C) -> Self {
        RewardEngine {
            rates,
            scorer,
            classifier,
        }
    }

    /// Run all passes and return the finalized matrix. This is the only way
    /// to obtain a matrix from the engine, so partial totals are never
    /// observable.
    pub fn calculate(&self, transactions: &[Transaction]) -> Result<PointsMatrix, RewardError> {
        let mut matrix = PointsMatrix::new(self.rates.card_names(), transactions.len());
        self.general_points(transactions, &mut matrix);
        self.itemized_points(transactions, &mut matrix)?;
        self.cumulative_points(transactions, &mut matrix)?;
        matrix.recompute_totals();
        Ok(matrix)
    }

    fn general_points(&self, transactions: &[Transaction], matrix: &mut PointsMatrix) {
        for (row, tx) in transactions.iter().enumerate() {
            for rule in self.rates.general() {
                let Some(column) = matrix.column(&rule.card_name) else {
                    continue;
                };
                let excluded = rule
                    .except_for
                    .iter()
                    .any(|phrase| self.scorer.score(&tx.spending_detail, phrase) > EXCLUSION_THRESHOLD);
                let points = if excluded {
                    0
                } else {
                    interval_points(
                        tx.spending_amount,
                        rule.every_amount_spending,
                        rule.points_per_interval,
                    )
                };
                matrix.set(row, column, points);
            }
        }
    }

    fn itemized_points(
        &self,
        transactions: &[Transaction],
        matrix: &mut PointsMatrix,
    ) -> Result<(), RewardError> {
        if transactions.is_empty() {
            return Ok(());
        }
        for rule in self.special_rules(SpendingType::Itemized) {
            let column = self.card_column(rule, matrix)?;
            let verdicts = self.checked_verdicts(rule, transactions)?;
            for verdict in verdicts.iter().filter(|v| v.satisfied) {
                let tx = &transactions[verdict.transaction_index];
                let bonus = interval_points(
                    tx.spending_amount,
                    rule.every_amount_spending,
                    rule.points_per_interval_addition,
                );
                matrix.add(verdict.transaction_index, column, bonus);
            }
        }
        Ok(())
    }

    fn cumulative_points(
        &self,
        transactions: &[Transaction],
        matrix: &mut PointsMatrix,
    ) -> Result<(), RewardError> {
        if transactions.is_empty() {
            return Ok(());
        }
        for rule in self.special_rules(SpendingType::Cumulative) {
            let column = self.card_column(rule, matrix)?;
            let verdicts = self.checked_verdicts(rule, transactions)?;

            // Running sum of matching spend, walked in index order. On each
            // threshold crossing the threshold is subtracted, carrying the
            // remainder forward, and the bonus lands on the crossing row. A
            // large transaction can cross more than once.
            let mut accumulated = Decimal::ZERO;
            for verdict in verdicts.iter().filter(|v| v.satisfied) {
                accumulated += transactions[verdict.transaction_index].spending_amount;
                while accumulated >= rule.every_amount_spending {
                    accumulated -= rule.every_amount_spending;
                    matrix.add(
                        verdict.transaction_index,
                        column,
                        rule.points_per_interval_addition,
                    );
                }
            }
        }
        Ok(())
    }

    fn special_rules(&self, spending_type: SpendingType) -> impl Iterator<Item = &SpecialPointRule> {
        self.rates
            .special()
            .iter()
            .filter(move |r| r.spending_type == spending_type)
    }

    /// Resolved before the classifier is invoked, so a malformed rate table
    /// fails without spending an external call.
    fn card_column(
        &self,
        rule: &SpecialPointRule,
        matrix: &PointsMatrix,
    ) -> Result<usize, RewardError> {
        matrix
            .column(&rule.card_name)
            .ok_or_else(|| RewardError::MissingCardRule {
                card: rule.card_name.clone(),
                condition: rule.condition.clone(),
            })
    }

    /// One batched classifier call for the whole transaction list, with the
    /// verdict contract enforced: exactly one verdict per transaction, in
    /// transaction order. Violations abort the pass — never truncate or pad.
    fn checked_verdicts(
        &self,
        rule: &SpecialPointRule,
        transactions: &[Transaction],
    ) -> Result<Vec<Verdict>, RewardError> {
        let verdicts = self
            .classifier
            .classify(&rule.condition, transactions)
            .map_err(|source| RewardError::Classify {
                condition: rule.condition.clone(),
                source,
            })?;

        if verdicts.len() != transactions.len() {
            return Err(RewardError::VerdictCountMismatch {
                card: rule.card_name.clone(),
                condition: rule.condition.clone(),
                expected: transactions.len(),
                actual: verdicts.len(),
            });
        }
        for (position, verdict) in verdicts.iter().enumerate() {
            if verdict.transaction_index != position {
                return Err(RewardError::VerdictOutOfOrder {
                    condition: rule.condition.clone(),
                    position,
                    transaction_index: verdict.transaction_index,
                });
            }
        }
        Ok(verdicts)
    }
}

/// `floor(amount / interval) * per_interval` — fractional intervals earn
/// nothing.
fn interval_points(amount: Decimal, interval: Decimal, per_interval: u64) -> u64 {
    let intervals = (amount / interval).floor().to_u64().unwrap_or(0);
    intervals * per_interval
}
