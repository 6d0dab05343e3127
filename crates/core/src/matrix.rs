use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Per-transaction, per-card points accumulation table with a derived totals
/// row. Rows are transaction indices; columns are the card names from the
/// general rate table, in table order.
///
/// The engine mutates cells directly across its passes, so the totals row is
/// only meaningful after [`PointsMatrix::recompute_totals`] — it is always
/// recomputed from the cells, never trusted incrementally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointsMatrix {
    cards: Vec<String>,
    columns: HashMap<String, usize>,
    rows: Vec<Vec<u64>>,
    totals: Vec<u64>,
}

impl PointsMatrix {
    /// All cells start at zero, sized to the transaction set and card list.
    pub fn new(cards: Vec<String>, transaction_count: usize) -> Self {
        let columns = cards
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i))
            .collect();
        let rows = vec![vec![0; cards.len()]; transaction_count];
        let totals = vec![0; cards.len()];
        PointsMatrix {
            cards,
            columns,
            rows,
            totals,
        }
    }

    pub fn cards(&self) -> &[String] {
        &self.cards
    }

    pub fn transaction_count(&self) -> usize {
        self.rows.len()
    }

    /// Column index for a card, if the card has a column at all.
    pub fn column(&self, card: &str) -> Option<usize> {
        self.columns.get(card).copied()
    }

    pub fn get(&self, row: usize, column: usize) -> u64 {
        self.rows[row][column]
    }

    pub fn set(&mut self, row: usize, column: usize, points: u64) {
        self.rows[row][column] = points;
    }

    pub fn add(&mut self, row: usize, column: usize, points: u64) {
        self.rows[row][column] += points;
    }

    /// Recompute every card total as the full column sum. Idempotent, and
    /// correct even when earlier passes mutated cells after a previous run.
    pub fn recompute_totals(&mut self) {
        for column in 0..self.cards.len() {
            self.totals[column] = self.rows.iter().map(|r| r[column]).sum();
        }
    }

    /// Final total for a card, as of the last `recompute_totals`.
    pub fn total(&self, card: &str) -> Option<u64> {
        self.column(card).map(|c| self.totals[c])
    }

    pub fn totals(&self) -> &[u64] {
        &self.totals
    }

    pub fn row(&self, row: usize) -> &[u64] {
        &self.rows[row]
    }
}
