use serde::{Deserialize, Serialize};

use milemax_core::{MilesRateRule, PointsMatrix};

/// Miles earned by one (card, airline) pairing from the card's final point
/// total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MilesRow {
    pub card_name: String,
    pub airline_service: String,
    pub calculated_points: u64,
    pub calculated_miles: u64,
}

pub struct MilesConverter;

impl MilesConverter {
    /// Derive the miles table from the finalized points matrix. A rate row
    /// for a card with no matrix column (inconsistent data) converts to
    /// zero rather than failing the whole table.
    pub fn convert(rates: &[MilesRateRule], matrix: &PointsMatrix) -> Vec<MilesRow> {
        rates
            .iter()
            .map(|rule| {
                let points = matrix.total(&rule.card_name).unwrap_or(0);
                let miles = if rule.every_points_using == 0 {
                    0
                } else {
                    points / rule.every_points_using * rule.will_get_these_miles
                };
                MilesRow {
                    card_name: rule.card_name.clone(),
                    airline_service: rule.airline_service.clone(),
                    calculated_points: points,
                    calculated_miles: miles,
                }
            })
            .collect()
    }

    /// The pairing with the most miles. Ties keep the earliest rate-table
    /// row, so the choice is stable across runs.
    pub fn best(rows: &[MilesRow]) -> Option<&MilesRow> {
        let mut best: Option<&MilesRow> = None;
        for row in rows {
            if best.is_none_or(|b| row.calculated_miles > b.calculated_miles) {
                best = Some(row);
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rate(card: &str, airline: &str, every: u64, miles: u64) -> MilesRateRule {
        MilesRateRule {
            card_name: card.to_string(),
            airline_service: airline.to_string(),
            every_points_using: every,
            will_get_these_miles: miles,
        }
    }

    fn matrix_with_total(card: &str, points: u64) -> PointsMatrix {
        let mut m = PointsMatrix::new(vec![card.to_string()], 1);
        let col = m.column(card).unwrap();
        m.set(0, col, points);
        m.recompute_totals();
        m
    }

    #[test]
    fn convert_floors_partial_intervals() {
        // floor(2500 / 1000) * 15 = 30
        let matrix = matrix_with_total("A", 2500);
        let rows = MilesConverter::convert(&[rate("A", "TG", 1000, 15)], &matrix);
        assert_eq!(rows[0].calculated_points, 2500);
        assert_eq!(rows[0].calculated_miles, 30);
    }

    #[test]
    fn convert_unknown_card_is_zero() {
        let matrix = matrix_with_total("A", 2500);
        let rows = MilesConverter::convert(&[rate("GHOST", "TG", 1000, 15)], &matrix);
        assert_eq!(rows[0].calculated_points, 0);
        assert_eq!(rows[0].calculated_miles, 0);
    }

    #[test]
    fn best_picks_maximum_miles() {
        let matrix = matrix_with_total("A", 3000);
        let rows = MilesConverter::convert(
            &[rate("A", "TG", 1000, 10), rate("A", "SQ", 1000, 20)],
            &matrix,
        );
        let best = MilesConverter::best(&rows).unwrap();
        assert_eq!(best.airline_service, "SQ");
        assert_eq!(best.calculated_miles, 60);
    }

    #[test]
    fn best_tie_keeps_first_row() {
        let matrix = matrix_with_total("A", 1000);
        let rows = MilesConverter::convert(
            &[rate("A", "TG", 1000, 15), rate("A", "SQ", 1000, 15)],
            &matrix,
        );
        let best = MilesConverter::best(&rows).unwrap();
        assert_eq!(best.airline_service, "TG");
    }

    #[test]
    fn best_of_empty_is_none() {
        assert!(MilesConverter::best(&[]).is_none());
    }

    #[test]
    fn zero_points_convert_to_zero_miles() {
        let matrix = matrix_with_total("A", 0);
        let rows = MilesConverter::convert(&[rate("A", "TG", 1000, 15)], &matrix);
        assert_eq!(rows[0].calculated_miles, 0);
    }
}
