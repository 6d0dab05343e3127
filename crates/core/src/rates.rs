use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Flat earn rate for one card: every `every_amount_spending` spent earns
/// `points_per_interval` points, unless the spending detail matches one of
/// the `except_for` exclusion phrases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralPointRule {
    pub card_name: String,
    /// Exclusion phrases, one per line in the CSV source field.
    pub except_for: Vec<String>,
    pub every_amount_spending: Decimal,
    pub points_per_interval: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpendingType {
    /// Bonus evaluated per matching transaction.
    Itemized,
    /// Bonus triggered whenever the running sum of matching transactions
    /// crosses the threshold.
    Cumulative,
}

impl std::str::FromStr for SpendingType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // The shipped rate sheets use the Thai labels.
        match s.trim() {
            "แยกรายการ" => Ok(SpendingType::Itemized),
            "ยอดสะสม" => Ok(SpendingType::Cumulative),
            other => match other.to_lowercase().as_str() {
                "itemized" => Ok(SpendingType::Itemized),
                "cumulative" => Ok(SpendingType::Cumulative),
                _ => Err(format!("Unknown spending type: '{other}'")),
            },
        }
    }
}

/// Conditional earn rule. A card may carry several of these; each one costs
/// exactly one classifier call per calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecialPointRule {
    pub card_name: String,
    pub spending_type: SpendingType,
    /// Natural-language condition judged by the external classifier.
    pub condition: String,
    pub every_amount_spending: Decimal,
    pub points_per_interval_addition: u64,
}

/// Conversion rate for one (card, airline) pairing: every
/// `every_points_using` points redeems `will_get_these_miles` miles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MilesRateRule {
    pub card_name: String,
    pub airline_service: String,
    pub every_points_using: u64,
    pub will_get_these_miles: u64,
}

#[derive(Debug, Clone, Error)]
pub enum RateDataError {
    #[error("Duplicate general point rule for card '{0}'")]
    DuplicateCard(String),
    #[error("Non-positive spending interval {interval} for card '{card}'")]
    NonPositiveInterval { card: String, interval: Decimal },
    #[error("Zero points-using interval for card '{card}', airline '{airline}'")]
    ZeroPointsInterval { card: String, airline: String },
}

/// The three rate tables, validated once at load and read-only for the rest
/// of the calculation session.
#[derive(Debug, Clone)]
pub struct RateTables {
    general: Vec<GeneralPointRule>,
    special: Vec<SpecialPointRule>,
    miles: Vec<MilesRateRule>,
}

impl RateTables {
    pub fn new(
        general: Vec<GeneralPointRule>,
        special: Vec<SpecialPointRule>,
        miles: Vec<MilesRateRule>,
    ) -> Result<Self, RateDataError> {
        for (i, rule) in general.iter().enumerate() {
            if rule.every_amount_spending <= Decimal::ZERO {
                return Err(RateDataError::NonPositiveInterval {
                    card: rule.card_name.clone(),
                    interval: rule.every_amount_spending,
                });
            }
            if general[..i].iter().any(|r| r.card_name == rule.card_name) {
                return Err(RateDataError::DuplicateCard(rule.card_name.clone()));
            }
        }
        for rule in &special {
            if rule.every_amount_spending <= Decimal::ZERO {
                return Err(RateDataError::NonPositiveInterval {
                    card: rule.card_name.clone(),
                    interval: rule.every_amount_spending,
                });
            }
        }
        for rule in &miles {
            if rule.every_points_using == 0 {
                return Err(RateDataError::ZeroPointsInterval {
                    card: rule.card_name.clone(),
                    airline: rule.airline_service.clone(),
                });
            }
        }
        Ok(RateTables {
            general,
            special,
            miles,
        })
    }

    pub fn general(&self) -> &[GeneralPointRule] {
        &self.general
    }

    pub fn special(&self) -> &[SpecialPointRule] {
        &self.special
    }

    pub fn miles(&self) -> &[MilesRateRule] {
        &self.miles
    }

    /// Card names in general-rule order. This is the column order of the
    /// points matrix.
    pub fn card_names(&self) -> Vec<String> {
        self.general.iter().map(|r| r.card_name.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn general(card: &str, interval: i64) -> GeneralPointRule {
        GeneralPointRule {
            card_name: card.to_string(),
            except_for: vec![],
            every_amount_spending: Decimal::from(interval),
            points_per_interval: 1,
        }
    }

    #[test]
    fn spending_type_parses_english() {
        assert_eq!("itemized".parse::<SpendingType>(), Ok(SpendingType::Itemized));
        assert_eq!("Cumulative".parse::<SpendingType>(), Ok(SpendingType::Cumulative));
    }

    #[test]
    fn spending_type_parses_thai_labels() {
        assert_eq!("แยกรายการ".parse::<SpendingType>(), Ok(SpendingType::Itemized));
        assert_eq!("ยอดสะสม".parse::<SpendingType>(), Ok(SpendingType::Cumulative));
    }

    #[test]
    fn spending_type_rejects_unknown() {
        assert!("monthly".parse::<SpendingType>().is_err());
    }

    #[test]
    fn new_accepts_distinct_cards() {
        let tables = RateTables::new(vec![general("A", 25), general("B", 20)], vec![], vec![]);
        assert_eq!(tables.unwrap().card_names(), vec!["A", "B"]);
    }

    #[test]
    fn new_rejects_duplicate_card() {
        let result = RateTables::new(vec![general("A", 25), general("A", 20)], vec![], vec![]);
        assert!(matches!(result, Err(RateDataError::DuplicateCard(c)) if c == "A"));
    }

    #[test]
    fn new_rejects_zero_interval() {
        let result = RateTables::new(vec![general("A", 0)], vec![], vec![]);
        assert!(matches!(
            result,
            Err(RateDataError::NonPositiveInterval { .. })
        ));
    }

    #[test]
    fn new_rejects_zero_miles_interval() {
        let miles = vec![MilesRateRule {
            card_name: "A".to_string(),
            airline_service: "TG".to_string(),
            every_points_using: 0,
            will_get_these_miles: 10,
        }];
        let result = RateTables::new(vec![general("A", 25)], vec![], miles);
        assert!(matches!(result, Err(RateDataError::ZeroPointsInterval { .. })));
    }
}
