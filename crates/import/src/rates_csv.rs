use std::io::Read;
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use milemax_core::{
    GeneralPointRule, MilesRateRule, RateDataError, RateTables, SpecialPointRule, SpendingType,
};

#[derive(Debug, Error)]
pub enum RateCsvError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Invalid spending type in special-points row {row}: {message}")]
    InvalidSpendingType { row: usize, message: String },
    #[error(transparent)]
    Invalid(#[from] RateDataError),
}

#[derive(Debug, Deserialize)]
struct GeneralRow {
    card_name: String,
    /// Newline-delimited exclusion phrases within the single CSV field.
    except_for: String,
    every_amount_spending: Decimal,
    points_per_interval: u64,
}

#[derive(Debug, Deserialize)]
struct SpecialRow {
    card_name: String,
    spending_type: String,
    condition: String,
    every_amount_spending: Decimal,
    points_per_interval_addition: u64,
}

#[derive(Debug, Deserialize)]
struct MilesRow {
    card_name: String,
    airline_service: String,
    every_points_using: u64,
    will_get_these_miles: u64,
}

/// Load and validate all three rate tables for a calculation session.
pub fn load_rate_tables<R1: Read, R2: Read, R3: Read>(
    general: R1,
    special: R2,
    miles: R3,
) -> Result<RateTables, RateCsvError> {
    let general = load_general(general)?;
    let special = load_special(special)?;
    let miles = load_miles(miles)?;
    Ok(RateTables::new(general, special, miles)?)
}

pub fn load_rate_tables_from_paths(
    general: &Path,
    special: &Path,
    miles: &Path,
) -> Result<RateTables, RateCsvError> {
    load_rate_tables(
        std::fs::File::open(general)?,
        std::fs::File::open(special)?,
        std::fs::File::open(miles)?,
    )
}

fn load_general<R: Read>(data: R) -> Result<Vec<GeneralPointRule>, RateCsvError> {
    let mut rules = Vec::new();
    for result in csv::Reader::from_reader(data).deserialize::<GeneralRow>() {
        let row = result?;
        rules.push(GeneralPointRule {
            card_name: row.card_name,
            except_for: split_exclusions(&row.except_for),
            every_amount_spending: row.every_amount_spending,
            points_per_interval: row.points_per_interval,
        });
    }
    Ok(rules)
}

fn load_special<R: Read>(data: R) -> Result<Vec<SpecialPointRule>, RateCsvError> {
    let mut rules = Vec::new();
    for (i, result) in csv::Reader::from_reader(data)
        .deserialize::<SpecialRow>()
        .enumerate()
    {
        let row = result?;
        let spending_type: SpendingType = row
            .spending_type
            .parse()
            .map_err(|message| RateCsvError::InvalidSpendingType { row: i, message })?;
        rules.push(SpecialPointRule {
            card_name: row.card_name,
            spending_type,
            condition: row.condition,
            every_amount_spending: row.every_amount_spending,
            points_per_interval_addition: row.points_per_interval_addition,
        });
    }
    Ok(rules)
}

fn load_miles<R: Read>(data: R) -> Result<Vec<MilesRateRule>, RateCsvError> {
    let mut rules = Vec::new();
    for result in csv::Reader::from_reader(data).deserialize::<MilesRow>() {
        let row = result?;
        rules.push(MilesRateRule {
            card_name: row.card_name,
            airline_service: row.airline_service,
            every_points_using: row.every_points_using,
            will_get_these_miles: row.will_get_these_miles,
        });
    }
    Ok(rules)
}

fn split_exclusions(field: &str) -> Vec<String> {
    field
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const GENERAL: &[u8] = b"card_name,except_for,every_amount_spending,points_per_interval\n\
Card A,\"grab food\ngovernment fee\",25,1\n\
Card B,,20,1\n";

    const SPECIAL: &[u8] = b"card_name,spending_type,condition,every_amount_spending,points_per_interval_addition\n\
Card A,itemized,spend in a foreign currency,25,1\n\
Card B,\xe0\xb8\xa2\xe0\xb8\xad\xe0\xb8\x94\xe0\xb8\xaa\xe0\xb8\xb0\xe0\xb8\xaa\xe0\xb8\xa1,monthly food delivery total,1000,50\n";

    const MILES: &[u8] = b"card_name,airline_service,every_points_using,will_get_these_miles\n\
Card A,Royal Orchid Plus,1000,15\n\
Card B,KrisFlyer,2000,25\n";

    #[test]
    fn load_full_set() {
        let tables = load_rate_tables(GENERAL, SPECIAL, MILES).unwrap();
        assert_eq!(tables.card_names(), vec!["Card A", "Card B"]);
        assert_eq!(
            tables.general()[0].except_for,
            vec!["grab food", "government fee"]
        );
        assert!(tables.general()[1].except_for.is_empty());
        assert_eq!(tables.special()[0].spending_type, SpendingType::Itemized);
        // Thai label in the source sheet parses to Cumulative.
        assert_eq!(tables.special()[1].spending_type, SpendingType::Cumulative);
        assert_eq!(tables.miles()[1].every_points_using, 2000);
    }

    #[test]
    fn unknown_spending_type_is_an_error() {
        let special = b"card_name,spending_type,condition,every_amount_spending,points_per_interval_addition\n\
Card A,weekly,x,25,1\n";
        let result = load_rate_tables(GENERAL, special.as_ref(), MILES);
        assert!(matches!(
            result,
            Err(RateCsvError::InvalidSpendingType { row: 0, .. })
        ));
    }

    #[test]
    fn duplicate_card_fails_validation() {
        let general = b"card_name,except_for,every_amount_spending,points_per_interval\n\
Card A,,25,1\nCard A,,20,1\n";
        let result = load_rate_tables(general.as_ref(), SPECIAL, MILES);
        assert!(matches!(result, Err(RateCsvError::Invalid(_))));
    }

    #[test]
    fn decimal_intervals_parse() {
        let general = b"card_name,except_for,every_amount_spending,points_per_interval\n\
Card A,,12.5,1\n";
        // An empty reader has no header row and no records.
        let tables = load_rate_tables(general.as_ref(), &b""[..], &b""[..]).unwrap();
        assert_eq!(
            tables.general()[0].every_amount_spending,
            Decimal::new(125, 1)
        );
    }
}
