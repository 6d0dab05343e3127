use std::io::Write;
use std::path::Path;

use thiserror::Error;

use milemax_core::{PointsMatrix, Transaction};
use milemax_engine::MilesRow;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Matrix has {matrix_rows} rows but {transactions} transactions were given")]
    RowCountMismatch {
        matrix_rows: usize,
        transactions: usize,
    },
}

/// Write the finalized points matrix as CSV: the statement columns, one
/// column per card, and a trailing `total` row.
pub fn export_points_matrix<W: Write>(
    writer: W,
    transactions: &[Transaction],
    matrix: &PointsMatrix,
) -> Result<(), ExportError> {
    if matrix.transaction_count() != transactions.len() {
        return Err(ExportError::RowCountMismatch {
            matrix_rows: matrix.transaction_count(),
            transactions: transactions.len(),
        });
    }

    let mut w = csv::Writer::from_writer(writer);

    let mut header = vec![
        "date".to_string(),
        "spending_detail".to_string(),
        "spending_amount".to_string(),
        "currency".to_string(),
    ];
    header.extend(matrix.cards().iter().cloned());
    w.write_record(&header)?;

    for (i, tx) in transactions.iter().enumerate() {
        let mut record = vec![
            tx.date.format("%Y-%m-%d").to_string(),
            tx.spending_detail.clone(),
            tx.spending_amount.to_string(),
            tx.currency.clone(),
        ];
        record.extend(matrix.row(i).iter().map(u64::to_string));
        w.write_record(&record)?;
    }

    let mut total = vec![
        "total".to_string(),
        String::new(),
        String::new(),
        String::new(),
    ];
    total.extend(matrix.totals().iter().map(u64::to_string));
    w.write_record(&total)?;

    w.flush()?;
    Ok(())
}

pub fn export_points_matrix_to_path(
    path: &Path,
    transactions: &[Transaction],
    matrix: &PointsMatrix,
) -> Result<(), ExportError> {
    export_points_matrix(std::fs::File::create(path)?, transactions, matrix)
}

/// Write the derived miles table as CSV, one row per (card, airline) rate.
pub fn export_miles<W: Write>(writer: W, rows: &[MilesRow]) -> Result<(), ExportError> {
    let mut w = csv::Writer::from_writer(writer);
    for row in rows {
        w.serialize(row)?;
    }
    w.flush()?;
    Ok(())
}

pub fn export_miles_to_path(path: &Path, rows: &[MilesRow]) -> Result<(), ExportError> {
    export_miles(std::fs::File::create(path)?, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn tx(detail: &str, amount: i64) -> Transaction {
        Transaction::new(
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            detail,
            Decimal::from(amount),
            "THB",
        )
    }

    fn matrix() -> PointsMatrix {
        let mut m = PointsMatrix::new(vec!["Card A".to_string(), "Card B".to_string()], 2);
        m.set(0, 0, 4);
        m.set(1, 0, 2);
        m.set(1, 1, 7);
        m.recompute_totals();
        m
    }

    #[test]
    fn points_matrix_csv_shape() {
        let txs = vec![tx("GRAB FOOD", 100), tx("STARBUCKS", 50)];
        let mut out = Vec::new();
        export_points_matrix(&mut out, &txs, &matrix()).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4); // header + 2 rows + total
        assert_eq!(
            lines[0],
            "date,spending_detail,spending_amount,currency,Card A,Card B"
        );
        assert_eq!(lines[1], "2024-01-15,GRAB FOOD,100,THB,4,0");
        assert_eq!(lines[3], "total,,,,6,7");
    }

    #[test]
    fn row_count_mismatch_is_an_error() {
        let txs = vec![tx("ONLY ONE", 100)];
        let mut out = Vec::new();
        let result = export_points_matrix(&mut out, &txs, &matrix());
        assert!(matches!(result, Err(ExportError::RowCountMismatch { .. })));
    }

    #[test]
    fn miles_csv_includes_header_and_rows() {
        let rows = vec![MilesRow {
            card_name: "Card A".to_string(),
            airline_service: "Royal Orchid Plus".to_string(),
            calculated_points: 2500,
            calculated_miles: 30,
        }];
        let mut out = Vec::new();
        export_miles(&mut out, &rows).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("card_name,airline_service,calculated_points,calculated_miles"));
        assert!(text.contains("Card A,Royal Orchid Plus,2500,30"));
    }

    #[test]
    fn path_helpers_usable_from_crate_root() {
        let dir = tempfile::tempdir().unwrap();
        let points_path = dir.path().join("points.csv");
        let miles_path = dir.path().join("miles.csv");
        let txs = vec![tx("A", 1), tx("B", 2)];
        crate::export_points_matrix_to_path(&points_path, &txs, &matrix()).unwrap();
        crate::export_miles_to_path(&miles_path, &[]).unwrap();
        assert!(points_path.exists());
        assert!(miles_path.exists());
    }

    #[test]
    fn path_exports_write_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("points.csv");
        let txs = vec![tx("A", 1), tx("B", 2)];
        export_points_matrix_to_path(&path, &txs, &matrix()).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("total,,,,6,7"));
    }
}
