use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use milemax_core::Transaction;

#[derive(Debug, Error)]
pub enum StatementError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// A statement row that could not be imported. Only that row is lost; the
/// rest of the statement still feeds the engine.
#[derive(Debug, Clone)]
pub struct RejectedRow {
    /// 1-based data-row number in the source file.
    pub line: usize,
    pub reason: String,
}

#[derive(Debug)]
pub struct StatementImport {
    pub transactions: Vec<Transaction>,
    pub rejected: Vec<RejectedRow>,
}

/// Load a cleaned statement table: `date,spending_detail,spending_amount,
/// currency`. Rows with an unparseable date or amount are rejected
/// individually rather than aborting the import.
pub fn load_statement<R: Read>(data: R) -> Result<StatementImport, StatementError> {
    let mut reader = csv::Reader::from_reader(data);
    let mut transactions = Vec::new();
    let mut rejected = Vec::new();

    for (i, result) in reader.records().enumerate() {
        let line = i + 1;
        let record = result?;
        if record.is_empty() {
            continue;
        }
        match parse_row(&record) {
            Ok(tx) => transactions.push(tx),
            Err(reason) => rejected.push(RejectedRow { line, reason }),
        }
    }

    Ok(StatementImport {
        transactions,
        rejected,
    })
}

pub fn load_statement_from_path(path: &Path) -> Result<StatementImport, StatementError> {
    load_statement(std::fs::File::open(path)?)
}

fn parse_row(record: &csv::StringRecord) -> Result<Transaction, String> {
    let date = record.get(0).ok_or("missing date field")?;
    let detail = record.get(1).ok_or("missing spending detail field")?;
    let amount = record.get(2).ok_or("missing spending amount field")?;
    let currency = record.get(3).ok_or("missing currency field")?;

    let date = parse_date(date)?;
    let amount = parse_amount(amount)?;

    Ok(Transaction::new(
        date,
        detail.trim(),
        amount,
        currency.trim(),
    ))
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    let s = s.trim();
    for fmt in &["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%Y/%m/%d", "%d-%m-%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(date);
        }
    }
    Err(format!("unparseable date '{s}'"))
}

fn parse_amount(s: &str) -> Result<Decimal, String> {
    let cleaned = s.trim().replace(',', "");
    let amount =
        Decimal::from_str(&cleaned).map_err(|_| format!("unparseable amount '{}'", s.trim()))?;
    if amount < Decimal::ZERO {
        return Err(format!("negative spending amount '{}'", s.trim()));
    }
    Ok(amount)
}
