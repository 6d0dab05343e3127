pub mod export;
pub mod rates_csv;
pub mod statement;

pub use export::{
    export_miles, export_miles_to_path, export_points_matrix, export_points_matrix_to_path,
    ExportError,
};
pub use rates_csv::{load_rate_tables, load_rate_tables_from_paths, RateCsvError};
pub use statement::{load_statement, load_statement_from_path, RejectedRow, StatementError, StatementImport};
