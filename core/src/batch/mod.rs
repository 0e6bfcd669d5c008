mod columns;
mod run;

pub use columns::{extract_values, resolve_column, ColumnBinding};
pub use run::{run_batch, BatchSummary, UpdateExecutor};

#[derive(thiserror::Error, Debug)]
pub enum BatchError {
    #[error("CSV file is empty")]
    EmptyFile,

    #[error("Could not read the CSV header: {0}")]
    HeaderUnreadable(#[from] csv::Error),

    #[error("Column {0} is not found in CSV file!")]
    ColumnNotFound(String),
}
