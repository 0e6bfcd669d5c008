use std::io::Read;

use async_trait::async_trait;
use tracing::{error, info};

use crate::batch::{extract_values, BatchError, ColumnBinding};

/// Seam between the batch loop and the store. The production implementation
/// is `PostgresUpdater`, tests substitute an in-memory recorder.
#[async_trait]
pub trait UpdateExecutor: Send + Sync {
    type Error: std::error::Error + Send + Sync;

    /// Execute the single fixed-shape update with both values bound as
    /// parameters and return the number of rows the store reports modified.
    /// Zero is a legitimate result, it just means nothing matched.
    async fn update(&self, set_value: &str, where_value: &str) -> Result<u64, Self::Error>;
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub rows_processed: u64,
    pub rows_failed: u64,
    pub rows_affected: u64,
}

/// Drives the whole batch: read the header, bind both role columns once,
/// then one record at a time extract the two values and run the update.
///
/// Failures before the loop (empty input, unknown column) abort the run with
/// no row touched. Failures inside the loop (unparsable line, rejected
/// statement) are logged against their line number and never stop the next
/// row from being attempted. The only way out of the loop is end-of-input.
pub async fn run_batch<R, E>(
    input: R,
    set_column: &str,
    where_column: &str,
    executor: &E,
) -> Result<BatchSummary, BatchError>
where
    R: Read,
    E: UpdateExecutor,
{
    let mut reader = csv::ReaderBuilder::new().has_headers(false).from_reader(input);
    let mut records = reader.records();

    let header = records.next().ok_or(BatchError::EmptyFile)??;
    let binding = ColumnBinding::resolve(&header, set_column, where_column)?;

    let mut summary = BatchSummary::default();
    let mut line = 0u64;

    for record in records {
        line += 1;
        summary.rows_processed += 1;

        let record = match record {
            Ok(record) => record,
            Err(e) => {
                error!("ERR on line {}: {}", line, e);
                summary.rows_failed += 1;
                continue;
            }
        };

        let (set_value, where_value) = match extract_values(&record, &binding) {
            Some(values) => values,
            None => {
                error!(
                    "ERR on line {}: record has {} fields, column positions {} and {} are out of range",
                    line,
                    record.len(),
                    binding.set_idx,
                    binding.where_idx
                );
                summary.rows_failed += 1;
                continue;
            }
        };

        match executor.update(set_value, where_value).await {
            Ok(affected) => {
                info!("Successfully update line {} with {} rows affected", line, affected);
                summary.rows_affected += affected;
            }
            Err(e) => {
                error!("ERR on line {}: {}", line, e);
                summary.rows_failed += 1;
            }
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use std::{
        io::{Cursor, Write},
        sync::Mutex,
    };

    use super::*;

    struct RecordingExecutor {
        calls: Mutex<Vec<(String, String)>>,
        // 1-based call index that should fail
        fail_on_call: Option<usize>,
        rows_affected: u64,
    }

    impl Default for RecordingExecutor {
        fn default() -> Self {
            RecordingExecutor { calls: Mutex::new(Vec::new()), fail_on_call: None, rows_affected: 1 }
        }
    }

    impl RecordingExecutor {
        fn failing_on(call: usize) -> Self {
            RecordingExecutor { fail_on_call: Some(call), ..Default::default() }
        }

        fn affecting(rows_affected: u64) -> Self {
            RecordingExecutor { rows_affected, ..Default::default() }
        }

        fn calls(&self) -> Vec<(String, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl UpdateExecutor for RecordingExecutor {
        type Error = std::io::Error;

        async fn update(&self, set_value: &str, where_value: &str) -> Result<u64, Self::Error> {
            let mut calls = self.calls.lock().unwrap();
            calls.push((set_value.to_string(), where_value.to_string()));

            if self.fail_on_call == Some(calls.len()) {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "duplicate key value violates unique constraint",
                ));
            }

            Ok(self.rows_affected)
        }
    }

    #[tokio::test]
    async fn maps_roles_onto_statement_values() {
        let input = Cursor::new("id,name,status\n42,Alice,active\n");
        let executor = RecordingExecutor::default();

        let summary = run_batch(input, "status", "id", &executor).await.unwrap();

        assert_eq!(executor.calls(), vec![("active".to_string(), "42".to_string())]);
        assert_eq!(
            summary,
            BatchSummary { rows_processed: 1, rows_failed: 0, rows_affected: 1 }
        );
    }

    #[tokio::test]
    async fn malformed_row_does_not_stop_the_batch() {
        // row 3 has an extra field and cannot be parsed against the header
        let input = Cursor::new(
            "id,name,status\n1,Alice,active\n2,Bob,active\n3,Carol,active,extra\n4,Dave,inactive\n",
        );
        let executor = RecordingExecutor::default();

        let summary = run_batch(input, "status", "id", &executor).await.unwrap();

        let attempted: Vec<String> =
            executor.calls().into_iter().map(|(_, where_value)| where_value).collect();
        assert_eq!(attempted, vec!["1", "2", "4"]);
        assert_eq!(
            summary,
            BatchSummary { rows_processed: 4, rows_failed: 1, rows_affected: 3 }
        );
    }

    #[tokio::test]
    async fn rejected_statement_does_not_stop_the_batch() {
        let input = Cursor::new("id,status\n7,active\n8,inactive\n");
        let executor = RecordingExecutor::failing_on(1);

        let summary = run_batch(input, "status", "id", &executor).await.unwrap();

        assert_eq!(executor.calls().len(), 2, "row after the failed one must still be attempted");
        assert_eq!(
            summary,
            BatchSummary { rows_processed: 2, rows_failed: 1, rows_affected: 1 }
        );
    }

    #[tokio::test]
    async fn zero_rows_affected_is_success_not_failure() {
        // a second run of an already-applied batch matches nothing, every
        // row must still be logged as a success
        let input = Cursor::new("id,status\n1,active\n2,active\n");
        let executor = RecordingExecutor::affecting(0);

        let summary = run_batch(input, "status", "id", &executor).await.unwrap();

        assert_eq!(executor.calls().len(), 2);
        assert_eq!(
            summary,
            BatchSummary { rows_processed: 2, rows_failed: 0, rows_affected: 0 }
        );
    }

    #[tokio::test]
    async fn empty_input_is_fatal() {
        let executor = RecordingExecutor::default();

        let err = run_batch(Cursor::new(""), "status", "id", &executor).await.unwrap_err();

        assert!(matches!(err, BatchError::EmptyFile));
        assert!(executor.calls().is_empty());
    }

    #[tokio::test]
    async fn unknown_column_aborts_before_any_row() {
        let input = Cursor::new("id,name\n1,Alice\n2,Bob\n");
        let executor = RecordingExecutor::default();

        let err = run_batch(input, "status", "id", &executor).await.unwrap_err();

        assert!(matches!(err, BatchError::ColumnNotFound(name) if name == "status"));
        assert!(executor.calls().is_empty(), "no update may run without a column binding");
    }

    #[tokio::test]
    async fn header_only_input_completes_with_empty_summary() {
        let input = Cursor::new("id,name,status\n");
        let executor = RecordingExecutor::default();

        let summary = run_batch(input, "status", "id", &executor).await.unwrap();

        assert_eq!(summary, BatchSummary::default());
        assert!(executor.calls().is_empty());
    }

    #[tokio::test]
    async fn field_values_pass_through_verbatim() {
        let input = Cursor::new("id,status\n 42 ,\" active \"\n");
        let executor = RecordingExecutor::default();

        run_batch(input, "status", "id", &executor).await.unwrap();

        assert_eq!(executor.calls(), vec![(" active ".to_string(), " 42 ".to_string())]);
    }

    #[tokio::test]
    async fn runs_against_a_file_on_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "id,status\n1,active\n2,active\n").unwrap();

        let executor = RecordingExecutor::default();
        let input = std::fs::File::open(file.path()).unwrap();

        let summary = run_batch(input, "status", "id", &executor).await.unwrap();

        assert_eq!(
            summary,
            BatchSummary { rows_processed: 2, rows_failed: 0, rows_affected: 2 }
        );
    }
}
