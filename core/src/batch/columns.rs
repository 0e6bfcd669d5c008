use csv::StringRecord;

use crate::batch::BatchError;

/// Positions of the two role columns inside the header row. Resolved once
/// per batch before any data row is read and fixed for the life of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnBinding {
    pub set_idx: usize,
    pub where_idx: usize,
}

impl ColumnBinding {
    pub fn resolve(
        header: &StringRecord,
        set_column: &str,
        where_column: &str,
    ) -> Result<Self, BatchError> {
        Ok(ColumnBinding {
            set_idx: resolve_column(header, set_column)?,
            where_idx: resolve_column(header, where_column)?,
        })
    }
}

/// Exact-match scan over the whole header. The header comes straight out of
/// whatever produced the export and carries no ordering guarantee, so this
/// must never assume a sorted row.
pub fn resolve_column(header: &StringRecord, name: &str) -> Result<usize, BatchError> {
    header
        .iter()
        .position(|field| field == name)
        .ok_or_else(|| BatchError::ColumnNotFound(name.to_string()))
}

/// Positional read of the two bound fields, verbatim. No trimming, no casing
/// changes, no coercion. Returns `None` when the record is too short to hold
/// both positions.
pub fn extract_values<'r>(
    record: &'r StringRecord,
    binding: &ColumnBinding,
) -> Option<(&'r str, &'r str)> {
    Some((record.get(binding.set_idx)?, record.get(binding.where_idx)?))
}
