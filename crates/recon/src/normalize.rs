//! Label trimming and blank-row removal.

use crate::model::Table;

/// Trim every column label and drop rows whose every cell is blank.
///
/// Row order is preserved. Returns the normalized copy; the input is untouched.
pub fn normalize(table: &Table) -> Table {
    let columns = table.columns.iter().map(|c| c.trim().to_string()).collect();
    let rows = table
        .rows
        .iter()
        .filter(|row| !row.iter().all(|cell| cell.is_blank()))
        .cloned()
        .collect();
    Table { columns, rows }
}
