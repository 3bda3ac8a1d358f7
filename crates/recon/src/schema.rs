//! Header detection and column classification for loosely structured sheets.
//!
//! Resolution happens in two passes. [`locate_header`] scans rows in order
//! and stops at the first one that carries the marker label. [`detect`]
//! then checks every promoted label against a [`RoleTable`] built from the
//! config, under either the allow-list or the deny-list policy.

use crate::config::{ColumnPolicy, ReconConfig};
use crate::error::{ReconError, TableKind};
use crate::model::{Cell, Table};

/// Index of the first row containing `marker` in any cell, compared on
/// trimmed, upper-cased text.
pub fn locate_header(table: &Table, marker: &str) -> Option<usize> {
    let wanted = marker.trim().to_uppercase();
    table.rows.iter().position(|row| {
        row.iter()
            .any(|cell| cell.as_text().trim().to_uppercase() == wanted)
    })
}

/// Make row `header` the column header. Earlier rows are discarded and later
/// rows become data. Blank header cells become empty labels.
pub fn promote_header(table: &Table, header: usize) -> Table {
    let columns = table
        .rows
        .get(header)
        .map(|row| row.iter().map(|c| c.as_text().trim().to_string()).collect())
        .unwrap_or_default();
    let rows = table.rows.iter().skip(header + 1).cloned().collect();
    Table { columns, rows }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Declarative role table, upper-cased once up front.
#[derive(Debug, Clone)]
pub struct RoleTable {
    policy: ColumnPolicy,
    allow: Vec<String>,
    deny_substrings: Vec<String>,
    label_columns: Vec<String>,
}

impl RoleTable {
    pub fn from_config(config: &ReconConfig) -> Self {
        let upper = |list: &[String]| list.iter().map(|s| s.trim().to_uppercase()).collect();
        let mut label_columns: Vec<String> = upper(&config.label_columns);
        label_columns.push(config.marker.trim().to_uppercase());
        Self {
            policy: config.column_policy,
            allow: upper(&config.function_allow_list),
            deny_substrings: upper(&config.deny_substrings),
            label_columns,
        }
    }

    pub fn policy(&self) -> ColumnPolicy {
        self.policy
    }

    /// Whether `label` names a function (discipline) column.
    pub fn is_function(&self, label: &str) -> bool {
        let label = label.trim().to_uppercase();
        if label.is_empty() || self.label_columns.contains(&label) {
            return false;
        }
        match self.policy {
            ColumnPolicy::AllowList => self.allow.contains(&label),
            ColumnPolicy::DenyList => !self
                .deny_substrings
                .iter()
                .any(|s| label.contains(s.as_str())),
        }
    }
}

/// Outcome of schema resolution on the FAC sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    /// Row index (in the normalized input) that became the header.
    pub header_row: usize,
    /// Position of the marker (description) column in `table`.
    pub label_column: usize,
    /// Positions of the function columns in `table`, in sheet order.
    pub function_columns: Vec<usize>,
    /// The table with its header promoted.
    pub table: Table,
}

/// Run both passes on a normalized table.
pub fn detect(table: &Table, kind: TableKind, config: &ReconConfig) -> Result<Schema, ReconError> {
    let header_row = locate_header(table, &config.marker).ok_or_else(|| {
        ReconError::SchemaNotFound {
            table: kind,
            marker: config.marker.clone(),
        }
    })?;
    let promoted = promote_header(table, header_row);

    let marker = config.marker.trim();
    let label_column = promoted
        .columns
        .iter()
        .position(|c| c == marker)
        .ok_or_else(|| ReconError::MissingColumn {
            table: kind,
            column: config.marker.clone(),
        })?;

    let roles = RoleTable::from_config(config);
    let function_columns: Vec<usize> = promoted
        .columns
        .iter()
        .enumerate()
        .filter(|(i, label)| *i != label_column && roles.is_function(label))
        .map(|(i, _)| i)
        .collect();

    if function_columns.is_empty() {
        return Err(ReconError::NoFunctionColumns {
            policy: roles.policy().to_string(),
            columns: promoted.columns.clone(),
        });
    }

    Ok(Schema {
        header_row,
        label_column,
        function_columns,
        table: promoted,
    })
}

/// True if the cell is usable as a row label.
pub fn has_label(cell: &Cell) -> bool {
    !matches!(cell, Cell::Blank)
}
