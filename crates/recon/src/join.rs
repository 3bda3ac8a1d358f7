//! Left join of processed FAC rows onto indexed EAP leaves.

use std::collections::HashMap;

use crate::config::{ReconConfig, ITEM, MARKER_ASCII, SUBSECTION, TAG_CODE, TAG_DESCRIPTION, TAG_RAW};
use crate::error::{ReconError, TableKind};
use crate::model::{Cell, Table};

/// Suffix for FAC function columns whose label already exists on the EAP side.
pub const PROBE_SUFFIX: &str = "_FAC";

/// Column order every consolidated table starts with.
pub const PRIORITY_COLUMNS: [&str; 5] = [ITEM, SUBSECTION, TAG_CODE, TAG_DESCRIPTION, TAG_RAW];

#[derive(Debug, Clone, PartialEq)]
pub struct JoinOutcome {
    pub table: Table,
    pub matched: usize,
    pub unmatched: usize,
    pub duplicate_keys: usize,
}

/// Join key: the trimmed text of a description cell.
fn key_of(cell: &Cell) -> String {
    cell.as_text().trim().to_string()
}

/// Left-join `probe` (processed FAC) onto `base` (indexed leaves).
///
/// `probe_key` is the FAC description column, matched by exact text against
/// the base `DESCRICAO` column. Every other probe column is a function column
/// and is carried over, defaulting to 0 for unmatched leaves. Duplicate probe
/// keys keep their first row, so the output has exactly one row per base row.
/// Quantity columns from either side are dropped and the result is put in
/// priority order.
pub fn left_join(
    base: &Table,
    probe: &Table,
    probe_key: &str,
    config: &ReconConfig,
) -> Result<JoinOutcome, ReconError> {
    let base_key = base
        .column_index(MARKER_ASCII)
        .ok_or_else(|| ReconError::MissingColumn {
            table: TableKind::Eap,
            column: MARKER_ASCII.into(),
        })?;
    let probe_key_idx = probe
        .column_index(probe_key)
        .ok_or_else(|| ReconError::MissingColumn {
            table: TableKind::Fac,
            column: probe_key.into(),
        })?;

    // First row wins per key.
    let mut lookup: HashMap<String, usize> = HashMap::new();
    let mut duplicate_keys = 0;
    for (i, row) in probe.rows.iter().enumerate() {
        let Some(cell) = row.get(probe_key_idx) else {
            continue;
        };
        if lookup.contains_key(&key_of(cell)) {
            duplicate_keys += 1;
        } else {
            lookup.insert(key_of(cell), i);
        }
    }

    let carried: Vec<usize> = (0..probe.width()).filter(|&i| i != probe_key_idx).collect();

    let mut columns = base.columns.clone();
    for &i in &carried {
        let label = probe.columns.get(i).cloned().unwrap_or_default();
        if base.columns.contains(&label) {
            columns.push(format!("{label}{PROBE_SUFFIX}"));
        } else {
            columns.push(label);
        }
    }

    let mut matched = 0;
    let mut rows = Vec::with_capacity(base.height());
    for row in &base.rows {
        let hit = row
            .get(base_key)
            .and_then(|cell| lookup.get(&key_of(cell)))
            .and_then(|&i| probe.rows.get(i));
        if hit.is_some() {
            matched += 1;
        }

        let mut out = row.clone();
        for &i in &carried {
            let value = hit
                .and_then(|p| p.get(i))
                .and_then(Cell::as_number)
                .unwrap_or(0.0);
            out.push(Cell::Number(value));
        }
        rows.push(out);
    }

    let joined = Table { columns, rows }.drop_columns_where(|label| config.is_quantity_label(label));
    let unmatched = base.height() - matched;

    Ok(JoinOutcome {
        table: order_columns(&joined),
        matched,
        unmatched,
        duplicate_keys,
    })
}

/// Put the priority columns first (those present), then everything else in
/// its current order.
pub fn order_columns(table: &Table) -> Table {
    let mut order: Vec<usize> = PRIORITY_COLUMNS
        .iter()
        .filter_map(|label| table.column_index(label))
        .collect();
    let rest: Vec<usize> = (0..table.width()).filter(|i| !order.contains(i)).collect();
    order.extend(rest);
    table.select(&order)
}
