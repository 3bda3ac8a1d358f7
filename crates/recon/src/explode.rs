//! Expansion of rows whose tag code lists several tags (`"T1/T2/T3"`).

use crate::config::{TAG_CODE, TAG_DESCRIPTION, TAG_RAW};
use crate::hierarchy::TagDescriptor;
use crate::model::{Cell, Table};

/// Tag codes listed in a `TAG_CODE` cell, trimmed, empties dropped.
pub fn split_tags(tag_code: &str) -> Vec<String> {
    tag_code
        .split('/')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Replace every multi-tag row with one clone per tag, in place.
///
/// Clones differ only in `TAG_CODE` and the recomputed `TAG_RAW`. Rows with
/// zero or one tag pass through unchanged. Tables without a `TAG_CODE`
/// column are returned as-is.
pub fn explode_tags(table: &Table) -> Table {
    let Some(code_idx) = table.column_index(TAG_CODE) else {
        return table.clone();
    };
    let desc_idx = table.column_index(TAG_DESCRIPTION);
    let raw_idx = table.column_index(TAG_RAW);

    let mut rows = Vec::with_capacity(table.height());
    for row in &table.rows {
        let tags = row.get(code_idx).map(|c| split_tags(&c.as_text())).unwrap_or_default();
        if tags.len() <= 1 {
            rows.push(row.clone());
            continue;
        }

        let description = desc_idx
            .and_then(|i| row.get(i))
            .map(Cell::as_text)
            .unwrap_or_default();
        for tag in tags {
            let mut clone = row.clone();
            if let Some(raw) = raw_idx.and_then(|i| clone.get_mut(i)) {
                *raw = Cell::Text(TagDescriptor::raw(&tag, &description));
            }
            if let Some(code) = clone.get_mut(code_idx) {
                *code = Cell::Text(tag);
            }
            rows.push(clone);
        }
    }

    Table {
        columns: table.columns.clone(),
        rows,
    }
}
