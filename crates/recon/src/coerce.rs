//! Locale-aware numeric coercion of spreadsheet cells.
//!
//! Text is read as Brazilian-formatted currency: the currency token is
//! removed, a decimal comma becomes a decimal point and surrounding space is
//! stripped. Thousands separators are not recognised, so
//! `"1.234,56"` turns into `"1.234.56"` and fails to parse.

use crate::model::{Cell, Table};

/// What an unparseable cell becomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoercePolicy {
    /// Unparseable is null; the caller filters such rows out later.
    Exclude,
    /// Unparseable is zero.
    Zero,
}

/// Parse one cell, returning `None` when it is not a finite number.
pub fn parse_number(cell: &Cell, currency_token: &str) -> Option<f64> {
    match cell {
        Cell::Number(n) if n.is_finite() => Some(*n),
        Cell::Number(_) | Cell::Blank => None,
        Cell::Text(s) => {
            let stripped = if currency_token.is_empty() {
                s.clone()
            } else {
                s.replace(currency_token, "")
            };
            let cleaned = stripped.replace(',', ".");
            cleaned.trim().parse::<f64>().ok().filter(|n| n.is_finite())
        }
    }
}

/// Coerce one cell under `policy`. `Exclude` yields `Cell::Blank` for nulls.
pub fn coerce_cell(cell: &Cell, policy: CoercePolicy, currency_token: &str) -> Cell {
    match (parse_number(cell, currency_token), policy) {
        (Some(n), _) => Cell::Number(n),
        (None, CoercePolicy::Zero) => Cell::Number(0.0),
        (None, CoercePolicy::Exclude) => Cell::Blank,
    }
}

/// Coerce the given column positions in place on an owned table. Returns the
/// number of non-null values per coerced column, in `columns` order.
pub fn coerce_columns(
    table: &mut Table,
    columns: &[usize],
    policy: CoercePolicy,
    currency_token: &str,
) -> Vec<usize> {
    let mut non_null = vec![0usize; columns.len()];
    for row in &mut table.rows {
        for (slot, &idx) in columns.iter().enumerate() {
            if let Some(cell) = row.get_mut(idx) {
                *cell = coerce_cell(cell, policy, currency_token);
                if !matches!(cell, Cell::Blank) {
                    non_null[slot] += 1;
                }
            }
        }
    }
    non_null
}
