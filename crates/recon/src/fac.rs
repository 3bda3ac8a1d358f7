//! FAC extraction: find the real header, keep the description plus the
//! discipline columns, coerce the latter to numbers.

use crate::coerce::{coerce_columns, CoercePolicy};
use crate::config::ReconConfig;
use crate::error::{ReconError, TableKind};
use crate::model::{Cell, Table};
use crate::normalize::normalize;
use crate::schema::{detect, has_label};
use crate::trace::{TraceEvent, TraceSink};
use crate::validate::validate_input;

/// Long-format column holding the function (discipline) name.
pub const FUNCTION: &str = "FUNCAO";
/// Long-format column holding the function value.
pub const VALUE: &str = "VALOR";

#[derive(Debug, Clone, PartialEq)]
pub struct FacOutcome {
    /// Description column followed by the function columns.
    pub table: Table,
    /// Label of the description column, used as the join key.
    pub key: String,
}

pub fn process_fac(
    input: Option<&Table>,
    config: &ReconConfig,
    sink: &dyn TraceSink,
) -> Result<FacOutcome, ReconError> {
    let raw = validate_input(input, TableKind::Fac, sink)?;

    let normalized = normalize(raw);
    sink.record(&TraceEvent::Normalized {
        table: TableKind::Fac,
        rows: normalized.height(),
        dropped: raw.height() - normalized.height(),
    });

    let schema = detect(&normalized, TableKind::Fac, config)?;
    sink.record(&TraceEvent::HeaderLocated {
        table: TableKind::Fac,
        row: schema.header_row,
    });

    let mut promoted = schema.table;
    coerce_columns(
        &mut promoted,
        &schema.function_columns,
        CoercePolicy::Zero,
        &config.currency_token,
    );

    let mut selection = vec![schema.label_column];
    selection.extend_from_slice(&schema.function_columns);
    let mut table = promoted.select(&selection);
    sink.record(&TraceEvent::FunctionColumns {
        policy: config.column_policy,
        labels: table.columns[1..].to_vec(),
    });

    let before = table.height();
    table.rows.retain(|row| row.first().is_some_and(has_label));
    sink.record(&TraceEvent::RowsFiltered {
        table: TableKind::Fac,
        kept: table.height(),
        dropped: before - table.height(),
    });

    let key = table.columns[0].clone();
    Ok(FacOutcome { table, key })
}

/// Unpivot a processed FAC table into one row per (description, function).
pub fn to_long(fac: &FacOutcome) -> Table {
    let columns = vec![fac.key.clone(), FUNCTION.to_string(), VALUE.to_string()];
    let mut rows = Vec::with_capacity(fac.table.height() * fac.table.width().saturating_sub(1));
    for row in &fac.table.rows {
        let label = row.first().cloned().unwrap_or(Cell::Blank);
        for (function, value) in fac.table.columns.iter().zip(row.iter()).skip(1) {
            rows.push(vec![label.clone(), Cell::Text(function.clone()), value.clone()]);
        }
    }
    Table { columns, rows }
}
