use crate::error::{InvalidInput, ReconError, TableKind};
use crate::model::Table;
use crate::trace::{TraceEvent, TraceSink};

/// Reject input that is absent, empty, headerless or ragged.
pub fn validate_input<'t>(
    table: Option<&'t Table>,
    kind: TableKind,
    sink: &dyn TraceSink,
) -> Result<&'t Table, ReconError> {
    let invalid = |reason| ReconError::Validation { table: kind, reason };

    let table = table.ok_or_else(|| invalid(InvalidInput::Missing))?;
    if table.width() == 0 {
        return Err(invalid(InvalidInput::NoColumns));
    }
    if table.is_empty() {
        return Err(invalid(InvalidInput::Empty));
    }
    if let Some((row, cells)) = table
        .rows
        .iter()
        .enumerate()
        .find(|(_, cells)| cells.len() != table.width())
    {
        return Err(invalid(InvalidInput::Ragged {
            row,
            width: cells.len(),
            expected: table.width(),
        }));
    }

    sink.record(&TraceEvent::Validated {
        table: kind,
        rows: table.height(),
        columns: table.width(),
    });
    Ok(table)
}
