// Excel import (xlsx, xlsm, xls, xlsb, ods) and export (xlsx only)
//
// Import: the first row of the used range becomes the column labels, every
// later row is data, the way a dataframe reader hands a sheet over.
// Export: one worksheet per table, header row in bold, values only.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use rust_xlsxwriter::{Format, Workbook as XlsxWorkbook};

use faceap_recon::model::{Cell, Table};

/// Maximum dimensions read from a single sheet
const MAX_ROWS: usize = 1_048_576;
const MAX_COLS: usize = 16_384;

/// List the sheet names of a workbook, in workbook order.
pub fn sheet_names(path: &Path) -> Result<Vec<String>, String> {
    let workbook = open_workbook_auto(path)
        .map_err(|e| format!("Failed to open Excel file: {}", e))?;
    Ok(workbook.sheet_names().to_vec())
}

/// Pick `preferred` if the workbook has a sheet with exactly that name,
/// otherwise the first sheet.
pub fn pick_sheet(names: &[String], preferred: &str) -> Option<String> {
    names
        .iter()
        .find(|n| n.as_str() == preferred)
        .or_else(|| names.first())
        .cloned()
}

/// Read one worksheet into a table.
pub fn read_sheet(path: &Path, sheet: &str) -> Result<Table, String> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| format!("Failed to open Excel file: {}", e))?;

    if !workbook.sheet_names().iter().any(|n| n == sheet) {
        return Err(format!("Sheet '{}' not found in {}", sheet, path.display()));
    }

    let range = workbook
        .worksheet_range(sheet)
        .map_err(|e| format!("Failed to read sheet '{}': {}", sheet, e))?;

    // Keep absolute column positions: a sheet whose data starts in column C
    // still has blank A and B columns, so positional roles stay put.
    let (_, start_col) = range.start().unwrap_or((0, 0));
    let lead = (start_col as usize).min(MAX_COLS);

    let mut grid: Vec<Vec<Cell>> = range
        .rows()
        .take(MAX_ROWS)
        .map(|row| {
            let mut cells = vec![Cell::Blank; lead];
            cells.extend(row.iter().take(MAX_COLS - lead).map(to_cell));
            cells
        })
        .collect();

    if grid.is_empty() {
        return Ok(Table::default());
    }

    let header = grid.remove(0);
    let columns = header
        .iter()
        .enumerate()
        .map(|(i, cell)| match cell {
            Cell::Blank => format!("Unnamed: {}", i),
            other => other.as_text(),
        })
        .collect();

    Ok(Table::new(columns, grid))
}

fn to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Blank,
        Data::String(s) if s.is_empty() => Cell::Blank,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(n) => Cell::Number(*n),
        Data::Int(n) => Cell::Number(*n as f64),
        Data::Bool(b) => Cell::text(if *b { "TRUE" } else { "FALSE" }),
        // Formula errors (#REF!, #DIV/0!) carry no value
        Data::Error(_) => Cell::Blank,
        // Dates as serial numbers; the pipeline never interprets them
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
    }
}

/// Write tables as named sheets of a new xlsx workbook.
pub fn write_workbook(path: &Path, sheets: &[(&str, &Table)]) -> Result<(), String> {
    let mut workbook = XlsxWorkbook::new();
    let header_format = Format::new().set_bold();

    for (name, table) in sheets {
        let worksheet = workbook
            .add_worksheet()
            .set_name(*name)
            .map_err(|e| format!("Failed to create sheet '{}': {}", name, e))?;

        for (col, label) in table.columns.iter().enumerate() {
            worksheet
                .write_string_with_format(0, col as u16, label, &header_format)
                .map_err(|e| format!("Failed to write header '{}': {}", label, e))?;
        }

        for (row_idx, row) in table.rows.iter().enumerate() {
            let r = row_idx as u32 + 1;
            for (col, cell) in row.iter().enumerate() {
                let c = col as u16;
                let written = match cell {
                    Cell::Text(s) => worksheet.write_string(r, c, s).map(|_| ()),
                    Cell::Number(n) => worksheet.write_number(r, c, *n).map(|_| ()),
                    Cell::Blank => Ok(()),
                };
                written.map_err(|e| format!("Failed to write cell ({}, {}) on '{}': {}", r, c, name, e))?;
            }
        }

        worksheet.autofit();
    }

    workbook
        .save(path)
        .map_err(|e| format!("Failed to save {}: {}", path.display(), e))
}
