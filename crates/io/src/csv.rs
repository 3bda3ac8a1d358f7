// CSV export of result tables

use std::io::Write;
use std::path::Path;

use faceap_recon::model::{Cell, Table};

/// Serialize a table as CSV: one header record, then one record per row.
/// Numbers are written in shortest round-trip form, blanks as empty fields.
pub fn write_to<W: Write>(writer: W, table: &Table) -> Result<(), String> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(&table.columns)
        .map_err(|e| format!("CSV write error: {}", e))?;
    for row in &table.rows {
        wtr.write_record(row.iter().map(Cell::as_text))
            .map_err(|e| format!("CSV write error: {}", e))?;
    }
    wtr.flush().map_err(|e| format!("CSV flush error: {}", e))
}

pub fn export(table: &Table, path: &Path) -> Result<(), String> {
    let file = std::fs::File::create(path)
        .map_err(|e| format!("Failed to create {}: {}", path.display(), e))?;
    write_to(file, table)
}

pub fn to_string(table: &Table) -> Result<String, String> {
    let mut buf = Vec::new();
    write_to(&mut buf, table)?;
    String::from_utf8(buf).map_err(|e| format!("CSV output is not UTF-8: {}", e))
}
