// Workbook I/O for the FAC/EAP pipeline host.
//
// The core never touches files; this crate turns worksheets into tables and
// tables back into worksheets or CSV files.

pub mod csv;
pub mod xlsx;

/// Sheet name picked when the caller does not name the FAC sheet.
pub const DEFAULT_FAC_SHEET: &str = "FAC";
/// Sheet name picked when the caller does not name the EAP sheet.
pub const DEFAULT_EAP_SHEET: &str = "EAP";
