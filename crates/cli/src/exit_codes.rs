//! CLI Exit Code Registry
//!
//! Single source of truth for `faceap` exit codes. Scripts rely on them.
//!
//! | Range   | Domain    | Description                                  |
//! |---------|-----------|----------------------------------------------|
//! | 0       | Universal | Success                                      |
//! | 1       | Universal | General error (unspecified)                  |
//! | 2       | Universal | CLI usage error (bad args, unknown sheet)    |
//! | 3       | io        | Workbook or output file not accessible       |
//! | 10-19   | pipeline  | Config and reconciliation failures           |

use faceap_recon::ReconError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, unknown sheet name.
pub const EXIT_USAGE: u8 = 2;

/// Reading the workbook or writing an output failed.
pub const EXIT_IO: u8 = 3;

/// Config file failed to parse or validate.
pub const EXIT_CONFIG_INVALID: u8 = 10;

/// Input table missing, empty or malformed.
pub const EXIT_VALIDATION: u8 = 11;

/// Header marker, required column or function columns not found.
pub const EXIT_SCHEMA: u8 = 12;

/// Filtering left no usable EAP rows.
pub const EXIT_NO_VALID_ROWS: u8 = 13;

/// Map a pipeline error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => EXIT_CONFIG_INVALID,
        ReconError::Validation { .. } => EXIT_VALIDATION,
        ReconError::SchemaNotFound { .. }
        | ReconError::MissingColumn { .. }
        | ReconError::NoFunctionColumns { .. } => EXIT_SCHEMA,
        ReconError::NoValidRows { .. } => EXIT_NO_VALID_ROWS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faceap_recon::{InvalidInput, TableKind};

    #[test]
    fn pipeline_errors_map_to_distinct_ranges() {
        let cases = [
            (ReconError::ConfigParse("x".into()), EXIT_CONFIG_INVALID),
            (
                ReconError::Validation { table: TableKind::Fac, reason: InvalidInput::Missing },
                EXIT_VALIDATION,
            ),
            (
                ReconError::SchemaNotFound { table: TableKind::Fac, marker: "DESCRIÇÃO".into() },
                EXIT_SCHEMA,
            ),
            (
                ReconError::NoValidRows { table: TableKind::Eap, filter: "x".into() },
                EXIT_NO_VALID_ROWS,
            ),
        ];
        for (err, code) in cases {
            assert_eq!(recon_exit_code(&err), code, "{err}");
        }
    }
}
