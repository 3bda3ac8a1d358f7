use std::fmt;

/// Which input table a failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Fac,
    Eap,
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fac => write!(f, "FAC"),
            Self::Eap => write!(f, "EAP"),
        }
    }
}

/// Why an input table was rejected before any transform ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidInput {
    /// The preset needs this table but none was supplied.
    Missing,
    /// No data rows.
    Empty,
    /// No column labels.
    NoColumns,
    /// A row is not as wide as the header.
    Ragged { row: usize, width: usize, expected: usize },
    /// Fewer columns than the pipeline needs to assign its roles.
    TooFewColumns { found: usize, required: usize },
}

impl fmt::Display for InvalidInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "no table was supplied"),
            Self::Empty => write!(f, "table is empty"),
            Self::NoColumns => write!(f, "table has no columns"),
            Self::Ragged { row, width, expected } => {
                write!(f, "row {row} has {width} cells, expected {expected}")
            }
            Self::TooFewColumns { found, required } => {
                write!(f, "table has {found} columns, at least {required} required")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReconError {
    /// Input missing, wrong shape, or empty.
    Validation { table: TableKind, reason: InvalidInput },
    /// No row contains the header marker.
    SchemaNotFound { table: TableKind, marker: String },
    /// A required named column is absent after header promotion.
    MissingColumn { table: TableKind, column: String },
    /// Column classification produced no discipline columns.
    NoFunctionColumns { policy: String, columns: Vec<String> },
    /// Every row was removed by the named filter.
    NoValidRows { table: TableKind, filter: String },
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (empty allow-list, blank marker).
    ConfigValidation(String),
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation { table, reason } => write!(f, "{table}: invalid input: {reason}"),
            Self::SchemaNotFound { table, marker } => {
                write!(f, "{table}: no row contains the header marker '{marker}'")
            }
            Self::MissingColumn { table, column } => {
                write!(f, "{table}: missing column '{column}'")
            }
            Self::NoFunctionColumns { policy, columns } => write!(
                f,
                "no function column detected ({policy} policy) among: {}",
                columns.join(", ")
            ),
            Self::NoValidRows { table, filter } => {
                write!(f, "{table}: no valid rows left after {filter}")
            }
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}
