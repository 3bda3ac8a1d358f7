use serde::Serialize;

// ---------------------------------------------------------------------------
// Cells
// ---------------------------------------------------------------------------

/// A single spreadsheet value as handed over by the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Number(f64),
    Blank,
}

impl Cell {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Blank cells and whitespace-only text both count as empty.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Blank => true,
            Self::Text(s) => s.trim().is_empty(),
            Self::Number(_) => false,
        }
    }

    /// Stringified form used for labels, keys and item codes.
    ///
    /// Numbers use the shortest round-trip decimal form, so a code typed as
    /// `3.2` in the sheet reads back as `"3.2"` and `4.0` as `"4"`.
    pub fn as_text(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Number(n) => n.to_string(),
            Self::Blank => String::new(),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

/// Ordered rows under ordered column labels.
///
/// Every row is expected to be exactly `columns.len()` wide; the pipeline
/// rejects ragged input at validation time. Labels are not required to be
/// unique (spreadsheets routinely repeat or omit headers); lookups by label
/// return the first match.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self { columns, rows }
    }

    /// Convenience constructor for fixed-width literal tables.
    pub fn from_rows<const N: usize>(columns: [&str; N], rows: Vec<[Cell; N]>) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: rows.into_iter().map(Vec::from).collect(),
        }
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, label: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == label)
    }

    pub fn cell(&self, row: usize, label: &str) -> Option<&Cell> {
        let idx = self.column_index(label)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }

    /// All values of one column, top to bottom.
    pub fn column_values(&self, label: &str) -> Vec<&Cell> {
        match self.column_index(label) {
            Some(idx) => self.rows.iter().filter_map(|r| r.get(idx)).collect(),
            None => Vec::new(),
        }
    }

    /// Keep only the given column positions, in the given order.
    pub fn select(&self, indices: &[usize]) -> Table {
        let columns = indices
            .iter()
            .filter_map(|&i| self.columns.get(i).cloned())
            .collect();
        let rows = self
            .rows
            .iter()
            .map(|row| {
                indices
                    .iter()
                    .map(|&i| row.get(i).cloned().unwrap_or(Cell::Blank))
                    .collect()
            })
            .collect();
        Table { columns, rows }
    }

    /// Drop every column whose label satisfies `pred`.
    pub fn drop_columns_where(&self, pred: impl Fn(&str) -> bool) -> Table {
        let keep: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, label)| !pred(label))
            .map(|(i, _)| i)
            .collect();
        self.select(&keep)
    }
}

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// Result of the FAC+EAP consolidation preset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Consolidation {
    pub fac: Table,
    pub eap: Table,
    pub consolidated: Table,
}
