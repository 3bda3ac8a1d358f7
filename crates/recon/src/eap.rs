//! EAP (WBS) extraction: fixed ITEM/DESCRICAO roles, inferred quantity and
//! total columns, and removal of everything that is not a priced item.

use crate::coerce::{coerce_columns, CoercePolicy};
use crate::config::{ReconConfig, ITEM, MARKER_ASCII, QUANTITY, TOTAL};
use crate::error::{InvalidInput, ReconError, TableKind};
use crate::model::{Cell, Table};
use crate::normalize::normalize;
use crate::trace::{TraceEvent, TraceSink};
use crate::validate::validate_input;

/// Narrowest EAP sheet the role assignment can work with.
pub const MIN_ROLE_COLUMNS: usize = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct EapOutcome {
    /// `ITEM`, `DESCRICAO`, `QTDE`, `TOTAL` for every priced item row.
    pub table: Table,
    /// Every `(ITEM, DESCRICAO)` pair before numeric filtering. Subsection and
    /// tag rows rarely carry a quantity, so ancestry is resolved from here.
    pub outline: Vec<(String, String)>,
}

impl EapOutcome {
    pub fn outline_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.outline.iter().map(|(c, d)| (c.as_str(), d.as_str()))
    }
}

/// True if the text is blank or contains one of the non-item patterns.
pub fn is_non_item(text: &str, patterns: &[String]) -> bool {
    let lower = text.trim().to_lowercase();
    lower.is_empty() || patterns.iter().any(|p| lower.contains(&p.to_lowercase()))
}

pub fn process_eap(
    input: Option<&Table>,
    config: &ReconConfig,
    sink: &dyn TraceSink,
) -> Result<EapOutcome, ReconError> {
    let raw = validate_input(input, TableKind::Eap, sink)?;

    let mut table = normalize(raw);
    sink.record(&TraceEvent::Normalized {
        table: TableKind::Eap,
        rows: table.height(),
        dropped: raw.height() - table.height(),
    });

    // ITEM, DESCRICAO and two numeric columns, whatever the config says.
    let required = config.min_eap_columns.max(MIN_ROLE_COLUMNS);
    if table.width() < required {
        return Err(ReconError::Validation {
            table: TableKind::Eap,
            reason: InvalidInput::TooFewColumns {
                found: table.width(),
                required,
            },
        });
    }

    table.columns[0] = ITEM.to_string();
    table.columns[1] = MARKER_ASCII.to_string();

    let outline = table
        .rows
        .iter()
        .map(|row| {
            let text = |i: usize| row.get(i).map(|c| c.as_text().trim().to_string()).unwrap_or_default();
            (text(0), text(1))
        })
        .collect();

    let numeric: Vec<usize> = (2..table.width()).collect();
    let counts = coerce_columns(&mut table, &numeric, CoercePolicy::Exclude, &config.currency_token);
    let candidates: Vec<usize> = numeric
        .iter()
        .zip(&counts)
        .filter(|(_, count)| **count > config.min_numeric_values)
        .map(|(&i, _)| i)
        .collect();

    let (Some(&quantity), Some(&total)) = (candidates.first(), candidates.last()) else {
        return Err(ReconError::MissingColumn {
            table: TableKind::Eap,
            column: QUANTITY.into(),
        });
    };
    sink.record(&TraceEvent::NumericRoles {
        quantity: table.columns[quantity].clone(),
        total: table.columns[total].clone(),
        candidates: candidates.len(),
    });

    let mut selected = table.select(&[0, 1, quantity, total]);
    selected.columns = vec![ITEM.into(), MARKER_ASCII.into(), QUANTITY.into(), TOTAL.into()];

    let before = selected.height();
    let positive = |cell: &Cell| cell.as_number().is_some_and(|n| n > 0.0);
    let rows: Vec<Vec<Cell>> = selected
        .rows
        .into_iter()
        .filter(|row| {
            row.len() == 4
                && positive(&row[2])
                && positive(&row[3])
                && !is_non_item(&row[0].as_text(), &config.non_item_patterns)
                && !is_non_item(&row[1].as_text(), &config.non_item_patterns)
        })
        .map(|mut row| {
            row[0] = Cell::Text(row[0].as_text().trim().to_string());
            row[1] = Cell::Text(row[1].as_text().trim().to_string());
            row
        })
        .collect();
    selected.rows = rows;

    sink.record(&TraceEvent::RowsFiltered {
        table: TableKind::Eap,
        kept: selected.height(),
        dropped: before - selected.height(),
    });

    if selected.is_empty() {
        return Err(ReconError::NoValidRows {
            table: TableKind::Eap,
            filter: "quantity > 0, total > 0 and non-item label filter".into(),
        });
    }

    Ok(EapOutcome {
        table: selected,
        outline,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::{NullSink, RecordingSink};

    fn t(s: &str) -> Cell {
        Cell::text(s)
    }

    fn n(v: f64) -> Cell {
        Cell::Number(v)
    }

    /// Header-less sheet as read by the host: codes, descriptions, a unit
    /// column, quantity, unit price and total.
    fn raw_eap() -> Table {
        let mut rows = vec![
            [t("Proposta 123"), t("Cliente X"), Cell::Blank, Cell::Blank, Cell::Blank, Cell::Blank],
            [t("1.1"), t("Substation A"), Cell::Blank, Cell::Blank, Cell::Blank, t("R$ 9.000,00")],
            [t("1.1.1"), t("TAG100 - Transformer"), Cell::Blank, Cell::Blank, Cell::Blank, Cell::Blank],
        ];
        for i in 1..=6 {
            let qty = format!("{i}");
            rows.push([
                t(&format!("1.1.1.{i}")),
                t(&format!(" Part {i} ")),
                t("un"),
                t(&qty),
                t("R$ 10,00"),
                n(10.0 * f64::from(i)),
            ]);
        }
        rows.push([Cell::Blank, t("TOTAL GERAL"), Cell::Blank, n(1.0), Cell::Blank, n(210.0)]);
        rows.push([t("1.1.1.7"), t("Free item"), t("un"), t("0"), t("R$ 0,00"), n(0.0)]);
        Table::from_rows(["EAP", "", "UN", "QTD", "PREÇO", "TOTAL"], rows)
    }

    #[test]
    fn roles_and_filters() {
        let sink = RecordingSink::new();
        let eap = process_eap(Some(&raw_eap()), &ReconConfig::default(), &sink).unwrap();
        assert_eq!(eap.table.columns, vec!["ITEM", "DESCRICAO", "QTDE", "TOTAL"]);
        assert_eq!(eap.table.height(), 6);
        assert_eq!(eap.table.rows[0], vec![t("1.1.1.1"), t("Part 1"), n(1.0), n(10.0)]);
        assert_eq!(eap.outline.len(), 11);
        assert_eq!(eap.outline[1], ("1.1".to_string(), "Substation A".to_string()));

        assert!(sink.events().contains(&TraceEvent::NumericRoles {
            quantity: "QTD".into(),
            total: "TOTAL".into(),
            candidates: 3,
        }));
    }

    #[test]
    fn too_few_columns() {
        let table = Table::from_rows(["A", "B", "C", "D"], vec![[t("1"), t("x"), n(1.0), n(1.0)]]);
        let err = process_eap(Some(&table), &ReconConfig::default(), &NullSink).unwrap_err();
        assert!(matches!(
            err,
            ReconError::Validation { reason: InvalidInput::TooFewColumns { found: 4, required: 5 }, .. }
        ));
    }

    #[test]
    fn narrow_table_rejected_even_with_lenient_config() {
        // Struct-literal configs skip validate(); the width floor still holds.
        let config = ReconConfig {
            min_eap_columns: 1,
            ..ReconConfig::default()
        };
        let table = Table::from_rows(["A"], vec![[t("1.1.1.1")]]);
        let err = process_eap(Some(&table), &config, &NullSink).unwrap_err();
        assert_eq!(
            err,
            ReconError::Validation {
                table: TableKind::Eap,
                reason: InvalidInput::TooFewColumns { found: 1, required: 4 },
            }
        );
    }

    #[test]
    fn single_numeric_column_is_quantity_and_total() {
        let rows = (1..=6)
            .map(|i| {
                [
                    t(&format!("1.1.1.{i}")),
                    t(&format!("Pump {i}")),
                    t("un"),
                    n(f64::from(i)),
                    Cell::Blank,
                ]
            })
            .collect();
        let table = Table::from_rows(["EAP", "", "UN", "VALOR", "OBS"], rows);
        let sink = RecordingSink::new();
        let eap = process_eap(Some(&table), &ReconConfig::default(), &sink).unwrap();

        assert_eq!(eap.table.height(), 6);
        for row in &eap.table.rows {
            assert_eq!(row[2], row[3], "QTDE and TOTAL come from the same column");
        }
        assert_eq!(eap.table.rows[0], vec![t("1.1.1.1"), t("Pump 1"), n(1.0), n(1.0)]);
        assert!(sink.events().contains(&TraceEvent::NumericRoles {
            quantity: "VALOR".into(),
            total: "VALOR".into(),
            candidates: 1,
        }));
    }

    #[test]
    fn no_numeric_candidates() {
        let table = Table::from_rows(
            ["A", "B", "C", "D", "E"],
            vec![[t("1.1.1.1"), t("x"), n(1.0), n(1.0), n(1.0)]],
        );
        let err = process_eap(Some(&table), &ReconConfig::default(), &NullSink).unwrap_err();
        assert_eq!(err, ReconError::MissingColumn { table: TableKind::Eap, column: "QTDE".into() });
    }

    #[test]
    fn everything_filtered() {
        let rows = (0..6)
            .map(|_| [t("1.1.1.1"), t("TOTAL"), n(1.0), n(1.0), n(1.0)])
            .collect();
        let table = Table::from_rows(["A", "B", "C", "D", "E"], rows);
        let err = process_eap(Some(&table), &ReconConfig::default(), &NullSink).unwrap_err();
        assert!(matches!(err, ReconError::NoValidRows { table: TableKind::Eap, .. }));
    }

    #[test]
    fn non_item_patterns_are_case_insensitive_substrings() {
        let patterns = ReconConfig::default().non_item_patterns;
        assert!(is_non_item("subestação 2", &patterns));
        assert!(is_non_item("Total parcial", &patterns));
        assert!(is_non_item("NaN", &patterns));
        assert!(is_non_item("", &patterns));
        assert!(!is_non_item("Core assembly", &patterns));
        assert!(!is_non_item("1.1.1.1", &patterns));
    }
}
