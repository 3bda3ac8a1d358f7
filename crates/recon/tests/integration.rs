use faceap_recon::config::ReconConfig;
use faceap_recon::model::{Cell, Table};
use faceap_recon::{
    Consolidation, InvalidInput, NullSink, Pipeline, PipelineInput, PipelineOutput, Preset,
    RecordingSink, ReconError, TableKind, TraceEvent,
};

fn t(s: &str) -> Cell {
    Cell::text(s)
}

fn n(v: f64) -> Cell {
    Cell::Number(v)
}

fn blank() -> Cell {
    Cell::Blank
}

/// FAC sheet: title rows above the real header, then one data row.
fn fac_sheet() -> Table {
    Table::from_rows(
        ["FAC - FORMAÇÃO", "Unnamed: 1", "Unnamed: 2"],
        vec![
            [t("Proposta 2024-118"), blank(), blank()],
            [blank(), blank(), blank()],
            [t("DESCRIÇÃO"), t("QTDE"), t("MAT. GERAL")],
            [t("Core assembly"), n(2.0), n(120.0)],
        ],
    )
}

/// EAP sheet from the reference scenario: a subsection, a tag group and a
/// single leaf with quantity 2 and total 500.
fn scenario_eap() -> Table {
    Table::from_rows(
        ["EAP", "Unnamed: 1", "UN", "QTD", "VALOR TOTAL"],
        vec![
            [t("1.1"), t("Substation A"), blank(), blank(), blank()],
            [t("1.1.1"), t("TAG100 - Transformer"), blank(), blank(), blank()],
            [t("1.1.1.1"), t("Core assembly"), t("un"), n(2.0), n(500.0)],
        ],
    )
}

/// Scenario EAP padded with enough priced rows to pass the default numeric
/// column threshold, including a multi-tag group and an orphan leaf.
fn full_eap() -> Table {
    let mut rows = scenario_eap().rows;
    rows.push(vec![t("1.2"), t("Substation B"), blank(), blank(), blank()]);
    rows.push(vec![t("1.2.1"), t("P-01/P-02 - Pumps"), blank(), blank(), blank()]);
    rows.push(vec![t("1.2.1.1"), t("Pump skid"), t("un"), t("2"), t("R$ 1500,00")]);
    rows.push(vec![t("1.2.1.2"), t("Pump motor"), t("un"), t("2"), t("R$ 800,5")]);
    rows.push(vec![t("1.2.1.3"), t("Coupling"), t("un"), t("4"), t("1.234,56")]);
    rows.push(vec![t("1.1.1.2"), t("Core assembly"), t("un"), n(1.0), n(90.0)]);
    rows.push(vec![t("4.4.4.4"), t("Loose cable"), t("m"), n(100.0), n(300.0)]);
    rows.push(vec![blank(), t("TOTAL GERAL"), blank(), n(1.0), n(3190.5)]);
    Table::new(scenario_eap().columns, rows)
}

fn consolidate(fac: &Table, eap: &Table, config: ReconConfig) -> Result<Consolidation, ReconError> {
    Pipeline::new(config, &NullSink).consolidate(Some(fac), Some(eap))
}

fn value<'a>(table: &'a Table, row: usize, label: &str) -> &'a Cell {
    table
        .cell(row, label)
        .unwrap_or_else(|| panic!("no column {label} in {:?}", table.columns))
}

// -------------------------------------------------------------------------
// Reference scenario
// -------------------------------------------------------------------------

#[test]
fn reference_scenario() {
    // The scenario sheet has a single priced row, so the numeric threshold
    // is lowered to accept one value per column.
    let config = ReconConfig {
        min_numeric_values: 0,
        ..ReconConfig::default()
    };
    let out = consolidate(&fac_sheet(), &scenario_eap(), config).unwrap();

    let c = &out.consolidated;
    assert_eq!(c.height(), 1);
    assert_eq!(
        c.columns,
        vec!["ITEM", "SUBESTACAO", "TAG_CODE", "TAG_DESCRICAO", "DESCRICAO", "TOTAL", "MAT. GERAL"]
    );
    assert_eq!(value(c, 0, "ITEM"), &t("1.1.1.1"));
    assert_eq!(value(c, 0, "SUBESTACAO"), &t("Substation A"));
    assert_eq!(value(c, 0, "TAG_CODE"), &t("TAG100"));
    assert_eq!(value(c, 0, "TAG_DESCRICAO"), &t("Transformer"));
    assert_eq!(value(c, 0, "MAT. GERAL"), &n(120.0));
    assert!(c.columns.iter().all(|col| !col.starts_with("QTDE")));
    assert!(!c.columns.iter().any(|col| col == "TAG_RAW"));

    assert_eq!(out.fac.columns, vec!["DESCRIÇÃO", "QTDE", "MAT. GERAL"]);
    assert_eq!(out.eap.columns, vec!["ITEM", "DESCRICAO", "QTDE", "TOTAL"]);
    assert_eq!(out.eap.rows, vec![vec![t("1.1.1.1"), t("Core assembly"), n(2.0), n(500.0)]]);
}

#[test]
fn reference_scenario_fails_default_threshold() {
    let err = consolidate(&fac_sheet(), &scenario_eap(), ReconConfig::default()).unwrap_err();
    assert_eq!(err, ReconError::MissingColumn { table: TableKind::Eap, column: "QTDE".into() });
}

// -------------------------------------------------------------------------
// Full consolidation
// -------------------------------------------------------------------------

#[test]
fn full_consolidation() {
    let out = consolidate(&fac_sheet(), &full_eap(), ReconConfig::default()).unwrap();

    // "1.234,56" is not a number, so the coupling row has no total.
    let items: Vec<String> = out.eap.column_values("ITEM").iter().map(|c| c.as_text()).collect();
    assert_eq!(items, vec!["1.1.1.1", "1.2.1.1", "1.2.1.2", "1.1.1.2", "4.4.4.4"]);
    assert_eq!(value(&out.eap, 2, "TOTAL"), &n(800.5));

    let c = &out.consolidated;
    let rows: Vec<(String, String, String)> = (0..c.height())
        .map(|i| {
            (
                value(c, i, "ITEM").as_text(),
                value(c, i, "TAG_CODE").as_text(),
                value(c, i, "SUBESTACAO").as_text(),
            )
        })
        .collect();
    assert_eq!(
        rows,
        vec![
            ("1.1.1.1".into(), "TAG100".into(), "Substation A".into()),
            ("1.2.1.1".into(), "P-01".into(), "Substation B".into()),
            ("1.2.1.1".into(), "P-02".into(), "Substation B".into()),
            ("1.2.1.2".into(), "P-01".into(), "Substation B".into()),
            ("1.2.1.2".into(), "P-02".into(), "Substation B".into()),
            ("1.1.1.2".into(), "TAG100".into(), "Substation A".into()),
            ("4.4.4.4".into(), "".into(), "".into()),
        ]
    );

    // Matched by description, both rows named "Core assembly" get the FAC value.
    assert_eq!(value(c, 0, "MAT. GERAL"), &n(120.0));
    assert_eq!(value(c, 5, "MAT. GERAL"), &n(120.0));
    // Unmatched rows are zero, never blank.
    for i in 1..5 {
        assert_eq!(value(c, i, "MAT. GERAL"), &n(0.0));
    }
    assert_eq!(value(c, 6, "MAT. GERAL"), &n(0.0));
    assert_eq!(value(c, 1, "TAG_DESCRICAO"), &t("Pumps"));
}

#[test]
fn trace_reports_every_stage() {
    let sink = RecordingSink::new();
    Pipeline::new(ReconConfig::default(), &sink)
        .consolidate(Some(&fac_sheet()), Some(&full_eap()))
        .unwrap();
    let events = sink.events();

    assert!(events.contains(&TraceEvent::HeaderLocated { table: TableKind::Fac, row: 1 }));
    assert!(events.contains(&TraceEvent::LeavesIndexed {
        leaves: 5,
        subsections: 2,
        tags: 2,
        orphans: 1
    }));
    assert!(events.contains(&TraceEvent::Joined {
        rows: 5,
        matched: 2,
        unmatched: 3,
        duplicate_keys: 0
    }));
    assert!(events.contains(&TraceEvent::Exploded { input: 5, output: 7 }));
}

#[test]
fn deny_list_policy_picks_up_unlisted_disciplines() {
    let fac = Table::from_rows(
        ["A", "B", "C", "D"],
        vec![
            [t("DESCRIÇÃO"), t("HH ELETRICA"), t("VALOR UNIT"), t("% BDI")],
            [t("Core assembly"), t("7,5"), t("100"), t("10")],
        ],
    );
    let config = ReconConfig {
        column_policy: faceap_recon::ColumnPolicy::DenyList,
        ..ReconConfig::default()
    };
    let out = consolidate(&fac, &full_eap(), config).unwrap();
    assert_eq!(out.fac.columns, vec!["DESCRIÇÃO", "HH ELETRICA"]);
    assert_eq!(value(&out.consolidated, 0, "HH ELETRICA"), &n(7.5));
}

// -------------------------------------------------------------------------
// Contracts
// -------------------------------------------------------------------------

#[test]
fn rerun_is_idempotent_and_inputs_untouched() {
    let fac = fac_sheet();
    let eap = full_eap();
    let (fac_before, eap_before) = (fac.clone(), eap.clone());

    let pipeline = Pipeline::new(ReconConfig::default(), &NullSink);
    let input = PipelineInput { fac: Some(fac), eap: Some(eap) };
    let first = pipeline.run(Preset::Consolidation, &input).unwrap();
    let second = pipeline.run(Preset::Consolidation, &input).unwrap();

    assert_eq!(first, second);
    assert_eq!(input.fac.as_ref(), Some(&fac_before));
    assert_eq!(input.eap.as_ref(), Some(&eap_before));

    let PipelineOutput::Consolidation(c) = first else {
        panic!("expected consolidation output");
    };
    let json_a = serde_json::to_string(&c).unwrap();
    let PipelineOutput::Consolidation(c2) = second else {
        panic!("expected consolidation output");
    };
    assert_eq!(json_a, serde_json::to_string(&c2).unwrap());
}

#[test]
fn fail_fast_errors() {
    let pipeline = Pipeline::new(ReconConfig::default(), &NullSink);

    let err = pipeline.consolidate(None, Some(&full_eap())).unwrap_err();
    assert_eq!(err, ReconError::Validation { table: TableKind::Fac, reason: InvalidInput::Missing });

    let empty = Table::new(vec!["A".into()], vec![]);
    let err = pipeline.consolidate(Some(&fac_sheet()), Some(&empty)).unwrap_err();
    assert_eq!(err, ReconError::Validation { table: TableKind::Eap, reason: InvalidInput::Empty });

    let headerless = Table::from_rows(["A", "B"], vec![[t("ITEM"), t("MAT. GERAL")]]);
    let err = pipeline.consolidate(Some(&headerless), Some(&full_eap())).unwrap_err();
    assert!(matches!(err, ReconError::SchemaNotFound { .. }));
    assert!(err.to_string().contains("DESCRIÇÃO"));
}
