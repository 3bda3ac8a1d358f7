// `faceap sheets` and `faceap run`: workbook in, pipeline tables out.

use std::path::{Path, PathBuf};

use faceap_io::{csv, xlsx, DEFAULT_EAP_SHEET, DEFAULT_FAC_SHEET};
use faceap_recon::{Pipeline, PipelineInput, PipelineOutput, Preset, Table, TracingSink};

use crate::{load_config, CliError};

pub struct RunArgs {
    pub workbook: PathBuf,
    pub fac_sheet: Option<String>,
    pub eap_sheet: Option<String>,
    pub preset: Preset,
    pub config: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub csv_dir: Option<PathBuf>,
    pub json: bool,
}

pub fn cmd_sheets(workbook: &Path) -> Result<(), CliError> {
    for name in list_sheets(workbook)? {
        println!("{}", name);
    }
    Ok(())
}

pub fn cmd_run(args: RunArgs) -> Result<(), CliError> {
    let config = load_config(args.config.as_deref())?;
    let names = list_sheets(&args.workbook)?;

    let fac_name = resolve_sheet(&names, args.fac_sheet.as_deref(), DEFAULT_FAC_SHEET)?;
    let fac = read_table(&args.workbook, &fac_name)?;

    let eap = match args.preset {
        Preset::Consolidation => {
            let eap_name = resolve_sheet(&names, args.eap_sheet.as_deref(), DEFAULT_EAP_SHEET)?;
            Some(read_table(&args.workbook, &eap_name)?)
        }
        Preset::FacOnly | Preset::FacLong => None,
    };

    let input = PipelineInput { fac: Some(fac), eap };
    let output = Pipeline::new(config, &TracingSink).run(args.preset, &input)?;
    let sheets = output.sheets();

    if let Some(path) = &args.output {
        xlsx::write_workbook(path, &sheets)
            .map_err(|e| CliError::io(format!("{}: {}", path.display(), e)))?;
    }

    if let Some(dir) = &args.csv_dir {
        std::fs::create_dir_all(dir)
            .map_err(|e| CliError::io(format!("{}: {}", dir.display(), e)))?;
        for (name, table) in &sheets {
            let path = dir.join(format!("{}.csv", name));
            csv::export(table, &path)
                .map_err(|e| CliError::io(format!("{}: {}", path.display(), e)))?;
        }
    }

    if args.json {
        println!("{}", render_json(args.preset, &sheets)?);
    }

    eprintln!("{}", summary(&output));
    Ok(())
}

fn list_sheets(workbook: &Path) -> Result<Vec<String>, CliError> {
    xlsx::sheet_names(workbook).map_err(|e| CliError::io(format!("{}: {}", workbook.display(), e)))
}

/// An explicit name must exist; otherwise fall back to the default name or
/// the first sheet.
fn resolve_sheet(names: &[String], explicit: Option<&str>, default: &str) -> Result<String, CliError> {
    match explicit {
        Some(name) if names.iter().any(|n| n == name) => Ok(name.to_string()),
        Some(name) => Err(CliError::args(format!("no sheet named '{}'", name))
            .with_hint(format!("available sheets: {}", names.join(", ")))),
        None => xlsx::pick_sheet(names, default)
            .ok_or_else(|| CliError::args("workbook has no sheets")),
    }
}

fn read_table(workbook: &Path, sheet: &str) -> Result<Table, CliError> {
    let table = xlsx::read_sheet(workbook, sheet)
        .map_err(|e| CliError::io(format!("{} [{}]: {}", workbook.display(), sheet, e)))?;
    tracing::debug!(sheet, rows = table.height(), columns = table.width(), "sheet read");
    Ok(table)
}

fn render_json(preset: Preset, sheets: &[(&str, &Table)]) -> Result<String, CliError> {
    let tables: serde_json::Map<String, serde_json::Value> = sheets
        .iter()
        .map(|(name, table)| {
            serde_json::to_value(table).map(|value| (name.to_string(), value))
        })
        .collect::<Result<_, _>>()
        .map_err(|e| CliError::other(format!("json: {}", e)))?;
    let doc = serde_json::json!({
        "preset": preset.to_string(),
        "sheets": tables,
    });
    serde_json::to_string_pretty(&doc).map_err(|e| CliError::other(format!("json: {}", e)))
}

fn summary(output: &PipelineOutput) -> String {
    match output {
        PipelineOutput::Fac(table) => {
            format!("fac-only: {} rows, {} columns", table.height(), table.width())
        }
        PipelineOutput::FacLong(table) => format!("fac-long: {} rows", table.height()),
        PipelineOutput::Consolidation(c) => format!(
            "consolidation: {} FAC rows, {} EAP items, {} consolidated rows",
            c.fac.height(),
            c.eap.height(),
            c.consolidated.height()
        ),
    }
}
