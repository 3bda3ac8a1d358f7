// faceap CLI - FAC/EAP consolidation of RD workbooks
// Reads worksheets through faceap-io, runs faceap-recon, writes xlsx/csv/json.

mod exit_codes;
mod run;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use exit_codes::{recon_exit_code, EXIT_ERROR, EXIT_IO, EXIT_SUCCESS, EXIT_USAGE};
use faceap_recon::{Preset, ReconConfig, ReconError};

#[derive(Parser)]
#[command(name = "faceap")]
#[command(about = "Consolidate the FAC cost breakdown with the EAP work breakdown of an RD workbook")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Log pipeline stages to stderr (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the sheets of a workbook
    #[command(after_help = "\
Examples:
  faceap sheets RD-2024-118.xlsm")]
    Sheets {
        /// Workbook (.xlsx, .xlsm, .xls, .ods)
        workbook: PathBuf,
    },

    /// Run a pipeline preset on a workbook
    #[command(after_help = "\
Examples:
  faceap run RD.xlsm -o consolidado.xlsx
  faceap run RD.xlsm --fac-sheet 'FAC rev2' --eap-sheet EAP --json
  faceap run RD.xlsm --preset fac-only --csv-dir out/
  faceap run RD.xlsm --config template.toml -o out.xlsx")]
    Run {
        /// Workbook (.xlsx, .xlsm, .xls, .ods)
        workbook: PathBuf,

        /// FAC sheet (default: the sheet named FAC, else the first sheet)
        #[arg(long)]
        fac_sheet: Option<String>,

        /// EAP sheet (default: the sheet named EAP, else the first sheet)
        #[arg(long)]
        eap_sheet: Option<String>,

        /// Pipeline preset
        #[arg(long, value_enum, default_value_t = PresetArg::Consolidation)]
        preset: PresetArg,

        /// TOML file overriding the label vocabulary and thresholds
        #[arg(long, env = "FACEAP_CONFIG")]
        config: Option<PathBuf>,

        /// Write the output tables as sheets of this xlsx file
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Write each output table as <SHEET>.csv into this directory
        #[arg(long)]
        csv_dir: Option<PathBuf>,

        /// Print the output tables as JSON on stdout
        #[arg(long)]
        json: bool,
    },

    /// Inspect or validate pipeline configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Parse and validate a config file
    Validate {
        /// TOML config file
        file: PathBuf,
    },

    /// Print the effective configuration as TOML
    Show {
        /// Config file layered over the defaults
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PresetArg {
    Consolidation,
    FacOnly,
    FacLong,
}

impl From<PresetArg> for Preset {
    fn from(arg: PresetArg) -> Self {
        match arg {
            PresetArg::Consolidation => Preset::Consolidation,
            PresetArg::FacOnly => Preset::FacOnly,
            PresetArg::FacLong => Preset::FacLong,
        }
    }
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\ncore:    faceap-recon ", env!("CARGO_PKG_VERSION"),
        "\nbuild:   ", env!("FACEAP_PROFILE"),
        "\ntarget:  ", env!("TARGET"),
    )
}

fn init_tracing(verbose: u8) {
    let fallback = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Sheets { workbook } => run::cmd_sheets(&workbook),
        Commands::Run {
            workbook,
            fac_sheet,
            eap_sheet,
            preset,
            config,
            output,
            csv_dir,
            json,
        } => run::cmd_run(run::RunArgs {
            workbook,
            fac_sheet,
            eap_sheet,
            preset: preset.into(),
            config,
            output,
            csv_dir,
            json,
        }),
        Commands::Config(ConfigCommands::Validate { file }) => cmd_config_validate(&file),
        Commands::Config(ConfigCommands::Show { config }) => cmd_config_show(config.as_deref()),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    pub fn other(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<ReconError> for CliError {
    fn from(err: ReconError) -> Self {
        let hint = match &err {
            ReconError::SchemaNotFound { .. } => {
                Some("check --fac-sheet; the FAC header row must contain a DESCRIÇÃO cell".to_string())
            }
            ReconError::NoFunctionColumns { .. } => {
                Some("set column_policy = \"deny_list\" in a --config file".to_string())
            }
            ReconError::MissingColumn { column, .. } if column == faceap_recon::config::QUANTITY => {
                Some("quantity and total columns need more than min_numeric_values numbers".to_string())
            }
            ReconError::ConfigParse(_) => Some("run `faceap config show` for the accepted keys".to_string()),
            _ => None,
        };
        Self { code: recon_exit_code(&err), message: err.to_string(), hint }
    }
}

/// Read and validate a config file. `None` means defaults.
pub(crate) fn load_config(path: Option<&std::path::Path>) -> Result<ReconConfig, CliError> {
    let Some(path) = path else {
        return Ok(ReconConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::io(format!("{}: {}", path.display(), e)))?;
    let config = ReconConfig::from_toml(&text)?;
    tracing::debug!(path = %path.display(), "config loaded");
    Ok(config)
}

// ============================================================================
// config
// ============================================================================

fn cmd_config_validate(file: &std::path::Path) -> Result<(), CliError> {
    let config = load_config(Some(file))?;
    println!(
        "ok: {} ({} policy, marker '{}')",
        file.display(),
        config.column_policy,
        config.marker
    );
    Ok(())
}

fn cmd_config_show(file: Option<&std::path::Path>) -> Result<(), CliError> {
    let config = load_config(file)?;
    print!("{}", config.to_toml()?);
    Ok(())
}
