// skyledger CLI - merge, match, query and normalize transient records

mod exit_codes;
mod phot;
mod query;
mod records;
mod store;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;
use skyledger_config::Settings;
use skyledger_core::{Diagnostics, Verbosity};
use skyledger_recon::{merge, spatial::separation_arcsec, MergePolicy};

use exit_codes::{
    recon_exit_code, EXIT_CONFIG, EXIT_ERROR, EXIT_NO_MATCH, EXIT_SUCCESS, EXIT_USAGE,
};
use records::{load_one, write_json, write_text};

#[derive(Parser)]
#[command(name = "skyledger")]
#[command(about = "Merge, match, query and normalize astronomical transient records")]
#[command(version)]
struct Cli {
    /// Settings file (default: <config dir>/skyledger/config.toml)
    #[arg(long, global = true, env = "SKYLEDGER_CONFIG")]
    config: Option<PathBuf>,

    /// More log output (-v info, -vv debug); SKYLEDGER_LOG overrides
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress merge and normalization warnings
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge two records describing the same transient
    #[command(after_help = "\
Exit code 3 means the records were refused: too far apart, or a field \
with no merge rule (strict mode only).

Examples:
  skyledger merge tns.json survey.json
  skyledger merge tns.json survey.json --tolerance 5 -o merged.json
  skyledger merge a.json b.json --lenient")]
    Merge {
        /// Existing record (wins ties)
        left: PathBuf,

        /// Incoming record
        right: PathBuf,

        /// Skip the distance check and keep unknown fields from the left record
        #[arg(long)]
        lenient: bool,

        /// Strict-mode tolerance in arcseconds (default from config)
        #[arg(long)]
        tolerance: Option<f64>,

        /// Output file (omit for stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Check whether two records sit at the same position (exit 1 = no match)
    #[command(after_help = "\
Examples:
  skyledger match a.json b.json
  skyledger match a.json b.json --tolerance 2 --json")]
    Match {
        left: PathBuf,
        right: PathBuf,

        /// Tolerance in arcseconds (default from config)
        #[arg(long)]
        tolerance: Option<f64>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Normalize photometry into common units
    #[command(after_help = "\
Examples:
  skyledger phot at2019abc.json
  skyledger phot catalog/ --flux-unit uJy --date-unit isot --out csv
  skyledger phot at2019abc.json --obs-type xray --flux-unit 'erg/s/cm2'")]
    Phot(phot::PhotArgs),

    /// Select records by name, class, redshift, reference or position
    #[command(after_help = "\
Filters combine with AND. One --name matches as a substring; several \
--name flags require an exact alias match on any of them.

Examples:
  skyledger query catalog.json --class TDE --min-confidence 0.5
  skyledger query catalog.json --ra 14:20:59.6 --dec +37:10:04 --radius 5
  skyledger query catalog.json --minz 0.01 --maxz 0.05 --has-phot
  skyledger query catalog.json --name 2019abc --private staging/")]
    Query(query::QueryArgs),

    /// Add records to a catalog file, merging with nearby entries
    #[command(after_help = "\
Exit code 4 means an incoming record matched more than one stored record; \
the catalog is left unchanged.

Examples:
  skyledger ingest --store catalog.json new/*.json
  skyledger ingest --store catalog.json tns.json --tolerance 3 --json")]
    Ingest(store::IngestArgs),

    /// Print a record, or one field of it by slash path
    #[command(after_help = "\
Examples:
  skyledger show at2019abc.json
  skyledger show at2019abc.json --path name/default_name
  skyledger show at2019abc.json --path coordinate/0/ra")]
    Show {
        file: PathBuf,

        /// Slash-delimited field path
        #[arg(long)]
        path: Option<String>,
    },
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn args(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    pub fn recon(err: &skyledger_recon::ReconError) -> Self {
        Self::new(recon_exit_code(err), err.to_string())
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = run(cli);

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

fn run(cli: Cli) -> Result<(), CliError> {
    let settings = load_settings(cli.config.as_deref())?;
    let mut diag = Diagnostics::new(if cli.quiet { Verbosity::Silent } else { Verbosity::Emit });

    match cli.command {
        Commands::Merge { left, right, lenient, tolerance, output } => {
            let tolerance = tolerance.unwrap_or(settings.matching.merge_tolerance_arcsec);
            let policy = if lenient {
                MergePolicy { tolerance_arcsec: tolerance, ..MergePolicy::lenient() }
            } else {
                MergePolicy::strict(tolerance)
            };
            cmd_merge(&left, &right, &policy, output, &mut diag)
        }
        Commands::Match { left, right, tolerance, json } => {
            let tolerance = tolerance.unwrap_or(settings.matching.merge_tolerance_arcsec);
            cmd_match(&left, &right, tolerance, json)
        }
        Commands::Phot(args) => phot::cmd_phot(args, &settings, &mut diag),
        Commands::Query(args) => query::cmd_query(args, &settings, &mut diag),
        Commands::Ingest(args) => store::cmd_ingest(args, &settings, &mut diag),
        Commands::Show { file, path } => cmd_show(&file, path.as_deref()),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_env("SKYLEDGER_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_settings(path: Option<&Path>) -> Result<Settings, CliError> {
    let loaded = match path {
        Some(p) => Settings::load(p),
        None => Settings::load_or_default(),
    };
    loaded.map_err(|e| CliError {
        code: EXIT_CONFIG,
        message: e.to_string(),
        hint: Some(format!("default location: {}", Settings::config_path().display())),
    })
}

// ---------------------------------------------------------------------------
// merge / match / show
// ---------------------------------------------------------------------------

fn cmd_merge(
    left: &Path,
    right: &Path,
    policy: &MergePolicy,
    output: Option<PathBuf>,
    diag: &mut Diagnostics,
) -> Result<(), CliError> {
    let a = load_one(left)?;
    let b = load_one(right)?;
    let merged = merge(&a, &b, policy, diag).map_err(|e| CliError::recon(&e))?;
    write_json(&merged, output.as_deref())
}

#[derive(Debug, Serialize)]
struct MatchReport {
    separation_arcsec: f64,
    tolerance_arcsec: f64,
    matched: bool,
}

fn cmd_match(
    left: &Path,
    right: &Path,
    tolerance: f64,
    json: bool,
) -> Result<(), CliError> {
    let a = load_one(left)?;
    let b = load_one(right)?;
    let separation = separation_arcsec(&a, &b).map_err(|e| CliError::recon(&e))?;
    let report = MatchReport {
        separation_arcsec: separation,
        tolerance_arcsec: tolerance,
        matched: separation <= tolerance,
    };

    if json {
        write_json(&report, None)?;
    } else {
        println!(
            "{} ({:.3}\" apart, tolerance {}\")",
            if report.matched { "match" } else { "no match" },
            separation,
            tolerance
        );
    }

    if report.matched {
        Ok(())
    } else {
        Err(CliError::new(EXIT_NO_MATCH, ""))
    }
}

fn cmd_show(file: &Path, path: Option<&str>) -> Result<(), CliError> {
    let record = load_one(file)?;
    match path {
        None => write_json(&record, None),
        Some(p) => match record.get_path(p) {
            Some(serde_json::Value::String(s)) => write_text(&s, None),
            Some(value) => write_json(&value, None),
            None => Err(CliError {
                code: EXIT_ERROR,
                message: format!("no field at '{p}'"),
                hint: Some("paths look like name/default_name or coordinate/0/ra".to_string()),
            }),
        },
    }
}
