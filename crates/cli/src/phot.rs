//! `skyledger phot` - normalized photometry for one or more records.

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use serde_json::Value;
use skyledger_config::Settings;
use skyledger_core::{Diagnostics, FluxSource};
use skyledger_photometry::{collect_photometry, PhotometryTable};

use crate::exit_codes::{photometry_exit_code, EXIT_IO};
use crate::records::{load_records, write_json, write_text};
use crate::CliError;

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum PhotFormat {
    #[default]
    Json,
    Csv,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum FluxFamily {
    Raw,
    Value,
}

impl From<FluxFamily> for FluxSource {
    fn from(f: FluxFamily) -> Self {
        match f {
            FluxFamily::Raw => FluxSource::Raw,
            FluxFamily::Value => FluxSource::Value,
        }
    }
}

#[derive(Args, Debug)]
pub struct PhotArgs {
    /// Record files or directories
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Output flux unit (default from config, "mag(AB)")
    #[arg(long)]
    pub flux_unit: Option<String>,

    /// Output date format: mjd, jd, unix, iso, isot, decimalyear
    #[arg(long)]
    pub date_unit: Option<String>,

    /// Output wavelength unit
    #[arg(long)]
    pub wave_unit: Option<String>,

    /// Output frequency unit
    #[arg(long)]
    pub freq_unit: Option<String>,

    /// Only radio, uvoir or xray rows
    #[arg(long)]
    pub obs_type: Option<String>,

    /// Column family holding the flux
    #[arg(long, value_enum, default_value = "raw")]
    pub by: FluxFamily,

    /// Keep every input column instead of the converted set
    #[arg(long)]
    pub keep_raw: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "json")]
    pub out: PhotFormat,

    /// Output file (omit for stdout)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

pub fn cmd_phot(args: PhotArgs, settings: &Settings, diag: &mut Diagnostics) -> Result<(), CliError> {
    let records = load_records(&args.inputs)?;

    let mut request = settings.photometry.request();
    if let Some(u) = args.flux_unit {
        request.flux_unit = u;
    }
    if let Some(u) = args.date_unit {
        request.date_unit = u;
    }
    if let Some(u) = args.wave_unit {
        request.wave_unit = u;
    }
    if let Some(u) = args.freq_unit {
        request.freq_unit = u;
    }
    request.obs_type = args.obs_type;
    request.by = args.by.into();
    request.keep_raw = args.keep_raw;

    let table = collect_photometry(&records, &request, &settings.xray_areas, diag)
        .map_err(|e| CliError::new(photometry_exit_code(&e), e.to_string()))?;

    match args.out {
        PhotFormat::Json => write_json(&table, args.output.as_deref()),
        PhotFormat::Csv => write_text(&to_csv(&table)?, args.output.as_deref()),
    }
}

/// One header row with every column, then one line per measurement.
pub fn to_csv(table: &PhotometryTable) -> Result<String, CliError> {
    let columns = table.columns();
    let mut writer = csv::Writer::from_writer(Vec::new());
    let io_err = |e: csv::Error| CliError::new(EXIT_IO, format!("cannot write csv: {e}"));

    writer.write_record(&columns).map_err(io_err)?;
    for row in table.rows() {
        let cells = columns
            .iter()
            .map(|c| row.get(*c).map(cell_text).unwrap_or_default());
        writer.write_record(cells).map_err(io_err)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| CliError::new(EXIT_IO, format!("cannot write csv: {e}")))?;
    let text = String::from_utf8_lossy(&bytes);
    Ok(text.trim_end().to_string())
}

fn cell_text(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}
