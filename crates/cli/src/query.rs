//! `skyledger query` - filter records, optionally folding in a private store.

use std::path::PathBuf;

use clap::Args;
use skyledger_config::Settings;
use skyledger_core::{Diagnostics, Record};
use skyledger_recon::{reconcile, ClassFilter, Cone, NameQuery, RecordFilter, RedshiftRange};
use skyledger_units::sky::{angle_deg, angle_text_deg};
use skyledger_units::SkyPosition;
use tracing::info;

use crate::exit_codes::recon_exit_code;
use crate::records::{load_records, write_json};
use crate::CliError;

#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Record files or directories
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Name substring (repeat for exact alias match on any of several names)
    #[arg(long)]
    pub name: Vec<String>,

    /// Classification substring
    #[arg(long)]
    pub class: Option<String>,

    /// Minimum classification confidence (with --class)
    #[arg(long, default_value_t = 0.0)]
    pub min_confidence: f64,

    /// Lower redshift bound (inclusive)
    #[arg(long)]
    pub minz: Option<f64>,

    /// Upper redshift bound (inclusive)
    #[arg(long)]
    pub maxz: Option<f64>,

    /// Only records citing one of these bibcodes
    #[arg(long = "ref")]
    pub refs: Vec<String>,

    /// Cone centre right ascension (degrees or hh:mm:ss)
    #[arg(long, requires = "dec", allow_hyphen_values = true)]
    pub ra: Option<String>,

    /// Cone centre declination (degrees or dd:mm:ss)
    #[arg(long, requires = "ra", allow_hyphen_values = true)]
    pub dec: Option<String>,

    /// Cone radius in arcseconds (default from config)
    #[arg(long)]
    pub radius: Option<f64>,

    /// Only records with photometry
    #[arg(long)]
    pub has_phot: bool,

    /// Only records with spectra
    #[arg(long)]
    pub has_spectra: bool,

    /// Private records to reconcile into the result
    #[arg(long)]
    pub private: Vec<PathBuf>,

    /// Drop photometry and spectra from the output
    #[arg(long)]
    pub meta: bool,

    /// Output file (omit for stdout)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

pub fn cmd_query(args: QueryArgs, settings: &Settings, diag: &mut Diagnostics) -> Result<(), CliError> {
    let filter = build_filter(&args, settings)?;

    let records = load_records(&args.inputs)?;
    let mut selected: Vec<Record> = filter_records(&records, &filter);
    info!(total = records.len(), selected = selected.len(), "query");

    if !args.private.is_empty() {
        let private = load_records(&args.private)?;
        let staged = filter_records(&private, &filter);
        selected = reconcile(
            &selected,
            &staged,
            settings.matching.merge_tolerance_arcsec,
            diag,
        )
        .map_err(|e| CliError::new(recon_exit_code(&e), e.to_string()))?;
    }

    if args.meta {
        selected = selected.iter().map(Record::meta).collect();
    }
    write_json(&selected, args.output.as_deref())
}

fn filter_records(records: &[Record], filter: &RecordFilter) -> Vec<Record> {
    records
        .iter()
        .filter(|r| filter.matches(r))
        .cloned()
        .collect()
}

pub fn build_filter(args: &QueryArgs, settings: &Settings) -> Result<RecordFilter, CliError> {
    let names = match args.name.as_slice() {
        [] => None,
        [one] => Some(NameQuery::Contains(one.clone())),
        many => Some(NameQuery::AnyOf(many.to_vec())),
    };

    let classification = args.class.as_ref().map(|c| ClassFilter {
        substring: c.clone(),
        min_confidence: args.min_confidence,
    });

    let redshift = (args.minz.is_some() || args.maxz.is_some()).then(|| RedshiftRange {
        min: args.minz,
        max: args.maxz,
    });

    let cone = match (&args.ra, &args.dec) {
        (Some(ra), Some(dec)) => {
            let center = parse_center(ra, dec)?;
            Some(Cone {
                center,
                radius_arcsec: args.radius.unwrap_or(settings.matching.cone_radius_arcsec),
            })
        }
        _ => None,
    };

    Ok(RecordFilter {
        has_photometry: args.has_phot,
        has_spectra: args.has_spectra,
        classification,
        redshift,
        names,
        references: (!args.refs.is_empty()).then(|| args.refs.clone()),
        cone,
    })
}

/// Plain numbers are degrees; sexagesimal RA is read as hours.
fn parse_center(ra: &str, dec: &str) -> Result<SkyPosition, CliError> {
    let read = |text: &str, sexagesimal_unit: &str| match text.trim().parse::<f64>() {
        Ok(deg) => angle_deg(deg, "deg"),
        Err(_) => angle_text_deg(text, sexagesimal_unit),
    };
    let ra_deg = read(ra, "hourangle").map_err(|e| CliError::args(format!("--ra: {e}")))?;
    let dec_deg = read(dec, "deg").map_err(|e| CliError::args(format!("--dec: {e}")))?;
    SkyPosition::new(ra_deg, dec_deg).map_err(|e| CliError::args(e.to_string()))
}
