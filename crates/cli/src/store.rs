//! `skyledger ingest` - merge-on-save into a catalog file.
//!
//! The catalog is a single JSON array of records. A missing file is an empty
//! catalog. Nothing is written unless every incoming record was saved.

use std::path::{Path, PathBuf};

use clap::Args;
use serde::Serialize;
use skyledger_config::Settings;
use skyledger_core::{Diagnostics, Record};
use skyledger_recon::{Catalog, SaveOutcome};

use crate::exit_codes::recon_exit_code;
use crate::records::{load_file, load_records, write_json};
use crate::CliError;

#[derive(Args, Debug)]
pub struct IngestArgs {
    /// Catalog file (JSON array of records; created if absent)
    #[arg(long)]
    pub store: PathBuf,

    /// Record files or directories to add
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Merge tolerance in arcseconds (default from config)
    #[arg(long)]
    pub tolerance: Option<f64>,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Default, Serialize)]
pub struct IngestSummary {
    pub inserted: usize,
    pub merged: usize,
    pub total: usize,
}

pub fn cmd_ingest(args: IngestArgs, settings: &Settings, diag: &mut Diagnostics) -> Result<(), CliError> {
    let tolerance = args
        .tolerance
        .unwrap_or(settings.matching.merge_tolerance_arcsec);
    let mut catalog = Catalog::from_records(load_store(&args.store)?, tolerance);

    let incoming = load_records(&args.inputs)?;
    let summary = ingest(&mut catalog, incoming, diag)?;

    write_json(&catalog.records(), Some(&args.store))?;

    if args.json {
        write_json(&summary, None)
    } else {
        println!(
            "inserted {}, merged {}, catalog now holds {} record(s)",
            summary.inserted, summary.merged, summary.total
        );
        Ok(())
    }
}

pub fn ingest(
    catalog: &mut Catalog,
    incoming: Vec<Record>,
    diag: &mut Diagnostics,
) -> Result<IngestSummary, CliError> {
    let mut summary = IngestSummary::default();
    for record in incoming {
        let name = record.default_name().unwrap_or("<unnamed>").to_string();
        match catalog.save(record, diag) {
            Ok(SaveOutcome::Inserted(_)) => summary.inserted += 1,
            Ok(SaveOutcome::Merged(_)) => summary.merged += 1,
            Err(e) => {
                return Err(CliError {
                    code: recon_exit_code(&e),
                    message: format!("{name}: {e}"),
                    hint: Some("catalog left unchanged".to_string()),
                })
            }
        }
    }
    summary.total = catalog.len();
    Ok(summary)
}

fn load_store(path: &Path) -> Result<Vec<Record>, CliError> {
    if path.exists() {
        load_file(path)
    } else {
        Ok(Vec::new())
    }
}
