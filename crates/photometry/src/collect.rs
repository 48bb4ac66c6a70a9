use serde_json::Value;
use skyledger_core::{Diagnostics, Record};
use tracing::debug;

use crate::error::{PhotometryError, Result};
use crate::normalize::normalize_photometry;
use crate::request::{NormalizeRequest, XrayAreas};
use crate::table::PhotometryTable;

/// Normalize the photometry of many records into one table.
///
/// Each row is tagged with its record's default name in a `name` column.
/// Records without usable photometry are skipped; only an empty result is an
/// error. With `keep_raw` off the table is projected onto the output columns.
pub fn collect_photometry<'a>(
    records: impl IntoIterator<Item = &'a Record>,
    request: &NormalizeRequest,
    areas: &XrayAreas,
    diag: &mut Diagnostics,
) -> Result<PhotometryTable> {
    let mut out = PhotometryTable::default();
    for record in records {
        if !record.has_photometry() {
            continue;
        }
        let mut table = match normalize_photometry(record, request, areas, diag) {
            Ok(table) => table,
            Err(PhotometryError::NoData) => {
                debug!(name = ?record.default_name(), "no photometry after normalization");
                continue;
            }
            Err(e) => return Err(e),
        };
        let name = record.default_name().map_or(Value::Null, Value::from);
        table.tag("name", name);
        out.extend(table);
    }

    if out.is_empty() {
        return Err(PhotometryError::NoData);
    }
    if !request.keep_raw {
        out.project();
    }
    Ok(out)
}
