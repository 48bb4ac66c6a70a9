//! Photometry normalization.
//!
//! Blocks are flattened into rows and joined against the record's
//! `filter_alias` entries. Rows are grouped by regime, literal unit string
//! and telescope; each group parses its unit string once and then converts
//! point by point, since x-ray points need their own band edges and
//! collecting area.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde_json::Value;
use skyledger_core::{Diagnostics, FilterAlias, FluxSource, ObsType, Record, Row, WarningKind};
use skyledger_units::{FluxUnit, SpectralContext, SpectralUnit, TimeFormat, TimeValue};
use tracing::debug;

use crate::error::{PhotometryError, Result};
use crate::request::{parse_flux_unit, parse_obs_type, NormalizeRequest, OutputUnits, XrayAreas};
use crate::table::PhotometryTable;

/// Normalize every photometry block of `record` into the units of `request`.
///
/// Rows without a matching filter and rows without a flux are dropped with a
/// [`WarningKind::SkippedMeasurement`] warning. Rows are returned in block
/// order.
pub fn normalize_photometry(
    record: &Record,
    request: &NormalizeRequest,
    areas: &XrayAreas,
    diag: &mut Diagnostics,
) -> Result<PhotometryTable> {
    let wanted = request.obs_type_filter()?;
    let units = OutputUnits::resolve(request)?;
    let blocks = match record.photometry.as_deref() {
        Some(blocks) if !blocks.is_empty() => blocks,
        _ => return Err(PhotometryError::NoData),
    };

    let filters: HashMap<&str, &FilterAlias> = record
        .filter_alias
        .iter()
        .flatten()
        .map(|f| (f.filter_key.as_str(), f))
        .collect();

    let mut joined = Vec::new();
    let mut unfiltered = 0usize;
    for block in blocks {
        for mut row in block.rows() {
            let filter = row
                .get("filter_key")
                .and_then(Value::as_str)
                .and_then(|k| filters.get(k).copied());
            match filter {
                Some(filter) => {
                    attach_filter(&mut row, filter);
                    joined.push(row);
                }
                None => unfiltered += 1,
            }
        }
    }
    if unfiltered > 0 {
        diag.warn(
            WarningKind::SkippedMeasurement,
            format!("{unfiltered} measurement(s) have no filter_alias entry"),
        );
    }

    let by = if joined.iter().any(|r| r.contains_key(request.by.column())) {
        request.by
    } else {
        request.by.other()
    };

    let refs = record.reference_map();
    let mut unresolved = HashSet::new();
    let mut rows: Vec<Row> = Vec::new();
    let mut groups: BTreeMap<GroupKey, Vec<usize>> = BTreeMap::new();
    let mut fluxless = 0usize;
    for mut row in joined {
        if cell_f64(&row, by.column()).is_none() {
            fluxless += 1;
            continue;
        }
        let obs_type = parse_obs_type(text(&row, "obs_type")?)?;
        if wanted.is_some_and(|w| w != obs_type) {
            continue;
        }
        let key = GroupKey {
            obs_type,
            units: text(&row, by.units_column())?.to_string(),
            telescope: row
                .get("telescope")
                .and_then(Value::as_str)
                .map(str::to_string),
        };
        let readable = human_readable_refs(&row, &refs, &mut unresolved);
        row.insert("human_readable_refs".into(), Value::String(readable));
        groups.entry(key).or_default().push(rows.len());
        rows.push(row);
    }
    if fluxless > 0 {
        diag.warn(
            WarningKind::SkippedMeasurement,
            format!("{fluxless} measurement(s) have no {} value", by.column()),
        );
    }
    for bibcode in unresolved {
        diag.warn(
            WarningKind::UnresolvedReference,
            format!("no human readable name for {bibcode}"),
        );
    }

    if rows.is_empty() {
        return Err(PhotometryError::NoData);
    }

    let converter = Converter {
        request,
        units,
        areas,
        by,
    };
    for (key, members) in &groups {
        converter.convert_group(key, members, &mut rows)?;
    }
    Ok(PhotometryTable::new(rows))
}

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct GroupKey {
    obs_type: ObsType,
    units: String,
    telescope: Option<String>,
}

// ---------------------------------------------------------------------------
// Conversion
// ---------------------------------------------------------------------------

struct Converter<'a> {
    request: &'a NormalizeRequest,
    units: OutputUnits,
    areas: &'a XrayAreas,
    by: FluxSource,
}

impl Converter<'_> {
    fn convert_group(&self, key: &GroupKey, members: &[usize], rows: &mut [Row]) -> Result<()> {
        let mut spelled: Vec<String> = members
            .iter()
            .filter_map(|&i| rows[i].get(self.by.units_column()).and_then(Value::as_str))
            .map(str::to_string)
            .collect();
        spelled.sort();
        spelled.dedup();
        if spelled.len() > 1 {
            return Err(PhotometryError::InconsistentUnits {
                obs_type: key.obs_type.to_string(),
                units: spelled,
            });
        }
        let Some(raw_unit) = spelled.first() else {
            return Ok(());
        };
        let from = parse_flux_unit(raw_unit)?;

        let area = match key.obs_type {
            ObsType::Xray => {
                let telescope = key.telescope.as_deref().ok_or_else(|| {
                    PhotometryError::MissingTelescopeArea {
                        reference: reference_text(&rows[members[0]]),
                    }
                })?;
                let area = self.areas.get(telescope).ok_or_else(|| {
                    PhotometryError::UnknownTelescope {
                        telescope: telescope.to_string(),
                    }
                })?;
                Some(area)
            }
            ObsType::Radio | ObsType::Uvoir => None,
        };

        debug!(
            obs_type = %key.obs_type,
            unit = %raw_unit,
            telescope = ?key.telescope,
            points = members.len(),
            "converting photometry group"
        );

        for &i in members {
            let columns = self.convert_row(&rows[i], &from, area)?;
            rows[i].extend(columns);
        }
        Ok(())
    }

    fn convert_row(&self, row: &Row, from: &FluxUnit, area: Option<f64>) -> Result<Vec<(String, Value)>> {
        let flux = cell_f64(row, self.by.column()).unwrap_or(f64::NAN);
        let err = cell_f64(row, self.by.err_column()).unwrap_or(0.0);

        let band = match area {
            Some(area) => Band::Xray {
                edges: energy_band(row)?,
                area,
            },
            None => Band::Effective(effective_aa(row)?.ok_or_else(|| missing_wavelength(row))?),
        };
        let (value, error) = band.convert(flux, err, from, &self.units.flux)?;

        let aa = match effective_aa(row)? {
            Some(aa) => aa,
            None => band.midpoint(),
        };
        let date = convert_date(row, self.units.date)?;

        let mut out = vec![
            ("converted_flux".to_string(), Value::from(value)),
            ("converted_flux_err".to_string(), Value::from(error)),
            ("converted_flux_unit".to_string(), Value::from(self.request.flux_unit.as_str())),
            ("converted_date".to_string(), time_value(date)),
            ("converted_date_unit".to_string(), Value::from(self.request.date_unit.as_str())),
            ("converted_wave".to_string(), Value::from(self.units.wave.from_angstrom(aa)?)),
            ("converted_wave_unit".to_string(), Value::from(self.request.wave_unit.as_str())),
            ("converted_freq".to_string(), Value::from(self.units.freq.from_angstrom(aa)?)),
            ("converted_freq_unit".to_string(), Value::from(self.request.freq_unit.as_str())),
        ];
        if row.get("upperlimit").map_or(true, Value::is_null) {
            out.push(("upperlimit".to_string(), Value::Bool(false)));
        }
        Ok(out)
    }
}

/// Where a point sits on the spectrum.
#[derive(Debug, Clone, Copy)]
enum Band {
    /// Effective wavelength in Å.
    Effective(f64),
    /// Band edges in Å and the telescope's collecting area in cm².
    Xray { edges: (f64, f64), area: f64 },
}

impl Band {
    /// Convert a flux and its error. X-ray points are converted at each band
    /// edge and the two results averaged.
    fn convert(&self, flux: f64, err: f64, from: &FluxUnit, to: &FluxUnit) -> Result<(f64, f64)> {
        match *self {
            Band::Effective(aa) => Ok(from.convert_with_error(flux, err, to, &SpectralContext::at(aa))?),
            Band::Xray { edges: (lo, hi), area } => {
                let width = (hi - lo).abs();
                let mut value = 0.0;
                let mut error = 0.0;
                for edge in [lo, hi] {
                    let ctx = SpectralContext::at(edge).with_bandwidth(width).with_area(area);
                    let (v, e) = from.convert_with_error(flux, err, to, &ctx)?;
                    value += v;
                    error += e;
                }
                Ok((value / 2.0, error / 2.0))
            }
        }
    }

    fn midpoint(&self) -> f64 {
        match *self {
            Band::Effective(aa) => aa,
            Band::Xray { edges: (lo, hi), .. } => (lo + hi) / 2.0,
        }
    }
}

/// Effective wavelength in Å: `freq_eff` first, then `wave_eff`.
fn effective_aa(row: &Row) -> Result<Option<f64>> {
    if let Some(freq) = cell_f64(row, "freq_eff") {
        let unit = SpectralUnit::parse(text(row, "freq_units")?)?;
        return Ok(Some(unit.to_angstrom(freq)?));
    }
    if let Some(wave) = cell_f64(row, "wave_eff") {
        let unit = SpectralUnit::parse(text(row, "wave_units")?)?;
        return Ok(Some(unit.to_angstrom(wave)?));
    }
    Ok(None)
}

/// `(wave_min, wave_max)` in Å, read in `wave_units`.
fn energy_band(row: &Row) -> Result<(f64, f64)> {
    let (Some(min), Some(max)) = (cell_f64(row, "wave_min"), cell_f64(row, "wave_max")) else {
        return Err(PhotometryError::MissingEnergyBand {
            filter_key: filter_key(row),
        });
    };
    let unit = SpectralUnit::parse(text(row, "wave_units")?)?;
    Ok((unit.to_angstrom(min)?, unit.to_angstrom(max)?))
}

fn convert_date(row: &Row, to: TimeFormat) -> Result<TimeValue> {
    let value = match row.get("date") {
        Some(Value::String(s)) => TimeValue::Text(s.clone()),
        Some(v) => v
            .as_f64()
            .map(TimeValue::Number)
            .ok_or_else(|| bad_column("date", format!("not a date: {v}")))?,
        None => return Err(bad_column("date", "missing".to_string())),
    };
    let format = match row.get("date_format").and_then(Value::as_str) {
        Some(f) => f.parse::<TimeFormat>()?,
        None => TimeFormat::Mjd,
    };
    Ok(format.convert(&value, to)?)
}

fn time_value(t: TimeValue) -> Value {
    match t {
        TimeValue::Number(n) => Value::from(n),
        TimeValue::Text(s) => Value::String(s),
    }
}

// ---------------------------------------------------------------------------
// Row helpers
// ---------------------------------------------------------------------------

fn attach_filter(row: &mut Row, filter: &FilterAlias) {
    let mut put = |column: &str, value: Value| {
        row.insert(column.to_string(), value);
    };
    if let Some(name) = &filter.filter_name {
        put("filter_name", Value::from(name.as_str()));
    }
    for (column, value) in [
        ("wave_eff", filter.wave_eff),
        ("freq_eff", filter.freq_eff),
        ("wave_min", filter.wave_min),
        ("wave_max", filter.wave_max),
    ] {
        if let Some(v) = value {
            put(column, Value::from(v));
        }
    }
    for (column, value) in [("wave_units", &filter.wave_units), ("freq_units", &filter.freq_units)] {
        if let Some(v) = value {
            put(column, Value::from(v.as_str()));
        }
    }
}

/// Bibcodes mapped to their human readable names, joined with ", ".
/// Unknown bibcodes are kept as-is and collected in `unresolved`.
fn human_readable_refs(row: &Row, refs: &HashMap<&str, &str>, unresolved: &mut HashSet<String>) -> String {
    let bibcodes: Vec<&str> = match row.get("reference") {
        Some(Value::String(s)) => vec![s.as_str()],
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    };
    bibcodes
        .into_iter()
        .map(|b| match refs.get(b) {
            Some(name) => (*name).to_string(),
            None => {
                unresolved.insert(b.to_string());
                b.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// A finite number, or a string holding one.
fn cell_f64(row: &Row, column: &str) -> Option<f64> {
    let v = match row.get(column)? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    v.is_finite().then_some(v)
}

fn text<'r>(row: &'r Row, column: &str) -> Result<&'r str> {
    row.get(column)
        .and_then(Value::as_str)
        .ok_or_else(|| bad_column(column, "missing or not a string".to_string()))
}

fn filter_key(row: &Row) -> String {
    row.get("filter_key")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn reference_text(row: &Row) -> String {
    match row.get("reference") {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

fn missing_wavelength(row: &Row) -> PhotometryError {
    PhotometryError::MissingWavelength {
        filter_key: filter_key(row),
    }
}

fn bad_column(column: &str, detail: String) -> PhotometryError {
    PhotometryError::BadColumn {
        column: column.to_string(),
        detail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(v: Value) -> Row {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn frequency_wins_over_wavelength() {
        let r = row(json!({
            "freq_eff": 3.0, "freq_units": "GHz",
            "wave_eff": 5000.0, "wave_units": "AA"
        }));
        let aa = effective_aa(&r).unwrap().unwrap();
        approx::assert_relative_eq!(aa, 2.997_924_58e18 / 3e9, max_relative = 1e-12);
    }

    #[test]
    fn numeric_strings_are_read() {
        let r = row(json!({"raw": "18.5", "bad": "n/a", "nan": null}));
        assert_eq!(cell_f64(&r, "raw"), Some(18.5));
        assert_eq!(cell_f64(&r, "bad"), None);
        assert_eq!(cell_f64(&r, "nan"), None);
    }

    #[test]
    fn xray_band_is_averaged() {
        let band = Band::Xray {
            edges: (1.0, 3.0),
            area: 100.0,
        };
        let from = FluxUnit::parse("ct/s").unwrap();
        let to = FluxUnit::parse("erg/s/cm2/AA").unwrap();
        let (v, _) = band.convert(10.0, 1.0, &from, &to).unwrap();
        let at = |edge: f64| {
            let ctx = SpectralContext::at(edge).with_bandwidth(2.0).with_area(100.0);
            from.convert(10.0, &to, &ctx).unwrap()
        };
        approx::assert_relative_eq!(v, (at(1.0) + at(3.0)) / 2.0, max_relative = 1e-12);
        assert_eq!(band.midpoint(), 2.0);
    }

    #[test]
    fn dates_follow_row_format() {
        let r = row(json!({"date": "2019-03-11T12:00:00", "date_format": "ISOT"}));
        let mjd = convert_date(&r, TimeFormat::Mjd).unwrap().as_f64().unwrap();
        approx::assert_relative_eq!(mjd, 58553.5, epsilon = 1e-6);
    }
}
