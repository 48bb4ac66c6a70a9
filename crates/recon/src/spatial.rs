//! Angular-separation identity.
//!
//! A record's canonical position is its default-flagged coordinate entry,
//! else its first equatorial entry, else its first galactic entry converted
//! to ICRS.

use skyledger_core::{AngleValue, Coordinate, Record};
use skyledger_units::sky::{angle_deg, angle_text_deg};
use skyledger_units::{SkyPosition, UnitError};
use tracing::debug;

use crate::error::{ReconError, Result};

/// Anything with a canonical sky position.
pub trait Locate {
    fn position(&self) -> Result<SkyPosition>;
}

impl Locate for SkyPosition {
    fn position(&self) -> Result<SkyPosition> {
        Ok(*self)
    }
}

impl Locate for Record {
    fn position(&self) -> Result<SkyPosition> {
        let coords = self.coordinate.as_deref().unwrap_or_default();
        let pick = coords
            .iter()
            .find(|c| c.is_default() && (c.is_equatorial() || c.is_galactic()))
            .or_else(|| coords.iter().find(|c| c.is_equatorial()))
            .or_else(|| coords.iter().find(|c| c.is_galactic()));
        match pick {
            Some(c) => coordinate_position(c).ok_or_else(|| missing(self))?.map_err(|source| {
                ReconError::BadCoordinate {
                    name: label(self),
                    source,
                }
            }),
            None => Err(missing(self)),
        }
    }
}

fn label(record: &Record) -> String {
    record.default_name().unwrap_or("<unnamed>").to_string()
}

fn missing(record: &Record) -> ReconError {
    ReconError::MissingPosition {
        name: label(record),
    }
}

fn angle(value: &AngleValue, unit: Option<&str>) -> std::result::Result<f64, UnitError> {
    let unit = unit.unwrap_or("deg");
    match value {
        AngleValue::Number(x) => angle_deg(*x, unit),
        AngleValue::Text(s) => angle_text_deg(s, unit),
    }
}

/// ICRS position of one entry; `None` if it has neither `ra`/`dec` nor `l`/`b`.
pub fn coordinate_position(c: &Coordinate) -> Option<std::result::Result<SkyPosition, UnitError>> {
    if let (Some(ra), Some(dec)) = (&c.ra, &c.dec) {
        return Some(equatorial(c, ra, dec));
    }
    if let (Some(l), Some(b)) = (&c.l, &c.b) {
        return Some(galactic(c, l, b));
    }
    None
}

fn equatorial(
    c: &Coordinate,
    ra: &AngleValue,
    dec: &AngleValue,
) -> std::result::Result<SkyPosition, UnitError> {
    let ra = angle(ra, c.ra_units.as_deref())?;
    let dec = angle(dec, c.dec_units.as_deref())?;
    SkyPosition::new(ra, dec)
}

fn galactic(
    c: &Coordinate,
    l: &AngleValue,
    b: &AngleValue,
) -> std::result::Result<SkyPosition, UnitError> {
    let l = angle(l, c.l_units.as_deref())?;
    let b = angle(b, c.b_units.as_deref())?;
    SkyPosition::from_galactic(l, b)
}

/// Every usable position a record carries, in entry order. Entries without
/// readable angles are skipped.
pub fn all_positions(record: &Record) -> Vec<SkyPosition> {
    let coords = record.coordinate.as_deref().unwrap_or_default();
    coords
        .iter()
        .enumerate()
        .filter_map(|(i, c)| match coordinate_position(c) {
            Some(Ok(p)) => Some(p),
            Some(Err(e)) => {
                debug!(record = %label(record), entry = i, error = %e, "skipping unreadable coordinate");
                None
            }
            None => {
                debug!(record = %label(record), entry = i, "skipping coordinate without ra/dec or l/b");
                None
            }
        })
        .collect()
}

pub fn separation_arcsec(a: &impl Locate, b: &impl Locate) -> Result<f64> {
    Ok(a.position()?.separation_arcsec(&b.position()?))
}

/// Same object iff the canonical positions are within `tolerance_arcsec`.
pub fn spatial_match(a: &impl Locate, b: &impl Locate, tolerance_arcsec: f64) -> Result<bool> {
    Ok(separation_arcsec(a, b)? <= tolerance_arcsec)
}

/// Index of the single candidate within tolerance of `target`.
///
/// Candidates without a usable position are skipped. More than one hit is
/// [`ReconError::AmbiguousMatch`].
pub fn find_match(
    candidates: &[Record],
    target: &impl Locate,
    tolerance_arcsec: f64,
) -> Result<Option<usize>> {
    let centre = target.position()?;
    let mut hits = Vec::new();
    for (i, candidate) in candidates.iter().enumerate() {
        match candidate.position() {
            Ok(p) if p.separation_arcsec(&centre) <= tolerance_arcsec => hits.push(i),
            Ok(_) => {}
            Err(e) => debug!(error = %e, "skipping candidate without a position"),
        }
    }
    match hits.as_slice() {
        [] => Ok(None),
        [i] => Ok(Some(*i)),
        many => Err(ReconError::AmbiguousMatch { count: many.len() }),
    }
}
