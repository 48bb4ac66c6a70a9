//! In-memory selection over a record collection.
//!
//! Every filter is optional; the ones that are set must all hold.

use skyledger_core::Record;
use skyledger_units::SkyPosition;
use tracing::debug;

use crate::spatial::all_positions;

#[derive(Debug, Clone, PartialEq)]
pub enum NameQuery {
    /// Substring of the default name or any alias.
    Contains(String),
    /// Exact alias membership for any of the names.
    AnyOf(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassFilter {
    pub substring: String,
    /// Inclusive lower bound on the entry's confidence.
    pub min_confidence: f64,
}

/// Inclusive redshift bounds; a single redshift entry must satisfy both.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RedshiftRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl RedshiftRange {
    pub fn contains(&self, z: f64) -> bool {
        self.min.map_or(true, |lo| z >= lo) && self.max.map_or(true, |hi| z <= hi)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cone {
    pub center: SkyPosition,
    pub radius_arcsec: f64,
}

impl Cone {
    /// A record is inside when any of its readable coordinate entries is.
    pub fn contains(&self, record: &Record) -> bool {
        let positions = all_positions(record);
        if positions.is_empty() {
            debug!("record without a usable position is outside every cone");
        }
        positions
            .iter()
            .any(|p| p.separation_arcsec(&self.center) <= self.radius_arcsec)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFilter {
    pub has_photometry: bool,
    pub has_spectra: bool,
    pub classification: Option<ClassFilter>,
    pub redshift: Option<RedshiftRange>,
    pub names: Option<NameQuery>,
    /// Bibcodes; any overlap with the record's `reference_alias` names.
    pub references: Option<Vec<String>>,
    pub cone: Option<Cone>,
}

impl RecordFilter {
    pub fn matches(&self, record: &Record) -> bool {
        if self.has_photometry && !record.has_photometry() {
            return false;
        }
        if self.has_spectra && !record.has_spectra() {
            return false;
        }
        if let Some(class) = &self.classification {
            let hit = record.classification.iter().flatten().any(|c| {
                c.confidence >= class.min_confidence && c.object_class.contains(&class.substring)
            });
            if !hit {
                return false;
            }
        }
        if let Some(range) = &self.redshift {
            if !record.redshifts().iter().any(|d| range.contains(d.value)) {
                return false;
            }
        }
        if let Some(names) = &self.names {
            let hit = match names {
                NameQuery::Contains(needle) => {
                    record.default_name().is_some_and(|n| n.contains(needle.as_str()))
                        || record.aliases().any(|a| a.contains(needle.as_str()))
                }
                NameQuery::AnyOf(list) => record.aliases().any(|a| list.iter().any(|n| n == a)),
            };
            if !hit {
                return false;
            }
        }
        if let Some(refs) = &self.references {
            let hit = record
                .reference_alias
                .iter()
                .flatten()
                .any(|r| refs.iter().any(|q| *q == r.name));
            if !hit {
                return false;
            }
        }
        if let Some(cone) = &self.cone {
            if !cone.contains(record) {
                return false;
            }
        }
        true
    }
}

/// Records matching `filter`, in input order.
pub fn select_records<'a>(records: &'a [Record], filter: &RecordFilter) -> Vec<&'a Record> {
    records.iter().filter(|r| filter.matches(r)).collect()
}

pub fn cone_search(records: &[Record], center: SkyPosition, radius_arcsec: f64) -> Vec<&Record> {
    let filter = RecordFilter {
        cone: Some(Cone {
            center,
            radius_arcsec,
        }),
        ..RecordFilter::default()
    };
    select_records(records, &filter)
}
