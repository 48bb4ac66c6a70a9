use skyledger_core::{Diagnostics, Record};
use skyledger_units::SkyPosition;
use tracing::info;

use crate::engine::{merge, MergePolicy};
use crate::error::Result;
use crate::query::{cone_search, select_records, RecordFilter};
use crate::spatial::{find_match, Locate};

/// What [`Catalog::save`] did with a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Inserted(usize),
    Merged(usize),
}

/// An in-memory store that merges on save.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: Vec<Record>,
    policy: MergePolicy,
}

impl Catalog {
    pub fn new(merge_tolerance_arcsec: f64) -> Self {
        Self {
            records: Vec::new(),
            policy: MergePolicy::strict(merge_tolerance_arcsec),
        }
    }

    pub fn from_records(records: Vec<Record>, merge_tolerance_arcsec: f64) -> Self {
        Self {
            records,
            policy: MergePolicy::strict(merge_tolerance_arcsec),
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Store `record`, merging it into the one stored record within the
    /// merge tolerance. Several candidates is an ambiguous match and nothing
    /// is written.
    pub fn save(&mut self, record: Record, diag: &mut Diagnostics) -> Result<SaveOutcome> {
        record.validate()?;
        let centre = record.position()?;
        match find_match(&self.records, &centre, self.policy.tolerance_arcsec)? {
            Some(i) => {
                let merged = merge(&self.records[i], &record, &self.policy, diag)?;
                info!(name = ?merged.default_name(), "merged into stored record");
                self.records[i] = merged;
                Ok(SaveOutcome::Merged(i))
            }
            None => {
                info!(name = ?record.default_name(), "stored new record");
                self.records.push(record);
                Ok(SaveOutcome::Inserted(self.records.len() - 1))
            }
        }
    }

    pub fn select(&self, filter: &RecordFilter) -> Vec<&Record> {
        select_records(&self.records, filter)
    }

    pub fn cone_search(&self, center: SkyPosition, radius_arcsec: f64) -> Vec<&Record> {
        cone_search(&self.records, center, radius_arcsec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReconError;
    use skyledger_core::{Coordinate, Name};

    fn at(name: &str, dec_offset_arcsec: f64) -> Record {
        Record {
            name: Some(Name::new(name)),
            coordinate: Some(vec![Coordinate::equatorial_deg(
                45.0,
                15.0 + dec_offset_arcsec / 3600.0,
                "src",
            )]),
            ..Record::default()
        }
    }

    #[test]
    fn insert_then_merge() {
        let mut cat = Catalog::new(10.0);
        let mut diag = Diagnostics::silent();
        assert_eq!(cat.save(at("ZTF20abc", 0.0), &mut diag).unwrap(), SaveOutcome::Inserted(0));
        assert_eq!(cat.save(at("2020xyz", 1.0), &mut diag).unwrap(), SaveOutcome::Merged(0));
        assert_eq!(cat.len(), 1);
        assert_eq!(cat.records()[0].default_name(), Some("2020xyz"));
    }

    #[test]
    fn two_candidates_is_ambiguous() {
        let mut cat = Catalog::from_records(vec![at("a", 0.0), at("b", 8.0)], 10.0);
        let err = cat.save(at("c", 4.0), &mut Diagnostics::silent()).unwrap_err();
        assert!(matches!(err, ReconError::AmbiguousMatch { count: 2 }));
        assert_eq!(cat.len(), 2);
    }
}
