use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RecordError;
use crate::photometry::PhotometryBlock;
use crate::sections::{
    Classification, Coordinate, DateReference, Distance, FilterAlias, Host, Name, ReferenceAlias,
    SchemaVersion, SpectrumEntry,
};

/// Top-level section names with a typed representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Section {
    Name,
    Coordinate,
    Distance,
    DateReference,
    Classification,
    Photometry,
    FilterAlias,
    ReferenceAlias,
    SchemaVersion,
    Host,
    Spectra,
}

impl Section {
    pub const ALL: [Section; 11] = [
        Section::Name,
        Section::Coordinate,
        Section::Distance,
        Section::DateReference,
        Section::Classification,
        Section::Photometry,
        Section::FilterAlias,
        Section::ReferenceAlias,
        Section::SchemaVersion,
        Section::Host,
        Section::Spectra,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Coordinate => "coordinate",
            Self::Distance => "distance",
            Self::DateReference => "date_reference",
            Self::Classification => "classification",
            Self::Photometry => "photometry",
            Self::FilterAlias => "filter_alias",
            Self::ReferenceAlias => "reference_alias",
            Self::SchemaVersion => "schema_version",
            Self::Host => "host",
            Self::Spectra => "spectra",
        }
    }
}

/// One description of a transient. Sections are optional because a single
/// survey rarely contributes all of them; unknown top-level keys are kept in
/// `extra`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Record {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Name>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinate: Option<Vec<Coordinate>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<Vec<Distance>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_reference: Option<Vec<DateReference>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<Vec<Classification>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photometry: Option<Vec<PhotometryBlock>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_alias: Option<Vec<FilterAlias>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_alias: Option<Vec<ReferenceAlias>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<SchemaVersion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<Vec<Host>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spectra: Option<Vec<SpectrumEntry>>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Record {
    /// Decode and validate.
    pub fn from_value(value: Value) -> Result<Self, RecordError> {
        let record: Record = serde_json::from_value(value)?;
        record.validate()?;
        Ok(record)
    }

    pub fn from_json_str(s: &str) -> Result<Self, RecordError> {
        let record: Record = serde_json::from_str(s)?;
        record.validate()?;
        Ok(record)
    }

    pub fn to_value(&self) -> Value {
        // Maps with string keys and finite numbers always serialize.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    pub fn has_section(&self, section: Section) -> bool {
        match section {
            Section::Name => self.name.is_some(),
            Section::Coordinate => self.coordinate.is_some(),
            Section::Distance => self.distance.is_some(),
            Section::DateReference => self.date_reference.is_some(),
            Section::Classification => self.classification.is_some(),
            Section::Photometry => self.photometry.is_some(),
            Section::FilterAlias => self.filter_alias.is_some(),
            Section::ReferenceAlias => self.reference_alias.is_some(),
            Section::SchemaVersion => self.schema_version.is_some(),
            Section::Host => self.host.is_some(),
            Section::Spectra => self.spectra.is_some(),
        }
    }

    /// Names of every top-level key present, typed or not.
    pub fn keys(&self) -> BTreeSet<String> {
        Section::ALL
            .iter()
            .filter(|s| self.has_section(**s))
            .map(|s| s.key().to_string())
            .chain(self.extra.keys().cloned())
            .collect()
    }

    pub fn default_name(&self) -> Option<&str> {
        self.name.as_ref().map(|n| n.default_name.as_str())
    }

    pub fn has_photometry(&self) -> bool {
        self.photometry.is_some()
    }

    pub fn has_spectra(&self) -> bool {
        self.spectra.is_some()
    }

    /// All alias values, in stored order.
    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.name
            .iter()
            .flat_map(|n| n.alias.iter().map(|a| a.value.as_str()))
    }

    /// Redshift entries, default-flagged first when one exists.
    pub fn redshifts(&self) -> Vec<&Distance> {
        let mut out: Vec<&Distance> = self
            .distance
            .iter()
            .flatten()
            .filter(|d| d.is_redshift())
            .collect();
        out.sort_by_key(|d| d.default != Some(true));
        out
    }

    /// The default redshift value, if any redshift is recorded.
    pub fn redshift(&self) -> Option<f64> {
        self.redshifts().first().map(|d| d.value)
    }

    /// The default (or first) discovery date entry.
    pub fn discovery_date(&self) -> Option<&DateReference> {
        let discoveries: Vec<&DateReference> = self
            .date_reference
            .iter()
            .flatten()
            .filter(|d| d.date_type == "discovery")
            .collect();
        discoveries
            .iter()
            .find(|d| d.default == Some(true))
            .or_else(|| discoveries.first())
            .copied()
    }

    /// Bibcode → human readable name.
    pub fn reference_map(&self) -> HashMap<&str, &str> {
        self.reference_alias
            .iter()
            .flatten()
            .map(|r| (r.name.as_str(), r.human_readable_name.as_str()))
            .collect()
    }

    /// The record without its bulk data (photometry and spectra).
    pub fn meta(&self) -> Record {
        Record {
            photometry: None,
            spectra: None,
            ..self.clone()
        }
    }

    /// Check the structural invariants every stored record must satisfy.
    pub fn validate(&self) -> Result<(), RecordError> {
        if let Some(name) = &self.name {
            let mut seen = HashSet::new();
            for alias in &name.alias {
                if !seen.insert(alias.value.as_str()) {
                    return Err(RecordError::DuplicateAlias {
                        value: alias.value.clone(),
                    });
                }
            }
        }

        if let Some(coords) = &self.coordinate {
            if coords.is_empty() {
                return Err(RecordError::EmptySection {
                    section: "coordinate",
                });
            }
            let defaults = coords.iter().filter(|c| c.is_default()).count();
            if defaults > 1 {
                return Err(RecordError::MultipleDefaults {
                    section: "coordinate",
                    count: defaults,
                });
            }
        }

        if let Some(classes) = &self.classification {
            let defaults: Vec<&Classification> = classes.iter().filter(|c| c.is_default()).collect();
            if defaults.len() > 1 {
                return Err(RecordError::MultipleDefaults {
                    section: "classification",
                    count: defaults.len(),
                });
            }
            if let Some(default) = defaults.first() {
                let max = classes
                    .iter()
                    .map(|c| c.confidence)
                    .fold(f64::NEG_INFINITY, f64::max);
                if default.confidence < max {
                    return Err(RecordError::DefaultNotMaximal {
                        object_class: default.object_class.clone(),
                    });
                }
            }
        }

        if let Some(filters) = &self.filter_alias {
            unique_by(filters.iter().map(|f| f.filter_key.as_str()), "filter_alias")?;
        }
        if let Some(refs) = &self.reference_alias {
            unique_by(refs.iter().map(|r| r.name.as_str()), "reference_alias")?;
        }
        Ok(())
    }
}

fn unique_by<'a>(
    keys: impl Iterator<Item = &'a str>,
    section: &'static str,
) -> Result<(), RecordError> {
    let mut seen = HashSet::new();
    for key in keys {
        if !seen.insert(key) {
            return Err(RecordError::DuplicateKey {
                section,
                key: key.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "name": {"default_name": "2019qiz", "alias": [
                {"value": "2019qiz", "reference": ["TNS"]},
                {"value": "ZTF19abzrhgq", "reference": "ZTF"}
            ]},
            "coordinate": [{"ra": 71.6578, "dec": -10.2263, "ra_units": "deg",
                            "dec_units": "deg", "reference": ["TNS"],
                            "coordinate_type": "equatorial"}],
            "distance": [{"value": 0.0151, "reference": ["TNS"], "computed": false,
                          "distance_type": "redshift"}],
            "date_reference": [{"value": 58746.98, "date_format": "MJD", "reference": ["TNS"],
                                "computed": false, "date_type": "discovery"}],
            "reference_alias": [{"name": "TNS", "human_readable_name": "TNS"}],
            "schema_version": {"value": "0", "comment": "draft"},
            "survey_notes": {"cadence": "nightly"}
        })
    }

    #[test]
    fn decode_and_accessors() {
        let r = Record::from_value(sample()).unwrap();
        assert_eq!(r.default_name(), Some("2019qiz"));
        assert_eq!(r.redshift(), Some(0.0151));
        assert_eq!(r.discovery_date().map(|d| d.format()), Some("MJD"));
        assert_eq!(r.reference_map().get("TNS"), Some(&"TNS"));
        assert_eq!(r.aliases().count(), 2);
        assert!(r.keys().contains("survey_notes"));
        assert!(r.keys().contains("schema_version"));
        assert!(!r.has_photometry());
    }

    #[test]
    fn round_trip_is_lossless_for_unknown_keys() {
        let r = Record::from_value(sample()).unwrap();
        let v = r.to_value();
        assert_eq!(v["survey_notes"], json!({"cadence": "nightly"}));
        assert_eq!(Record::from_value(v).unwrap(), r);
    }

    #[test]
    fn duplicate_alias_rejected() {
        let mut v = sample();
        v["name"]["alias"] = json!([{"value": "x", "reference": []}, {"value": "x", "reference": []}]);
        assert!(matches!(
            Record::from_value(v),
            Err(RecordError::DuplicateAlias { .. })
        ));
    }

    #[test]
    fn empty_coordinate_rejected() {
        let mut v = sample();
        v["coordinate"] = json!([]);
        assert!(matches!(
            Record::from_value(v),
            Err(RecordError::EmptySection { section: "coordinate" })
        ));
    }

    #[test]
    fn default_classification_must_be_max() {
        let mut v = sample();
        v["classification"] = json!([
            {"object_class": "TDE", "confidence": 0.5, "reference": ["a"], "default": true},
            {"object_class": "SN Ia", "confidence": 0.9, "reference": ["b"]}
        ]);
        assert!(matches!(
            Record::from_value(v),
            Err(RecordError::DefaultNotMaximal { .. })
        ));
    }

    #[test]
    fn meta_drops_bulk_data() {
        let mut r = Record::from_value(sample()).unwrap();
        r.spectra = Some(vec![SpectrumEntry::new()]);
        let m = r.meta();
        assert!(m.spectra.is_none());
        assert_eq!(m.name, r.name);
    }
}
