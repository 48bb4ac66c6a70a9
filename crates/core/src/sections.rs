//! Typed record sections.
//!
//! Each entry keeps the fields the merge and normalization code reads as
//! explicit (optional) members, and carries everything else in `extra` so a
//! decode/encode cycle is lossless.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::refs::References;
use crate::serde_util::{f64_lenient, i64_lenient};

// ---------------------------------------------------------------------------
// Name
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Name {
    pub default_name: String,
    #[serde(default)]
    pub alias: Vec<Alias>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alias {
    pub value: String,
    #[serde(default)]
    pub reference: References,
}

impl Name {
    pub fn new(default_name: impl Into<String>) -> Self {
        Self {
            default_name: default_name.into(),
            alias: Vec::new(),
            extra: BTreeMap::new(),
        }
    }

    pub fn has_alias(&self, value: &str) -> bool {
        self.alias.iter().any(|a| a.value == value)
    }
}

// ---------------------------------------------------------------------------
// Coordinate
// ---------------------------------------------------------------------------

/// An angle as written by the source: decimal number or sexagesimal text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AngleValue {
    Number(f64),
    Text(String),
}

/// One position entry: equatorial (`ra`/`dec`) or galactic (`l`/`b`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ra: Option<AngleValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dec: Option<AngleValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ra_units: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dec_units: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub l: Option<AngleValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub b: Option<AngleValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub l_units: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub b_units: Option<String>,
    #[serde(default)]
    pub reference: References,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinate_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub computed: Option<bool>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Coordinate {
    /// Equatorial entry with both angles in degrees.
    pub fn equatorial_deg(ra: f64, dec: f64, reference: impl Into<References>) -> Self {
        Self {
            ra: Some(AngleValue::Number(ra)),
            dec: Some(AngleValue::Number(dec)),
            ra_units: Some("deg".into()),
            dec_units: Some("deg".into()),
            reference: reference.into(),
            coordinate_type: Some("equatorial".into()),
            ..Self::default()
        }
    }

    /// Galactic entry with both angles in degrees.
    pub fn galactic_deg(l: f64, b: f64, reference: impl Into<References>) -> Self {
        Self {
            l: Some(AngleValue::Number(l)),
            b: Some(AngleValue::Number(b)),
            l_units: Some("deg".into()),
            b_units: Some("deg".into()),
            reference: reference.into(),
            coordinate_type: Some("galactic".into()),
            ..Self::default()
        }
    }

    pub fn is_equatorial(&self) -> bool {
        self.ra.is_some() && self.dec.is_some()
    }

    pub fn is_galactic(&self) -> bool {
        self.l.is_some() && self.b.is_some()
    }

    pub fn is_default(&self) -> bool {
        self.default == Some(true)
    }
}

// ---------------------------------------------------------------------------
// Distance / dates
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Distance {
    #[serde(deserialize_with = "f64_lenient")]
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default)]
    pub reference: References,
    #[serde(default)]
    pub computed: bool,
    pub distance_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<bool>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Distance {
    pub fn redshift(value: f64, reference: impl Into<References>) -> Self {
        Self {
            value,
            unit: None,
            reference: reference.into(),
            computed: false,
            distance_type: "redshift".into(),
            default: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn is_redshift(&self) -> bool {
        self.distance_type == "redshift"
    }
}

/// A date as written by the source: numeric (mjd, jd, unix, ...) or text (iso).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateValue {
    Number(f64),
    Text(String),
}

impl std::fmt::Display for DateValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateReference {
    pub value: DateValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_format: Option<String>,
    #[serde(default)]
    pub reference: References,
    #[serde(default)]
    pub computed: bool,
    pub date_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<bool>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl DateReference {
    pub fn discovery(value: DateValue, format: &str, reference: impl Into<References>) -> Self {
        Self {
            value,
            date_format: Some(format.to_string()),
            reference: reference.into(),
            computed: false,
            date_type: "discovery".into(),
            default: None,
            extra: BTreeMap::new(),
        }
    }

    /// Recorded format, `mjd` when the source left it out.
    pub fn format(&self) -> &str {
        self.date_format.as_deref().unwrap_or("mjd")
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub object_class: String,
    #[serde(deserialize_with = "f64_lenient")]
    pub confidence: f64,
    #[serde(default)]
    pub reference: References,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<bool>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Classification {
    pub fn new(object_class: impl Into<String>, confidence: f64, reference: impl Into<References>) -> Self {
        Self {
            object_class: object_class.into(),
            confidence,
            reference: reference.into(),
            default: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn is_default(&self) -> bool {
        self.default == Some(true)
    }
}

// ---------------------------------------------------------------------------
// Filters / references / schema
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterAlias {
    pub filter_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wave_eff: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wave_units: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub freq_eff: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub freq_units: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wave_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wave_max: Option<f64>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl FilterAlias {
    pub fn with_wavelength(key: impl Into<String>, wave_eff: f64, wave_units: &str) -> Self {
        let key = key.into();
        Self {
            filter_name: Some(key.clone()),
            filter_key: key,
            wave_eff: Some(wave_eff),
            wave_units: Some(wave_units.to_string()),
            freq_eff: None,
            freq_units: None,
            wave_min: None,
            wave_max: None,
            extra: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceAlias {
    pub name: String,
    pub human_readable_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaVersion {
    #[serde(deserialize_with = "i64_lenient")]
    pub value: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

// ---------------------------------------------------------------------------
// Host / spectra
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Host {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_ra: Option<AngleValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_dec: Option<AngleValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_ra_units: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_dec_units: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_z: Option<f64>,
    #[serde(default)]
    pub reference: References,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Spectra have no fixed schema yet; entries stay flat JSON objects.
pub type SpectrumEntry = BTreeMap<String, Value>;
