use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use skyledger_core::{FluxSource, ObsType};
use skyledger_units::{FluxUnit, SpectralUnit, TimeFormat};

use crate::error::{PhotometryError, Result};

/// What the caller wants the photometry converted to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeRequest {
    pub flux_unit: String,
    pub date_unit: String,
    pub wave_unit: String,
    pub freq_unit: String,
    /// Keep only rows of this regime.
    pub obs_type: Option<String>,
    /// Column family to read the flux from.
    pub by: FluxSource,
    /// When false, [`collect_photometry`](crate::collect_photometry) projects
    /// onto [`OUTPUT_COLUMNS`](crate::OUTPUT_COLUMNS).
    pub keep_raw: bool,
}

impl Default for NormalizeRequest {
    fn default() -> Self {
        Self {
            flux_unit: "mag(AB)".to_string(),
            date_unit: "mjd".to_string(),
            wave_unit: "nm".to_string(),
            freq_unit: "GHz".to_string(),
            obs_type: None,
            by: FluxSource::Raw,
            keep_raw: true,
        }
    }
}

impl NormalizeRequest {
    pub fn obs_type_filter(&self) -> Result<Option<ObsType>> {
        self.obs_type
            .as_deref()
            .map(parse_obs_type)
            .transpose()
    }
}

pub(crate) fn parse_obs_type(s: &str) -> Result<ObsType> {
    s.parse::<ObsType>().map_err(PhotometryError::InvalidObsType)
}

/// Request units, parsed once per call.
#[derive(Debug, Clone, Copy)]
pub(crate) struct OutputUnits {
    pub flux: FluxUnit,
    pub date: TimeFormat,
    pub wave: SpectralUnit,
    pub freq: SpectralUnit,
}

impl OutputUnits {
    pub fn resolve(request: &NormalizeRequest) -> Result<Self> {
        Ok(Self {
            flux: parse_flux_unit(&request.flux_unit)?,
            date: request.date_unit.parse()?,
            wave: SpectralUnit::parse(&request.wave_unit)?,
            freq: SpectralUnit::parse(&request.freq_unit)?,
        })
    }
}

/// Parse a flux unit, retrying once with the two common misspellings
/// ("ergs", bare "AB") repaired.
pub fn parse_flux_unit(raw: &str) -> Result<FluxUnit> {
    match FluxUnit::parse(raw) {
        Ok(unit) => Ok(unit),
        Err(_) => {
            let fixed = raw.replace("ergs", "erg").replace("AB", "mag(AB)");
            Ok(FluxUnit::parse(&fixed)?)
        }
    }
}

// ---------------------------------------------------------------------------
// Collecting areas
// ---------------------------------------------------------------------------

/// Effective collecting area per x-ray telescope, in cm². Lookups ignore case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct XrayAreas(BTreeMap<String, f64>);

impl Default for XrayAreas {
    fn default() -> Self {
        [
            ("chandra", 600.0),
            ("xmm", 1500.0),
            ("swift", 135.0),
            ("xrt", 135.0),
            ("nicer", 1900.0),
            ("nustar", 847.0),
            ("erosita", 1365.0),
        ]
        .into_iter()
        .collect()
    }
}

impl FromIterator<(&'static str, f64)> for XrayAreas {
    fn from_iter<I: IntoIterator<Item = (&'static str, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }
}

impl XrayAreas {
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    pub fn insert(&mut self, telescope: impl Into<String>, area_cm2: f64) {
        self.0.insert(telescope.into().to_lowercase(), area_cm2);
    }

    pub fn get(&self, telescope: &str) -> Option<f64> {
        self.0
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(telescope))
            .map(|(_, area)| *area)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_ab_is_repaired() {
        assert_eq!(parse_flux_unit("AB").unwrap(), FluxUnit::AbMag);
        assert!(parse_flux_unit("ergs/s/cm2").is_ok());
        assert!(parse_flux_unit("bananas").is_err());
    }

    #[test]
    fn area_lookup_ignores_case() {
        let areas = XrayAreas::default();
        assert_eq!(areas.get("Swift"), Some(135.0));
        assert_eq!(areas.get("CHANDRA"), Some(600.0));
        assert_eq!(areas.get("Hubble"), None);
    }

    #[test]
    fn obs_type_filter_is_validated() {
        let req = NormalizeRequest {
            obs_type: Some("gamma".into()),
            ..NormalizeRequest::default()
        };
        assert_eq!(
            req.obs_type_filter(),
            Err(PhotometryError::InvalidObsType("gamma".into()))
        );
    }
}
