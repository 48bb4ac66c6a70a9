// Settings
// Loaded from ~/.config/skyledger/config.toml

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use skyledger_photometry::{NormalizeRequest, XrayAreas};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config parse error: {0}")]
    Parse(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Spatial matching
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingSettings {
    /// Two records closer than this are the same transient.
    pub merge_tolerance_arcsec: f64,

    /// Default radius for cone searches.
    pub cone_radius_arcsec: f64,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            merge_tolerance_arcsec: 10.0,
            cone_radius_arcsec: 5.0,
        }
    }
}

/// Default output units for photometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhotometrySettings {
    pub flux_unit: String,
    pub date_unit: String,
    pub wave_unit: String,
    pub freq_unit: String,
}

impl Default for PhotometrySettings {
    fn default() -> Self {
        let req = NormalizeRequest::default();
        Self {
            flux_unit: req.flux_unit,
            date_unit: req.date_unit,
            wave_unit: req.wave_unit,
            freq_unit: req.freq_unit,
        }
    }
}

impl PhotometrySettings {
    /// A request in these units; obs_type and flux source are left open.
    pub fn request(&self) -> NormalizeRequest {
        NormalizeRequest {
            flux_unit: self.flux_unit.clone(),
            date_unit: self.date_unit.clone(),
            wave_unit: self.wave_unit.clone(),
            freq_unit: self.freq_unit.clone(),
            ..NormalizeRequest::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub matching: MatchingSettings,
    pub photometry: PhotometrySettings,
    /// Telescope → collecting area in cm². Replaces the built-in table when
    /// present.
    pub xray_areas: XrayAreas,
}

impl Settings {
    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        let settings: Settings =
            toml::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("matching.merge_tolerance_arcsec", self.matching.merge_tolerance_arcsec),
            ("matching.cone_radius_arcsec", self.matching.cone_radius_arcsec),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }

        for (telescope, area) in self.xray_areas.iter() {
            if !(area.is_finite() && area > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "xray_areas.{telescope} must be positive, got {area}"
                )));
            }
        }

        Ok(())
    }

    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("skyledger")
            .join("config.toml")
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&contents)
    }

    /// Load the user's settings file, falling back to defaults when there is
    /// none. A file that exists but does not parse is still an error.
    pub fn load_or_default() -> Result<Self, ConfigError> {
        let path = Self::config_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
[matching]
merge_tolerance_arcsec = 3.0

[photometry]
flux_unit = "mJy"

[xray_areas]
Chandra = 400.0
"#;

    #[test]
    fn empty_input_is_default() {
        let s = Settings::from_toml("").unwrap();
        assert_eq!(s, Settings::default());
        assert_eq!(s.matching.merge_tolerance_arcsec, 10.0);
        assert_eq!(s.photometry.wave_unit, "nm");
        assert_eq!(s.xray_areas.get("swift"), Some(135.0));
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let s = Settings::from_toml(SAMPLE).unwrap();
        assert_eq!(s.matching.merge_tolerance_arcsec, 3.0);
        assert_eq!(s.matching.cone_radius_arcsec, 5.0);
        assert_eq!(s.photometry.flux_unit, "mJy");
        assert_eq!(s.photometry.date_unit, "mjd");
        assert_eq!(s.xray_areas.get("chandra"), Some(400.0));
        assert_eq!(s.xray_areas.get("swift"), None);

        let req = s.photometry.request();
        assert_eq!(req.flux_unit, "mJy");
        assert!(req.obs_type.is_none());
    }

    #[test]
    fn non_positive_values_rejected() {
        let err = Settings::from_toml("[matching]\nmerge_tolerance_arcsec = 0.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "{err}");

        let err = Settings::from_toml("[xray_areas]\nswift = -1.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "{err}");
    }

    #[test]
    fn bad_toml_is_parse_error() {
        let err = Settings::from_toml("[matching\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let s = Settings::load(file.path()).unwrap();
        assert_eq!(s.photometry.flux_unit, "mJy");

        let missing = file.path().with_extension("absent");
        assert!(matches!(Settings::load(&missing), Err(ConfigError::Io { .. })));
    }
}
