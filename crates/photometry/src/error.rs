use skyledger_units::UnitError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PhotometryError {
    #[error("invalid obs_type '{0}' (expected radio, uvoir or xray)")]
    InvalidObsType(String),

    /// Rows grouped together carry differently spelled units.
    #[error("{obs_type} photometry mixes units {units:?}")]
    InconsistentUnits { obs_type: String, units: Vec<String> },

    #[error("x-ray photometry from {reference} has no telescope to take a collecting area from")]
    MissingTelescopeArea { reference: String },

    #[error("no collecting area known for telescope '{telescope}'")]
    UnknownTelescope { telescope: String },

    #[error("x-ray filter '{filter_key}' has no wave_min/wave_max band")]
    MissingEnergyBand { filter_key: String },

    #[error("filter '{filter_key}' has neither freq_eff nor wave_eff")]
    MissingWavelength { filter_key: String },

    #[error("bad '{column}' column: {detail}")]
    BadColumn { column: String, detail: String },

    #[error("no photometry left after normalization")]
    NoData,

    #[error(transparent)]
    Unit(#[from] UnitError),
}

pub type Result<T> = std::result::Result<T, PhotometryError>;
