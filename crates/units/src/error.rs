use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum UnitError {
    #[error("cannot parse unit '{0}'")]
    Parse(String),

    /// Parsed fine but has the wrong physical dimension for the request.
    #[error("unit '{unit}' is not a {expected}")]
    WrongKind { unit: String, expected: &'static str },

    #[error("count-rate conversion needs a collecting area")]
    MissingArea,

    #[error("count-rate conversion needs a bandwidth")]
    MissingBandwidth,

    #[error("wavelength must be positive and finite, got {0}")]
    BadWavelength(f64),

    #[error("unknown time format '{0}'")]
    UnknownTimeFormat(String),

    #[error("cannot read '{value}' as a {format} date")]
    BadDate { value: String, format: String },

    #[error("unknown angle unit '{0}'")]
    UnknownAngleUnit(String),

    #[error("cannot read '{0}' as an angle")]
    BadAngle(String),
}

pub type UnitResult<T> = Result<T, UnitError>;
