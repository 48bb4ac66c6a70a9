//! Spectral equivalence: wavelength ↔ frequency ↔ photon energy.
//!
//! Everything pivots through Ångström.

use crate::constants::{ANGSTROM_M, HC_ERG_AA, SPEED_OF_LIGHT_AA_S};
use crate::error::{UnitError, UnitResult};
use crate::unit::{Dims, Unit};

/// A unit on the spectral axis, with its size in SI (m, Hz or J).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpectralUnit {
    Wavelength(f64),
    Frequency(f64),
    Energy(f64),
}

impl SpectralUnit {
    pub const ANGSTROM: SpectralUnit = SpectralUnit::Wavelength(ANGSTROM_M);

    pub fn parse(s: &str) -> UnitResult<Self> {
        let unit = Unit::parse(s)?;
        match unit.dims {
            d if d == Dims::LENGTH => Ok(Self::Wavelength(unit.scale)),
            d if d == Dims::FREQUENCY => Ok(Self::Frequency(unit.scale)),
            d if d == Dims::ENERGY => Ok(Self::Energy(unit.scale)),
            _ => Err(UnitError::WrongKind {
                unit: s.to_string(),
                expected: "wavelength, frequency or energy",
            }),
        }
    }

    /// Express `value` (in this unit) as a wavelength in Å.
    pub fn to_angstrom(&self, value: f64) -> UnitResult<f64> {
        if !(value.is_finite() && value > 0.0) {
            return Err(UnitError::BadWavelength(value));
        }
        Ok(match *self {
            Self::Wavelength(m) => value * m / ANGSTROM_M,
            Self::Frequency(hz) => SPEED_OF_LIGHT_AA_S / (value * hz),
            // E[J] → erg, λ = hc / E
            Self::Energy(j) => HC_ERG_AA / (value * j * 1e7),
        })
    }

    /// Express a wavelength in Å in this unit.
    pub fn from_angstrom(&self, aa: f64) -> UnitResult<f64> {
        if !(aa.is_finite() && aa > 0.0) {
            return Err(UnitError::BadWavelength(aa));
        }
        Ok(match *self {
            Self::Wavelength(m) => aa * ANGSTROM_M / m,
            Self::Frequency(hz) => SPEED_OF_LIGHT_AA_S / aa / hz,
            Self::Energy(j) => HC_ERG_AA / aa / 1e7 / j,
        })
    }

    /// Convert a value between two spectral units.
    pub fn convert(&self, value: f64, to: &SpectralUnit) -> UnitResult<f64> {
        to.from_angstrom(self.to_angstrom(value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn nm_to_ghz() {
        let nm = SpectralUnit::parse("nm").unwrap();
        let ghz = SpectralUnit::parse("GHz").unwrap();
        // 500 nm ≈ 599584.9 GHz
        assert_relative_eq!(
            nm.convert(500.0, &ghz).unwrap(),
            599_584.916,
            max_relative = 1e-6
        );
        assert_relative_eq!(
            ghz.convert(599_584.916, &nm).unwrap(),
            500.0,
            max_relative = 1e-6
        );
    }

    #[test]
    fn kev_to_angstrom() {
        let kev = SpectralUnit::parse("keV").unwrap();
        // 1 keV ≈ 12.398 Å
        assert_relative_eq!(kev.to_angstrom(1.0).unwrap(), 12.398_42, max_relative = 1e-5);
    }

    #[test]
    fn flux_unit_is_not_spectral() {
        assert!(matches!(
            SpectralUnit::parse("mJy"),
            Err(UnitError::WrongKind { .. })
        ));
        assert!(SpectralUnit::ANGSTROM.to_angstrom(-1.0).is_err());
    }
}
