//! Flux systems.
//!
//! Every conversion goes through PHOTLAM (photons s⁻¹ cm⁻² Å⁻¹) at the
//! point's effective wavelength. Magnitude systems need the wavelength only;
//! band-integrated quantities and count rates also need the bandwidth, and
//! count rates need the instrument's collecting area.

use std::f64::consts::LN_10;
use std::fmt;

use crate::constants::{AB_ZERO_POINT, HC_ERG_AA, SPEED_OF_LIGHT_AA_S, ST_ZERO_POINT};
use crate::error::{UnitError, UnitResult};
use crate::unit::{Dims, Unit};
use crate::vega;

/// Physical kind of a linear flux unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FluxKind {
    /// Energy per area per time per frequency (Jy, erg/s/cm²/Hz).
    FNu,
    /// Energy per area per time per wavelength (erg/s/cm²/Å).
    FLam,
    /// Photons per area per time per wavelength.
    PhotLam,
    /// Photons per area per time per frequency.
    PhotNu,
    /// Band-integrated energy flux (erg/s/cm²).
    EnergyFlux,
    /// Band-integrated photon flux (ph/s/cm²).
    PhotonFlux,
    /// Detector counts per time (ct/s).
    CountRate,
}

impl FluxKind {
    fn from_dims(d: Dims) -> Option<Self> {
        let kind = match (d.energy, d.length, d.time, d.photon, d.count) {
            (1, -2, 0, 0, 0) => Self::FNu,
            (1, -3, -1, 0, 0) => Self::FLam,
            (0, -3, -1, 1, 0) => Self::PhotLam,
            (0, -2, 0, 1, 0) => Self::PhotNu,
            (1, -2, -1, 0, 0) => Self::EnergyFlux,
            (0, -2, -1, 1, 0) => Self::PhotonFlux,
            (0, 0, -1, 0, 1) => Self::CountRate,
            _ => return None,
        };
        Some(kind)
    }

    /// Factor from SI of this kind to its CGS/Å counterpart.
    fn si_to_cgs(&self) -> f64 {
        match self {
            // J m⁻² → erg cm⁻²
            Self::FNu => 1e3,
            // J m⁻³ s⁻¹ → erg cm⁻² Å⁻¹ s⁻¹
            Self::FLam => 1e-7,
            Self::PhotLam => 1e-14,
            Self::PhotNu => 1e-4,
            Self::EnergyFlux => 1e3,
            Self::PhotonFlux => 1e-4,
            Self::CountRate => 1.0,
        }
    }
}

/// Where on the spectrum a point was measured.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectralContext {
    pub wavelength_aa: f64,
    pub bandwidth_aa: Option<f64>,
    pub area_cm2: Option<f64>,
}

impl SpectralContext {
    pub fn at(wavelength_aa: f64) -> Self {
        Self {
            wavelength_aa,
            bandwidth_aa: None,
            area_cm2: None,
        }
    }

    pub fn with_bandwidth(mut self, bandwidth_aa: f64) -> Self {
        self.bandwidth_aa = Some(bandwidth_aa);
        self
    }

    pub fn with_area(mut self, area_cm2: f64) -> Self {
        self.area_cm2 = Some(area_cm2);
        self
    }

    fn wavelength(&self) -> UnitResult<f64> {
        let w = self.wavelength_aa;
        if w.is_finite() && w > 0.0 {
            Ok(w)
        } else {
            Err(UnitError::BadWavelength(w))
        }
    }

    fn bandwidth(&self) -> UnitResult<f64> {
        match self.bandwidth_aa {
            Some(b) if b.is_finite() && b > 0.0 => Ok(b),
            _ => Err(UnitError::MissingBandwidth),
        }
    }

    fn area(&self) -> UnitResult<f64> {
        match self.area_cm2 {
            Some(a) if a.is_finite() && a > 0.0 => Ok(a),
            _ => Err(UnitError::MissingArea),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FluxUnit {
    AbMag,
    StMag,
    VegaMag,
    /// `value * scale` is the flux in SI units of `kind`.
    Linear { kind: FluxKind, scale: f64 },
}

impl fmt::Display for FluxUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AbMag => f.write_str("mag(AB)"),
            Self::StMag => f.write_str("mag(ST)"),
            Self::VegaMag => f.write_str("mag(Vega)"),
            Self::Linear { kind, scale } => write!(f, "{scale:e} SI {kind:?}"),
        }
    }
}

impl FluxUnit {
    /// Parse a flux unit string. Anything mentioning Vega is the Vega
    /// magnitude system; other strings go through [`Unit::parse`].
    pub fn parse(s: &str) -> UnitResult<Self> {
        let trimmed = s.trim();
        if trimmed.to_ascii_lowercase().contains("vega") {
            return Ok(Self::VegaMag);
        }
        match trimmed {
            "mag(AB)" | "ABmag" | "AB mag" => return Ok(Self::AbMag),
            "mag(ST)" | "STmag" | "ST mag" => return Ok(Self::StMag),
            _ => {}
        }
        let unit = Unit::parse(trimmed)?;
        let kind = FluxKind::from_dims(unit.dims).ok_or_else(|| UnitError::WrongKind {
            unit: s.to_string(),
            expected: "flux",
        })?;
        Ok(Self::Linear {
            kind,
            scale: unit.scale,
        })
    }

    pub fn is_magnitude(&self) -> bool {
        !matches!(self, Self::Linear { .. })
    }

    /// Value in this unit → PHOTLAM.
    pub fn to_photlam(&self, value: f64, ctx: &SpectralContext) -> UnitResult<f64> {
        let w = ctx.wavelength()?;
        let photons_per_erg = w / HC_ERG_AA;
        let p = match *self {
            Self::AbMag => {
                let fnu = 10f64.powf(-0.4 * (value + AB_ZERO_POINT));
                fnu * SPEED_OF_LIGHT_AA_S / (w * w) * photons_per_erg
            }
            Self::StMag => 10f64.powf(-0.4 * (value + ST_ZERO_POINT)) * photons_per_erg,
            Self::VegaMag => vega::flam_at(w) * 10f64.powf(-0.4 * value) * photons_per_erg,
            Self::Linear { kind, scale } => {
                let v = value * scale * kind.si_to_cgs();
                match kind {
                    FluxKind::FNu => v * SPEED_OF_LIGHT_AA_S / (w * w) * photons_per_erg,
                    FluxKind::FLam => v * photons_per_erg,
                    FluxKind::PhotLam => v,
                    FluxKind::PhotNu => v * SPEED_OF_LIGHT_AA_S / (w * w),
                    FluxKind::EnergyFlux => v / ctx.bandwidth()? * photons_per_erg,
                    FluxKind::PhotonFlux => v / ctx.bandwidth()?,
                    FluxKind::CountRate => v / (ctx.area()? * ctx.bandwidth()?),
                }
            }
        };
        Ok(p)
    }

    /// PHOTLAM → value in this unit. Non-positive fluxes have no magnitude
    /// and come back as NaN.
    pub fn from_photlam(&self, p: f64, ctx: &SpectralContext) -> UnitResult<f64> {
        let w = ctx.wavelength()?;
        let ergs_per_photon = HC_ERG_AA / w;
        let flam = p * ergs_per_photon;
        let mag = |f: f64, zp: f64| {
            if f > 0.0 {
                -2.5 * f.log10() - zp
            } else {
                f64::NAN
            }
        };
        let v = match *self {
            Self::AbMag => mag(flam * w * w / SPEED_OF_LIGHT_AA_S, AB_ZERO_POINT),
            Self::StMag => mag(flam, ST_ZERO_POINT),
            Self::VegaMag => mag(flam / vega::flam_at(w), 0.0),
            Self::Linear { kind, scale } => {
                let cgs = match kind {
                    FluxKind::FNu => flam * w * w / SPEED_OF_LIGHT_AA_S,
                    FluxKind::FLam => flam,
                    FluxKind::PhotLam => p,
                    FluxKind::PhotNu => p * w * w / SPEED_OF_LIGHT_AA_S,
                    FluxKind::EnergyFlux => flam * ctx.bandwidth()?,
                    FluxKind::PhotonFlux => p * ctx.bandwidth()?,
                    FluxKind::CountRate => p * ctx.area()? * ctx.bandwidth()?,
                };
                cgs / kind.si_to_cgs() / scale
            }
        };
        Ok(v)
    }

    pub fn convert(&self, value: f64, to: &FluxUnit, ctx: &SpectralContext) -> UnitResult<f64> {
        to.from_photlam(self.to_photlam(value, ctx)?, ctx)
    }

    /// Convert a value and its uncertainty, propagating the error to first
    /// order through the (log-)linear maps on either side of PHOTLAM.
    pub fn convert_with_error(
        &self,
        value: f64,
        err: f64,
        to: &FluxUnit,
        ctx: &SpectralContext,
    ) -> UnitResult<(f64, f64)> {
        let p = self.to_photlam(value, ctx)?;
        let sigma_p = if self.is_magnitude() {
            p * 0.4 * LN_10 * err.abs()
        } else {
            self.to_photlam(err.abs(), ctx)?
        };

        let out = to.from_photlam(p, ctx)?;
        let out_err = if to.is_magnitude() {
            if p > 0.0 {
                2.5 / LN_10 * sigma_p / p
            } else {
                f64::NAN
            }
        } else {
            to.from_photlam(sigma_p, ctx)?
        };
        Ok((out, out_err))
    }
}
