//! Positions on the sky.

use crate::constants::{ARCSEC_PER_DEG, GALACTIC_TO_ICRS};
use crate::error::{UnitError, UnitResult};

/// Degrees per unit of an angle unit name.
fn degrees_per(unit: &str) -> UnitResult<f64> {
    let per = match unit.trim().to_ascii_lowercase().as_str() {
        "deg" | "degree" | "degrees" | "d" => 1.0,
        "hourangle" | "hour" | "hours" | "h" | "hr" => 15.0,
        "rad" | "radian" | "radians" => 180.0 / std::f64::consts::PI,
        "arcmin" => 1.0 / 60.0,
        "arcsec" => 1.0 / ARCSEC_PER_DEG,
        "mas" => 1.0 / ARCSEC_PER_DEG / 1000.0,
        _ => return Err(UnitError::UnknownAngleUnit(unit.to_string())),
    };
    Ok(per)
}

/// A decimal angle in `unit`, in degrees.
pub fn angle_deg(value: f64, unit: &str) -> UnitResult<f64> {
    if !value.is_finite() {
        return Err(UnitError::BadAngle(value.to_string()));
    }
    Ok(value * degrees_per(unit)?)
}

/// A textual angle in degrees. Decimal text is scaled by `unit`; sexagesimal
/// text (`10:30:00`, `-05 30 00`, `10h30m00s`, `-5d30m00s`) is read as hours
/// when `unit` is an hour angle and as degrees otherwise.
pub fn angle_text_deg(text: &str, unit: &str) -> UnitResult<f64> {
    let trimmed = text.trim();
    if let Ok(x) = trimmed.parse::<f64>() {
        return angle_deg(x, unit);
    }
    let bad = || UnitError::BadAngle(text.to_string());

    let negative = trimmed.starts_with('-');
    let body = trimmed.trim_start_matches(['-', '+']);
    let parts: Vec<f64> = body
        .split(|c: char| c == ':' || c.is_whitespace() || "hdms°'\"".contains(c))
        .filter(|p| !p.is_empty())
        .map(|p| p.parse::<f64>().map_err(|_| bad()))
        .collect::<UnitResult<_>>()?;
    if parts.is_empty() || parts.len() > 3 {
        return Err(bad());
    }
    let magnitude = parts
        .iter()
        .zip([1.0, 60.0, 3600.0])
        .map(|(v, div)| v / div)
        .sum::<f64>();
    let signed = if negative { -magnitude } else { magnitude };

    let per = degrees_per(unit)?;
    // sexagesimal is either hours or degrees
    let scale = if per == 15.0 { 15.0 } else { 1.0 };
    Ok(signed * scale)
}

/// An ICRS position in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkyPosition {
    pub ra_deg: f64,
    pub dec_deg: f64,
}

impl SkyPosition {
    /// RA is wrapped into [0, 360).
    pub fn new(ra_deg: f64, dec_deg: f64) -> UnitResult<Self> {
        if !(ra_deg.is_finite() && dec_deg.is_finite()) || dec_deg.abs() > 90.0 {
            return Err(UnitError::BadAngle(format!("({ra_deg}, {dec_deg})")));
        }
        Ok(Self {
            ra_deg: ra_deg.rem_euclid(360.0),
            dec_deg,
        })
    }

    /// Galactic (l, b) in degrees → ICRS.
    pub fn from_galactic(l_deg: f64, b_deg: f64) -> UnitResult<Self> {
        if !(l_deg.is_finite() && b_deg.is_finite()) || b_deg.abs() > 90.0 {
            return Err(UnitError::BadAngle(format!("({l_deg}, {b_deg})")));
        }
        let (l, b) = (l_deg.to_radians(), b_deg.to_radians());
        let gal = [b.cos() * l.cos(), b.cos() * l.sin(), b.sin()];

        let mut icrs = [0.0; 3];
        for (j, out) in icrs.iter_mut().enumerate() {
            *out = (0..3).map(|i| GALACTIC_TO_ICRS[i][j] * gal[i]).sum();
        }
        let ra = icrs[1].atan2(icrs[0]).to_degrees();
        let dec = icrs[2].clamp(-1.0, 1.0).asin().to_degrees();
        Self::new(ra, dec)
    }

    /// Great-circle separation in degrees (Vincenty form, stable at all
    /// distances).
    pub fn separation_deg(&self, other: &SkyPosition) -> f64 {
        let (sin1, cos1) = self.dec_deg.to_radians().sin_cos();
        let (sin2, cos2) = other.dec_deg.to_radians().sin_cos();
        let (sin_dl, cos_dl) = (other.ra_deg - self.ra_deg).to_radians().sin_cos();

        let num = ((cos2 * sin_dl).powi(2) + (cos1 * sin2 - sin1 * cos2 * cos_dl).powi(2)).sqrt();
        let den = sin1 * sin2 + cos1 * cos2 * cos_dl;
        num.atan2(den).to_degrees()
    }

    pub fn separation_arcsec(&self, other: &SkyPosition) -> f64 {
        self.separation_deg(other) * ARCSEC_PER_DEG
    }

    /// Offset by `arcsec` due north.
    pub fn offset_north(&self, arcsec: f64) -> UnitResult<Self> {
        Self::new(self.ra_deg, self.dec_deg + arcsec / ARCSEC_PER_DEG)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn sexagesimal() {
        assert_relative_eq!(angle_text_deg("10:30:00", "hourangle").unwrap(), 157.5);
        assert_relative_eq!(angle_text_deg("10h30m00s", "hourangle").unwrap(), 157.5);
        assert_relative_eq!(angle_text_deg("-05:30:00", "deg").unwrap(), -5.5);
        assert_relative_eq!(angle_text_deg("-5d30m00s", "deg").unwrap(), -5.5);
        assert_relative_eq!(angle_text_deg("12.5", "deg").unwrap(), 12.5);
        assert!(angle_text_deg("north", "deg").is_err());
        assert!(angle_deg(1.0, "furlong").is_err());
    }

    #[test]
    fn galactic_centre() {
        let p = SkyPosition::from_galactic(0.0, 0.0).unwrap();
        assert_relative_eq!(p.ra_deg, 266.404_99, epsilon = 1e-4);
        assert_relative_eq!(p.dec_deg, -28.936_17, epsilon = 1e-4);
    }

    #[test]
    fn separation() {
        let a = SkyPosition::new(10.0, 20.0).unwrap();
        assert_eq!(a.separation_deg(&a), 0.0);
        let b = a.offset_north(3.0).unwrap();
        assert_relative_eq!(a.separation_arcsec(&b), 3.0, max_relative = 1e-6);
        assert_relative_eq!(b.separation_arcsec(&a), 3.0, max_relative = 1e-6);
        let wrap = SkyPosition::new(359.9999, 0.0).unwrap();
        let other = SkyPosition::new(0.0001, 0.0).unwrap();
        assert_relative_eq!(wrap.separation_arcsec(&other), 0.72, max_relative = 1e-4);
    }
}
