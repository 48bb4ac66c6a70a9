//! `skyledger-units` - pure conversion helpers.
//!
//! Nothing in this crate knows about records. It converts numbers between
//! unit systems given the physical context (wavelength, bandwidth, collecting
//! area) the caller supplies.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`unit`] | Parse unit strings into a scale and a dimension vector |
//! | [`spectral`] | Wavelength ↔ frequency ↔ photon energy |
//! | [`flux`] | Flux-density systems, magnitudes and count rates |
//! | [`time`] | Date formats (mjd, jd, unix, iso, ...) |
//! | [`sky`] | Angle parsing, galactic → ICRS, angular separation |

pub mod constants;
pub mod error;
pub mod flux;
pub mod sky;
pub mod spectral;
pub mod time;
pub mod unit;
mod vega;

pub use error::{UnitError, UnitResult};
pub use flux::{FluxKind, FluxUnit, SpectralContext};
pub use sky::SkyPosition;
pub use spectral::SpectralUnit;
pub use time::{TimeFormat, TimeValue};
pub use unit::Unit;
