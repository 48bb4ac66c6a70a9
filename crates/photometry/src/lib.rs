//! `skyledger-photometry` - photometry normalization.
//!
//! Turns the column-oriented photometry blocks of a [`Record`](skyledger_core::Record)
//! into one row per measurement with flux, date and spectral position
//! converted to caller-chosen units.

pub mod collect;
pub mod error;
pub mod normalize;
pub mod request;
pub mod table;

pub use collect::collect_photometry;
pub use error::{PhotometryError, Result};
pub use normalize::normalize_photometry;
pub use request::{parse_flux_unit, NormalizeRequest, XrayAreas};
pub use table::{PhotometryTable, OUTPUT_COLUMNS};
