//! `skyledger-core` - the transient record data model.
//!
//! A [`Record`] is one (possibly partial) description of an astronomical
//! transient, split into typed sections. Everything here is plain data plus
//! validation; merging, matching and unit conversion live in the sibling
//! crates.

pub mod diagnostics;
pub mod error;
pub mod path;
pub mod photometry;
pub mod record;
pub mod refs;
pub mod sections;
mod serde_util;

pub use diagnostics::{Diagnostics, Verbosity, Warning, WarningKind};
pub use error::RecordError;
pub use photometry::{BlockKey, FluxSource, ObsType, PhotometryBlock, Row};
pub use record::{Record, Section};
pub use refs::References;
pub use sections::{
    Alias, AngleValue, Classification, Coordinate, DateReference, DateValue, Distance,
    FilterAlias, Host, Name, ReferenceAlias, SchemaVersion, SpectrumEntry,
};
