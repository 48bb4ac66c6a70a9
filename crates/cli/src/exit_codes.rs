//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                              |
//! |---------|------------------|------------------------------------------|
//! | 0       | Universal        | Success                                  |
//! | 1       | Universal        | General error; `match` found no match    |
//! | 2       | Universal        | CLI usage error (bad args, missing file) |
//! | 3-9     | merge / match    | Record merge and spatial matching        |
//! | 10-19   | input            | Reading records, stores and config       |
//! | 20-29   | phot             | Photometry normalization                 |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Map it from the library error below

use skyledger_photometry::PhotometryError;
use skyledger_recon::ReconError;

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// `match`: the two positions are farther apart than the tolerance.
/// Like `diff(1)`, exit 1 means "not the same".
pub const EXIT_NO_MATCH: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Merge / match (3-9)
// =============================================================================

/// Strict merge refused: records too far apart or an unmergeable field.
pub const EXIT_MERGE_REJECTED: u8 = 3;

/// More than one stored record lies within the merge tolerance.
pub const EXIT_AMBIGUOUS_MATCH: u8 = 4;

/// A record has no interpretable position.
pub const EXIT_MISSING_POSITION: u8 = 5;

/// A record failed validation after merging.
pub const EXIT_INVALID_RECORD: u8 = 6;

// =============================================================================
// Input (10-19)
// =============================================================================

/// Cannot read or write a file.
pub const EXIT_IO: u8 = 10;

/// Input is not a valid record (or list of records).
pub const EXIT_PARSE: u8 = 11;

/// Config file is unreadable or invalid.
pub const EXIT_CONFIG: u8 = 12;

// =============================================================================
// Photometry (20-29)
// =============================================================================

/// `--obs-type` (or a row's obs_type) is not radio, uvoir or xray.
pub const EXIT_PHOT_OBS_TYPE: u8 = 20;

/// One group of measurements mixes unit spellings.
pub const EXIT_PHOT_UNITS: u8 = 21;

/// X-ray data without a telescope, or with one that has no known area.
pub const EXIT_PHOT_AREA: u8 = 22;

/// A filter lacks the wavelength, frequency or energy band needed.
pub const EXIT_PHOT_BAND: u8 = 23;

/// Nothing left to return.
pub const EXIT_PHOT_NO_DATA: u8 = 24;

/// A unit, date or column value could not be read.
pub const EXIT_PHOT_VALUE: u8 = 25;

// =============================================================================
// Library error mapping
// =============================================================================

pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::MergeRejected { .. } => EXIT_MERGE_REJECTED,
        ReconError::AmbiguousMatch { .. } => EXIT_AMBIGUOUS_MATCH,
        ReconError::MissingPosition { .. } | ReconError::BadCoordinate { .. } => {
            EXIT_MISSING_POSITION
        }
        ReconError::Malformed { .. } | ReconError::Record(_) => EXIT_INVALID_RECORD,
    }
}

pub fn photometry_exit_code(err: &PhotometryError) -> u8 {
    match err {
        PhotometryError::InvalidObsType(_) => EXIT_PHOT_OBS_TYPE,
        PhotometryError::InconsistentUnits { .. } => EXIT_PHOT_UNITS,
        PhotometryError::MissingTelescopeArea { .. } | PhotometryError::UnknownTelescope { .. } => {
            EXIT_PHOT_AREA
        }
        PhotometryError::MissingEnergyBand { .. } | PhotometryError::MissingWavelength { .. } => {
            EXIT_PHOT_BAND
        }
        PhotometryError::NoData => EXIT_PHOT_NO_DATA,
        PhotometryError::BadColumn { .. } | PhotometryError::Unit(_) => EXIT_PHOT_VALUE,
    }
}
