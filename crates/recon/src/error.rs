use skyledger_core::RecordError;
use skyledger_units::UnitError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconError {
    /// Strict merge refused: too far apart, or a shared key with no merger.
    #[error("merge rejected: {reason}")]
    MergeRejected { reason: String },

    /// More than one stored record sits within tolerance of the incoming one.
    #[error("{count} stored records match within tolerance; resolve manually")]
    AmbiguousMatch { count: usize },

    #[error("record '{name}' has no usable ra/dec or l/b coordinate")]
    MissingPosition { name: String },

    #[error("bad coordinate on '{name}': {source}")]
    BadCoordinate {
        name: String,
        #[source]
        source: UnitError,
    },

    /// A merged section failed to re-encode into its typed form.
    #[error("merged '{section}' is malformed: {detail}")]
    Malformed { section: &'static str, detail: String },

    #[error(transparent)]
    Record(#[from] RecordError),
}

pub type Result<T> = std::result::Result<T, ReconError>;
