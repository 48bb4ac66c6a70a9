use thiserror::Error;

/// Structural problems found while decoding or validating a record.
#[derive(Debug, Error)]
pub enum RecordError {
    /// JSON could not be decoded into the record shape.
    #[error("cannot decode record: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("section '{section}' is present but empty")]
    EmptySection { section: &'static str },

    #[error("section '{section}' has {count} entries flagged default (at most one allowed)")]
    MultipleDefaults { section: &'static str, count: usize },

    #[error("alias '{value}' appears more than once")]
    DuplicateAlias { value: String },

    #[error("section '{section}' has duplicate key '{key}'")]
    DuplicateKey { section: &'static str, key: String },

    /// The flagged default classification is not the maximum-confidence entry.
    #[error("default classification '{object_class}' is not the most confident entry")]
    DefaultNotMaximal { object_class: String },

    #[error("photometry block is missing column '{column}'")]
    MissingColumn { column: String },

    #[error("photometry column '{column}' has an unexpected shape: {detail}")]
    BadColumn { column: String, detail: String },
}
