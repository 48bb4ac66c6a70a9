// Configuration loading

pub mod settings;

pub use settings::{ConfigError, MatchingSettings, PhotometrySettings, Settings};
