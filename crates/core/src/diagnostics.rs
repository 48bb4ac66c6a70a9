//! Non-fatal warnings raised while merging or normalizing.
//!
//! Every operation that can warn takes a `&mut Diagnostics`. The caller picks
//! the verbosity; nothing here is process-global.

use serde::Serialize;

/// How warnings are handled once raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Drop warnings.
    Silent,
    /// Keep warnings for the caller to inspect.
    #[default]
    Collect,
    /// Keep warnings and forward each one to `tracing`.
    Emit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// A bibcode had no human readable name in the record's reference map.
    UnresolvedReference,
    /// A lenient merge met a shared key it has no strategy for.
    UnexpectedField,
    /// Two default names scored equally; the left one was kept.
    NameScoreTie,
    /// A photometry row was dropped before conversion.
    SkippedMeasurement,
}

impl std::fmt::Display for WarningKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnresolvedReference => write!(f, "unresolved_reference"),
            Self::UnexpectedField => write!(f, "unexpected_field"),
            Self::NameScoreTie => write!(f, "name_score_tie"),
            Self::SkippedMeasurement => write!(f, "skipped_measurement"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    verbosity: Verbosity,
    warnings: Vec<Warning>,
}

impl Diagnostics {
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            warnings: Vec::new(),
        }
    }

    pub fn silent() -> Self {
        Self::new(Verbosity::Silent)
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    pub fn warn(&mut self, kind: WarningKind, message: impl Into<String>) {
        let message = message.into();
        match self.verbosity {
            Verbosity::Silent => {}
            Verbosity::Collect => self.warnings.push(Warning { kind, message }),
            Verbosity::Emit => {
                tracing::warn!(kind = %kind, "{message}");
                self.warnings.push(Warning { kind, message });
            }
        }
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn count(&self, kind: WarningKind) -> usize {
        self.warnings.iter().filter(|w| w.kind == kind).count()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Drain collected warnings, leaving the verbosity unchanged.
    pub fn take(&mut self) -> Vec<Warning> {
        std::mem::take(&mut self.warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collect_keeps_warnings() {
        let mut diag = Diagnostics::new(Verbosity::Collect);
        diag.warn(WarningKind::NameScoreTie, "tie");
        diag.warn(WarningKind::UnexpectedField, "extra");
        assert_eq!(diag.warnings().len(), 2);
        assert_eq!(diag.count(WarningKind::NameScoreTie), 1);
    }

    #[test]
    fn silent_drops_warnings() {
        let mut diag = Diagnostics::silent();
        diag.warn(WarningKind::NameScoreTie, "tie");
        assert!(diag.is_empty());
    }

    #[test]
    fn take_drains() {
        let mut diag = Diagnostics::default();
        diag.warn(WarningKind::SkippedMeasurement, "row 3");
        let taken = diag.take();
        assert_eq!(taken.len(), 1);
        assert!(diag.is_empty());
        assert_eq!(diag.verbosity(), Verbosity::Collect);
    }
}
