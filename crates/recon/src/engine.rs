use std::collections::BTreeSet;

use skyledger_core::{Coordinate, Diagnostics, Record, WarningKind};
use tracing::debug;

use crate::error::{ReconError, Result};
use crate::fields;
use crate::spatial;
use crate::tabular::merge_entries;

/// How a merge treats distant records and unknown shared keys.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergePolicy {
    /// Reject distant records and unmergeable shared keys instead of
    /// keeping the left value.
    pub strict: bool,
    /// Largest separation at which two records are the same object.
    pub tolerance_arcsec: f64,
}

impl MergePolicy {
    pub const DEFAULT_TOLERANCE_ARCSEC: f64 = 10.0;

    pub fn strict(tolerance_arcsec: f64) -> Self {
        Self {
            strict: true,
            tolerance_arcsec,
        }
    }

    pub fn lenient() -> Self {
        Self {
            strict: false,
            tolerance_arcsec: Self::DEFAULT_TOLERANCE_ARCSEC,
        }
    }
}

impl Default for MergePolicy {
    fn default() -> Self {
        Self::strict(Self::DEFAULT_TOLERANCE_ARCSEC)
    }
}

/// Merge two descriptions of the same transient into a new record.
///
/// Sections present on one side are copied. Shared sections that are equal
/// are copied once; otherwise the section's merger runs. Neither input is
/// modified.
pub fn merge(a: &Record, b: &Record, policy: &MergePolicy, diag: &mut Diagnostics) -> Result<Record> {
    if policy.strict {
        let sep = spatial::separation_arcsec(a, b)?;
        if sep > policy.tolerance_arcsec {
            return Err(ReconError::MergeRejected {
                reason: format!(
                    "records are {sep:.2}\" apart (tolerance {}\")",
                    policy.tolerance_arcsec
                ),
            });
        }
    }

    let mut out = Record {
        reference_alias: match (&a.reference_alias, &b.reference_alias) {
            (Some(x), Some(y)) => Some(fields::merge_reference_alias(x, y)),
            (x, y) => x.clone().or_else(|| y.clone()),
        },
        ..Record::default()
    };

    out.name = combine("name", &a.name, &b.name, |x, y| Ok(fields::merge_name(x, y, diag)))?;
    out.coordinate = combine("coordinate", &a.coordinate, &b.coordinate, |x, y| {
        let mut merged = merge_entries(x, y, "coordinate")?;
        keep_first_default(&mut merged);
        Ok(merged)
    })?;
    out.distance = combine("distance", &a.distance, &b.distance, |x, y| {
        merge_entries(x, y, "distance")
    })?;
    out.date_reference = combine("date_reference", &a.date_reference, &b.date_reference, |x, y| {
        merge_entries(x, y, "date_reference")
    })?;
    out.classification = combine("classification", &a.classification, &b.classification, |x, y| {
        Ok(fields::merge_classification(x, y))
    })?;
    out.photometry = combine("photometry", &a.photometry, &b.photometry, |x, y| {
        Ok(fields::merge_photometry(x, y))
    })?;
    out.filter_alias = combine("filter_alias", &a.filter_alias, &b.filter_alias, |x, y| {
        Ok(fields::merge_filter_alias(x, y))
    })?;
    out.schema_version = combine("schema_version", &a.schema_version, &b.schema_version, |x, y| {
        Ok(fields::merge_schema_version(x, y))
    })?;
    out.host = combine("host", &a.host, &b.host, |x, y| merge_entries(x, y, "host"))?;
    out.spectra = combine("spectra", &a.spectra, &b.spectra, |x, y| {
        merge_entries(x, y, "spectra")
    })?;

    let keys: BTreeSet<&String> = a.extra.keys().chain(b.extra.keys()).collect();
    for key in keys {
        let value = match (a.extra.get(key), b.extra.get(key)) {
            (Some(x), Some(y)) if x != y => {
                if policy.strict {
                    return Err(ReconError::MergeRejected {
                        reason: format!("no merge strategy for field '{key}'"),
                    });
                }
                diag.warn(
                    WarningKind::UnexpectedField,
                    format!("field '{key}' differs and has no merge strategy; keeping the existing value"),
                );
                x.clone()
            }
            (Some(x), _) => x.clone(),
            (None, Some(y)) => y.clone(),
            (None, None) => continue,
        };
        out.extra.insert(key.clone(), value);
    }

    out.validate()?;
    Ok(out)
}

fn combine<T: Clone + PartialEq>(
    section: &'static str,
    a: &Option<T>,
    b: &Option<T>,
    merge_fn: impl FnOnce(&T, &T) -> Result<T>,
) -> Result<Option<T>> {
    Ok(match (a, b) {
        (Some(x), Some(y)) if x == y => Some(x.clone()),
        (Some(x), Some(y)) => {
            debug!(section, "merging shared section");
            Some(merge_fn(x, y)?)
        }
        (Some(x), None) | (None, Some(x)) => Some(x.clone()),
        (None, None) => None,
    })
}

/// Two sources may each flag a default position; the first one stays.
fn keep_first_default(coords: &mut [Coordinate]) {
    let mut seen = false;
    for c in coords.iter_mut().filter(|c| c.is_default()) {
        if seen {
            c.default = None;
        }
        seen = true;
    }
}
