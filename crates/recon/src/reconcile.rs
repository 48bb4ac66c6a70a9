use skyledger_core::{Diagnostics, Record};
use tracing::debug;

use crate::engine::{merge, MergePolicy};
use crate::error::{ReconError, Result};
use crate::spatial::spatial_match;

/// Fold staging records into a primary result set.
///
/// Each private record is offered to the primary records in result order;
/// the first one within `tolerance_arcsec` absorbs it through a lenient
/// merge. A private record that matches none is appended as-is. Distance
/// and missing positions only skip a pair; any other merge failure aborts.
pub fn reconcile(
    primary: &[Record],
    private: &[Record],
    tolerance_arcsec: f64,
    diag: &mut Diagnostics,
) -> Result<Vec<Record>> {
    let policy = MergePolicy {
        tolerance_arcsec,
        ..MergePolicy::lenient()
    };
    let mut merged: Vec<Record> = primary.to_vec();
    let mut additions = Vec::new();

    for staged in private {
        let mut absorbed = false;
        for target in merged.iter_mut() {
            match spatial_match(&*target, staged, tolerance_arcsec) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e @ ReconError::MissingPosition { .. }) => {
                    debug!(error = %e, "skipping pair without positions");
                    continue;
                }
                Err(e) => return Err(e),
            }
            *target = merge(&*target, staged, &policy, diag)?;
            absorbed = true;
            break;
        }
        if !absorbed {
            debug!(name = ?staged.default_name(), "no primary match; adding staged record");
            additions.push(staged.clone());
        }
    }

    merged.extend(additions);
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use skyledger_core::{Coordinate, Name};

    fn at(name: &str, dec_offset_arcsec: f64) -> Record {
        Record {
            name: Some(Name::new(name)),
            coordinate: Some(vec![Coordinate::equatorial_deg(
                200.0,
                -30.0 + dec_offset_arcsec / 3600.0,
                name,
            )]),
            ..Record::default()
        }
    }

    #[test]
    fn first_match_wins() {
        let primary = vec![at("2019a", 0.0), at("2019b", 4.0)];
        let private = vec![at("ZTF19x", 2.5)];
        let out = reconcile(&primary, &private, 5.0, &mut Diagnostics::silent()).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].coordinate.as_ref().map(Vec::len), Some(2));
        assert_eq!(out[1], primary[1]);
    }

    #[test]
    fn unmatched_is_appended() {
        let primary = vec![at("2019a", 0.0)];
        let private = vec![at("far", 600.0)];
        let out = reconcile(&primary, &private, 5.0, &mut Diagnostics::silent()).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[1], private[0]);
    }
}
