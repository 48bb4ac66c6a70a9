//! Per-section merge strategies.
//!
//! Each merger takes the left and right values of one shared section and
//! returns the merged value. Left is the existing record; where a strategy
//! needs a tie-break, left wins.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashSet};

use serde_json::Value;
use skyledger_core::{
    Alias, Classification, Diagnostics, FilterAlias, Name, PhotometryBlock, ReferenceAlias, Row,
    SchemaVersion, WarningKind,
};
use tracing::debug;

use crate::naming;
use crate::tabular::structural_eq;

// ---------------------------------------------------------------------------
// Name
// ---------------------------------------------------------------------------

/// Union of aliases; shared aliases concatenate their reference lists.
/// The default name is chosen by [`naming::compare`].
pub fn merge_name(a: &Name, b: &Name, diag: &mut Diagnostics) -> Name {
    let default_name = if a.default_name == b.default_name {
        a.default_name.clone()
    } else {
        match naming::compare(&a.default_name, &b.default_name) {
            Ordering::Greater => a.default_name.clone(),
            Ordering::Less => b.default_name.clone(),
            Ordering::Equal => {
                diag.warn(
                    WarningKind::NameScoreTie,
                    format!(
                        "'{}' and '{}' score the same; keeping '{}'",
                        a.default_name, b.default_name, a.default_name
                    ),
                );
                a.default_name.clone()
            }
        }
    };

    let mut alias: Vec<Alias> = a
        .alias
        .iter()
        .map(|left| match b.alias.iter().find(|r| r.value == left.value) {
            Some(right) => Alias {
                value: left.value.clone(),
                reference: left.reference.concat(&right.reference),
            },
            None => left.clone(),
        })
        .collect();
    alias.extend(
        b.alias
            .iter()
            .filter(|right| !a.has_alias(&right.value))
            .cloned(),
    );

    let mut extra = b.extra.clone();
    extra.extend(a.extra.clone());

    Name {
        default_name,
        alias,
        extra,
    }
}

// ---------------------------------------------------------------------------
// Keyed unions
// ---------------------------------------------------------------------------

/// Union keyed by `filter_key`; on collision the left entry is kept.
pub fn merge_filter_alias(a: &[FilterAlias], b: &[FilterAlias]) -> Vec<FilterAlias> {
    union_by_key(a, b, |f| f.filter_key.as_str())
}

/// Union keyed by bibcode; on collision the left entry is kept.
pub fn merge_reference_alias(a: &[ReferenceAlias], b: &[ReferenceAlias]) -> Vec<ReferenceAlias> {
    union_by_key(a, b, |r| r.name.as_str())
}

fn union_by_key<T: Clone>(a: &[T], b: &[T], key: impl Fn(&T) -> &str) -> Vec<T> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut out = Vec::with_capacity(a.len() + b.len());
    for item in a.iter().chain(b) {
        if seen.insert(key(item)) {
            out.push(item.clone());
        }
    }
    out
}

/// Higher version wins; equal versions keep the left entry.
pub fn merge_schema_version(a: &SchemaVersion, b: &SchemaVersion) -> SchemaVersion {
    if b.value > a.value {
        b.clone()
    } else {
        a.clone()
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Merge keyed by `object_class`. A collision keeps the higher confidence
/// and the sorted union of both reference lists. The default flag is then
/// recomputed: the first maximum-confidence entry is the default.
pub fn merge_classification(a: &[Classification], b: &[Classification]) -> Vec<Classification> {
    let mut out: Vec<Classification> = a.to_vec();
    for item in b {
        match out.iter_mut().find(|c| c.object_class == item.object_class) {
            Some(existing) => {
                if item.confidence > existing.confidence {
                    existing.confidence = item.confidence;
                }
                existing.reference = existing.reference.union_sorted(&item.reference);
            }
            None => out.push(item.clone()),
        }
    }
    assign_default(&mut out);
    out
}

/// Flag exactly one entry (the first with maximal confidence) as default.
pub fn assign_default(classes: &mut [Classification]) {
    let best = classes
        .iter()
        .enumerate()
        .fold(None::<(usize, f64)>, |best, (i, c)| match best {
            Some((_, conf)) if c.confidence <= conf => best,
            _ => Some((i, c.confidence)),
        })
        .map(|(i, _)| i);
    for (i, c) in classes.iter_mut().enumerate() {
        c.default = Some(Some(i) == best);
    }
}

// ---------------------------------------------------------------------------
// Photometry
// ---------------------------------------------------------------------------

/// Blocks are matched on `(reference, telescope, obs_type)`. A right block
/// with a new key is appended; a matching one is outer-joined into the
/// existing block, which keeps its own `reference` value.
pub fn merge_photometry(a: &[PhotometryBlock], b: &[PhotometryBlock]) -> Vec<PhotometryBlock> {
    let mut out: Vec<PhotometryBlock> = a.to_vec();
    for block in b {
        let key = block.key();
        match out.iter_mut().find(|existing| existing.key() == key) {
            Some(existing) => {
                debug!(reference = ?key.reference, "joining photometry blocks");
                *existing = outer_join(existing, block);
            }
            None => out.push(block.clone()),
        }
    }
    out
}

/// Outer join on the columns both blocks carry (except `reference`). Rows
/// agreeing on every common column are combined; the rest are kept with
/// the missing columns null.
fn outer_join(left: &PhotometryBlock, right: &PhotometryBlock) -> PhotometryBlock {
    if left == right {
        return left.clone();
    }
    let left_cols: BTreeSet<&String> = left.columns().keys().collect();
    let common: Vec<&String> = right
        .columns()
        .keys()
        .filter(|c| c.as_str() != "reference" && left_cols.contains(c))
        .collect();

    let left_rows = left.rows();
    let right_rows = right.rows();
    if left_rows.is_empty() && right_rows.is_empty() {
        return left.clone();
    }

    let agrees = |l: &Row, r: &Row| {
        common.iter().all(|c| match (l.get(*c), r.get(*c)) {
            (Some(x), Some(y)) => structural_eq(x, y),
            _ => false,
        })
    };

    let mut right_used = vec![false; right_rows.len()];
    let mut rows: Vec<Row> = Vec::with_capacity(left_rows.len() + right_rows.len());
    for l in &left_rows {
        let mut matched = false;
        for (ri, r) in right_rows.iter().enumerate() {
            if agrees(l, r) {
                matched = true;
                right_used[ri] = true;
                let mut joined = r.clone();
                joined.extend(l.clone());
                rows.push(joined);
            }
        }
        if !matched {
            rows.push(l.clone());
        }
    }
    rows.extend(
        right_rows
            .into_iter()
            .zip(right_used)
            .filter(|(_, used)| !used)
            .map(|(r, _)| r),
    );

    let reference = left
        .column("reference")
        .cloned()
        .unwrap_or(Value::Null);
    PhotometryBlock::from_rows(reference, &rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use skyledger_core::References;

    fn alias(value: &str, r: &str) -> Alias {
        Alias {
            value: value.into(),
            reference: References::single(r),
        }
    }

    #[test]
    fn name_aliases_concat_refs() {
        let mut a = Name::new("2019abc");
        a.alias = vec![alias("2019abc", "TNS"), alias("ZTF19aaa", "ZTF")];
        let mut b = Name::new("AT2019abc");
        b.alias = vec![alias("AT2019abc", "TNS"), alias("ZTF19aaa", "ZTF")];

        let mut diag = Diagnostics::silent();
        let m = merge_name(&a, &b, &mut diag);
        assert_eq!(m.default_name, "AT2019abc");
        let values: Vec<&str> = m.alias.iter().map(|a| a.value.as_str()).collect();
        assert_eq!(values, ["2019abc", "ZTF19aaa", "AT2019abc"]);
        assert_eq!(m.alias[1].reference.as_slice(), ["ZTF", "ZTF"]);
        assert!(diag.is_empty());
    }

    #[test]
    fn name_tie_keeps_left_and_warns() {
        let a = Name::new("ASASSN-14li");
        let b = Name::new("PS1-10jh");
        let mut diag = Diagnostics::default();
        let m = merge_name(&a, &b, &mut diag);
        assert_eq!(m.default_name, "ASASSN-14li");
        assert_eq!(diag.count(WarningKind::NameScoreTie), 1);
    }

    #[test]
    fn filter_alias_left_wins() {
        let a = vec![FilterAlias::with_wavelength("g", 477.0, "nm")];
        let b = vec![
            FilterAlias::with_wavelength("g", 480.0, "nm"),
            FilterAlias::with_wavelength("r", 621.0, "nm"),
        ];
        let m = merge_filter_alias(&a, &b);
        assert_eq!(m.len(), 2);
        assert_eq!(m[0].wave_eff, Some(477.0));
    }

    #[test]
    fn classification_collision() {
        let a = vec![
            Classification::new("TDE", 0.6, "a"),
            Classification::new("SN Ia", 0.3, "a"),
        ];
        let b = vec![
            Classification::new("TDE", 0.9, "b"),
            Classification::new("AGN", 0.9, "b"),
        ];
        let m = merge_classification(&a, &b);
        assert_eq!(m.len(), 3);
        assert_eq!(m[0].confidence, 0.9);
        assert_eq!(m[0].reference.as_slice(), ["a", "b"]);
        // tie at 0.9: first in merged order is the default
        assert_eq!(m.iter().filter(|c| c.is_default()).count(), 1);
        assert!(m[0].is_default());
        assert_eq!(m[2].default, Some(false));
    }

    #[test]
    fn schema_max() {
        let v = |n| SchemaVersion {
            value: n,
            comment: None,
        };
        assert_eq!(merge_schema_version(&v(0), &v(2)).value, 2);
        assert_eq!(merge_schema_version(&v(3), &v(2)).value, 3);
    }

    fn block(v: Value) -> PhotometryBlock {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn photometry_outer_join() {
        let a = block(json!({
            "reference": ["2020A"], "telescope": "ZTF", "obs_type": "uvoir",
            "raw": [18.0, 18.5], "raw_units": "mag(AB)",
            "date": [59000.0, 59001.0], "date_format": "mjd",
            "filter_key": ["g", "r"]
        }));
        let b = block(json!({
            "reference": ["2020A"], "telescope": "ZTF", "obs_type": "uvoir",
            "raw": [18.5, 19.0], "raw_units": "mag(AB)", "raw_err": [0.1, 0.2],
            "date": [59001.0, 59002.0], "date_format": "mjd",
            "filter_key": ["r", "g"]
        }));
        let m = merge_photometry(&[a], &[b]);
        assert_eq!(m.len(), 1);
        let merged = &m[0];
        assert_eq!(merged.len(), 3);
        assert_eq!(merged.column("raw"), Some(&json!([18.0, 18.5, 19.0])));
        assert_eq!(merged.column("raw_err"), Some(&json!([null, 0.1, 0.2])));
        assert_eq!(merged.column("reference"), Some(&json!(["2020A"])));
    }

    #[test]
    fn photometry_distinct_telescopes_stay_apart() {
        let mk = |tel: &str| {
            block(json!({
                "reference": "2020A", "telescope": tel, "obs_type": "uvoir",
                "raw": [18.0], "raw_units": "mag(AB)", "date": [59000.0],
                "date_format": "mjd", "filter_key": ["g"]
            }))
        };
        let m = merge_photometry(&[mk("ZTF")], &[mk("ATLAS")]);
        assert_eq!(m.len(), 2);
    }
}
