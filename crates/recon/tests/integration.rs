use std::path::PathBuf;

use proptest::prelude::*;
use serde_json::{json, Value};
use skyledger_core::{Classification, Coordinate, Diagnostics, Name, Record, WarningKind};
use skyledger_recon::fields::merge_classification;
use skyledger_recon::tabular::{merge_values, structural_eq};
use skyledger_recon::{
    cone_search, merge, reconcile, spatial_match, Catalog, MergePolicy, ReconError, SaveOutcome,
};
use skyledger_units::SkyPosition;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load(name: &str) -> Record {
    let path = fixtures_dir().join(name);
    let text = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()));
    Record::from_json_str(&text).unwrap()
}

fn load_all(name: &str) -> Vec<Record> {
    let path = fixtures_dir().join(name);
    let text = std::fs::read_to_string(&path).unwrap();
    let values: Vec<Value> = serde_json::from_str(&text).unwrap();
    values.into_iter().map(|v| Record::from_value(v).unwrap()).collect()
}

fn offset(base: &Record, arcsec: f64) -> Record {
    let p = skyledger_recon::Locate::position(base).unwrap();
    let mut r = base.clone();
    r.coordinate = Some(vec![Coordinate::equatorial_deg(
        p.ra_deg,
        p.dec_deg + arcsec / 3600.0,
        "offset",
    )]);
    r
}

// -------------------------------------------------------------------------
// Merge
// -------------------------------------------------------------------------

#[test]
fn tns_and_survey_records_merge() {
    let tns = load("tns_2019abc.json");
    let survey = load("survey_at2019abc.json");
    let mut diag = Diagnostics::default();

    let merged = merge(&tns, &survey, &MergePolicy::default(), &mut diag).unwrap();

    assert_eq!(merged.default_name(), Some("AT2019abc"));
    let name = merged.name.as_ref().unwrap();
    assert_eq!(name.alias.len(), 2);
    assert_eq!(name.alias[0].value, "2019abc");
    assert_eq!(name.alias[0].reference.as_slice(), ["2019TNSTR.123....1S"]);
    assert_eq!(name.alias[1].value, "AT2019abc");
    assert_eq!(name.alias[1].reference.as_slice(), ["2020ApJ...900..1N"]);

    // identical coordinate sections are copied once
    assert_eq!(merged.coordinate.as_ref().map(Vec::len), Some(1));

    let classes = merged.classification.as_ref().unwrap();
    assert_eq!(classes.len(), 1);
    assert_eq!(classes[0].confidence, 1.0);
    assert_eq!(
        classes[0].reference.as_slice(),
        ["2019TNSTR.123....1S", "2020ApJ...900..1N"]
    );
    assert!(classes[0].is_default());

    assert_eq!(merged.schema_version.as_ref().map(|s| s.value), Some(1));
    assert_eq!(merged.reference_alias.as_ref().map(Vec::len), Some(2));
    assert_eq!(merged.redshift(), Some(0.0206));
    assert!(merged.has_photometry());
    assert!(merged.discovery_date().is_some());
    assert_eq!(diag.count(WarningKind::NameScoreTie), 0);
}

#[test]
fn self_merge_is_idempotent() {
    let survey = load("survey_at2019abc.json");
    let merged = merge(&survey, &survey, &MergePolicy::lenient(), &mut Diagnostics::silent()).unwrap();
    assert_eq!(merged, survey);
}

#[test]
fn distant_records_are_rejected_in_strict_mode() {
    let tns = load("tns_2019abc.json");
    let mut survey = load("survey_at2019abc.json");
    survey = offset(&survey, 11.0);

    let err = merge(&tns, &survey, &MergePolicy::default(), &mut Diagnostics::silent()).unwrap_err();
    assert!(matches!(err, ReconError::MergeRejected { .. }), "{err}");
}

#[test]
fn filter_alias_collision_is_left_biased() {
    let survey = load("survey_at2019abc.json");
    let mut other = survey.clone();
    if let Some(filters) = other.filter_alias.as_mut() {
        filters[0].wave_eff = Some(4800.0);
    }
    let ab = merge(&survey, &other, &MergePolicy::default(), &mut Diagnostics::silent()).unwrap();
    let ba = merge(&other, &survey, &MergePolicy::default(), &mut Diagnostics::silent()).unwrap();
    assert_eq!(ab.filter_alias.unwrap()[0].wave_eff, Some(4746.48));
    assert_eq!(ba.filter_alias.unwrap()[0].wave_eff, Some(4800.0));
}

// -------------------------------------------------------------------------
// Spatial / query
// -------------------------------------------------------------------------

#[test]
fn cone_search_radius_five_arcsec() {
    let records = load_all("cone_catalog.json");
    let centre = SkyPosition::new(150.0, 2.0).unwrap();
    let hits = cone_search(&records, centre, 5.0);
    let names: Vec<&str> = hits.iter().filter_map(|r| r.default_name()).collect();
    assert_eq!(names, ["near3", "near4"]);
}

#[test]
fn catalog_save_merges_or_inserts() {
    let mut catalog = Catalog::new(10.0);
    let mut diag = Diagnostics::silent();
    let tns = load("tns_2019abc.json");
    let survey = load("survey_at2019abc.json");

    assert_eq!(catalog.save(tns.clone(), &mut diag).unwrap(), SaveOutcome::Inserted(0));
    assert_eq!(catalog.save(survey, &mut diag).unwrap(), SaveOutcome::Merged(0));
    assert_eq!(catalog.records()[0].default_name(), Some("AT2019abc"));

    let far = offset(&tns, 120.0);
    assert_eq!(catalog.save(far, &mut diag).unwrap(), SaveOutcome::Inserted(1));
}

#[test]
fn catalog_save_ambiguous() {
    let tns = load("tns_2019abc.json");
    let mut catalog = Catalog::from_records(vec![offset(&tns, -4.0), offset(&tns, 4.0)], 10.0);
    let err = catalog.save(tns, &mut Diagnostics::silent()).unwrap_err();
    assert!(matches!(err, ReconError::AmbiguousMatch { count: 2 }));
}

// -------------------------------------------------------------------------
// Reconcile
// -------------------------------------------------------------------------

#[test]
fn private_near_duplicate_replaces_primary() {
    let primary = load_all("cone_catalog.json");
    let mut staged = offset(&primary[2], 1.0);
    staged.name = Some(Name::new("2024priv"));

    let out = reconcile(&primary, &[staged], 2.0, &mut Diagnostics::silent()).unwrap();
    assert_eq!(out.len(), 3);
    assert_eq!(out[2].default_name(), Some("2024priv"));
    assert_eq!(out[2].coordinate.as_ref().map(Vec::len), Some(2));
    assert_eq!(out[0], primary[0]);
}

#[test]
fn private_without_match_is_appended() {
    let primary = load_all("cone_catalog.json");
    let staged = offset(&primary[0], 3600.0);
    let out = reconcile(&primary, &[staged.clone()], 5.0, &mut Diagnostics::silent()).unwrap();
    assert_eq!(out.len(), 4);
    assert_eq!(out[3], staged);
}

// -------------------------------------------------------------------------
// Properties
// -------------------------------------------------------------------------

fn entry() -> impl Strategy<Value = Value> {
    (0u8..4, prop::sample::select(vec!["a", "b", "c"]), prop::bool::ANY).prop_map(
        |(v, r, computed)| {
            json!({
                "value": f64::from(v) * 0.01,
                "reference": [r],
                "computed": computed,
                "distance_type": "redshift"
            })
        },
    )
}

fn classification() -> impl Strategy<Value = Classification> {
    (
        prop::sample::select(vec!["TDE", "SN Ia", "SN II", "AGN"]),
        0u8..=10,
        prop::sample::select(vec!["x", "y"]),
    )
        .prop_map(|(class, conf, r)| Classification::new(class, f64::from(conf) / 10.0, r))
}

proptest! {
    #[test]
    fn tabular_merge_is_bounded_and_faithful(
        l in prop::collection::vec(entry(), 0..6),
        r in prop::collection::vec(entry(), 0..6),
    ) {
        let out = merge_values(&l, &r);
        prop_assert!(out.len() <= l.len() + r.len());
        for item in &out {
            prop_assert!(l.iter().chain(&r).any(|x| structural_eq(x, item)));
        }
        for (i, x) in out.iter().enumerate() {
            for y in &out[i + 1..] {
                prop_assert!(!structural_eq(x, y));
            }
        }
    }

    #[test]
    fn merged_classification_has_one_maximal_default(
        a in prop::collection::vec(classification(), 0..5),
        b in prop::collection::vec(classification(), 1..5),
    ) {
        let out = merge_classification(&a, &b);
        let defaults: Vec<&Classification> = out.iter().filter(|c| c.is_default()).collect();
        prop_assert_eq!(defaults.len(), 1);
        let max = out.iter().map(|c| c.confidence).fold(f64::NEG_INFINITY, f64::max);
        prop_assert_eq!(defaults[0].confidence, max);
    }

    #[test]
    fn spatial_match_is_symmetric(
        ra in 0.0f64..360.0,
        dec in -89.0f64..89.0,
        d_ra in -0.01f64..0.01,
        d_dec in -0.01f64..0.01,
        tol in 0.1f64..60.0,
    ) {
        let a = SkyPosition::new(ra, dec).unwrap();
        let b = SkyPosition::new(ra + d_ra, dec + d_dec).unwrap();
        prop_assert_eq!(
            spatial_match(&a, &b, tol).unwrap(),
            spatial_match(&b, &a, tol).unwrap()
        );
        prop_assert!(spatial_match(&a, &a, 0.0).unwrap());
    }
}
