// End-to-end tests for the skyledger binary: exit codes and stdout shape.
//
// Run with: cargo test -p skyledger-cli --test cli_tests -- --nocapture

use std::path::PathBuf;
use std::process::{Command, Output};

use tempfile::TempDir;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn fixture(name: &str) -> String {
    fixtures_dir().join(name).to_string_lossy().into_owned()
}

/// Binary pinned to a throwaway config so the user's settings never leak in.
fn skyledger(config_dir: &TempDir) -> Command {
    let config = config_dir.path().join("config.toml");
    std::fs::write(&config, "[matching]\nmerge_tolerance_arcsec = 10.0\ncone_radius_arcsec = 5.0\n")
        .unwrap();
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_skyledger"));
    cmd.arg("--config").arg(config);
    cmd.env_remove("SKYLEDGER_LOG");
    cmd
}

fn stdout_json(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(stdout.trim()).unwrap_or_else(|e| {
        panic!("stdout must be JSON: {e}\nstdout:\n{stdout}")
    })
}

fn assert_exit(output: &Output, code: i32) {
    assert_eq!(
        output.status.code(),
        Some(code),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

// ===========================================================================
// merge / match / show
// ===========================================================================

#[test]
fn merge_prefers_prefixed_name() {
    let tmp = TempDir::new().unwrap();
    let output = skyledger(&tmp)
        .args(["merge", &fixture("tns_2019abc.json"), &fixture("survey_at2019abc.json")])
        .output()
        .unwrap();
    assert_exit(&output, 0);

    let merged = stdout_json(&output);
    assert_eq!(merged["name"]["default_name"], "AT2019abc");
    assert_eq!(merged["name"]["alias"].as_array().unwrap().len(), 2);
    assert_eq!(merged["coordinate"].as_array().unwrap().len(), 1);
}

#[test]
fn merge_writes_output_file() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("merged.json");
    let output = skyledger(&tmp)
        .args(["merge", &fixture("tns_2019abc.json"), &fixture("survey_at2019abc.json"), "-o"])
        .arg(&out)
        .output()
        .unwrap();
    assert_exit(&output, 0);
    assert!(output.stdout.is_empty());

    let text = std::fs::read_to_string(&out).unwrap();
    let merged: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(merged["schema_version"]["value"], 1);
}

#[test]
fn match_same_position_exits_zero() {
    let tmp = TempDir::new().unwrap();
    let output = skyledger(&tmp)
        .args([
            "match",
            &fixture("tns_2019abc.json"),
            &fixture("survey_at2019abc.json"),
            "--json",
        ])
        .output()
        .unwrap();
    assert_exit(&output, 0);

    let report = stdout_json(&output);
    assert_eq!(report["matched"], true);
    assert_eq!(report["tolerance_arcsec"], 10.0);
    assert!(report["separation_arcsec"].as_f64().unwrap() < 1e-6);
}

#[test]
fn show_prints_field_as_text() {
    let tmp = TempDir::new().unwrap();
    let output = skyledger(&tmp)
        .args(["show", &fixture("tns_2019abc.json"), "--path", "name/default_name"])
        .output()
        .unwrap();
    assert_exit(&output, 0);
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "2019abc");
}

#[test]
fn show_missing_path_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let output = skyledger(&tmp)
        .args(["show", &fixture("tns_2019abc.json"), "--path", "host/0/name"])
        .output()
        .unwrap();
    assert_exit(&output, 1);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error: no field at 'host/0/name'"), "stderr: {stderr}");
    assert!(stderr.contains("hint:"), "stderr: {stderr}");
}

#[test]
fn unreadable_file_exits_with_io_code() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("nope.json");
    let output = skyledger(&tmp)
        .arg("show")
        .arg(&missing)
        .output()
        .unwrap();
    assert_exit(&output, 10);
}

#[test]
fn bad_config_exits_with_config_code() {
    let tmp = TempDir::new().unwrap();
    let config = tmp.path().join("broken.toml");
    std::fs::write(&config, "[matching]\nmerge_tolerance_arcsec = -1.0\n").unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_skyledger"))
        .arg("--config")
        .arg(&config)
        .args(["show", &fixture("tns_2019abc.json")])
        .output()
        .unwrap();
    assert_exit(&output, 12);
}

// ===========================================================================
// query / ingest / phot
// ===========================================================================

#[test]
fn query_by_redshift_selects_one_record() {
    let tmp = TempDir::new().unwrap();
    let output = skyledger(&tmp)
        .args([
            "query",
            &fixture("tns_2019abc.json"),
            &fixture("survey_at2019abc.json"),
            "--name",
            "2019abc",
            "--minz",
            "0.01",
            "--meta",
        ])
        .output()
        .unwrap();
    assert_exit(&output, 0);

    let records = stdout_json(&output);
    let records = records.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["name"]["default_name"], "AT2019abc");
    assert!(records[0].get("photometry").is_none());
}

#[test]
fn query_cone_accepts_sexagesimal_center() {
    let tmp = TempDir::new().unwrap();
    let output = skyledger(&tmp)
        .args([
            "query",
            &fixture("tns_2019abc.json"),
            "--ra",
            "14:20:59.6",
            "--dec",
            "+37:10:04.2",
            "--radius",
            "1",
        ])
        .output()
        .unwrap();
    assert_exit(&output, 0);
    assert_eq!(stdout_json(&output).as_array().unwrap().len(), 1);
}

#[test]
fn ingest_inserts_then_merges() {
    let tmp = TempDir::new().unwrap();
    let store = tmp.path().join("catalog.json");

    let first = skyledger(&tmp)
        .arg("ingest")
        .arg("--store")
        .arg(&store)
        .args([&fixture("tns_2019abc.json"), "--json"])
        .output()
        .unwrap();
    assert_exit(&first, 0);
    let summary = stdout_json(&first);
    assert_eq!(summary["inserted"], 1);
    assert_eq!(summary["merged"], 0);

    let second = skyledger(&tmp)
        .arg("ingest")
        .arg("--store")
        .arg(&store)
        .args([&fixture("survey_at2019abc.json"), "--json"])
        .output()
        .unwrap();
    assert_exit(&second, 0);
    let summary = stdout_json(&second);
    assert_eq!(summary["merged"], 1);
    assert_eq!(summary["total"], 1);

    let stored: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&store).unwrap()).unwrap();
    assert_eq!(stored[0]["name"]["default_name"], "AT2019abc");
}

#[test]
fn phot_without_telescope_exits_with_area_code() {
    let tmp = TempDir::new().unwrap();
    let output = skyledger(&tmp)
        .args(["phot", &fixture("xray_no_telescope.json"), "--flux-unit", "erg/s/cm2"])
        .output()
        .unwrap();
    assert_exit(&output, 22);
    assert!(output.stdout.is_empty());
}

#[test]
fn phot_csv_has_header_and_rows() {
    let tmp = TempDir::new().unwrap();
    let output = skyledger(&tmp)
        .args(["phot", &fixture("survey_at2019abc.json"), "--out", "csv", "-q"])
        .output()
        .unwrap();
    assert_exit(&output, 0);

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 4, "stdout:\n{stdout}");
    assert!(lines[0].contains("converted_flux"));
    assert!(lines[0].contains("name"));
}
