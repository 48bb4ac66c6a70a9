//! Reading and writing record files.
//!
//! A record file holds one JSON record or a JSON array of records. A
//! directory argument expands to every `*.json` file in it, in name order.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::Value;
use skyledger_core::Record;

use crate::exit_codes::{EXIT_IO, EXIT_PARSE};
use crate::CliError;

pub fn load_records(paths: &[PathBuf]) -> Result<Vec<Record>, CliError> {
    let mut out = Vec::new();
    for path in paths {
        if path.is_dir() {
            for file in json_files(path)? {
                out.extend(load_file(&file)?);
            }
        } else {
            out.extend(load_file(path)?);
        }
    }
    Ok(out)
}

/// Load a file that must hold exactly one record.
pub fn load_one(path: &Path) -> Result<Record, CliError> {
    let mut records = load_file(path)?;
    if records.len() != 1 {
        return Err(CliError::args(format!(
            "{}: expected one record, found {}",
            path.display(),
            records.len()
        )));
    }
    Ok(records.remove(0))
}

pub fn load_file(path: &Path) -> Result<Vec<Record>, CliError> {
    let text = fs::read_to_string(path)
        .map_err(|e| CliError::new(EXIT_IO, format!("cannot read {}: {e}", path.display())))?;
    parse_records(&text)
        .map_err(|e| CliError::new(EXIT_PARSE, format!("{}: {e}", path.display())))
}

pub fn parse_records(text: &str) -> Result<Vec<Record>, String> {
    let value: Value = serde_json::from_str(text).map_err(|e| e.to_string())?;
    let items = match value {
        Value::Array(items) => items,
        other => vec![other],
    };
    items
        .into_iter()
        .enumerate()
        .map(|(i, v)| Record::from_value(v).map_err(|e| format!("record {i}: {e}")))
        .collect()
}

fn json_files(dir: &Path) -> Result<Vec<PathBuf>, CliError> {
    let entries = fs::read_dir(dir)
        .map_err(|e| CliError::new(EXIT_IO, format!("cannot list {}: {e}", dir.display())))?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    Ok(files)
}

/// Pretty JSON to `output`, or stdout when `None` or `-`.
pub fn write_json(value: &impl serde::Serialize, output: Option<&Path>) -> Result<(), CliError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::new(EXIT_IO, format!("cannot encode output: {e}")))?;
    write_text(&text, output)
}

pub fn write_text(text: &str, output: Option<&Path>) -> Result<(), CliError> {
    match output {
        Some(path) if path != Path::new("-") => fs::write(path, format!("{text}\n"))
            .map_err(|e| CliError::new(EXIT_IO, format!("cannot write {}: {e}", path.display()))),
        _ => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{text}")
                .map_err(|e| CliError::new(EXIT_IO, format!("cannot write stdout: {e}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_object_or_array() {
        let one = parse_records(r#"{"name": {"default_name": "a", "alias": []}}"#).unwrap();
        assert_eq!(one.len(), 1);
        let two = parse_records(
            r#"[{"name": {"default_name": "a", "alias": []}}, {"name": {"default_name": "b", "alias": []}}]"#,
        )
        .unwrap();
        assert_eq!(two[1].default_name(), Some("b"));
        assert!(parse_records("[1]").unwrap_err().starts_with("record 0"));
    }

    #[test]
    fn directory_is_expanded_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.json"), r#"{"name": {"default_name": "b", "alias": []}}"#).unwrap();
        fs::write(dir.path().join("a.json"), r#"{"name": {"default_name": "a", "alias": []}}"#).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        let records = load_records(&[dir.path().to_path_buf()]).unwrap();
        let names: Vec<_> = records.iter().filter_map(Record::default_name).collect();
        assert_eq!(names, ["a", "b"]);
    }
}
