use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::Value;
use skyledger_core::Row;

/// Columns kept when raw columns are dropped. `telescope` is kept as well
/// when any row has it.
pub const OUTPUT_COLUMNS: &[&str] = &[
    "name",
    "converted_flux",
    "converted_flux_err",
    "converted_date",
    "converted_wave",
    "converted_freq",
    "converted_flux_unit",
    "converted_date_unit",
    "converted_wave_unit",
    "converted_freq_unit",
    "filter_name",
    "obs_type",
    "upperlimit",
    "reference",
    "human_readable_refs",
];

/// Normalized photometry: one row per measurement, columns as JSON values.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PhotometryTable {
    rows: Vec<Row>,
}

impl PhotometryTable {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Every column name present in any row, sorted.
    pub fn columns(&self) -> Vec<&str> {
        let names: BTreeSet<&str> = self
            .rows
            .iter()
            .flat_map(|r| r.keys().map(String::as_str))
            .collect();
        names.into_iter().collect()
    }

    /// One column as floats; non-numeric or absent cells are `None`.
    pub fn column_f64(&self, name: &str) -> Vec<Option<f64>> {
        self.rows
            .iter()
            .map(|r| r.get(name).and_then(Value::as_f64))
            .collect()
    }

    pub fn extend(&mut self, other: PhotometryTable) {
        self.rows.extend(other.rows);
    }

    /// Tag every row with a column of the same value.
    pub fn tag(&mut self, column: &str, value: Value) {
        for row in &mut self.rows {
            row.insert(column.to_string(), value.clone());
        }
    }

    /// Drop every column outside [`OUTPUT_COLUMNS`] (and `telescope`).
    pub fn project(&mut self) {
        for row in &mut self.rows {
            row.retain(|k, _| k == "telescope" || OUTPUT_COLUMNS.contains(&k.as_str()));
        }
    }
}
