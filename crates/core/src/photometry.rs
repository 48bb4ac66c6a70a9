//! Photometry blocks.
//!
//! A block is column-oriented: each named column is either a scalar that
//! applies to every measurement or an array with one value per measurement.
//! Columns are kept as JSON values so that merges can outer-join blocks with
//! differing column sets; typed accessors cover the columns the pipeline
//! reads.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RecordError;
use crate::refs::References;

/// One flattened measurement: column name → value.
pub type Row = BTreeMap<String, Value>;

/// Which wavelength regime a block was observed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObsType {
    Radio,
    Uvoir,
    Xray,
}

impl ObsType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Radio => "radio",
            Self::Uvoir => "uvoir",
            Self::Xray => "xray",
        }
    }
}

impl fmt::Display for ObsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObsType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "radio" => Ok(Self::Radio),
            "uvoir" => Ok(Self::Uvoir),
            "xray" => Ok(Self::Xray),
            other => Err(other.to_string()),
        }
    }
}

/// Column family holding the flux: `raw`/`raw_err`/`raw_units` or the
/// `value` equivalents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FluxSource {
    #[default]
    Raw,
    Value,
}

impl FluxSource {
    pub fn column(&self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Value => "value",
        }
    }

    pub fn err_column(&self) -> &'static str {
        match self {
            Self::Raw => "raw_err",
            Self::Value => "value_err",
        }
    }

    pub fn units_column(&self) -> &'static str {
        match self {
            Self::Raw => "raw_units",
            Self::Value => "value_units",
        }
    }

    pub fn other(&self) -> Self {
        match self {
            Self::Raw => Self::Value,
            Self::Value => Self::Raw,
        }
    }
}

/// Identity of a block for merging: same source, instrument and regime.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlockKey {
    pub reference: References,
    pub telescope: Option<String>,
    pub obs_type: Option<String>,
}

const REQUIRED: &[&str] = &["reference", "obs_type", "filter_key", "date", "date_format"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, Value>", into = "BTreeMap<String, Value>")]
pub struct PhotometryBlock {
    columns: BTreeMap<String, Value>,
}

impl TryFrom<BTreeMap<String, Value>> for PhotometryBlock {
    type Error = RecordError;

    fn try_from(columns: BTreeMap<String, Value>) -> Result<Self, Self::Error> {
        for column in REQUIRED {
            if !columns.contains_key(*column) {
                return Err(RecordError::MissingColumn {
                    column: column.to_string(),
                });
            }
        }
        let has_flux = [FluxSource::Raw, FluxSource::Value]
            .iter()
            .any(|s| columns.contains_key(s.column()) && columns.contains_key(s.units_column()));
        if !has_flux {
            return Err(RecordError::MissingColumn {
                column: "raw".into(),
            });
        }
        match &columns["reference"] {
            Value::String(_) => {}
            Value::Array(items) if items.iter().all(Value::is_string) => {}
            other => {
                return Err(RecordError::BadColumn {
                    column: "reference".into(),
                    detail: format!("expected string or list of strings, got {other}"),
                })
            }
        }
        Ok(Self { columns })
    }
}

impl From<PhotometryBlock> for BTreeMap<String, Value> {
    fn from(block: PhotometryBlock) -> Self {
        block.columns
    }
}

impl PhotometryBlock {
    pub fn columns(&self) -> &BTreeMap<String, Value> {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Value> {
        self.columns.get(name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn reference(&self) -> References {
        match self.columns.get("reference") {
            Some(Value::String(s)) => References::single(s.clone()),
            Some(Value::Array(items)) => References::new(
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect(),
            ),
            _ => References::default(),
        }
    }

    /// Block-wide telescope name: a scalar, or an array holding one value.
    pub fn telescope(&self) -> Option<&str> {
        self.uniform_str("telescope")
    }

    pub fn obs_type(&self) -> Option<&str> {
        self.uniform_str("obs_type")
    }

    fn uniform_str(&self, column: &str) -> Option<&str> {
        match self.columns.get(column)? {
            Value::String(s) => Some(s.as_str()),
            Value::Array(items) => {
                let first = items.first()?.as_str()?;
                items
                    .iter()
                    .all(|v| v.as_str() == Some(first))
                    .then_some(first)
            }
            _ => None,
        }
    }

    pub fn key(&self) -> BlockKey {
        BlockKey {
            reference: self.reference(),
            telescope: self.telescope().map(str::to_string),
            obs_type: self.obs_type().map(str::to_string),
        }
    }

    /// Number of measurements: the longest array column, ignoring `reference`.
    pub fn len(&self) -> usize {
        self.columns
            .iter()
            .filter(|(name, _)| name.as_str() != "reference")
            .filter_map(|(_, v)| v.as_array().map(Vec::len))
            .max()
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Broadcast scalar columns and flatten into one row per measurement.
    ///
    /// Arrays whose length differs from the block length are treated as
    /// scalars, i.e. every row receives the whole array.
    pub fn rows(&self) -> Vec<Row> {
        let n = self.len();
        (0..n)
            .map(|i| {
                self.columns
                    .iter()
                    .map(|(name, value)| {
                        let cell = match value {
                            Value::Array(items) if items.len() == n && name != "reference" => {
                                items[i].clone()
                            }
                            other => other.clone(),
                        };
                        (name.clone(), cell)
                    })
                    .collect()
            })
            .collect()
    }

    /// Rebuild a block from rows. Every column becomes an array; a row that
    /// lacks a column contributes `null`. `reference` is kept from the caller.
    pub fn from_rows(reference: Value, rows: &[Row]) -> Self {
        let mut names: Vec<&String> = rows.iter().flat_map(|r| r.keys()).collect();
        names.sort();
        names.dedup();

        let mut columns = BTreeMap::new();
        for name in names {
            if name == "reference" {
                continue;
            }
            let values = rows
                .iter()
                .map(|r| r.get(name).cloned().unwrap_or(Value::Null))
                .collect();
            columns.insert(name.clone(), Value::Array(values));
        }
        columns.insert("reference".to_string(), reference);
        Self { columns }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn block(v: Value) -> PhotometryBlock {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn broadcast_scalars() {
        let b = block(json!({
            "reference": ["2020A"],
            "raw": [18.1, 18.4, 18.9],
            "raw_err": [0.1, 0.1, 0.2],
            "raw_units": "mag(AB)",
            "date": [59000.1, 59001.2, 59003.0],
            "date_format": "mjd",
            "filter_key": ["g", "r", "g"],
            "obs_type": "uvoir",
            "upperlimit": false
        }));
        assert_eq!(b.len(), 3);
        let rows = b.rows();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1]["raw"], json!(18.4));
        assert_eq!(rows[2]["raw_units"], json!("mag(AB)"));
        assert_eq!(rows[0]["reference"], json!(["2020A"]));
        assert_eq!(rows[2]["upperlimit"], json!(false));
    }

    #[test]
    fn missing_required_column_rejected() {
        let r: Result<PhotometryBlock, _> = serde_json::from_value(json!({
            "reference": "2020A",
            "raw": [1.0],
            "raw_units": "mJy",
            "date": [1.0],
            "filter_key": ["g"],
            "obs_type": "uvoir"
        }));
        assert!(r.is_err());
    }

    #[test]
    fn from_rows_fills_nulls() {
        let mut a = Row::new();
        a.insert("raw".into(), json!(1.0));
        let mut b = Row::new();
        b.insert("raw".into(), json!(2.0));
        b.insert("telescope_mode".into(), json!("PC"));
        let blk = PhotometryBlock::from_rows(json!("2020A"), &[a, b]);
        assert_eq!(blk.column("telescope_mode"), Some(&json!([null, "PC"])));
        assert_eq!(blk.reference().as_slice(), ["2020A"]);
    }

    #[test]
    fn uniform_array_is_block_wide() {
        let b = block(json!({
            "reference": "2020A", "telescope": ["ZTF", "ZTF"], "obs_type": ["uvoir", "xray"],
            "raw": [1.0, 2.0], "raw_units": "mJy", "date": [1.0, 2.0],
            "date_format": "mjd", "filter_key": ["g", "r"]
        }));
        assert_eq!(b.telescope(), Some("ZTF"));
        assert_eq!(b.obs_type(), None);
    }

    #[test]
    fn obs_type_parse() {
        assert_eq!("xray".parse::<ObsType>(), Ok(ObsType::Xray));
        assert!("gamma".parse::<ObsType>().is_err());
    }
}
