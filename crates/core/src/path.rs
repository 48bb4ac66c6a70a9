//! Slash-delimited lookups such as `name/default_name` or `coordinate/0/ra`.
//!
//! Segments address object keys; a segment that parses as an integer indexes
//! an array, negative values counting from the end.

use serde_json::Value;

use crate::record::Record;

pub fn resolve<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('/')
        .filter(|seg| !seg.is_empty())
        .try_fold(root, |node, seg| step(node, seg))
}

fn step<'a>(node: &'a Value, seg: &str) -> Option<&'a Value> {
    match node {
        Value::Object(map) => map.get(seg),
        Value::Array(items) => {
            let idx: i64 = seg.parse().ok()?;
            let idx = if idx < 0 { items.len() as i64 + idx } else { idx };
            usize::try_from(idx).ok().and_then(|i| items.get(i))
        }
        _ => None,
    }
}

impl Record {
    /// Resolve a slash path against the encoded record.
    pub fn get_path(&self, path: &str) -> Option<Value> {
        resolve(&self.to_value(), path).cloned()
    }
}
