//! Union-deduplicate lists of flat entries.
//!
//! Entries are compared structurally: objects key by key, arrays element by
//! element, numbers by value regardless of integer/float encoding. A
//! canonical hash buckets candidates so deduplication stays linear for
//! realistic section sizes.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{ReconError, Result};

/// Concatenate, drop exact duplicates (first occurrence kept), and remove
/// fields that are null in an entry.
pub fn merge_values(left: &[Value], right: &[Value]) -> Vec<Value> {
    let mut out: Vec<Value> = Vec::with_capacity(left.len() + right.len());
    let mut buckets: HashMap<u64, Vec<usize>> = HashMap::new();

    for entry in left.iter().chain(right) {
        let entry = strip_nulls(entry);
        let h = structural_hash(&entry);
        let seen = buckets.entry(h).or_default();
        if seen.iter().any(|&i| structural_eq(&out[i], &entry)) {
            continue;
        }
        seen.push(out.len());
        out.push(entry);
    }
    out
}

/// Typed wrapper over [`merge_values`].
pub fn merge_entries<T>(left: &[T], right: &[T], section: &'static str) -> Result<Vec<T>>
where
    T: Serialize + DeserializeOwned,
{
    let encode = |items: &[T]| -> Result<Vec<Value>> {
        items
            .iter()
            .map(|item| {
                serde_json::to_value(item).map_err(|e| ReconError::Malformed {
                    section,
                    detail: e.to_string(),
                })
            })
            .collect()
    };
    let merged = merge_values(&encode(left)?, &encode(right)?);
    merged
        .into_iter()
        .map(|v| {
            serde_json::from_value(v).map_err(|e| ReconError::Malformed {
                section,
                detail: e.to_string(),
            })
        })
        .collect()
}

fn strip_nulls(entry: &Value) -> Value {
    match entry {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Deep equality with numeric comparison by value.
pub fn structural_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| structural_eq(x, y))
        }
        (Value::Object(xm), Value::Object(ym)) => {
            xm.len() == ym.len()
                && xm
                    .iter()
                    .all(|(k, x)| ym.get(k).is_some_and(|y| structural_eq(x, y)))
        }
        _ => a == b,
    }
}

/// Hash consistent with [`structural_eq`].
pub fn structural_hash(v: &Value) -> u64 {
    let mut hasher = DefaultHasher::new();
    hash_into(v, &mut hasher);
    hasher.finish()
}

fn hash_into<H: Hasher>(v: &Value, h: &mut H) {
    match v {
        Value::Null => 0u8.hash(h),
        Value::Bool(b) => {
            1u8.hash(h);
            b.hash(h);
        }
        Value::Number(n) => {
            2u8.hash(h);
            // -0.0 and 0.0 compare equal
            let f = n.as_f64().unwrap_or(0.0);
            let f = if f == 0.0 { 0.0 } else { f };
            f.to_bits().hash(h);
        }
        Value::String(s) => {
            3u8.hash(h);
            s.hash(h);
        }
        Value::Array(items) => {
            4u8.hash(h);
            items.len().hash(h);
            for item in items {
                hash_into(item, h);
            }
        }
        Value::Object(map) => {
            5u8.hash(h);
            map.len().hash(h);
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            for k in keys {
                k.hash(h);
                hash_into(&map[k.as_str()], h);
            }
        }
    }
}
