// Lenient numeric decoding: survey exports sometimes quote numbers.

use serde::{de, Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumOrText {
    Num(f64),
    Text(String),
}

pub(crate) fn f64_lenient<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    match NumOrText::deserialize(deserializer)? {
        NumOrText::Num(n) => Ok(n),
        NumOrText::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| de::Error::custom(format!("expected a number, got '{s}'"))),
    }
}

pub(crate) fn i64_lenient<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let v = f64_lenient(deserializer)?;
    if v.fract() != 0.0 {
        return Err(de::Error::custom(format!("expected an integer, got {v}")));
    }
    Ok(v as i64)
}
