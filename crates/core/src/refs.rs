use serde::{Deserialize, Deserializer, Serialize};

/// Bibliographic references attached to a value.
///
/// Sources disagree on whether a single reference is a bare string or a
/// one-element list; both decode to the same value and always encode as a list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct References(Vec<String>);

impl References {
    pub fn new(refs: Vec<String>) -> Self {
        Self(refs)
    }

    pub fn single(bibcode: impl Into<String>) -> Self {
        Self(vec![bibcode.into()])
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn first(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, bibcode: &str) -> bool {
        self.0.iter().any(|r| r == bibcode)
    }

    /// Concatenate, keeping duplicates (provenance is preserved as given).
    pub fn concat(&self, other: &References) -> References {
        let mut out = self.0.clone();
        out.extend(other.0.iter().cloned());
        References(out)
    }

    /// Union without duplicates, sorted.
    pub fn union_sorted(&self, other: &References) -> References {
        let mut out: Vec<String> = self.0.iter().chain(other.0.iter()).cloned().collect();
        out.sort();
        out.dedup();
        References(out)
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl From<Vec<String>> for References {
    fn from(refs: Vec<String>) -> Self {
        Self(refs)
    }
}

impl From<&str> for References {
    fn from(bibcode: &str) -> Self {
        Self::single(bibcode)
    }
}

impl<'a> IntoIterator for &'a References {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<'de> Deserialize<'de> for References {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum OneOrMany {
            One(String),
            Many(Vec<String>),
        }

        Ok(match OneOrMany::deserialize(deserializer)? {
            OneOrMany::One(s) => References(vec![s]),
            OneOrMany::Many(v) => References(v),
        })
    }
}
