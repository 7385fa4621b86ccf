// src/extractors/record.rs
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Placeholder used when an identity field cannot be located on the page.
pub const PLACEHOLDER: &str = "-";

/// Identity of one company page.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct EntityInfo {
    pub name: String,
    pub bse_tag: String,
    pub nse_tag: String,
    pub market_cap: String,
}

impl EntityInfo {
    /// Column headers of the identity fields, in output order.
    pub const COLUMNS: [&'static str; 4] = ["Company Name", "BSE Tag", "NSE Tag", "Market Cap"];

    /// `(column, value)` pairs for all identity fields.
    pub fn columns(&self) -> [(&'static str, &str); 4] {
        [
            (Self::COLUMNS[0], self.name.as_str()),
            (Self::COLUMNS[1], self.bse_tag.as_str()),
            (Self::COLUMNS[2], self.nse_tag.as_str()),
            (Self::COLUMNS[3], self.market_cap.as_str()),
        ]
    }
}

/// Composite `"<metric>_<period>"` fields extracted for one entity and sheet.
///
/// Keeps insertion order; inserting an existing key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldRecord {
    fields: Vec<(String, String)>,
}

impl FieldRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: String, value: String) {
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((key, value)),
        }
    }

    #[cfg(test)]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = FieldRecord::new();
        for (k, v) in iter {
            record.insert(k.into(), v.into());
        }
        record
    }
}

// Serialized as a JSON object in insertion order
impl Serialize for FieldRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// A [`FieldRecord`] together with the entity it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct EntityRecord {
    pub entity: EntityInfo,
    pub fields: FieldRecord,
}
