//! Source record model and key derivation
//!
//! A [`Record`] is one row fetched from the source: an open mapping from
//! field name to [`FieldValue`]. Records carry no inherent identity; a sink
//! key is derived at send time via [`Record::key`].

use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Field name conventionally treated as a record's natural key
pub const NATURAL_KEY_FIELD: &str = "id";

/// A single field value of a source record
///
/// Serializes untagged, so a record's payload is plain self-describing JSON
/// (`null`, numbers, strings, arrays, objects). Byte sequences serialize as
/// arrays of numbers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    List(Vec<FieldValue>),
    Map(BTreeMap<String, FieldValue>),
}

impl FieldValue {
    /// Render this value as a sink key, if it is scalar enough to be one
    ///
    /// Null values and collections make no sense as keys and yield `None`.
    pub fn as_key(&self) -> Option<String> {
        match self {
            Self::Text(s) => Some(s.clone()),
            Self::Int(n) => Some(n.to_string()),
            Self::Float(n) => Some(n.to_string()),
            Self::Bool(b) => Some(b.to_string()),
            Self::Null | Self::Bytes(_) | Self::List(_) | Self::Map(_) => None,
        }
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<Vec<u8>> for FieldValue {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

/// One source row: an ordered mapping from field name to value
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, FieldValue>,
}

impl Record {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field value
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Look up a field value
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True if the record has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over fields in name order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.fields.iter()
    }

    /// Derive the sink key for this record
    ///
    /// Uses the natural `id` field when present and scalar; otherwise
    /// synthesizes a fresh random UUID, so repeated calls on a keyless
    /// record yield distinct keys.
    pub fn key(&self) -> String {
        self.get(NATURAL_KEY_FIELD)
            .and_then(FieldValue::as_key)
            .unwrap_or_else(|| Uuid::new_v4().to_string())
    }

    /// Serialize this record to its sink payload (self-describing JSON text)
    pub fn to_payload(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl FromIterator<(String, FieldValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> Record {
        let mut record = Record::new();
        record.insert("id", 42i64);
        record.insert("name", "ada");
        record.insert("active", true);
        record
    }

    #[test]
    fn test_key_from_natural_id() {
        let record = sample_record();
        assert_eq!(record.key(), "42");
    }

    #[test]
    fn test_key_from_text_id() {
        let mut record = Record::new();
        record.insert("id", "user-7");
        assert_eq!(record.key(), "user-7");
    }

    #[test]
    fn test_key_synthesized_when_id_missing() {
        let mut record = Record::new();
        record.insert("name", "ada");

        let key = record.key();
        assert_eq!(Uuid::parse_str(&key).unwrap().get_version_num(), 4);
    }

    #[test]
    fn test_key_synthesized_when_id_is_null() {
        let mut record = Record::new();
        record.insert("id", FieldValue::Null);

        let key = record.key();
        assert!(Uuid::parse_str(&key).is_ok());
    }

    #[test]
    fn test_synthesized_keys_are_distinct() {
        let record = Record::new();
        assert_ne!(record.key(), record.key());
    }

    #[test]
    fn test_payload_is_self_describing_json() {
        let record = sample_record();
        let payload = record.to_payload().unwrap();

        let value: serde_json::Value = serde_json::from_str(&payload).unwrap();
        assert_eq!(value["id"], 42);
        assert_eq!(value["name"], "ada");
        assert_eq!(value["active"], true);
    }

    #[test]
    fn test_payload_null_and_bytes() {
        let mut record = Record::new();
        record.insert("blob", vec![1u8, 2, 255]);
        record.insert("gone", FieldValue::Null);

        let payload = record.to_payload().unwrap();
        let value: serde_json::Value = serde_json::from_str(&payload).unwrap();
        assert_eq!(value["blob"], serde_json::json!([1, 2, 255]));
        assert!(value["gone"].is_null());
    }

    #[test]
    fn test_payload_nested_collections() {
        let mut record = Record::new();
        record.insert(
            "tags",
            FieldValue::List(vec!["a".into(), "b".into()]),
        );

        let payload = record.to_payload().unwrap();
        assert!(payload.contains(r#""tags":["a","b"]"#));
    }

    #[test]
    fn test_field_order_is_stable() {
        let mut record = Record::new();
        record.insert("z", 1i64);
        record.insert("a", 2i64);

        let payload = record.to_payload().unwrap();
        assert!(payload.find(r#""a""#).unwrap() < payload.find(r#""z""#).unwrap());
    }

    #[test]
    fn test_len_and_iteration_follow_the_fields() {
        assert!(Record::new().is_empty());

        let record = sample_record();
        assert_eq!(record.len(), 3);
        assert!(!record.is_empty());

        let names: Vec<&str> = record.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, ["active", "id", "name"]);
    }
}
