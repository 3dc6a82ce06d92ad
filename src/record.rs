//! Record types flowing through the engine.
//!
//! A [`RawRecord`] is a field map as delivered by the input adapter. The
//! normalizer turns it into a [`NormalizedRecord`], and the merge engine
//! emits one [`CanonicalRecord`] per identity.
//!
//! Absent and empty values are the same "missing" state everywhere. Sentinel
//! strings produced by normalization (`"Nan"`, `"Unknown"`) are ordinary
//! present values.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::FieldNames;
use crate::error::AdapterError;
use crate::identity::IdentityKey;

/// Well-known field names.
pub mod fields {
    /// Given name.
    pub const FIRSTNAME: &str = "firstname";
    /// Family name.
    pub const LASTNAME: &str = "lastname";
    /// Email as entered, possibly decorated (`Name <addr>`).
    pub const RAW_EMAIL: &str = "raw_email";
    /// Added by the email extractor.
    pub const EMAIL: &str = "email";
    /// Free-text place; replaced by the resolved country.
    pub const COUNTRY: &str = "country";
    /// Added by the location resolver.
    pub const CITY: &str = "city";
    /// Raw phone; replaced by the formatted number.
    pub const PHONE: &str = "phone";
    /// Industry; holds the serialized history on canonical records.
    pub const INDUSTRY: &str = "industry";
}

/// Nested member that API search results keep their attributes under.
const PROPERTIES_KEY: &str = "properties";

/// A mapping of field names to optional string values.
///
/// # Examples
///
/// ```
/// use contactql::RawRecord;
///
/// let record = RawRecord::new()
///     .with("firstname", "Ann")
///     .with("lastname", "")
///     .with_absent("phone");
///
/// assert_eq!(record.get("firstname"), Some("Ann"));
/// assert_eq!(record.get("lastname"), None);
/// assert!(record.is_missing("phone"));
/// assert!(record.is_missing("not-a-field"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord {
    fields: BTreeMap<String, Option<String>>,
}

impl RawRecord {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter for a present value.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(field, Some(value.into()));
        self
    }

    /// Builder-style setter for an explicitly absent value.
    #[must_use]
    pub fn with_absent(mut self, field: impl Into<String>) -> Self {
        self.set(field, None);
        self
    }

    /// Sets `field`, replacing any previous value.
    pub fn set(&mut self, field: impl Into<String>, value: Option<String>) {
        self.fields.insert(field.into(), value);
    }

    /// Returns the value of `field` if it is present and non-blank.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .get(field)
            .and_then(Option::as_deref)
            .filter(|v| !v.trim().is_empty())
    }

    /// Returns true if `field` is absent or blank.
    #[must_use]
    pub fn is_missing(&self, field: &str) -> bool {
        self.get(field).is_none()
    }

    /// Iterates over `(field, value)` pairs in sorted field order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    /// Returns the number of fields, missing ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the record has no fields at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Builds a record from a JSON object.
    ///
    /// Members of a nested `properties` object are hoisted to top-level fields
    /// (nested values win over top-level ones with the same name). `null`
    /// becomes absent; numbers and booleans are stringified; other nested
    /// values are kept as their JSON text.
    ///
    /// # Errors
    ///
    /// Returns `AdapterError::Decode` if `value` is not a JSON object.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, AdapterError> {
        let serde_json::Value::Object(map) = value else {
            return Err(AdapterError::Decode {
                message: format!("expected a JSON object, got {}", json_kind(value)),
            });
        };

        let mut record = Self::new();
        let mut nested = None;
        for (key, member) in map {
            match (key.as_str(), member) {
                (PROPERTIES_KEY, serde_json::Value::Object(props)) => nested = Some(props),
                _ => record.set(key.clone(), json_scalar(member)),
            }
        }

        if let Some(props) = nested {
            for (key, member) in props {
                record.set(key.clone(), json_scalar(member));
            }
        }

        Ok(record)
    }
}

impl<K, V> FromIterator<(K, V)> for RawRecord
where
    K: Into<String>,
    V: Into<Option<String>>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

fn json_scalar(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// A record after location, phone and email normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    /// Position of the record in the input batch.
    pub position: usize,

    /// Parsed creation instant, used for recency ordering.
    pub created_at: DateTime<Utc>,

    /// Normalized field values.
    pub fields: RawRecord,
}

impl NormalizedRecord {
    /// Returns the value of `field` if it is present and non-blank.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field)
    }
}

/// The merged, surviving record for one identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    /// Identity shared by every merged source record.
    pub identity: IdentityKey,

    /// Backfilled fields, with `industry` holding the serialized history.
    pub fields: RawRecord,

    /// Distinct industry values in the configured order.
    pub industry_history: Vec<String>,

    /// Creation instant of the representative (most recent) record.
    pub created_at: DateTime<Utc>,

    /// Input position of the representative record.
    pub representative_position: usize,

    /// Number of input records merged into this one, representative included.
    pub source_records: usize,

    /// Number of fields filled in from older records.
    pub backfilled_fields: usize,
}

impl CanonicalRecord {
    /// Returns the value of `field` if it is present and non-blank.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field)
    }

    /// Returns the serialized industry history (`;A;B` or a bare value).
    #[must_use]
    pub fn industry(&self) -> Option<&str> {
        self.fields.get(fields::INDUSTRY)
    }

    /// Property set expected by the downstream system of record.
    ///
    /// Missing values map to empty strings; rejecting them is the output
    /// adapter's call.
    #[must_use]
    pub fn upload_properties(&self, names: &FieldNames) -> BTreeMap<&'static str, String> {
        let value = |field: &str| self.fields.get(field).unwrap_or_default().to_string();

        BTreeMap::from([
            ("firstname", value(fields::FIRSTNAME)),
            ("lastname", value(fields::LASTNAME)),
            ("email", value(fields::EMAIL)),
            ("country", value(fields::COUNTRY)),
            ("city", value(fields::CITY)),
            ("phone", value(fields::PHONE)),
            ("original_create_date", value(names.created_at.as_str())),
            ("original_industry", value(fields::INDUSTRY)),
            ("temporary_id", value(names.identifier.as_str())),
        ])
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_blank_values_are_missing() {
        let record = RawRecord::new().with("a", "  ").with("b", "x").with_absent("c");
        assert!(record.is_missing("a"));
        assert!(!record.is_missing("b"));
        assert!(record.is_missing("c"));
        assert_eq!(record.len(), 3);
    }

    #[test]
    fn test_sentinel_strings_are_present() {
        let record = RawRecord::new().with("country", "Nan");
        assert_eq!(record.get("country"), Some("Nan"));
    }

    #[test]
    fn test_from_iter_accepts_optional_values() {
        let record: RawRecord = vec![
            ("firstname", Some("Ann".to_string())),
            ("lastname", None),
        ]
        .into_iter()
        .collect();
        assert_eq!(record.get("firstname"), Some("Ann"));
        assert!(record.is_missing("lastname"));
    }

    #[test]
    fn test_from_json_hoists_properties() {
        let value = json!({
            "id": "101",
            "createdAt": "2024-01-01T00:00:00Z",
            "archived": false,
            "properties": {
                "firstname": "Ann",
                "lastname": null,
                "hs_object_id": 101
            }
        });
        let record = RawRecord::from_json(&value).unwrap();
        assert_eq!(record.get("id"), Some("101"));
        assert_eq!(record.get("firstname"), Some("Ann"));
        assert_eq!(record.get("hs_object_id"), Some("101"));
        assert_eq!(record.get("archived"), Some("false"));
        assert!(record.is_missing("lastname"));
        assert!(record.get("properties").is_none());
    }

    #[test]
    fn test_from_json_nested_wins_on_collision() {
        let value = json!({"country": "top", "properties": {"country": "Dublin"}});
        let record = RawRecord::from_json(&value).unwrap();
        assert_eq!(record.get("country"), Some("Dublin"));
    }

    #[test]
    fn test_from_json_rejects_non_objects() {
        let err = RawRecord::from_json(&json!([1, 2])).unwrap_err();
        assert!(format!("{err}").contains("an array"));
    }

    #[test]
    fn test_upload_properties_maps_names() {
        let record = CanonicalRecord {
            identity: IdentityKey::new("Ann Lee"),
            fields: RawRecord::new()
                .with("firstname", "Ann")
                .with("lastname", "Lee")
                .with("email", "ann_lee@x.com")
                .with("country", "Ireland")
                .with("city", "Dublin")
                .with("phone", "(+353) 8712 3456")
                .with("created_at", "2024-01-01")
                .with("industry", ";Milling;Meat")
                .with("record_id", "42"),
            industry_history: vec!["Milling".to_string(), "Meat".to_string()],
            created_at: Utc::now(),
            representative_position: 0,
            source_records: 2,
            backfilled_fields: 0,
        };

        let props = record.upload_properties(&FieldNames::default());
        assert_eq!(props["original_industry"], ";Milling;Meat");
        assert_eq!(props["original_create_date"], "2024-01-01");
        assert_eq!(props["temporary_id"], "42");
        assert_eq!(props["city"], "Dublin");
        assert_eq!(props.len(), 9);
    }

    #[test]
    fn test_upload_properties_missing_as_empty() {
        let record = CanonicalRecord {
            identity: IdentityKey::new("Jane Doe"),
            fields: RawRecord::new().with("email", "jane_doe@x.com"),
            industry_history: Vec::new(),
            created_at: Utc::now(),
            representative_position: 3,
            source_records: 1,
            backfilled_fields: 0,
        };
        let props = record.upload_properties(&FieldNames::default());
        assert_eq!(props["firstname"], "");
        assert_eq!(props["original_industry"], "");
        assert_eq!(record.industry(), None);
    }
}
