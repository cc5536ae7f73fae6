//! Entity trait shared by every reference-data type

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::Uuid;

/// A value that must be unique among entities of one type.
///
/// `constraint` is also the name of the matching database index, which lets
/// a storage-level violation be traced back to the business rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueKey {
    pub constraint: &'static str,
    pub value: String,
}

impl UniqueKey {
    pub fn new(constraint: &'static str, value: impl Into<String>) -> Self {
        Self {
            constraint,
            value: value.into(),
        }
    }
}

/// A reference from one entity to another, enforced like a foreign key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRef {
    pub constraint: &'static str,
    pub entity_type: &'static str,
    pub id: Uuid,
}

impl EntityRef {
    pub fn new(constraint: &'static str, entity_type: &'static str, id: Uuid) -> Self {
        Self {
            constraint,
            entity_type,
            id,
        }
    }
}

/// Base trait for reference entities (exporters, importers, materials, ...).
///
/// Entities are stored as JSON documents. Searchable fields are addressed by
/// their serialized (snake_case) key.
pub trait Entity: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// Storage discriminator, e.g. "delivery_place"
    fn entity_type() -> &'static str;

    /// Name used in caller-facing messages, e.g. "Delivery place"
    fn display_name() -> &'static str;

    /// Get the unique identifier for this entity instance
    fn id(&self) -> Uuid;

    /// Values that no other entity of the same type may share
    fn unique_keys(&self) -> Vec<UniqueKey> {
        Vec::new()
    }

    /// Other entities this one points at; they cannot be deleted while it exists
    fn references(&self) -> Vec<EntityRef> {
        Vec::new()
    }

    /// Serialized value of a top-level field, as text
    fn field_value(&self, field: &str) -> Option<String> {
        match serde_json::to_value(self).ok()?.get(field)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Clone, Serialize, Deserialize)]
    struct Sample {
        id: Uuid,
        code: String,
        lead_time: i32,
        note: Option<String>,
    }

    impl Entity for Sample {
        fn entity_type() -> &'static str {
            "sample"
        }

        fn display_name() -> &'static str {
            "Sample"
        }

        fn id(&self) -> Uuid {
            self.id
        }
    }

    #[test]
    fn test_field_value_reads_serialized_fields() {
        let sample = Sample {
            id: Uuid::nil(),
            code: "ABC".to_string(),
            lead_time: 12,
            note: None,
        };
        assert_eq!(sample.field_value("code").as_deref(), Some("ABC"));
        assert_eq!(sample.field_value("lead_time").as_deref(), Some("12"));
        assert_eq!(sample.field_value("note"), None);
        assert_eq!(sample.field_value("missing"), None);
        assert!(sample.unique_keys().is_empty());
        assert!(sample.references().is_empty());
    }
}
