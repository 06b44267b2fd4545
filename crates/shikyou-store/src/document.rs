use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use shikyou_types::DocumentId;

use crate::error::{StoreError, StoreResult};

/// Collection names shared with every client of the database.
pub mod collections {
    pub const POSTS: &str = "posts";
    pub const COMMENTS: &str = "comments";
    pub const POST_VIEWS: &str = "postViews";
}

/// Top-level fields of a document.
pub type Fields = Map<String, Value>;

/// A document as read back from a collection.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub id: DocumentId,
    pub fields: Fields,
}

impl Document {
    pub fn new(id: DocumentId, fields: Fields) -> Self {
        Self { id, fields }
    }

    /// Deserialize the fields into a typed record.
    ///
    /// The id is not part of the fields; callers attach it themselves.
    pub fn decode<T: DeserializeOwned>(&self) -> StoreResult<T> {
        serde_json::from_value(Value::Object(self.fields.clone())).map_err(|e| {
            StoreError::Malformed(format!("{}: {e}", self.id))
        })
    }

    /// Integer value of a field, if present and integral.
    pub fn get_i64(&self, field: &str) -> Option<i64> {
        self.fields.get(field).and_then(Value::as_i64)
    }
}

/// Serialize a record into document fields.
///
/// Fails if the record does not serialize to a JSON object.
pub fn to_fields<T: Serialize>(record: &T) -> StoreResult<Fields> {
    match serde_json::to_value(record)? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Malformed(format!(
            "expected an object, got {other}"
        ))),
    }
}

/// Single exact-match condition on a top-level field.
#[derive(Clone, Debug, PartialEq)]
pub struct Filter {
    pub field: String,
    pub value: Value,
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Returns `true` if `fields` holds exactly this value under `field`.
    ///
    /// Comparison is strict: strings are case-sensitive and a missing field
    /// never matches, not even a `null` filter value.
    pub fn matches(&self, fields: &Fields) -> bool {
        fields.get(&self.field) == Some(&self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Rec {
        name: String,
        count: i64,
    }

    fn fields(v: Value) -> Fields {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn to_fields_and_decode() {
        let rec = Rec { name: "a".into(), count: 3 };
        let doc = Document::new(DocumentId::new("d1"), to_fields(&rec).unwrap());
        assert_eq!(doc.decode::<Rec>().unwrap(), rec);
        assert_eq!(doc.get_i64("count"), Some(3));
        assert_eq!(doc.get_i64("name"), None);
    }

    #[test]
    fn to_fields_rejects_non_objects() {
        assert!(matches!(to_fields(&42), Err(StoreError::Malformed(_))));
    }

    #[test]
    fn decode_failure_names_the_document() {
        let doc = Document::new(DocumentId::new("broken"), fields(json!({ "name": 1 })));
        let err = doc.decode::<Rec>().unwrap_err();
        assert!(err.to_string().contains("broken"));
    }

    #[test]
    fn filter_is_exact_and_case_sensitive() {
        let f = Filter::eq("category", "NFT");
        assert!(f.matches(&fields(json!({ "category": "NFT" }))));
        assert!(!f.matches(&fields(json!({ "category": "nft" }))));
        assert!(!f.matches(&fields(json!({ "other": "NFT" }))));
        assert!(!Filter::eq("x", Value::Null).matches(&fields(json!({}))));
    }
}
