//! Firestore REST v1 backend.
//!
//! Each [`DocumentStore`] call maps to exactly one HTTPS request against
//! `{endpoint}/v1/projects/{project}/databases/{database}/documents`,
//! authenticated with the web API key.

pub mod value;

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use shikyou_types::DocumentId;

use crate::config::FirestoreConfig;
use crate::document::{Document, Fields, Filter};
use crate::error::{StoreError, StoreResult};
use crate::traits::DocumentStore;

/// Document resource as returned by the REST API.
#[derive(Debug, Deserialize)]
struct RawDocument {
    name: String,
    #[serde(default)]
    fields: Option<Value>,
}

/// One row of a `runQuery` response stream. Rows carrying only progress
/// information have no `document`.
#[derive(Debug, Deserialize)]
struct QueryRow {
    #[serde(default)]
    document: Option<RawDocument>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: String,
}

/// Firestore-backed document store.
pub struct FirestoreStore {
    config: FirestoreConfig,
    http: reqwest::Client,
}

impl FirestoreStore {
    pub fn new(config: FirestoreConfig) -> StoreResult<Self> {
        config
            .validate()
            .map_err(|e| StoreError::Config(e.to_string()))?;
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &FirestoreConfig {
        &self.config
    }

    fn documents_url(&self) -> String {
        format!(
            "{}/v1/{}",
            self.config.endpoint.trim_end_matches('/'),
            self.config.documents_path()
        )
    }

    fn collection_url(&self, collection: &str) -> StoreResult<String> {
        check_segment("collection", collection)?;
        Ok(format!("{}/{collection}", self.documents_url()))
    }

    fn document_url(&self, collection: &str, id: &DocumentId) -> StoreResult<String> {
        check_segment("document id", id.as_str())?;
        Ok(format!("{}/{id}", self.collection_url(collection)?))
    }

    fn document_name(&self, collection: &str, id: &DocumentId) -> String {
        format!("{}/{collection}/{id}", self.config.documents_path())
    }

    fn key(&self) -> [(&'static str, &str); 1] {
        [("key", self.config.api_key.as_str())]
    }

    fn into_document(raw: RawDocument) -> StoreResult<Document> {
        let id = raw
            .name
            .rsplit('/')
            .next()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| StoreError::Malformed(format!("bad document name: {}", raw.name)))?;
        let fields = value::decode_fields(raw.fields.as_ref())?;
        Ok(Document::new(DocumentId::new(id), fields))
    }
}

/// Turn a non-success response into [`StoreError::Status`].
async fn check(response: Response) -> StoreResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|b| b.error.message)
        .unwrap_or(body);
    Err(StoreError::Status {
        status: status.as_u16(),
        message,
    })
}

fn check_segment(what: &str, segment: &str) -> StoreResult<()> {
    if segment.is_empty() || segment.contains('/') {
        return Err(StoreError::Malformed(format!("invalid {what}: {segment:?}")));
    }
    Ok(())
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn add(&self, collection: &str, fields: Fields) -> StoreResult<DocumentId> {
        tracing::debug!(collection, "firestore add");
        let response = self
            .http
            .post(self.collection_url(collection)?)
            .query(&self.key())
            .json(&json!({ "fields": value::encode_fields(&fields) }))
            .send()
            .await?;
        let raw: RawDocument = check(response).await?.json().await?;
        Ok(Self::into_document(raw)?.id)
    }

    async fn get(&self, collection: &str, id: &DocumentId) -> StoreResult<Option<Document>> {
        tracing::debug!(collection, %id, "firestore get");
        let response = self
            .http
            .get(self.document_url(collection, id)?)
            .query(&self.key())
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let raw: RawDocument = check(response).await?.json().await?;
        Self::into_document(raw).map(Some)
    }

    async fn update(&self, collection: &str, id: &DocumentId, fields: Fields) -> StoreResult<()> {
        tracing::debug!(collection, %id, fields = fields.len(), "firestore update");
        let mut params: Vec<(&str, String)> = vec![
            ("key", self.config.api_key.clone()),
            ("currentDocument.exists", "true".to_string()),
        ];
        params.extend(
            fields
                .keys()
                .map(|k| ("updateMask.fieldPaths", value::field_path(k))),
        );
        let response = self
            .http
            .patch(self.document_url(collection, id)?)
            .query(&params)
            .json(&json!({ "fields": value::encode_fields(&fields) }))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(StoreError::not_found(collection, id));
        }
        check(response).await?;
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &DocumentId) -> StoreResult<()> {
        tracing::debug!(collection, %id, "firestore delete");
        let response = self
            .http
            .delete(self.document_url(collection, id)?)
            .query(&self.key())
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn increment(
        &self,
        collection: &str,
        id: &DocumentId,
        field: &str,
        by: i64,
    ) -> StoreResult<()> {
        tracing::debug!(collection, %id, field, by, "firestore increment");
        check_segment("document id", id.as_str())?;
        let body = json!({
            "writes": [{
                "transform": {
                    "document": self.document_name(collection, id),
                    "fieldTransforms": [{
                        "fieldPath": value::field_path(field),
                        "increment": { "integerValue": by.to_string() },
                    }],
                },
            }],
        });
        let response = self
            .http
            .post(format!("{}:commit", self.documents_url()))
            .query(&self.key())
            .json(&body)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn query(&self, collection: &str, filter: Option<&Filter>) -> StoreResult<Vec<Document>> {
        tracing::debug!(collection, filtered = filter.is_some(), "firestore query");
        check_segment("collection", collection)?;
        let mut structured = json!({ "from": [{ "collectionId": collection }] });
        if let Some(f) = filter {
            structured["where"] = json!({
                "fieldFilter": {
                    "field": { "fieldPath": value::field_path(&f.field) },
                    "op": "EQUAL",
                    "value": value::encode_value(&f.value),
                },
            });
        }
        let response = self
            .http
            .post(format!("{}:runQuery", self.documents_url()))
            .query(&self.key())
            .json(&json!({ "structuredQuery": structured }))
            .send()
            .await?;
        let rows: Vec<QueryRow> = check(response).await?.json().await?;
        let docs = rows
            .into_iter()
            .filter_map(|row| row.document)
            .map(Self::into_document)
            .collect::<StoreResult<Vec<_>>>()?;
        tracing::debug!(collection, count = docs.len(), "firestore query done");
        Ok(docs)
    }
}

impl std::fmt::Debug for FirestoreStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirestoreStore")
            .field("config", &self.config)
            .finish()
    }
}
