//! Document store over an Appwrite-style REST API.
//!
//! ```text
//! GET    {endpoint}/databases/{db}/collections/{coll}/documents?queries[]=..
//! POST   {endpoint}/databases/{db}/collections/{coll}/documents
//! PATCH  {endpoint}/databases/{db}/collections/{coll}/documents/{id}
//! DELETE {endpoint}/databases/{db}/collections/{coll}/documents/{id}
//! ```

use super::{error_message, join_url};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reelsync_core::config::StoreConfig;
use reelsync_core::error::{ReelsyncError, Result};
use reelsync_core::store::{
    CREATED_AT_FIELD, Collection, Direction, Document, DocumentStore, Fields, Filter, ID_FIELD,
    Query, UPDATED_AT_FIELD,
};
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{Value, json};

const PROJECT_HEADER: &str = "X-Appwrite-Project";
const KEY_HEADER: &str = "X-Appwrite-Key";
const UNIQUE_ID: &str = "unique()";

#[derive(Debug, Deserialize)]
struct DocumentList {
    documents: Vec<Fields>,
}

pub struct HttpDocumentStore {
    client: Client,
    config: StoreConfig,
}

impl HttpDocumentStore {
    pub fn new(client: Client, config: StoreConfig) -> Self {
        Self { client, config }
    }

    fn documents_url(&self, collection: Collection) -> String {
        join_url(
            &self.config.endpoint,
            &format!(
                "databases/{}/collections/{}/documents",
                self.config.database_id,
                self.config.collection_id(collection)
            ),
        )
    }

    fn document_url(&self, collection: Collection, id: &str) -> String {
        format!("{}/{}", self.documents_url(collection), id)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.header(PROJECT_HEADER, &self.config.project_id);
        match &self.config.api_key {
            Some(key) => request.header(KEY_HEADER, key),
            None => request,
        }
    }

    async fn send(&self, collection: Collection, request: RequestBuilder) -> Result<Response> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| ReelsyncError::store_unavailable(format!("{collection}: {e}")))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = error_message(response).await;
        tracing::debug!(%collection, status = status.as_u16(), %message, "document store rejected request");
        Err(ReelsyncError::store_unavailable(format!(
            "{collection}: {} {message}",
            status.as_u16()
        )))
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(
    collection: Collection,
    response: Response,
) -> Result<T> {
    response.json::<T>().await.map_err(|e| {
        ReelsyncError::store_unavailable(format!("{collection}: malformed response: {e}"))
    })
}

/// Encodes a query as Appwrite `queries[]` JSON strings.
fn encode_query(query: &Query) -> Vec<(&'static str, String)> {
    let mut encoded = Vec::new();
    for filter in &query.filters {
        let Filter::Equal { field, value } = filter;
        encoded.push(json!({"method": "equal", "attribute": field, "values": [value]}));
    }
    for order in &query.order {
        let method = match order.direction {
            Direction::Asc => "orderAsc",
            Direction::Desc => "orderDesc",
        };
        encoded.push(json!({"method": method, "attribute": order.field}));
    }
    if let Some(limit) = query.limit {
        encoded.push(json!({"method": "limit", "values": [limit]}));
    }
    encoded
        .into_iter()
        .map(|q| ("queries[]", q.to_string()))
        .collect()
}

/// Splits a raw document into metadata and user fields. Unknown `$` keys are dropped.
fn parse_document(collection: Collection, mut raw: Fields) -> Result<Document> {
    let id = match raw.remove(ID_FIELD) {
        Some(Value::String(id)) => id,
        _ => {
            return Err(ReelsyncError::store_unavailable(format!(
                "{collection}: document without {ID_FIELD}"
            )));
        }
    };
    let created_at = raw.remove(CREATED_AT_FIELD).and_then(parse_timestamp);
    let updated_at = raw.remove(UPDATED_AT_FIELD).and_then(parse_timestamp);
    raw.retain(|key, _| !key.starts_with('$'));

    Ok(Document {
        id,
        created_at,
        updated_at,
        fields: raw,
    })
}

fn parse_timestamp(value: Value) -> Option<DateTime<Utc>> {
    value
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|t| t.with_timezone(&Utc))
}

#[async_trait]
impl DocumentStore for HttpDocumentStore {
    async fn list(&self, collection: Collection, query: &Query) -> Result<Vec<Document>> {
        let request = self
            .client
            .get(self.documents_url(collection))
            .query(&encode_query(query));
        let list: DocumentList = read_json(collection, self.send(collection, request).await?).await?;
        list.documents
            .into_iter()
            .map(|raw| parse_document(collection, raw))
            .collect()
    }

    async fn create(&self, collection: Collection, fields: Fields) -> Result<Document> {
        let request = self
            .client
            .post(self.documents_url(collection))
            .json(&json!({"documentId": UNIQUE_ID, "data": fields}));
        let raw: Fields = read_json(collection, self.send(collection, request).await?).await?;
        parse_document(collection, raw)
    }

    async fn update(&self, collection: Collection, id: &str, fields: Fields) -> Result<Document> {
        let request = self
            .client
            .patch(self.document_url(collection, id))
            .json(&json!({"data": fields}));
        let raw: Fields = read_json(collection, self.send(collection, request).await?).await?;
        parse_document(collection, raw)
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<()> {
        let request = self.client.delete(self.document_url(collection, id));
        self.send(collection, request).await?;
        Ok(())
    }
}
