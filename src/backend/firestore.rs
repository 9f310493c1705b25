//! Cloud Firestore, through its REST API.
//!
//! Documents travel as typed values (`{"integerValue": "5"}`), which are
//! translated to and from plain JSON here.

use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use serde_with::{serde_as, DisplayFromStr};

use crate::backend::interface::{Document, DocumentPath, DocumentStore, StoreError, StoreResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirestoreConfig {
    pub project_id: String,
    #[serde(default = "FirestoreConfig::default_database")]
    pub database: String,
    #[serde(default = "FirestoreConfig::default_base_url")]
    pub base_url: String,
    /// Web API key, sent as the `key` query parameter.
    #[serde(default)]
    pub api_key: Option<String>
}

impl FirestoreConfig {
    pub fn new(project_id: &str) -> FirestoreConfig {
        FirestoreConfig {
            project_id: project_id.to_owned(),
            database: Self::default_database(),
            base_url: Self::default_base_url(),
            api_key: None
        }
    }

    fn default_database() -> String {
        "(default)".to_owned()
    }

    fn default_base_url() -> String {
        "https://firestore.googleapis.com".to_owned()
    }
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
enum FirestoreValue {
    NullValue(()),
    BooleanValue(bool),
    IntegerValue(#[serde_as(as = "DisplayFromStr")] i64),
    DoubleValue(f64),
    StringValue(String),
    TimestampValue(String),
    ReferenceValue(String),
    BytesValue(String),
    MapValue(MapValue),
    ArrayValue(ArrayValue)
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
struct MapValue {
    #[serde(default)]
    fields: BTreeMap<String, FirestoreValue>
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
struct ArrayValue {
    #[serde(default)]
    values: Vec<FirestoreValue>
}

/// Body of a document, as sent and received.
#[derive(Debug, Default, Serialize, Deserialize)]
struct FirestoreDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default)]
    fields: BTreeMap<String, FirestoreValue>
}

// Integers above 2^53 are not exact as f64 anyway, keep them as doubles.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_991.0;

impl FirestoreValue {
    fn from_json(value: Value) -> FirestoreValue {
        match value {
            Value::Null => Self::NullValue(()),
            Value::Bool(flag) => Self::BooleanValue(flag),
            Value::Number(number) => Self::from_number(&number),
            Value::String(text) => Self::StringValue(text),
            Value::Array(items) => Self::ArrayValue(ArrayValue {
                values: items.into_iter().map(Self::from_json).collect()
            }),
            Value::Object(fields) => Self::MapValue(MapValue {
                fields: fields.into_iter().map(|(key, value)| (key, Self::from_json(value))).collect()
            })
        }
    }

    fn from_number(number: &Number) -> FirestoreValue {
        if let Some(int) = number.as_i64() {
            return Self::IntegerValue(int);
        }
        let float = number.as_f64().unwrap_or(f64::NAN);
        if float.fract() == 0.0 && float.abs() <= MAX_EXACT_INTEGER {
            Self::IntegerValue(float as i64)
        } else {
            Self::DoubleValue(float)
        }
    }

    fn into_json(self) -> StoreResult<Value> {
        let value = match self {
            Self::NullValue(()) => Value::Null,
            Self::BooleanValue(flag) => Value::Bool(flag),
            Self::IntegerValue(int) => Value::from(int),
            Self::DoubleValue(float) => Number::from_f64(float)
                .map(Value::Number)
                .ok_or_else(|| StoreError::Malformed(format!("non-finite double {}", float)))?,
            Self::StringValue(text)
            | Self::TimestampValue(text)
            | Self::ReferenceValue(text)
            | Self::BytesValue(text) => Value::String(text),
            Self::ArrayValue(array) => Value::Array(array.values.into_iter()
                .map(Self::into_json)
                .collect::<StoreResult<_>>()?),
            Self::MapValue(map) => Value::Object(fields_into_document(map.fields)?)
        };
        Ok(value)
    }
}

fn fields_into_document(fields: BTreeMap<String, FirestoreValue>) -> StoreResult<Document> {
    fields.into_iter()
        .map(|(key, value)| value.into_json().map(|json| (key, json)))
        .collect()
}

fn document_into_fields(document: Document) -> BTreeMap<String, FirestoreValue> {
    document.into_iter()
        .map(|(key, value)| (key, FirestoreValue::from_json(value)))
        .collect()
}

pub struct FirestoreStore {
    client: Client,
    config: FirestoreConfig
}

impl FirestoreStore {
    pub fn new(config: FirestoreConfig) -> FirestoreStore {
        FirestoreStore { client: Client::new(), config }
    }

    pub fn config(&self) -> &FirestoreConfig {
        &self.config
    }

    fn document_url(&self, path: &DocumentPath) -> String {
        format!("{}/v1/projects/{}/databases/{}/documents/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.project_id,
            self.config.database,
            path.collection,
            path.document)
    }

    fn request(&self, method: reqwest::Method, path: &DocumentPath) -> reqwest::RequestBuilder {
        let builder = self.client.request(method, self.document_url(path));
        match &self.config.api_key {
            Some(key) => builder.query(&[("key", key)]),
            None => builder
        }
    }

    async fn rejected(response: reqwest::Response) -> StoreError {
        let status = response.status().as_u16();
        let message = response.text().await.unwrap_or_default();
        StoreError::Rejected { status, message }
    }
}

fn unavailable(err: reqwest::Error) -> StoreError {
    StoreError::Unavailable(err.to_string())
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn get(&self, path: &DocumentPath) -> StoreResult<Option<Document>> {
        let response = self.request(reqwest::Method::GET, path)
            .send()
            .await
            .map_err(unavailable)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::rejected(response).await);
        }

        let body: FirestoreDocument = response.json()
            .await
            .map_err(|err| StoreError::Malformed(err.to_string()))?;
        fields_into_document(body.fields).map(Some)
    }

    async fn set(&self, path: &DocumentPath, document: Document) -> StoreResult<()> {
        // PATCH without an update mask replaces every field
        let body = FirestoreDocument { name: None, fields: document_into_fields(document) };
        let response = self.request(reqwest::Method::PATCH, path)
            .json(&body)
            .send()
            .await
            .map_err(unavailable)?;

        if !response.status().is_success() {
            return Err(Self::rejected(response).await);
        }
        Ok(())
    }
}
