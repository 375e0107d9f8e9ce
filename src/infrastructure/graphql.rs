// src/infrastructure/graphql.rs
//! Note backend speaking GraphQL over HTTP to the managed API.

use crate::application::{CreateNoteInput, DeleteNoteInput, NoteBackend};
use crate::domain::{Note, NoteId, NoteImage, StorageKey, SyncError};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

pub const LIST_NOTES: &str = r#"query ListNotes {
  listNotes {
    items { id name description image createdAt updatedAt }
  }
}"#;

pub const CREATE_NOTE: &str = r#"mutation CreateNote($input: CreateNoteInput!) {
  createNote(input: $input) { id name description image createdAt updatedAt }
}"#;

pub const DELETE_NOTE: &str = r#"mutation DeleteNote($input: DeleteNoteInput!) {
  deleteNote(input: $input) { id }
}"#;

/// How requests prove who is asking
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// `x-api-key` header
    ApiKey(String),
    /// Signed-in user's session token, sent as `Authorization`
    SessionToken(String),
    Anonymous,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ApiKey(_) => f.write_str("ApiKey(***)"),
            Self::SessionToken(_) => f.write_str("SessionToken(***)"),
            Self::Anonymous => f.write_str("Anonymous"),
        }
    }
}

impl Credentials {
    pub(crate) fn headers(&self) -> Result<HeaderMap, SyncError> {
        let mut headers = HeaderMap::new();
        let invalid = |_| SyncError::Unauthorized("credential is not a valid header value".to_string());

        match self {
            Self::ApiKey(key) => {
                headers.insert("x-api-key", HeaderValue::from_str(key).map_err(invalid)?);
            }
            Self::SessionToken(token) => {
                let mut value = HeaderValue::from_str(token).map_err(invalid)?;
                value.set_sensitive(true);
                headers.insert(AUTHORIZATION, value);
            }
            Self::Anonymous => {}
        }
        Ok(headers)
    }
}

#[derive(Debug, Serialize)]
struct GraphqlRequest<'a, V: Serialize> {
    query: &'a str,
    variables: V,
}

#[derive(Debug, Serialize)]
struct InputVariables<I: Serialize> {
    input: I,
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
    #[serde(default, rename = "errorType")]
    error_type: Option<String>,
}

/// Note as the API returns it
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl From<NoteRecord> for Note {
    fn from(record: NoteRecord) -> Self {
        Note {
            id: Some(NoteId(record.id)),
            name: record.name,
            description: record.description.unwrap_or_default(),
            // An empty string means no image, the same as null
            image: record
                .image
                .and_then(|key| StorageKey::new(key).ok())
                .map(NoteImage::stored),
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
struct NoteConnection {
    #[serde(default)]
    items: Vec<Option<NoteRecord>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListNotesData {
    list_notes: Option<NoteConnection>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateNoteData {
    create_note: Option<NoteRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteNoteData {
    #[allow(dead_code)]
    delete_note: Option<serde_json::Value>,
}

pub struct GraphqlBackend {
    endpoint: Url,
    client: reqwest::Client,
}

impl GraphqlBackend {
    pub fn new(endpoint: Url, credentials: &Credentials, timeout: Duration) -> Result<Self, SyncError> {
        let mut headers = credentials.headers()?;
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| SyncError::Transient(format!("Failed to build HTTP client: {e}")))?;

        debug!(%endpoint, ?credentials, "Created GraphQL backend");
        Ok(Self { endpoint, client })
    }

    async fn execute<V, T>(&self, query: &str, variables: V) -> Result<T, SyncError>
    where
        V: Serialize + Send,
        T: DeserializeOwned,
    {
        let request = self
            .client
            .post(self.endpoint.clone())
            .json(&GraphqlRequest { query, variables });
        let response = request.send().await.map_err(transport_error)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(transport_error)?;
        decode_response(status, &body)
    }
}

pub(crate) fn transport_error(error: reqwest::Error) -> SyncError {
    SyncError::Transient(error.to_string())
}

/// Map an HTTP status outside 2xx to the error taxonomy
pub(crate) fn status_error(status: u16, body: &str) -> SyncError {
    let detail = format!("HTTP {status}: {}", body.trim());
    match status {
        401 | 403 => SyncError::Unauthorized(detail),
        429 | 500..=599 => SyncError::Transient(detail),
        _ => SyncError::Backend(detail),
    }
}

/// Decode a GraphQL response body, surfacing transport and GraphQL errors
pub(crate) fn decode_response<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, SyncError> {
    if !(200..300).contains(&status) {
        return Err(status_error(status, body));
    }

    let response: GraphqlResponse<T> = serde_json::from_str(body)
        .map_err(|e| SyncError::Backend(format!("Malformed GraphQL response: {e}")))?;

    if !response.errors.is_empty() {
        let unauthorized = response
            .errors
            .iter()
            .any(|e| e.error_type.as_deref() == Some("Unauthorized"));
        let message = response
            .errors
            .into_iter()
            .map(|e| e.message)
            .collect::<Vec<_>>()
            .join("; ");
        return Err(if unauthorized {
            SyncError::Unauthorized(message)
        } else {
            SyncError::Backend(message)
        });
    }

    response
        .data
        .ok_or_else(|| SyncError::Backend("GraphQL response carried no data".to_string()))
}

#[async_trait]
impl NoteBackend for GraphqlBackend {
    #[instrument(level = "debug", skip(self))]
    async fn list_notes(&self) -> Result<Vec<Note>, SyncError> {
        let data: ListNotesData = self.execute(LIST_NOTES, serde_json::json!({})).await?;
        let notes: Vec<Note> = data
            .list_notes
            .map(|connection| connection.items)
            .unwrap_or_default()
            .into_iter()
            .flatten()
            .map(Note::from)
            .collect();
        debug!(count = notes.len(), "Listed notes");
        Ok(notes)
    }

    #[instrument(level = "debug", skip(self))]
    async fn create_note(&self, input: CreateNoteInput) -> Result<Note, SyncError> {
        let data: CreateNoteData = self.execute(CREATE_NOTE, InputVariables { input }).await?;
        data.create_note
            .map(Note::from)
            .ok_or_else(|| SyncError::Backend("createNote returned null".to_string()))
    }

    #[instrument(level = "debug", skip(self))]
    async fn delete_note(&self, input: DeleteNoteInput) -> Result<(), SyncError> {
        let _: DeleteNoteData = self.execute(DELETE_NOTE, InputVariables { input }).await?;
        Ok(())
    }
}
