// src/application/remote.rs
use crate::domain::{ImagePayload, Note, NoteId, StorageKey, SyncError};
use async_trait::async_trait;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateNoteInput {
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<StorageKey>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteNoteInput {
    pub id: NoteId,
}

/// Structured-query backend holding the note records
#[async_trait]
pub trait NoteBackend: Send + Sync {
    /// All notes, in whatever order the backend keeps them.
    /// Images come back as `NoteImage::Stored` keys.
    async fn list_notes(&self) -> Result<Vec<Note>, SyncError>;

    async fn create_note(&self, input: CreateNoteInput) -> Result<Note, SyncError>;

    async fn delete_note(&self, input: DeleteNoteInput) -> Result<(), SyncError>;
}

/// Key-addressed store for note images
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Fetchable URL for the blob under `key`
    async fn get(&self, key: &StorageKey) -> Result<String, SyncError>;

    async fn put(&self, key: &StorageKey, payload: ImagePayload) -> Result<(), SyncError>;

    async fn remove(&self, key: &StorageKey) -> Result<(), SyncError>;
}
