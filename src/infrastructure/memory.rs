// src/infrastructure/memory.rs
use crate::application::{BlobStore, CreateNoteInput, DeleteNoteInput, NoteBackend};
use crate::constants::MEMORY_URL_BASE;
use crate::domain::{ImagePayload, Note, NoteId, NoteImage, StorageKey, SyncError};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, instrument};
use uuid::Uuid;

/// In-process note backend. Clones share the same records.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    notes: Arc<Mutex<Vec<Note>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_notes(notes: Vec<Note>) -> Self {
        Self {
            notes: Arc::new(Mutex::new(notes)),
        }
    }

    pub async fn notes(&self) -> Vec<Note> {
        self.notes.lock().await.clone()
    }
}

#[async_trait]
impl NoteBackend for MemoryBackend {
    async fn list_notes(&self) -> Result<Vec<Note>, SyncError> {
        Ok(self.notes.lock().await.clone())
    }

    #[instrument(level = "debug", skip(self))]
    async fn create_note(&self, input: CreateNoteInput) -> Result<Note, SyncError> {
        let now = Utc::now().to_rfc3339();
        let note = Note {
            id: Some(NoteId::new(Uuid::new_v4().to_string())),
            name: input.name,
            description: input.description,
            image: input.image.map(NoteImage::stored),
            created_at: Some(now.clone()),
            updated_at: Some(now),
        };

        self.notes.lock().await.push(note.clone());
        Ok(note)
    }

    #[instrument(level = "debug", skip(self))]
    async fn delete_note(&self, input: DeleteNoteInput) -> Result<(), SyncError> {
        let mut notes = self.notes.lock().await;
        let before = notes.len();
        notes.retain(|n| n.id.as_ref() != Some(&input.id));

        if notes.len() == before {
            return Err(SyncError::Backend(format!("Note not found: {}", input.id)));
        }
        Ok(())
    }
}

/// In-process blob store. Clones share the same objects.
#[derive(Debug, Clone)]
pub struct MemoryBlobStore {
    objects: Arc<Mutex<HashMap<StorageKey, ImagePayload>>>,
    url_base: String,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self {
            objects: Arc::new(Mutex::new(HashMap::new())),
            url_base: MEMORY_URL_BASE.to_string(),
        }
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.objects
            .lock()
            .await
            .keys()
            .any(|k| k.as_str() == key)
    }

    pub async fn object(&self, key: &StorageKey) -> Option<ImagePayload> {
        self.objects.lock().await.get(key).cloned()
    }
}

impl Default for MemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    /// Like a presigned URL, the result does not prove the object exists.
    async fn get(&self, key: &StorageKey) -> Result<String, SyncError> {
        Ok(format!("{}{}", self.url_base, urlencoding::encode(key.as_str())))
    }

    async fn put(&self, key: &StorageKey, payload: ImagePayload) -> Result<(), SyncError> {
        debug!(%key, bytes = payload.len(), "Storing object");
        self.objects.lock().await.insert(key.clone(), payload);
        Ok(())
    }

    async fn remove(&self, key: &StorageKey) -> Result<(), SyncError> {
        self.objects.lock().await.remove(key);
        Ok(())
    }
}
