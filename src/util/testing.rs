// src/util/testing.rs

use anyhow::Result;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::{
    filter::filter_fn,
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::application::{BlobStore, CreateNoteInput, DeleteNoteInput, NoteBackend, NoteView};
use crate::domain::{ImagePayload, Note, NoteId, NoteImage, NoteList, StorageKey, SyncError};
use crate::infrastructure::{MemoryBackend, MemoryBlobStore};

/// One remote call, as seen by the recording doubles
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListNotes,
    CreateNote(CreateNoteInput),
    DeleteNote(DeleteNoteInput),
    BlobGet(String),
    /// Key and payload size
    BlobPut(String, usize),
    BlobRemove(String),
}

/// Ordered log of remote calls, shareable between a backend and a blob store
/// so tests can assert on cross-service ordering
#[derive(Debug, Clone, Default)]
pub struct CallJournal {
    calls: Arc<Mutex<Vec<Call>>>,
}

impl CallJournal {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Call>> {
        self.calls.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn record(&self, call: Call) {
        self.lock().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().clone()
    }
}

/// Note with a backend id and, optionally, a stored image key
pub fn stored_note(id: &str, name: &str, image_key: Option<&str>) -> Note {
    Note {
        id: Some(NoteId::new(id)),
        name: name.to_string(),
        description: format!("{name} description"),
        image: image_key
            .and_then(|key| StorageKey::new(key).ok())
            .map(NoteImage::stored),
        created_at: None,
        updated_at: None,
    }
}

/// A PNG signature padded with zeros to `len` bytes
pub fn png_bytes(len: usize) -> Vec<u8> {
    let mut bytes = b"\x89PNG\r\n\x1a\n".to_vec();
    bytes.resize(len.max(bytes.len()), 0);
    bytes
}

/// Note backend double: records every call, delegates to [`MemoryBackend`]
/// unless configured to fail or to never answer.
///
/// # Examples
///
/// ```
/// use notesync::util::testing::{stored_note, RecordingBackend};
///
/// let backend = RecordingBackend::builder()
///     .with_note(stored_note("abc123", "trip", Some("trip")))
///     .failing_delete("denied")
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct RecordingBackend {
    inner: MemoryBackend,
    journal: CallJournal,
    list_failure: Option<String>,
    create_failure: Option<String>,
    delete_failure: Option<String>,
    hanging: bool,
    hanging_delete: bool,
}

impl RecordingBackend {
    pub fn builder() -> RecordingBackendBuilder {
        RecordingBackendBuilder::new()
    }

    pub fn journal(&self) -> CallJournal {
        self.journal.clone()
    }

    pub async fn stored_notes(&self) -> Vec<Note> {
        self.inner.notes().await
    }

    async fn answer(&self, failure: &Option<String>, hang: bool) -> Result<(), SyncError> {
        if self.hanging || hang {
            futures::future::pending::<()>().await;
        }
        match failure {
            Some(message) => Err(SyncError::Backend(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl NoteBackend for RecordingBackend {
    async fn list_notes(&self) -> Result<Vec<Note>, SyncError> {
        self.journal.record(Call::ListNotes);
        self.answer(&self.list_failure, false).await?;
        self.inner.list_notes().await
    }

    async fn create_note(&self, input: CreateNoteInput) -> Result<Note, SyncError> {
        self.journal.record(Call::CreateNote(input.clone()));
        self.answer(&self.create_failure, false).await?;
        self.inner.create_note(input).await
    }

    async fn delete_note(&self, input: DeleteNoteInput) -> Result<(), SyncError> {
        self.journal.record(Call::DeleteNote(input.clone()));
        self.answer(&self.delete_failure, self.hanging_delete).await?;
        self.inner.delete_note(input).await
    }
}

/// Builder for RecordingBackend
pub struct RecordingBackendBuilder {
    notes: Vec<Note>,
    journal: CallJournal,
    list_failure: Option<String>,
    create_failure: Option<String>,
    delete_failure: Option<String>,
    hanging: bool,
    hanging_delete: bool,
}

impl RecordingBackendBuilder {
    pub fn new() -> Self {
        Self {
            notes: vec![],
            journal: CallJournal::new(),
            list_failure: None,
            create_failure: None,
            delete_failure: None,
            hanging: false,
            hanging_delete: false,
        }
    }

    /// Seed a record the backend already holds
    pub fn with_note(mut self, note: Note) -> Self {
        self.notes.push(note);
        self
    }

    /// Record into a journal shared with other doubles
    pub fn with_journal(mut self, journal: CallJournal) -> Self {
        self.journal = journal;
        self
    }

    pub fn failing_list(mut self, message: &str) -> Self {
        self.list_failure = Some(message.to_string());
        self
    }

    pub fn failing_create(mut self, message: &str) -> Self {
        self.create_failure = Some(message.to_string());
        self
    }

    pub fn failing_delete(mut self, message: &str) -> Self {
        self.delete_failure = Some(message.to_string());
        self
    }

    /// Calls are recorded but never complete
    pub fn hanging(mut self) -> Self {
        self.hanging = true;
        self
    }

    /// Only `delete_note` never completes
    pub fn hanging_delete(mut self) -> Self {
        self.hanging_delete = true;
        self
    }

    pub fn build(self) -> RecordingBackend {
        RecordingBackend {
            inner: MemoryBackend::with_notes(self.notes),
            journal: self.journal,
            list_failure: self.list_failure,
            create_failure: self.create_failure,
            delete_failure: self.delete_failure,
            hanging: self.hanging,
            hanging_delete: self.hanging_delete,
        }
    }
}

impl Default for RecordingBackendBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Blob store double: records every call, delegates to [`MemoryBlobStore`]
/// unless configured to fail or to never answer
#[derive(Debug, Clone)]
pub struct RecordingBlobStore {
    inner: MemoryBlobStore,
    journal: CallJournal,
    failing_get: HashSet<String>,
    slow_get: HashMap<String, Duration>,
    settled_gets: Arc<Mutex<Vec<String>>>,
    failing_put: bool,
    failing_remove: bool,
    hanging: bool,
    hanging_remove: bool,
}

impl RecordingBlobStore {
    pub fn builder() -> RecordingBlobStoreBuilder {
        RecordingBlobStoreBuilder::new()
    }

    pub fn journal(&self) -> CallJournal {
        self.journal.clone()
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.inner.contains(key).await
    }

    /// Payload stored under `key`, byte for byte
    pub async fn object(&self, key: &str) -> Option<ImagePayload> {
        let key = StorageKey::new(key).ok()?;
        self.inner.object(&key).await
    }

    /// Keys of URL lookups that have finished, successfully or not, in the
    /// order they finished
    pub fn settled_gets(&self) -> Vec<String> {
        self.settled_gets
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    async fn answer(&self, key: &StorageKey, fail: bool, hang: bool) -> Result<(), SyncError> {
        if self.hanging || hang {
            futures::future::pending::<()>().await;
        }
        if fail {
            return Err(SyncError::blob(key, "injected failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl BlobStore for RecordingBlobStore {
    async fn get(&self, key: &StorageKey) -> Result<String, SyncError> {
        self.journal.record(Call::BlobGet(key.to_string()));
        if let Some(delay) = self.slow_get.get(key.as_str()) {
            tokio::time::sleep(*delay).await;
        }
        let answer = self.answer(key, self.failing_get.contains(key.as_str()), false).await;
        self.settled_gets
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(key.to_string());
        answer?;
        self.inner.get(key).await
    }

    async fn put(&self, key: &StorageKey, payload: ImagePayload) -> Result<(), SyncError> {
        self.journal.record(Call::BlobPut(key.to_string(), payload.len()));
        self.answer(key, self.failing_put, false).await?;
        self.inner.put(key, payload).await
    }

    async fn remove(&self, key: &StorageKey) -> Result<(), SyncError> {
        self.journal.record(Call::BlobRemove(key.to_string()));
        self.answer(key, self.failing_remove, self.hanging_remove).await?;
        self.inner.remove(key).await
    }
}

/// Builder for RecordingBlobStore
pub struct RecordingBlobStoreBuilder {
    journal: CallJournal,
    failing_get: HashSet<String>,
    slow_get: HashMap<String, Duration>,
    failing_put: bool,
    failing_remove: bool,
    hanging: bool,
    hanging_remove: bool,
}

impl RecordingBlobStoreBuilder {
    pub fn new() -> Self {
        Self {
            journal: CallJournal::new(),
            failing_get: HashSet::new(),
            slow_get: HashMap::new(),
            failing_put: false,
            failing_remove: false,
            hanging: false,
            hanging_remove: false,
        }
    }

    pub fn with_journal(mut self, journal: CallJournal) -> Self {
        self.journal = journal;
        self
    }

    /// Make URL lookups for `key` fail
    pub fn failing_get(mut self, key: &str) -> Self {
        self.failing_get.insert(key.to_string());
        self
    }

    /// Make URL lookups for `key` take `delay` before answering
    pub fn slow_get(mut self, key: &str, delay: Duration) -> Self {
        self.slow_get.insert(key.to_string(), delay);
        self
    }

    pub fn failing_put(mut self) -> Self {
        self.failing_put = true;
        self
    }

    pub fn failing_remove(mut self) -> Self {
        self.failing_remove = true;
        self
    }

    /// Calls are recorded but never complete
    pub fn hanging(mut self) -> Self {
        self.hanging = true;
        self
    }

    /// Only `remove` never completes
    pub fn hanging_remove(mut self) -> Self {
        self.hanging_remove = true;
        self
    }

    pub fn build(self) -> RecordingBlobStore {
        RecordingBlobStore {
            inner: MemoryBlobStore::new(),
            journal: self.journal,
            failing_get: self.failing_get,
            slow_get: self.slow_get,
            settled_gets: Arc::new(Mutex::new(Vec::new())),
            failing_put: self.failing_put,
            failing_remove: self.failing_remove,
            hanging: self.hanging,
            hanging_remove: self.hanging_remove,
        }
    }
}

impl Default for RecordingBlobStoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// View that keeps the names of every list it was asked to render
#[derive(Debug, Clone, Default)]
pub struct RecordingView {
    renders: Arc<Mutex<Vec<Vec<String>>>>,
}

impl RecordingView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn renders(&self) -> Vec<Vec<String>> {
        self.renders
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl NoteView for RecordingView {
    fn render(&mut self, notes: &NoteList) {
        let names = notes.iter().map(|n| n.name.clone()).collect();
        self.renders
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(names);
    }
}

pub fn init_test_setup() -> Result<()> {
    // Set up logging first
    setup_test_logging();

    info!("Test Setup complete");
    Ok(())
}

fn setup_test_logging() {
    debug!("INIT: Attempting logger init from testing.rs");

    // Create a filter for noisy modules
    let noisy_modules = ["hyper", "reqwest", "mio", "rustls"];
    let module_filter = filter_fn(move |metadata| {
        !noisy_modules
            .iter()
            .any(|name| metadata.target().starts_with(name))
    });

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    // Build and set the subscriber
    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(module_filter)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[ctor::ctor]
    fn init() {
        init_test_setup().expect("Failed to initialize test setup");
    }

    #[tokio::test]
    async fn given_shared_journal_when_calling_both_doubles_then_records_in_order() {
        let blobs = RecordingBlobStore::builder().build();
        let backend = RecordingBackend::builder().with_journal(blobs.journal()).build();
        let key = StorageKey::new("trip").unwrap();

        blobs.put(&key, ImagePayload::sniffed(png_bytes(4))).await.unwrap();
        backend.list_notes().await.unwrap();

        assert_eq!(
            blobs.journal().calls(),
            vec![Call::BlobPut("trip".to_string(), 8), Call::ListNotes]
        );
    }

    #[tokio::test]
    async fn given_failing_delete_when_deleting_then_records_call_and_keeps_note() {
        let backend = RecordingBackend::builder()
            .with_note(stored_note("1", "a", None))
            .failing_delete("denied")
            .build();

        let result = backend.delete_note(DeleteNoteInput { id: NoteId::new("1") }).await;

        assert!(matches!(result, Err(SyncError::Backend(msg)) if msg == "denied"));
        assert_eq!(backend.stored_notes().await.len(), 1);
        assert_eq!(backend.journal().calls().len(), 1);
    }

    #[test]
    fn given_recording_view_when_rendering_then_keeps_names() {
        let mut view = RecordingView::new();
        view.render(&NoteList::new(vec![stored_note("1", "a", None)]));
        assert_eq!(view.renders(), vec![vec!["a".to_string()]]);
    }

    #[test]
    fn given_small_length_when_building_png_then_keeps_full_signature() {
        assert_eq!(png_bytes(2).len(), 8);
        assert_eq!(png_bytes(2048).len(), 2048);
    }
}
