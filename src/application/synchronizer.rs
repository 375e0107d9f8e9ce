// src/application/synchronizer.rs
use crate::application::{BlobStore, NoteBackend, SyncPolicy};

/// Orchestrates the list, create and delete workflows against a backend and a
/// blob store.
///
/// The workflows live next to each other in `note_lister`, `note_creator` and
/// `note_deleter`. None of them holds list state; each hands back a
/// [`NoteList`](crate::domain::NoteList) snapshot for the caller to apply.
pub struct NoteSynchronizer<B: NoteBackend, S: BlobStore> {
    pub(crate) backend: B,
    pub(crate) blobs: S,
    pub(crate) policy: SyncPolicy,
}

impl<B: NoteBackend, S: BlobStore> NoteSynchronizer<B, S> {
    pub fn new(backend: B, blobs: S) -> Self {
        Self::with_policy(backend, blobs, SyncPolicy::default())
    }

    pub fn with_policy(backend: B, blobs: S, policy: SyncPolicy) -> Self {
        Self {
            backend,
            blobs,
            policy,
        }
    }
}
