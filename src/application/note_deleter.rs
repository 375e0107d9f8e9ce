// src/application/note_deleter.rs
use crate::application::{BlobCleanup, BlobStore, DeleteNoteInput, NoteBackend, NoteSynchronizer};
use crate::domain::{NoteId, NoteList, RemovedNote, StorageKey, SyncError};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

/// A deletion whose list update has already happened but whose remote calls
/// have not been issued yet
#[must_use = "the remote deletion only runs when the pending delete is settled"]
pub struct PendingDelete<'a, B: NoteBackend, S: BlobStore> {
    synchronizer: &'a NoteSynchronizer<B, S>,
    id: NoteId,
    blob_key: Option<StorageKey>,
    snapshot: NoteList,
    removed: Option<RemovedNote>,
}

/// Remote deletion failed; `restored` is the list with the note put back
#[derive(Error, Debug)]
#[error("Failed to delete note: {error}")]
pub struct DeleteFailure {
    pub restored: NoteList,
    #[source]
    pub error: SyncError,
}

impl<B: NoteBackend, S: BlobStore> NoteSynchronizer<B, S> {
    /// Start deleting note `id`.
    ///
    /// Returns immediately with the list already excluding the note. A listed
    /// note with an image has its blob addressed per the key strategy: by
    /// `name` under `Name`, by the stored key under `Generated`. A note known
    /// to have no image gets no blob call, and an unknown note falls back to
    /// `name` as its key.
    pub fn begin_delete(&self, notes: &NoteList, id: &NoteId, name: &str) -> PendingDelete<'_, B, S> {
        let (snapshot, removed) = notes.without(id);

        let blob_key = match &removed {
            Some(removed) => removed
                .note
                .image_key()
                .map(|stored| self.policy.key_strategy.existing_key(name, stored)),
            None => StorageKey::new(name).ok(),
        };
        debug!(note_id = %id, key = ?blob_key, "Removed note from list");

        PendingDelete {
            synchronizer: self,
            id: id.clone(),
            blob_key,
            snapshot,
            removed,
        }
    }
}

impl<'a, B: NoteBackend, S: BlobStore> PendingDelete<'a, B, S> {
    /// The list as it should be displayed right now
    pub fn snapshot(&self) -> &NoteList {
        &self.snapshot
    }

    pub fn id(&self) -> &NoteId {
        &self.id
    }

    /// Remove the blob, then the record.
    ///
    /// On failure the returned [`DeleteFailure`] carries the list with the
    /// note back at its original position.
    #[instrument(level = "debug", skip(self), fields(note_id = %self.id))]
    pub async fn settle(self) -> Result<NoteList, DeleteFailure> {
        let Self {
            synchronizer,
            id,
            blob_key,
            snapshot,
            removed,
        } = self;

        if let Some(key) = &blob_key {
            if let Err(error) = synchronizer.blobs.remove(key).await {
                match synchronizer.policy.blob_cleanup {
                    BlobCleanup::Abort => {
                        return Err(Self::rollback(snapshot, removed, error));
                    }
                    BlobCleanup::BestEffort => {
                        warn!(%key, %error, "Failed to remove image, deleting note anyway");
                    }
                }
            }
        }

        if let Err(error) = synchronizer
            .backend
            .delete_note(DeleteNoteInput { id: id.clone() })
            .await
        {
            return Err(Self::rollback(snapshot, removed, error));
        }

        info!(note_id = %id, "Deleted note");
        Ok(snapshot)
    }

    fn rollback(snapshot: NoteList, removed: Option<RemovedNote>, error: SyncError) -> DeleteFailure {
        let restored = match removed {
            Some(removed) => snapshot.restore(removed),
            None => snapshot,
        };
        warn!(%error, "Delete failed, restoring note");
        DeleteFailure { restored, error }
    }
}
