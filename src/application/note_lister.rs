// src/application/note_lister.rs
use crate::application::{BlobStore, HydrationPolicy, NoteBackend, NoteSynchronizer};
use crate::domain::{Note, NoteImage, NoteList, SyncError};
use futures::future::join_all;
use tracing::{debug, instrument, warn};

impl<B: NoteBackend, S: BlobStore> NoteSynchronizer<B, S> {
    /// Fetch every note and resolve image keys to fetchable URLs.
    ///
    /// Lookups for all notes run concurrently and the call returns once each
    /// has settled. Order is the backend's.
    #[instrument(level = "debug", skip(self))]
    pub async fn list_and_hydrate(&self) -> Result<NoteList, SyncError> {
        let notes = self.backend.list_notes().await?;
        debug!(count = notes.len(), "Fetched notes");

        // Every lookup settles before a failure is reported
        let hydrated = join_all(notes.into_iter().map(|note| self.hydrate(note)))
            .await
            .into_iter()
            .collect::<Result<Vec<_>, _>>()?;
        Ok(NoteList::new(hydrated))
    }

    async fn hydrate(&self, mut note: Note) -> Result<Note, SyncError> {
        let key = match &note.image {
            Some(NoteImage::Stored { key }) => self.policy.key_strategy.existing_key(&note.name, key),
            _ => return Ok(note),
        };

        match self.blobs.get(&key).await {
            Ok(url) => {
                note.image = Some(NoteImage::Resolved { key, url });
                Ok(note)
            }
            Err(error) => match self.policy.hydration {
                HydrationPolicy::FailFast => Err(error),
                HydrationPolicy::Degrade => {
                    warn!(%key, note = %note.name, %error, "Image lookup failed, showing note without image");
                    note.image = Some(NoteImage::Unavailable { key });
                    Ok(note)
                }
            },
        }
    }
}
