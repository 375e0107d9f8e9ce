// src/application/note_creator.rs
use crate::application::{BlobStore, CreateCompensation, CreateNoteInput, NoteBackend, NoteSynchronizer};
use crate::domain::{NoteDraft, NoteList, SyncError};
use tracing::{debug, info, instrument, warn};

impl<B: NoteBackend, S: BlobStore> NoteSynchronizer<B, S> {
    /// Create a note, uploading its image first, then re-list.
    ///
    /// The upload must complete before the mutation is issued because the
    /// record references the key, not the bytes. An empty payload counts as
    /// no image. The new note is not appended locally; the returned snapshot
    /// comes from a fresh listing.
    #[instrument(level = "debug", skip(self, draft), fields(name = draft.name()))]
    pub async fn create_note(&self, draft: NoteDraft) -> Result<NoteList, SyncError> {
        let (name, description, image) = draft.into_parts();

        let key = match image.filter(|payload| !payload.is_empty()) {
            Some(payload) => {
                let key = self.policy.key_strategy.key_for(&name)?;
                debug!(%key, bytes = payload.len(), "Uploading image");
                self.blobs.put(&key, payload).await?;
                Some(key)
            }
            None => None,
        };

        let input = CreateNoteInput {
            name,
            description,
            image: key.clone(),
        };

        match self.backend.create_note(input).await {
            Ok(note) => {
                info!(note_id = ?note.id, "Created note");
            }
            Err(error) => {
                if let (Some(key), CreateCompensation::RemoveUpload) =
                    (key.as_ref(), self.policy.create_compensation)
                {
                    debug!(%key, "Create failed, removing uploaded image");
                    if let Err(cleanup) = self.blobs.remove(key).await {
                        warn!(%key, error = %cleanup, "Failed to remove orphaned image");
                    }
                }
                return Err(error);
            }
        }

        self.list_and_hydrate().await
    }
}

#[cfg(test)]
mod tests {
    use crate::application::{CreateCompensation, KeyStrategy, NoteSynchronizer, SyncPolicy};
    use crate::domain::{ImagePayload, NoteDraft, SyncError};
    use crate::util::testing::{png_bytes, Call, RecordingBackend, RecordingBlobStore};

    #[tokio::test]
    async fn given_no_image_when_creating_then_never_uploads() {
        // Arrange
        let blobs = RecordingBlobStore::builder().build();
        let backend = RecordingBackend::builder().with_journal(blobs.journal()).build();
        let sync = NoteSynchronizer::new(backend, blobs.clone());
        let draft = NoteDraft::new("N", "D", None).unwrap();

        // Act
        sync.create_note(draft).await.unwrap();

        // Assert
        let calls = blobs.journal().calls();
        assert!(calls.iter().all(|c| !matches!(c, Call::BlobPut(..))));
        assert!(calls.iter().any(|c| matches!(c, Call::CreateNote(_))));
    }

    #[tokio::test]
    async fn given_no_image_when_creating_then_listing_shows_note_without_image() {
        let sync = NoteSynchronizer::new(
            RecordingBackend::builder().build(),
            RecordingBlobStore::builder().build(),
        );

        let notes = sync
            .create_note(NoteDraft::new("N", "D", None).unwrap())
            .await
            .unwrap();

        assert_eq!(notes.len(), 1);
        let note = &notes.as_slice()[0];
        assert_eq!(note.name, "N");
        assert_eq!(note.description, "D");
        assert!(note.image.is_none());
        assert!(note.id.is_some());
    }

    #[tokio::test]
    async fn given_image_when_creating_then_uploads_before_mutation_then_relists() {
        // Arrange
        let blobs = RecordingBlobStore::builder().build();
        let backend = RecordingBackend::builder().with_journal(blobs.journal()).build();
        let sync = NoteSynchronizer::new(backend, blobs.clone());
        let draft = NoteDraft::new("trip", "packing list", Some(ImagePayload::sniffed(png_bytes(2048)))).unwrap();

        // Act
        let notes = sync.create_note(draft).await.unwrap();

        // Assert
        let calls = blobs.journal().calls();
        let put = calls
            .iter()
            .position(|c| matches!(c, Call::BlobPut(key, 2048) if key == "trip"))
            .expect("image uploaded");
        let create = calls
            .iter()
            .position(|c| matches!(c, Call::CreateNote(input)
                if input.name == "trip"
                    && input.description == "packing list"
                    && input.image.as_ref().map(|k| k.as_str()) == Some("trip")))
            .expect("note created");
        assert!(put < create);
        assert!(matches!(calls.last(), Some(Call::BlobGet(key)) if key == "trip"));
        assert!(notes.as_slice()[0].image_url().is_some());
    }

    #[tokio::test]
    async fn given_empty_image_payload_when_creating_then_treated_as_no_image() {
        let blobs = RecordingBlobStore::builder().build();
        let sync = NoteSynchronizer::new(RecordingBackend::builder().build(), blobs.clone());
        let draft = NoteDraft::new("N", "D", Some(ImagePayload::new(vec![], "image/png"))).unwrap();

        let notes = sync.create_note(draft).await.unwrap();

        assert!(blobs.journal().calls().is_empty());
        assert!(notes.as_slice()[0].image.is_none());
    }

    #[tokio::test]
    async fn given_failing_upload_when_creating_then_mutation_not_issued() {
        // Arrange
        let blobs = RecordingBlobStore::builder().failing_put().build();
        let backend = RecordingBackend::builder().with_journal(blobs.journal()).build();
        let sync = NoteSynchronizer::new(backend, blobs.clone());
        let draft = NoteDraft::new("trip", "packing list", Some(ImagePayload::sniffed(png_bytes(16)))).unwrap();

        // Act
        let result = sync.create_note(draft).await;

        // Assert
        assert!(matches!(result, Err(SyncError::BlobStore { .. })));
        assert!(blobs
            .journal()
            .calls()
            .iter()
            .all(|c| !matches!(c, Call::CreateNote(_))));
    }

    #[tokio::test]
    async fn given_failing_mutation_when_creating_with_image_then_uploaded_blob_is_removed() {
        // Arrange
        let blobs = RecordingBlobStore::builder().build();
        let backend = RecordingBackend::builder()
            .with_journal(blobs.journal())
            .failing_create("rejected")
            .build();
        let sync = NoteSynchronizer::new(backend, blobs.clone());
        let draft = NoteDraft::new("trip", "packing list", Some(ImagePayload::sniffed(png_bytes(16)))).unwrap();

        // Act
        let result = sync.create_note(draft).await;

        // Assert
        assert!(matches!(result, Err(SyncError::Backend(msg)) if msg == "rejected"));
        assert!(matches!(blobs.journal().calls().last(), Some(Call::BlobRemove(key)) if key == "trip"));
        assert!(!blobs.contains("trip").await);
    }

    #[tokio::test]
    async fn given_failing_mutation_without_compensation_when_creating_then_blob_is_left() {
        let blobs = RecordingBlobStore::builder().build();
        let backend = RecordingBackend::builder().failing_create("rejected").build();
        let policy = SyncPolicy {
            create_compensation: CreateCompensation::None,
            ..SyncPolicy::default()
        };
        let sync = NoteSynchronizer::with_policy(backend, blobs.clone(), policy);
        let draft = NoteDraft::new("trip", "packing list", Some(ImagePayload::sniffed(png_bytes(16)))).unwrap();

        let result = sync.create_note(draft).await;

        assert!(result.is_err());
        assert!(blobs.contains("trip").await);
    }

    #[tokio::test]
    async fn given_generated_keys_when_creating_then_key_is_independent_of_name() {
        // Arrange
        let blobs = RecordingBlobStore::builder().build();
        let policy = SyncPolicy {
            key_strategy: KeyStrategy::Generated,
            ..SyncPolicy::default()
        };
        let sync = NoteSynchronizer::with_policy(RecordingBackend::builder().build(), blobs.clone(), policy);
        let draft = NoteDraft::new("trip", "packing list", Some(ImagePayload::sniffed(png_bytes(16)))).unwrap();

        // Act
        let notes = sync.create_note(draft).await.unwrap();

        // Assert
        let note = &notes.as_slice()[0];
        let key = note.image_key().expect("note has image").as_str().to_string();
        assert_ne!(key, "trip");
        assert!(blobs.contains(&key).await);
        assert!(note.image_url().is_some_and(|url| url.ends_with(&key)));
    }
}
