// src/application/session.rs
use crate::application::{BlobStore, NoteBackend, NoteSynchronizer};
use crate::domain::{ImagePayload, NoteDraft, NoteId, NoteList, SyncError};
use std::path::PathBuf;
use tracing::{debug, instrument};

/// Render callback of the view layer
pub trait NoteView {
    fn render(&mut self, notes: &NoteList);
}

/// Contents of the create form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteForm {
    pub name: String,
    pub description: String,
    pub image_file: Option<PathBuf>,
}

impl NoteForm {
    /// Validate the fields and read the image file, if any
    pub async fn into_draft(self) -> Result<NoteDraft, SyncError> {
        // Validate before touching the file system
        NoteDraft::new(self.name.as_str(), self.description.as_str(), None)?;

        let image = match self.image_file {
            Some(path) => {
                debug!(?path, "Reading image file");
                let bytes = tokio::fs::read(&path).await?;
                Some(ImagePayload::sniffed(bytes))
            }
            None => None,
        };

        Ok(NoteDraft::new(self.name, self.description, image)?)
    }
}

/// View-owned note state wired to a synchronizer.
///
/// Every workflow takes `&mut self`, so two workflows can never interleave on
/// the same list.
pub struct NoteSession<B: NoteBackend, S: BlobStore, V: NoteView> {
    synchronizer: NoteSynchronizer<B, S>,
    view: V,
    notes: NoteList,
}

impl<B: NoteBackend, S: BlobStore, V: NoteView> NoteSession<B, S, V> {
    pub fn new(synchronizer: NoteSynchronizer<B, S>, view: V) -> Self {
        Self {
            synchronizer,
            view,
            notes: NoteList::default(),
        }
    }

    pub fn notes(&self) -> &NoteList {
        &self.notes
    }

    fn apply(&mut self, notes: NoteList) {
        self.notes = notes;
        self.view.render(&self.notes);
    }

    /// Load the list. On failure the current list is left untouched.
    #[instrument(level = "debug", skip(self))]
    pub async fn refresh(&mut self) -> Result<(), SyncError> {
        let notes = self.synchronizer.list_and_hydrate().await?;
        self.apply(notes);
        Ok(())
    }

    /// Form submission handler
    #[instrument(level = "debug", skip(self, form), fields(name = %form.name))]
    pub async fn submit(&mut self, form: NoteForm) -> Result<(), SyncError> {
        let draft = form.into_draft().await?;
        let notes = self.synchronizer.create_note(draft).await?;
        self.apply(notes);
        Ok(())
    }

    /// Per-item delete trigger.
    ///
    /// The view is re-rendered without the note before any remote call; if
    /// the deletion fails the note is rendered back in place and the error
    /// is returned.
    #[instrument(level = "debug", skip(self))]
    pub async fn delete(&mut self, id: &NoteId, name: &str) -> Result<(), SyncError> {
        let pending = self.synchronizer.begin_delete(&self.notes, id, name);
        self.notes = pending.snapshot().clone();
        self.view.render(&self.notes);

        match pending.settle().await {
            Ok(notes) => {
                self.notes = notes;
                Ok(())
            }
            Err(failure) => {
                self.notes = failure.restored;
                self.view.render(&self.notes);
                Err(failure.error)
            }
        }
    }
}
