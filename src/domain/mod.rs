// src/domain/mod.rs
pub mod error;
pub mod note;
pub mod note_list;

pub use error::{SyncError, ValidationError};
pub use note::{ImagePayload, Note, NoteDraft, NoteId, NoteImage, StorageKey};
pub use note_list::{NoteList, RemovedNote};
