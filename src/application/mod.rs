// src/application/mod.rs
pub mod note_creator;
pub mod note_deleter;
pub mod note_lister;
pub mod policy;
pub mod remote;
pub mod session;
pub mod synchronizer;

pub use note_deleter::{DeleteFailure, PendingDelete};
pub use policy::{BlobCleanup, CreateCompensation, HydrationPolicy, KeyStrategy, SyncPolicy};
pub use remote::{BlobStore, CreateNoteInput, DeleteNoteInput, NoteBackend};
pub use session::{NoteForm, NoteSession, NoteView};
pub use synchronizer::NoteSynchronizer;
