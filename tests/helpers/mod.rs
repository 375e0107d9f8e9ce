use anyhow::{Context, Result};
use notesync::application::{NoteSession, NoteSynchronizer, SyncPolicy};
use notesync::util::testing::{png_bytes, RecordingBackend, RecordingBlobStore, RecordingView};
use std::path::PathBuf;
use tempfile::TempDir;

/// Image file on disk for exercising the form handler
#[allow(dead_code)]
pub struct TestImage {
    _temp_dir: TempDir,
    pub path: PathBuf,
    pub len: usize,
}

impl TestImage {
    /// Write a PNG of `len` bytes to a temporary directory
    pub fn png(len: usize) -> Result<Self> {
        let temp_dir = tempfile::tempdir()
            .context("Failed to create temporary directory")?;
        let path = temp_dir.path().join("image.png");
        let bytes = png_bytes(len);

        std::fs::write(&path, &bytes)
            .context("Failed to write test image")?;

        Ok(Self {
            _temp_dir: temp_dir,
            path,
            len: bytes.len(),
        })
    }
}

pub type TestSession = NoteSession<RecordingBackend, RecordingBlobStore, RecordingView>;

/// Session over the given doubles with the default policy; returns the view
/// handle so renders can be inspected
#[allow(dead_code)]
pub fn session(backend: RecordingBackend, blobs: RecordingBlobStore) -> (TestSession, RecordingView) {
    session_with_policy(backend, blobs, SyncPolicy::default())
}

#[allow(dead_code)]
pub fn session_with_policy(
    backend: RecordingBackend,
    blobs: RecordingBlobStore,
    policy: SyncPolicy,
) -> (TestSession, RecordingView) {
    let view = RecordingView::new();
    let synchronizer = NoteSynchronizer::with_policy(backend, blobs, policy);
    (NoteSession::new(synchronizer, view.clone()), view)
}
