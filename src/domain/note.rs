// src/domain/note.rs
use crate::domain::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Backend-assigned note identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(pub String);

impl NoteId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Key under which an image lives in the blob store
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StorageKey(String);

impl StorageKey {
    pub fn new(key: impl Into<String>) -> Result<Self, ValidationError> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(ValidationError::EmptyStorageKey);
        }
        Ok(Self(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for StorageKey {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<StorageKey> for String {
    fn from(key: StorageKey) -> Self {
        key.0
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Image attached to a note, at whatever lifecycle stage it is in.
///
/// The backend only ever hands out `Stored` keys. Hydration turns them into
/// `Resolved` (or `Unavailable` when the lookup failed and the batch was
/// allowed to degrade). The key is kept in every variant so the blob can be
/// removed after the displayed value was replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum NoteImage {
    Stored { key: StorageKey },
    Resolved { key: StorageKey, url: String },
    Unavailable { key: StorageKey },
}

impl NoteImage {
    pub fn stored(key: StorageKey) -> Self {
        Self::Stored { key }
    }

    pub fn key(&self) -> &StorageKey {
        match self {
            Self::Stored { key } | Self::Resolved { key, .. } | Self::Unavailable { key } => key,
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Resolved { url, .. } => Some(url),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Note {
    pub id: Option<NoteId>,
    pub name: String,
    pub description: String,
    pub image: Option<NoteImage>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Note {
    /// URL to display for this note's image, if one was resolved.
    ///
    /// Never returns a raw storage key.
    pub fn image_url(&self) -> Option<&str> {
        self.image.as_ref().and_then(NoteImage::url)
    }

    pub fn image_key(&self) -> Option<&StorageKey> {
        self.image.as_ref().map(NoteImage::key)
    }
}

/// Raw image bytes plus the content type they are uploaded with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

impl ImagePayload {
    pub fn new(bytes: Vec<u8>, content_type: impl Into<String>) -> Self {
        Self {
            bytes,
            content_type: content_type.into(),
        }
    }

    /// Build a payload, guessing the content type from the leading bytes.
    pub fn sniffed(bytes: Vec<u8>) -> Self {
        let content_type = sniff_content_type(&bytes);
        Self::new(bytes, content_type)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

fn sniff_content_type(bytes: &[u8]) -> &'static str {
    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n";
    const JPEG: &[u8] = b"\xff\xd8\xff";
    const GIF: &[u8] = b"GIF8";

    if bytes.starts_with(PNG) {
        "image/png"
    } else if bytes.starts_with(JPEG) {
        "image/jpeg"
    } else if bytes.starts_with(GIF) {
        "image/gif"
    } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        "image/webp"
    } else {
        "application/octet-stream"
    }
}

/// Validated input of the create workflow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDraft {
    name: String,
    description: String,
    image: Option<ImagePayload>,
}

impl NoteDraft {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        image: Option<ImagePayload>,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        let description = description.into();

        if name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if description.trim().is_empty() {
            return Err(ValidationError::EmptyDescription);
        }

        Ok(Self {
            name,
            description,
            image,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn image(&self) -> Option<&ImagePayload> {
        self.image.as_ref()
    }

    pub fn into_parts(self) -> (String, String, Option<ImagePayload>) {
        (self.name, self.description, self.image)
    }
}
