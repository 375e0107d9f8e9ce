// src/application/policy.rs
use crate::domain::{StorageKey, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What happens to a listing when one image lookup fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HydrationPolicy {
    /// Any failed lookup fails the whole listing
    FailFast,
    /// A failed lookup marks only that note's image unavailable
    #[default]
    Degrade,
}

/// What happens to an uploaded image when the create mutation fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CreateCompensation {
    #[default]
    RemoveUpload,
    None,
}

/// What happens to a deletion when removing its blob fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlobCleanup {
    /// Stop before deleting the record and roll the list back
    Abort,
    /// Log the failure and delete the record anyway
    #[default]
    BestEffort,
}

/// How the storage key of a new image is chosen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyStrategy {
    /// The note name is the key
    #[default]
    Name,
    /// A fresh opaque key, independent of the name
    Generated,
}

impl KeyStrategy {
    pub fn key_for(&self, name: &str) -> Result<StorageKey, ValidationError> {
        match self {
            Self::Name => StorageKey::new(name),
            Self::Generated => StorageKey::new(Uuid::new_v4().to_string()),
        }
    }

    /// Key the image of an existing note is stored under.
    ///
    /// `Name` ignores the record's stored value and addresses the blob by
    /// `name`; `Generated` trusts the stored key.
    pub fn existing_key(&self, name: &str, stored: &StorageKey) -> StorageKey {
        match self {
            Self::Name => StorageKey::new(name).unwrap_or_else(|_| stored.clone()),
            Self::Generated => stored.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct SyncPolicy {
    #[serde(default)]
    pub hydration: HydrationPolicy,
    #[serde(default)]
    pub create_compensation: CreateCompensation,
    #[serde(default)]
    pub blob_cleanup: BlobCleanup,
    #[serde(default)]
    pub key_strategy: KeyStrategy,
}

impl SyncPolicy {
    /// Behaviour of the hosted web client this crate replaces: all-or-nothing
    /// hydration, no compensation, key derived from the name.
    pub fn legacy() -> Self {
        Self {
            hydration: HydrationPolicy::FailFast,
            create_compensation: CreateCompensation::None,
            blob_cleanup: BlobCleanup::Abort,
            key_strategy: KeyStrategy::Name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_name_strategy_when_deriving_key_then_uses_name() {
        let key = KeyStrategy::Name.key_for("trip").unwrap();
        assert_eq!(key.as_str(), "trip");
    }

    #[test]
    fn given_generated_strategy_when_deriving_keys_then_ignores_name_and_differs() {
        let first = KeyStrategy::Generated.key_for("trip").unwrap();
        let second = KeyStrategy::Generated.key_for("trip").unwrap();

        assert_ne!(first.as_str(), "trip");
        assert_ne!(first, second);
    }

    #[test]
    fn given_name_strategy_when_resolving_existing_key_then_ignores_stored_value() {
        let stored = StorageKey::new("photo.png").unwrap();

        let key = KeyStrategy::Name.existing_key("trip", &stored);

        assert_eq!(key.as_str(), "trip");
    }

    #[test]
    fn given_generated_strategy_when_resolving_existing_key_then_keeps_stored_value() {
        let stored = StorageKey::new("7f1c2d").unwrap();

        let key = KeyStrategy::Generated.existing_key("trip", &stored);

        assert_eq!(key, stored);
    }

    #[test]
    fn given_default_policy_then_degrades_and_compensates() {
        let policy = SyncPolicy::default();
        assert_eq!(policy.hydration, HydrationPolicy::Degrade);
        assert_eq!(policy.create_compensation, CreateCompensation::RemoveUpload);
        assert_eq!(policy.blob_cleanup, BlobCleanup::BestEffort);
        assert_eq!(policy.key_strategy, KeyStrategy::Name);
    }
}
