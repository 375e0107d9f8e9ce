// src/constants.rs
//
// Application-wide constants shared by the configuration layer and adapters.

/// Directory below the platform config dir holding the config file.
///
/// Used in: `infrastructure/config.rs`
pub const CONFIG_DIR_NAME: &str = "notesync";

/// File name of the TOML configuration.
///
/// Used in: `infrastructure/config.rs`
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Environment variable holding the user-pool session token.
///
/// Tokens are never written to the config file.
///
/// Used in: `infrastructure/config.rs`
pub const ENV_SESSION_TOKEN: &str = "NOTESYNC_TOKEN";

/// Environment variable holding the backend API key.
///
/// Used in: `infrastructure/config.rs`
pub const ENV_API_KEY: &str = "NOTESYNC_API_KEY";

/// Environment variable holding an optional token for the storage service,
/// sent as `Authorization` on uploads and removals. Backend credentials are
/// never sent to the storage host.
///
/// Used in: `infrastructure/config.rs`
pub const ENV_STORAGE_TOKEN: &str = "NOTESYNC_STORAGE_TOKEN";

/// Object key prefix of the storage service's public access level.
///
/// Used in: `infrastructure/config.rs`, `infrastructure/blob.rs`
pub const DEFAULT_STORAGE_PREFIX: &str = "public/";

/// Per-request timeout of the HTTP adapters, in seconds.
///
/// Used in: `infrastructure/config.rs`
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Base of the URLs handed out by the in-memory blob store.
///
/// Used in: `infrastructure/memory.rs`
pub const MEMORY_URL_BASE: &str = "memory://blobs/";
