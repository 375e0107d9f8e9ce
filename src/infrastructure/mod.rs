// src/infrastructure/mod.rs
pub mod blob;
pub mod config;
pub mod graphql;
pub mod memory;

pub use blob::HttpBlobStore;
pub use config::Config;
pub use graphql::{Credentials, GraphqlBackend};
pub use memory::{MemoryBackend, MemoryBlobStore};
