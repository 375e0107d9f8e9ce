// src/infrastructure/blob.rs
//! Blob store over plain HTTP object addressing: `{base}/{prefix}{key}`.

use crate::application::BlobStore;
use crate::domain::{ImagePayload, StorageKey, SyncError};
use crate::infrastructure::graphql::{status_error, transport_error, Credentials};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

pub struct HttpBlobStore {
    base_url: Url,
    public_url: Url,
    prefix: String,
    client: reqwest::Client,
}

impl HttpBlobStore {
    /// `public_url` is where readers fetch objects; `None` means the same
    /// host that accepts uploads. `credentials` belong to the storage
    /// service, never to the note backend.
    pub fn new(
        base_url: Url,
        public_url: Option<Url>,
        prefix: impl Into<String>,
        credentials: &Credentials,
        timeout: Duration,
    ) -> Result<Self, SyncError> {
        let client = reqwest::Client::builder()
            .default_headers(credentials.headers()?)
            .timeout(timeout)
            .build()
            .map_err(|e| SyncError::Transient(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            public_url: public_url.unwrap_or_else(|| base_url.clone()),
            base_url,
            prefix: prefix.into(),
            client,
        })
    }

    fn upload_url(&self, key: &StorageKey) -> Result<Url, SyncError> {
        object_url(&self.base_url, &self.prefix, key)
    }

    fn check(key: &StorageKey, status: u16, body: &str) -> Result<(), SyncError> {
        if (200..300).contains(&status) {
            return Ok(());
        }
        Err(match status_error(status, body) {
            SyncError::Backend(message) => SyncError::blob(key, message),
            other => other,
        })
    }
}

/// Address of `key` under `base`, with the key percent-encoded as one path
/// segment
pub fn object_url(base: &Url, prefix: &str, key: &StorageKey) -> Result<Url, SyncError> {
    let base = base.as_str().trim_end_matches('/');
    let address = format!("{base}/{prefix}{}", urlencoding::encode(key.as_str()));
    Url::parse(&address).map_err(|e| SyncError::blob(key, format!("Invalid object URL '{address}': {e}")))
}

#[async_trait]
impl BlobStore for HttpBlobStore {
    async fn get(&self, key: &StorageKey) -> Result<String, SyncError> {
        Ok(object_url(&self.public_url, &self.prefix, key)?.to_string())
    }

    #[instrument(level = "debug", skip(self, payload), fields(bytes = payload.len()))]
    async fn put(&self, key: &StorageKey, payload: ImagePayload) -> Result<(), SyncError> {
        let url = self.upload_url(key)?;
        let response = self
            .client
            .put(url)
            .header(CONTENT_TYPE, payload.content_type)
            .body(payload.bytes)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Self::check(key, status, &body)?;
        debug!(%key, "Uploaded object");
        Ok(())
    }

    #[instrument(level = "debug", skip(self))]
    async fn remove(&self, key: &StorageKey) -> Result<(), SyncError> {
        let url = self.upload_url(key)?;
        let response = self.client.delete(url).send().await.map_err(transport_error)?;

        let status = response.status().as_u16();
        if status == 404 {
            debug!(%key, "Object already gone");
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Self::check(key, status, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Accept one request, answer 200 and hand back its lowercased head
    async fn capture_request_head(listener: TcpListener) -> String {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut head = Vec::new();
        let mut buf = [0u8; 1024];
        while !head.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            head.extend_from_slice(&buf[..n]);
        }
        stream
            .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 0\r\nconnection: close\r\n\r\n")
            .await
            .unwrap();
        String::from_utf8_lossy(&head).to_lowercase()
    }

    async fn store_against(listener: &TcpListener, credentials: &Credentials) -> HttpBlobStore {
        let base = Url::parse(&format!("http://{}", listener.local_addr().unwrap())).unwrap();
        HttpBlobStore::new(base, None, "public/", credentials, Duration::from_secs(5)).unwrap()
    }

    fn key(k: &str) -> StorageKey {
        StorageKey::new(k).unwrap()
    }

    #[test]
    fn given_base_with_trailing_slash_when_addressing_then_no_double_slash() {
        let base = Url::parse("https://bucket.example.com/").unwrap();

        let url = object_url(&base, "public/", &key("trip")).unwrap();

        assert_eq!(url.as_str(), "https://bucket.example.com/public/trip");
    }

    #[test]
    fn given_key_with_reserved_characters_when_addressing_then_encodes_as_one_segment() {
        let base = Url::parse("https://bucket.example.com").unwrap();

        let url = object_url(&base, "public/", &key("trip/day 1?")).unwrap();

        assert_eq!(url.as_str(), "https://bucket.example.com/public/trip%2Fday%201%3F");
    }

    #[test]
    fn given_empty_prefix_when_addressing_then_key_follows_base() {
        let base = Url::parse("https://cdn.example.com/notes").unwrap();

        let url = object_url(&base, "", &key("trip")).unwrap();

        assert_eq!(url.as_str(), "https://cdn.example.com/notes/trip");
    }

    #[tokio::test]
    async fn given_public_url_when_getting_then_resolves_against_public_host() {
        let store = HttpBlobStore::new(
            Url::parse("https://upload.example.com").unwrap(),
            Some(Url::parse("https://cdn.example.com").unwrap()),
            "public/",
            &Credentials::Anonymous,
            Duration::from_secs(1),
        )
        .unwrap();

        let url = store.get(&key("trip")).await.unwrap();

        assert_eq!(url, "https://cdn.example.com/public/trip");
    }

    #[tokio::test]
    async fn given_anonymous_storage_credentials_when_uploading_then_sends_no_auth_headers() {
        // Arrange
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let store = store_against(&listener, &Credentials::Anonymous).await;
        let server = tokio::spawn(capture_request_head(listener));

        // Act
        store
            .put(&key("trip"), ImagePayload::new(vec![1, 2, 3], "image/png"))
            .await
            .unwrap();

        // Assert
        let head = server.await.unwrap();
        assert!(head.starts_with("put /public/trip "));
        assert!(!head.contains("x-api-key"));
        assert!(!head.contains("authorization"));
    }

    #[tokio::test]
    async fn given_storage_token_when_removing_then_sends_it_as_authorization() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let credentials = Credentials::SessionToken("bucket-token".to_string());
        let store = store_against(&listener, &credentials).await;
        let server = tokio::spawn(capture_request_head(listener));

        store.remove(&key("trip")).await.unwrap();

        let head = server.await.unwrap();
        assert!(head.starts_with("delete /public/trip "));
        assert!(head.contains("authorization: bucket-token"));
    }

    #[test]
    fn given_client_error_status_when_checking_then_maps_to_blob_error() {
        let result = HttpBlobStore::check(&key("trip"), 400, "bad request");
        assert!(matches!(result, Err(SyncError::BlobStore { key, .. }) if key == "trip"));
    }

    #[test]
    fn given_forbidden_status_when_checking_then_maps_to_unauthorized() {
        let result = HttpBlobStore::check(&key("trip"), 403, "");
        assert!(matches!(result, Err(SyncError::Unauthorized(_))));
    }
}
