//! Where image bytes come from
//!
//! References starting with `http://` or `https://` are downloaded; anything
//! else is read from the filesystem.

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures_util::StreamExt;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use vismatch_core::Error;
use vismatch_extract::MAX_IMAGE_BYTES;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("download failed: {0}")]
    DownloadFailed(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("access denied: {0}")]
    AccessDenied(String),
}

impl From<FetchError> for Error {
    fn from(e: FetchError) -> Self {
        match e {
            FetchError::DownloadFailed(msg) => Error::DownloadFailed(msg),
            FetchError::Timeout(after) => Error::Timeout(after),
            FetchError::AccessDenied(msg) => Error::AccessDenied(msg),
        }
    }
}

/// Supplies raw bytes for an image reference (path or URL)
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn fetch(&self, image_ref: &str) -> Result<Bytes, FetchError>;
}

fn is_remote(image_ref: &str) -> bool {
    image_ref.starts_with("http://") || image_ref.starts_with("https://")
}

/// Reads images from disk, resolving relative paths against an optional root
#[derive(Debug, Clone, Default)]
pub struct FileImageSource {
    root: Option<PathBuf>,
}

impl FileImageSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: Some(root.into()) }
    }

    fn resolve(&self, image_ref: &str) -> PathBuf {
        let path = PathBuf::from(image_ref.strip_prefix("file://").unwrap_or(image_ref));
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path,
        }
    }
}

#[async_trait]
impl ImageSource for FileImageSource {
    async fn fetch(&self, image_ref: &str) -> Result<Bytes, FetchError> {
        let path = self.resolve(image_ref);
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == ErrorKind::PermissionDenied => {
                Err(FetchError::AccessDenied(format!("{}: {}", path.display(), e)))
            }
            Err(e) => Err(FetchError::DownloadFailed(format!("{}: {}", path.display(), e))),
        }
    }
}

/// Downloads images over HTTP(S).
///
/// Bodies larger than `max_bytes` (the decoder's [`MAX_IMAGE_BYTES`] by
/// default) are rejected from the `Content-Length` header when present and
/// otherwise cut off while streaming.
#[derive(Debug, Clone)]
pub struct HttpImageSource {
    client: reqwest::Client,
    timeout: Duration,
    max_bytes: usize,
}

impl HttpImageSource {
    pub fn new(timeout: Duration) -> vismatch_core::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("vismatch/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| Error::InvalidConfig(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            timeout,
            max_bytes: MAX_IMAGE_BYTES,
        })
    }

    #[must_use]
    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    fn transfer_error(&self, image_ref: &str, e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout(self.timeout)
        } else {
            FetchError::DownloadFailed(format!("{}: {}", image_ref, e))
        }
    }

    fn too_large(&self, image_ref: &str, size: u64) -> FetchError {
        FetchError::DownloadFailed(format!(
            "{}: body of {} bytes exceeds the {} byte limit",
            image_ref, size, self.max_bytes
        ))
    }
}

#[async_trait]
impl ImageSource for HttpImageSource {
    async fn fetch(&self, image_ref: &str) -> Result<Bytes, FetchError> {
        let response = self
            .client
            .get(image_ref)
            .send()
            .await
            .map_err(|e| self.transfer_error(image_ref, e))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(FetchError::AccessDenied(format!("{}: HTTP {}", image_ref, status)));
        }
        if !status.is_success() {
            return Err(FetchError::DownloadFailed(format!("{}: HTTP {}", image_ref, status)));
        }

        let limit = self.max_bytes as u64;
        if let Some(length) = response.content_length() {
            if length > limit {
                return Err(self.too_large(image_ref, length));
            }
        }

        let mut body = BytesMut::new();
        let mut chunks = response.bytes_stream();
        while let Some(chunk) = chunks.next().await {
            let chunk = chunk.map_err(|e| self.transfer_error(image_ref, e))?;
            let received = (body.len() + chunk.len()) as u64;
            if received > limit {
                return Err(self.too_large(image_ref, received));
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body.freeze())
    }
}

/// Routes URLs to HTTP and everything else to the filesystem
#[derive(Debug, Clone)]
pub struct DefaultImageSource {
    files: FileImageSource,
    http: HttpImageSource,
}

impl DefaultImageSource {
    pub fn new(files: FileImageSource, http: HttpImageSource) -> Self {
        Self { files, http }
    }
}

#[async_trait]
impl ImageSource for DefaultImageSource {
    async fn fetch(&self, image_ref: &str) -> Result<Bytes, FetchError> {
        if is_remote(image_ref) {
            self.http.fetch(image_ref).await
        } else {
            self.files.fetch(image_ref).await
        }
    }
}

/// In-memory images keyed by reference, with optional artificial latency
#[derive(Debug, Default)]
pub struct MemoryImageSource {
    images: RwLock<HashMap<String, Bytes>>,
    latency: Option<Duration>,
}

impl MemoryImageSource {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn insert(&self, image_ref: impl Into<String>, bytes: impl Into<Bytes>) {
        self.images.write().insert(image_ref.into(), bytes.into());
    }
}

#[async_trait]
impl ImageSource for MemoryImageSource {
    async fn fetch(&self, image_ref: &str) -> Result<Bytes, FetchError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.images
            .read()
            .get(image_ref)
            .cloned()
            .ok_or_else(|| FetchError::DownloadFailed(format!("{}: not found", image_ref)))
    }
}
