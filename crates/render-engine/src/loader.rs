//! Fetching image bytes for photos and custom stickers.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use booth_common::{BoothError, BoothResult};
use booth_model::image_ref::{ImageRef, ImageRefKind};

const REQUEST_TIMEOUT_SECS: u64 = 30;
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Resolves an [`ImageRef`] to encoded image bytes.
#[async_trait::async_trait]
pub trait SourceLoader: Send + Sync {
    async fn load(&self, reference: &ImageRef) -> BoothResult<Vec<u8>>;
}

/// Loader for data URLs, `http(s)` URLs and local paths.
pub struct HttpSourceLoader {
    http: reqwest::Client,
}

impl HttpSourceLoader {
    pub fn new() -> BoothResult<Self> {
        Self::with_timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
    }

    pub fn with_timeout(timeout: Duration) -> BoothResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| BoothError::config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { http })
    }

    async fn fetch(&self, reference: &ImageRef) -> BoothResult<Vec<u8>> {
        let url = reference.as_str().trim();
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| BoothError::decode(reference.describe(), e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(BoothError::decode(
                reference.describe(),
                format!("HTTP {}", status.as_u16()),
            ));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| BoothError::decode(reference.describe(), e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

#[async_trait::async_trait]
impl SourceLoader for HttpSourceLoader {
    async fn load(&self, reference: &ImageRef) -> BoothResult<Vec<u8>> {
        match reference.kind() {
            ImageRefKind::DataUrl => reference.decode_data_url().map(|(_, bytes)| bytes),
            ImageRefKind::Remote => self.fetch(reference).await,
            ImageRefKind::Path => tokio::fs::read(reference.as_str().trim())
                .await
                .map_err(|e| BoothError::decode(reference.describe(), e.to_string())),
            ImageRefKind::Blank => Err(BoothError::decode("<blank>", "empty image reference")),
        }
    }
}

/// In-memory loader keyed by reference string. Data URLs decode inline.
///
/// Records every request so callers can check load order.
#[derive(Default)]
pub struct MemorySourceLoader {
    entries: HashMap<String, Vec<u8>>,
    requests: Mutex<Vec<String>>,
}

impl MemorySourceLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, bytes: Vec<u8>) {
        self.entries.insert(key.into(), bytes);
    }

    pub fn with(mut self, key: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.insert(key, bytes);
        self
    }

    /// References requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl SourceLoader for MemorySourceLoader {
    async fn load(&self, reference: &ImageRef) -> BoothResult<Vec<u8>> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(reference.as_str().to_string());
        }
        if reference.kind() == ImageRefKind::DataUrl {
            return reference.decode_data_url().map(|(_, bytes)| bytes);
        }
        self.entries
            .get(reference.as_str())
            .cloned()
            .ok_or_else(|| BoothError::decode(reference.describe(), "no such image"))
    }
}
