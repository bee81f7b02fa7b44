//! Messaging relay: sends an image to a phone number.

use std::sync::Mutex;
use std::time::Duration;

use booth_common::config::MessagingConfig;
use booth_common::{BoothError, BoothResult};
use booth_model::image_ref::{ImageRef, ImageRefKind};
use booth_model::recipient::RecipientNumber;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const REQUEST_TIMEOUT_SECS: u64 = 60;
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Image to deliver: a public URL, or inline data the relay re-hosts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ImageReference {
    Url(String),
    /// A base64 data URL.
    Inline(String),
}

impl ImageReference {
    pub fn inline(mime: &str, bytes: &[u8]) -> Self {
        Self::Inline(ImageRef::from_bytes(mime, bytes).as_str().to_string())
    }

    /// URLs and data URLs map directly; other references must be read first.
    pub fn from_image_ref(reference: &ImageRef) -> BoothResult<Self> {
        match reference.kind() {
            ImageRefKind::Remote => Ok(Self::Url(reference.as_str().trim().to_string())),
            ImageRefKind::DataUrl => Ok(Self::Inline(reference.as_str().to_string())),
            _ => Err(BoothError::validation(format!(
                "{} is not a URL or inline image",
                reference.describe()
            ))),
        }
    }

    /// Loggable form; inline payloads are elided.
    pub fn describe(&self) -> String {
        match self {
            Self::Url(url) => url.clone(),
            Self::Inline(data) => format!("<inline image, {} bytes>", data.len()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SendRequest {
    pub recipient: RecipientNumber,
    pub image: ImageReference,
    pub caption: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SendOutcome {
    pub success: bool,
    pub provider_response: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Success,
    Failed,
}

/// Log entry for one send attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentMessage {
    pub recipient: RecipientNumber,
    pub image_ref: String,
    pub caption: String,
    pub status: MessageStatus,
    pub error: Option<String>,
    pub sent_at: DateTime<Utc>,
}

impl SentMessage {
    /// Record an attempt, whether it reached the provider or not.
    pub fn record(request: &SendRequest, result: &BoothResult<SendOutcome>) -> Self {
        let (status, error) = match result {
            Ok(outcome) if outcome.success => (MessageStatus::Success, None),
            Ok(outcome) => (MessageStatus::Failed, Some(outcome.provider_response.to_string())),
            Err(e) => (MessageStatus::Failed, Some(e.to_string())),
        };
        Self {
            recipient: request.recipient.clone(),
            image_ref: request.image.describe(),
            caption: request.caption.clone(),
            status,
            error,
            sent_at: Utc::now(),
        }
    }
}

/// Delivers images to phone numbers.
///
/// `Ok` carries the provider's verdict; `Err` means the request never got one.
#[async_trait::async_trait]
pub trait MessagingRelay: Send + Sync {
    async fn send(&self, request: &SendRequest) -> BoothResult<SendOutcome>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RelayBody<'a> {
    recipient_number: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_base64: Option<&'a str>,
    caption: &'a str,
}

impl<'a> RelayBody<'a> {
    fn new(request: &'a SendRequest) -> Self {
        let (image_url, image_base64) = match &request.image {
            ImageReference::Url(url) => (Some(url.as_str()), None),
            ImageReference::Inline(data) => (None, Some(data.as_str())),
        };
        Self {
            recipient_number: request.recipient.digits(),
            image_url,
            image_base64,
            caption: &request.caption,
        }
    }
}

/// Relay reached over HTTP with a bearer token.
pub struct HttpMessagingRelay {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpMessagingRelay {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> BoothResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| BoothError::config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
            api_key,
        })
    }

    pub fn from_config(config: &MessagingConfig) -> BoothResult<Self> {
        let endpoint = config
            .endpoint
            .clone()
            .ok_or_else(|| BoothError::config("messaging endpoint is not configured"))?;
        Self::new(endpoint, config.api_key.clone())
    }
}

#[async_trait::async_trait]
impl MessagingRelay for HttpMessagingRelay {
    async fn send(&self, request: &SendRequest) -> BoothResult<SendOutcome> {
        let mut builder = self.http.post(&self.endpoint).json(&RelayBody::new(request));
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::error!(
                recipient = %request.recipient,
                image = %request.image.describe(),
                caption = %request.caption,
                error = %e,
                "Messaging relay unreachable"
            );
            BoothError::messaging(e.to_string())
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| BoothError::messaging(e.to_string()))?;
        let provider_response =
            serde_json::from_str(&text).unwrap_or_else(|_| Value::String(text.clone()));
        let success = status.is_success()
            && provider_response
                .get("success")
                .and_then(Value::as_bool)
                .unwrap_or(true);

        if success {
            tracing::info!(
                recipient = %request.recipient,
                image = %request.image.describe(),
                caption = %request.caption,
                status = status.as_u16(),
                "Image sent"
            );
        } else {
            tracing::warn!(
                recipient = %request.recipient,
                image = %request.image.describe(),
                caption = %request.caption,
                status = status.as_u16(),
                response = %provider_response,
                "Messaging relay rejected send"
            );
        }

        Ok(SendOutcome {
            success,
            provider_response,
        })
    }
}

/// Relay that records requests instead of sending them.
#[derive(Default)]
pub struct MemoryMessagingRelay {
    sent: Mutex<Vec<SendRequest>>,
    reject_with: Mutex<Option<String>>,
}

impl MemoryMessagingRelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject following sends with this provider error, or accept again with `None`.
    pub fn reject_with(&self, error: Option<&str>) {
        if let Ok(mut slot) = self.reject_with.lock() {
            *slot = error.map(str::to_string);
        }
    }

    pub fn sent(&self) -> Vec<SendRequest> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl MessagingRelay for MemoryMessagingRelay {
    async fn send(&self, request: &SendRequest) -> BoothResult<SendOutcome> {
        self.sent
            .lock()
            .map_err(|_| BoothError::messaging("relay poisoned"))?
            .push(request.clone());
        let rejection = self.reject_with.lock().ok().and_then(|r| r.clone());
        Ok(match rejection {
            Some(error) => SendOutcome {
                success: false,
                provider_response: serde_json::json!({ "error": error }),
            },
            None => SendOutcome {
                success: true,
                provider_response: serde_json::json!({ "success": true }),
            },
        })
    }
}
