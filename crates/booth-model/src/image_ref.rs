//! References to image bytes.

use std::fmt;
use std::path::Path;

use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};
use booth_common::{BoothError, BoothResult};
use serde::{Deserialize, Serialize};

/// How an [`ImageRef`] resolves to bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageRefKind {
    /// `data:<mime>;base64,<payload>`
    DataUrl,
    /// `http://` or `https://`
    Remote,
    /// Anything else is treated as a local path.
    Path,
    /// Empty reference: an unfilled photo slot.
    Blank,
}

/// Opaque reference to an image: a data URL, a remote URL or a local path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Empty slot marker.
    pub fn blank() -> Self {
        Self(String::new())
    }

    /// Inline bytes as a base64 data URL.
    pub fn from_bytes(mime: &str, bytes: &[u8]) -> Self {
        Self(format!("data:{mime};base64,{}", BASE64_STANDARD.encode(bytes)))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Self {
        Self(path.as_ref().to_string_lossy().into_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub fn kind(&self) -> ImageRefKind {
        let s = self.0.trim();
        if s.is_empty() {
            ImageRefKind::Blank
        } else if s.starts_with("data:") {
            ImageRefKind::DataUrl
        } else if s.starts_with("http://") || s.starts_with("https://") {
            ImageRefKind::Remote
        } else {
            ImageRefKind::Path
        }
    }

    /// Short form for logs; data URLs are elided to their header.
    pub fn describe(&self) -> String {
        match self.kind() {
            ImageRefKind::DataUrl => {
                let header = self.0.split(',').next().unwrap_or("data:");
                format!("{header},<{} bytes>", self.0.len())
            }
            ImageRefKind::Blank => "<blank>".to_string(),
            _ => self.0.clone(),
        }
    }

    /// Decode a base64 data URL into its MIME type and payload.
    pub fn decode_data_url(&self) -> BoothResult<(String, Vec<u8>)> {
        let s = self.0.trim();
        let rest = s
            .strip_prefix("data:")
            .ok_or_else(|| BoothError::decode(self.describe(), "not a data URL"))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| BoothError::decode(self.describe(), "data URL has no payload"))?;
        let mime = header
            .strip_suffix(";base64")
            .ok_or_else(|| BoothError::decode(self.describe(), "only base64 data URLs are supported"))?;
        let bytes = BASE64_STANDARD
            .decode(payload)
            .map_err(|e| BoothError::decode(self.describe(), e.to_string()))?;
        Ok((mime.to_string(), bytes))
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

impl From<&str> for ImageRef {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ImageRef {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_detection() {
        assert_eq!(ImageRef::new("data:image/png;base64,AAAA").kind(), ImageRefKind::DataUrl);
        assert_eq!(ImageRef::new("https://cdn.example/x.png").kind(), ImageRefKind::Remote);
        assert_eq!(ImageRef::new("/tmp/photo.jpg").kind(), ImageRefKind::Path);
        assert_eq!(ImageRef::new("  ").kind(), ImageRefKind::Blank);
        assert!(ImageRef::blank().is_blank());
    }

    #[test]
    fn test_data_url_roundtrip() {
        let r = ImageRef::from_bytes("image/png", &[1, 2, 3, 250]);
        let (mime, bytes) = r.decode_data_url().unwrap();
        assert_eq!(mime, "image/png");
        assert_eq!(bytes, vec![1, 2, 3, 250]);
    }

    #[test]
    fn test_bad_data_url_is_decode_error() {
        let err = ImageRef::new("data:image/png;base64,@@@").decode_data_url().unwrap_err();
        assert!(matches!(err, BoothError::Decode { .. }));
        let err = ImageRef::new("data:image/svg+xml,<svg/>").decode_data_url().unwrap_err();
        assert!(matches!(err, BoothError::Decode { .. }));
    }

    #[test]
    fn test_describe_elides_payload() {
        let r = ImageRef::from_bytes("image/jpeg", &[0u8; 64]);
        let d = r.describe();
        assert!(d.starts_with("data:image/jpeg;base64,<"));
        assert!(!d.contains("AAAA"));
    }
}
