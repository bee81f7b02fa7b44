//! Error types shared across photobooth crates.

/// Top-level error type for photobooth operations.
#[derive(Debug, thiserror::Error)]
pub enum BoothError {
    #[error("Failed to decode image {reference}: {message}")]
    Decode { reference: String, message: String },

    #[error("Render error: {message}")]
    Render { message: String },

    #[error("Gallery error: {message}")]
    Gallery { message: String },

    #[error("Sticker store error: {message}")]
    Stickers { message: String },

    #[error("Messaging error: {message}")]
    Messaging { message: String },

    #[error("Invalid input: {message}")]
    Validation { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("An export is already in progress")]
    ExportInFlight,

    #[error("Admin console is locked")]
    Locked,

    #[error("Not found: {what}")]
    NotFound { what: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using BoothError.
pub type BoothResult<T> = Result<T, BoothError>;

impl BoothError {
    pub fn decode(reference: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Decode {
            reference: reference.into(),
            message: msg.into(),
        }
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render {
            message: msg.into(),
        }
    }

    pub fn gallery(msg: impl Into<String>) -> Self {
        Self::Gallery {
            message: msg.into(),
        }
    }

    pub fn stickers(msg: impl Into<String>) -> Self {
        Self::Stickers {
            message: msg.into(),
        }
    }

    pub fn messaging(msg: impl Into<String>) -> Self {
        Self::Messaging {
            message: msg.into(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Whether this error came from a remote collaborator rather than local input.
    pub fn is_collaborator_failure(&self) -> bool {
        matches!(
            self,
            Self::Gallery { .. } | Self::Stickers { .. } | Self::Messaging { .. }
        )
    }
}
