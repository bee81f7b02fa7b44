//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Remote photo/sticker store.
    pub backend: BackendConfig,

    /// Messaging relay used by the admin console and kiosk delivery.
    pub messaging: MessagingConfig,

    /// Kiosk behaviour.
    pub kiosk: KioskConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Remote store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the storage/row API (e.g. `https://project.example.co`).
    pub base_url: Option<String>,

    /// API key sent as both `apikey` and bearer token.
    pub api_key: Option<String>,

    /// Storage bucket and row table holding composites.
    pub photos_bucket: String,

    /// Storage bucket holding uploaded sticker files.
    pub stickers_bucket: String,

    /// Row table holding custom sticker metadata.
    pub stickers_table: String,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

/// Messaging relay settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MessagingConfig {
    /// Relay endpoint accepting image send requests.
    pub endpoint: Option<String>,

    /// Bearer token for the relay.
    pub api_key: Option<String>,

    /// Caption used when the caller does not provide one.
    pub default_caption: String,
}

/// Kiosk behaviour settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KioskConfig {
    /// PIN unlocking the admin console.
    pub admin_pin: String,

    /// Seconds the save confirmation stays up before returning home.
    pub confirmation_secs: u64,

    /// Photos per admin gallery page.
    pub gallery_page_size: u32,

    /// Frame color preselected in the editor.
    pub default_frame_color: String,

    /// Layout preselected on the home screen (`postcard` or `strips`).
    pub default_layout: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "booth=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: None,
            photos_bucket: "photos".to_string(),
            stickers_bucket: "stickers".to_string(),
            stickers_table: "custom_stickers".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            default_caption: String::new(),
        }
    }
}

impl Default for KioskConfig {
    fn default() -> Self {
        Self {
            admin_pin: "1234".to_string(),
            confirmation_secs: 15,
            gallery_page_size: 20,
            default_frame_color: "#ffffff".to_string(),
            default_layout: "postcard".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults,
    /// then apply environment overrides.
    pub fn load() -> Self {
        let config_path = config_file_path();
        let mut config = Self::default();
        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(parsed) => config = parsed,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }

    /// Apply `BOOTH_*` overrides from the given lookup (normally the environment).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("BOOTH_BACKEND_URL") {
            self.backend.base_url = Some(url);
        }
        if let Some(key) = lookup("BOOTH_BACKEND_KEY") {
            self.backend.api_key = Some(key);
        }
        if let Some(url) = lookup("BOOTH_MESSAGING_URL") {
            self.messaging.endpoint = Some(url);
        }
        if let Some(key) = lookup("BOOTH_MESSAGING_KEY") {
            self.messaging.api_key = Some(key);
        }
        if let Some(pin) = lookup("BOOTH_ADMIN_PIN") {
            self.kiosk.admin_pin = pin;
        }
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("photobooth").join("config.json")
}
