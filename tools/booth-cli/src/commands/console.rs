//! Admin console wired to the configured services.

use std::sync::Arc;

use booth_backend::{
    HttpMessagingRelay, MessagingRelay, RestBackend, SendOutcome, SendRequest,
};
use booth_common::config::AppConfig;
use booth_common::{BoothError, BoothResult};
use booth_kiosk::AdminConsole;

/// Stands in for the relay when no messaging endpoint is configured.
struct UnconfiguredRelay;

#[async_trait::async_trait]
impl MessagingRelay for UnconfiguredRelay {
    async fn send(&self, _request: &SendRequest) -> BoothResult<SendOutcome> {
        Err(BoothError::config(
            "messaging relay is not configured (set BOOTH_MESSAGING_URL)",
        ))
    }
}

/// Build a console against the REST backend and unlock it with `pin`.
pub async fn open(config: &AppConfig, pin: &str) -> anyhow::Result<AdminConsole> {
    let backend = Arc::new(
        RestBackend::from_config(&config.backend)
            .map_err(|e| anyhow::anyhow!("Backend unavailable: {e}"))?,
    );
    let relay: Arc<dyn MessagingRelay> = match HttpMessagingRelay::from_config(&config.messaging) {
        Ok(relay) => Arc::new(relay),
        Err(e) => {
            tracing::debug!(error = %e, "Messaging relay disabled");
            Arc::new(UnconfiguredRelay)
        }
    };

    let mut console = AdminConsole::new(&config.kiosk, backend.clone(), backend, relay)
        .with_default_caption(config.messaging.default_caption.clone());
    console.unlock(pin).await.map_err(|e| match e {
        BoothError::Locked => anyhow::anyhow!("Incorrect admin PIN"),
        other => anyhow::Error::new(other),
    })?;
    Ok(console)
}
