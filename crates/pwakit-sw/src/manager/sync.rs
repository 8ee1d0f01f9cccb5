//! Background sync requests and messages to the active worker.

use super::PwaManager;
use crate::error::{PwaError, PwaResult};
use tracing::{error, info, warn};

impl PwaManager {
    /// Register `tag` for background sync on the ready registration.
    ///
    /// Silently does nothing when the worker container or background sync
    /// is unsupported.
    pub async fn request_background_sync(&self, tag: &str) -> PwaResult<()> {
        let container = match self.capabilities.service_worker.as_ref() {
            Some(container) if self.capabilities.background_sync => container,
            _ => {
                warn!("Background sync not supported");
                return Ok(());
            }
        };

        let registration = container.ready().await.map_err(|e| {
            error!(error = %e, tag, "Background sync registration failed");
            PwaError::SyncRegistration(e)
        })?;

        let Some(sync) = registration.sync_manager() else {
            warn!("Background sync not available");
            return Ok(());
        };

        match sync.register(tag).await {
            Ok(()) => {
                info!(tag, "Background sync registered");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, tag, "Background sync registration failed");
                Err(PwaError::SyncRegistration(e))
            }
        }
    }

    /// Post `message` to the active worker of the ready registration.
    ///
    /// Best effort: failures are logged, never returned.
    pub async fn send_message_to_service_worker(&self, message: &serde_json::Value) {
        let Some(container) = self.capabilities.service_worker.as_ref() else {
            return;
        };

        let registration = match container.ready().await {
            Ok(registration) => registration,
            Err(e) => {
                error!(error = %e, "Failed to send message to service worker");
                return;
            }
        };

        if !registration.has_active() {
            return;
        }
        if let Err(e) = registration.post_message(message) {
            error!(error = %e, "Failed to send message to service worker");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlatformError;
    use crate::sim::SimulatedPlatform;
    use pwakit_common::PwaConfig;
    use serde_json::json;
    use std::sync::Arc;

    fn setup(background_sync: bool) -> (SimulatedPlatform, Arc<PwaManager>) {
        let platform = SimulatedPlatform::new();
        let caps = platform.capabilities().with_background_sync(background_sync);
        let manager = PwaManager::new(caps, PwaConfig::default());
        (platform, manager)
    }

    #[tokio::test]
    async fn test_sync_unsupported_is_noop() {
        let (platform, manager) = setup(false);
        manager.register().await.unwrap();

        manager.request_background_sync("test-tag").await.unwrap();

        assert!(platform.sync().tags().is_empty());
    }

    #[tokio::test]
    async fn test_sync_registers_tag() {
        let (platform, manager) = setup(true);
        manager.register().await.unwrap();

        manager.request_background_sync("outbox").await.unwrap();

        assert_eq!(platform.sync().tags(), vec!["outbox"]);
    }

    #[tokio::test]
    async fn test_sync_without_ready_registration() {
        let (_platform, manager) = setup(true);

        let err = manager.request_background_sync("outbox").await.unwrap_err();
        assert!(matches!(err, PwaError::SyncRegistration(_)));
    }

    #[tokio::test]
    async fn test_sync_failure() {
        let (platform, manager) = setup(true);
        manager.register().await.unwrap();
        platform
            .sync()
            .fail_register(PlatformError::InvalidState("quota".into()));

        let err = manager.request_background_sync("outbox").await.unwrap_err();
        assert!(matches!(
            err,
            PwaError::SyncRegistration(PlatformError::InvalidState(_))
        ));
    }

    #[tokio::test]
    async fn test_send_message() {
        let (platform, manager) = setup(false);
        manager
            .send_message_to_service_worker(&json!({"type": "SKIP_WAITING"}))
            .await;
        assert!(platform.container().messages().is_empty());

        manager.register().await.unwrap();
        manager
            .send_message_to_service_worker(&json!({"type": "SKIP_WAITING"}))
            .await;

        assert_eq!(
            platform.container().messages(),
            vec![json!({"type": "SKIP_WAITING"})]
        );
    }
}
