//! Reactive facade for the presentation layer.
//!
//! A mounted [`PwaFacade`] keeps a local copy of the manager state and
//! refreshes it from notifications. Dropping it removes every listener it
//! registered.

use crate::error::PwaResult;
use crate::manager::{CacheInfo, OnlineSubscription, PwaManager};
use crate::notification::PwaNotification;
use crate::platform::InstallPromptToken;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tracing::debug;

/// State exposed to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PwaStatus {
    pub is_installed: bool,
    pub is_online: bool,
    pub can_install: bool,
}

pub struct PwaFacade {
    manager: Arc<PwaManager>,
    notifications: broadcast::Receiver<PwaNotification>,
    is_online: Arc<AtomicBool>,
    can_install: bool,
    _online_subscription: OnlineSubscription,
}

impl PwaFacade {
    /// Mount against `manager`, subscribing to its notifications.
    pub fn mount(manager: Arc<PwaManager>) -> Self {
        let notifications = manager.subscribe();
        let is_online = Arc::new(AtomicBool::new(manager.is_online()));
        let online_subscription = {
            let is_online = Arc::clone(&is_online);
            manager.add_online_status_listener(move |online| is_online.store(online, Ordering::SeqCst))
        };
        let can_install = manager.can_install();

        Self {
            manager,
            notifications,
            is_online,
            can_install,
            _online_subscription: online_subscription,
        }
    }

    pub fn manager(&self) -> &Arc<PwaManager> {
        &self.manager
    }

    /// Current state. `is_installed` is queried from the platform each time.
    pub fn status(&self) -> PwaStatus {
        PwaStatus {
            is_installed: self.manager.is_installed(),
            is_online: self.is_online.load(Ordering::SeqCst),
            can_install: self.can_install,
        }
    }

    /// Apply every pending notification without waiting. Returns whether
    /// any was applied.
    pub fn refresh(&mut self) -> bool {
        let mut changed = false;
        loop {
            match self.notifications.try_recv() {
                Ok(notification) => {
                    self.apply(notification);
                    changed = true;
                }
                Err(TryRecvError::Lagged(skipped)) => {
                    self.resync(skipped);
                    changed = true;
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => return changed,
            }
        }
    }

    /// Wait for the next notification and apply it.
    pub async fn changed(&mut self) -> PwaStatus {
        match self.notifications.recv().await {
            Ok(notification) => self.apply(notification),
            Err(RecvError::Lagged(skipped)) => self.resync(skipped),
            Err(RecvError::Closed) => {}
        }
        self.status()
    }

    fn apply(&mut self, notification: PwaNotification) {
        match notification {
            PwaNotification::InstallabilityChanged { can_install } => {
                self.can_install = can_install;
            }
            PwaNotification::OnlineStatusChanged { is_online } => {
                self.is_online.store(is_online, Ordering::SeqCst);
                self.can_install = self.manager.can_install();
            }
        }
    }

    fn resync(&mut self, skipped: u64) {
        debug!(skipped, "Notifications lagged, resyncing from manager");
        self.is_online.store(self.manager.is_online(), Ordering::SeqCst);
        self.can_install = self.manager.can_install();
    }

    // ==================== Bound Operations ====================

    pub fn install_prompt(&self) -> Option<InstallPromptToken> {
        self.manager.install_prompt()
    }

    pub async fn register_service_worker(&self) -> PwaResult<()> {
        self.manager.register().await
    }

    pub async fn unregister_service_worker(&self) -> PwaResult<()> {
        self.manager.unregister().await
    }

    pub async fn update_service_worker(&self) -> PwaResult<()> {
        self.manager.update().await
    }

    pub async fn show_install_prompt(&self) -> bool {
        self.manager.show_install_prompt().await
    }

    pub async fn check_for_updates(&self) -> bool {
        self.manager.check_for_updates().await
    }

    pub async fn request_background_sync(&self, tag: &str) -> PwaResult<()> {
        self.manager.request_background_sync(tag).await
    }

    pub async fn send_message_to_service_worker(&self, message: &serde_json::Value) {
        self.manager.send_message_to_service_worker(message).await
    }

    pub async fn get_cache_info(&self) -> Vec<CacheInfo> {
        self.manager.get_cache_info().await
    }

    pub async fn clear_all_caches(&self) -> PwaResult<()> {
        self.manager.clear_all_caches().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{Capabilities, PlatformEvent};
    use crate::sim::{SimDisplay, SimInstallPrompt};
    use pwakit_common::PwaConfig;

    fn manager() -> Arc<PwaManager> {
        PwaManager::new(Capabilities::none(), PwaConfig::default())
    }

    #[tokio::test]
    async fn test_initial_status() {
        let facade = PwaFacade::mount(manager());
        assert_eq!(
            facade.status(),
            PwaStatus {
                is_installed: false,
                is_online: true,
                can_install: false,
            }
        );
    }

    #[tokio::test]
    async fn test_can_install_follows_prompt() {
        let manager = manager();
        let bridge = manager.event_bridge().unwrap();
        let mut facade = PwaFacade::mount(manager.clone());

        bridge
            .handle(PlatformEvent::BeforeInstallPrompt(Arc::new(
                SimInstallPrompt::accepting(),
            )))
            .await;
        assert!(facade.refresh());
        assert!(facade.status().can_install);

        bridge.handle(PlatformEvent::AppInstalled).await;
        assert!(facade.refresh());
        assert!(!facade.status().can_install);
        assert!(!facade.refresh());
    }

    #[tokio::test]
    async fn test_online_listener_updates_immediately() {
        let manager = manager();
        let bridge = manager.event_bridge().unwrap();
        let facade = PwaFacade::mount(manager.clone());

        bridge.handle(PlatformEvent::Offline).await;

        // Listener already ran; no refresh needed.
        assert!(!facade.status().is_online);
    }

    #[tokio::test]
    async fn test_changed_waits_for_notification() {
        let manager = manager();
        let sink = manager.event_sink();
        let bridge = manager.event_bridge().unwrap();
        let mut facade = PwaFacade::mount(manager.clone());
        let task = tokio::spawn(bridge.run());

        sink.emit(PlatformEvent::Offline);
        let status = facade.changed().await;

        assert!(!status.is_online);
        task.abort();
    }

    #[tokio::test]
    async fn test_is_installed_not_cached() {
        let display = Arc::new(SimDisplay::default());
        let manager = PwaManager::new(
            Capabilities::none().with_display_mode(display.clone()),
            PwaConfig::default(),
        );
        let facade = PwaFacade::mount(manager);

        assert!(!facade.status().is_installed);
        display.set_standalone(true);
        assert!(facade.status().is_installed);
    }

    #[tokio::test]
    async fn test_unmount_removes_listeners() {
        let manager = manager();
        let first = PwaFacade::mount(manager.clone());
        let second = PwaFacade::mount(manager.clone());
        assert_eq!(manager.online_listener_count(), 2);

        drop(first);
        assert_eq!(manager.online_listener_count(), 1);
        drop(second);
        assert_eq!(manager.online_listener_count(), 0);
    }

    #[tokio::test]
    async fn test_lagged_resyncs() {
        let manager = PwaManager::new(
            Capabilities::none(),
            PwaConfig {
                notification_capacity: 1,
                ..Default::default()
            },
        );
        let bridge = manager.event_bridge().unwrap();
        let mut facade = PwaFacade::mount(manager.clone());

        bridge
            .handle(PlatformEvent::BeforeInstallPrompt(Arc::new(
                SimInstallPrompt::accepting(),
            )))
            .await;
        bridge.handle(PlatformEvent::Offline).await;
        bridge.handle(PlatformEvent::Online).await;

        assert!(facade.refresh());
        assert_eq!(
            facade.status(),
            PwaStatus {
                is_installed: false,
                is_online: true,
                can_install: true,
            }
        );
    }
}
