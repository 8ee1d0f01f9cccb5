//! Event bridge: platform signals in, manager state and notifications out.

use crate::manager::PwaManager;
use crate::platform::PlatformEvent;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Consumes the platform event channel of one [`PwaManager`].
///
/// Obtained from [`PwaManager::event_bridge`], which hands it out once.
pub struct EventBridge {
    manager: Arc<PwaManager>,
    events: mpsc::UnboundedReceiver<PlatformEvent>,
    /// Update checks started by the bridge and not yet joined.
    update_checks: Mutex<Vec<JoinHandle<bool>>>,
}

impl EventBridge {
    pub(crate) fn new(
        manager: Arc<PwaManager>,
        events: mpsc::UnboundedReceiver<PlatformEvent>,
    ) -> Self {
        Self {
            manager,
            events,
            update_checks: Mutex::new(Vec::new()),
        }
    }

    pub fn manager(&self) -> &Arc<PwaManager> {
        &self.manager
    }

    /// Handle a single platform event.
    ///
    /// Update checks run in their own task, so a platform update call that
    /// never settles does not hold up the events behind it. Must be called
    /// from within a tokio runtime.
    pub async fn handle(&self, event: PlatformEvent) {
        debug!(event = event.name(), "Platform event");

        match event {
            PlatformEvent::BeforeInstallPrompt(prompt) => {
                self.manager.capture_install_prompt(prompt);
            }
            PlatformEvent::AppInstalled => {
                info!("App was installed");
                self.manager.clear_install_prompt();
            }
            PlatformEvent::Online => self.manager.set_online(true),
            PlatformEvent::Offline => self.manager.set_online(false),
            PlatformEvent::ControllerChange => {
                info!("Service worker controller changed");
                self.spawn_update_check();
            }
            PlatformEvent::UpdateFound { scope } => {
                info!(%scope, "Service worker update found");
                self.spawn_update_check();
            }
        }
    }

    fn spawn_update_check(&self) {
        let manager = Arc::clone(&self.manager);
        let task = tokio::spawn(async move { manager.check_for_updates().await });

        let mut checks = self
            .update_checks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        checks.retain(|check| !check.is_finished());
        checks.push(task);
    }

    /// Wait for every update check started so far. Returns how many
    /// reported a waiting worker.
    pub async fn join_update_checks(&self) -> usize {
        let checks = std::mem::take(
            &mut *self
                .update_checks
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );

        let mut available = 0;
        for check in checks {
            if let Ok(true) = check.await {
                available += 1;
            }
        }
        available
    }

    /// Handle every queued event, including ones queued while handling.
    /// Returns how many were handled.
    pub async fn drain(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.events.try_recv() {
            self.handle(event).await;
            handled += 1;
        }
        handled
    }

    /// Handle events in arrival order. The manager keeps a sender alive, so
    /// this runs until the task is aborted.
    pub async fn run(mut self) {
        while let Some(event) = self.events.recv().await {
            self.handle(event).await;
        }
    }
}
