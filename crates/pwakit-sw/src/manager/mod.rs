//! The PWA manager service object.
//!
//! One `PwaManager` owns the registration handle, the deferred install
//! prompt and the connectivity flag. It is built explicitly from a
//! [`Capabilities`] descriptor and a [`PwaConfig`], so tests can run any
//! number of independent instances.

mod caches;
mod install;
mod lifecycle;
mod sync;

pub use caches::CacheInfo;
pub use lifecycle::LifecycleState;

use crate::bridge::EventBridge;
use crate::error::{PwaError, PwaResult};
use crate::notification::PwaNotification;
use crate::platform::{
    Capabilities, InstallPromptToken, PlatformEvent, PlatformEventSink, RegistrationHandle,
};
use pwakit_common::PwaConfig;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::sync::{broadcast, mpsc};
use tracing::debug;

type OnlineListener = Arc<dyn Fn(bool) + Send + Sync>;

/// Unique identifier for an online status listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

pub struct PwaManager {
    config: PwaConfig,
    capabilities: Capabilities,

    /// Current worker registration.
    registration: Mutex<Option<RegistrationHandle>>,
    lifecycle: Mutex<lifecycle::Lifecycle>,

    /// Captured `beforeinstallprompt` token.
    deferred_prompt: Mutex<Option<InstallPromptToken>>,

    online: AtomicBool,
    online_listeners: Mutex<Vec<(ListenerId, OnlineListener)>>,
    next_listener_id: AtomicU64,

    notifications: broadcast::Sender<PwaNotification>,

    event_tx: mpsc::UnboundedSender<PlatformEvent>,
    /// Taken by the first (and only) event bridge.
    event_rx: Mutex<Option<mpsc::UnboundedReceiver<PlatformEvent>>>,
}

/// Lock a mutex, recovering the data if a listener panicked while holding it.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl PwaManager {
    /// Create a manager.
    pub fn new(capabilities: Capabilities, config: PwaConfig) -> Arc<Self> {
        let (notifications, _) = broadcast::channel(config.notification_capacity.max(1));
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let online = capabilities.initially_online;

        let manager = Arc::new(Self {
            config,
            capabilities,
            registration: Mutex::new(None),
            lifecycle: Mutex::new(lifecycle::Lifecycle::default()),
            deferred_prompt: Mutex::new(None),
            online: AtomicBool::new(online),
            online_listeners: Mutex::new(Vec::new()),
            next_listener_id: AtomicU64::new(1),
            notifications,
            event_tx,
            event_rx: Mutex::new(Some(event_rx)),
        });
        manager.check_installability();
        manager
    }

    pub fn config(&self) -> &PwaConfig {
        &self.config
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    // ==================== State ====================

    /// Whether the app runs in installed (standalone) mode. Queried from
    /// the platform on every call.
    pub fn is_installed(&self) -> bool {
        self.capabilities
            .display_mode
            .as_ref()
            .is_some_and(|display| display.is_standalone())
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    /// Whether an install prompt has been captured and the app is not
    /// already running installed.
    pub fn can_install(&self) -> bool {
        lock(&self.deferred_prompt).is_some() && !self.is_installed()
    }

    /// The captured install prompt, if any.
    pub fn install_prompt(&self) -> Option<InstallPromptToken> {
        lock(&self.deferred_prompt).clone()
    }

    /// The registration stored by the last successful `register()`.
    pub fn registration(&self) -> Option<RegistrationHandle> {
        lock(&self.registration).clone()
    }

    fn check_installability(&self) {
        if self.is_installed() {
            debug!("Running in standalone mode, install prompt disabled");
            lock(&self.deferred_prompt).take();
        }
    }

    // ==================== Events ====================

    /// Sink for platform adapters to push signals into the event bridge.
    pub fn event_sink(&self) -> PlatformEventSink {
        PlatformEventSink::new(self.event_tx.clone())
    }

    /// Hand out the event bridge. Only the first call succeeds, so platform
    /// signals are never handled twice.
    pub fn event_bridge(self: &Arc<Self>) -> PwaResult<EventBridge> {
        let events = lock(&self.event_rx).take().ok_or(PwaError::BridgeAttached)?;
        Ok(EventBridge::new(Arc::clone(self), events))
    }

    /// Subscribe to application notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<PwaNotification> {
        self.notifications.subscribe()
    }

    fn notify(&self, notification: PwaNotification) {
        debug!(event = notification.name(), ?notification, "Dispatching notification");
        // No subscribers is fine.
        let _ = self.notifications.send(notification);
    }

    fn notify_installability_change(&self) {
        self.notify(PwaNotification::InstallabilityChanged {
            can_install: self.can_install(),
        });
    }

    pub(crate) fn capture_install_prompt(&self, prompt: InstallPromptToken) {
        prompt.prevent_default();
        *lock(&self.deferred_prompt) = Some(prompt);
        self.notify_installability_change();
    }

    pub(crate) fn clear_install_prompt(&self) {
        lock(&self.deferred_prompt).take();
        self.notify_installability_change();
    }

    pub(crate) fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);

        // Clone out so a listener may unsubscribe itself.
        let listeners: Vec<OnlineListener> = lock(&self.online_listeners)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(online);
        }

        self.notify(PwaNotification::OnlineStatusChanged { is_online: online });
    }

    // ==================== Online Listeners ====================

    /// Call `listener` on every connectivity change, in registration order.
    /// Dropping the returned subscription removes the listener.
    pub fn add_online_status_listener(
        self: &Arc<Self>,
        listener: impl Fn(bool) + Send + Sync + 'static,
    ) -> OnlineSubscription {
        let id = ListenerId(self.next_listener_id.fetch_add(1, Ordering::Relaxed));
        lock(&self.online_listeners).push((id, Arc::new(listener)));
        OnlineSubscription {
            manager: Arc::downgrade(self),
            id,
        }
    }

    fn remove_online_status_listener(&self, id: ListenerId) -> bool {
        let mut listeners = lock(&self.online_listeners);
        let before = listeners.len();
        listeners.retain(|(listener_id, _)| *listener_id != id);
        listeners.len() != before
    }

    /// Number of registered online status listeners.
    pub fn online_listener_count(&self) -> usize {
        lock(&self.online_listeners).len()
    }
}

impl fmt::Debug for PwaManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PwaManager")
            .field("config", &self.config)
            .field("capabilities", &self.capabilities)
            .field("lifecycle", &self.lifecycle_state())
            .field("online", &self.is_online())
            .field("can_install", &self.can_install())
            .finish()
    }
}

/// Handle returned by [`PwaManager::add_online_status_listener`].
#[must_use = "dropping the subscription removes the listener"]
#[derive(Debug)]
pub struct OnlineSubscription {
    manager: Weak<PwaManager>,
    id: ListenerId,
}

impl OnlineSubscription {
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Remove the listener now.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for OnlineSubscription {
    fn drop(&mut self) {
        if let Some(manager) = self.manager.upgrade() {
            manager.remove_online_status_listener(self.id);
        }
    }
}
