//! Platform abstraction.
//!
//! The manager never probes the runtime for features. Whatever the host
//! supports is handed in up front as a [`Capabilities`] descriptor; a missing
//! entry means "not supported" and turns the matching operations into no-ops.

use crate::error::PlatformError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Shared reference to a live worker registration.
pub type RegistrationHandle = Arc<dyn ServiceWorkerRegistration>;

/// Shared reference to a deferred install prompt.
pub type InstallPromptToken = Arc<dyn InstallPrompt>;

// ==================== Worker Container ====================

/// Options for registering the offline worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationOptions {
    /// Scope, root-relative.
    pub scope: String,
}

/// The runtime's offline-worker container (`navigator.serviceWorker`).
#[async_trait]
pub trait ServiceWorkerContainer: Send + Sync {
    /// Register the worker script.
    async fn register(
        &self,
        script_url: &str,
        options: &RegistrationOptions,
    ) -> Result<RegistrationHandle, PlatformError>;

    /// All registrations for the current origin.
    async fn get_registrations(&self) -> Result<Vec<RegistrationHandle>, PlatformError>;

    /// The registration whose worker is active.
    async fn ready(&self) -> Result<RegistrationHandle, PlatformError>;
}

/// A worker registration.
#[async_trait]
pub trait ServiceWorkerRegistration: Send + Sync {
    /// Scope URL.
    fn scope(&self) -> String;

    /// Ask the platform to check for a new worker script.
    async fn update(&self) -> Result<(), PlatformError>;

    /// Unregister. Resolves to whether a registration was removed.
    async fn unregister(&self) -> Result<bool, PlatformError>;

    /// Whether a new worker is installed and waiting to activate.
    fn has_waiting(&self) -> bool;

    /// Whether an active worker exists.
    fn has_active(&self) -> bool;

    /// Post a message to the active worker.
    fn post_message(&self, message: &serde_json::Value) -> Result<(), PlatformError>;

    /// Sync manager, when the registration exposes one.
    fn sync_manager(&self) -> Option<Arc<dyn SyncManager>>;

    /// Forward `updatefound` signals for this registration into `sink`.
    fn watch_updates(&self, sink: PlatformEventSink);
}

/// Background sync manager of a registration.
#[async_trait]
pub trait SyncManager: Send + Sync {
    async fn register(&self, tag: &str) -> Result<(), PlatformError>;
}

// ==================== Cache Storage ====================

/// Named cache storage (`caches`).
#[async_trait]
pub trait CacheStorage: Send + Sync {
    async fn keys(&self) -> Result<Vec<String>, PlatformError>;

    async fn open(&self, name: &str) -> Result<Arc<dyn Cache>, PlatformError>;

    async fn delete(&self, name: &str) -> Result<bool, PlatformError>;
}

/// A single named cache.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Request URLs stored in this cache.
    async fn keys(&self) -> Result<Vec<String>, PlatformError>;
}

// ==================== Install Prompt ====================

/// The user's answer to the install prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserChoice {
    Accepted,
    Dismissed,
}

/// The platform's deferred offer to install the application.
#[async_trait]
pub trait InstallPrompt: Send + Sync {
    /// Suppress the platform's own install UI.
    fn prevent_default(&self);

    /// Show the install prompt.
    async fn prompt(&self) -> Result<(), PlatformError>;

    /// Resolve the user's choice.
    async fn user_choice(&self) -> Result<UserChoice, PlatformError>;
}

/// Display-mode query (`(display-mode: standalone)`).
pub trait DisplayMode: Send + Sync {
    /// Whether the app runs as an installed, standalone app.
    fn is_standalone(&self) -> bool;
}

// ==================== Capabilities ====================

/// What the host runtime supports.
#[derive(Clone)]
pub struct Capabilities {
    /// Offline worker container.
    pub service_worker: Option<Arc<dyn ServiceWorkerContainer>>,

    /// Whether registrations support background sync.
    pub background_sync: bool,

    /// Cache storage.
    pub caches: Option<Arc<dyn CacheStorage>>,

    /// Display-mode query. Absent outside a window context.
    pub display_mode: Option<Arc<dyn DisplayMode>>,

    /// Connectivity at startup.
    pub initially_online: bool,
}

impl Default for Capabilities {
    /// Nothing supported, online.
    fn default() -> Self {
        Self {
            service_worker: None,
            background_sync: false,
            caches: None,
            display_mode: None,
            initially_online: true,
        }
    }
}

impl Capabilities {
    /// No platform support at all.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_service_worker(mut self, container: Arc<dyn ServiceWorkerContainer>) -> Self {
        self.service_worker = Some(container);
        self
    }

    pub fn with_background_sync(mut self, supported: bool) -> Self {
        self.background_sync = supported;
        self
    }

    pub fn with_caches(mut self, caches: Arc<dyn CacheStorage>) -> Self {
        self.caches = Some(caches);
        self
    }

    pub fn with_display_mode(mut self, display_mode: Arc<dyn DisplayMode>) -> Self {
        self.display_mode = Some(display_mode);
        self
    }

    pub fn with_online(mut self, online: bool) -> Self {
        self.initially_online = online;
        self
    }
}

impl fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capabilities")
            .field("service_worker", &self.service_worker.is_some())
            .field("background_sync", &self.background_sync)
            .field("caches", &self.caches.is_some())
            .field("display_mode", &self.display_mode.is_some())
            .field("initially_online", &self.initially_online)
            .finish()
    }
}

// ==================== Platform Events ====================

/// Signals raised by the platform.
#[derive(Clone)]
pub enum PlatformEvent {
    /// `beforeinstallprompt`
    BeforeInstallPrompt(InstallPromptToken),
    /// `appinstalled`
    AppInstalled,
    /// `online`
    Online,
    /// `offline`
    Offline,
    /// `controllerchange` on the worker container.
    ControllerChange,
    /// `updatefound` on a registration.
    UpdateFound { scope: String },
}

impl PlatformEvent {
    /// DOM event name.
    pub fn name(&self) -> &'static str {
        match self {
            PlatformEvent::BeforeInstallPrompt(_) => "beforeinstallprompt",
            PlatformEvent::AppInstalled => "appinstalled",
            PlatformEvent::Online => "online",
            PlatformEvent::Offline => "offline",
            PlatformEvent::ControllerChange => "controllerchange",
            PlatformEvent::UpdateFound { .. } => "updatefound",
        }
    }
}

impl fmt::Debug for PlatformEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformEvent::UpdateFound { scope } => {
                f.debug_struct("UpdateFound").field("scope", scope).finish()
            }
            other => f.write_str(other.name()),
        }
    }
}

/// Sending half of the platform event channel.
#[derive(Debug, Clone)]
pub struct PlatformEventSink {
    tx: mpsc::UnboundedSender<PlatformEvent>,
}

impl PlatformEventSink {
    pub(crate) fn new(tx: mpsc::UnboundedSender<PlatformEvent>) -> Self {
        Self { tx }
    }

    /// Queue an event. Returns `false` once the receiver is gone.
    pub fn emit(&self, event: PlatformEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_capabilities() {
        let caps = Capabilities::none();
        assert!(caps.service_worker.is_none());
        assert!(caps.caches.is_none());
        assert!(!caps.background_sync);
        assert!(caps.initially_online);
    }

    #[test]
    fn test_user_choice_serde() {
        assert_eq!(
            serde_json::to_string(&UserChoice::Accepted).unwrap(),
            r#""accepted""#
        );
        let choice: UserChoice = serde_json::from_str(r#""dismissed""#).unwrap();
        assert_eq!(choice, UserChoice::Dismissed);
    }

    #[test]
    fn test_event_sink_closed() {
        let (tx, rx) = mpsc::unbounded_channel();
        let sink = PlatformEventSink::new(tx);
        assert!(sink.emit(PlatformEvent::Online));
        drop(rx);
        assert!(!sink.emit(PlatformEvent::Offline));
    }

    #[test]
    fn test_event_debug() {
        let event = PlatformEvent::UpdateFound {
            scope: "https://localhost/".to_string(),
        };
        assert_eq!(event.name(), "updatefound");
        assert!(format!("{event:?}").contains("localhost"));
        assert_eq!(format!("{:?}", PlatformEvent::Offline), "offline");
    }
}
