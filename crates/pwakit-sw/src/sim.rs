//! In-memory platform.
//!
//! Implements every platform trait without a browser: a worker container
//! whose registrations walk workers through installing → waiting → active,
//! named cache storage, a sync manager, install prompts and a display-mode
//! switch. Failures can be injected per operation and calls are recorded,
//! which is what the test suites and `pwa-sim` drive the manager against.
//!
//! ```text
//! SimulatedPlatform
//!     ├── SimContainer
//!     │       └── SimRegistration (scope)
//!     │               ├── installing (ServiceWorker)
//!     │               ├── waiting (ServiceWorker)
//!     │               └── active (ServiceWorker)
//!     ├── SimCacheStorage
//!     │       └── SimCache: url → CacheEntry
//!     ├── SimSyncManager
//!     └── SimDisplay
//! ```

use crate::error::PlatformError;
use crate::platform::{
    Cache, CacheStorage, Capabilities, DisplayMode, InstallPrompt, InstallPromptToken,
    PlatformEvent, PlatformEventSink, RegistrationHandle, RegistrationOptions,
    ServiceWorkerContainer, ServiceWorkerRegistration, SyncManager, UserChoice,
};
use async_trait::async_trait;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tokio::sync::watch;
use url::Url;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ==================== Service Worker ====================

/// Unique identifier for a simulated worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServiceWorkerId(u64);

impl ServiceWorkerId {
    fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// Worker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceWorkerState {
    #[default]
    Parsed,
    Installing,
    Installed,
    Activating,
    Activated,
    Redundant,
}

/// A simulated worker.
#[derive(Debug, Clone)]
pub struct ServiceWorker {
    pub id: ServiceWorkerId,
    pub script_url: Url,
    pub state: ServiceWorkerState,
    pub state_changed_at: Instant,
}

impl ServiceWorker {
    fn new(script_url: Url) -> Self {
        Self {
            id: ServiceWorkerId::new(),
            script_url,
            state: ServiceWorkerState::Parsed,
            state_changed_at: Instant::now(),
        }
    }

    fn set_state(&mut self, state: ServiceWorkerState) {
        self.state = state;
        self.state_changed_at = Instant::now();
    }
}

#[derive(Debug, Default)]
struct Workers {
    installing: Option<ServiceWorker>,
    waiting: Option<ServiceWorker>,
    active: Option<ServiceWorker>,
}

impl Workers {
    fn install(&mut self, script_url: Url) {
        let mut worker = ServiceWorker::new(script_url);
        worker.set_state(ServiceWorkerState::Installing);
        if let Some(mut old) = self.installing.replace(worker) {
            old.set_state(ServiceWorkerState::Redundant);
        }
    }

    fn install_complete(&mut self) {
        if let Some(mut worker) = self.installing.take() {
            worker.set_state(ServiceWorkerState::Installed);
            if let Some(mut old) = self.waiting.replace(worker) {
                old.set_state(ServiceWorkerState::Redundant);
            }
        }
    }

    /// Promote the waiting worker. Returns whether the controller changed.
    fn activate(&mut self) -> bool {
        let Some(mut worker) = self.waiting.take() else {
            return false;
        };
        worker.set_state(ServiceWorkerState::Activating);
        if let Some(mut old) = self.active.take() {
            old.set_state(ServiceWorkerState::Redundant);
        }
        worker.set_state(ServiceWorkerState::Activated);
        self.active = Some(worker);
        true
    }

    fn retire(&mut self) {
        for worker in [&mut self.installing, &mut self.waiting, &mut self.active] {
            if let Some(mut worker) = worker.take() {
                worker.set_state(ServiceWorkerState::Redundant);
            }
        }
    }
}

// ==================== Shared State ====================

#[derive(Debug, Default)]
struct Faults {
    register: Option<PlatformError>,
    update: Option<PlatformError>,
    unregister: Option<PlatformError>,
    /// Per-scope unregister failures.
    unregister_scopes: HashMap<String, PlatformError>,
}

/// Holds calls until released.
#[derive(Debug)]
struct Gate(watch::Sender<bool>);

impl Default for Gate {
    fn default() -> Self {
        Self(watch::channel(false).0)
    }
}

impl Gate {
    fn hold(&self) {
        self.0.send_replace(true);
    }

    fn release(&self) {
        self.0.send_replace(false);
    }

    async fn pass(&self) {
        let mut rx = self.0.subscribe();
        // The sender lives as long as `self`, so this only ends on release.
        let _ = rx.wait_for(|held| !*held).await;
    }
}

#[derive(Debug, Default)]
struct Shared {
    faults: Mutex<Faults>,
    register_gate: Gate,
    update_gate: Gate,
    register_calls: AtomicUsize,
    update_calls: AtomicUsize,
    unregister_calls: AtomicUsize,
    staged_script: Mutex<Option<Url>>,
    messages: Mutex<Vec<serde_json::Value>>,
}

// ==================== Registration ====================

/// A simulated worker registration.
pub struct SimRegistration {
    scope: Url,
    workers: Mutex<Workers>,
    watchers: Mutex<Vec<PlatformEventSink>>,
    unregistered: AtomicBool,
    last_update_check: Mutex<Option<Instant>>,
    sync: Arc<SimSyncManager>,
    shared: Arc<Shared>,
}

impl SimRegistration {
    fn new(scope: Url, sync: Arc<SimSyncManager>, shared: Arc<Shared>) -> Self {
        Self {
            scope,
            workers: Mutex::new(Workers::default()),
            watchers: Mutex::new(Vec::new()),
            unregistered: AtomicBool::new(false),
            last_update_check: Mutex::new(None),
            sync,
            shared,
        }
    }

    /// State of the active worker.
    pub fn active_state(&self) -> Option<ServiceWorkerState> {
        lock(&self.workers).active.as_ref().map(|w| w.state)
    }

    /// Script of the waiting worker.
    pub fn waiting_script(&self) -> Option<Url> {
        lock(&self.workers).waiting.as_ref().map(|w| w.script_url.clone())
    }

    pub fn last_update_check(&self) -> Option<Instant> {
        *lock(&self.last_update_check)
    }

    pub fn is_unregistered(&self) -> bool {
        self.unregistered.load(Ordering::SeqCst)
    }

    fn install(&self, script_url: Url) {
        lock(&self.workers).install(script_url);

        let watchers = lock(&self.watchers).clone();
        for sink in watchers {
            sink.emit(PlatformEvent::UpdateFound {
                scope: self.scope.to_string(),
            });
        }

        lock(&self.workers).install_complete();
    }

    fn activate_waiting(&self) -> bool {
        lock(&self.workers).activate()
    }
}

#[async_trait]
impl ServiceWorkerRegistration for SimRegistration {
    fn scope(&self) -> String {
        self.scope.to_string()
    }

    async fn update(&self) -> Result<(), PlatformError> {
        self.shared.update_calls.fetch_add(1, Ordering::SeqCst);
        self.shared.update_gate.pass().await;
        if let Some(e) = lock(&self.shared.faults).update.clone() {
            return Err(e);
        }
        if self.is_unregistered() {
            return Err(PlatformError::InvalidState(
                "registration was unregistered".to_string(),
            ));
        }

        *lock(&self.last_update_check) = Some(Instant::now());
        let staged = lock(&self.shared.staged_script).take();
        if let Some(script_url) = staged {
            self.install(script_url);
        }
        Ok(())
    }

    async fn unregister(&self) -> Result<bool, PlatformError> {
        self.shared.unregister_calls.fetch_add(1, Ordering::SeqCst);
        let fault = {
            let faults = lock(&self.shared.faults);
            faults
                .unregister
                .clone()
                .or_else(|| faults.unregister_scopes.get(self.scope.as_str()).cloned())
        };
        if let Some(e) = fault {
            return Err(e);
        }
        if self.unregistered.swap(true, Ordering::SeqCst) {
            return Ok(false);
        }
        lock(&self.workers).retire();
        Ok(true)
    }

    fn has_waiting(&self) -> bool {
        lock(&self.workers).waiting.is_some()
    }

    fn has_active(&self) -> bool {
        lock(&self.workers).active.is_some()
    }

    fn post_message(&self, message: &serde_json::Value) -> Result<(), PlatformError> {
        let workers = lock(&self.workers);
        match workers.active {
            Some(ref worker) if worker.state != ServiceWorkerState::Redundant => {
                lock(&self.shared.messages).push(message.clone());
                Ok(())
            }
            _ => Err(PlatformError::InvalidState(
                "Cannot post message to redundant worker".to_string(),
            )),
        }
    }

    fn sync_manager(&self) -> Option<Arc<dyn SyncManager>> {
        Some(Arc::clone(&self.sync) as Arc<dyn SyncManager>)
    }

    fn watch_updates(&self, sink: PlatformEventSink) {
        lock(&self.watchers).push(sink);
    }
}

// ==================== Container ====================

/// A simulated worker container for one origin.
pub struct SimContainer {
    origin: Url,
    registrations: Mutex<HashMap<String, Arc<SimRegistration>>>,
    sync: Arc<SimSyncManager>,
    shared: Arc<Shared>,
}

impl SimContainer {
    pub fn new(origin: Url) -> Self {
        Self {
            origin,
            registrations: Mutex::new(HashMap::new()),
            sync: Arc::new(SimSyncManager::default()),
            shared: Arc::new(Shared::default()),
        }
    }

    /// Make every `register()` fail with `error`.
    pub fn fail_register(&self, error: PlatformError) {
        lock(&self.shared.faults).register = Some(error);
    }

    /// Make every registration's `update()` fail with `error`.
    pub fn fail_update(&self, error: PlatformError) {
        lock(&self.shared.faults).update = Some(error);
    }

    /// Make every registration's `unregister()` fail with `error`.
    pub fn fail_unregister(&self, error: PlatformError) {
        lock(&self.shared.faults).unregister = Some(error);
    }

    /// Make `unregister()` of the registration at `scope` fail with `error`.
    pub fn fail_unregister_scope(&self, scope: &str, error: PlatformError) {
        if let Ok(url) = self.origin.join(scope) {
            lock(&self.shared.faults)
                .unregister_scopes
                .insert(url.to_string(), error);
        }
    }

    pub fn clear_failures(&self) {
        *lock(&self.shared.faults) = Faults::default();
    }

    /// Hold `register()` calls until [`release_register`](Self::release_register).
    pub fn hold_register(&self) {
        self.shared.register_gate.hold();
    }

    pub fn release_register(&self) {
        self.shared.register_gate.release();
    }

    /// Hold every registration's `update()` until
    /// [`release_updates`](Self::release_updates). Never releasing simulates
    /// a platform call that does not settle.
    pub fn hold_updates(&self) {
        self.shared.update_gate.hold();
    }

    pub fn release_updates(&self) {
        self.shared.update_gate.release();
    }

    /// Install `script_url` as a new worker on the next update check.
    pub fn stage_update(&self, script_url: &str) {
        if let Ok(url) = self.origin.join(script_url) {
            *lock(&self.shared.staged_script) = Some(url);
        }
    }

    pub fn register_calls(&self) -> usize {
        self.shared.register_calls.load(Ordering::SeqCst)
    }

    pub fn update_calls(&self) -> usize {
        self.shared.update_calls.load(Ordering::SeqCst)
    }

    pub fn unregister_calls(&self) -> usize {
        self.shared.unregister_calls.load(Ordering::SeqCst)
    }

    /// Messages delivered to active workers.
    pub fn messages(&self) -> Vec<serde_json::Value> {
        lock(&self.shared.messages).clone()
    }

    /// Scopes of live registrations.
    pub fn scopes(&self) -> Vec<String> {
        let mut scopes: Vec<String> = self.live().into_iter().map(|r| r.scope()).collect();
        scopes.sort();
        scopes
    }

    pub fn registration(&self, scope: &str) -> Option<Arc<SimRegistration>> {
        self.live().into_iter().find(|r| r.scope.as_str() == scope)
    }

    /// Activate every waiting worker. Returns how many controllers changed.
    pub fn activate_waiting(&self) -> usize {
        self.live()
            .iter()
            .filter(|registration| registration.activate_waiting())
            .count()
    }

    fn live(&self) -> Vec<Arc<SimRegistration>> {
        let mut registrations = lock(&self.registrations);
        registrations.retain(|_, r| !r.is_unregistered());
        registrations.values().cloned().collect()
    }

    fn resolve(&self, script_url: &str, scope: &str) -> Result<(Url, Url), PlatformError> {
        let script = self
            .origin
            .join(script_url)
            .map_err(|e| PlatformError::Security(format!("invalid script URL: {e}")))?;
        let scope = self
            .origin
            .join(scope)
            .map_err(|e| PlatformError::Security(format!("invalid scope: {e}")))?;

        if script.origin() != self.origin.origin() || scope.origin() != self.origin.origin() {
            return Err(PlatformError::Security(
                "script and scope must share the page origin".to_string(),
            ));
        }

        let script_dir = script
            .path()
            .rsplit_once('/')
            .map(|(dir, _)| format!("{dir}/"))
            .unwrap_or_else(|| "/".to_string());
        if !scope.path().starts_with(&script_dir) {
            return Err(PlatformError::Security(format!(
                "scope {} is not under {}",
                scope.path(),
                script_dir
            )));
        }

        Ok((script, scope))
    }
}

#[async_trait]
impl ServiceWorkerContainer for SimContainer {
    async fn register(
        &self,
        script_url: &str,
        options: &RegistrationOptions,
    ) -> Result<RegistrationHandle, PlatformError> {
        self.shared.register_calls.fetch_add(1, Ordering::SeqCst);
        self.shared.register_gate.pass().await;
        if let Some(e) = lock(&self.shared.faults).register.clone() {
            return Err(e);
        }

        let (script, scope) = self.resolve(script_url, &options.scope)?;
        if let Some(existing) = self.registration(scope.as_str()) {
            return Ok(existing as RegistrationHandle);
        }

        let registration = Arc::new(SimRegistration::new(
            scope.clone(),
            Arc::clone(&self.sync),
            Arc::clone(&self.shared),
        ));
        // First worker of a scope activates without waiting.
        registration.install(script);
        registration.activate_waiting();

        lock(&self.registrations).insert(scope.to_string(), Arc::clone(&registration));
        Ok(registration as RegistrationHandle)
    }

    async fn get_registrations(&self) -> Result<Vec<RegistrationHandle>, PlatformError> {
        Ok(self
            .live()
            .into_iter()
            .map(|r| r as RegistrationHandle)
            .collect())
    }

    async fn ready(&self) -> Result<RegistrationHandle, PlatformError> {
        self.live()
            .into_iter()
            .find(|r| r.has_active())
            .map(|r| r as RegistrationHandle)
            .ok_or_else(|| PlatformError::InvalidState("no active service worker".to_string()))
    }
}

// ==================== Sync Manager ====================

#[derive(Debug, Default)]
pub struct SimSyncManager {
    tags: Mutex<Vec<String>>,
    fault: Mutex<Option<PlatformError>>,
}

impl SimSyncManager {
    /// Tags registered so far, in order.
    pub fn tags(&self) -> Vec<String> {
        lock(&self.tags).clone()
    }

    pub fn fail_register(&self, error: PlatformError) {
        *lock(&self.fault) = Some(error);
    }
}

#[async_trait]
impl SyncManager for SimSyncManager {
    async fn register(&self, tag: &str) -> Result<(), PlatformError> {
        if let Some(e) = lock(&self.fault).clone() {
            return Err(e);
        }
        lock(&self.tags).push(tag.to_string());
        Ok(())
    }
}

// ==================== Cache Storage ====================

/// A cached response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub url: String,
    pub status: u16,
    pub body: Vec<u8>,
    /// Milliseconds since the epoch.
    pub cached_at: u64,
}

impl CacheEntry {
    fn ok(url: &str) -> Self {
        Self {
            url: url.to_string(),
            status: 200,
            body: Vec::new(),
            cached_at: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug)]
pub struct SimCache {
    name: String,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl SimCache {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn put(&self, entry: CacheEntry) {
        lock(&self.entries).insert(entry.url.clone(), entry);
    }

    pub fn match_request(&self, url: &str) -> Option<CacheEntry> {
        lock(&self.entries).get(url).cloned()
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl Cache for SimCache {
    async fn keys(&self) -> Result<Vec<String>, PlatformError> {
        Ok(lock(&self.entries).keys().cloned().collect())
    }
}

/// Named caches in creation order.
#[derive(Debug, Default)]
pub struct SimCacheStorage {
    caches: Mutex<Vec<Arc<SimCache>>>,
    keys_fault: Mutex<Option<PlatformError>>,
    delete_faults: Mutex<HashMap<String, PlatformError>>,
    deleted: Mutex<Vec<String>>,
}

impl SimCacheStorage {
    /// Create (or extend) cache `name` with a 200 response per URL.
    pub fn seed(&self, name: &str, urls: &[&str]) -> Arc<SimCache> {
        let cache = self.get_or_create(name);
        for url in urls {
            cache.put(CacheEntry::ok(url));
        }
        cache
    }

    pub fn fail_keys(&self, error: PlatformError) {
        *lock(&self.keys_fault) = Some(error);
    }

    pub fn fail_delete(&self, name: &str, error: PlatformError) {
        lock(&self.delete_faults).insert(name.to_string(), error);
    }

    /// Names passed to successful deletes, in order.
    pub fn deleted(&self) -> Vec<String> {
        lock(&self.deleted).clone()
    }

    fn get_or_create(&self, name: &str) -> Arc<SimCache> {
        let mut caches = lock(&self.caches);
        if let Some(cache) = caches.iter().find(|c| c.name == name) {
            return Arc::clone(cache);
        }
        let cache = Arc::new(SimCache::new(name));
        caches.push(Arc::clone(&cache));
        cache
    }
}

#[async_trait]
impl CacheStorage for SimCacheStorage {
    async fn keys(&self) -> Result<Vec<String>, PlatformError> {
        if let Some(e) = lock(&self.keys_fault).clone() {
            return Err(e);
        }
        Ok(lock(&self.caches).iter().map(|c| c.name.clone()).collect())
    }

    async fn open(&self, name: &str) -> Result<Arc<dyn Cache>, PlatformError> {
        Ok(self.get_or_create(name) as Arc<dyn Cache>)
    }

    async fn delete(&self, name: &str) -> Result<bool, PlatformError> {
        if let Some(e) = lock(&self.delete_faults).get(name).cloned() {
            return Err(e);
        }
        let mut caches = lock(&self.caches);
        let before = caches.len();
        caches.retain(|c| c.name != name);
        let removed = caches.len() != before;
        lock(&self.deleted).push(name.to_string());
        Ok(removed)
    }
}

// ==================== Install Prompt ====================

/// A `beforeinstallprompt` event with a scripted outcome.
#[derive(Debug)]
pub struct SimInstallPrompt {
    outcome: Result<UserChoice, PlatformError>,
    /// `user_choice()` never settles.
    unanswered: bool,
    prompt_calls: AtomicUsize,
    default_prevented: AtomicBool,
}

impl SimInstallPrompt {
    pub fn new(outcome: Result<UserChoice, PlatformError>) -> Self {
        Self {
            outcome,
            unanswered: false,
            prompt_calls: AtomicUsize::new(0),
            default_prevented: AtomicBool::new(false),
        }
    }

    pub fn accepting() -> Self {
        Self::new(Ok(UserChoice::Accepted))
    }

    pub fn dismissing() -> Self {
        Self::new(Ok(UserChoice::Dismissed))
    }

    /// `prompt()` rejects with `error`.
    pub fn failing(error: PlatformError) -> Self {
        Self::new(Err(error))
    }

    /// The prompt shows but the user never answers.
    pub fn unanswered() -> Self {
        Self {
            unanswered: true,
            ..Self::accepting()
        }
    }

    pub fn prompt_calls(&self) -> usize {
        self.prompt_calls.load(Ordering::SeqCst)
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InstallPrompt for SimInstallPrompt {
    fn prevent_default(&self) {
        self.default_prevented.store(true, Ordering::SeqCst);
    }

    async fn prompt(&self) -> Result<(), PlatformError> {
        self.prompt_calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.as_ref().map(|_| ()).map_err(|e| e.clone())
    }

    async fn user_choice(&self) -> Result<UserChoice, PlatformError> {
        if self.unanswered {
            std::future::pending::<()>().await;
        }
        self.outcome.clone()
    }
}

// ==================== Display Mode ====================

#[derive(Debug, Default)]
pub struct SimDisplay {
    standalone: AtomicBool,
}

impl SimDisplay {
    pub fn set_standalone(&self, standalone: bool) {
        self.standalone.store(standalone, Ordering::SeqCst);
    }
}

impl DisplayMode for SimDisplay {
    fn is_standalone(&self) -> bool {
        self.standalone.load(Ordering::SeqCst)
    }
}

// ==================== Platform ====================

/// Every simulated component plus the window-level signals.
pub struct SimulatedPlatform {
    container: Arc<SimContainer>,
    caches: Arc<SimCacheStorage>,
    display: Arc<SimDisplay>,
    events: Mutex<Option<PlatformEventSink>>,
}

impl SimulatedPlatform {
    /// Default origin of simulated pages.
    pub const ORIGIN: &'static str = "https://localhost/";

    pub fn new() -> Self {
        Self::with_origin(Url::parse(Self::ORIGIN).expect("ORIGIN is a valid absolute URL"))
    }

    pub fn with_origin(origin: Url) -> Self {
        Self {
            container: Arc::new(SimContainer::new(origin)),
            caches: Arc::new(SimCacheStorage::default()),
            display: Arc::new(SimDisplay::default()),
            events: Mutex::new(None),
        }
    }

    /// Full support: worker container, background sync, caches, display mode.
    pub fn capabilities(&self) -> Capabilities {
        Capabilities::none()
            .with_service_worker(Arc::clone(&self.container) as Arc<dyn ServiceWorkerContainer>)
            .with_background_sync(true)
            .with_caches(Arc::clone(&self.caches) as Arc<dyn CacheStorage>)
            .with_display_mode(Arc::clone(&self.display) as Arc<dyn DisplayMode>)
    }

    pub fn container(&self) -> &Arc<SimContainer> {
        &self.container
    }

    pub fn caches(&self) -> &Arc<SimCacheStorage> {
        &self.caches
    }

    pub fn display(&self) -> &Arc<SimDisplay> {
        &self.display
    }

    pub fn sync(&self) -> &Arc<SimSyncManager> {
        &self.container.sync
    }

    /// Route window-level signals into `sink`.
    pub fn connect(&self, sink: PlatformEventSink) {
        *lock(&self.events) = Some(sink);
    }

    fn emit(&self, event: PlatformEvent) -> bool {
        lock(&self.events)
            .as_ref()
            .is_some_and(|sink| sink.emit(event))
    }

    pub fn go_online(&self) -> bool {
        self.emit(PlatformEvent::Online)
    }

    pub fn go_offline(&self) -> bool {
        self.emit(PlatformEvent::Offline)
    }

    /// Signal installability with `prompt`.
    pub fn offer_install(&self, prompt: InstallPromptToken) -> bool {
        self.emit(PlatformEvent::BeforeInstallPrompt(prompt))
    }

    /// The user installed the app: switch to standalone and signal it.
    pub fn complete_install(&self) -> bool {
        self.display.set_standalone(true);
        self.emit(PlatformEvent::AppInstalled)
    }

    /// Activate waiting workers, signalling a controller change if any did.
    pub fn activate_waiting(&self) -> bool {
        self.container.activate_waiting() > 0 && self.emit(PlatformEvent::ControllerChange)
    }
}

impl Default for SimulatedPlatform {
    fn default() -> Self {
        Self::new()
    }
}
