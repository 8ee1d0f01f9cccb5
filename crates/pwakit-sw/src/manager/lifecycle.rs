//! Offline worker registration, update and unregistration.

use super::{lock, PwaManager};
use crate::error::{PlatformError, PwaError, PwaResult};
use crate::platform::RegistrationOptions;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

/// Where the manager is in the worker lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LifecycleState {
    #[default]
    Unregistered,
    Registering,
    Registered,
    UpdateChecking,
    Unregistering,
}

/// Settled state plus the operations still in flight.
///
/// The reported state is the most recently started pending operation, or
/// the settled state once none is left. Operations only ever settle the
/// state they complete, so overlapping calls cannot restore a stale one.
#[derive(Debug, Default)]
pub(crate) struct Lifecycle {
    settled: LifecycleState,
    pending: Vec<(u64, LifecycleState)>,
    next_op: u64,
}

impl Lifecycle {
    fn current(&self) -> LifecycleState {
        self.pending
            .last()
            .map(|(_, state)| *state)
            .unwrap_or(self.settled)
    }

    fn begin(&mut self, state: LifecycleState) -> u64 {
        self.next_op += 1;
        self.pending.push((self.next_op, state));
        self.next_op
    }

    fn end(&mut self, op: u64, settled: Option<LifecycleState>) {
        self.pending.retain(|(id, _)| *id != op);
        if let Some(state) = settled {
            self.settled = state;
        }
    }
}

/// An in-flight lifecycle operation. Dropping it without [`finish`] (a
/// failure, or a cancelled future) leaves the settled state untouched.
///
/// [`finish`]: LifecycleOp::finish
struct LifecycleOp<'a> {
    manager: &'a PwaManager,
    id: u64,
}

impl LifecycleOp<'_> {
    fn finish(self, settled: LifecycleState) {
        lock(&self.manager.lifecycle).end(self.id, Some(settled));
    }
}

impl Drop for LifecycleOp<'_> {
    fn drop(&mut self) {
        lock(&self.manager.lifecycle).end(self.id, None);
    }
}

impl PwaManager {
    pub fn lifecycle_state(&self) -> LifecycleState {
        lock(&self.lifecycle).current()
    }

    fn begin_op(&self, state: LifecycleState) -> LifecycleOp<'_> {
        let id = lock(&self.lifecycle).begin(state);
        LifecycleOp { manager: self, id }
    }

    /// Register the offline worker at the configured scope.
    ///
    /// A second call replaces the stored registration.
    pub async fn register(&self) -> PwaResult<()> {
        let Some(container) = self.capabilities.service_worker.clone() else {
            warn!("Service workers not supported");
            return Ok(());
        };

        let op = self.begin_op(LifecycleState::Registering);
        let options = RegistrationOptions {
            scope: self.config.scope.clone(),
        };

        match container.register(&self.config.script_url, &options).await {
            Ok(registration) => {
                registration.watch_updates(self.event_sink());
                info!(
                    script = %self.config.script_url,
                    scope = %registration.scope(),
                    "Service worker registered"
                );
                *lock(&self.registration) = Some(registration);
                op.finish(LifecycleState::Registered);
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Service worker registration failed");
                Err(PwaError::Registration(e))
            }
        }
    }

    /// Unregister every worker registration of the origin.
    ///
    /// Every registration is asked even when one of them fails; the first
    /// failure is reported. The stored registration handle is left in place.
    pub async fn unregister(&self) -> PwaResult<()> {
        let Some(container) = self.capabilities.service_worker.clone() else {
            return Ok(());
        };

        let op = self.begin_op(LifecycleState::Unregistering);
        let result: Result<(), PlatformError> = async {
            let registrations = container.get_registrations().await?;
            join_all(registrations.iter().map(|r| r.unregister()))
                .await
                .into_iter()
                .find_map(Result::err)
                .map_or(Ok(()), Err)
        }
        .await;

        match result {
            Ok(()) => {
                info!("Service worker unregistered");
                op.finish(LifecycleState::Unregistered);
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Service worker unregistration failed");
                Err(PwaError::Unregistration(e))
            }
        }
    }

    /// Ask the platform to check the stored registration for a new worker.
    pub async fn update(&self) -> PwaResult<()> {
        let Some(registration) = self.registration() else {
            warn!("No service worker registration found");
            return Ok(());
        };

        let op = self.begin_op(LifecycleState::UpdateChecking);
        let result = registration.update().await;
        drop(op);

        match result {
            Ok(()) => {
                info!("Service worker update initiated");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Service worker update failed");
                Err(PwaError::Update(e))
            }
        }
    }

    /// Returns `true` if a new worker is installed and waiting after an
    /// update check. Failures are logged and reported as `false`.
    pub async fn check_for_updates(&self) -> bool {
        let Some(registration) = self.registration() else {
            return false;
        };

        let op = self.begin_op(LifecycleState::UpdateChecking);
        let result = registration.update().await;
        drop(op);

        if let Err(e) = result {
            error!(error = %e, "Update check failed");
            return false;
        }

        let waiting = registration.has_waiting();
        if waiting {
            info!(scope = %registration.scope(), "Update available");
        }
        waiting
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{Capabilities, ServiceWorkerContainer};
    use crate::sim::SimulatedPlatform;
    use pwakit_common::PwaConfig;
    use std::sync::Arc;

    fn setup() -> (SimulatedPlatform, Arc<PwaManager>) {
        let platform = SimulatedPlatform::new();
        let manager = PwaManager::new(platform.capabilities(), PwaConfig::default());
        (platform, manager)
    }

    #[tokio::test]
    async fn test_register_unsupported_is_noop() {
        let platform = SimulatedPlatform::new();
        let caps = Capabilities {
            service_worker: None,
            ..platform.capabilities()
        };
        let manager = PwaManager::new(caps, PwaConfig::default());

        assert!(manager.register().await.is_ok());
        assert_eq!(platform.container().register_calls(), 0);
        assert!(manager.registration().is_none());
        assert_eq!(manager.lifecycle_state(), LifecycleState::Unregistered);
    }

    #[tokio::test]
    async fn test_register_stores_handle() {
        let (platform, manager) = setup();

        manager.register().await.unwrap();

        assert_eq!(platform.container().register_calls(), 1);
        let registration = manager.registration().unwrap();
        assert_eq!(registration.scope(), "https://localhost/");
        assert!(registration.has_active());
        assert_eq!(manager.lifecycle_state(), LifecycleState::Registered);
    }

    #[tokio::test]
    async fn test_register_twice_overwrites() {
        let (platform, manager) = setup();

        manager.register().await.unwrap();
        manager.register().await.unwrap();

        assert_eq!(platform.container().register_calls(), 2);
        assert!(manager.registration().is_some());
        assert_eq!(manager.lifecycle_state(), LifecycleState::Registered);
    }

    #[tokio::test]
    async fn test_register_failure_propagates() {
        let (platform, manager) = setup();
        platform
            .container()
            .fail_register(PlatformError::Security("insecure origin".into()));

        let err = manager.register().await.unwrap_err();

        assert!(matches!(err, PwaError::Registration(PlatformError::Security(_))));
        assert!(manager.registration().is_none());
        assert_eq!(manager.lifecycle_state(), LifecycleState::Unregistered);
    }

    #[tokio::test]
    async fn test_unregister_keeps_handle() {
        let (platform, manager) = setup();
        manager.register().await.unwrap();

        manager.unregister().await.unwrap();

        assert!(manager.registration().is_some());
        assert_eq!(manager.lifecycle_state(), LifecycleState::Unregistered);
        assert!(platform.container().scopes().is_empty());
    }

    #[tokio::test]
    async fn test_unregister_failure() {
        let (platform, manager) = setup();
        manager.register().await.unwrap();
        platform
            .container()
            .fail_unregister(PlatformError::InvalidState("busy".into()));

        let err = manager.unregister().await.unwrap_err();

        assert!(matches!(err, PwaError::Unregistration(_)));
        assert_eq!(manager.lifecycle_state(), LifecycleState::Registered);
    }

    #[tokio::test]
    async fn test_update_without_registration_is_noop() {
        let (platform, manager) = setup();
        assert!(manager.update().await.is_ok());
        assert_eq!(platform.container().update_calls(), 0);
    }

    #[tokio::test]
    async fn test_update_failure() {
        let (platform, manager) = setup();
        manager.register().await.unwrap();
        platform
            .container()
            .fail_update(PlatformError::Network("offline".into()));

        let err = manager.update().await.unwrap_err();

        assert!(matches!(err, PwaError::Update(PlatformError::Network(_))));
        assert_eq!(manager.lifecycle_state(), LifecycleState::Registered);
    }

    #[tokio::test]
    async fn test_check_for_updates() {
        let (platform, manager) = setup();
        assert!(!manager.check_for_updates().await);

        manager.register().await.unwrap();
        assert!(!manager.check_for_updates().await);

        platform.container().stage_update("https://localhost/service-worker.js?v=2");
        assert!(manager.check_for_updates().await);
    }

    #[tokio::test]
    async fn test_check_for_updates_swallows_failure() {
        let (platform, manager) = setup();
        manager.register().await.unwrap();
        platform.container().stage_update("https://localhost/service-worker.js?v=2");
        platform
            .container()
            .fail_update(PlatformError::Network("offline".into()));

        assert!(!manager.check_for_updates().await);
    }

    #[tokio::test]
    async fn test_unregister_asks_every_registration() {
        let (platform, manager) = setup();
        manager.register().await.unwrap();
        for scope in ["/a/", "/b/"] {
            platform
                .container()
                .register(
                    "/service-worker.js",
                    &RegistrationOptions {
                        scope: scope.to_string(),
                    },
                )
                .await
                .unwrap();
        }
        platform
            .container()
            .fail_unregister_scope("/a/", PlatformError::InvalidState("busy".into()));

        let err = manager.unregister().await.unwrap_err();

        assert!(matches!(err, PwaError::Unregistration(PlatformError::InvalidState(_))));
        assert_eq!(platform.container().unregister_calls(), 3);
        assert_eq!(platform.container().scopes(), vec!["https://localhost/a/"]);
        assert_eq!(manager.lifecycle_state(), LifecycleState::Registered);
    }

    #[tokio::test]
    async fn test_overlapping_register_and_update_check() {
        let (platform, manager) = setup();
        manager.register().await.unwrap();

        platform.container().hold_register();
        let register = tokio::spawn({
            let manager = manager.clone();
            async move { manager.register().await }
        });
        while platform.container().register_calls() < 2 {
            tokio::task::yield_now().await;
        }
        assert_eq!(manager.lifecycle_state(), LifecycleState::Registering);

        platform.container().hold_updates();
        let check = tokio::spawn({
            let manager = manager.clone();
            async move { manager.check_for_updates().await }
        });
        while platform.container().update_calls() < 1 {
            tokio::task::yield_now().await;
        }
        assert_eq!(manager.lifecycle_state(), LifecycleState::UpdateChecking);

        platform.container().release_register();
        register.await.unwrap().unwrap();
        assert_eq!(manager.lifecycle_state(), LifecycleState::UpdateChecking);

        platform.container().release_updates();
        assert!(!check.await.unwrap());
        assert_eq!(manager.lifecycle_state(), LifecycleState::Registered);
    }

    #[tokio::test]
    async fn test_cancelled_update_leaves_state() {
        let (platform, manager) = setup();
        manager.register().await.unwrap();
        platform.container().hold_updates();

        let check = tokio::spawn({
            let manager = manager.clone();
            async move { manager.check_for_updates().await }
        });
        while platform.container().update_calls() < 1 {
            tokio::task::yield_now().await;
        }
        check.abort();
        let _ = check.await;

        assert_eq!(manager.lifecycle_state(), LifecycleState::Registered);
    }
}
