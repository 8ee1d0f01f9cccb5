//! Error types for the PWA manager

use thiserror::Error;

/// Result type alias for PWA manager operations
pub type PwaResult<T> = Result<T, PwaError>;

/// A rejection reported by the platform (worker container, cache storage,
/// sync manager or install prompt).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    #[error("Security error: {0}")]
    Security(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Aborted: {0}")]
    Aborted(String),
}

/// Errors surfaced to callers of the PWA manager.
///
/// Unsupported platform features are never errors; the affected operation
/// is a no-op instead.
#[derive(Error, Debug)]
pub enum PwaError {
    #[error("Service worker registration failed: {0}")]
    Registration(#[source] PlatformError),

    #[error("Service worker unregistration failed: {0}")]
    Unregistration(#[source] PlatformError),

    #[error("Service worker update failed: {0}")]
    Update(#[source] PlatformError),

    #[error("Background sync registration failed: {0}")]
    SyncRegistration(#[source] PlatformError),

    #[error("Failed to clear caches: {0}")]
    CacheClear(#[source] PlatformError),

    #[error("Event bridge already attached")]
    BridgeAttached,
}

impl PwaError {
    /// The underlying platform rejection, if any.
    pub fn platform_error(&self) -> Option<&PlatformError> {
        match self {
            PwaError::Registration(e)
            | PwaError::Unregistration(e)
            | PwaError::Update(e)
            | PwaError::SyncRegistration(e)
            | PwaError::CacheClear(e) => Some(e),
            PwaError::BridgeAttached => None,
        }
    }

    /// Get the error category for logging.
    pub fn category(&self) -> &'static str {
        match self {
            PwaError::Registration(_) => "registration",
            PwaError::Unregistration(_) => "unregistration",
            PwaError::Update(_) => "update",
            PwaError::SyncRegistration(_) => "sync_registration",
            PwaError::CacheClear(_) => "cache_clear",
            PwaError::BridgeAttached => "bridge",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_categories() {
        let err = PwaError::Registration(PlatformError::Security("bad origin".into()));
        assert_eq!(err.category(), "registration");
        assert_eq!(PwaError::BridgeAttached.category(), "bridge");
    }

    #[test]
    fn test_error_source_chain() {
        let err = PwaError::SyncRegistration(PlatformError::InvalidState("no worker".into()));
        assert_eq!(
            err.platform_error(),
            Some(&PlatformError::InvalidState("no worker".into()))
        );
        assert!(err.source().is_some());
        assert!(PwaError::BridgeAttached.source().is_none());
    }
}
