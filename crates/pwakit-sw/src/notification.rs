//! Application-level notifications.

use serde::{Deserialize, Serialize};

/// Wire name of [`PwaNotification::InstallabilityChanged`].
pub const INSTALLABILITY_CHANGED: &str = "pwa-installability-changed";
/// Wire name of [`PwaNotification::OnlineStatusChanged`].
pub const ONLINE_STATUS_CHANGED: &str = "pwa-online-status-changed";

/// Notifications dispatched by the event bridge.
///
/// Serialized as `{"type": "<name>", "detail": {...}}`, the shape of a DOM
/// `CustomEvent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "detail")]
pub enum PwaNotification {
    #[serde(rename = "pwa-installability-changed", rename_all = "camelCase")]
    InstallabilityChanged { can_install: bool },

    #[serde(rename = "pwa-online-status-changed", rename_all = "camelCase")]
    OnlineStatusChanged { is_online: bool },
}

impl PwaNotification {
    /// Wire name.
    pub fn name(&self) -> &'static str {
        match self {
            PwaNotification::InstallabilityChanged { .. } => INSTALLABILITY_CHANGED,
            PwaNotification::OnlineStatusChanged { .. } => ONLINE_STATUS_CHANGED,
        }
    }
}
