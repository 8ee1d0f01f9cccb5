//! # PWAKit Service Worker Manager
//!
//! Lifecycle management for an installable, offline-capable web app.
//!
//! ## Features
//!
//! - **Registration**: register, update, update checks and unregistration of
//!   the offline worker
//! - **Install prompt**: capture `beforeinstallprompt`, show it once asked
//! - **Connectivity**: online/offline propagation to listeners
//! - **Cache API**: cache enumeration and clearing
//! - **Background sync**: best-effort tag registration
//! - **Facade**: `{is_installed, is_online, can_install}` for UI code
//!
//! ## Architecture
//!
//! ```text
//! platform signals ──→ PlatformEventSink ──→ EventBridge
//!                                               │
//!                                               ▼
//!                          PwaManager (registration, prompt, online)
//!                                               │
//!                                broadcast PwaNotification
//!                                               │
//!                                               ▼
//!                                          PwaFacade
//! ```
//!
//! The platform itself sits behind the traits in [`platform`]; [`sim`]
//! provides an in-memory implementation.

pub mod bridge;
pub mod error;
pub mod facade;
pub mod manager;
pub mod notification;
pub mod platform;
pub mod sim;

pub use bridge::EventBridge;
pub use error::{PlatformError, PwaError, PwaResult};
pub use facade::{PwaFacade, PwaStatus};
pub use manager::{CacheInfo, LifecycleState, ListenerId, OnlineSubscription, PwaManager};
pub use notification::PwaNotification;
pub use platform::{
    Capabilities, InstallPromptToken, PlatformEvent, PlatformEventSink, RegistrationHandle,
    RegistrationOptions, UserChoice,
};
pub use pwakit_common::PwaConfig;
