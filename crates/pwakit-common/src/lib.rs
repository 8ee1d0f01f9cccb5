//! # PWAKit Common
//!
//! Configuration and logging setup shared by the PWAKit crates.
//!
//! ## Features
//!
//! - `PwaConfig`: worker script location, notification capacity, prompt policy
//! - Logging configuration and setup

pub mod config;
pub mod logging;

pub use config::{ConfigError, PwaConfig};
pub use logging::{init_logging, LogConfig, LogFormat};
