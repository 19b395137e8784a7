//! Logging bootstrap for reqbind services.
//!
//! The binders emit `tracing` events and `metrics` measurements but never
//! install a subscriber or recorder themselves. This crate provides the
//! subscriber side:
//!
//! - **Logging**: JSON or pretty `tracing-subscriber` output behind an `EnvFilter`
//! - **Field names**: the keys the binders use in their log events
//!
//! # Example
//!
//! ```rust,ignore
//! use reqbind_telemetry::{init_logging, LogConfig, LogFormat};
//!
//! let config = LogConfig::production().with_level("info,reqbind=debug");
//! init_logging(&config)?;
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, init_logging, LogConfig, LogFormat};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
