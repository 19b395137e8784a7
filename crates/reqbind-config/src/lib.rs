//! Typed configuration for reqbind binders.
//!
//! This crate loads binder settings with support for:
//! - TOML and JSON configuration files
//! - Environment variable overrides
//! - Strict validation (fails on unknown fields)
//! - Layered configuration (defaults → file → env)
//!
//! The loaded [`BinderConfig`] builds configured [`reqbind::BodyBinder`] and
//! [`reqbind::ParamBinder`] instances and a [`reqbind_telemetry::LogConfig`].
//!
//! # Example
//!
//! ```no_run
//! use reqbind_config::ConfigLoader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigLoader::new()
//!     .with_dotenv()?
//!     .with_optional_file("reqbind.toml")?
//!     .with_env_prefix("REQBIND")
//!     .load()?;
//!
//! reqbind_telemetry::init_logging(&config.log_config())?;
//! let body_binder = config.body_binder();
//! let params_binder = config.params_binder();
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [body]
//! max_body_size = 1048576
//! enum_case = "exact"          # or "uppercase"
//! boolean_parsing = "strict"   # or "lenient"
//! number_parsing = "exact"     # or "trimmed"
//!
//! [params]
//! enum_case = "exact"
//! boolean_parsing = "strict"
//! number_parsing = "exact"
//!
//! [logging]
//! enabled = true
//! level = "info"
//! format = "json"              # or "pretty"
//! ```
//!
//! # Environment Variable Overrides
//!
//! Every key can be overridden with `PREFIX__SECTION__KEY`, for example
//! `REQBIND__BODY__MAX_BODY_SIZE=65536`.

#![warn(missing_docs)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::BinderConfig;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{BodySection, LoggingSection, ParamsSection};
