//! Main configuration type.
//!
//! This module provides the top-level [`BinderConfig`] struct and the
//! conversions into runtime binders.

use reqbind::{BodyBinder, BoolParsing, Coercer, EnumCase, NumberParsing, ParamBinder};
use reqbind_telemetry::{create_env_filter, LogConfig};
use serde::{Deserialize, Serialize};

use crate::{BodySection, ConfigError, LoggingSection, ParamsSection};

/// Complete binder configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load configuration from files
/// and environment variables.
///
/// # Example
///
/// ```
/// use reqbind_config::BinderConfig;
///
/// let config = BinderConfig::default();
/// let binder = config.body_binder();
/// assert_eq!(binder.max_body_size(), 1024 * 1024);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct BinderConfig {
    /// Body binder configuration.
    #[serde(default)]
    pub body: BodySection,

    /// Query/form binder configuration.
    #[serde(default)]
    pub params: ParamsSection,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSection,
}

impl BinderConfig {
    /// Create a preset that reproduces the historical binders.
    ///
    /// The body binder uppercases enum values, both binders read booleans
    /// leniently and the query/form binder trims numbers.
    ///
    /// # Example
    ///
    /// ```
    /// use reqbind::{CoercionPolicy, EnumCase};
    /// use reqbind_config::BinderConfig;
    ///
    /// let config = BinderConfig::legacy();
    /// assert_eq!(config.body.enum_case, EnumCase::Uppercase);
    /// assert_eq!(config.params.policy(), CoercionPolicy::legacy_params());
    /// ```
    #[must_use]
    pub fn legacy() -> Self {
        let mut config = Self::default();

        config.body.enum_case = EnumCase::Uppercase;
        config.body.boolean_parsing = BoolParsing::Lenient;
        config.params.enum_case = EnumCase::Exact;
        config.params.boolean_parsing = BoolParsing::Lenient;
        config.params.number_parsing = NumberParsing::Trimmed;

        config
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - `body.max_body_size` is zero
    /// - `logging.level` is not a valid filter directive
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.body.max_body_size == 0 {
            return Err(ConfigError::invalid_value(
                "body.max_body_size",
                "must be greater than zero",
            ));
        }

        if self.logging.enabled {
            create_env_filter(&self.logging.level)
                .map_err(|e| ConfigError::invalid_value("logging.level", e.to_string()))?;
        }

        Ok(())
    }

    /// Builds the body binder described by the `[body]` section.
    #[must_use]
    pub fn body_binder(&self) -> BodyBinder {
        BodyBinder::new(Coercer::new(self.body.policy()))
            .with_max_body_size(self.body.max_body_size)
    }

    /// Builds the query/form binder described by the `[params]` section.
    #[must_use]
    pub fn params_binder(&self) -> ParamBinder {
        ParamBinder::new(Coercer::new(self.params.policy()))
    }

    /// Builds the logging configuration described by the `[logging]` section.
    #[must_use]
    pub fn log_config(&self) -> LogConfig {
        self.logging.to_log_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqbind::CoercionPolicy;

    #[test]
    fn test_default_is_valid() {
        assert!(BinderConfig::default().validate().is_ok());
    }

    #[test]
    fn test_legacy_binders() {
        let config = BinderConfig::legacy();
        assert_eq!(
            config.body_binder().coercer().policy(),
            CoercionPolicy::legacy_body()
        );
        assert_eq!(
            config.params_binder().coercer().policy(),
            CoercionPolicy::legacy_params()
        );
    }

    #[test]
    fn test_body_binder_limit() {
        let mut config = BinderConfig::default();
        config.body.max_body_size = 2048;
        assert_eq!(config.body_binder().max_body_size(), 2048);
    }

    #[test]
    fn test_zero_body_size_rejected() {
        let mut config = BinderConfig::default();
        config.body.max_body_size = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("body.max_body_size"));
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let mut config = BinderConfig::default();
        config.logging.level = "reqbind=loudest".to_string();
        assert!(config.validate().is_err());

        config.logging.enabled = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_log_config() {
        let config = BinderConfig::default();
        let log = config.log_config();
        assert!(log.enabled);
        assert_eq!(log.level, "info");
    }
}
