//! Configuration schema types.
//!
//! Each section rejects unknown keys so that a misspelled setting fails at
//! startup instead of silently keeping its default.

use reqbind::{BoolParsing, CoercionPolicy, EnumCase, NumberParsing, DEFAULT_MAX_BODY_SIZE};
use reqbind_telemetry::{LogConfig, LogFormat};
use serde::{Deserialize, Serialize};

/// Body binder section.
///
/// # Example
///
/// ```
/// use reqbind_config::BodySection;
/// use reqbind::{BoolParsing, EnumCase};
///
/// let body = BodySection::default();
/// assert_eq!(body.max_body_size, 1024 * 1024);
/// assert_eq!(body.enum_case, EnumCase::Exact);
/// assert_eq!(body.boolean_parsing, BoolParsing::Strict);
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct BodySection {
    /// Largest accepted request body in bytes.
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,

    /// Enum matching mode.
    #[serde(default)]
    pub enum_case: EnumCase,

    /// Boolean parsing mode.
    #[serde(default)]
    pub boolean_parsing: BoolParsing,

    /// Whitespace handling around numbers.
    #[serde(default)]
    pub number_parsing: NumberParsing,
}

impl Default for BodySection {
    fn default() -> Self {
        Self {
            max_body_size: default_max_body_size(),
            enum_case: EnumCase::default(),
            boolean_parsing: BoolParsing::default(),
            number_parsing: NumberParsing::default(),
        }
    }
}

impl BodySection {
    /// Returns the coercion policy of this section.
    #[must_use]
    pub const fn policy(&self) -> CoercionPolicy {
        CoercionPolicy::new(self.enum_case, self.boolean_parsing)
            .with_number_parsing(self.number_parsing)
    }
}

fn default_max_body_size() -> usize {
    DEFAULT_MAX_BODY_SIZE
}

/// Query/form binder section.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ParamsSection {
    /// Enum matching mode.
    #[serde(default)]
    pub enum_case: EnumCase,

    /// Boolean parsing mode.
    #[serde(default)]
    pub boolean_parsing: BoolParsing,

    /// Whitespace handling around numbers.
    #[serde(default)]
    pub number_parsing: NumberParsing,
}

impl ParamsSection {
    /// Returns the coercion policy of this section.
    #[must_use]
    pub const fn policy(&self) -> CoercionPolicy {
        CoercionPolicy::new(self.enum_case, self.boolean_parsing)
            .with_number_parsing(self.number_parsing)
    }
}

/// Logging section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingSection {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Filter directive (e.g., "info", "reqbind=debug").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

impl LoggingSection {
    /// Converts into a telemetry logging configuration.
    #[must_use]
    pub fn to_log_config(&self) -> LogConfig {
        let base = match self.format {
            LogFormat::Json => LogConfig::production(),
            LogFormat::Pretty => LogConfig::development(),
        };
        LogConfig {
            enabled: self.enabled,
            ..base.with_level(self.level.clone())
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}
