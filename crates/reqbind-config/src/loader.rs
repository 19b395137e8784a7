//! Configuration loader with layered approach.
//!
//! This module provides the [`ConfigLoader`] for loading configuration from
//! multiple sources: defaults, files, and environment variables.

use std::env;
use std::fs;
use std::path::Path;

use reqbind::{BoolParsing, EnumCase, NumberParsing};
use reqbind_telemetry::LogFormat;

use crate::{BinderConfig, ConfigError};

/// Configuration loader with layered approach.
///
/// The loader applies configuration in layers, with later layers overriding
/// earlier ones:
/// 1. Default values (or the legacy preset)
/// 2. Configuration file (TOML or JSON)
/// 3. Environment variables
///
/// A file replaces the whole configuration; sections and keys it omits take
/// their default values.
///
/// # Example
///
/// ```no_run
/// use reqbind_config::ConfigLoader;
///
/// # fn main() -> Result<(), reqbind_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_defaults()
///     .with_file("reqbind.toml")?
///     .with_env_prefix("REQBIND")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: BinderConfig,
    env_prefix: Option<String>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a new configuration loader starting from defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: BinderConfig::default(),
            env_prefix: None,
        }
    }

    /// Start with default configuration values.
    ///
    /// This is called automatically by `new()`, but can be chained for clarity.
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        self.config = BinderConfig::default();
        self
    }

    /// Start with the legacy preset.
    ///
    /// # Example
    ///
    /// ```
    /// use reqbind::EnumCase;
    /// use reqbind_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new().with_legacy().load().unwrap();
    /// assert_eq!(config.body.enum_case, EnumCase::Uppercase);
    /// ```
    #[must_use]
    pub fn with_legacy(mut self) -> Self {
        self.config = BinderConfig::legacy();
        self
    }

    /// Load configuration from a file.
    ///
    /// Supports TOML (.toml) and JSON (.json) formats.
    /// The file format is determined by the file extension.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - The file does not exist
    /// - The file cannot be read
    /// - The extension is neither `toml` nor `json`
    /// - The file contains invalid TOML/JSON or unknown fields
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;

        self.config = Self::parse_file(&content, path)?;
        tracing::debug!(path = %path.display(), "loaded binder configuration file");

        Ok(self)
    }

    /// Load configuration from an optional file.
    ///
    /// If the file exists, loads it. If not, silently continues.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be loaded.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Load configuration from a string.
    ///
    /// `format` is `"toml"` or `"json"`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the format is unknown or parsing fails.
    ///
    /// # Example
    ///
    /// ```
    /// use reqbind_config::ConfigLoader;
    ///
    /// let toml = r#"
    ///     [body]
    ///     max_body_size = 65536
    /// "#;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string(toml, "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.body.max_body_size, 65536);
    /// ```
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = match format.to_lowercase().as_str() {
            "toml" => toml::from_str(content)?,
            "json" => serde_json::from_str(content)?,
            _ => return Err(ConfigError::unsupported_format(format)),
        };
        Ok(self)
    }

    /// Set environment variable prefix for overrides.
    ///
    /// Environment variables use the format `PREFIX__SECTION__KEY`.
    /// For example, with prefix "REQBIND":
    /// - `REQBIND__BODY__MAX_BODY_SIZE=65536`
    /// - `REQBIND__PARAMS__BOOLEAN_PARSING=lenient`
    /// - `REQBIND__LOGGING__FORMAT=pretty`
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Load a `.env` file into the process environment.
    ///
    /// A missing `.env` file is not an error.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Dotenv` if a `.env` file exists but cannot be parsed.
    pub fn with_dotenv(self) -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!(path = %path.display(), "loaded .env file"),
            Err(e) if e.not_found() => {}
            Err(e) => return Err(e.into()),
        }
        Ok(self)
    }

    /// Finalize and return the loaded configuration.
    ///
    /// Applies environment variable overrides (if a prefix was set) and
    /// validates the final configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an environment variable cannot be parsed or
    /// validation fails.
    pub fn load(mut self) -> Result<BinderConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            self.apply_env_overrides(&prefix)?;
        }

        self.config.validate()?;

        Ok(self.config)
    }

    /// Finalize without environment overrides or validation.
    #[must_use]
    pub fn load_unvalidated(self) -> BinderConfig {
        self.config
    }

    // Parse configuration file based on extension
    fn parse_file(content: &str, path: &Path) -> Result<BinderConfig, ConfigError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        match extension.as_deref() {
            Some("toml") => Ok(toml::from_str(content)?),
            Some("json") => Ok(serde_json::from_str(content)?),
            _ => Err(ConfigError::unsupported_format(path.display().to_string())),
        }
    }

    fn apply_env_overrides(&mut self, prefix: &str) -> Result<(), ConfigError> {
        let mut vars: Vec<(String, String)> = env::vars()
            .filter(|(k, _)| k.starts_with(prefix))
            .collect();
        vars.sort();

        for (key, value) in vars {
            self.apply_env_var(&key, &value, prefix)?;
        }

        Ok(())
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let Some(key_without_prefix) = key.strip_prefix(prefix).and_then(|k| k.strip_prefix("__"))
        else {
            // Another variable that happens to share the prefix.
            return Ok(());
        };

        let parts: Vec<&str> = key_without_prefix.split("__").collect();

        match parts.as_slice() {
            ["BODY", "MAX_BODY_SIZE"] => {
                self.config.body.max_body_size = value
                    .parse()
                    .map_err(|_| ConfigError::env_parse_error(key, "expected integer"))?;
            }
            ["BODY", "ENUM_CASE"] => {
                self.config.body.enum_case = parse_enum_case(key, value)?;
            }
            ["BODY", "BOOLEAN_PARSING"] => {
                self.config.body.boolean_parsing = parse_boolean_parsing(key, value)?;
            }
            ["BODY", "NUMBER_PARSING"] => {
                self.config.body.number_parsing = parse_number_parsing(key, value)?;
            }

            ["PARAMS", "ENUM_CASE"] => {
                self.config.params.enum_case = parse_enum_case(key, value)?;
            }
            ["PARAMS", "BOOLEAN_PARSING"] => {
                self.config.params.boolean_parsing = parse_boolean_parsing(key, value)?;
            }
            ["PARAMS", "NUMBER_PARSING"] => {
                self.config.params.number_parsing = parse_number_parsing(key, value)?;
            }

            ["LOGGING", "ENABLED"] => {
                self.config.logging.enabled = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }
            ["LOGGING", "LEVEL"] => {
                self.config.logging.level = value.to_string();
            }
            ["LOGGING", "FORMAT"] => {
                self.config.logging.format = value
                    .parse::<LogFormat>()
                    .map_err(|_| ConfigError::env_parse_error(key, "expected 'json' or 'pretty'"))?;
            }

            _ => tracing::debug!(var = key, "ignoring unknown configuration variable"),
        }

        Ok(())
    }
}

fn parse_enum_case(key: &str, value: &str) -> Result<EnumCase, ConfigError> {
    match value.to_lowercase().as_str() {
        "exact" => Ok(EnumCase::Exact),
        "uppercase" => Ok(EnumCase::Uppercase),
        _ => Err(ConfigError::env_parse_error(
            key,
            "expected 'exact' or 'uppercase'",
        )),
    }
}

fn parse_boolean_parsing(key: &str, value: &str) -> Result<BoolParsing, ConfigError> {
    match value.to_lowercase().as_str() {
        "strict" => Ok(BoolParsing::Strict),
        "lenient" => Ok(BoolParsing::Lenient),
        _ => Err(ConfigError::env_parse_error(
            key,
            "expected 'strict' or 'lenient'",
        )),
    }
}

fn parse_number_parsing(key: &str, value: &str) -> Result<NumberParsing, ConfigError> {
    match value.to_lowercase().as_str() {
        "exact" => Ok(NumberParsing::Exact),
        "trimmed" => Ok(NumberParsing::Trimmed),
        _ => Err(ConfigError::env_parse_error(
            key,
            "expected 'exact' or 'trimmed'",
        )),
    }
}

/// Parse a boolean from a string.
fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
