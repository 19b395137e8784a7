//! Shared coercion rules for both binders.
//!
//! A [`Coercer`] turns raw request strings into a [`ParamValue`] of a field's
//! declared [`TypeDescriptor`]. The two places where historical binders
//! disagreed (enum case handling and boolean strictness) are explicit
//! [`CoercionPolicy`] options.

use crate::codec::{JsonCodec, SerdeJsonCodec};
use crate::error::{BindError, ValueOrigin};
use crate::{ParamValue, TypeDescriptor};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::sync::Arc;
use thiserror::Error;

/// How raw values are matched against enum case names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnumCase {
    /// The raw value must equal a case name exactly.
    #[default]
    Exact,
    /// The raw value is uppercased before the exact match.
    Uppercase,
}

/// How raw values are parsed as booleans.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoolParsing {
    /// Only case-insensitive `true` / `false` are accepted.
    #[default]
    Strict,
    /// Case-insensitive `true` is true, anything else is false.
    Lenient,
}

/// How surrounding whitespace is treated when parsing numbers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberParsing {
    /// The raw value must be a number with no surrounding whitespace.
    #[default]
    Exact,
    /// Leading and trailing whitespace is trimmed before parsing.
    Trimmed,
}

/// Case-sensitivity and strictness settings for coercion.
///
/// # Example
///
/// ```rust
/// use reqbind::{BoolParsing, CoercionPolicy, EnumCase};
///
/// let policy = CoercionPolicy::default();
/// assert_eq!(policy.enum_case, EnumCase::Exact);
/// assert_eq!(policy.boolean_parsing, BoolParsing::Strict);
///
/// let legacy = CoercionPolicy::legacy_body();
/// assert_eq!(legacy.enum_case, EnumCase::Uppercase);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct CoercionPolicy {
    /// Enum matching mode.
    pub enum_case: EnumCase,
    /// Boolean parsing mode.
    pub boolean_parsing: BoolParsing,
    /// Number parsing mode.
    pub number_parsing: NumberParsing,
}

impl CoercionPolicy {
    /// Creates a policy with exact number parsing.
    #[must_use]
    pub const fn new(enum_case: EnumCase, boolean_parsing: BoolParsing) -> Self {
        Self {
            enum_case,
            boolean_parsing,
            number_parsing: NumberParsing::Exact,
        }
    }

    /// Behavior of the historical body binder: uppercased enums, lenient booleans.
    #[must_use]
    pub const fn legacy_body() -> Self {
        Self::new(EnumCase::Uppercase, BoolParsing::Lenient)
    }

    /// Behavior of the historical query/form binder: exact enums, lenient
    /// booleans, trimmed numbers.
    #[must_use]
    pub const fn legacy_params() -> Self {
        Self::new(EnumCase::Exact, BoolParsing::Lenient).with_number_parsing(NumberParsing::Trimmed)
    }

    /// Returns a copy with a different enum matching mode.
    #[must_use]
    pub const fn with_enum_case(mut self, enum_case: EnumCase) -> Self {
        self.enum_case = enum_case;
        self
    }

    /// Returns a copy with a different boolean parsing mode.
    #[must_use]
    pub const fn with_boolean_parsing(mut self, boolean_parsing: BoolParsing) -> Self {
        self.boolean_parsing = boolean_parsing;
        self
    }

    /// Returns a copy with a different number parsing mode.
    #[must_use]
    pub const fn with_number_parsing(mut self, number_parsing: NumberParsing) -> Self {
        self.number_parsing = number_parsing;
        self
    }
}

/// Failure to coerce raw values into a declared type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoerceError {
    /// The value is not a valid instance of the declared type.
    #[error("{0}")]
    Invalid(String),

    /// The declared type has no coercion rule.
    #[error("unsupported type {0}")]
    Unsupported(String),
}

impl CoerceError {
    /// Converts into a binding error for `field`.
    #[must_use]
    pub fn into_bind_error(self, field: &str, origin: ValueOrigin) -> BindError {
        match self {
            Self::Invalid(cause) => BindError::invalid_value(field, origin, cause),
            Self::Unsupported(type_name) => BindError::unsupported_type(field, type_name),
        }
    }
}

/// Applies the coercion rules under one [`CoercionPolicy`].
///
/// A coercer is immutable and cheap to clone; one instance is typically
/// shared by every binding call of a binder.
///
/// # Example
///
/// ```rust
/// use reqbind::{Coercer, ParamValue, TypeDescriptor};
///
/// let coercer = Coercer::default();
/// let value = coercer
///     .coerce(&["1, 3, 3".to_string()], &TypeDescriptor::list(TypeDescriptor::Integer))
///     .unwrap();
///
/// assert_eq!(
///     value,
///     ParamValue::List(vec![
///         ParamValue::Integer(1),
///         ParamValue::Integer(3),
///         ParamValue::Integer(3),
///     ])
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Coercer {
    policy: CoercionPolicy,
    codec: Arc<dyn JsonCodec>,
}

impl Default for Coercer {
    fn default() -> Self {
        Self::new(CoercionPolicy::default())
    }
}

impl Coercer {
    /// Creates a coercer using the `serde_json` codec.
    #[must_use]
    pub fn new(policy: CoercionPolicy) -> Self {
        Self::with_codec(policy, Arc::new(SerdeJsonCodec))
    }

    /// Creates a coercer with a custom JSON codec.
    #[must_use]
    pub fn with_codec(policy: CoercionPolicy, codec: Arc<dyn JsonCodec>) -> Self {
        Self { policy, codec }
    }

    /// Returns the coercion policy.
    #[must_use]
    pub fn policy(&self) -> CoercionPolicy {
        self.policy
    }

    /// Returns the JSON codec.
    #[must_use]
    pub fn codec(&self) -> &Arc<dyn JsonCodec> {
        &self.codec
    }

    /// Coerces present raw values into `ty`.
    ///
    /// Scalars and complex types use the first value. Lists use every value
    /// when there are several, otherwise the single value split on `,`.
    ///
    /// # Errors
    ///
    /// Returns [`CoerceError::Invalid`] for values that do not parse and
    /// [`CoerceError::Unsupported`] for list element types that are not scalar.
    pub fn coerce(&self, raw: &[String], ty: &TypeDescriptor) -> Result<ParamValue, CoerceError> {
        match ty {
            TypeDescriptor::List(element) => {
                if !element.is_scalar() {
                    return Err(CoerceError::Unsupported(ty.to_string()));
                }
                let items = match raw {
                    [single] => split_list(single)
                        .into_iter()
                        .map(|segment| self.scalar(segment, element))
                        .collect::<Result<Vec<_>, _>>()?,
                    values => values
                        .iter()
                        .map(|value| self.scalar(value, element))
                        .collect::<Result<Vec<_>, _>>()?,
                };
                Ok(ParamValue::List(items))
            }
            TypeDescriptor::Complex { .. } => {
                let first = raw.first().map_or("", String::as_str);
                Ok(ParamValue::Complex(self.codec.encode_scalar(first)))
            }
            scalar => self.scalar(raw.first().map_or("", String::as_str), scalar),
        }
    }

    /// Coerces a declared default value into `ty` with the same rules as live
    /// values.
    ///
    /// # Errors
    ///
    /// Same as [`Coercer::coerce`].
    pub fn coerce_default(&self, default: &str, ty: &TypeDescriptor) -> Result<ParamValue, CoerceError> {
        self.coerce(std::slice::from_ref(&default.to_string()), ty)
    }

    fn scalar(&self, raw: &str, ty: &TypeDescriptor) -> Result<ParamValue, CoerceError> {
        match ty {
            TypeDescriptor::String => Ok(ParamValue::String(raw.to_string())),
            TypeDescriptor::Integer => self
                .number(raw)
                .parse()
                .map(ParamValue::Integer)
                .map_err(|e| CoerceError::Invalid(format!("'{raw}' is not a valid integer: {e}"))),
            TypeDescriptor::Long => self
                .number(raw)
                .parse()
                .map(ParamValue::Long)
                .map_err(|e| CoerceError::Invalid(format!("'{raw}' is not a valid long: {e}"))),
            TypeDescriptor::Float => self
                .number(raw)
                .parse()
                .map(ParamValue::Float)
                .map_err(|e| CoerceError::Invalid(format!("'{raw}' is not a valid float: {e}"))),
            TypeDescriptor::Boolean => self.boolean(raw).map(ParamValue::Boolean),
            TypeDescriptor::Enum { name, cases } => self.enum_case(raw, name, cases),
            other => Err(CoerceError::Unsupported(other.to_string())),
        }
    }

    fn number<'a>(&self, raw: &'a str) -> &'a str {
        match self.policy.number_parsing {
            NumberParsing::Exact => raw,
            NumberParsing::Trimmed => raw.trim(),
        }
    }

    fn boolean(&self, raw: &str) -> Result<bool, CoerceError> {
        if raw.eq_ignore_ascii_case("true") {
            return Ok(true);
        }
        match self.policy.boolean_parsing {
            BoolParsing::Lenient => Ok(false),
            BoolParsing::Strict if raw.eq_ignore_ascii_case("false") => Ok(false),
            BoolParsing::Strict => Err(CoerceError::Invalid(format!(
                "'{raw}' is not a valid boolean"
            ))),
        }
    }

    fn enum_case(
        &self,
        raw: &str,
        name: &str,
        cases: &'static [&'static str],
    ) -> Result<ParamValue, CoerceError> {
        let candidate = match self.policy.enum_case {
            EnumCase::Exact => Cow::Borrowed(raw),
            EnumCase::Uppercase => Cow::Owned(raw.to_uppercase()),
        };
        cases
            .iter()
            .copied()
            .find(|case| *case == candidate)
            .map(ParamValue::Enum)
            .ok_or_else(|| {
                CoerceError::Invalid(format!(
                    "'{raw}' is not a case of {name} (expected one of {})",
                    cases.join(", ")
                ))
            })
    }
}

/// Splits a single raw list value into trimmed segments.
///
/// Trailing empty segments are dropped, so `"a,b,"` yields two segments.
fn split_list(raw: &str) -> Vec<&str> {
    let mut segments: Vec<&str> = raw.split(',').map(str::trim).collect();
    while segments.last().is_some_and(|s| s.is_empty()) {
        segments.pop();
    }
    segments
}
