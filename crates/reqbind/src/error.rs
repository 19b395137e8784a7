//! Binding error types.
//!
//! This module provides [`BindError`], the error returned by both binders, and
//! the [`Violation`] records it carries.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type alias using [`BindError`].
pub type BindResult<T> = Result<T, BindError>;

/// Why a single field failed to bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationReason {
    /// A required field was absent or empty.
    MissingRequired,
    /// A present value (or a declared default) could not be coerced.
    InvalidType,
    /// The field's declared type has no coercion rule.
    UnsupportedType,
}

impl ViolationReason {
    /// Returns the snake_case label used in logs and metrics.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::MissingRequired => "missing_required",
            Self::InvalidType => "invalid_type",
            Self::UnsupportedType => "unsupported_type",
        }
    }
}

impl fmt::Display for ViolationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single reported binding failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// External name of the offending field.
    pub field: String,
    /// Failure category.
    pub reason: ViolationReason,
    /// Human-readable message.
    pub message: String,
}

impl Violation {
    /// Creates a missing-required violation.
    ///
    /// The message is `message` when non-empty, otherwise the field name.
    #[must_use]
    pub fn missing(field: impl Into<String>, message: &str) -> Self {
        let field = field.into();
        let message = if message.is_empty() {
            field.clone()
        } else {
            message.to_string()
        };
        Self {
            field,
            reason: ViolationReason::MissingRequired,
            message,
        }
    }
}

/// Ordered collection of violations.
///
/// Displays as the comma-separated list of violation messages.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Violations(Vec<Violation>);

impl Violations {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a violation.
    pub fn push(&mut self, violation: Violation) {
        self.0.push(violation);
    }

    /// Returns true if no violations were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of violations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns an iterator over the violations in report order.
    pub fn iter(&self) -> std::slice::Iter<'_, Violation> {
        self.0.iter()
    }

    /// Returns the messages in report order.
    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|v| v.message.as_str())
    }

    /// Returns the external names of the offending fields.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|v| v.field.as_str())
    }

    /// Consumes the collection and returns the inner vector.
    #[must_use]
    pub fn into_inner(self) -> Vec<Violation> {
        self.0
    }
}

impl From<Vec<Violation>> for Violations {
    fn from(violations: Vec<Violation>) -> Self {
        Self(violations)
    }
}

impl From<Violation> for Violations {
    fn from(violation: Violation) -> Self {
        Self(vec![violation])
    }
}

impl<'a> IntoIterator for &'a Violations {
    type Item = &'a Violation;
    type IntoIter = std::slice::Iter<'a, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, message) in self.messages().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(message)?;
        }
        Ok(())
    }
}

/// Where a coerced value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueOrigin {
    /// The value was supplied by the request.
    Request,
    /// The value is the field's declared default.
    Default,
}

/// Error returned by the body and query/form binders.
///
/// # Example
///
/// ```rust
/// use reqbind::{BindError, Violation};
/// use http::StatusCode;
///
/// let err = BindError::missing(vec![
///     Violation::missing("age", ""),
///     Violation::missing("hobbies", "Hobbies are required"),
/// ]);
///
/// assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
/// assert_eq!(
///     err.to_string(),
///     "missing required parameters: age, Hobbies are required"
/// );
/// ```
#[derive(Debug, Error)]
pub enum BindError {
    /// The body's content type is not JSON or URL-encoded form data.
    #[error("unsupported content type: {content_type}")]
    UnsupportedContentType {
        /// The rejected content type (`"none"` when the header was absent).
        content_type: String,
    },

    /// The body could not be read as the declared content type.
    #[error("malformed {content_type} body: {reason}")]
    MalformedBody {
        /// The declared content type.
        content_type: String,
        /// What went wrong.
        reason: String,
    },

    /// The body exceeds the configured size limit.
    #[error("payload too large: max {limit} bytes, got {actual} bytes")]
    PayloadTooLarge {
        /// Configured limit in bytes.
        limit: usize,
        /// Actual body size in bytes.
        actual: usize,
    },

    /// One or more required parameters were absent.
    #[error("missing required parameters: {0}")]
    MissingParameters(Violations),

    /// A value could not be coerced into the field's declared type.
    #[error("{}", invalid_value_message(.field, .origin, .cause))]
    InvalidFieldValue {
        /// External name of the field.
        field: String,
        /// Whether the bad value came from the request or the declared default.
        origin: ValueOrigin,
        /// Underlying cause.
        cause: String,
    },

    /// The field's declared type has no coercion rule.
    #[error("unsupported type {type_name} for parameter '{field}'")]
    UnsupportedFieldType {
        /// External name of the field.
        field: String,
        /// Rendered type descriptor.
        type_name: String,
    },
}

fn invalid_value_message(field: &str, origin: &ValueOrigin, cause: &str) -> String {
    match origin {
        ValueOrigin::Request => format!("invalid value for parameter '{field}': {cause}"),
        ValueOrigin::Default => format!("invalid default value for parameter '{field}': {cause}"),
    }
}

impl BindError {
    /// Creates an unsupported content type error.
    #[must_use]
    pub fn unsupported_content_type(content_type: Option<&str>) -> Self {
        Self::UnsupportedContentType {
            content_type: content_type.unwrap_or("none").to_string(),
        }
    }

    /// Creates a malformed body error.
    #[must_use]
    pub fn malformed_body(content_type: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedBody {
            content_type: content_type.into(),
            reason: reason.into(),
        }
    }

    /// Creates a missing parameters error.
    #[must_use]
    pub fn missing(violations: impl Into<Violations>) -> Self {
        Self::MissingParameters(violations.into())
    }

    /// Creates an invalid value error.
    #[must_use]
    pub fn invalid_value(
        field: impl Into<String>,
        origin: ValueOrigin,
        cause: impl Into<String>,
    ) -> Self {
        Self::InvalidFieldValue {
            field: field.into(),
            origin,
            cause: cause.into(),
        }
    }

    /// Creates an unsupported field type error.
    #[must_use]
    pub fn unsupported_type(field: impl Into<String>, type_name: impl fmt::Display) -> Self {
        Self::UnsupportedFieldType {
            field: field.into(),
            type_name: type_name.to_string(),
        }
    }

    /// Returns the violations described by this error.
    ///
    /// Body-level failures (content type, malformed body, payload size) carry
    /// no per-field violation and return an empty list.
    #[must_use]
    pub fn violations(&self) -> Vec<Violation> {
        match self {
            Self::MissingParameters(violations) => violations.iter().cloned().collect(),
            Self::InvalidFieldValue { field, .. } => vec![Violation {
                field: field.clone(),
                reason: ViolationReason::InvalidType,
                message: self.to_string(),
            }],
            Self::UnsupportedFieldType { field, .. } => vec![Violation {
                field: field.clone(),
                reason: ViolationReason::UnsupportedType,
                message: self.to_string(),
            }],
            Self::UnsupportedContentType { .. }
            | Self::MalformedBody { .. }
            | Self::PayloadTooLarge { .. } => Vec::new(),
        }
    }

    /// Returns the offending field name, if the error concerns one field.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::InvalidFieldValue { field, .. } | Self::UnsupportedFieldType { field, .. } => {
                Some(field)
            }
            Self::MissingParameters(violations) => violations.fields().next(),
            _ => None,
        }
    }

    /// Returns true if the error points at a contract bug rather than bad input.
    ///
    /// Invalid default values and unsupported field types are fixed in code,
    /// not by resubmitting the request.
    #[must_use]
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedFieldType { .. }
                | Self::InvalidFieldValue {
                    origin: ValueOrigin::Default,
                    ..
                }
        )
    }

    /// Returns the appropriate HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        if self.is_configuration_error() {
            return StatusCode::INTERNAL_SERVER_ERROR;
        }
        match self {
            Self::UnsupportedContentType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    /// Returns the error code suitable for error envelopes.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnsupportedContentType { .. } => "UNSUPPORTED_MEDIA_TYPE",
            Self::MalformedBody { .. } => "MALFORMED_BODY",
            Self::PayloadTooLarge { .. } => "PAYLOAD_TOO_LARGE",
            Self::MissingParameters(_) => "MISSING_PARAMETER",
            Self::InvalidFieldValue {
                origin: ValueOrigin::Default,
                ..
            } => "INVALID_DEFAULT",
            Self::InvalidFieldValue { .. } => "INVALID_PARAMETER",
            Self::UnsupportedFieldType { .. } => "UNSUPPORTED_FIELD_TYPE",
        }
    }
}

/// Error raised while assembling a [`Contract`](crate::Contract).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractError {
    /// A field was declared with an empty external name.
    #[error("field at position {position} has an empty external name")]
    EmptyName {
        /// Zero-based declaration position.
        position: usize,
    },

    /// Two fields share an external name.
    #[error("duplicate external name '{name}'")]
    DuplicateName {
        /// The repeated name.
        name: String,
    },
}
