//! Content normalization.
//!
//! Turns a JSON or URL-encoded request body into a [`RawValueMap`] so both
//! formats share one field binding path.

use crate::codec::JsonCodec;
use crate::error::{BindError, BindResult};
use crate::RawValueMap;
use serde_json::Value;
use std::fmt;

/// A body format the binders understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaType {
    /// `application/json`
    Json,
    /// `application/x-www-form-urlencoded`
    FormUrlEncoded,
}

impl MediaType {
    /// Every supported format.
    pub const ALL: &'static [MediaType] = &[MediaType::Json, MediaType::FormUrlEncoded];

    /// Detects the format from a `Content-Type` value.
    ///
    /// Parameters such as `charset` are ignored. Returns `None` for a missing,
    /// unparseable or unsupported content type.
    ///
    /// # Example
    ///
    /// ```rust
    /// use reqbind::MediaType;
    ///
    /// assert_eq!(
    ///     MediaType::detect(Some("application/json; charset=utf-8")),
    ///     Some(MediaType::Json)
    /// );
    /// assert_eq!(MediaType::detect(Some("text/plain")), None);
    /// assert_eq!(MediaType::detect(None), None);
    /// ```
    #[must_use]
    pub fn detect(content_type: Option<&str>) -> Option<Self> {
        let mime: mime::Mime = content_type?.trim().parse().ok()?;
        let essence = mime.essence_str();
        if essence == mime::APPLICATION_JSON.essence_str() {
            Some(Self::Json)
        } else if essence == mime::APPLICATION_WWW_FORM_URLENCODED.essence_str() {
            Some(Self::FormUrlEncoded)
        } else {
            None
        }
    }

    /// Returns the canonical content type string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::FormUrlEncoded => "application/x-www-form-urlencoded",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalizes a complete body of a known format.
///
/// # Errors
///
/// Returns [`BindError::MalformedBody`] if the body cannot be read as
/// `media_type`.
pub fn normalize(body: &[u8], media_type: MediaType, codec: &dyn JsonCodec) -> BindResult<RawValueMap> {
    match media_type {
        MediaType::Json => normalize_json(body, codec),
        MediaType::FormUrlEncoded => parse_form(body),
    }
}

/// Flattens a single-level JSON object.
///
/// Arrays become multi-valued entries, strings are stored unquoted, other
/// scalars use their canonical text and nested values their compact JSON
/// text. `null` counts as absent. An empty body is an empty map.
fn normalize_json(body: &[u8], codec: &dyn JsonCodec) -> BindResult<RawValueMap> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(RawValueMap::new());
    }

    let document = codec
        .parse_document(body)
        .map_err(|e| BindError::malformed_body(MediaType::Json.as_str(), e.to_string()))?;

    let Value::Object(object) = document else {
        return Err(BindError::malformed_body(
            MediaType::Json.as_str(),
            format!("expected a JSON object, got {}", json_kind(&document)),
        ));
    };

    let mut map = RawValueMap::with_capacity(object.len());
    for (name, value) in object {
        match value {
            Value::Null => {}
            Value::Array(items) => {
                map.extend_values(name, items.into_iter().filter(|v| !v.is_null()).map(stringify));
            }
            other => map.push(name, stringify(other)),
        }
    }
    Ok(map)
}

/// Parses `application/x-www-form-urlencoded` bytes, keeping repeated keys.
pub(crate) fn parse_form(body: &[u8]) -> BindResult<RawValueMap> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body).map_err(|e| {
        BindError::malformed_body(MediaType::FormUrlEncoded.as_str(), e.to_string())
    })?;
    Ok(pairs.into_iter().collect())
}

fn stringify(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
