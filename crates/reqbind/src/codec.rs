//! JSON codec used by the content normalizer and complex-type coercion.
//!
//! The codec is a stateless dependency passed into [`Coercer`](crate::Coercer)
//! and the normalizer rather than process-wide state, so callers can swap in
//! their own parser (for example one with size or depth limits).
//!
//! Complex fields go through two steps. The codec turns the raw parameter
//! text into a [`Value`] ([`JsonCodec::encode_scalar`]), then the field's
//! `Deserialize` impl turns that value into the target type (see
//! [`Json`](crate::Json)). A codec controls the first step only; the second
//! is fixed by the target type.

use serde_json::Value;
use std::fmt;

/// JSON encode/decode boundary.
///
/// Implementations must be stateless or internally synchronized: a single codec
/// instance is shared by every binding call.
pub trait JsonCodec: Send + Sync + fmt::Debug {
    /// Parses a complete JSON document.
    ///
    /// # Errors
    ///
    /// Returns the parser error if `bytes` is not valid JSON.
    fn parse_document(&self, bytes: &[u8]) -> Result<Value, serde_json::Error>;

    /// Turns one raw parameter string into the JSON value a complex field is
    /// deserialized from.
    ///
    /// The default treats the raw value as a JSON string scalar. Override it
    /// to accept structured values, for example by parsing the raw text as a
    /// JSON document.
    fn encode_scalar(&self, raw: &str) -> Value {
        Value::String(raw.to_string())
    }
}

/// Default codec backed by `serde_json`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SerdeJsonCodec;

impl JsonCodec for SerdeJsonCodec {
    fn parse_document(&self, bytes: &[u8]) -> Result<Value, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}
