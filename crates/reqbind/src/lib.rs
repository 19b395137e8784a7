//! # reqbind
//!
//! Contract-driven binding of HTTP request data onto typed structs.
//!
//! A target type declares, per field, the external parameter name, whether it
//! is required, a default value and a custom missing-parameter message. Two
//! binders then populate it:
//!
//! | Binder | Source | Failure mode |
//! |--------|--------|--------------|
//! | [`BodyBinder`] | JSON or URL-encoded body | Reports every missing required field, then stops at the first invalid value |
//! | [`ParamBinder`] | Query and form parameters | Stops at the first missing or invalid field |
//!
//! Both share one [`Coercer`], whose [`CoercionPolicy`] decides enum case
//! handling, boolean strictness and whitespace around numbers.
//!
//! Single parameters can also be read without a contract through
//! [`parse_param`], [`parse_optional_param`] and [`parse_delimited_param`].
//!
//! ## Example
//!
//! ```rust
//! use reqbind::{Bind, RequestContext};
//!
//! #[derive(Debug, Default, Bind)]
//! struct UserInfo {
//!     #[param(name = "name", default = "Alice")]
//!     name: String,
//!     #[param(name = "age", required)]
//!     age: i32,
//!     #[param(name = "hobbies", required, message = "Hobbies are required")]
//!     hobbies: Vec<String>,
//!     #[param(name = "favoriteNumbers", default = "1,2,3")]
//!     favorite_numbers: Vec<i32>,
//! }
//!
//! let ctx = RequestContext::builder()
//!     .content_type("application/json")
//!     .body(r#"{"age": 25, "hobbies": ["reading", "swimming"], "favoriteNumbers": [1, 3, 3]}"#)
//!     .build();
//!
//! let user: UserInfo = reqbind::bind_body(&ctx).unwrap();
//! assert_eq!(user.name, "Alice");
//! assert_eq!(user.age, 25);
//! assert_eq!(user.hobbies, vec!["reading", "swimming"]);
//! assert_eq!(user.favorite_numbers, vec![1, 3, 3]);
//! ```
//!
//! ## Errors
//!
//! Every failure is a [`BindError`] that maps to an HTTP status and carries
//! serializable [`Violation`]s:
//!
//! ```rust
//! use reqbind::{BindError, Violation};
//!
//! let err = BindError::missing(Violation::missing("age", ""));
//! assert_eq!(err.status_code(), http::StatusCode::BAD_REQUEST);
//! assert_eq!(err.error_code(), "MISSING_PARAMETER");
//! ```

#![doc(html_root_url = "https://docs.rs/reqbind/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Lets derive output refer to `::reqbind` from inside this crate's tests.
extern crate self as reqbind;

mod body;
mod codec;
mod coerce;
mod contract;
mod descriptor;
mod error;
mod extract;
pub mod metrics;
mod normalize;
mod params;
mod source;
mod value;
mod values;

pub use body::{BodyBinder, DEFAULT_MAX_BODY_SIZE};
pub use codec::{JsonCodec, SerdeJsonCodec};
pub use coerce::{BoolParsing, CoerceError, Coercer, CoercionPolicy, EnumCase, NumberParsing};
pub use contract::{Bindable, Contract, ContractBuilder, FieldContract, FieldSpec};
pub use descriptor::TypeDescriptor;
pub use error::{BindError, BindResult, ContractError, ValueOrigin, Violation, ViolationReason, Violations};
pub use extract::{Body, FromRequest, Params};
pub use normalize::{normalize, MediaType};
pub use params::ParamBinder;
pub use source::{ParamSource, RequestContext, RequestContextBuilder};
pub use value::{FieldValue, Json, ParamEnum, ParamValue};
pub use values::RawValueMap;

#[cfg(feature = "derive")]
pub use reqbind_macros::{Bind, ParamEnum};

/// Binds the body of `source` with a default [`BodyBinder`].
///
/// # Errors
///
/// See [`BodyBinder::bind_with`].
pub fn bind_body<T, S>(source: &S) -> BindResult<T>
where
    T: Bindable,
    S: ParamSource + ?Sized,
{
    BodyBinder::default().bind_request(source)
}

/// Binds the parameters of `source` with a default [`ParamBinder`].
///
/// # Errors
///
/// See [`ParamBinder::bind_with`].
pub fn bind_params<T, S>(source: &S) -> BindResult<T>
where
    T: Bindable,
    S: ParamSource + ?Sized,
{
    ParamBinder::default().bind(source)
}

/// Parses one parameter with a default [`ParamBinder`].
///
/// # Errors
///
/// See [`ParamBinder::parse_param`].
pub fn parse_param<V, S>(source: &S, name: &str, default: &str, required: bool) -> BindResult<V>
where
    V: FieldValue + Default,
    S: ParamSource + ?Sized,
{
    ParamBinder::default().parse_param(source, name, default, required)
}

/// Parses one optional parameter with a default [`ParamBinder`].
///
/// # Errors
///
/// See [`ParamBinder::parse_optional_param`].
pub fn parse_optional_param<V, S>(source: &S, name: &str) -> BindResult<Option<V>>
where
    V: FieldValue,
    S: ParamSource + ?Sized,
{
    ParamBinder::default().parse_optional_param(source, name)
}

/// Parses one possibly comma-separated parameter with a default [`ParamBinder`].
///
/// # Errors
///
/// See [`ParamBinder::parse_delimited`].
pub fn parse_delimited_param<V, S>(
    source: &S,
    name: &str,
    default: &str,
    required: bool,
) -> BindResult<Vec<V>>
where
    V: FieldValue,
    S: ParamSource + ?Sized,
{
    ParamBinder::default().parse_delimited(source, name, default, required)
}
