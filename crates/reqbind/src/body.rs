//! Body binder: collect-all presence validation over a normalized body.

use crate::coerce::{Coercer, CoercionPolicy};
use crate::error::{BindError, BindResult, ValueOrigin, Violation, Violations};
use crate::metrics::{record_bind, BinderKind};
use crate::normalize::{normalize, MediaType};
use crate::values::present;
use crate::{Bindable, Contract, ParamSource, RawValueMap};
use std::time::Instant;

/// Default maximum body size (1 MB).
pub const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;

/// Binds a JSON or URL-encoded body into a [`Bindable`] target.
///
/// Binding runs in two phases. The first reports every absent required field
/// at once as [`BindError::MissingParameters`]. The second coerces present
/// values and defaults in declaration order and stops at the first value that
/// does not coerce.
///
/// # Example
///
/// ```rust
/// use reqbind::{BodyBinder, Contract, FieldSpec};
///
/// #[derive(Debug, Default)]
/// struct Signup {
///     name: String,
///     age: i32,
/// }
///
/// let contract = Contract::builder(Signup::default)
///     .field(FieldSpec::new("name").default_value("Alice"), |s: &mut Signup, v: String| s.name = v)
///     .field(FieldSpec::new("age").required(true), |s: &mut Signup, v: i32| s.age = v)
///     .build();
///
/// let binder = BodyBinder::default();
/// let signup = binder
///     .bind_with(&contract, br#"{"age": 25}"#, Some("application/json"))
///     .unwrap();
///
/// assert_eq!(signup.name, "Alice");
/// assert_eq!(signup.age, 25);
/// ```
#[derive(Debug, Clone)]
pub struct BodyBinder {
    coercer: Coercer,
    max_body_size: usize,
}

impl Default for BodyBinder {
    fn default() -> Self {
        Self::new(Coercer::default())
    }
}

impl BodyBinder {
    /// Creates a binder with the default size limit.
    #[must_use]
    pub fn new(coercer: Coercer) -> Self {
        Self {
            coercer,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }

    /// Creates a binder that reproduces the historical body binder's coercion.
    #[must_use]
    pub fn legacy() -> Self {
        Self::new(Coercer::new(CoercionPolicy::legacy_body()))
    }

    /// Sets the maximum accepted body size in bytes.
    #[must_use]
    pub fn with_max_body_size(mut self, max_body_size: usize) -> Self {
        self.max_body_size = max_body_size;
        self
    }

    /// Returns the coercer.
    #[must_use]
    pub fn coercer(&self) -> &Coercer {
        &self.coercer
    }

    /// Returns the maximum accepted body size in bytes.
    #[must_use]
    pub fn max_body_size(&self) -> usize {
        self.max_body_size
    }

    /// Binds `body` of the given content type into `T`.
    ///
    /// # Errors
    ///
    /// See [`BodyBinder::bind_with`].
    pub fn bind<T: Bindable>(&self, body: &[u8], content_type: Option<&str>) -> BindResult<T> {
        self.bind_with(T::contract(), body, content_type)
    }

    /// Binds the body of `source` into `T`.
    ///
    /// # Errors
    ///
    /// See [`BodyBinder::bind_with`].
    pub fn bind_request<T, S>(&self, source: &S) -> BindResult<T>
    where
        T: Bindable,
        S: ParamSource + ?Sized,
    {
        self.bind(source.body(), source.content_type())
    }

    /// Binds `body` into a target described by `contract`.
    ///
    /// # Errors
    ///
    /// - [`BindError::PayloadTooLarge`] if the body exceeds the size limit.
    /// - [`BindError::UnsupportedContentType`] if the content type is not JSON
    ///   or URL-encoded form data, or not accepted by the contract.
    /// - [`BindError::MalformedBody`] if the body does not parse.
    /// - [`BindError::MissingParameters`] listing every absent required field.
    /// - [`BindError::InvalidFieldValue`] or [`BindError::UnsupportedFieldType`]
    ///   for the first field that fails to coerce.
    pub fn bind_with<T>(
        &self,
        contract: &Contract<T>,
        body: &[u8],
        content_type: Option<&str>,
    ) -> BindResult<T> {
        let start = Instant::now();
        tracing::debug!(
            target_type = contract.type_name(),
            content_type = content_type.unwrap_or("none"),
            body_len = body.len(),
            "binding request body"
        );

        let result = self
            .normalize(contract, body, content_type)
            .and_then(|map| self.bind_map(contract, &map));

        report(contract, result.as_ref().map(|_| ()), start);
        result
    }

    fn normalize<T>(
        &self,
        contract: &Contract<T>,
        body: &[u8],
        content_type: Option<&str>,
    ) -> BindResult<RawValueMap> {
        if body.len() > self.max_body_size {
            return Err(BindError::PayloadTooLarge {
                limit: self.max_body_size,
                actual: body.len(),
            });
        }

        let media_type = MediaType::detect(content_type)
            .filter(|media_type| contract.accepts(*media_type))
            .ok_or_else(|| BindError::unsupported_content_type(content_type))?;

        normalize(body, media_type, self.coercer.codec().as_ref())
    }

    /// Binds an already normalized body into a target described by `contract`.
    ///
    /// # Errors
    ///
    /// [`BindError::MissingParameters`] listing every absent required field,
    /// then the first coercion failure.
    pub fn bind_map<T>(&self, contract: &Contract<T>, map: &RawValueMap) -> BindResult<T> {
        let missing: Violations = contract
            .fields()
            .iter()
            .filter(|field| field.spec().required && present(map.get(field.name())).is_none())
            .map(|field| Violation::missing(field.name(), &field.spec().message))
            .collect::<Vec<_>>()
            .into();
        if !missing.is_empty() {
            return Err(BindError::missing(missing));
        }

        let mut target = contract.instantiate();
        for field in contract.fields() {
            match present(map.get(field.name())) {
                Some(values) => field.apply(&self.coercer, &mut target, values, ValueOrigin::Request)?,
                None => {
                    if field.apply_default(&self.coercer, &mut target)? {
                        tracing::debug!(field = field.name(), "applied default value");
                    }
                }
            }
        }
        Ok(target)
    }
}

fn report<T>(contract: &Contract<T>, result: Result<(), &BindError>, start: Instant) {
    match result {
        Ok(()) => {}
        Err(e) if e.is_configuration_error() => tracing::warn!(
            target_type = contract.type_name(),
            error = %e,
            "binding contract is misconfigured"
        ),
        Err(e) => tracing::debug!(
            target_type = contract.type_name(),
            error_code = e.error_code(),
            error = %e,
            "request body rejected"
        ),
    }
    record_bind(BinderKind::Body, result, start.elapsed());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BoolParsing, EnumCase, FieldSpec, ParamEnum, ParamValue, TypeDescriptor};
    use crate::{FieldValue, ViolationReason};

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    enum Level {
        #[default]
        Low,
        High,
    }

    impl ParamEnum for Level {
        const NAME: &'static str = "Level";
        const CASES: &'static [&'static str] = &["LOW", "HIGH"];

        fn from_case(case: &str) -> Option<Self> {
            match case {
                "LOW" => Some(Self::Low),
                "HIGH" => Some(Self::High),
                _ => None,
            }
        }

        fn as_case(&self) -> &'static str {
            match self {
                Self::Low => "LOW",
                Self::High => "HIGH",
            }
        }
    }

    impl FieldValue for Level {
        fn descriptor() -> TypeDescriptor {
            Self::enum_descriptor()
        }

        fn from_param(value: ParamValue) -> Result<Self, String> {
            Self::from_enum_value(value)
        }
    }

    #[derive(Debug, Default)]
    struct Profile {
        name: String,
        age: i32,
        hobbies: Vec<String>,
        level: Level,
        active: bool,
    }

    fn contract() -> Contract<Profile> {
        Contract::builder(Profile::default)
            .field(FieldSpec::new("name").required(true), |p: &mut Profile, v: String| p.name = v)
            .field(
                FieldSpec::new("age").required(true).message("Age is required"),
                |p: &mut Profile, v: i32| p.age = v,
            )
            .field(FieldSpec::new("hobbies"), |p: &mut Profile, v: Vec<String>| p.hobbies = v)
            .field(FieldSpec::new("level").default_value("LOW"), |p: &mut Profile, v: Level| {
                p.level = v;
            })
            .field(FieldSpec::new("active"), |p: &mut Profile, v: bool| p.active = v)
            .build()
    }

    const JSON: Option<&str> = Some("application/json");

    #[test]
    fn test_binds_json() {
        let profile = BodyBinder::default()
            .bind_with(
                &contract(),
                br#"{"name": "Bob", "age": 31, "hobbies": ["chess"], "level": "HIGH", "active": true}"#,
                JSON,
            )
            .unwrap();

        assert_eq!(profile.name, "Bob");
        assert_eq!(profile.age, 31);
        assert_eq!(profile.hobbies, vec!["chess"]);
        assert_eq!(profile.level, Level::High);
        assert!(profile.active);
    }

    #[test]
    fn test_binds_form() {
        let profile = BodyBinder::default()
            .bind_with(
                &contract(),
                b"name=Bob&age=31&hobbies=chess&hobbies=go",
                Some("application/x-www-form-urlencoded"),
            )
            .unwrap();

        assert_eq!(profile.hobbies, vec!["chess", "go"]);
        assert_eq!(profile.level, Level::Low);
    }

    #[test]
    fn test_collects_every_missing_field() {
        let err = BodyBinder::default()
            .bind_with(&contract(), br#"{"hobbies": ["x"]}"#, JSON)
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "missing required parameters: name, Age is required"
        );
        let fields: Vec<_> = err.violations().into_iter().map(|v| v.field).collect();
        assert_eq!(fields, vec!["name", "age"]);
    }

    #[test]
    fn test_empty_string_counts_as_missing() {
        let err = BodyBinder::default()
            .bind_with(&contract(), br#"{"name": "", "age": 3}"#, JSON)
            .unwrap_err();
        assert_eq!(err.violations()[0].field, "name");
        assert_eq!(err.violations()[0].reason, ViolationReason::MissingRequired);
    }

    #[test]
    fn test_missing_reported_before_invalid_values() {
        let err = BodyBinder::default()
            .bind_with(&contract(), br#"{"age": "old"}"#, JSON)
            .unwrap_err();
        assert!(matches!(err, BindError::MissingParameters(_)));
    }

    #[test]
    fn test_first_invalid_value_aborts() {
        let err = BodyBinder::default()
            .bind_with(
                &contract(),
                br#"{"name": "Bob", "age": "old", "active": "maybe"}"#,
                JSON,
            )
            .unwrap_err();

        assert_eq!(err.field(), Some("age"));
        assert!(!err.is_configuration_error());
    }

    #[test]
    fn test_rejects_unsupported_content_type() {
        let err = BodyBinder::default()
            .bind_with(&contract(), b"name=Bob", Some("text/plain"))
            .unwrap_err();
        assert_eq!(err.to_string(), "unsupported content type: text/plain");

        let err = BodyBinder::default()
            .bind_with(&contract(), b"{}", None)
            .unwrap_err();
        assert!(matches!(err, BindError::UnsupportedContentType { .. }));
    }

    #[test]
    fn test_contract_can_restrict_formats() {
        let json_only = Contract::builder(Profile::default)
            .field(FieldSpec::new("name"), |p: &mut Profile, v: String| p.name = v)
            .accept(&[MediaType::Json])
            .build();

        let err = BodyBinder::default()
            .bind_with(&json_only, b"name=Bob", Some("application/x-www-form-urlencoded"))
            .unwrap_err();
        assert!(err.to_string().contains("application/x-www-form-urlencoded"));
    }

    #[test]
    fn test_payload_too_large() {
        let err = BodyBinder::default()
            .with_max_body_size(8)
            .bind_with(&contract(), br#"{"name": "Bob"}"#, JSON)
            .unwrap_err();
        assert!(matches!(err, BindError::PayloadTooLarge { limit: 8, .. }));
    }

    #[test]
    fn test_legacy_policy_uppercases_enums_and_tolerates_booleans() {
        let body = br#"{"name": "Bob", "age": 1, "level": "high", "active": "yes"}"#;

        let err = BodyBinder::default()
            .bind_with(&contract(), body, JSON)
            .unwrap_err();
        assert_eq!(err.field(), Some("level"));

        let binder = BodyBinder::legacy();
        assert_eq!(binder.coercer().policy().enum_case, EnumCase::Uppercase);
        assert_eq!(binder.coercer().policy().boolean_parsing, BoolParsing::Lenient);

        let profile = binder.bind_with(&contract(), body, JSON).unwrap();
        assert_eq!(profile.level, Level::High);
        assert!(!profile.active);
    }

    #[test]
    fn test_invalid_default_is_configuration_error() {
        let contract = Contract::builder(Profile::default)
            .field(FieldSpec::new("age").default_value("ten"), |p: &mut Profile, v: i32| p.age = v)
            .build();

        let err = BodyBinder::default()
            .bind_with(&contract, b"{}", JSON)
            .unwrap_err();
        assert!(err.is_configuration_error());
        assert_eq!(err.error_code(), "INVALID_DEFAULT");
    }
}
