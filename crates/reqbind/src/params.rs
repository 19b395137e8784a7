//! Query/form binder: fail-fast, field-by-field lookup.

use crate::coerce::{Coercer, CoercionPolicy};
use crate::error::{BindError, BindResult, ValueOrigin, Violation};
use crate::metrics::{record_bind, BinderKind};
use crate::normalize::MediaType;
use crate::values::present;
use crate::{Bindable, Contract, FieldValue, ParamSource};
use std::time::Instant;

/// Binds request parameters into a [`Bindable`] target, one field at a time.
///
/// Each field is looked up directly in the [`ParamSource`]; the first missing
/// or invalid field ends the call with that single error.
///
/// # Example
///
/// ```rust
/// use reqbind::{Contract, FieldSpec, ParamBinder, RawValueMap};
///
/// #[derive(Debug, Default)]
/// struct Search {
///     q: String,
///     ids: Vec<i64>,
/// }
///
/// let contract = Contract::builder(Search::default)
///     .field(FieldSpec::new("q").required(true), |s: &mut Search, v: String| s.q = v)
///     .field(FieldSpec::new("ids"), |s: &mut Search, v: Vec<i64>| s.ids = v)
///     .build();
///
/// let params: RawValueMap = vec![("q", "rust"), ("ids", "4, 2")].into_iter().collect();
/// let search = ParamBinder::default().bind_with(&contract, &params).unwrap();
///
/// assert_eq!(search.q, "rust");
/// assert_eq!(search.ids, vec![4, 2]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ParamBinder {
    coercer: Coercer,
}

impl ParamBinder {
    /// Creates a binder.
    #[must_use]
    pub fn new(coercer: Coercer) -> Self {
        Self { coercer }
    }

    /// Creates a binder that reproduces the historical query/form binder's coercion.
    #[must_use]
    pub fn legacy() -> Self {
        Self::new(Coercer::new(CoercionPolicy::legacy_params()))
    }

    /// Returns the coercer.
    #[must_use]
    pub fn coercer(&self) -> &Coercer {
        &self.coercer
    }

    /// Binds the parameters of `source` into `T`.
    ///
    /// # Errors
    ///
    /// See [`ParamBinder::bind_with`].
    pub fn bind<T, S>(&self, source: &S) -> BindResult<T>
    where
        T: Bindable,
        S: ParamSource + ?Sized,
    {
        self.bind_with(T::contract(), source)
    }

    /// Binds the parameters of `source` into a target described by `contract`.
    ///
    /// A declared content type must be one the contract accepts; sources
    /// without a content type (plain query strings) are always read.
    ///
    /// # Errors
    ///
    /// - [`BindError::UnsupportedContentType`] for a declared content type the
    ///   contract does not accept.
    /// - [`BindError::MissingParameters`] naming the first absent required field.
    /// - [`BindError::InvalidFieldValue`] or [`BindError::UnsupportedFieldType`]
    ///   for the first field that fails to coerce.
    pub fn bind_with<T, S>(&self, contract: &Contract<T>, source: &S) -> BindResult<T>
    where
        S: ParamSource + ?Sized,
    {
        let start = Instant::now();
        tracing::debug!(
            target_type = contract.type_name(),
            fields = contract.len(),
            "binding request parameters"
        );

        let result = self.bind_fields(contract, source);

        match &result {
            Ok(_) => {}
            Err(e) if e.is_configuration_error() => tracing::warn!(
                target_type = contract.type_name(),
                error = %e,
                "binding contract is misconfigured"
            ),
            Err(e) => tracing::debug!(
                target_type = contract.type_name(),
                error_code = e.error_code(),
                error = %e,
                "request parameters rejected"
            ),
        }
        record_bind(BinderKind::Params, result.as_ref().map(|_| ()), start.elapsed());
        result
    }

    fn bind_fields<T, S>(&self, contract: &Contract<T>, source: &S) -> BindResult<T>
    where
        S: ParamSource + ?Sized,
    {
        if let Some(content_type) = source.content_type() {
            let accepted = MediaType::detect(Some(content_type))
                .is_some_and(|media_type| contract.accepts(media_type));
            if !accepted {
                return Err(BindError::unsupported_content_type(Some(content_type)));
            }
        }

        let mut target = contract.instantiate();
        for field in contract.fields() {
            match present(source.parameter_values(field.name())) {
                Some(values) => field.apply(&self.coercer, &mut target, values, ValueOrigin::Request)?,
                None if field.spec().required => {
                    return Err(BindError::missing(Violation::missing(
                        field.name(),
                        &field.spec().message,
                    )));
                }
                None => {
                    if field.apply_default(&self.coercer, &mut target)? {
                        tracing::debug!(field = field.name(), "applied default value");
                    }
                }
            }
        }
        Ok(target)
    }

    /// Parses one parameter into `V` with the binder's coercion rules.
    ///
    /// An absent parameter yields `default` coerced the same way, or
    /// `V::default()` when `default` is empty.
    ///
    /// # Errors
    ///
    /// - [`BindError::MissingParameters`] if `required` and the parameter is absent.
    /// - [`BindError::InvalidFieldValue`] if the value (or the default) does not
    ///   coerce to `V`.
    /// - [`BindError::UnsupportedFieldType`] if `V` has no coercion rule.
    ///
    /// # Example
    ///
    /// ```rust
    /// use reqbind::{ParamBinder, RawValueMap};
    ///
    /// let params: RawValueMap = vec![("page", "3")].into_iter().collect();
    /// let binder = ParamBinder::default();
    ///
    /// let page: i32 = binder.parse_param(&params, "page", "1", true).unwrap();
    /// assert_eq!(page, 3);
    ///
    /// let size: i64 = binder.parse_param(&params, "size", "20", false).unwrap();
    /// assert_eq!(size, 20);
    ///
    /// let q: String = binder.parse_param(&params, "q", "", false).unwrap();
    /// assert!(q.is_empty());
    /// ```
    pub fn parse_param<V, S>(
        &self,
        source: &S,
        name: &str,
        default: &str,
        required: bool,
    ) -> BindResult<V>
    where
        V: FieldValue + Default,
        S: ParamSource + ?Sized,
    {
        let ty = V::descriptor();
        let (value, origin) = match present(source.parameter_values(name)) {
            Some(values) => (self.coercer.coerce(values, &ty), ValueOrigin::Request),
            None if required => return Err(BindError::missing(Violation::missing(name, ""))),
            None if default.is_empty() => return Ok(V::default()),
            None => (self.coercer.coerce_default(default, &ty), ValueOrigin::Default),
        };
        let value = value.map_err(|e| e.into_bind_error(name, origin))?;
        V::from_param(value).map_err(|cause| BindError::invalid_value(name, origin, cause))
    }

    /// Parses one parameter into `V`, yielding `None` when it is absent.
    ///
    /// # Errors
    ///
    /// - [`BindError::InvalidFieldValue`] if a present value does not coerce to `V`.
    /// - [`BindError::UnsupportedFieldType`] if `V` has no coercion rule.
    ///
    /// # Example
    ///
    /// ```rust
    /// use reqbind::{ParamBinder, RawValueMap};
    ///
    /// let params: RawValueMap = vec![("limit", "50"), ("cursor", "")].into_iter().collect();
    /// let binder = ParamBinder::default();
    ///
    /// assert_eq!(binder.parse_optional_param::<i32, _>(&params, "limit").unwrap(), Some(50));
    /// assert_eq!(binder.parse_optional_param::<String, _>(&params, "cursor").unwrap(), None);
    /// ```
    pub fn parse_optional_param<V, S>(&self, source: &S, name: &str) -> BindResult<Option<V>>
    where
        V: FieldValue,
        S: ParamSource + ?Sized,
    {
        let Some(values) = present(source.parameter_values(name)) else {
            return Ok(None);
        };
        let value = self
            .coercer
            .coerce(values, &V::descriptor())
            .map_err(|e| e.into_bind_error(name, ValueOrigin::Request))?;
        V::from_param(value)
            .map(Some)
            .map_err(|cause| BindError::invalid_value(name, ValueOrigin::Request, cause))
    }

    /// Parses one possibly comma-separated parameter into a typed list.
    ///
    /// An absent parameter yields `default` split the same way, or an empty
    /// list when `default` is empty.
    ///
    /// # Errors
    ///
    /// - [`BindError::MissingParameters`] if `required` and the parameter is absent.
    /// - [`BindError::InvalidFieldValue`] if a segment does not coerce to `V`.
    /// - [`BindError::UnsupportedFieldType`] if `V` is not a scalar type.
    ///
    /// # Example
    ///
    /// ```rust
    /// use reqbind::{ParamBinder, RawValueMap};
    ///
    /// let params: RawValueMap = vec![("ids", "1, 3, 3")].into_iter().collect();
    /// let binder = ParamBinder::default();
    ///
    /// let ids: Vec<i32> = binder.parse_delimited(&params, "ids", "", true).unwrap();
    /// assert_eq!(ids, vec![1, 3, 3]);
    ///
    /// let pages: Vec<i32> = binder.parse_delimited(&params, "pages", "1,2", false).unwrap();
    /// assert_eq!(pages, vec![1, 2]);
    /// ```
    pub fn parse_delimited<V, S>(
        &self,
        source: &S,
        name: &str,
        default: &str,
        required: bool,
    ) -> BindResult<Vec<V>>
    where
        V: FieldValue,
        S: ParamSource + ?Sized,
    {
        self.parse_param(source, name, default, required)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FieldSpec, RawValueMap, RequestContext};

    #[derive(Debug, Default)]
    struct Query {
        name: String,
        age: Option<i64>,
        score: f64,
        flags: Vec<bool>,
    }

    fn contract() -> Contract<Query> {
        Contract::builder(Query::default)
            .field(FieldSpec::new("name").required(true), |q: &mut Query, v: String| q.name = v)
            .field(FieldSpec::new("age").required(true), |q: &mut Query, v: Option<i64>| q.age = v)
            .field(FieldSpec::new("score").default_value("0.5"), |q: &mut Query, v: f64| {
                q.score = v;
            })
            .field(FieldSpec::new("flags"), |q: &mut Query, v: Vec<bool>| q.flags = v)
            .build()
    }

    fn params(pairs: &[(&str, &str)]) -> RawValueMap {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_binds_params() {
        let query = ParamBinder::default()
            .bind_with(&contract(), &params(&[("name", "Ann"), ("age", "40"), ("flags", "true, FALSE")]))
            .unwrap();

        assert_eq!(query.name, "Ann");
        assert_eq!(query.age, Some(40));
        assert!((query.score - 0.5).abs() < f64::EPSILON);
        assert_eq!(query.flags, vec![true, false]);
    }

    #[test]
    fn test_reports_only_first_missing_field() {
        let err = ParamBinder::default()
            .bind_with(&contract(), &params(&[]))
            .unwrap_err();

        assert_eq!(err.to_string(), "missing required parameters: name");
        assert_eq!(err.violations().len(), 1);
    }

    #[test]
    fn test_invalid_before_later_missing() {
        let err = ParamBinder::default()
            .bind_with(&contract(), &params(&[("name", "Ann"), ("age", "x")]))
            .unwrap_err();
        assert!(matches!(err, BindError::InvalidFieldValue { .. }));
        assert_eq!(err.field(), Some("age"));
    }

    #[test]
    fn test_form_body_params() {
        let ctx = RequestContext::builder()
            .content_type("application/x-www-form-urlencoded")
            .body("name=Ann&age=40&flags=true&flags=true")
            .build();

        let query = ParamBinder::default().bind_with(&contract(), &ctx).unwrap();
        assert_eq!(query.flags, vec![true, true]);
    }

    #[test]
    fn test_rejects_unsupported_content_type() {
        let ctx = RequestContext::builder()
            .uri(http::Uri::from_static("/?name=Ann&age=1"))
            .content_type("text/csv")
            .body("a,b")
            .build();

        let err = ParamBinder::default().bind_with(&contract(), &ctx).unwrap_err();
        assert!(matches!(err, BindError::UnsupportedContentType { .. }));
    }

    #[test]
    fn test_parse_delimited() {
        let binder = ParamBinder::default();
        let source = params(&[("ids", "1, 3, 3"), ("tags", "a"), ("tags", "b,c")]);

        let ids: Vec<i32> = binder.parse_delimited(&source, "ids", "", false).unwrap();
        assert_eq!(ids, vec![1, 3, 3]);

        let tags: Vec<String> = binder.parse_delimited(&source, "tags", "", false).unwrap();
        assert_eq!(tags, vec!["a", "b,c"]);

        let none: Vec<i32> = binder.parse_delimited(&source, "none", "", false).unwrap();
        assert!(none.is_empty());

        let err = binder.parse_delimited::<i32, _>(&source, "none", "", true).unwrap_err();
        assert!(matches!(err, BindError::MissingParameters(_)));

        let err = binder.parse_delimited::<i32, _>(&source, "none", "x", false).unwrap_err();
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_parse_param() {
        let binder = ParamBinder::default();
        let source = params(&[("age", "40"), ("ratio", "0.25"), ("on", "TRUE"), ("bad", "4x")]);

        let age: i32 = binder.parse_param(&source, "age", "", true).unwrap();
        assert_eq!(age, 40);

        let ratio: f64 = binder.parse_param(&source, "ratio", "", false).unwrap();
        assert!((ratio - 0.25).abs() < f64::EPSILON);

        let on: bool = binder.parse_param(&source, "on", "false", false).unwrap();
        assert!(on);

        let page: i64 = binder.parse_param(&source, "page", "7", false).unwrap();
        assert_eq!(page, 7);

        let name: String = binder.parse_param(&source, "name", "", false).unwrap();
        assert_eq!(name, "");

        let err = binder.parse_param::<i32, _>(&source, "page", "", true).unwrap_err();
        assert_eq!(err.to_string(), "missing required parameters: page");

        let err = binder.parse_param::<i32, _>(&source, "bad", "", false).unwrap_err();
        assert!(matches!(
            err,
            BindError::InvalidFieldValue { origin: ValueOrigin::Request, .. }
        ));

        let err = binder.parse_param::<i32, _>(&source, "page", "seven", false).unwrap_err();
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_parse_param_enum() {
        #[derive(Debug, Default, PartialEq)]
        enum Sort {
            #[default]
            Asc,
            Desc,
        }

        impl crate::ParamEnum for Sort {
            const NAME: &'static str = "Sort";
            const CASES: &'static [&'static str] = &["ASC", "DESC"];

            fn from_case(case: &str) -> Option<Self> {
                match case {
                    "ASC" => Some(Self::Asc),
                    "DESC" => Some(Self::Desc),
                    _ => None,
                }
            }

            fn as_case(&self) -> &'static str {
                match self {
                    Self::Asc => "ASC",
                    Self::Desc => "DESC",
                }
            }
        }

        impl FieldValue for Sort {
            fn descriptor() -> crate::TypeDescriptor {
                <Self as crate::ParamEnum>::enum_descriptor()
            }

            fn from_param(value: crate::ParamValue) -> Result<Self, String> {
                <Self as crate::ParamEnum>::from_enum_value(value)
            }
        }

        let binder = ParamBinder::default();
        let source = params(&[("sort", "DESC"), ("lower", "desc")]);

        assert_eq!(binder.parse_param::<Sort, _>(&source, "sort", "", true).unwrap(), Sort::Desc);
        assert_eq!(binder.parse_param::<Sort, _>(&source, "none", "ASC", false).unwrap(), Sort::Asc);
        assert!(binder.parse_param::<Sort, _>(&source, "lower", "", false).is_err());
    }

    #[test]
    fn test_parse_optional_param() {
        let binder = ParamBinder::default();
        let source = params(&[("limit", "50"), ("empty", ""), ("bad", "x")]);

        assert_eq!(binder.parse_optional_param::<i64, _>(&source, "limit").unwrap(), Some(50));
        assert_eq!(binder.parse_optional_param::<i64, _>(&source, "missing").unwrap(), None);
        assert_eq!(binder.parse_optional_param::<String, _>(&source, "empty").unwrap(), None);

        let err = binder.parse_optional_param::<i64, _>(&source, "bad").unwrap_err();
        assert_eq!(err.field(), Some("bad"));
    }

    #[test]
    fn test_legacy_binder_trims_numbers() {
        let source = params(&[("name", "Ann"), ("age", " 40")]);

        let err = ParamBinder::default().bind_with(&contract(), &source).unwrap_err();
        assert_eq!(err.field(), Some("age"));

        let query = ParamBinder::legacy().bind_with(&contract(), &source).unwrap();
        assert_eq!(query.age, Some(40));

        let age: i32 = ParamBinder::legacy().parse_param(&source, "age", "", true).unwrap();
        assert_eq!(age, 40);
    }

    #[test]
    fn test_parse_delimited_rejects_nested_lists() {
        let source = params(&[("m", "1")]);
        let err = ParamBinder::default()
            .parse_delimited::<Vec<i32>, _>(&source, "m", "", false)
            .unwrap_err();
        assert!(matches!(err, BindError::UnsupportedFieldType { .. }));
    }
}
