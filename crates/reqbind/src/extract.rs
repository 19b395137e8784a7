//! Extractor-style wrappers around the binders.
//!
//! [`Body<T>`] and [`Params<T>`] let a handler receive bound targets the same
//! way it would receive any other request extractor, and compose through
//! `Option`, `Result` and tuples.

use crate::{BindError, Bindable, BodyBinder, ParamBinder, RequestContext};
use std::ops::Deref;

/// Types that can be produced from a [`RequestContext`].
///
/// # Example
///
/// ```rust
/// use reqbind::{BindError, FromRequest, RequestContext};
///
/// struct RequestPath(String);
///
/// impl FromRequest for RequestPath {
///     fn from_request(ctx: &RequestContext) -> Result<Self, BindError> {
///         Ok(RequestPath(ctx.path().to_string()))
///     }
/// }
///
/// let ctx = RequestContext::builder().uri("/users".parse().unwrap()).build();
/// let RequestPath(path) = RequestPath::from_request(&ctx).unwrap();
/// assert_eq!(path, "/users");
/// ```
pub trait FromRequest: Sized {
    /// Extracts this type from the request context.
    ///
    /// # Errors
    ///
    /// Returns a [`BindError`] if extraction fails.
    fn from_request(ctx: &RequestContext) -> Result<Self, BindError>;
}

// None when extraction fails.
impl<T: FromRequest> FromRequest for Option<T> {
    fn from_request(ctx: &RequestContext) -> Result<Self, BindError> {
        Ok(T::from_request(ctx).ok())
    }
}

impl<T: FromRequest> FromRequest for Result<T, BindError> {
    fn from_request(ctx: &RequestContext) -> Result<Self, BindError> {
        Ok(T::from_request(ctx))
    }
}

macro_rules! impl_from_request_for_tuple {
    ($($T:ident),*) => {
        impl<$($T: FromRequest),*> FromRequest for ($($T,)*) {
            fn from_request(ctx: &RequestContext) -> Result<Self, BindError> {
                Ok(($($T::from_request(ctx)?,)*))
            }
        }
    };
}

impl_from_request_for_tuple!(T1);
impl_from_request_for_tuple!(T1, T2);
impl_from_request_for_tuple!(T1, T2, T3);
impl_from_request_for_tuple!(T1, T2, T3, T4);

/// A target bound from the request body with the default [`BodyBinder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Body<T>(pub T);

impl<T> Body<T> {
    /// Consumes the Body and returns the inner value.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Body<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: Bindable> FromRequest for Body<T> {
    fn from_request(ctx: &RequestContext) -> Result<Self, BindError> {
        BodyBinder::default().bind_request(ctx).map(Body)
    }
}

/// A target bound from query and form parameters with the default [`ParamBinder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Params<T>(pub T);

impl<T> Params<T> {
    /// Consumes the Params and returns the inner value.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Params<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: Bindable> FromRequest for Params<T> {
    fn from_request(ctx: &RequestContext) -> Result<Self, BindError> {
        ParamBinder::default().bind(ctx).map(Params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Contract, FieldSpec};
    use http::Uri;
    use std::sync::OnceLock;

    #[derive(Debug, Default, PartialEq)]
    struct Page {
        page: i32,
    }

    impl Bindable for Page {
        fn contract() -> &'static Contract<Self> {
            static CONTRACT: OnceLock<Contract<Page>> = OnceLock::new();
            CONTRACT.get_or_init(|| {
                Contract::builder(Page::default)
                    .field(FieldSpec::new("page").required(true), |p: &mut Page, v: i32| p.page = v)
                    .build()
            })
        }
    }

    fn ctx(uri: &'static str, body: &'static str) -> RequestContext {
        RequestContext::builder()
            .uri(Uri::from_static(uri))
            .content_type("application/json")
            .body(body)
            .build()
    }

    #[test]
    fn test_body_extraction() {
        let Body(page) = Body::<Page>::from_request(&ctx("/", r#"{"page": 3}"#)).unwrap();
        assert_eq!(page, Page { page: 3 });
    }

    #[test]
    fn test_params_extraction() {
        let Params(page) = Params::<Page>::from_request(&ctx("/?page=7", "")).unwrap();
        assert_eq!(page.page, 7);
    }

    #[test]
    fn test_option_and_result() {
        let request = ctx("/", "{}");

        let missing = <Option<Body<Page>>>::from_request(&request).unwrap();
        assert!(missing.is_none());

        let inner = <Result<Body<Page>, BindError>>::from_request(&request).unwrap();
        assert!(matches!(inner, Err(BindError::MissingParameters(_))));
    }

    #[test]
    fn test_tuple_extraction() {
        let (Body(from_body), Params(from_query)) =
            <(Body<Page>, Params<Page>)>::from_request(&ctx("/?page=2", r#"{"page": 1}"#)).unwrap();
        assert_eq!(from_body.page, 1);
        assert_eq!(from_query.page, 2);
    }
}
