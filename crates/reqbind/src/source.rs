//! Request abstraction consumed by the binders.
//!
//! [`ParamSource`] is the boundary the binders read from. [`RequestContext`]
//! is the bundled implementation over `http` types; [`RawValueMap`] also
//! implements it for callers that already hold parameters.

use crate::normalize::{parse_form, MediaType};
use crate::RawValueMap;
use bytes::Bytes;
use http::{header, HeaderMap, Method, Uri};

/// Source of a request's content type, body and named parameters.
pub trait ParamSource {
    /// Returns the declared `Content-Type`, if any.
    fn content_type(&self) -> Option<&str>;

    /// Returns the complete request body.
    fn body(&self) -> &[u8];

    /// Returns every value of the parameter `name`.
    fn parameter_values(&self, name: &str) -> Option<&[String]>;

    /// Returns the first value of the parameter `name`.
    fn parameter_value(&self, name: &str) -> Option<&str> {
        self.parameter_values(name)
            .and_then(<[String]>::first)
            .map(String::as_str)
    }
}

impl<S: ParamSource + ?Sized> ParamSource for &S {
    fn content_type(&self) -> Option<&str> {
        (**self).content_type()
    }

    fn body(&self) -> &[u8] {
        (**self).body()
    }

    fn parameter_values(&self, name: &str) -> Option<&[String]> {
        (**self).parameter_values(name)
    }
}

impl ParamSource for RawValueMap {
    fn content_type(&self) -> Option<&str> {
        None
    }

    fn body(&self) -> &[u8] {
        &[]
    }

    fn parameter_values(&self, name: &str) -> Option<&[String]> {
        self.get(name)
    }
}

/// A buffered HTTP request with its parameter store.
///
/// Parameters are the query string pairs followed by the body pairs when the
/// body is `application/x-www-form-urlencoded`.
///
/// # Example
///
/// ```rust
/// use reqbind::{ParamSource, RequestContext};
/// use bytes::Bytes;
/// use http::{header, HeaderMap, Method, Uri};
///
/// let mut headers = HeaderMap::new();
/// headers.insert(header::CONTENT_TYPE, "application/x-www-form-urlencoded".parse().unwrap());
///
/// let ctx = RequestContext::new(
///     Method::POST,
///     Uri::from_static("/users?tag=a"),
///     headers,
///     Bytes::from_static(b"tag=b&name=Alice"),
/// );
///
/// assert_eq!(ctx.parameter_values("tag").unwrap(), ["a", "b"]);
/// assert_eq!(ctx.parameter_value("name"), Some("Alice"));
/// ```
#[derive(Debug, Clone)]
pub struct RequestContext {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
    params: RawValueMap,
}

impl RequestContext {
    /// Creates a context and builds its parameter store.
    #[must_use]
    pub fn new(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Self {
        let mut ctx = Self {
            method,
            uri,
            headers,
            body,
            params: RawValueMap::new(),
        };
        ctx.params = ctx.collect_params();
        ctx
    }

    /// Returns a builder.
    #[must_use]
    pub fn builder() -> RequestContextBuilder {
        RequestContextBuilder::new()
    }

    fn collect_params(&self) -> RawValueMap {
        let mut params = RawValueMap::new();
        if let Some(query) = self.uri.query() {
            match parse_form(query.as_bytes()) {
                Ok(pairs) => params.merge(pairs),
                Err(e) => tracing::debug!(error = %e, "ignoring unparseable query string"),
            }
        }
        if MediaType::detect(self.content_type()) == Some(MediaType::FormUrlEncoded) {
            match parse_form(&self.body) {
                Ok(pairs) => params.merge(pairs),
                Err(e) => tracing::debug!(error = %e, "ignoring unparseable form body"),
            }
        }
        params
    }

    /// Returns the HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request URI.
    #[must_use]
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Returns the path portion of the URI.
    #[must_use]
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Returns the query string if present.
    #[must_use]
    pub fn query_string(&self) -> Option<&str> {
        self.uri.query()
    }

    /// Returns the request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a header value as a string.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns the body bytes.
    #[must_use]
    pub fn body_bytes(&self) -> &Bytes {
        &self.body
    }

    /// Returns the parameter store.
    #[must_use]
    pub fn params(&self) -> &RawValueMap {
        &self.params
    }
}

impl ParamSource for RequestContext {
    fn content_type(&self) -> Option<&str> {
        self.header(header::CONTENT_TYPE.as_str())
    }

    fn body(&self) -> &[u8] {
        &self.body
    }

    fn parameter_values(&self, name: &str) -> Option<&[String]> {
        self.params.get(name)
    }
}

impl From<http::Request<Bytes>> for RequestContext {
    fn from(request: http::Request<Bytes>) -> Self {
        let (parts, body) = request.into_parts();
        Self::new(parts.method, parts.uri, parts.headers, body)
    }
}

/// Builder for [`RequestContext`].
///
/// Method defaults to `GET` and the URI to `/`.
#[derive(Debug, Default)]
#[must_use]
pub struct RequestContextBuilder {
    method: Option<Method>,
    uri: Option<Uri>,
    headers: HeaderMap,
    body: Bytes,
    extra: RawValueMap,
}

impl RequestContextBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the HTTP method.
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Sets the URI.
    pub fn uri(mut self, uri: Uri) -> Self {
        self.uri = Some(uri);
        self
    }

    /// Sets the headers.
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Adds a single header. Invalid values are skipped.
    pub fn header(mut self, name: &'static str, value: &str) -> Self {
        if let Ok(value) = value.parse() {
            self.headers.insert(name, value);
        }
        self
    }

    /// Sets the `Content-Type` header.
    pub fn content_type(self, content_type: &str) -> Self {
        self.header("content-type", content_type)
    }

    /// Sets the body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Appends a parameter after those parsed from the query and form body.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.push(name, value);
        self
    }

    /// Builds the context.
    pub fn build(self) -> RequestContext {
        let mut ctx = RequestContext::new(
            self.method.unwrap_or(Method::GET),
            self.uri.unwrap_or_else(|| Uri::from_static("/")),
            self.headers,
            self.body,
        );
        ctx.params.merge(self.extra);
        ctx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_params() {
        let ctx = RequestContext::builder()
            .uri(Uri::from_static("/users?ids=1,2&ids=3&name=Bob"))
            .build();

        assert_eq!(ctx.path(), "/users");
        assert_eq!(ctx.query_string(), Some("ids=1,2&ids=3&name=Bob"));
        assert_eq!(ctx.parameter_values("ids").unwrap(), ["1,2", "3"]);
        assert_eq!(ctx.parameter_value("name"), Some("Bob"));
        assert_eq!(ctx.parameter_value("missing"), None);
    }

    #[test]
    fn test_form_body_params_follow_query() {
        let ctx = RequestContext::builder()
            .method(Method::POST)
            .uri(Uri::from_static("/?a=1"))
            .content_type("application/x-www-form-urlencoded; charset=utf-8")
            .body("a=2&b=3")
            .build();

        assert_eq!(ctx.parameter_values("a").unwrap(), ["1", "2"]);
        assert_eq!(ctx.parameter_value("b"), Some("3"));
    }

    #[test]
    fn test_json_body_is_not_a_param_store() {
        let ctx = RequestContext::builder()
            .method(Method::POST)
            .content_type("application/json")
            .body(r#"{"a": 1}"#)
            .build();

        assert!(ctx.params().is_empty());
        assert_eq!(ctx.content_type(), Some("application/json"));
        assert_eq!(ParamSource::body(&ctx), br#"{"a": 1}"#);
    }

    #[test]
    fn test_explicit_params() {
        let ctx = RequestContext::builder()
            .uri(Uri::from_static("/?page=1"))
            .param("page", "2")
            .build();
        assert_eq!(ctx.parameter_values("page").unwrap(), ["1", "2"]);
    }

    #[test]
    fn test_from_http_request() {
        let request = http::Request::builder()
            .method(Method::PUT)
            .uri("/items?limit=5")
            .header("content-type", "application/json")
            .body(Bytes::from_static(b"{}"))
            .unwrap();

        let ctx = RequestContext::from(request);
        assert_eq!(ctx.method(), &Method::PUT);
        assert_eq!(ctx.parameter_value("limit"), Some("5"));
        assert_eq!(ctx.body_bytes().as_ref(), b"{}");
    }

    #[test]
    fn test_raw_value_map_source() {
        let map: RawValueMap = vec![("q", "rust")].into_iter().collect();
        assert_eq!(map.content_type(), None);
        assert!(ParamSource::body(&map).is_empty());
        assert_eq!(map.parameter_value("q"), Some("rust"));
    }
}
