//! Per-request data handed to access gates and operations.

use std::borrow::Cow;

use axum::body::Bytes;
use axum::http::{HeaderMap, Method};
use url::form_urlencoded;

/// Everything the router knows about one inbound request.
///
/// `path` is already stripped of the deployment context prefix.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub host: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RequestContext {
    /// A bodiless request, mostly useful in tests.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            request_id: String::new(),
            method,
            path: path.into(),
            query: None,
            host: None,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// First value of a query-string parameter, form-decoded.
    pub fn query_param(&self, name: &str) -> Option<Cow<'_, str>> {
        let query = self.query.as_deref()?;
        form_urlencoded::parse(query.as_bytes())
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_param() {
        let mut ctx = RequestContext::new(Method::GET, "/x");
        assert_eq!(ctx.query_param("api-key"), None);

        ctx.query = Some("a=1&api-key=secret&flag".to_string());
        assert_eq!(ctx.query_param("api-key").as_deref(), Some("secret"));
        assert_eq!(ctx.query_param("a").as_deref(), Some("1"));
        assert_eq!(ctx.query_param("flag").as_deref(), Some(""));
        assert_eq!(ctx.query_param("missing"), None);
    }

    #[test]
    fn test_query_param_is_decoded() {
        let mut ctx = RequestContext::new(Method::GET, "/x");
        ctx.query = Some("api-key=a%2Bb%2Fc%3D&name=J+Doe&first=1&first=2".to_string());
        assert_eq!(ctx.query_param("api-key").as_deref(), Some("a+b/c="));
        assert_eq!(ctx.query_param("name").as_deref(), Some("J Doe"));
        assert_eq!(ctx.query_param("first").as_deref(), Some("1"));
    }
}
