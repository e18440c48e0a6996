//! Request handling and transformation.
//!
//! # Responsibilities
//! - Read the request ID assigned by the request-id layer
//! - Strip the deployment context prefix from the path
//! - Collect body and headers into a `RequestContext`
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Body size limit enforced while buffering, before routing

use axum::body::{to_bytes, Body};
use axum::http::{header, Request};
use tower_http::request_id::{MakeRequestUuid, RequestId};
use uuid::Uuid;

use crate::routing::context::RequestContext;

/// Header carrying the request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Generator used by the request-id layer.
pub type RequestIdMaker = MakeRequestUuid;

/// Access the request ID assigned to a request.
pub trait RequestIdExt {
    fn request_id(&self) -> String;
}

impl<B> RequestIdExt for Request<B> {
    fn request_id(&self) -> String {
        self.extensions()
            .get::<RequestId>()
            .and_then(|id| id.header_value().to_str().ok())
            .or_else(|| self.headers().get(X_REQUEST_ID).and_then(|v| v.to_str().ok()))
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string())
    }
}

/// Remove `context_path` from the front of `path`.
///
/// Returns `None` when the path lies outside the context. An empty or "/"
/// context leaves the path untouched.
pub fn strip_context_path<'p>(path: &'p str, context_path: &str) -> Option<&'p str> {
    if context_path.is_empty() || context_path == "/" {
        return Some(path);
    }
    match path.strip_prefix(context_path)? {
        "" => Some("/"),
        rest if rest.starts_with('/') => Some(rest),
        _ => None,
    }
}

/// The request body exceeded the configured limit.
#[derive(Debug)]
pub struct BodyTooLarge;

/// Build the dispatch context for `request`, whose path is already stripped.
pub async fn into_context(
    request: Request<Body>,
    path: String,
    max_body_bytes: usize,
) -> Result<RequestContext, BodyTooLarge> {
    let request_id = request.request_id();
    let (parts, body) = request.into_parts();
    let body = to_bytes(body, max_body_bytes).await.map_err(|_| BodyTooLarge)?;

    let host = parts
        .headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
        .or_else(|| parts.uri.host().map(str::to_string));

    Ok(RequestContext {
        request_id,
        method: parts.method,
        path,
        query: parts.uri.query().map(str::to_string),
        host,
        headers: parts.headers,
        body,
    })
}
