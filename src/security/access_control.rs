//! Access control for matched routes.
//! Runs after matching and before an operation is handed to the worker pool.

use std::borrow::Cow;
use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;

use crate::config::ApiKeyConfig;
use crate::routing::context::RequestContext;
use crate::routing::error::RouteError;
use crate::routing::registry::RouteEntry;

/// Query parameter carrying the API key.
pub const API_KEY_PARAM: &str = "api-key";
/// Header carrying the API key when the query parameter is absent.
pub const API_KEY_HEADER: &str = "Api-Key";

/// Decides whether a matched route may run for a request.
///
/// Implementations may await I/O; the dispatcher waits for the verdict before
/// submitting the operation.
#[async_trait]
pub trait AccessGate: Send + Sync {
    async fn check(&self, entry: &RouteEntry, ctx: &RequestContext) -> Result<(), RouteError>;
}

/// Lets every request through.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

#[async_trait]
impl AccessGate for AllowAll {
    async fn check(&self, _entry: &RouteEntry, _ctx: &RequestContext) -> Result<(), RouteError> {
        Ok(())
    }
}

/// Runs several gates in order; the first rejection wins.
#[derive(Clone, Default)]
pub struct GateChain {
    gates: Vec<Arc<dyn AccessGate>>,
}

impl GateChain {
    pub fn new(gates: Vec<Arc<dyn AccessGate>>) -> Self {
        Self { gates }
    }
}

#[async_trait]
impl AccessGate for GateChain {
    async fn check(&self, entry: &RouteEntry, ctx: &RequestContext) -> Result<(), RouteError> {
        for gate in &self.gates {
            gate.check(entry, ctx).await?;
        }
        Ok(())
    }
}

/// API key gate.
///
/// A request passes when the route is public, when no keys are configured,
/// or when some configured key equals the request's key and that key's domain and
/// path restrictions admit the request.
#[derive(Debug, Clone, Default)]
pub struct ApiKeyGate {
    keys: Vec<ApiKeyConfig>,
}

impl ApiKeyGate {
    pub fn new(keys: Vec<ApiKeyConfig>) -> Self {
        Self { keys }
    }

    /// Whether `key` may access `path` on `domain`.
    pub fn is_allowed(&self, key: Option<&str>, domain: Option<&str>, path: &str) -> bool {
        if self.keys.is_empty() {
            return true;
        }
        let Some(key) = key else {
            return false;
        };
        self.keys.iter().any(|rule| {
            rule.key == key
                && (rule.domains.is_empty()
                    || domain.is_some_and(|d| rule.domains.iter().any(|r| r.eq_ignore_ascii_case(d))))
                && (rule.paths.is_empty() || rule.paths.iter().any(|p| within_prefix(path, p)))
        })
    }
}

#[async_trait]
impl AccessGate for ApiKeyGate {
    async fn check(&self, entry: &RouteEntry, ctx: &RequestContext) -> Result<(), RouteError> {
        if entry.is_public() {
            return Ok(());
        }

        let key = ctx
            .query_param(API_KEY_PARAM)
            .or_else(|| ctx.header(API_KEY_HEADER).map(Cow::Borrowed));
        let domain = ctx.host.as_deref().map(strip_port);

        if self.is_allowed(key.as_deref(), domain, &ctx.path) {
            Ok(())
        } else {
            tracing::warn!(
                request_id = %ctx.request_id,
                route = %entry.label(),
                has_key = key.is_some(),
                "Access denied"
            );
            Err(RouteError::http(StatusCode::UNAUTHORIZED, "Unauthorized"))
        }
    }
}

/// `path` equals `prefix` or lies below it on a segment boundary.
fn within_prefix(path: &str, prefix: &str) -> bool {
    if prefix.ends_with('/') {
        return path.starts_with(prefix);
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

fn strip_port(host: &str) -> &str {
    match host.rsplit_once(':') {
        Some((name, port)) if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) => name,
        _ => host,
    }
}
