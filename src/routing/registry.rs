//! Handler registration and the routing table.
//!
//! # Responsibilities
//! - Turn each handler's declared operations into compiled route entries
//! - Keep per-verb entries in registration order
//! - Freeze the result into an immutable `RoutingTable`
//!
//! # Design Decisions
//! - Registration is explicit: handlers list their operations, nothing is discovered
//! - Append-only; there is no per-route update or removal. Reinitialization builds a new table.
//! - A template that fails to compile aborts registration

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use axum::response::Response;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use thiserror::Error;

use crate::routing::context::RequestContext;
use crate::routing::error::HandlerError;
use crate::routing::params::{ParamDescriptor, ParamType, Params};
use crate::routing::template::{CompiledTemplate, TemplateError};
use crate::routing::verb::Verb;

pub type OperationFuture = BoxFuture<'static, Result<Response, HandlerError>>;
pub type OperationFn = Arc<dyn Fn(Invocation) -> OperationFuture + Send + Sync>;

/// Input to an operation body.
#[derive(Debug)]
pub struct Invocation {
    pub request: RequestContext,
    pub params: Params,
}

/// An object whose operations are exposed as HTTP endpoints.
pub trait Handler: Send + Sync + 'static {
    /// Name used in logs and registration errors.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Prefix shared by every operation of this handler.
    fn base_path(&self) -> &str;

    /// Operations in registration order.
    fn operations(self: Arc<Self>) -> Vec<Operation>;
}

/// Who may invoke an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Access {
    /// No API key or credentials needed.
    Public,
    /// Subject to the API key check only.
    #[default]
    ApiKey,
    /// Also needs valid user credentials.
    Authenticated,
    /// Also needs credentials of an administrator.
    Admin,
}

/// One operation declared by a handler.
#[derive(Clone)]
pub struct Operation {
    name: String,
    verb: Option<Verb>,
    path: Option<String>,
    params: Vec<ParamDescriptor>,
    access: Access,
    body: OperationFn,
}

impl Operation {
    /// An untagged operation. It is skipped at registration until a verb is set.
    pub fn new<F, Fut>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(Invocation) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Response, HandlerError>> + Send + 'static,
    {
        Self {
            name: name.into(),
            verb: None,
            path: None,
            params: Vec::new(),
            access: Access::ApiKey,
            body: Arc::new(move |inv: Invocation| body(inv).boxed()),
        }
    }

    pub fn verb(mut self, verb: Verb) -> Self {
        self.verb = Some(verb);
        self
    }

    pub fn get(self) -> Self {
        self.verb(Verb::Get)
    }

    pub fn put(self) -> Self {
        self.verb(Verb::Put)
    }

    pub fn post(self) -> Self {
        self.verb(Verb::Post)
    }

    pub fn delete(self) -> Self {
        self.verb(Verb::Delete)
    }

    /// Sub-path appended to the handler's base path.
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn param(mut self, name: impl Into<String>, ty: ParamType) -> Self {
        self.params.push(ParamDescriptor::new(name, ty));
        self
    }

    pub fn optional_param(mut self, name: impl Into<String>, ty: ParamType) -> Self {
        self.params.push(ParamDescriptor::optional(name, ty));
        self
    }

    /// Mark the operation as reachable without credentials.
    pub fn public(self) -> Self {
        self.access(Access::Public)
    }

    /// Require an authenticated user.
    pub fn authenticated(self) -> Self {
        self.access(Access::Authenticated)
    }

    /// Require an authenticated administrator.
    pub fn admin(self) -> Self {
        self.access(Access::Admin)
    }

    pub fn access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("name", &self.name)
            .field("verb", &self.verb)
            .field("path", &self.path)
            .field("params", &self.params)
            .field("access", &self.access)
            .finish_non_exhaustive()
    }
}

/// A compiled binding of verb + template to one handler operation.
pub struct RouteEntry {
    verb: Verb,
    template: CompiledTemplate,
    handler: Arc<dyn Handler>,
    operation: String,
    access: Access,
    body: OperationFn,
}

impl RouteEntry {
    pub fn verb(&self) -> Verb {
        self.verb
    }

    pub fn template(&self) -> &CompiledTemplate {
        &self.template
    }

    pub fn handler(&self) -> &Arc<dyn Handler> {
        &self.handler
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn access(&self) -> Access {
        self.access
    }

    pub fn is_public(&self) -> bool {
        self.access == Access::Public
    }

    /// Route label used in logs and metrics, e.g. `GET /api/user/{id}`.
    pub fn label(&self) -> String {
        format!("{} {}", self.verb, self.template.template())
    }

    /// Start the operation body.
    pub fn invoke(&self, invocation: Invocation) -> OperationFuture {
        (self.body)(invocation)
    }
}

impl fmt::Debug for RouteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteEntry")
            .field("verb", &self.verb)
            .field("template", &self.template.template())
            .field("handler", &self.handler.name())
            .field("operation", &self.operation)
            .finish_non_exhaustive()
    }
}

/// Registration failed; the handler set cannot be published.
#[derive(Debug, Clone, Error)]
#[error("cannot register {handler}::{operation} ({verb} {path}): {source}")]
pub struct RegistrationError {
    pub handler: String,
    pub operation: String,
    pub verb: Verb,
    pub path: String,
    #[source]
    pub source: TemplateError,
}

/// Base path joined with an optional sub-path.
pub fn full_path(base: &str, sub: Option<&str>) -> String {
    match sub {
        None => base.to_string(),
        Some(sub) if sub.starts_with('/') => format!("{}{}", base, sub),
        Some(sub) => format!("{}/{}", base, sub),
    }
}

/// Collects route entries during the registration phase.
#[derive(Default)]
pub struct HandlerRegistry {
    routes: HashMap<Verb, Vec<Arc<RouteEntry>>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append every tagged operation of `handler`. Returns the number of routes added.
    pub fn register(&mut self, handler: Arc<dyn Handler>) -> Result<usize, RegistrationError> {
        let base = handler.base_path().to_string();
        let mut added = 0;

        for op in handler.clone().operations() {
            let Some(verb) = op.verb else {
                tracing::debug!(handler = handler.name(), operation = %op.name, "Skipping untagged operation");
                continue;
            };

            let path = full_path(&base, op.path.as_deref());
            let template =
                CompiledTemplate::compile(&path, &op.params).map_err(|source| RegistrationError {
                    handler: handler.name().to_string(),
                    operation: op.name.clone(),
                    verb,
                    path: path.clone(),
                    source,
                })?;

            tracing::debug!(
                handler = handler.name(),
                operation = %op.name,
                verb = %verb,
                path = %path,
                pattern = template.pattern(),
                "Registered route"
            );

            self.routes.entry(verb).or_default().push(Arc::new(RouteEntry {
                verb,
                template,
                handler: handler.clone(),
                operation: op.name,
                access: op.access,
                body: op.body,
            }));
            added += 1;
        }

        Ok(added)
    }

    /// Register handlers in order, stopping at the first failure.
    pub fn register_all<I>(&mut self, handlers: I) -> Result<usize, RegistrationError>
    where
        I: IntoIterator<Item = Arc<dyn Handler>>,
    {
        handlers
            .into_iter()
            .try_fold(0, |total, h| Ok(total + self.register(h)?))
    }

    /// Freeze into a read-only table.
    pub fn build(self) -> RoutingTable {
        RoutingTable {
            routes: self.routes,
        }
    }
}

/// A matched route together with its raw captures.
#[derive(Debug)]
pub struct RouteMatch<'p> {
    pub entry: Arc<RouteEntry>,
    pub captures: Vec<&'p str>,
}

/// Verb to ordered route entries. Immutable once built.
#[derive(Debug, Default)]
pub struct RoutingTable {
    routes: HashMap<Verb, Vec<Arc<RouteEntry>>>,
}

impl RoutingTable {
    /// Entries for `verb` in registration order; empty when none were registered.
    pub fn candidates(&self, verb: Verb) -> &[Arc<RouteEntry>] {
        self.routes.get(&verb).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First entry, in registration order, whose matcher fully matches `path`.
    pub fn find<'p>(&self, verb: Verb, path: &'p str) -> Option<RouteMatch<'p>> {
        self.candidates(verb).iter().find_map(|entry| {
            entry.template.match_path(path).map(|captures| RouteMatch {
                entry: entry.clone(),
                captures,
            })
        })
    }

    pub fn len(&self) -> usize {
        self.routes.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    struct Items {
        id_type: ParamType,
    }

    impl Handler for Items {
        fn name(&self) -> &str {
            "items"
        }

        fn base_path(&self) -> &str {
            "/items"
        }

        fn operations(self: Arc<Self>) -> Vec<Operation> {
            vec![
                Operation::new("by_id", |_| async { Ok("by_id".into_response()) })
                    .get()
                    .path("{id}")
                    .param("id", self.id_type.clone()),
                Operation::new("latest", |_| async { Ok("latest".into_response()) })
                    .get()
                    .path("/latest"),
                Operation::new("helper", |_| async { Ok("helper".into_response()) }),
                Operation::new("create", |_| async { Ok("create".into_response()) })
                    .post()
                    .admin(),
            ]
        }
    }

    struct Broken;

    impl Handler for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        fn base_path(&self) -> &str {
            "/broken"
        }

        fn operations(self: Arc<Self>) -> Vec<Operation> {
            vec![Operation::new("bad", |_| async { Ok("".into_response()) })
                .get()
                .path("/{id")]
        }
    }

    fn table(id_type: ParamType) -> RoutingTable {
        let mut registry = HandlerRegistry::new();
        registry.register(Arc::new(Items { id_type })).unwrap();
        registry.build()
    }

    #[test]
    fn test_full_path_joining() {
        assert_eq!(full_path("/api", None), "/api");
        assert_eq!(full_path("/api", Some("/user/{id}")), "/api/user/{id}");
        assert_eq!(full_path("/api", Some("user/{id}")), "/api/user/{id}");
    }

    #[test]
    fn test_untagged_operations_are_skipped() {
        let table = table(ParamType::Integer);
        assert_eq!(table.len(), 3);
        assert_eq!(table.candidates(Verb::Get).len(), 2);
        assert_eq!(table.candidates(Verb::Post).len(), 1);
        assert!(table.candidates(Verb::Delete).is_empty());
    }

    #[test]
    fn test_registration_order_is_priority() {
        let table = table(ParamType::Integer);
        let m = table.find(Verb::Get, "/items/latest").unwrap();
        assert_eq!(m.entry.operation(), "latest");
        let m = table.find(Verb::Get, "/items/7").unwrap();
        assert_eq!(m.entry.operation(), "by_id");
        assert_eq!(m.captures, vec!["7"]);

        // A free-form id shadows the later literal route.
        let table = self::table(ParamType::String);
        let m = table.find(Verb::Get, "/items/latest").unwrap();
        assert_eq!(m.entry.operation(), "by_id");
    }

    #[test]
    fn test_access_level_carried_into_entry() {
        let table = table(ParamType::Integer);
        let create = table.find(Verb::Post, "/items").unwrap();
        assert_eq!(create.entry.access(), Access::Admin);
        assert!(!create.entry.is_public());
        let by_id = table.find(Verb::Get, "/items/1").unwrap();
        assert_eq!(by_id.entry.access(), Access::ApiKey);
    }

    #[test]
    fn test_unknown_verb_has_no_match() {
        let table = table(ParamType::Integer);
        assert!(table.find(Verb::Delete, "/items/1").is_none());
        assert!(RoutingTable::default().find(Verb::Get, "/").is_none());
    }

    #[test]
    fn test_compile_failure_is_registration_error() {
        let mut registry = HandlerRegistry::new();
        let err = registry.register(Arc::new(Broken)).unwrap_err();
        assert_eq!(err.handler, "broken");
        assert_eq!(err.operation, "bad");
        assert_eq!(err.path, "/broken/{id");
        assert!(matches!(err.source, TemplateError::Unclosed { .. }));
    }

    #[test]
    fn test_register_all_counts_routes() {
        let mut registry = HandlerRegistry::new();
        let handlers: Vec<Arc<dyn Handler>> = vec![
            Arc::new(Items { id_type: ParamType::Integer }),
            Arc::new(Items { id_type: ParamType::String }),
        ];
        assert_eq!(registry.register_all(handlers).unwrap(), 6);
        let table = registry.build();
        // First registered handler wins for identical templates.
        let m = table.find(Verb::Get, "/items/latest").unwrap();
        assert_eq!(m.entry.operation(), "latest");
    }
}
