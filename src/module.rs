//! The REST module: owns the dispatcher for one ordered set of handlers.
//!
//! The hosting layer creates the module with its handlers and a worker pool,
//! then forwards every request to `dispatcher()`. `reinitialize` rebuilds the
//! routing table from scratch and swaps it in; entries are never edited in place.

use std::sync::Arc;

use crate::routing::dispatcher::Dispatcher;
use crate::routing::registry::{Handler, HandlerRegistry, RegistrationError, RoutingTable};
use crate::security::access_control::AccessGate;
use crate::worker::WorkerPool;

pub struct RestModule {
    dispatcher: Dispatcher,
}

impl RestModule {
    pub fn new(
        handlers: Vec<Arc<dyn Handler>>,
        pool: WorkerPool,
        gate: Arc<dyn AccessGate>,
    ) -> Result<Self, RegistrationError> {
        let table = build_table(handlers)?;
        tracing::info!(routes = table.len(), "Routing table published");
        Ok(Self {
            dispatcher: Dispatcher::new(table, gate, pool),
        })
    }

    /// Rebuild the table from `handlers`. On failure the current table stays live.
    pub fn reinitialize(&self, handlers: Vec<Arc<dyn Handler>>) -> Result<usize, RegistrationError> {
        let table = build_table(handlers)?;
        let routes = table.len();
        self.dispatcher.publish(table);
        tracing::info!(routes, "Routing table rebuilt");
        Ok(routes)
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }
}

fn build_table(handlers: Vec<Arc<dyn Handler>>) -> Result<RoutingTable, RegistrationError> {
    let mut registry = HandlerRegistry::new();
    registry.register_all(handlers)?;
    Ok(registry.build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::context::RequestContext;
    use crate::routing::error::RouteError;
    use crate::routing::params::ParamType;
    use crate::routing::registry::Operation;
    use crate::security::access_control::AllowAll;
    use axum::http::Method;
    use axum::response::IntoResponse;

    struct Fixed {
        base: &'static str,
        sub: &'static str,
    }

    impl Handler for Fixed {
        fn base_path(&self) -> &str {
            self.base
        }

        fn operations(self: Arc<Self>) -> Vec<Operation> {
            vec![Operation::new("op", |_| async { Ok("ok".into_response()) })
                .get()
                .path(self.sub)
                .param("id", ParamType::Integer)]
        }
    }

    fn fixed(base: &'static str, sub: &'static str) -> Arc<dyn Handler> {
        Arc::new(Fixed { base, sub })
    }

    #[tokio::test]
    async fn test_reinitialize_swaps_whole_table() {
        let module = RestModule::new(vec![fixed("/v1", "/{id}")], WorkerPool::new(1), Arc::new(AllowAll)).unwrap();
        let d = module.dispatcher();
        assert!(d.dispatch(RequestContext::new(Method::GET, "/v1/1")).await.is_ok());

        assert_eq!(module.reinitialize(vec![fixed("/v2", "/{id}")]).unwrap(), 1);
        let err = d.dispatch(RequestContext::new(Method::GET, "/v1/1")).await.unwrap_err();
        assert!(matches!(err, RouteError::NotFound));
        assert!(d.dispatch(RequestContext::new(Method::GET, "/v2/1")).await.is_ok());
    }

    #[tokio::test]
    async fn test_failed_reinitialize_keeps_current_table() {
        let module = RestModule::new(vec![fixed("/v1", "/{id}")], WorkerPool::new(1), Arc::new(AllowAll)).unwrap();
        assert!(module.reinitialize(vec![fixed("/v2", "/{id")]).is_err());
        let d = module.dispatcher();
        assert!(d.dispatch(RequestContext::new(Method::GET, "/v1/1")).await.is_ok());
    }

    #[test]
    fn test_invalid_handler_fails_startup() {
        let err = RestModule::new(vec![fixed("/v1", "/{id}/{other}")], WorkerPool::new(1), Arc::new(AllowAll))
            .err()
            .unwrap();
        assert_eq!(err.path, "/v1/{id}/{other}");
    }
}
