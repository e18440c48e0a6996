//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router that feeds every request to the REST module
//! - Wire up middleware (tracing, timeout, request ID)
//! - Strip the context path and build the dispatch context
//! - Await the operation's response and translate failures
//! - Serve until the shutdown signal, then stop the worker pool

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::RouterConfig;
use crate::http::request::{into_context, strip_context_path, BodyTooLarge, RequestIdExt, RequestIdMaker};
use crate::http::response::error_response;
use crate::module::RestModule;
use crate::routing::error::RouteError;

/// Application state injected into the dispatch handler.
#[derive(Clone)]
pub struct AppState {
    pub module: Arc<RestModule>,
    pub context_path: Arc<str>,
    pub max_body_bytes: usize,
}

/// HTTP front end for one REST module.
pub struct HttpServer {
    router: Router,
    config: RouterConfig,
    module: Arc<RestModule>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: RouterConfig, module: Arc<RestModule>) -> Self {
        let state = AppState {
            module: module.clone(),
            context_path: Arc::from(config.listener.context_path.as_str()),
            max_body_bytes: config.listener.max_body_bytes,
        };

        let router = Self::build_router(&config, state);
        Self {
            router,
            config,
            module,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &RouterConfig, state: AppState) -> Router {
        Router::new()
            .fallback(dispatch_handler)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(RequestIdMaker::default()))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs))),
            )
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            context_path = %self.config.listener.context_path,
            routes = self.module.dispatcher().table().len(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        self.module.dispatcher().pool().close();
        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }
}

/// Catch-all handler: every request goes through the REST module's dispatcher.
async fn dispatch_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let request_id = request.request_id();

    let Some(path) = strip_context_path(request.uri().path(), &state.context_path).map(str::to_string) else {
        tracing::debug!(request_id = %request_id, path = %request.uri().path(), "Outside context path");
        return error_response(&request_id, RouteError::NotFound);
    };

    let ctx = match into_context(request, path, state.max_body_bytes).await {
        Ok(ctx) => ctx,
        Err(BodyTooLarge) => {
            return (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response();
        }
    };

    let result = match state.module.dispatcher().dispatch(ctx).await {
        Ok(pending) => pending.response().await,
        Err(err) => Err(err),
    };

    match result {
        Ok(response) => response,
        Err(err) => error_response(&request_id, err),
    }
}
