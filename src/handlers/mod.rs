//! Built-in handlers served by the `rest-router` binary.
//!
//! - `status.rs`: liveness/version endpoint, public
//! - `users.rs`: in-memory user and session directory keyed by identifier

pub mod status;
pub mod users;

use std::future::{ready, Ready};
use std::sync::Arc;

use axum::response::Response;

use crate::routing::error::HandlerError;
use crate::routing::registry::{Handler, Invocation};

pub use status::StatusHandler;
pub use users::UserHandler;

/// Adapt a synchronous handler method into an operation body bound to `handler`.
pub(crate) fn sync_op<H, F>(
    handler: &Arc<H>,
    f: F,
) -> impl Fn(Invocation) -> Ready<Result<Response, HandlerError>> + Send + Sync + 'static
where
    H: Send + Sync + 'static,
    F: Fn(&H, Invocation) -> Result<Response, HandlerError> + Send + Sync + 'static,
{
    let handler = handler.clone();
    move |inv| ready(f(&handler, inv))
}

/// The handlers registered by the binary, in registration order.
pub fn default_handlers() -> Vec<Arc<dyn Handler>> {
    vec![Arc::new(StatusHandler::new()), Arc::new(UserHandler::new())]
}
