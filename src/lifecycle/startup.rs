//! Startup orchestration.
//!
//! Builds the REST module from configuration and an ordered handler list.

use std::sync::Arc;

use crate::config::RouterConfig;
use crate::module::RestModule;
use crate::routing::registry::{Handler, RegistrationError};
use crate::security::access_control::{AccessGate, ApiKeyGate, GateChain};
use crate::security::credentials::CredentialGate;
use crate::worker::WorkerPool;

/// API key check followed by the credential check for protected operations.
pub fn access_gate(config: &RouterConfig) -> Arc<dyn AccessGate> {
    Arc::new(GateChain::new(vec![
        Arc::new(ApiKeyGate::new(config.security.api_keys.clone())),
        Arc::new(CredentialGate::from_config(&config.security)),
    ]))
}

/// Create the worker pool and gate, then register `handlers` in order.
pub fn build_module(
    config: &RouterConfig,
    handlers: Vec<Arc<dyn Handler>>,
) -> Result<Arc<RestModule>, RegistrationError> {
    let pool = WorkerPool::new(config.workers.max_concurrent);
    tracing::info!(
        max_concurrent = pool.max_concurrent(),
        api_keys = config.security.api_keys.len(),
        users = config.security.users.len(),
        "Building REST module"
    );
    RestModule::new(handlers, pool, access_gate(config)).map(Arc::new)
}
