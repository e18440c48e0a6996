//! Request dispatch.
//!
//! # Responsibilities
//! - Pick the first route, in registration order, whose matcher fully matches
//! - Consult the access gate before any work is scheduled
//! - Bind path parameters and submit the operation to the worker pool
//!
//! # Design Decisions
//! - Registration order decides between overlapping routes, not specificity
//! - The table is read through an `ArcSwap` snapshot; no locks on the hot path
//! - `dispatch` does not wait for the operation; the caller gets a `PendingResponse`

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::observability::metrics;
use crate::routing::context::RequestContext;
use crate::routing::error::RouteError;
use crate::routing::params::Params;
use crate::routing::registry::{Invocation, RoutingTable};
use crate::routing::verb::Verb;
use crate::security::access_control::AccessGate;
use crate::worker::{PendingResponse, WorkerPool};

pub struct Dispatcher {
    table: ArcSwap<RoutingTable>,
    gate: Arc<dyn AccessGate>,
    pool: WorkerPool,
}

impl Dispatcher {
    pub fn new(table: RoutingTable, gate: Arc<dyn AccessGate>, pool: WorkerPool) -> Self {
        Self {
            table: ArcSwap::from_pointee(table),
            gate,
            pool,
        }
    }

    /// Current table snapshot.
    pub fn table(&self) -> Arc<RoutingTable> {
        self.table.load_full()
    }

    /// Replace the whole table. In-flight dispatches keep the snapshot they started with.
    pub fn publish(&self, table: RoutingTable) {
        self.table.store(Arc::new(table));
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    /// Match, authorize, bind and submit one request.
    ///
    /// `ctx.path` must already be stripped of the deployment context prefix.
    pub async fn dispatch(&self, ctx: RequestContext) -> Result<PendingResponse, RouteError> {
        let table = self.table.load_full();
        let method = ctx.method.to_string();

        let Some(verb) = Verb::from_method(&ctx.method) else {
            metrics::record_dispatch(&method, "not_found");
            return Err(RouteError::NotFound);
        };

        let (entry, captures) = match table.find(verb, &ctx.path) {
            Some(found) => {
                let captures: Vec<String> = found.captures.iter().map(|c| c.to_string()).collect();
                (found.entry, captures)
            }
            None => {
                tracing::debug!(request_id = %ctx.request_id, verb = %verb, path = %ctx.path, "No route matched");
                metrics::record_dispatch(&method, "not_found");
                return Err(RouteError::NotFound);
            }
        };

        if let Err(err) = self.gate.check(&entry, &ctx).await {
            metrics::record_dispatch(&method, "denied");
            return Err(err);
        }

        let raw: Vec<&str> = captures.iter().map(String::as_str).collect();
        let params = match Params::bind(entry.template().params(), &raw) {
            Ok(params) => params,
            Err(err) => {
                tracing::debug!(request_id = %ctx.request_id, route = %entry.label(), error = %err, "Parameter binding failed");
                metrics::record_dispatch(&method, "invalid");
                return Err(err.into());
            }
        };

        tracing::debug!(
            request_id = %ctx.request_id,
            route = %entry.label(),
            operation = entry.operation(),
            "Dispatching"
        );

        let label = entry.label();
        let work = entry.invoke(Invocation {
            request: ctx,
            params,
        });
        let pending = self.pool.submit(label, work)?;
        metrics::record_dispatch(&method, "submitted");
        Ok(pending)
    }
}
