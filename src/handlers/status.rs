use std::sync::Arc;
use std::time::Instant;

use axum::{response::IntoResponse, Json};
use serde::Serialize;

use crate::handlers::sync_op;
use crate::routing::registry::{Handler, Operation};

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub uptime_secs: u64,
}

pub struct StatusHandler {
    started: Instant,
}

impl StatusHandler {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

impl Default for StatusHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl Handler for StatusHandler {
    fn name(&self) -> &str {
        "status"
    }

    fn base_path(&self) -> &str {
        "/status"
    }

    fn operations(self: Arc<Self>) -> Vec<Operation> {
        vec![Operation::new(
            "get_status",
            sync_op(&self, |h: &StatusHandler, _| {
                Ok(Json(SystemStatus {
                    version: env!("CARGO_PKG_VERSION"),
                    status: "operational",
                    uptime_secs: h.started.elapsed().as_secs(),
                })
                .into_response())
            }),
        )
        .get()
        .public()]
    }
}
