//! Bounded worker pool for operation bodies.
//!
//! # Responsibilities
//! - Accept submitted operations without blocking the caller
//! - Cap the number of operations executing at once
//! - Isolate failures: a panicking operation only fails its own request
//! - Deliver the outcome through a `PendingResponse`

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use axum::http::StatusCode;
use axum::response::Response;
use futures_util::FutureExt;
use tokio::sync::{oneshot, Semaphore};

use crate::observability::metrics;
use crate::routing::error::{ErrorTranslator, HandlerError, RouteError};

/// Outcome of a submitted operation, delivered once it finishes.
#[derive(Debug)]
pub struct PendingResponse {
    rx: oneshot::Receiver<Result<Response, RouteError>>,
}

impl PendingResponse {
    /// Wait for the operation to complete its response.
    pub async fn response(self) -> Result<Response, RouteError> {
        self.rx
            .await
            .unwrap_or_else(|_| Err(RouteError::Unhandled("operation dropped its response".into())))
    }
}

#[derive(Debug)]
struct PoolInner {
    permits: Arc<Semaphore>,
    max_concurrent: usize,
    queued: AtomicUsize,
}

/// Shared executor for operation bodies. Cheap to clone.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    inner: Arc<PoolInner>,
}

impl WorkerPool {
    pub fn new(max_concurrent: usize) -> Self {
        let max_concurrent = max_concurrent.max(1);
        Self {
            inner: Arc::new(PoolInner {
                permits: Arc::new(Semaphore::new(max_concurrent)),
                max_concurrent,
                queued: AtomicUsize::new(0),
            }),
        }
    }

    /// Run `work` on the pool. Returns immediately; must be called within a Tokio runtime.
    pub fn submit<F>(&self, label: String, work: F) -> Result<PendingResponse, RouteError>
    where
        F: Future<Output = Result<Response, HandlerError>> + Send + 'static,
    {
        if self.is_closed() {
            return Err(RouteError::WorkerUnavailable);
        }

        let (tx, rx) = oneshot::channel();
        let inner = self.inner.clone();
        inner.queued.fetch_add(1, Ordering::Relaxed);

        tokio::spawn(async move {
            let permit = inner.permits.clone().acquire_owned().await;
            inner.queued.fetch_sub(1, Ordering::Relaxed);
            let Ok(_permit) = permit else {
                let _ = tx.send(Err(RouteError::WorkerUnavailable));
                return;
            };

            let started = Instant::now();
            let result = match AssertUnwindSafe(work).catch_unwind().await {
                Ok(Ok(response)) => Ok(response),
                Ok(Err(err)) => Err(RouteError::from(err)),
                Err(panic) => {
                    let message = panic_message(panic.as_ref());
                    tracing::error!(route = %label, panic = %message, "Operation panicked");
                    Err(RouteError::Unhandled(message.into()))
                }
            };

            let status = match &result {
                Ok(response) => response.status(),
                Err(err) => wire_status(err),
            };
            if let Err(RouteError::Unhandled(e)) = &result {
                tracing::error!(route = %label, error = %e, "Operation failed");
            }
            metrics::record_execution(&label, status.as_u16(), started);

            if tx.send(result).is_err() {
                tracing::debug!(route = %label, "Response receiver gone before completion");
            }
        });

        Ok(PendingResponse { rx })
    }

    /// Stop accepting work. Operations already waiting for a slot fail.
    pub fn close(&self) {
        self.inner.permits.close();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.permits.is_closed()
    }

    pub fn max_concurrent(&self) -> usize {
        self.inner.max_concurrent
    }

    /// Operations currently executing.
    pub fn active(&self) -> usize {
        self.inner.max_concurrent - self.inner.permits.available_permits()
    }

    /// Operations submitted but still waiting for a slot.
    pub fn queued(&self) -> usize {
        self.inner.queued.load(Ordering::Relaxed)
    }
}

/// Status the client will see for `err`; untranslated errors become 500.
fn wire_status(err: &RouteError) -> StatusCode {
    ErrorTranslator::translate(err)
        .map(|(status, _)| status)
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "operation panicked".to_string()
    }
}
