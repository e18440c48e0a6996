//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatcher and worker pool produce:
//!     → logging.rs (structured log events with request IDs)
//!     → metrics.rs (dispatch counters, operation latency)
//!
//! Consumers:
//!     → stdout (fmt layer)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID flows from the HTTP layer into every dispatch log line
//! - Metrics are cheap no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
