//! Operation execution subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatcher (route matched, access granted, params bound)
//!     → pool.rs (submit; caller returns immediately)
//!     → Tokio task waits for a concurrency slot
//!     → operation body runs, outcome sent through PendingResponse
//!     → HTTP layer awaits PendingResponse and writes the response
//! ```
//!
//! # Design Decisions
//! - Accept-time concurrency is decoupled from business-logic concurrency
//! - Sizing comes from configuration; the router only holds a reference
//! - No cancellation or timeout here; the HTTP layer applies a request timeout

pub mod pool;

pub use pool::{PendingResponse, WorkerPool};
