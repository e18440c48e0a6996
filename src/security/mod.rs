//! Security subsystem.
//!
//! # Responsibilities
//! - Gate matched routes before their operation is scheduled
//! - API key checks scoped by domain and path prefix
//! - HTTP Basic credentials for `authenticated` and `admin` operations
//!
//! # Design Decisions
//! - The gate sees the matched entry, so operations can opt out (`public`)
//! - Rejections carry their own status (401 for a missing or wrong key or
//!   credentials, 403 for a non-admin on an admin operation)

pub mod access_control;
pub mod credentials;

pub use access_control::{AccessGate, AllowAll, ApiKeyGate, GateChain};
pub use credentials::CredentialGate;
