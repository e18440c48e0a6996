//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Registration (at startup or module reinitialization):
//!     Handler[] (ordered)
//!     → registry.rs (base path + sub-path per tagged operation)
//!     → template.rs (compile template + declared types into anchored matcher)
//!     → Freeze as immutable RoutingTable
//!
//! Incoming Request (verb, context-stripped path)
//!     → dispatcher.rs (first matching entry, in registration order)
//!     → access gate (may reject with its own status)
//!     → params.rs (bind captures to declared types)
//!     → worker pool (asynchronous execution)
//!     → error.rs (translate failures to status codes)
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - First match wins; registration order, not specificity, breaks ties
//! - Full-string matching; the type fragment is part of the matcher
//! - Compilation failures are registration errors, never silently dropped routes

pub mod context;
pub mod dispatcher;
pub mod error;
pub mod params;
pub mod registry;
pub mod template;
pub mod verb;

pub use context::RequestContext;
pub use dispatcher::Dispatcher;
pub use error::{ErrorTranslator, HandlerError, RouteError};
pub use params::{ParamDescriptor, ParamType, ParamValue, Params};
pub use registry::{
    Access, Handler, HandlerRegistry, Invocation, Operation, RegistrationError, RouteEntry, RoutingTable,
};
pub use template::{CompiledTemplate, TemplateError};
pub use verb::Verb;
