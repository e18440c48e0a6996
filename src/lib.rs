//! REST routing and dispatch engine.

pub mod config;
pub mod handlers;
pub mod http;
pub mod jid;
pub mod lifecycle;
pub mod module;
pub mod observability;
pub mod routing;
pub mod security;
pub mod worker;

pub use config::RouterConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use module::RestModule;
