//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;

use rest_router::config::RouterConfig;
use rest_router::http::HttpServer;
use rest_router::lifecycle::startup::build_module;
use rest_router::routing::registry::Handler;
use rest_router::{RestModule, Shutdown};

/// A server bound to an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub module: Arc<RestModule>,
    pub shutdown: Arc<Shutdown>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start the HTTP server with `handlers` on 127.0.0.1:0.
pub async fn start_server(mut config: RouterConfig, handlers: Vec<Arc<dyn Handler>>) -> TestServer {
    config.listener.bind_address = "127.0.0.1:0".to_string();
    let module = build_module(&config, handlers).unwrap();

    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Arc::new(Shutdown::new());
    let rx = shutdown.subscribe();
    let server = HttpServer::new(config, module.clone());
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    // Give the accept loop a moment to start.
    tokio::time::sleep(Duration::from_millis(50)).await;

    TestServer { addr, module, shutdown }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}
