//! # HTTP Server
//!
//! Control server combining the health and fault routers around one shared
//! registry.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;

use super::config::HttpServerConfig;
use super::fault_routes::{fault_routes, health_routes};
use crate::observability::{log_event_with_fields, Event};
use crate::registry::FaultRegistry;

/// HTTP control server for a fault registry
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    /// Create a server for `registry` with default configuration
    pub fn new(registry: Arc<FaultRegistry>) -> Self {
        Self::with_config(HttpServerConfig::default(), registry)
    }

    /// Create a server for `registry` with custom configuration
    pub fn with_config(config: HttpServerConfig, registry: Arc<FaultRegistry>) -> Self {
        let router = Self::build_router(registry);
        Self { config, router }
    }

    fn build_router(registry: Arc<FaultRegistry>) -> Router {
        Router::new()
            .merge(health_routes())
            .merge(fault_routes(registry))
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Start the HTTP server (async)
    pub async fn start(self) -> Result<(), io::Error> {
        let addr: SocketAddr = self
            .config
            .socket_addr()
            .parse()
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;

        let listener = TcpListener::bind(addr).await?;
        self.serve_on(listener).await
    }

    /// Serve on an already bound listener
    pub async fn serve_on(self, listener: TcpListener) -> Result<(), io::Error> {
        log_event_with_fields(
            Event::ControlServerStart,
            &[("addr", &listener.local_addr()?.to_string())],
        );

        axum::serve(listener, self.router).await?;

        Ok(())
    }
}
