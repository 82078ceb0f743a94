//! WebSocket server implementation
//!
//! Starts and manages the axum-based server: the `/ws` session endpoint
//! and the `/health` check.

use axum::{http::HeaderValue, routing::get, Json, Router};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use aegis_core::config::Config;
use aegis_core::fallback::FallbackPackage;
use aegis_live::client::LiveClient;

use crate::handler::websocket_handler;
use crate::Result;

/// Shared server state
#[derive(Clone)]
pub struct WsState {
    /// Upstream live-session client
    pub live_client: Arc<dyn LiveClient>,
    /// Process-wide fallback package
    pub fallback: Arc<FallbackPackage>,
    /// Server configuration
    pub config: Arc<Config>,
}

/// Start the WebSocket server
pub async fn start_ws_server(
    port: u16,
    config: Config,
    live_client: Arc<dyn LiveClient>,
) -> Result<()> {
    let cors_layer = cors_layer(&config);

    let state = Arc::new(WsState {
        live_client,
        fallback: FallbackPackage::current(),
        config: Arc::new(config),
    });

    let app = Router::new()
        .route("/ws", get(websocket_handler))
        .route("/health", get(health_check))
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Server listening on {}", addr);
    info!("Emergency session endpoint: ws://localhost:{}/ws", port);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint for container orchestration.
async fn health_check() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "service": "aegis-gateway" }))
}

fn cors_layer(config: &Config) -> CorsLayer {
    match &config.server.allowed_origins {
        Some(origins) if !origins.is_empty() => {
            let parsed: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|origin| match origin.parse() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        warn!("Ignoring invalid CORS origin: {}", origin);
                        None
                    }
                })
                .collect();
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(parsed))
                .allow_methods(Any)
                .allow_headers(Any)
        }
        _ => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    }
}

/// Builder for the WebSocket server
pub struct WsServerBuilder {
    port: u16,
    config: Config,
}

impl WsServerBuilder {
    /// Create a new builder; the port defaults to the configured one.
    pub fn new(config: Config) -> Self {
        Self {
            port: config.server.port,
            config,
        }
    }

    /// Override the port
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Build and start the server
    pub async fn start(self, live_client: Arc<dyn LiveClient>) -> Result<()> {
        start_ws_server(self.port, self.config, live_client).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_builder_uses_configured_port() {
        let mut config = Config::default();
        config.server.port = 9090;
        let builder = WsServerBuilder::new(config);
        assert_eq!(builder.port, 9090);
    }

    #[test]
    fn test_server_builder_port_override() {
        let builder = WsServerBuilder::new(Config::default()).port(3001);
        assert_eq!(builder.port, 3001);
    }

    #[test]
    fn test_cors_layer_accepts_origin_list() {
        let mut config = Config::default();
        config.server.allowed_origins =
            Some(vec!["https://example.com".to_string(), "not a header\n".to_string()]);
        // the invalid origin is skipped rather than failing startup
        let _ = cors_layer(&config);
    }
}
