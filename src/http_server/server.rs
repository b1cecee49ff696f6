//! # HTTP Server
//!
//! Unified entry point for the scenebase editor API.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::observability::Logger;
use crate::publish::Publisher;
use crate::scene::{SceneResult, SceneStore};

use super::scene_routes::{scene_routes, AppState};

/// HTTP server for the scenebase API
pub struct HttpServer {
    config: ServerConfig,
    router: Router,
}

impl HttpServer {
    /// Open the scene store and build the server from configuration.
    pub fn new(config: ServerConfig) -> SceneResult<Self> {
        let store = Arc::new(SceneStore::open(&config.data_dir)?);
        let publisher = Publisher::new(store.clone(), config.publish_config());
        let state = Arc::new(AppState { store, publisher });

        let router = Self::build_router(state, &config);
        Ok(Self { config, router })
    }

    /// Build the combined router with all endpoints
    fn build_router(state: Arc<AppState>, config: &ServerConfig) -> Router {
        let cors = if config.cors_origins.is_empty() {
            // Permissive for development when no origins are configured
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            use tower_http::cors::AllowOrigin;
            let origins: Vec<_> = config
                .cors_origins
                .iter()
                .filter_map(|s| s.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        };

        Router::new()
            .route("/health", get(health_handler))
            .nest("/api", scene_routes(state))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
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
    pub async fn start(self) -> Result<(), std::io::Error> {
        let addr: SocketAddr = self
            .config
            .socket_addr()
            .parse()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

        let addr_text = addr.to_string();
        Logger::info("SERVER_START", &[("addr", addr_text.as_str())]);

        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, self.router).await?;

        Ok(())
    }
}

async fn health_handler() -> Json<Value> {
    Json(json!({"status": "ok"}))
}
