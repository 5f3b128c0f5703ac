//! HTTP API server for `VoiceMaps`

pub mod command;
mod error;
pub mod health;
pub mod places;
pub mod sessions;
pub mod voice;

pub use error::ApiError;

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::Result;
use crate::agent::MapsAgent;
use crate::config::{DEFAULT_PORT, VoiceConfig};
use crate::cycle::CycleRegistry;

/// Shared state for API handlers
pub struct ApiState {
    pub agent: Arc<MapsAgent>,
    /// One cycle tracker per session, for supersede
    pub cycles: CycleRegistry,
    /// Voice settings handed to browser clients
    pub voice: VoiceConfig,
}

/// Configuration for building an API server
pub struct ApiServerBuilder {
    agent: Arc<MapsAgent>,
    port: u16,
    static_dir: Option<PathBuf>,
    voice: VoiceConfig,
}

impl ApiServerBuilder {
    /// Create a new API server builder
    #[must_use]
    pub fn new(agent: Arc<MapsAgent>) -> Self {
        Self {
            agent,
            port: DEFAULT_PORT,
            static_dir: None,
            voice: VoiceConfig::default(),
        }
    }

    /// Set the port to listen on
    #[must_use]
    pub const fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Serve a web UI directory for unmatched routes
    #[must_use]
    pub fn static_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.static_dir = dir;
        self
    }

    /// Voice settings reported to clients
    #[must_use]
    pub fn voice(mut self, voice: VoiceConfig) -> Self {
        self.voice = voice;
        self
    }

    /// Build the API server
    #[must_use]
    pub fn build(self) -> ApiServer {
        let state = Arc::new(ApiState {
            agent: self.agent,
            cycles: CycleRegistry::new(),
            voice: self.voice,
        });

        ApiServer {
            state,
            port: self.port,
            static_dir: self.static_dir,
        }
    }
}

/// API server
pub struct ApiServer {
    state: Arc<ApiState>,
    port: u16,
    static_dir: Option<PathBuf>,
}

impl ApiServer {
    /// Build the router with all routes
    #[must_use]
    pub fn router(&self) -> Router {
        let api = Router::new()
            .merge(command::router(self.state.clone()))
            .merge(voice::router(self.state.clone()))
            .merge(places::router(self.state.clone()))
            .merge(sessions::router(self.state.clone()));

        let mut router = Router::new().nest("/api", api).merge(health::router());

        // Serve static files if configured
        if let Some(static_dir) = &self.static_dir {
            let index_file = static_dir.join("index.html");
            let serve_dir =
                ServeDir::new(static_dir).not_found_service(ServeFile::new(&index_file));

            router = router.fallback_service(serve_dir);
            tracing::info!(path = %static_dir.display(), "serving static files");
        }

        // CORS layer for cross-origin requests from frontend
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        router.layer(cors).layer(TraceLayer::new_for_http())
    }

    /// Run the API server
    ///
    /// # Errors
    ///
    /// Returns error if server fails to bind or run
    pub async fn run(self) -> Result<()> {
        let addr = format!("0.0.0.0:{}", self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| crate::Error::Config(format!("failed to bind API server: {e}")))?;

        tracing::info!(port = self.port, "API server listening");

        axum::serve(listener, self.router())
            .await
            .map_err(|e| crate::Error::Config(format!("API server error: {e}")))?;

        Ok(())
    }
}
