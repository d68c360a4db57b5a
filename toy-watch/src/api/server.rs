//! HTTP server setup and routing

use crate::config::{Config, PlayerSettings, SessionLimits};
use crate::error::{Error, Result};
use crate::resolver::MediaResolver;
use crate::state::{spawn_session_reaper, SharedState};
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Shared application context passed to all handlers
#[derive(Clone)]
pub struct AppContext {
    pub state: Arc<SharedState>,
    pub resolver: Arc<dyn MediaResolver>,
    pub settings: PlayerSettings,
    pub sessions: SessionLimits,
    pub app_store_url: Arc<str>,
    /// Origin of share links, without trailing slash
    pub public_url: Arc<str>,
    pub port: u16,
}

impl AppContext {
    pub fn new(config: &Config, state: Arc<SharedState>, resolver: Arc<dyn MediaResolver>) -> Self {
        Self {
            state,
            resolver,
            settings: config.player,
            sessions: config.sessions,
            app_store_url: Arc::from(config.app_store_url.as_str()),
            public_url: Arc::from(config.public_url.trim_end_matches('/')),
            port: config.port,
        }
    }
}

/// Build the router with all routes
pub fn create_router(ctx: AppContext) -> Router {
    Router::new()
        .route("/health", get(super::handlers::health))

        // App Store hand-off
        .route("/app", get(super::handlers::app_redirect))
        .route("/card/:slug", get(super::handlers::card_redirect))

        // Watch page
        .route("/watch/:token", get(super::handlers::watch_page))
        .route("/watch/:token/sessions", post(super::handlers::create_session))

        // Player sessions
        .route(
            "/sessions/:id",
            get(super::handlers::get_session).delete(super::handlers::delete_session),
        )
        .route("/sessions/:id/actions", post(super::handlers::session_action))
        .route("/sessions/:id/media", post(super::handlers::media_report))
        .route("/sessions/:id/events", get(super::sse::event_stream))

        .with_state(ctx)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Run HTTP API server until Ctrl+C / SIGTERM
pub async fn run(ctx: AppContext) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], ctx.port));

    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::Http(format!("Failed to bind to {}: {}", addr, e)))?;

    let reaper = spawn_session_reaper(Arc::clone(&ctx.state), ctx.sessions);
    info!(
        idle_timeout_secs = ctx.sessions.idle_timeout.as_secs(),
        "Idle session sweep started"
    );
    let app = create_router(ctx);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| Error::Http(format!("Server error: {}", e)))?;

    reaper.abort();
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
