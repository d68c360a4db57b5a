//! HTTP request handlers

use crate::api::server::AppContext;
use crate::error::Error;
use crate::playback::SlotSignal;
use crate::session::{SessionResponse, WatchSession};
use crate::state::{publish_update, SessionHandle};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Redirect,
    Json,
};
use serde::Serialize;
use toy_common::api::{ActionRequest, ErrorResponse, MediaReport, SignalKind};
use toy_common::{CardSummary, ResolvedMedia};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Site name used in page metadata
pub const SITE_NAME: &str = "TOY - Thinking Of You";

pub const NOT_FOUND_TITLE: &str = "Video Not Found | TOY";
pub const NOT_FOUND_DESCRIPTION: &str = "This video may not exist or has not been published yet.";

pub type ApiError = (StatusCode, Json<ErrorResponse>);

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    module: String,
    version: String,
    port: u16,
}

/// Watch page metadata (title, description, social preview)
#[derive(Debug, Serialize)]
pub struct WatchPageResponse {
    pub title: String,
    pub description: String,
    pub site_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card: Option<CardSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_kind: Option<String>,
    pub clip_count: usize,
    /// Link offered by the copy-link and native share actions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share_text: Option<String>,
}

impl WatchPageResponse {
    fn not_found() -> Self {
        Self {
            title: NOT_FOUND_TITLE.to_string(),
            description: NOT_FOUND_DESCRIPTION.to_string(),
            site_name: SITE_NAME.to_string(),
            card: None,
            poster_url: None,
            media_kind: None,
            clip_count: 0,
            share_url: None,
            share_text: None,
        }
    }
}

fn api_error(err: &Error) -> ApiError {
    let (status, title) = match err {
        Error::CardNotFound(_) => (StatusCode::NOT_FOUND, "card_not_found"),
        Error::SessionNotFound(_) => (StatusCode::NOT_FOUND, "session_not_found"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
    };
    (status, Json(ErrorResponse::new(title, err.to_string())))
}

async fn lookup(ctx: &AppContext, id: Uuid) -> Result<SessionHandle, ApiError> {
    ctx.state
        .get_session(id)
        .await
        .ok_or_else(|| api_error(&Error::SessionNotFound(id)))
}

// ============================================================================
// Health / Redirects
// ============================================================================

/// GET /health - Health check endpoint
pub async fn health(State(ctx): State<AppContext>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: "toy-watch".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        port: ctx.port,
    })
}

/// GET /app - permanent redirect to the App Store listing
pub async fn app_redirect(State(ctx): State<AppContext>) -> Redirect {
    Redirect::permanent(&ctx.app_store_url)
}

/// GET /card/{slug} - card links open the app
pub async fn card_redirect(State(ctx): State<AppContext>, Path(slug): Path<String>) -> Redirect {
    debug!(slug = %slug, "Card link redirected to app listing");
    Redirect::temporary(&ctx.app_store_url)
}

// ============================================================================
// Watch Page
// ============================================================================

/// GET /watch/{token} - page metadata for a shared card
pub async fn watch_page(
    State(ctx): State<AppContext>,
    Path(token): Path<String>,
) -> (StatusCode, Json<WatchPageResponse>) {
    let Some(resolved) = ctx.resolver.resolve(&token) else {
        debug!(token = %token, "Watch page not found");
        return (StatusCode::NOT_FOUND, Json(WatchPageResponse::not_found()));
    };

    let media_kind = match &resolved.media {
        ResolvedMedia::Clips { .. } => "clips",
        ResolvedMedia::Montage { .. } => "montage",
    };

    (
        StatusCode::OK,
        Json(WatchPageResponse {
            title: format!("A video for {} | TOY", resolved.card.recipient_name),
            description: resolved.card.title.clone(),
            site_name: SITE_NAME.to_string(),
            clip_count: resolved.media.item_count(),
            media_kind: Some(media_kind.to_string()),
            share_url: Some(format!("{}/watch/{}", ctx.public_url, token)),
            share_text: Some(format!(
                "Check out this video for {}: {}",
                resolved.card.recipient_name, resolved.card.title
            )),
            poster_url: resolved.poster_url,
            card: Some(resolved.card),
        }),
    )
}

// ============================================================================
// Sessions
// ============================================================================

/// POST /watch/{token}/sessions - resolve the token and mount a player
pub async fn create_session(
    State(ctx): State<AppContext>,
    Path(token): Path<String>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    let resolved = ctx
        .resolver
        .resolve(&token)
        .ok_or_else(|| api_error(&Error::CardNotFound(token.clone())))?;

    let (session, update) = WatchSession::mount(token, resolved, ctx.settings);
    let session_id = session.id();
    let handle = ctx.state.insert_session(session).await;

    let mut guard = handle.lock().await;
    publish_update(&ctx.state, &handle, update);
    info!(session_id = %session_id, "Watch session mounted");

    Ok((StatusCode::CREATED, Json(guard.response())))
}

/// GET /sessions/{id} - snapshot, overlay and pending renderer commands
pub async fn get_session(
    State(ctx): State<AppContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, ApiError> {
    let handle = lookup(&ctx, id).await?;
    let mut session = handle.lock().await;
    Ok(Json(session.response()))
}

/// DELETE /sessions/{id} - unmount, releasing both slots
pub async fn delete_session(
    State(ctx): State<AppContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, ApiError> {
    let handle = ctx
        .state
        .remove_session(id)
        .await
        .ok_or_else(|| api_error(&Error::SessionNotFound(id)))?;

    let mut session = handle.lock().await;
    let update = session.unmount();
    publish_update(&ctx.state, &handle, update);
    info!(session_id = %id, "Watch session unmounted");

    Ok(Json(session.response()))
}

/// POST /sessions/{id}/actions - user intent
pub async fn session_action(
    State(ctx): State<AppContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<ActionRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let handle = lookup(&ctx, id).await?;
    let mut session = handle.lock().await;

    debug!(session_id = %id, action = ?req.action, "User action");
    let update = session.update(|player| player.user_action(req.action));
    publish_update(&ctx.state, &handle, update);

    Ok(Json(session.response()))
}

/// POST /sessions/{id}/media - renderer signal for one slot
pub async fn media_report(
    State(ctx): State<AppContext>,
    Path(id): Path<Uuid>,
    Json(report): Json<MediaReport>,
) -> Result<Json<SessionResponse>, ApiError> {
    let handle = lookup(&ctx, id).await?;
    let mut session = handle.lock().await;

    let signal = match report.signal {
        SignalKind::Ready => SlotSignal::Ready,
        SignalKind::Ended => SlotSignal::Ended,
        SignalKind::Error => {
            let message = report.message.unwrap_or_else(|| "media error".to_string());
            warn!(session_id = %id, slot = %report.slot, error = %message, "Renderer reported error");
            SlotSignal::Error(message)
        }
        SignalKind::PlayRejected => SlotSignal::PlayRejected,
    };

    let update = session.update(|player| player.report(report.slot, signal));
    publish_update(&ctx.state, &handle, update);

    Ok(Json(session.response()))
}
