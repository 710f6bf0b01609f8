//! HTTP request handlers

use super::server::AppContext;
use super::ApiError;
use crate::engine::{EngineRole, PlayState};
use crate::playback::{PlayOutcome, StatusReport};
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    module: String,
    version: String,
}

#[derive(Debug, Deserialize)]
pub struct PlayRequest {
    video_id: String,
}

#[derive(Debug, Serialize)]
pub struct PlayResponse {
    success: bool,
    message: String,
    #[serde(flatten)]
    outcome: PlayOutcome,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlAction {
    PauseResume,
    Restart,
    Stop,
}

#[derive(Debug, Deserialize)]
pub struct ControlRequest {
    action: ControlAction,
}

#[derive(Debug, Serialize)]
pub struct ControlResponse {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    state: Option<PlayState>,
}

#[derive(Debug, Deserialize)]
pub struct VolumeRequest {
    role: EngineRole,
    level: u16,
}

#[derive(Debug, Serialize)]
pub struct VolumeResponse {
    master: u16,
    background: u16,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SyncOffsetBody {
    offset_ms: i64,
}

#[derive(Debug, Deserialize)]
pub struct ClientReadyRequest {
    video_id: String,
}

#[derive(Debug, Serialize)]
pub struct ClientReadyResponse {
    accepted: bool,
}

// ============================================================================
// Health
// ============================================================================

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        module: "kjc-controller".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============================================================================
// Playback
// ============================================================================

/// POST /play - preload and start an asset on both sides
///
/// The run executes on its own task so a disconnecting caller cannot cancel
/// it halfway through the sequence.
pub async fn play(
    State(ctx): State<AppContext>,
    Json(req): Json<PlayRequest>,
) -> Result<Json<PlayResponse>, ApiError> {
    info!(video_id = %req.video_id, "Received play request");

    let coordinator = ctx.controller.coordinator.clone();
    let video_id = req.video_id;
    let outcome = tokio::spawn(async move { coordinator.play(&video_id).await })
        .await
        .map_err(|e| {
            error!("Play task failed: {}", e);
            crate::Error::Internal(format!("play task failed: {}", e))
        })??;

    Ok(Json(PlayResponse {
        success: true,
        message: format!("Playing {}", outcome.video_id),
        outcome,
    }))
}

/// POST /control - pause_resume, restart or stop
pub async fn control(
    State(ctx): State<AppContext>,
    Json(req): Json<ControlRequest>,
) -> Result<Json<ControlResponse>, ApiError> {
    info!(action = ?req.action, "Received control action");
    let coordinator = &ctx.controller.coordinator;

    let (message, state) = match req.action {
        ControlAction::PauseResume => {
            let state = coordinator.pause_resume().await?;
            (format!("Playback {}", state), Some(state))
        }
        ControlAction::Restart => {
            coordinator.restart().await?;
            ("Playback restarted".to_string(), None)
        }
        ControlAction::Stop => {
            coordinator.stop().await?;
            ("Playback stopped".to_string(), None)
        }
    };

    Ok(Json(ControlResponse {
        success: true,
        message,
        state,
    }))
}

/// GET /status - master engine status and current session
pub async fn status(State(ctx): State<AppContext>) -> Result<Json<StatusReport>, ApiError> {
    Ok(Json(ctx.controller.coordinator.status().await?))
}

// ============================================================================
// Volume / sync offset
// ============================================================================

/// GET /volume
pub async fn get_volume(State(ctx): State<AppContext>) -> Json<VolumeResponse> {
    let state = &ctx.controller.state;
    Json(VolumeResponse {
        master: state.volume_target(EngineRole::Master).await,
        background: state.volume_target(EngineRole::Background).await,
    })
}

/// POST /volume - set the target volume of one engine (0-256)
pub async fn set_volume(
    State(ctx): State<AppContext>,
    Json(req): Json<VolumeRequest>,
) -> Result<Json<VolumeResponse>, ApiError> {
    ctx.controller
        .coordinator
        .set_volume_target(req.role, req.level)
        .await?;
    Ok(get_volume(State(ctx)).await)
}

/// GET /sync_offset
pub async fn get_sync_offset(State(ctx): State<AppContext>) -> Json<SyncOffsetBody> {
    Json(SyncOffsetBody {
        offset_ms: ctx.controller.state.sync_offset_ms().await,
    })
}

/// POST /sync_offset - signed ms; positive delays the master
pub async fn set_sync_offset(
    State(ctx): State<AppContext>,
    Json(req): Json<SyncOffsetBody>,
) -> Result<Json<SyncOffsetBody>, ApiError> {
    ctx.controller
        .coordinator
        .set_sync_offset_ms(req.offset_ms)
        .await?;
    Ok(Json(req))
}

// ============================================================================
// Display client
// ============================================================================

/// POST /client/ready - display client finished preloading
pub async fn client_ready(
    State(ctx): State<AppContext>,
    Json(req): Json<ClientReadyRequest>,
) -> (StatusCode, Json<ClientReadyResponse>) {
    let accepted = ctx.controller.coordinator.client_ready(&req.video_id);
    let code = if accepted {
        StatusCode::OK
    } else {
        StatusCode::CONFLICT
    };
    (code, Json(ClientReadyResponse { accepted }))
}

/// Fallback for unknown routes
pub async fn not_found() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "not found", "kind": "not_found" })),
    )
}
