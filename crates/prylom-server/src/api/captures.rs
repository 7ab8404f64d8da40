//! Capture session handlers.
//!
//! Each capture is a [`CaptureController`] held in the [`CaptureStore`] under
//! a UUID. Site analyses run in the background; clients poll
//! `GET /captures/{id}` and read `analysis` from the snapshot. Sessions left
//! idle past the store's TTL answer 404.
//!
//! [`CaptureStore`]: crate::sessions::CaptureStore

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use prylom_capture::{CaptureController, CaptureSnapshot};
use prylom_core::{CaptureMode, GeoPoint};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::RequestId;
use crate::sessions::Controller;

use super::{ok, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct CreateCaptureRequest {
    pub mode: CaptureMode,
}

#[derive(Debug, Deserialize)]
pub(super) struct ClickRequest {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Deserialize)]
pub(super) struct SetModeRequest {
    pub mode: CaptureMode,
}

#[derive(Debug, Serialize)]
pub(super) struct CaptureResponse {
    pub id: Uuid,
    /// Sequence number of the analysis this request issued, if any.
    pub issued_analysis: Option<u64>,
    #[serde(flatten)]
    pub snapshot: CaptureSnapshot,
}

#[derive(Debug, Serialize)]
pub(super) struct DeletedCapture {
    pub id: Uuid,
    pub deleted: bool,
}

fn parse_capture_id(req_id: &str, raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| {
        ApiError::new(
            req_id,
            "validation_error",
            format!("capture id must be a UUID, got '{raw}'"),
        )
    })
}

fn capture_not_found(req_id: &str, id: Uuid) -> ApiError {
    ApiError::new(req_id, "not_found", format!("capture {id} not found"))
}

/// POST /api/v1/captures: start a capture session.
pub(super) async fn create_capture(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CreateCaptureRequest>,
) -> (StatusCode, Json<ApiResponse<CaptureResponse>>) {
    let id = Uuid::new_v4();
    let controller = CaptureController::new(Arc::clone(&state.analyzer), body.mode);
    let snapshot = controller.snapshot();
    state.captures.insert(id, controller).await;

    tracing::info!(capture_id = %id, mode = %body.mode, "capture started");
    (
        StatusCode::CREATED,
        ok(
            req_id,
            CaptureResponse {
                id,
                issued_analysis: None,
                snapshot,
            },
        ),
    )
}

/// Applies `f` to the session named by `raw_id` and wraps the resulting
/// snapshot. `f` returns the sequence number of any analysis it issued.
async fn update_capture(
    state: &AppState,
    req_id: RequestId,
    raw_id: &str,
    f: impl FnOnce(&mut Controller) -> Option<u64>,
) -> Result<Json<ApiResponse<CaptureResponse>>, ApiError> {
    let id = parse_capture_id(&req_id.0, raw_id)?;
    let (issued_analysis, snapshot) = state
        .captures
        .with_session(id, |controller| {
            let issued = f(controller);
            (issued, controller.snapshot())
        })
        .await
        .ok_or_else(|| capture_not_found(&req_id.0, id))?;

    Ok(ok(
        req_id,
        CaptureResponse {
            id,
            issued_analysis,
            snapshot,
        },
    ))
}

/// GET /api/v1/captures/{id}
pub(super) async fn get_capture(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(raw_id): Path<String>,
) -> Result<Json<ApiResponse<CaptureResponse>>, ApiError> {
    update_capture(&state, req_id, &raw_id, |_| None).await
}

/// POST /api/v1/captures/{id}/clicks: register one map click.
pub(super) async fn register_click(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(raw_id): Path<String>,
    Json(body): Json<ClickRequest>,
) -> Result<Json<ApiResponse<CaptureResponse>>, ApiError> {
    let point = GeoPoint::checked(body.latitude, body.longitude).ok_or_else(|| {
        ApiError::new(
            req_id.0.as_str(),
            "validation_error",
            format!(
                "coordinate out of range: {},{}",
                body.latitude, body.longitude
            ),
        )
    })?;

    update_capture(&state, req_id, &raw_id, |controller| {
        controller.register_click(point)
    })
    .await
}

/// PUT /api/v1/captures/{id}/mode: switch mode, discarding the geometry.
pub(super) async fn set_mode(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(raw_id): Path<String>,
    Json(body): Json<SetModeRequest>,
) -> Result<Json<ApiResponse<CaptureResponse>>, ApiError> {
    update_capture(&state, req_id, &raw_id, |controller| {
        controller.set_mode(body.mode);
        None
    })
    .await
}

/// DELETE /api/v1/captures/{id}/geometry: clear the capture, keep the session.
pub(super) async fn clear_capture(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(raw_id): Path<String>,
) -> Result<Json<ApiResponse<CaptureResponse>>, ApiError> {
    update_capture(&state, req_id, &raw_id, |controller| {
        controller.clear();
        None
    })
    .await
}

/// DELETE /api/v1/captures/{id}: end the session.
pub(super) async fn delete_capture(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(raw_id): Path<String>,
) -> Result<Json<ApiResponse<DeletedCapture>>, ApiError> {
    let id = parse_capture_id(&req_id.0, &raw_id)?;
    if !state.captures.remove(id).await {
        return Err(capture_not_found(&req_id.0, id));
    }

    tracing::info!(capture_id = %id, "capture ended");
    Ok(ok(req_id, DeletedCapture { id, deleted: true }))
}
