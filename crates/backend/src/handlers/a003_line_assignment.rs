use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use contracts::domain::a003_line_assignment::{LineAssignment, StationTransition, TransitionError};
use contracts::usecases::u502_import_manifest::{
    BatchSendRequest, BatchSendResponse, SendToLineRequest,
};
use serde_json::{json, Value};

use super::parse_uuid;
use crate::domain::a003_line_assignment::service::{self, StationUpdateError};
use crate::shared::app_state::AppState;
use crate::shared::error::{ApiError, ApiResult};

impl From<StationUpdateError> for ApiError {
    fn from(err: StationUpdateError) -> Self {
        match err {
            StationUpdateError::NotFound(_) => ApiError::NotFound(err.to_string()),
            StationUpdateError::Transition(TransitionError::UnknownStation(_)) => {
                ApiError::NotFound(err.to_string())
            }
            StationUpdateError::Transition(_) => ApiError::Conflict(err.to_string()),
            StationUpdateError::Storage(e) => e.into(),
        }
    }
}

/// POST /api/a003/line-assignments
pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<SendToLineRequest>,
) -> ApiResult<Json<LineAssignment>> {
    if !request.lineal_feet.is_finite() || request.lineal_feet < 0.0 {
        return Err(ApiError::bad_request("lineal_feet must be a non-negative number"));
    }
    service::assign(&state.db, state.stations(), &request)
        .await?
        .map(Json)
        .ok_or_else(|| {
            ApiError::not_found(format!(
                "bundle {} / {} not found",
                request.job_number, request.bundle
            ))
        })
}

/// POST /api/a003/line-assignments/batch
pub async fn create_batch(
    State(state): State<AppState>,
    Json(request): Json<BatchSendRequest>,
) -> ApiResult<Json<BatchSendResponse>> {
    let response = service::assign_batch(&state.db, state.stations(), &request).await?;
    Ok(Json(response))
}

/// GET /api/a003/line-assignments/:id
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<LineAssignment>> {
    let uuid = parse_uuid(&id)?;
    service::get_by_id(&state.db, uuid)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("line assignment {} not found", id)))
}

/// DELETE /api/a003/line-assignments/:id
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let uuid = parse_uuid(&id)?;
    if service::delete(&state.db, uuid).await? {
        Ok(Json(json!({ "deleted": true, "id": id })))
    } else {
        Err(ApiError::not_found(format!("line assignment {} not found", id)))
    }
}

async fn transition(
    state: AppState,
    id: String,
    station: String,
    transition: StationTransition,
) -> ApiResult<Json<LineAssignment>> {
    let uuid = parse_uuid(&id)?;
    let updated =
        service::apply_station_transition(&state.db, uuid, &station, transition, Utc::now()).await?;
    Ok(Json(updated))
}

/// POST /api/a003/line-assignments/:id/stations/:station/complete
pub async fn complete_station(
    State(state): State<AppState>,
    Path((id, station)): Path<(String, String)>,
) -> ApiResult<Json<LineAssignment>> {
    transition(state, id, station, StationTransition::Complete).await
}

/// POST /api/a003/line-assignments/:id/stations/:station/undo
pub async fn undo_station(
    State(state): State<AppState>,
    Path((id, station)): Path<(String, String)>,
) -> ApiResult<Json<LineAssignment>> {
    transition(state, id, station, StationTransition::Undo).await
}
