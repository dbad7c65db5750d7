use axum::extract::{Path, Query, State};
use axum::Json;
use contracts::domain::a001_bundle::{Bundle, BundleWithMembers};
use serde::Deserialize;
use serde_json::{json, Value};

use super::parse_uuid;
use crate::domain::a001_bundle;
use crate::shared::app_state::AppState;
use crate::shared::error::{ApiError, ApiResult};

#[derive(Debug, Deserialize)]
pub struct BundleListQuery {
    pub job_number: Option<String>,
}

/// GET /api/a001/bundles
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<BundleListQuery>,
) -> ApiResult<Json<Vec<Bundle>>> {
    let job = query
        .job_number
        .as_deref()
        .map(str::trim)
        .filter(|j| !j.is_empty());
    let bundles = a001_bundle::service::list(&state.db, job).await?;
    Ok(Json(bundles))
}

/// GET /api/a001/bundles/:id
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<BundleWithMembers>> {
    let uuid = parse_uuid(&id)?;
    a001_bundle::service::get_with_members(&state.db, uuid)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("bundle {} not found", id)))
}

/// DELETE /api/a001/bundles/:id
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let uuid = parse_uuid(&id)?;
    if a001_bundle::service::delete(&state.db, uuid).await? {
        Ok(Json(json!({ "deleted": true, "id": id })))
    } else {
        Err(ApiError::not_found(format!("bundle {} not found", id)))
    }
}
