use axum::extract::{Path, State};
use axum::Json;
use contracts::dashboards::d400_job_drilldown::{JobDetail, JobSummary, TypeMembersResponse};

use super::parse_uuid;
use crate::dashboards::d400_job_drilldown::service;
use crate::shared::app_state::AppState;
use crate::shared::error::{ApiError, ApiResult};

/// GET /api/d400/jobs
pub async fn list_jobs(State(state): State<AppState>) -> ApiResult<Json<Vec<JobSummary>>> {
    Ok(Json(service::list_jobs(&state.db).await?))
}

/// GET /api/d400/jobs/:job_number
pub async fn job_detail(
    State(state): State<AppState>,
    Path(job_number): Path<String>,
) -> ApiResult<Json<JobDetail>> {
    service::job_detail(&state.db, &job_number)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("job {} not found", job_number)))
}

/// GET /api/d400/bundles/:id/types/:member_type
pub async fn members_of_type(
    State(state): State<AppState>,
    Path((id, member_type)): Path<(String, String)>,
) -> ApiResult<Json<TypeMembersResponse>> {
    let uuid = parse_uuid(&id)?;
    service::members_of_type(&state.db, uuid, &member_type)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("bundle {} not found", id)))
}
