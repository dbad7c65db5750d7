use axum::extract::{Query, State};
use axum::Json;
use chrono::{Local, NaiveDate};
use contracts::dashboards::d401_station_view::{
    StationDatesResponse, StationProgressResponse, StationViewQuery, StationViewResponse,
};
use serde::Deserialize;

use crate::dashboards::d401_station_view::service;
use crate::shared::app_state::AppState;
use crate::shared::error::{ApiError, ApiResult};

#[derive(Debug, Deserialize)]
pub struct DatesQuery {
    pub line: i32,
}

#[derive(Debug, Deserialize)]
pub struct ProgressQuery {
    pub line: i32,
    pub date: NaiveDate,
    pub station: String,
}

/// GET /api/d401/station-view
pub async fn station_view(
    State(state): State<AppState>,
    Query(query): Query<StationViewQuery>,
) -> ApiResult<Json<StationViewResponse>> {
    if query.station.trim().is_empty() {
        return Err(ApiError::bad_request("station is required"));
    }
    Ok(Json(service::station_view(&state.db, &query).await?))
}

/// GET /api/d401/station-view/dates
pub async fn dates(
    State(state): State<AppState>,
    Query(query): Query<DatesQuery>,
) -> ApiResult<Json<StationDatesResponse>> {
    Ok(Json(service::dates(&state.db, query.line).await?))
}

/// GET /api/d401/station-view/progress
pub async fn progress(
    State(state): State<AppState>,
    Query(query): Query<ProgressQuery>,
) -> ApiResult<Json<StationProgressResponse>> {
    let now = Local::now().naive_local();
    let response = service::progress(
        &state.db,
        &state.window,
        query.line,
        query.date,
        &query.station,
        now,
    )
    .await?;
    Ok(Json(response))
}
