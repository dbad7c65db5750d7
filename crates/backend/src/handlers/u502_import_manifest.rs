use axum::extract::{Multipart, Query, State};
use axum::Json;
use contracts::usecases::u502_import_manifest::ManifestResponse;
use serde::Deserialize;

use crate::shared::app_state::AppState;
use crate::shared::error::{ApiError, ApiResult};
use crate::usecases::u502_import_manifest::executor::{self, ManifestError};

impl From<ManifestError> for ApiError {
    fn from(err: ManifestError) -> Self {
        match err {
            ManifestError::InvalidLine(message) => ApiError::BadRequest(message),
            ManifestError::Sheet(e) => ApiError::BadRequest(e.to_string()),
            ManifestError::Storage(e) => e.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ManifestQuery {
    pub line: i32,
}

/// POST /api/u502/manifest?line=N
pub async fn import(
    State(state): State<AppState>,
    Query(query): Query<ManifestQuery>,
    mut multipart: Multipart,
) -> ApiResult<Json<ManifestResponse>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("invalid multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("failed to read file: {}", e)))?;

        let response = executor::execute(&state.db, query.line, &file_name, &bytes).await?;
        return Ok(Json(response));
    }

    Err(ApiError::bad_request("multipart part 'file' is required"))
}
