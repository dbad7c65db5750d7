use axum::extract::{Multipart, State};
use axum::Json;
use base64::Engine;
use contracts::usecases::u501_upload_markup::{parse_flag, UploadJsonRequest, UploadResponse};

use crate::shared::app_state::AppState;
use crate::shared::error::{ApiError, ApiResult};
use crate::usecases::u501_upload_markup::executor::{self, MarkupUpload, UploadError};

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::Markup(e) => ApiError::BadRequest(e.to_string()),
            UploadError::Invalid(message) => ApiError::BadRequest(message),
            UploadError::Exists(conflict) => ApiError::Exists(conflict),
            UploadError::Storage(e) => e.into(),
        }
    }
}

async fn run(state: &AppState, upload: MarkupUpload) -> ApiResult<Json<UploadResponse>> {
    let response = executor::execute(&state.db, &state.config.ingestion, upload).await?;
    Ok(Json(response))
}

/// POST /api/u501/upload
///
/// Multipart body: `file` (the markup) and an optional `replace` flag.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut replace = false;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("invalid multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("upload.xml").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("failed to read file: {}", e)))?;
                file = Some((file_name, bytes.to_vec()));
            }
            "replace" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("failed to read replace: {}", e)))?;
                replace = parse_flag(&text);
            }
            _ => {}
        }
    }

    let (file_name, content) =
        file.ok_or_else(|| ApiError::bad_request("multipart part 'file' is required"))?;

    run(
        &state,
        MarkupUpload {
            file_name,
            content,
            replace,
        },
    )
    .await
}

/// POST /api/u501/upload-json
pub async fn upload_json(
    State(state): State<AppState>,
    Json(request): Json<UploadJsonRequest>,
) -> ApiResult<Json<UploadResponse>> {
    let content = base64::engine::general_purpose::STANDARD
        .decode(request.file_data.trim())
        .map_err(|e| ApiError::bad_request(format!("fileData is not valid base64: {}", e)))?;

    run(
        &state,
        MarkupUpload {
            file_name: request.file_name,
            content,
            replace: request.replace,
        },
    )
    .await
}
