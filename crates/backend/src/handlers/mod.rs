pub mod a001_bundle;
pub mod a003_line_assignment;
pub mod d400_job_drilldown;
pub mod d401_station_view;
pub mod u501_upload_markup;
pub mod u502_import_manifest;

use crate::shared::error::ApiError;
use uuid::Uuid;

pub(crate) fn parse_uuid(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|_| ApiError::bad_request(format!("invalid id '{}'", id)))
}
