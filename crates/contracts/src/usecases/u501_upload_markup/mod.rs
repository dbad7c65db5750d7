pub mod request;
pub mod response;
pub mod upload_queue;

pub use request::{parse_flag, IngestionMode, UploadJsonRequest};
pub use response::{ConflictResponse, ErrorResponse, UploadResponse};
pub use upload_queue::{
    QueueError, QueueSummary, Resolution, UploadOutcome, UploadQueue, UploadResult, UploadTicket,
};

use crate::usecases::common::UseCaseMetadata;

pub struct UploadMarkup;

impl UseCaseMetadata for UploadMarkup {
    fn usecase_index() -> &'static str {
        "u501"
    }

    fn usecase_name() -> &'static str {
        "upload_markup"
    }

    fn display_name() -> &'static str {
        "Upload markup"
    }

    fn description() -> &'static str {
        "Load a bundle and its members from a building-materials markup file"
    }
}
