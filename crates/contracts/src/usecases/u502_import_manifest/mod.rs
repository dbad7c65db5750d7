pub mod line_variant;
pub mod manifest;

pub use line_variant::{column_index, LineVariant};
pub use manifest::{
    map_rows, parse_lineal_feet, BatchSendRequest, BatchSendResponse, ManifestResponse,
    ManifestRow, RejectedRow, SendToLineRequest,
};

use crate::usecases::common::UseCaseMetadata;

pub struct ImportManifest;

impl UseCaseMetadata for ImportManifest {
    fn usecase_index() -> &'static str {
        "u502"
    }

    fn usecase_name() -> &'static str {
        "import_manifest"
    }

    fn display_name() -> &'static str {
        "Import line manifest"
    }

    fn description() -> &'static str {
        "Read a line's job/bundle/footage sheet and send its rows to the line"
    }
}
