/// Identification of a UseCase for logs and the API surface
pub trait UseCaseMetadata {
    /// UseCase index (e.g. "u501")
    fn usecase_index() -> &'static str;

    /// Technical name (e.g. "upload_markup")
    fn usecase_name() -> &'static str;

    /// Name shown to users
    fn display_name() -> &'static str;

    fn description() -> &'static str {
        ""
    }

    /// Full name, e.g. "u501_upload_markup"
    fn full_name() -> String {
        format!("{}_{}", Self::usecase_index(), Self::usecase_name())
    }
}
