pub mod measure;
pub mod member_summary;
