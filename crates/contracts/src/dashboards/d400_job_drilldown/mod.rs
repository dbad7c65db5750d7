pub mod dto;

pub use dto::{BundleSummary, JobDetail, JobSummary, TypeMembersResponse};
