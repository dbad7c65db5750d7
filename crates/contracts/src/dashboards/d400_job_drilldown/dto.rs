use crate::domain::a001_bundle::Bundle;
use crate::domain::a002_member::Member;
use crate::shared::member_summary::{group_by_type_and_description, MemberTypeGroup, StudsSummary};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of the jobs list, newest upload first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSummary {
    pub job_number: String,
    pub bundle_count: i64,
    pub member_count: i64,
    /// Latest bundle upload for the job
    pub last_upload: DateTime<Utc>,
}

/// Bundle card inside a job: grouped members plus the studs line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleSummary {
    #[serde(flatten)]
    pub bundle: Bundle,
    pub groups: Vec<MemberTypeGroup>,
    pub studs_summary: String,
    pub has_sill_seal: bool,
}

impl BundleSummary {
    pub fn build(bundle: Bundle, members: &[Member]) -> Self {
        let studs = StudsSummary::from_members(members);
        Self {
            bundle,
            groups: group_by_type_and_description(members),
            studs_summary: studs.to_string(),
            has_sill_seal: studs.has_sill_seal,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobDetail {
    pub job_number: String,
    pub bundles: Vec<BundleSummary>,
}

/// Individual members of one type within one bundle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeMembersResponse {
    pub bundle_id: String,
    pub member_type: String,
    pub members: Vec<Member>,
}
