use crate::domain::{a001_bundle, a002_member};
use anyhow::Result;
use chrono::{DateTime, NaiveDateTime, Utc};
use contracts::dashboards::d400_job_drilldown::{
    BundleSummary, JobDetail, JobSummary, TypeMembersResponse,
};
use contracts::domain::common::AggregateId;
use sea_orm::ConnectionTrait;
use uuid::Uuid;

/// Reads the stored timestamp text; SQLite keeps either RFC 3339 or the
/// space-separated form depending on the writer.
fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f%:z")
                .map(|dt| dt.with_timezone(&Utc))
        })
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

pub async fn list_jobs<C: ConnectionTrait>(db: &C) -> Result<Vec<JobSummary>> {
    let rows = a001_bundle::service::list_jobs(db).await?;
    Ok(rows
        .into_iter()
        .map(|row| JobSummary {
            last_upload: row
                .last_upload
                .as_deref()
                .and_then(parse_timestamp)
                .unwrap_or_default(),
            job_number: row.job_number,
            bundle_count: row.bundle_count,
            member_count: row.member_count,
        })
        .collect())
}

/// Bundles of a job with grouped members; `None` for an unknown job
pub async fn job_detail<C: ConnectionTrait>(db: &C, job_number: &str) -> Result<Option<JobDetail>> {
    let bundles = a001_bundle::service::list(db, Some(job_number)).await?;
    if bundles.is_empty() {
        return Ok(None);
    }

    let mut summaries = Vec::with_capacity(bundles.len());
    for bundle in bundles {
        let members = a002_member::repository::list_by_bundle(db, bundle.id).await?;
        summaries.push(BundleSummary::build(bundle, &members));
    }

    Ok(Some(JobDetail {
        job_number: job_number.to_string(),
        bundles: summaries,
    }))
}

pub async fn members_of_type<C: ConnectionTrait>(
    db: &C,
    bundle_id: Uuid,
    member_type: &str,
) -> Result<Option<TypeMembersResponse>> {
    let Some(bundle) = a001_bundle::service::get_by_id(db, bundle_id).await? else {
        return Ok(None);
    };
    let members =
        a002_member::repository::list_by_bundle_and_type(db, bundle.id, member_type).await?;
    Ok(Some(TypeMembersResponse {
        bundle_id: bundle.id.as_string(),
        member_type: member_type.to_string(),
        members,
    }))
}
