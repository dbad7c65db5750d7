use super::repository;
use crate::domain::a002_member;
use anyhow::Result;
use contracts::domain::a001_bundle::{Bundle, BundleWithMembers};
use contracts::domain::common::AggregateRoot;
use sea_orm::ConnectionTrait;
use uuid::Uuid;

pub use repository::JobRow;

pub async fn get_by_id<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Option<Bundle>> {
    repository::get_by_id(db, id).await
}

pub async fn find_by_identity<C: ConnectionTrait>(
    db: &C,
    job_number: &str,
    bundle_name: &str,
) -> Result<Option<Bundle>> {
    repository::find_by_identity(db, job_number, bundle_name).await
}

pub async fn list<C: ConnectionTrait>(db: &C, job_number: Option<&str>) -> Result<Vec<Bundle>> {
    repository::list(db, job_number).await
}

pub async fn list_jobs<C: ConnectionTrait>(db: &C) -> Result<Vec<JobRow>> {
    repository::list_jobs(db).await
}

pub async fn get_with_members<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<BundleWithMembers>> {
    let Some(bundle) = repository::get_by_id(db, id).await? else {
        return Ok(None);
    };
    let members = a002_member::repository::list_by_bundle(db, bundle.id).await?;
    Ok(Some(BundleWithMembers { bundle, members }))
}

/// Deletes the bundle's members, then the bundle.
/// Returns false when the bundle does not exist.
pub async fn delete_with_members<C: ConnectionTrait>(db: &C, bundle: &Bundle) -> Result<bool> {
    let removed = a002_member::repository::delete_by_bundle(db, bundle.id).await?;
    let deleted = repository::delete(db, bundle.id.value()).await?;
    tracing::info!(
        "Deleted {} {} / {} ({} members)",
        Bundle::element_name(),
        bundle.job_number,
        bundle.bundle_name,
        removed
    );
    Ok(deleted)
}

pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<bool> {
    match repository::get_by_id(db, id).await? {
        Some(bundle) => delete_with_members(db, &bundle).await,
        None => Ok(false),
    }
}
