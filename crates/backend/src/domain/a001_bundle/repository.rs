use anyhow::Result;
use chrono::Utc;
use contracts::domain::a001_bundle::{Bundle, BundleId};
use contracts::domain::common::{AggregateId, EntityMetadata};
use sea_orm::entity::prelude::*;
use sea_orm::{ConnectionTrait, EntityTrait, FromQueryResult, QueryFilter, QueryOrder, Set, Statement};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a001_bundle")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub job_number: String,
    pub bundle_name: String,
    pub file_name: String,
    pub total_members: i64,
    pub bundle_layer: Option<String>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Bundle {
    fn from(m: Model) -> Self {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            version: m.version,
        };
        let uuid = Uuid::parse_str(&m.id).unwrap_or_else(|_| Uuid::new_v4());

        Bundle {
            id: BundleId::new(uuid),
            job_number: m.job_number,
            bundle_name: m.bundle_name,
            file_name: m.file_name,
            total_members: m.total_members,
            bundle_layer: m.bundle_layer,
            metadata,
        }
    }
}

pub async fn insert<C: ConnectionTrait>(db: &C, bundle: &Bundle) -> Result<()> {
    let active = ActiveModel {
        id: Set(bundle.id.as_string()),
        job_number: Set(bundle.job_number.clone()),
        bundle_name: Set(bundle.bundle_name.clone()),
        file_name: Set(bundle.file_name.clone()),
        total_members: Set(bundle.total_members),
        bundle_layer: Set(bundle.bundle_layer.clone()),
        created_at: Set(Some(bundle.metadata.created_at)),
        updated_at: Set(Some(bundle.metadata.updated_at)),
        version: Set(1),
    };
    Entity::insert(active).exec(db).await?;
    Ok(())
}

pub async fn get_by_id<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Option<Bundle>> {
    let model = Entity::find_by_id(id.to_string()).one(db).await?;
    Ok(model.map(|m| m.into()))
}

/// Bundle with the given (job number, bundle name) identity
pub async fn find_by_identity<C: ConnectionTrait>(
    db: &C,
    job_number: &str,
    bundle_name: &str,
) -> Result<Option<Bundle>> {
    let model = Entity::find()
        .filter(Column::JobNumber.eq(job_number))
        .filter(Column::BundleName.eq(bundle_name))
        .one(db)
        .await?;
    Ok(model.map(|m| m.into()))
}

/// Newest first, optionally limited to one job
pub async fn list<C: ConnectionTrait>(db: &C, job_number: Option<&str>) -> Result<Vec<Bundle>> {
    let mut query = Entity::find();
    if let Some(job) = job_number {
        query = query.filter(Column::JobNumber.eq(job));
    }
    let models = query
        .order_by_desc(Column::CreatedAt)
        .order_by_asc(Column::BundleName)
        .all(db)
        .await?;
    Ok(models.into_iter().map(|m| m.into()).collect())
}

pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<bool> {
    let result = Entity::delete_by_id(id.to_string()).exec(db).await?;
    Ok(result.rows_affected > 0)
}

#[derive(Debug, Clone, FromQueryResult)]
pub struct JobRow {
    pub job_number: String,
    pub bundle_count: i64,
    pub member_count: i64,
    pub last_upload: Option<String>,
}

/// Jobs with bundle and member counts, most recent upload first
pub async fn list_jobs<C: ConnectionTrait>(db: &C) -> Result<Vec<JobRow>> {
    let sql = r#"
        SELECT job_number,
               COUNT(*) AS bundle_count,
               COALESCE(SUM(total_members), 0) AS member_count,
               MAX(created_at) AS last_upload
        FROM a001_bundle
        GROUP BY job_number
        ORDER BY last_upload DESC, job_number ASC
    "#;
    let rows = JobRow::find_by_statement(Statement::from_string(
        db.get_database_backend(),
        sql.to_string(),
    ))
    .all(db)
    .await?;
    Ok(rows)
}
