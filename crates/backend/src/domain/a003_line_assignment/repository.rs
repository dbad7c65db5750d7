use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use contracts::domain::a001_bundle::BundleId;
use contracts::domain::a003_line_assignment::{LineAssignment, LineAssignmentId};
use contracts::domain::common::{AggregateId, AggregateRoot, EntityMetadata};
use sea_orm::entity::prelude::*;
use sea_orm::{ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a003_line_assignment")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub bundle_id: Option<String>,
    pub job_number: String,
    pub bundle: String,
    pub line_number: i32,
    /// YYYY-MM-DD
    pub assignment_date: String,
    pub lineal_feet: f64,
    /// JSON array of members
    pub members_data: String,
    pub studs_summary: String,
    pub has_sill_seal: bool,
    /// JSON array of station progress
    pub stations: String,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for LineAssignment {
    type Error = anyhow::Error;

    fn try_from(m: Model) -> Result<Self> {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            version: m.version,
        };
        let uuid = Uuid::parse_str(&m.id).with_context(|| format!("bad assignment id {}", m.id))?;
        let bundle_id = m
            .bundle_id
            .as_deref()
            .and_then(|s| Uuid::parse_str(s).ok())
            .map(BundleId::new);
        let assignment_date = NaiveDate::parse_from_str(&m.assignment_date, DATE_FORMAT)
            .with_context(|| format!("bad assignment date '{}'", m.assignment_date))?;
        let members_data = serde_json::from_str(&m.members_data)
            .with_context(|| format!("bad members_data on assignment {}", m.id))?;
        let stations = serde_json::from_str(&m.stations)
            .with_context(|| format!("bad stations on assignment {}", m.id))?;

        Ok(LineAssignment {
            id: LineAssignmentId::new(uuid),
            bundle_id,
            job_number: m.job_number,
            bundle: m.bundle,
            line_number: m.line_number,
            assignment_date,
            lineal_feet: m.lineal_feet,
            members_data,
            studs_summary: m.studs_summary,
            has_sill_seal: m.has_sill_seal,
            stations,
            metadata,
        })
    }
}

fn to_active(a: &LineAssignment) -> Result<ActiveModel> {
    Ok(ActiveModel {
        id: Set(a.id.as_string()),
        bundle_id: Set(a.bundle_id.map(|id| id.as_string())),
        job_number: Set(a.job_number.clone()),
        bundle: Set(a.bundle.clone()),
        line_number: Set(a.line_number),
        assignment_date: Set(a.assignment_date.format(DATE_FORMAT).to_string()),
        lineal_feet: Set(a.lineal_feet),
        members_data: Set(serde_json::to_string(&a.members_data)?),
        studs_summary: Set(a.studs_summary.clone()),
        has_sill_seal: Set(a.has_sill_seal),
        stations: Set(serde_json::to_string(&a.stations)?),
        created_at: Set(Some(a.metadata.created_at)),
        updated_at: Set(Some(a.metadata.updated_at)),
        version: Set(a.metadata.version),
    })
}

fn from_models(models: Vec<Model>) -> Result<Vec<LineAssignment>> {
    models.into_iter().map(LineAssignment::try_from).collect()
}

pub async fn insert<C: ConnectionTrait>(db: &C, assignment: &LineAssignment) -> Result<()> {
    Entity::insert(to_active(assignment)?).exec(db).await?;
    Ok(())
}

/// Writes every column of an existing row and bumps its version
pub async fn update<C: ConnectionTrait>(db: &C, assignment: &mut LineAssignment) -> Result<()> {
    let metadata = assignment.metadata_mut();
    metadata.touch();
    metadata.increment_version();
    let mut active = to_active(assignment)?;
    active.created_at = sea_orm::ActiveValue::NotSet;
    Entity::update(active).exec(db).await?;
    Ok(())
}

pub async fn get_by_id<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Option<LineAssignment>> {
    let model = Entity::find_by_id(id.to_string()).one(db).await?;
    model.map(LineAssignment::try_from).transpose()
}

pub async fn find_by_slot<C: ConnectionTrait>(
    db: &C,
    job_number: &str,
    bundle: &str,
    assignment_date: NaiveDate,
    line_number: i32,
) -> Result<Option<LineAssignment>> {
    let model = Entity::find()
        .filter(Column::JobNumber.eq(job_number))
        .filter(Column::Bundle.eq(bundle))
        .filter(Column::AssignmentDate.eq(assignment_date.format(DATE_FORMAT).to_string()))
        .filter(Column::LineNumber.eq(line_number))
        .one(db)
        .await?;
    model.map(LineAssignment::try_from).transpose()
}

/// All assignments of a line for one date, in storage order
pub async fn list_for_day<C: ConnectionTrait>(
    db: &C,
    line_number: i32,
    assignment_date: NaiveDate,
) -> Result<Vec<LineAssignment>> {
    let models = Entity::find()
        .filter(Column::LineNumber.eq(line_number))
        .filter(Column::AssignmentDate.eq(assignment_date.format(DATE_FORMAT).to_string()))
        .order_by_asc(Column::JobNumber)
        .all(db)
        .await?;
    from_models(models)
}

/// Distinct assignment dates of a line, newest first
pub async fn list_dates<C: ConnectionTrait>(db: &C, line_number: i32) -> Result<Vec<NaiveDate>> {
    let dates: Vec<String> = Entity::find()
        .select_only()
        .column(Column::AssignmentDate)
        .distinct()
        .filter(Column::LineNumber.eq(line_number))
        .order_by_desc(Column::AssignmentDate)
        .into_tuple()
        .all(db)
        .await?;
    Ok(dates
        .iter()
        .filter_map(|d| NaiveDate::parse_from_str(d, DATE_FORMAT).ok())
        .collect())
}

pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<bool> {
    let result = Entity::delete_by_id(id.to_string()).exec(db).await?;
    Ok(result.rows_affected > 0)
}
