use anyhow::Result;
use contracts::domain::a001_bundle::BundleId;
use contracts::domain::a002_member::{Member, MemberId};
use contracts::domain::common::AggregateId;
use contracts::shared::member_summary::UNTYPED_BUCKET;
use sea_orm::entity::prelude::*;
use sea_orm::{ConnectionTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Rows per INSERT statement; keeps well under SQLite's bound-variable limit
pub const INSERT_CHUNK: usize = 200;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a002_member")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub bundle_id: String,
    pub member_id: String,
    pub member_type: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub height: Option<f64>,
    pub width: Option<f64>,
    pub actual_height: Option<f64>,
    pub actual_width: Option<f64>,
    pub length: Option<f64>,
    pub cut_member: bool,
    pub unique_id: Option<String>,
    pub structure_id: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Member {
    fn from(m: Model) -> Self {
        let id = Uuid::parse_str(&m.id).unwrap_or_else(|_| Uuid::new_v4());
        let bundle_id = Uuid::parse_str(&m.bundle_id).unwrap_or_else(|_| Uuid::nil());
        Member {
            id: MemberId::new(id),
            bundle_id: BundleId::new(bundle_id),
            member_id: m.member_id,
            member_type: m.member_type,
            name: m.name,
            description: m.description,
            height: m.height,
            width: m.width,
            actual_height: m.actual_height,
            actual_width: m.actual_width,
            length: m.length,
            cut_member: m.cut_member,
            unique_id: m.unique_id,
            structure_id: m.structure_id,
        }
    }
}

fn to_active(m: &Member) -> ActiveModel {
    ActiveModel {
        id: Set(m.id.as_string()),
        bundle_id: Set(m.bundle_id.as_string()),
        member_id: Set(m.member_id.clone()),
        member_type: Set(m.member_type.clone()),
        name: Set(m.name.clone()),
        description: Set(m.description.clone()),
        height: Set(m.height),
        width: Set(m.width),
        actual_height: Set(m.actual_height),
        actual_width: Set(m.actual_width),
        length: Set(m.length),
        cut_member: Set(m.cut_member),
        unique_id: Set(m.unique_id.clone()),
        structure_id: Set(m.structure_id.clone()),
    }
}

/// Inserts in chunks of `INSERT_CHUNK`. Returns the number of rows written.
pub async fn insert_many<C: ConnectionTrait>(db: &C, members: &[Member]) -> Result<usize> {
    let mut written = 0;
    for chunk in members.chunks(INSERT_CHUNK) {
        if chunk.is_empty() {
            continue;
        }
        Entity::insert_many(chunk.iter().map(to_active)).exec(db).await?;
        written += chunk.len();
    }
    Ok(written)
}

pub async fn list_by_bundle<C: ConnectionTrait>(db: &C, bundle_id: BundleId) -> Result<Vec<Member>> {
    let models = Entity::find()
        .filter(Column::BundleId.eq(bundle_id.as_string()))
        .order_by_asc(Column::MemberId)
        .all(db)
        .await?;
    Ok(models.into_iter().map(|m| m.into()).collect())
}

/// Members of one type in a bundle. The untyped bucket name selects members
/// without a type.
pub async fn list_by_bundle_and_type<C: ConnectionTrait>(
    db: &C,
    bundle_id: BundleId,
    member_type: &str,
) -> Result<Vec<Member>> {
    let type_condition = if member_type == UNTYPED_BUCKET {
        Condition::any()
            .add(Column::MemberType.is_null())
            .add(Column::MemberType.eq(""))
    } else {
        Condition::all().add(Column::MemberType.eq(member_type))
    };
    let models = Entity::find()
        .filter(Column::BundleId.eq(bundle_id.as_string()))
        .filter(type_condition)
        .order_by_asc(Column::MemberId)
        .all(db)
        .await?;
    Ok(models.into_iter().map(|m| m.into()).collect())
}

pub async fn count_by_bundle<C: ConnectionTrait>(db: &C, bundle_id: BundleId) -> Result<u64> {
    let count = Entity::find()
        .filter(Column::BundleId.eq(bundle_id.as_string()))
        .count(db)
        .await?;
    Ok(count)
}

pub async fn delete_by_bundle<C: ConnectionTrait>(db: &C, bundle_id: BundleId) -> Result<u64> {
    let result = Entity::delete_many()
        .filter(Column::BundleId.eq(bundle_id.as_string()))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}
