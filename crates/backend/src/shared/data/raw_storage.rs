use anyhow::Result;
use chrono::Utc;
use sea_orm::entity::prelude::*;
use sea_orm::{ConnectionTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Uploaded source files, one row per distinct content
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "raw_file_storage")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub sha256: String,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub content: Vec<u8>,
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub fn sha256_hex(content: &[u8]) -> String {
    let digest = Sha256::digest(content);
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Stores the file unless identical content is already archived.
/// Returns the row id.
pub async fn save_raw_file<C: ConnectionTrait>(
    db: &C,
    file_name: &str,
    content_type: &str,
    content: &[u8],
) -> Result<String> {
    let hash = sha256_hex(content);

    if let Some(existing) = get_by_hash(db, &hash).await? {
        tracing::debug!("Raw file {} already archived as {}", file_name, existing.id);
        return Ok(existing.id);
    }

    let id = Uuid::new_v4().to_string();
    let active = ActiveModel {
        id: Set(id.clone()),
        sha256: Set(hash.clone()),
        file_name: Set(file_name.to_string()),
        content_type: Set(content_type.to_string()),
        size_bytes: Set(content.len() as i64),
        content: Set(content.to_vec()),
        created_at: Set(Utc::now().to_rfc3339()),
    };
    active.insert(db).await?;

    tracing::debug!("Archived raw file {} ({} bytes, sha256={})", file_name, content.len(), hash);
    Ok(id)
}

pub async fn get_by_hash<C: ConnectionTrait>(db: &C, hash: &str) -> Result<Option<Model>> {
    Ok(Entity::find()
        .filter(Column::Sha256.eq(hash))
        .one(db)
        .await?)
}

pub async fn get_by_id<C: ConnectionTrait>(db: &C, id: &str) -> Result<Option<Model>> {
    Ok(Entity::find_by_id(id.to_string()).one(db).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::initialize_database;

    #[test]
    fn test_sha256_hex() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[tokio::test]
    async fn test_same_content_archived_once() {
        let dir = tempfile::tempdir().unwrap();
        let db = initialize_database(&dir.path().join("t.db")).await.unwrap();

        let a = save_raw_file(&db, "a.xml", "application/xml", b"<x/>").await.unwrap();
        let b = save_raw_file(&db, "copy.xml", "application/xml", b"<x/>").await.unwrap();
        assert_eq!(a, b);

        let stored = get_by_id(&db, &a).await.unwrap().unwrap();
        assert_eq!(stored.file_name, "a.xml");
        assert_eq!(stored.content, b"<x/>".to_vec());
        assert_eq!(stored.size_bytes, 4);
    }
}
