use super::markup_parser::{decode_upload, parse_markup, MarkupError};
use crate::domain::{a001_bundle, a002_member};
use crate::shared::config::IngestionConfig;
use crate::shared::data::raw_storage;
use contracts::domain::a001_bundle::Bundle;
use contracts::domain::a002_member::{Member, MemberDraft};
use contracts::domain::common::AggregateId;
use contracts::usecases::common::UseCaseMetadata;
use contracts::usecases::u501_upload_markup::{
    ConflictResponse, IngestionMode, UploadMarkup, UploadResponse,
};
use sea_orm::ConnectionTrait;

pub const MARKUP_CONTENT_TYPE: &str = "application/xml";

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error(transparent)]
    Markup(#[from] MarkupError),

    #[error("{0}")]
    Invalid(String),

    #[error("bundle {} / {} already exists", .0.job_number, .0.bundle_name)]
    Exists(ConflictResponse),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Uploaded markup file
#[derive(Debug, Clone)]
pub struct MarkupUpload {
    pub file_name: String,
    pub content: Vec<u8>,
    /// Replace a stored bundle with the same job number and bundle name
    pub replace: bool,
}

/// Members to store under the mode, and how many were left out
pub fn select_members(drafts: Vec<MemberDraft>, mode: IngestionMode) -> (Vec<MemberDraft>, usize) {
    match mode {
        IngestionMode::Full => (drafts, 0),
        IngestionMode::Summary => {
            let total = drafts.len();
            let kept: Vec<MemberDraft> = drafts.into_iter().filter(|d| d.is_summary_type()).collect();
            let skipped = total - kept.len();
            (kept, skipped)
        }
    }
}

/// Parses the file and stores it as a bundle with its members.
///
/// An existing bundle with the same identity is a conflict unless
/// `replace` is set, in which case it is deleted first. When member
/// insertion fails the new bundle is removed again.
pub async fn execute<C: ConnectionTrait>(
    db: &C,
    ingestion: &IngestionConfig,
    upload: MarkupUpload,
) -> Result<UploadResponse, UploadError> {
    let xml = decode_upload(&upload.content)?;
    let parsed = parse_markup(xml, &upload.file_name)?;

    tracing::info!(
        "[{}] Parsed {}: job={}, bundle={}, {} members",
        UploadMarkup::full_name(),
        upload.file_name,
        parsed.job_number,
        parsed.bundle_name,
        parsed.members.len()
    );

    let mut bundle = Bundle::new(
        parsed.job_number.clone(),
        parsed.bundle_name.clone(),
        upload.file_name.clone(),
    );
    bundle.bundle_layer = parsed.bundle_layer();
    bundle.validate().map_err(UploadError::Invalid)?;

    let existing =
        a001_bundle::service::find_by_identity(db, &bundle.job_number, &bundle.bundle_name).await?;
    let replaced = match existing {
        Some(_) if !upload.replace => {
            tracing::info!(
                "Bundle {} / {} already stored, waiting for confirmation",
                bundle.job_number,
                bundle.bundle_name
            );
            return Err(UploadError::Exists(ConflictResponse::exists(
                bundle.job_number,
                bundle.bundle_name,
            )));
        }
        Some(old) => {
            a001_bundle::service::delete_with_members(db, &old).await?;
            true
        }
        None => false,
    };

    let (drafts, members_skipped) = select_members(parsed.members, ingestion.mode);
    let members: Vec<Member> = drafts.into_iter().map(|d| d.into_member(bundle.id)).collect();
    bundle.total_members = members.len() as i64;

    a001_bundle::repository::insert(db, &bundle).await?;

    let members_inserted = match a002_member::repository::insert_many(db, &members).await {
        Ok(n) => n,
        Err(e) => {
            tracing::error!(
                "Member insert failed for {} / {}, rolling back bundle: {:#}",
                bundle.job_number,
                bundle.bundle_name,
                e
            );
            rollback(db, &bundle).await;
            return Err(UploadError::Storage(e.context("failed to insert members")));
        }
    };

    if ingestion.keep_raw_files {
        if let Err(e) =
            raw_storage::save_raw_file(db, &upload.file_name, MARKUP_CONTENT_TYPE, &upload.content)
                .await
        {
            tracing::warn!("Could not archive {}: {:#}", upload.file_name, e);
        }
    }

    let message = format!(
        "Bundle {} of job {} {}: {} members",
        bundle.bundle_name,
        bundle.job_number,
        if replaced { "replaced" } else { "uploaded" },
        members_inserted
    );
    tracing::info!("{}", message);

    Ok(UploadResponse {
        success: true,
        message,
        bundle_id: bundle.id.as_string(),
        job_number: bundle.job_number,
        bundle_name: bundle.bundle_name,
        members_inserted,
        members_skipped,
        replaced,
    })
}

/// Removes whatever was written for a bundle whose members failed to insert.
async fn rollback<C: ConnectionTrait>(db: &C, bundle: &Bundle) {
    if let Err(e) = a002_member::repository::delete_by_bundle(db, bundle.id).await {
        tracing::warn!("Rollback: could not delete partial members: {:#}", e);
    }
    if let Err(e) = a001_bundle::repository::delete(db, bundle.id.value()).await {
        tracing::error!(
            "Rollback: bundle {} / {} left behind: {:#}",
            bundle.job_number,
            bundle.bundle_name,
            e
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::initialize_database;
    use sea_orm::{DatabaseBackend, Statement};

    fn markup(job: &str, bundle: &str, types: &[&str]) -> Vec<u8> {
        let members: String = types
            .iter()
            .enumerate()
            .map(|(i, t)| {
                format!(
                    "<MEMBER_DATA><MEMBER_ID>{bundle}-{i}</MEMBER_ID><TYPE>{t}</TYPE>\
                     <DESCRIPTION>2x6</DESCRIPTION><LENGTH unit=\"in\">96.5</LENGTH></MEMBER_DATA>"
                )
            })
            .collect();
        format!(
            "<VIRTEK_BUILDING_MATERIAL_MARKUP_LANGUAGE_FILE>\
             <HEADER_DATA><JOB_NAME>{job}</JOB_NAME></HEADER_DATA>\
             <STRUCTURE_DATA><STRUCTURE_ID>{bundle}</STRUCTURE_ID></STRUCTURE_DATA>\
             {members}</VIRTEK_BUILDING_MATERIAL_MARKUP_LANGUAGE_FILE>"
        )
        .into_bytes()
    }

    fn upload(content: Vec<u8>, replace: bool) -> MarkupUpload {
        MarkupUpload {
            file_name: "b.xml".into(),
            content,
            replace,
        }
    }

    #[test]
    fn test_select_members_summary() {
        let drafts: Vec<MemberDraft> = ["stud", " King ", "TOP PLATE", "bottom plate"]
            .iter()
            .map(|t| MemberDraft {
                member_type: Some(t.to_string()),
                ..Default::default()
            })
            .collect();
        let (kept, skipped) = select_members(drafts.clone(), IngestionMode::Summary);
        assert_eq!(kept.len(), 3);
        assert_eq!(skipped, 1);
        let (all, none) = select_members(drafts, IngestionMode::Full);
        assert_eq!((all.len(), none), (4, 0));
    }

    #[tokio::test]
    async fn test_conflict_then_replace() {
        let dir = tempfile::tempdir().unwrap();
        let db = initialize_database(&dir.path().join("t.db")).await.unwrap();
        let cfg = IngestionConfig::default();

        let first = execute(&db, &cfg, upload(markup("J1", "B1", &["STUD", "STUD"]), false))
            .await
            .unwrap();
        assert_eq!(first.members_inserted, 2);
        assert!(!first.replaced);

        let again = execute(&db, &cfg, upload(markup("J1", "B1", &["STUD"]), false)).await;
        match again {
            Err(UploadError::Exists(c)) => {
                assert_eq!(c, ConflictResponse::exists("J1", "B1"));
            }
            other => panic!("expected conflict, got {:?}", other),
        }
        let kept = a001_bundle::service::find_by_identity(&db, "J1", "B1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(kept.id.as_string(), first.bundle_id);
        assert_eq!(a002_member::repository::count_by_bundle(&db, kept.id).await.unwrap(), 2);

        let replaced = execute(&db, &cfg, upload(markup("J1", "B1", &["KING", "JACK", "SILL"]), true))
            .await
            .unwrap();
        assert!(replaced.replaced);
        assert_eq!(replaced.members_inserted, 3);
        assert_ne!(replaced.bundle_id, first.bundle_id);

        let old = a002_member::repository::count_by_bundle(&db, kept.id).await.unwrap();
        assert_eq!(old, 0);
        let bundles = a001_bundle::service::list(&db, Some("J1")).await.unwrap();
        assert_eq!(bundles.len(), 1);
        assert_eq!(bundles[0].total_members, 3);
    }

    #[tokio::test]
    async fn test_summary_mode_counts_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let db = initialize_database(&dir.path().join("t.db")).await.unwrap();
        let cfg = IngestionConfig {
            mode: IngestionMode::Summary,
            keep_raw_files: false,
        };
        let res = execute(&db, &cfg, upload(markup("J2", "B4", &["STUD", "TOP PLATE", "Header"]), false))
            .await
            .unwrap();
        assert_eq!(res.members_inserted, 2);
        assert_eq!(res.members_skipped, 1);
    }

    #[tokio::test]
    async fn test_member_failure_rolls_back_bundle() {
        let dir = tempfile::tempdir().unwrap();
        let db = initialize_database(&dir.path().join("t.db")).await.unwrap();
        db.execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            "DROP TABLE a002_member".to_string(),
        ))
        .await
        .unwrap();

        let res = execute(&db, &IngestionConfig::default(), upload(markup("J3", "B1", &["STUD"]), false)).await;
        assert!(matches!(res, Err(UploadError::Storage(_))));
        let left = a001_bundle::service::find_by_identity(&db, "J3", "B1").await.unwrap();
        assert!(left.is_none());
    }

    #[tokio::test]
    async fn test_bad_markup_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let db = initialize_database(&dir.path().join("t.db")).await.unwrap();
        let res = execute(&db, &IngestionConfig::default(), upload(b"<nope/>".to_vec(), false)).await;
        assert!(matches!(res, Err(UploadError::Markup(_))));
        assert!(a001_bundle::service::list(&db, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_raw_file_archived() {
        let dir = tempfile::tempdir().unwrap();
        let db = initialize_database(&dir.path().join("t.db")).await.unwrap();
        let content = markup("J5", "B2", &["STUD"]);
        execute(&db, &IngestionConfig::default(), upload(content.clone(), false))
            .await
            .unwrap();
        let hash = raw_storage::sha256_hex(&content);
        assert!(raw_storage::get_by_hash(&db, &hash).await.unwrap().is_some());
    }
}
