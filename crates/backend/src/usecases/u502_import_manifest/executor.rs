use super::sheet_reader::{read_sheet, SheetError};
use crate::domain::{a001_bundle, a002_member};
use contracts::shared::member_summary::StudsSummary;
use contracts::usecases::common::UseCaseMetadata;
use contracts::usecases::u502_import_manifest::{
    map_rows, ImportManifest, LineVariant, ManifestResponse, ManifestRow,
};
use sea_orm::ConnectionTrait;

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("{0}")]
    InvalidLine(String),

    #[error(transparent)]
    Sheet(#[from] SheetError),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Reads a line manifest and attaches the studs summary of every bundle
/// that is already stored.
pub async fn execute<C: ConnectionTrait>(
    db: &C,
    line: i32,
    file_name: &str,
    content: &[u8],
) -> Result<ManifestResponse, ManifestError> {
    let variant = LineVariant::for_line(line).map_err(ManifestError::InvalidLine)?;
    let sheet = read_sheet(file_name, content)?;
    let mut rows = map_rows(&sheet, &variant);

    let mut matched = 0usize;
    for row in rows.iter_mut() {
        if enrich_row(db, row).await? {
            matched += 1;
        }
    }

    tracing::info!(
        "[{}] Manifest {} for line {}: {} rows, {} with stored bundles",
        ImportManifest::full_name(),
        file_name,
        line,
        rows.len(),
        matched
    );

    Ok(ManifestResponse {
        line,
        file_name: file_name.to_string(),
        rows,
    })
}

/// Fills the studs summary from the stored bundle; false when there is none.
pub async fn enrich_row<C: ConnectionTrait>(db: &C, row: &mut ManifestRow) -> anyhow::Result<bool> {
    let Some(bundle) =
        a001_bundle::service::find_by_identity(db, &row.job_number, &row.bundle).await?
    else {
        return Ok(false);
    };
    let members = a002_member::repository::list_by_bundle(db, bundle.id).await?;
    let summary = StudsSummary::from_members(&members);
    row.studs_summary = Some(summary.to_string());
    row.has_sill_seal = summary.has_sill_seal;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::config::IngestionConfig;
    use crate::shared::data::db::initialize_database;
    use crate::usecases::u501_upload_markup::executor::{self as upload, MarkupUpload};

    const STUDS: &str = "<VIRTEK_BUILDING_MATERIAL_MARKUP_LANGUAGE_FILE>\
        <HEADER_DATA><JOB_NAME>J100</JOB_NAME></HEADER_DATA>\
        <STRUCTURE_DATA><STRUCTURE_ID>B1</STRUCTURE_ID></STRUCTURE_DATA>\
        <MEMBER_DATA><MEMBER_ID>B1-1</MEMBER_ID><TYPE>STUD</TYPE><DESCRIPTION>2x6</DESCRIPTION><LENGTH>96.5</LENGTH></MEMBER_DATA>\
        <MEMBER_DATA><MEMBER_ID>B1-2</MEMBER_ID><TYPE>STUD</TYPE><DESCRIPTION>2x6</DESCRIPTION><LENGTH>96.5</LENGTH></MEMBER_DATA>\
        </VIRTEK_BUILDING_MATERIAL_MARKUP_LANGUAGE_FILE>";

    #[tokio::test]
    async fn test_manifest_enriched_from_stored_bundle() {
        let dir = tempfile::tempdir().unwrap();
        let db = initialize_database(&dir.path().join("t.db")).await.unwrap();
        upload::execute(
            &db,
            &IngestionConfig::default(),
            MarkupUpload {
                file_name: "B1.xml".into(),
                content: STUDS.as_bytes().to_vec(),
                replace: false,
            },
        )
        .await
        .unwrap();

        let csv = ",,Job,Bundle,LF\n,,J100,B1,\"1,200\"\n,,J100,B9,80\n,,J101,,40\n";
        let res = execute(&db, 1, "line1.csv", csv.as_bytes()).await.unwrap();
        assert_eq!(res.rows.len(), 2);
        assert_eq!(res.rows[0].studs_summary.as_deref(), Some("96 1/2″ 2x6"));
        assert_eq!(res.rows[0].lineal_feet_value(), Some(1200.0));
        assert_eq!(res.rows[1].studs_summary, None);
    }

    #[tokio::test]
    async fn test_unknown_line() {
        let dir = tempfile::tempdir().unwrap();
        let db = initialize_database(&dir.path().join("t.db")).await.unwrap();
        let res = execute(&db, 5, "x.csv", b"a,b\n").await;
        assert!(matches!(res, Err(ManifestError::InvalidLine(_))));
    }
}
