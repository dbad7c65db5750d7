use anyhow::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement};
use std::path::Path;

const CREATE_A001_BUNDLE: &str = r#"
    CREATE TABLE a001_bundle (
        id TEXT PRIMARY KEY NOT NULL,
        job_number TEXT NOT NULL,
        bundle_name TEXT NOT NULL,
        file_name TEXT NOT NULL,
        total_members INTEGER NOT NULL DEFAULT 0,
        bundle_layer TEXT,
        created_at TEXT,
        updated_at TEXT,
        version INTEGER NOT NULL DEFAULT 0
    );
    CREATE UNIQUE INDEX idx_a001_bundle_identity ON a001_bundle (job_number, bundle_name);
"#;

const CREATE_A002_MEMBER: &str = r#"
    CREATE TABLE a002_member (
        id TEXT PRIMARY KEY NOT NULL,
        bundle_id TEXT NOT NULL,
        member_id TEXT NOT NULL DEFAULT '',
        member_type TEXT,
        name TEXT,
        description TEXT,
        height REAL,
        width REAL,
        actual_height REAL,
        actual_width REAL,
        length REAL,
        cut_member INTEGER NOT NULL DEFAULT 0,
        unique_id TEXT,
        structure_id TEXT
    );
    CREATE INDEX idx_a002_member_bundle ON a002_member (bundle_id);
"#;

const CREATE_A003_LINE_ASSIGNMENT: &str = r#"
    CREATE TABLE a003_line_assignment (
        id TEXT PRIMARY KEY NOT NULL,
        bundle_id TEXT,
        job_number TEXT NOT NULL,
        bundle TEXT NOT NULL,
        line_number INTEGER NOT NULL,
        assignment_date TEXT NOT NULL,
        lineal_feet REAL NOT NULL DEFAULT 0,
        members_data TEXT NOT NULL DEFAULT '[]',
        studs_summary TEXT NOT NULL DEFAULT '',
        has_sill_seal INTEGER NOT NULL DEFAULT 0,
        stations TEXT NOT NULL DEFAULT '[]',
        created_at TEXT,
        updated_at TEXT,
        version INTEGER NOT NULL DEFAULT 0
    );
    CREATE UNIQUE INDEX idx_a003_line_assignment_slot
        ON a003_line_assignment (job_number, bundle, assignment_date, line_number);
    CREATE INDEX idx_a003_line_assignment_day
        ON a003_line_assignment (line_number, assignment_date);
"#;

const CREATE_RAW_FILE_STORAGE: &str = r#"
    CREATE TABLE raw_file_storage (
        id TEXT PRIMARY KEY NOT NULL,
        sha256 TEXT NOT NULL UNIQUE,
        file_name TEXT NOT NULL,
        content_type TEXT NOT NULL,
        size_bytes INTEGER NOT NULL,
        content BLOB NOT NULL,
        created_at TEXT NOT NULL
    );
"#;

/// Tables the service needs, in creation order
const SCHEMA: &[(&str, &str)] = &[
    ("a001_bundle", CREATE_A001_BUNDLE),
    ("a002_member", CREATE_A002_MEMBER),
    ("a003_line_assignment", CREATE_A003_LINE_ASSIGNMENT),
    ("raw_file_storage", CREATE_RAW_FILE_STORAGE),
];

/// Opens (creating if needed) the SQLite file and bootstraps the schema.
pub async fn initialize_database(db_file: &Path) -> Result<DatabaseConnection> {
    if let Some(parent) = db_file.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let absolute_path = if db_file.is_absolute() {
        db_file.to_path_buf()
    } else {
        std::env::current_dir()?.join(db_file)
    };
    // Normalize path separators and ensure proper URL form on Windows
    let normalized = absolute_path.to_string_lossy().replace('\\', "/");
    let needs_leading_slash = !normalized.starts_with('/') && normalized.contains(':');
    let prefix = if needs_leading_slash { "/" } else { "" };
    let db_url = format!("sqlite://{}{}?mode=rwc", prefix, normalized);

    tracing::info!("Opening database {}", absolute_path.display());
    let conn = Database::connect(&db_url).await?;
    bootstrap_schema(&conn).await?;
    Ok(conn)
}

pub async fn bootstrap_schema<C: ConnectionTrait>(conn: &C) -> Result<()> {
    for (table, ddl) in SCHEMA {
        if table_exists(conn, table).await? {
            continue;
        }
        tracing::info!("Creating {} table", table);
        for statement in ddl.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            conn.execute(Statement::from_string(
                DatabaseBackend::Sqlite,
                statement.to_string(),
            ))
            .await?;
        }
    }
    Ok(())
}

pub async fn table_exists<C: ConnectionTrait>(conn: &C, table: &str) -> Result<bool> {
    let rows = conn
        .query_all(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "SELECT name FROM sqlite_master WHERE type='table' AND name = ?",
            [table.into()],
        ))
        .await?;
    Ok(!rows.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bootstrap_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("tracker.db");
        let conn = initialize_database(&path).await.unwrap();
        for (table, _) in SCHEMA {
            assert!(table_exists(&conn, table).await.unwrap(), "{table} missing");
        }
        bootstrap_schema(&conn).await.unwrap();
        assert!(path.exists());
    }
}
