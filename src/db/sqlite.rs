use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::Connection;
use tracing;

use super::DatabaseError;
use crate::config::{StoreConfig, StoreLocation, SCHEMA_VERSION};

const SCHEMA_SQL: &str = include_str!("../../resources/schema.sql");

/// SQLite sidecar files that belong to a store file.
const SIDECAR_SUFFIXES: &[&str] = &["-journal", "-wal", "-shm"];

/// Open the store described by `config`, creating or recreating it as
/// needed so that its schema matches `config.schema_version`.
pub fn open_database(config: &StoreConfig) -> Result<Connection, DatabaseError> {
    match &config.location {
        StoreLocation::Memory => open_memory_database_with_version(config.schema_version),
        StoreLocation::File(path) => open_file_database(path, config.schema_version),
    }
}

/// Open an in-memory database (for testing)
pub fn open_memory_database() -> Result<Connection, DatabaseError> {
    open_memory_database_with_version(SCHEMA_VERSION)
}

fn open_memory_database_with_version(version: i64) -> Result<Connection, DatabaseError> {
    let conn = Connection::open_in_memory()?;
    configure_pragmas(&conn)?;
    apply_schema(&conn, version)?;
    Ok(conn)
}

fn open_file_database(path: &Path, version: i64) -> Result<Connection, DatabaseError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let conn = Connection::open(path)?;
    configure_pragmas(&conn)?;

    let on_disk = schema_version(&conn)?;
    let has_tables = count_tables(&conn)? > 0;
    if has_tables && on_disk != version {
        tracing::warn!(
            path = %path.display(),
            on_disk,
            declared = version,
            "Schema version mismatch, recreating store (existing records are discarded)"
        );
        drop(conn);
        remove_store_files(path)?;
        let conn = Connection::open(path)?;
        configure_pragmas(&conn)?;
        apply_schema(&conn, version)?;
        return Ok(conn);
    }

    apply_schema(&conn, version)?;
    Ok(conn)
}

fn configure_pragmas(conn: &Connection) -> Result<(), DatabaseError> {
    conn.execute_batch(
        "PRAGMA journal_mode=DELETE;
         PRAGMA synchronous=FULL;",
    )?;
    Ok(())
}

/// Declare every table and stamp the schema version.
fn apply_schema(conn: &Connection, version: i64) -> Result<(), DatabaseError> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.pragma_update(None, "user_version", version)?;
    Ok(())
}

/// Schema version stored in the file header (0 for a fresh file).
pub fn schema_version(conn: &Connection) -> Result<i64, DatabaseError> {
    let version = conn.query_row("PRAGMA user_version", [], |row| row.get::<_, i64>(0))?;
    Ok(version)
}

/// Count tables in the database (for verification)
pub fn count_tables(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |row| row.get::<_, i64>(0),
    )?;
    Ok(count)
}

fn remove_store_files(path: &Path) -> Result<(), DatabaseError> {
    let reset_err = |e: std::io::Error| DatabaseError::SchemaReset {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };

    fs::remove_file(path).map_err(reset_err)?;
    for suffix in SIDECAR_SUFFIXES {
        let sidecar = sidecar_path(path, suffix);
        if sidecar.exists() {
            fs::remove_file(&sidecar).map_err(reset_err)?;
        }
    }
    Ok(())
}

fn sidecar_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_initializes_all_tables() {
        let conn = open_memory_database().unwrap();
        assert_eq!(count_tables(&conn).unwrap(), 2);
    }

    #[test]
    fn schema_version_is_current() {
        let conn = open_memory_database().unwrap();
        assert_eq!(schema_version(&conn).unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn schema_idempotent() {
        let conn = open_memory_database().unwrap();
        assert!(apply_schema(&conn, SCHEMA_VERSION).is_ok());
        assert_eq!(count_tables(&conn).unwrap(), 2);
    }

    #[test]
    fn reopen_same_version_keeps_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.db");
        let config = StoreConfig::at_path(&path);

        let conn = open_database(&config).unwrap();
        conn.execute(
            "INSERT INTO visits (id, patient_id, visit_date, osteopath, reason)
             VALUES ('VIS_PAT_2024_01_01', 'PAT001', '2024-01-01', 'Dr', '{}')",
            [],
        )
        .unwrap();
        drop(conn);

        let conn = open_database(&config).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM visits", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn version_bump_wipes_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.db");

        let conn = open_database(&StoreConfig::at_path(&path).with_schema_version(1)).unwrap();
        conn.execute(
            "INSERT INTO patients (id, name, surname) VALUES ('PAT001', 'Mario', 'Rossi')",
            [],
        )
        .unwrap();
        drop(conn);

        let conn = open_database(&StoreConfig::at_path(&path).with_schema_version(2)).unwrap();
        assert_eq!(schema_version(&conn).unwrap(), 2);
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM patients", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn creates_missing_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("records.db");
        let conn = open_database(&StoreConfig::at_path(&path)).unwrap();
        assert_eq!(count_tables(&conn).unwrap(), 2);
        assert!(path.exists());
    }

    #[test]
    fn sidecar_paths_append_suffix() {
        let p = sidecar_path(Path::new("/tmp/x.db"), "-journal");
        assert_eq!(p, PathBuf::from("/tmp/x.db-journal"));
    }
}
