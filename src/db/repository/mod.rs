//! Repository layer: entity-scoped database operations.
//!
//! Each entity module has plain functions over `&Connection` and an async
//! repository type that owns an `Arc<Store>` and runs those functions on
//! the blocking pool.

mod patient;
mod subscription;
mod visit;

use std::sync::Arc;

use rusqlite::Connection;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use super::{DatabaseError, Store, Table};
use crate::validation::{ValidationError, ValidationReport};

pub use patient::*;
pub use subscription::Subscription;
pub use visit::*;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Validation failed: {0}")]
    Validation(ValidationReport),

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("{entity_type} not found: {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Visit {visit_id} references unknown patient {patient_id}")]
    PatientNotFound { visit_id: String, patient_id: String },

    #[error("Persistent storage is not available on this platform")]
    StoreUnavailable,

    #[error(transparent)]
    Database(DatabaseError),

    #[error("Background task failed: {0}")]
    Task(String),
}

impl From<DatabaseError> for RepositoryError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound { entity_type, id } => Self::NotFound { entity_type, id },
            other => Self::Database(other),
        }
    }
}

impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database(DatabaseError::Sqlite(err))
    }
}

impl From<tokio::task::JoinError> for RepositoryError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Task(err.to_string())
    }
}

/// Run blocking store work off the async executor.
pub(crate) async fn run_blocking<T, F>(f: F) -> Result<T, RepositoryError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, RepositoryError> + Send + 'static,
{
    tokio::task::spawn_blocking(f).await?
}

/// Read through the store on the blocking pool.
pub(crate) async fn read_with<T, F>(store: &Arc<Store>, f: F) -> Result<T, RepositoryError>
where
    T: Send + 'static,
    F: FnOnce(&Connection) -> Result<T, RepositoryError> + Send + 'static,
{
    let store = Arc::clone(store);
    run_blocking(move || store.with_connection(f)).await
}

/// Write through the store on the blocking pool, in one transaction that
/// notifies `tables` once committed.
pub(crate) async fn write_with<T, F>(
    store: &Arc<Store>,
    tables: &'static [Table],
    f: F,
) -> Result<T, RepositoryError>
where
    T: Send + 'static,
    F: FnOnce(&Connection) -> Result<T, RepositoryError> + Send + 'static,
{
    let store = Arc::clone(store);
    run_blocking(move || store.write(tables, f)).await
}

/// Encode an optional sub-graph for a JSON column; `None` stays NULL.
pub(crate) fn to_json<T: Serialize>(value: Option<&T>) -> Result<Option<String>, DatabaseError> {
    value
        .map(serde_json::to_string)
        .transpose()
        .map_err(DatabaseError::from)
}

pub(crate) fn from_json<T: DeserializeOwned>(
    column: Option<String>,
) -> Result<Option<T>, DatabaseError> {
    column
        .as_deref()
        .map(serde_json::from_str)
        .transpose()
        .map_err(DatabaseError::from)
}

/// Reject a record whose report carries hard errors; log the warnings.
pub(crate) fn ensure_valid(
    entity_type: &str,
    id: &str,
    report: ValidationReport,
) -> Result<(), RepositoryError> {
    if !report.warnings.is_empty() {
        tracing::warn!(
            entity_type,
            id,
            fields = ?report.warning_fields(),
            "Saving record with incomplete details"
        );
    }
    if report.is_valid() {
        Ok(())
    } else {
        Err(RepositoryError::Validation(report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_not_found_becomes_repository_not_found() {
        let err: RepositoryError = DatabaseError::NotFound {
            entity_type: "Patient".into(),
            id: "PAT009".into(),
        }
        .into();
        assert!(matches!(err, RepositoryError::NotFound { ref id, .. } if id == "PAT009"));
    }

    #[test]
    fn other_database_errors_stay_opaque() {
        let err: RepositoryError = DatabaseError::LockPoisoned.into();
        assert!(matches!(err, RepositoryError::Database(DatabaseError::LockPoisoned)));
    }

    #[test]
    fn invalid_report_is_rejected() {
        let report = ValidationReport {
            errors: vec![ValidationError::Required { field: "id".into() }],
            warnings: vec![],
        };
        let err = ensure_valid("Patient", "", report).unwrap_err();
        assert!(matches!(err, RepositoryError::Validation(_)));
        assert!(err.to_string().contains("id"));
    }

    #[test]
    fn warnings_alone_do_not_block() {
        let report = ValidationReport {
            errors: vec![],
            warnings: vec![ValidationError::RequiredWhenPresent {
                field: "parents".into(),
            }],
        };
        assert!(ensure_valid("Patient", "PAT001", report).is_ok());
    }

    #[test]
    fn json_columns_keep_none_as_null() {
        assert_eq!(to_json::<Vec<String>>(None).unwrap(), None);
        let encoded = to_json(Some(&vec!["a".to_string()])).unwrap();
        assert_eq!(encoded.as_deref(), Some(r#"["a"]"#));
        let decoded: Option<Vec<String>> = from_json(encoded).unwrap();
        assert_eq!(decoded, Some(vec!["a".to_string()]));
    }

    #[test]
    fn corrupt_json_column_is_a_serialization_error() {
        let err = from_json::<Vec<String>>(Some("{not json".into())).unwrap_err();
        assert!(matches!(err, DatabaseError::Serialization(_)));
    }

    #[tokio::test]
    async fn blocking_work_returns_its_result() {
        let value = run_blocking(|| Ok(21 * 2)).await.unwrap();
        assert_eq!(value, 42);
    }
}
