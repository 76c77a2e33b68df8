use std::sync::Arc;

use rusqlite::{params, Connection, OptionalExtension};

use super::patient::patient_exists;
use super::{ensure_valid, from_json, read_with, to_json, write_with, RepositoryError, Subscription};
use crate::db::{DatabaseError, Store, Table};
use crate::ids;
use crate::models::*;
use crate::validation::{parse_iso_date, validate_visit, ValidationError};

const VISIT_COLUMNS: &str =
    "id, patient_id, visit_date, osteopath, measurements, reason, evaluation, notes";

/// Most recent first.
const VISIT_ORDER: &str = "ORDER BY visit_date DESC, id DESC";

pub fn upsert_visit(conn: &Connection, visit: &Visit) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO visits (id, patient_id, visit_date, osteopath, measurements, reason,
         evaluation, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT(id) DO UPDATE SET
            patient_id = excluded.patient_id,
            visit_date = excluded.visit_date,
            osteopath = excluded.osteopath,
            measurements = excluded.measurements,
            reason = excluded.reason,
            evaluation = excluded.evaluation,
            notes = excluded.notes,
            updated_at = datetime('now')",
        params![
            visit.id,
            visit.patient_id,
            visit.visit_date,
            visit.osteopath,
            to_json(visit.measurements.as_ref())?,
            serde_json::to_string(&visit.reason)?,
            to_json(visit.evaluation.as_ref())?,
            visit.notes,
        ],
    )?;
    tracing::debug!(visit_id = %visit.id, patient_id = %visit.patient_id, "Visit upserted");
    Ok(())
}

pub fn get_visit(conn: &Connection, id: &str) -> Result<Option<Visit>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {VISIT_COLUMNS} FROM visits WHERE id = ?1"),
            params![id],
            visit_row_from_rusqlite,
        )
        .optional()?;
    row.map(visit_from_row).transpose()
}

pub fn get_all_visits(conn: &Connection) -> Result<Vec<Visit>, DatabaseError> {
    query_visits(conn, "", params![])
}

pub fn get_visits_by_patient(conn: &Connection, patient_id: &str) -> Result<Vec<Visit>, DatabaseError> {
    query_visits(conn, "WHERE patient_id = ?1", params![patient_id])
}

/// Visits dated within `[start, end]`. Both bounds are ISO dates, so the
/// text comparison orders them chronologically.
pub fn get_visits_by_date_range(
    conn: &Connection,
    start: &str,
    end: &str,
) -> Result<Vec<Visit>, DatabaseError> {
    query_visits(
        conn,
        "WHERE visit_date >= ?1 AND visit_date <= ?2",
        params![start, end],
    )
}

pub fn get_visits_by_osteopath(conn: &Connection, osteopath: &str) -> Result<Vec<Visit>, DatabaseError> {
    query_visits(conn, "WHERE osteopath = ?1", params![osteopath])
}

/// Case-insensitive substring match on the visit id or the patient id.
pub fn search_visits(conn: &Connection, term: &str) -> Result<Vec<Visit>, DatabaseError> {
    query_visits(
        conn,
        "WHERE instr(LOWER(id), LOWER(?1)) > 0 OR instr(LOWER(patient_id), LOWER(?1)) > 0",
        params![term],
    )
}

pub fn count_visits(conn: &Connection) -> Result<u64, DatabaseError> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM visits", [], |row| row.get(0))?;
    Ok(count as u64)
}

pub fn count_visits_by_patient(conn: &Connection, patient_id: &str) -> Result<u64, DatabaseError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM visits WHERE patient_id = ?1",
        params![patient_id],
        |row| row.get(0),
    )?;
    Ok(count as u64)
}

pub fn visit_exists(conn: &Connection, id: &str) -> Result<bool, DatabaseError> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM visits WHERE id = ?1)",
        params![id],
        |row| row.get(0),
    )?;
    Ok(exists)
}

pub fn delete_visit(conn: &Connection, id: &str) -> Result<(), DatabaseError> {
    let deleted = conn.execute("DELETE FROM visits WHERE id = ?1", params![id])?;
    if deleted == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Visit".into(),
            id: id.into(),
        });
    }
    Ok(())
}

pub fn delete_all_visits(conn: &Connection) -> Result<usize, DatabaseError> {
    Ok(conn.execute("DELETE FROM visits", [])?)
}

/// Remove every visit of one patient. The patient row is untouched.
pub fn delete_visits_by_patient(conn: &Connection, patient_id: &str) -> Result<usize, DatabaseError> {
    Ok(conn.execute("DELETE FROM visits WHERE patient_id = ?1", params![patient_id])?)
}

fn query_visits(
    conn: &Connection,
    filter: &str,
    params: &[&dyn rusqlite::ToSql],
) -> Result<Vec<Visit>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {VISIT_COLUMNS} FROM visits {filter} {VISIT_ORDER}"
    ))?;
    let rows = stmt.query_map(params, visit_row_from_rusqlite)?;

    let mut visits = Vec::new();
    for row in rows {
        visits.push(visit_from_row(row?)?);
    }
    Ok(visits)
}

struct VisitRow {
    id: String,
    patient_id: String,
    visit_date: String,
    osteopath: String,
    measurements: Option<String>,
    reason: String,
    evaluation: Option<String>,
    notes: String,
}

fn visit_row_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<VisitRow, rusqlite::Error> {
    Ok(VisitRow {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        visit_date: row.get(2)?,
        osteopath: row.get(3)?,
        measurements: row.get(4)?,
        reason: row.get(5)?,
        evaluation: row.get(6)?,
        notes: row.get(7)?,
    })
}

fn visit_from_row(row: VisitRow) -> Result<Visit, DatabaseError> {
    Ok(Visit {
        id: row.id,
        patient_id: row.patient_id,
        visit_date: row.visit_date,
        osteopath: row.osteopath,
        measurements: from_json(row.measurements)?,
        reason: serde_json::from_str(&row.reason)?,
        evaluation: from_json(row.evaluation)?,
        notes: row.notes,
    })
}

fn require_iso_date(value: &str, field: &str) -> Result<(), ValidationError> {
    match parse_iso_date(value) {
        Some(_) => Ok(()),
        None => Err(ValidationError::InvalidDate {
            field: field.into(),
            value: value.into(),
        }),
    }
}

/// Async visit repository over a shared [`Store`].
///
/// Visits reference their patient by id only. `save` checks that the
/// patient exists; deleting a patient never removes its visits unless
/// [`PatientRepository::delete_with_visits`](super::PatientRepository::delete_with_visits)
/// or [`Self::delete_all_by_patient`] is called.
#[derive(Debug, Clone)]
pub struct VisitRepository {
    store: Arc<Store>,
}

impl VisitRepository {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    pub async fn get_all(&self) -> Result<Vec<Visit>, RepositoryError> {
        read_with(&self.store, |conn| Ok(get_all_visits(conn)?)).await
    }

    pub fn subscribe_all(&self) -> Subscription<Vec<Visit>> {
        Subscription::new(Arc::clone(&self.store), Table::Visits, get_all_visits)
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<Visit>, RepositoryError> {
        let id = id.to_string();
        read_with(&self.store, move |conn| Ok(get_visit(conn, &id)?)).await
    }

    pub async fn get_by_patient_id(&self, patient_id: &str) -> Result<Vec<Visit>, RepositoryError> {
        let patient_id = patient_id.to_string();
        read_with(&self.store, move |conn| Ok(get_visits_by_patient(conn, &patient_id)?)).await
    }

    /// Live visit history of one patient.
    pub fn subscribe_by_patient(&self, patient_id: &str) -> Subscription<Vec<Visit>> {
        let patient_id = patient_id.to_string();
        Subscription::new(Arc::clone(&self.store), Table::Visits, move |conn| {
            get_visits_by_patient(conn, &patient_id)
        })
    }

    /// Inclusive on both ends. Bounds must be `YYYY-MM-DD`.
    pub async fn get_by_date_range(
        &self,
        start: &str,
        end: &str,
    ) -> Result<Vec<Visit>, RepositoryError> {
        require_iso_date(start, "start")?;
        require_iso_date(end, "end")?;
        let (start, end) = (start.to_string(), end.to_string());
        read_with(&self.store, move |conn| {
            Ok(get_visits_by_date_range(conn, &start, &end)?)
        })
        .await
    }

    pub async fn get_by_osteopath(&self, osteopath: &str) -> Result<Vec<Visit>, RepositoryError> {
        let osteopath = osteopath.to_string();
        read_with(&self.store, move |conn| Ok(get_visits_by_osteopath(conn, &osteopath)?)).await
    }

    pub async fn search(&self, term: &str) -> Result<Vec<Visit>, RepositoryError> {
        let term = term.to_string();
        read_with(&self.store, move |conn| Ok(search_visits(conn, &term)?)).await
    }

    pub async fn count(&self) -> Result<u64, RepositoryError> {
        read_with(&self.store, |conn| Ok(count_visits(conn)?)).await
    }

    pub async fn count_by_patient(&self, patient_id: &str) -> Result<u64, RepositoryError> {
        let patient_id = patient_id.to_string();
        read_with(&self.store, move |conn| Ok(count_visits_by_patient(conn, &patient_id)?)).await
    }

    /// Validate, check the patient exists, then insert or fully replace the
    /// visit. The existence check and the write share one transaction.
    pub async fn save(&self, visit: Visit) -> Result<Visit, RepositoryError> {
        ensure_valid("Visit", &visit.id, validate_visit(&visit))?;
        write_with(&self.store, &[Table::Visits], move |conn| {
            if !patient_exists(conn, &visit.patient_id)? {
                return Err(RepositoryError::PatientNotFound {
                    visit_id: visit.id.clone(),
                    patient_id: visit.patient_id.clone(),
                });
            }
            upsert_visit(conn, &visit)?;
            Ok(visit)
        })
        .await
    }

    pub async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        let id = id.to_string();
        let result = write_with(&self.store, &[Table::Visits], {
            let id = id.clone();
            move |conn| Ok(delete_visit(conn, &id)?)
        })
        .await;
        if let Err(RepositoryError::NotFound { .. }) = &result {
            tracing::warn!(visit_id = %id, "Delete requested for unknown visit");
        }
        result
    }

    pub async fn delete_all(&self) -> Result<usize, RepositoryError> {
        let deleted =
            write_with(&self.store, &[Table::Visits], |conn| Ok(delete_all_visits(conn)?)).await?;
        tracing::info!(deleted, "All visits deleted");
        Ok(deleted)
    }

    /// Cascade helper for patient removal. Returns the number of visits
    /// deleted; zero is not an error.
    pub async fn delete_all_by_patient(&self, patient_id: &str) -> Result<usize, RepositoryError> {
        let patient_id = patient_id.to_string();
        let deleted = write_with(&self.store, &[Table::Visits], {
            let patient_id = patient_id.clone();
            move |conn| Ok(delete_visits_by_patient(conn, &patient_id)?)
        })
        .await?;
        tracing::info!(patient_id = %patient_id, deleted, "Patient visits deleted");
        Ok(deleted)
    }

    /// First free visit id for this patient and day.
    pub async fn generate_unique_visit_id(
        &self,
        patient_id: &str,
        visit_date: &str,
    ) -> Result<String, RepositoryError> {
        let (patient_id, visit_date) = (patient_id.to_string(), visit_date.to_string());
        read_with(&self.store, move |conn| {
            ids::generate_unique_visit_id(&patient_id, &visit_date, |candidate| {
                visit_exists(conn, candidate).map_err(RepositoryError::from)
            })
        })
        .await
    }
}
