use std::str::FromStr;
use std::sync::Arc;

use rusqlite::{params, Connection, OptionalExtension};

use super::visit::delete_visits_by_patient;
use super::{ensure_valid, from_json, read_with, to_json, write_with, RepositoryError, Subscription};
use crate::db::{DatabaseError, Store, Table};
use crate::ids::generate_patient_id;
use crate::models::enums::{MaritalStatus, Sex};
use crate::models::*;
use crate::validation::validate_patient;

const PATIENT_COLUMNS: &str = "id, name, surname, birth_date, sex, birthplace, tax_code, phone,
    email, profession, marital_status, nationality, address, treatment_consent,
    data_processing_consent, marketing_consent, consent_date, consent_notes, parents,
    physician, clinical_history";

const PATIENT_ORDER: &str = "ORDER BY surname, name, id";

/// Insert the patient, or overwrite every column of the row with its id.
/// `created_at` survives the overwrite; `updated_at` is refreshed.
pub fn upsert_patient(conn: &Connection, patient: &Patient) -> Result<(), DatabaseError> {
    let city = patient.city().filter(|c| !c.trim().is_empty());
    conn.execute(
        "INSERT INTO patients (id, name, surname, birth_date, sex, birthplace, tax_code, phone,
         email, profession, marital_status, nationality, city, address, treatment_consent,
         data_processing_consent, marketing_consent, consent_date, consent_notes, parents,
         physician, clinical_history)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17,
         ?18, ?19, ?20, ?21, ?22)
         ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            surname = excluded.surname,
            birth_date = excluded.birth_date,
            sex = excluded.sex,
            birthplace = excluded.birthplace,
            tax_code = excluded.tax_code,
            phone = excluded.phone,
            email = excluded.email,
            profession = excluded.profession,
            marital_status = excluded.marital_status,
            nationality = excluded.nationality,
            city = excluded.city,
            address = excluded.address,
            treatment_consent = excluded.treatment_consent,
            data_processing_consent = excluded.data_processing_consent,
            marketing_consent = excluded.marketing_consent,
            consent_date = excluded.consent_date,
            consent_notes = excluded.consent_notes,
            parents = excluded.parents,
            physician = excluded.physician,
            clinical_history = excluded.clinical_history,
            updated_at = datetime('now')",
        params![
            patient.id,
            patient.name,
            patient.surname,
            patient.birth_date,
            patient.sex.map(|s| s.as_str()),
            patient.birthplace,
            patient.tax_code,
            patient.phone,
            patient.email,
            patient.profession,
            patient.marital_status.map(|m| m.as_str()),
            patient.nationality,
            city,
            to_json(patient.address.as_ref())?,
            patient.privacy.treatment_consent as i32,
            patient.privacy.data_processing_consent as i32,
            patient.privacy.marketing_consent as i32,
            patient.privacy.consent_date,
            patient.privacy.notes,
            to_json(patient.parents.as_ref())?,
            to_json(patient.physician.as_ref())?,
            to_json(patient.clinical_history.as_ref())?,
        ],
    )?;
    tracing::debug!(patient_id = %patient.id, "Patient upserted");
    Ok(())
}

pub fn get_patient(conn: &Connection, id: &str) -> Result<Option<Patient>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {PATIENT_COLUMNS} FROM patients WHERE id = ?1"),
            params![id],
            patient_row_from_rusqlite,
        )
        .optional()?;
    row.map(patient_from_row).transpose()
}

/// All patients by surname, then name.
pub fn get_all_patients(conn: &Connection) -> Result<Vec<Patient>, DatabaseError> {
    query_patients(conn, "", params![])
}

/// Case-insensitive substring match on name or surname.
pub fn search_patients_by_name(conn: &Connection, term: &str) -> Result<Vec<Patient>, DatabaseError> {
    query_patients(
        conn,
        "WHERE instr(LOWER(name), LOWER(?1)) > 0 OR instr(LOWER(surname), LOWER(?1)) > 0",
        params![term],
    )
}

pub fn search_patients_by_phone(conn: &Connection, term: &str) -> Result<Vec<Patient>, DatabaseError> {
    query_patients(conn, "WHERE instr(phone, ?1) > 0", params![term])
}

pub fn get_patients_by_city(conn: &Connection, city: &str) -> Result<Vec<Patient>, DatabaseError> {
    query_patients(conn, "WHERE city = ?1", params![city])
}

/// Compliance audit: patients who have not consented to treatment.
pub fn get_patients_without_privacy_consent(conn: &Connection) -> Result<Vec<Patient>, DatabaseError> {
    query_patients(conn, "WHERE treatment_consent = 0", params![])
}

pub fn count_patients(conn: &Connection) -> Result<u64, DatabaseError> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM patients", [], |row| row.get(0))?;
    Ok(count as u64)
}

pub fn patient_exists(conn: &Connection, id: &str) -> Result<bool, DatabaseError> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM patients WHERE id = ?1)",
        params![id],
        |row| row.get(0),
    )?;
    Ok(exists)
}

/// First sequential id not already taken. Starts from the row count, so
/// gaps left by deletions are skipped rather than reused.
pub fn next_patient_id(conn: &Connection) -> Result<String, DatabaseError> {
    let mut n = count_patients(conn)?;
    loop {
        let candidate = generate_patient_id(n);
        if !patient_exists(conn, &candidate)? {
            return Ok(candidate);
        }
        n += 1;
    }
}

pub fn delete_patient(conn: &Connection, id: &str) -> Result<(), DatabaseError> {
    let deleted = conn.execute("DELETE FROM patients WHERE id = ?1", params![id])?;
    if deleted == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Patient".into(),
            id: id.into(),
        });
    }
    Ok(())
}

pub fn delete_all_patients(conn: &Connection) -> Result<usize, DatabaseError> {
    Ok(conn.execute("DELETE FROM patients", [])?)
}

fn query_patients(
    conn: &Connection,
    filter: &str,
    params: &[&dyn rusqlite::ToSql],
) -> Result<Vec<Patient>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PATIENT_COLUMNS} FROM patients {filter} {PATIENT_ORDER}"
    ))?;
    let rows = stmt.query_map(params, patient_row_from_rusqlite)?;

    let mut patients = Vec::new();
    for row in rows {
        patients.push(patient_from_row(row?)?);
    }
    Ok(patients)
}

struct PatientRow {
    id: String,
    name: String,
    surname: String,
    birth_date: String,
    sex: Option<String>,
    birthplace: String,
    tax_code: String,
    phone: String,
    email: String,
    profession: String,
    marital_status: Option<String>,
    nationality: String,
    address: Option<String>,
    treatment_consent: i32,
    data_processing_consent: i32,
    marketing_consent: i32,
    consent_date: String,
    consent_notes: String,
    parents: Option<String>,
    physician: Option<String>,
    clinical_history: Option<String>,
}

fn patient_row_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<PatientRow, rusqlite::Error> {
    Ok(PatientRow {
        id: row.get(0)?,
        name: row.get(1)?,
        surname: row.get(2)?,
        birth_date: row.get(3)?,
        sex: row.get(4)?,
        birthplace: row.get(5)?,
        tax_code: row.get(6)?,
        phone: row.get(7)?,
        email: row.get(8)?,
        profession: row.get(9)?,
        marital_status: row.get(10)?,
        nationality: row.get(11)?,
        address: row.get(12)?,
        treatment_consent: row.get(13)?,
        data_processing_consent: row.get(14)?,
        marketing_consent: row.get(15)?,
        consent_date: row.get(16)?,
        consent_notes: row.get(17)?,
        parents: row.get(18)?,
        physician: row.get(19)?,
        clinical_history: row.get(20)?,
    })
}

fn patient_from_row(row: PatientRow) -> Result<Patient, DatabaseError> {
    Ok(Patient {
        id: row.id,
        name: row.name,
        surname: row.surname,
        birth_date: row.birth_date,
        sex: row.sex.as_deref().map(Sex::from_str).transpose()?,
        birthplace: row.birthplace,
        tax_code: row.tax_code,
        phone: row.phone,
        email: row.email,
        profession: row.profession,
        marital_status: row.marital_status.as_deref().map(MaritalStatus::from_str).transpose()?,
        nationality: row.nationality,
        address: from_json(row.address)?,
        privacy: PrivacyConsent {
            treatment_consent: row.treatment_consent != 0,
            data_processing_consent: row.data_processing_consent != 0,
            marketing_consent: row.marketing_consent != 0,
            consent_date: row.consent_date,
            notes: row.consent_notes,
        },
        parents: from_json(row.parents)?,
        physician: from_json(row.physician)?,
        clinical_history: from_json(row.clinical_history)?,
    })
}

/// Async patient repository over a shared [`Store`].
#[derive(Debug, Clone)]
pub struct PatientRepository {
    store: Arc<Store>,
}

impl PatientRepository {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    pub async fn get_all(&self) -> Result<Vec<Patient>, RepositoryError> {
        read_with(&self.store, |conn| Ok(get_all_patients(conn)?)).await
    }

    /// Live list of all patients, re-read after every committed patient write.
    pub fn subscribe_all(&self) -> Subscription<Vec<Patient>> {
        Subscription::new(Arc::clone(&self.store), Table::Patients, get_all_patients)
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<Patient>, RepositoryError> {
        let id = id.to_string();
        read_with(&self.store, move |conn| Ok(get_patient(conn, &id)?)).await
    }

    pub async fn search_by_name(&self, term: &str) -> Result<Vec<Patient>, RepositoryError> {
        let term = term.to_string();
        read_with(&self.store, move |conn| Ok(search_patients_by_name(conn, &term)?)).await
    }

    pub async fn search_by_phone(&self, term: &str) -> Result<Vec<Patient>, RepositoryError> {
        let term = term.to_string();
        read_with(&self.store, move |conn| Ok(search_patients_by_phone(conn, &term)?)).await
    }

    pub async fn get_by_city(&self, city: &str) -> Result<Vec<Patient>, RepositoryError> {
        let city = city.to_string();
        read_with(&self.store, move |conn| Ok(get_patients_by_city(conn, &city)?)).await
    }

    pub async fn get_without_privacy_consent(&self) -> Result<Vec<Patient>, RepositoryError> {
        read_with(&self.store, |conn| Ok(get_patients_without_privacy_consent(conn)?)).await
    }

    pub async fn count(&self) -> Result<u64, RepositoryError> {
        read_with(&self.store, |conn| Ok(count_patients(conn)?)).await
    }

    pub async fn exists(&self, id: &str) -> Result<bool, RepositoryError> {
        let id = id.to_string();
        read_with(&self.store, move |conn| Ok(patient_exists(conn, &id)?)).await
    }

    pub async fn next_patient_id(&self) -> Result<String, RepositoryError> {
        read_with(&self.store, |conn| Ok(next_patient_id(conn)?)).await
    }

    /// Validate, then insert or fully replace the patient in one transaction.
    pub async fn save(&self, patient: Patient) -> Result<Patient, RepositoryError> {
        ensure_valid("Patient", &patient.id, validate_patient(&patient))?;
        write_with(&self.store, &[Table::Patients], move |conn| {
            upsert_patient(conn, &patient)?;
            Ok(patient)
        })
        .await
    }

    /// Delete one patient. Visits are left alone; see [`Self::delete_with_visits`].
    pub async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        let id = id.to_string();
        let result = write_with(&self.store, &[Table::Patients], {
            let id = id.clone();
            move |conn| Ok(delete_patient(conn, &id)?)
        })
        .await;
        if let Err(RepositoryError::NotFound { .. }) = &result {
            tracing::warn!(patient_id = %id, "Delete requested for unknown patient");
        }
        result
    }

    /// Delete the patient and every visit referencing it, atomically.
    /// Returns the number of visits removed.
    pub async fn delete_with_visits(&self, id: &str) -> Result<usize, RepositoryError> {
        let id = id.to_string();
        let result = write_with(&self.store, &[Table::Visits, Table::Patients], {
            let id = id.clone();
            move |conn| {
                let visits = delete_visits_by_patient(conn, &id)?;
                delete_patient(conn, &id)?;
                Ok(visits)
            }
        })
        .await;
        match &result {
            Ok(visits) => tracing::info!(patient_id = %id, visits, "Patient deleted with visits"),
            Err(RepositoryError::NotFound { .. }) => {
                tracing::warn!(patient_id = %id, "Delete requested for unknown patient")
            }
            Err(_) => {}
        }
        result
    }

    pub async fn delete_all(&self) -> Result<usize, RepositoryError> {
        let deleted = write_with(&self.store, &[Table::Patients], |conn| {
            Ok(delete_all_patients(conn)?)
        })
        .await?;
        tracing::info!(deleted, "All patients deleted");
        Ok(deleted)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::time::Duration;

    use super::*;
    use crate::db::open_memory_database;
    use crate::models::enums::{DiabetesType, SmokingStatus};

    /// A patient with every nested section populated.
    pub(crate) fn full_patient(id: &str, name: &str, surname: &str) -> Patient {
        let mut p = Patient::create(id, name, surname);
        p.birth_date = "1980-03-15".into();
        p.sex = Some(Sex::Female);
        p.birthplace = "Torino".into();
        p.tax_code = "RSSMRA80C55L219X".into();
        p.phone = "+39 333 1234567".into();
        p.email = "maria.rossi@example.it".into();
        p.profession = "Architetto".into();
        p.marital_status = Some(MaritalStatus::Married);
        p.nationality = "Italiana".into();
        p.address = Some(Address {
            street: "Via Roma 1".into(),
            city: "Milano".into(),
            zip: "20121".into(),
            province: "MI".into(),
            country: "Italia".into(),
            kind: None,
        });
        p.privacy = PrivacyConsent {
            treatment_consent: true,
            data_processing_consent: true,
            marketing_consent: false,
            consent_date: "2024-01-10".into(),
            notes: "Firmato in studio".into(),
        };
        p.physician = Some(PhysicianRef {
            name: "Dott. Bianchi".into(),
            contact: "02 555 0101".into(),
            specialization: "Medicina generale".into(),
        });
        let mut history = ClinicalHistory::default();
        history.chronic.drug_allergies = vec!["penicillina".into()];
        history.chronic.diabetes = Some(DiabetesType::Type2);
        history.chronic.hypertension = true;
        history.lifestyle.smoking = Some(SmokingDetail {
            status: Some(SmokingStatus::Former),
            quit_date: "2015-06-01".into(),
            ..Default::default()
        });
        history.therapies.push(Therapy {
            drug: "Metformina".into(),
            dosage: "500 mg".into(),
            start_date: "2020-02-01".into(),
            ..Default::default()
        });
        p.clinical_history = Some(history);
        p
    }

    #[test]
    fn round_trip_preserves_every_field() {
        let conn = open_memory_database().unwrap();
        let patient = full_patient("PAT001", "Maria", "Rossi");
        upsert_patient(&conn, &patient).unwrap();
        assert_eq!(get_patient(&conn, "PAT001").unwrap(), Some(patient));
    }

    #[test]
    fn absent_sections_stay_absent() {
        let conn = open_memory_database().unwrap();
        let patient = Patient::create("PAT001", "Luca", "Verdi");
        upsert_patient(&conn, &patient).unwrap();
        let loaded = get_patient(&conn, "PAT001").unwrap().unwrap();
        assert!(loaded.address.is_none());
        assert!(loaded.clinical_history.is_none());
        assert_eq!(loaded, patient);
    }

    #[test]
    fn upsert_replaces_whole_record() {
        let conn = open_memory_database().unwrap();
        let patient = full_patient("PAT001", "Maria", "Rossi");
        upsert_patient(&conn, &patient).unwrap();
        upsert_patient(&conn, &patient).unwrap();
        assert_eq!(count_patients(&conn).unwrap(), 1);

        let replacement = Patient::create("PAT001", "Maria", "Neri");
        upsert_patient(&conn, &replacement).unwrap();
        let loaded = get_patient(&conn, "PAT001").unwrap().unwrap();
        assert_eq!(loaded, replacement);
        assert!(loaded.address.is_none());
        assert_eq!(count_patients(&conn).unwrap(), 1);
    }

    #[test]
    fn get_all_sorts_by_surname_then_name() {
        let conn = open_memory_database().unwrap();
        for (id, name, surname) in [
            ("PAT001", "Paolo", "Verdi"),
            ("PAT002", "Anna", "Rossi"),
            ("PAT003", "Luca", "Bianchi"),
            ("PAT004", "Aldo", "Rossi"),
            ("PAT005", "Zeno", "Bianchi"),
        ] {
            upsert_patient(&conn, &Patient::create(id, name, surname)).unwrap();
        }
        let all = get_all_patients(&conn).unwrap();
        let keys: Vec<(String, String)> =
            all.iter().map(|p| (p.surname.clone(), p.name.clone())).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
        assert_eq!(all[0].id, "PAT003");
        assert_eq!(all[2].id, "PAT004");
    }

    #[test]
    fn name_search_is_case_insensitive_on_either_name() {
        let conn = open_memory_database().unwrap();
        upsert_patient(&conn, &Patient::create("PAT001", "Maria", "Rossi")).unwrap();
        upsert_patient(&conn, &Patient::create("PAT002", "Rosa", "Bianchi")).unwrap();
        upsert_patient(&conn, &Patient::create("PAT003", "Luca", "Verdi")).unwrap();

        let hits = search_patients_by_name(&conn, "ROS").unwrap();
        let ids: Vec<&str> = hits.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["PAT002", "PAT001"]);
        assert!(search_patients_by_name(&conn, "xyz").unwrap().is_empty());
    }

    #[test]
    fn phone_and_city_queries() {
        let conn = open_memory_database().unwrap();
        upsert_patient(&conn, &full_patient("PAT001", "Maria", "Rossi")).unwrap();
        let mut other = Patient::create("PAT002", "Luca", "Verdi");
        other.phone = "011 999 888".into();
        upsert_patient(&conn, &other).unwrap();

        assert_eq!(search_patients_by_phone(&conn, "1234").unwrap().len(), 1);
        assert_eq!(search_patients_by_phone(&conn, "999").unwrap()[0].id, "PAT002");
        assert_eq!(get_patients_by_city(&conn, "Milano").unwrap().len(), 1);
        assert!(get_patients_by_city(&conn, "milano").unwrap().is_empty());
    }

    #[test]
    fn privacy_audit_returns_only_non_consenting() {
        let conn = open_memory_database().unwrap();
        upsert_patient(&conn, &full_patient("PAT001", "Maria", "Rossi")).unwrap();
        upsert_patient(&conn, &Patient::create("PAT002", "Luca", "Verdi")).unwrap();

        let missing = get_patients_without_privacy_consent(&conn).unwrap();
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].id, "PAT002");
    }

    #[test]
    fn delete_missing_patient_is_not_found() {
        let conn = open_memory_database().unwrap();
        let err = delete_patient(&conn, "PAT404").unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }

    #[test]
    fn next_id_skips_taken_ids() {
        let conn = open_memory_database().unwrap();
        assert_eq!(next_patient_id(&conn).unwrap(), "PAT001");
        upsert_patient(&conn, &Patient::create("PAT002", "A", "B")).unwrap();
        assert_eq!(next_patient_id(&conn).unwrap(), "PAT003");
    }

    #[test]
    fn corrupt_enum_column_surfaces_error() {
        let conn = open_memory_database().unwrap();
        conn.execute("INSERT INTO patients (id, sex) VALUES ('PAT001', 'unknown')", [])
            .unwrap();
        let err = get_patient(&conn, "PAT001").unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidEnum { .. }));
    }

    fn repo() -> PatientRepository {
        PatientRepository::new(Arc::new(Store::open_in_memory().unwrap()))
    }

    #[tokio::test]
    async fn save_then_get_by_id() {
        let repo = repo();
        let saved = repo.save(full_patient("PAT001", "Maria", "Rossi")).await.unwrap();
        let loaded = repo.get_by_id(&saved.id).await.unwrap();
        assert_eq!(loaded, Some(saved));
        assert!(repo.exists("PAT001").await.unwrap());
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn save_rejects_invalid_patient() {
        let repo = repo();
        let mut patient = Patient::create("PAT001", "Maria", "Rossi");
        patient.birth_date = "2999-01-01".into();
        let err = repo.save(patient).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Validation(_)));
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn repository_delete_reports_missing_id() {
        let repo = repo();
        let err = repo.delete("PAT404").await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { ref id, .. } if id == "PAT404"));
    }

    #[tokio::test]
    async fn delete_all_reports_count() {
        let repo = repo();
        repo.save(Patient::create("PAT001", "A", "B")).await.unwrap();
        repo.save(Patient::create("PAT002", "C", "D")).await.unwrap();
        assert_eq!(repo.delete_all().await.unwrap(), 2);
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn subscription_emits_one_snapshot_per_save() {
        let repo = repo();
        let mut sub = repo.subscribe_all();
        assert!(sub.next().await.unwrap().is_empty());

        repo.save(Patient::create("PAT001", "Maria", "Rossi")).await.unwrap();
        let snapshot = sub.next().await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, "PAT001");

        let extra = tokio::time::timeout(Duration::from_millis(100), sub.next()).await;
        assert!(extra.is_err(), "a single write must emit a single snapshot");
    }

    #[tokio::test]
    async fn rejected_save_emits_nothing() {
        let repo = repo();
        let mut sub = repo.subscribe_all();
        sub.next().await.unwrap();

        let _ = repo.save(Patient::create("", "No", "Id")).await;
        let _ = repo.delete("PAT404").await;
        let extra = tokio::time::timeout(Duration::from_millis(100), sub.next()).await;
        assert!(extra.is_err());
    }
}
