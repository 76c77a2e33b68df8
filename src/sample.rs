//! Data source selection.
//!
//! Platforms that can persist records get the SQLite-backed repositories.
//! Everywhere else the caller receives a read-only [`SampleCatalog`] and
//! repository access fails with [`RepositoryError::StoreUnavailable`].

use std::sync::Arc;

use crate::config::StoreConfig;
use crate::db::{DatabaseError, PatientRepository, RepositoryError, Store, VisitRepository};
use crate::models::enums::{Frequency, MaritalStatus, Sex, SmokingStatus, WorkType};
use crate::models::*;
use crate::platform::is_database_supported;
use crate::validation::{parse_iso_date, ValidationError};

/// Fixed demo records with the read side of the repository API. Ordering
/// and matching follow the SQL queries: patients by surname, name, id;
/// visits most recent first; case folding is ASCII-only like SQLite `LOWER`.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleCatalog {
    patients: Vec<Patient>,
    visits: Vec<Visit>,
}

impl SampleCatalog {
    pub fn new() -> Self {
        let mut patients = sample_patients();
        patients.sort_by(|a, b| {
            (&a.surname, &a.name, &a.id).cmp(&(&b.surname, &b.name, &b.id))
        });
        let mut visits = sample_visits();
        visits.sort_by(|a, b| (&b.visit_date, &b.id).cmp(&(&a.visit_date, &a.id)));
        Self { patients, visits }
    }

    pub fn get_all_patients(&self) -> &[Patient] {
        &self.patients
    }

    pub fn get_patient(&self, id: &str) -> Option<&Patient> {
        self.patients.iter().find(|p| p.id == id)
    }

    pub fn search_patients_by_name(&self, term: &str) -> Vec<&Patient> {
        let term = term.to_ascii_lowercase();
        self.patients
            .iter()
            .filter(|p| {
                p.name.to_ascii_lowercase().contains(&term)
                    || p.surname.to_ascii_lowercase().contains(&term)
            })
            .collect()
    }

    pub fn search_patients_by_phone(&self, term: &str) -> Vec<&Patient> {
        self.patients.iter().filter(|p| p.phone.contains(term)).collect()
    }

    pub fn get_patients_by_city(&self, city: &str) -> Vec<&Patient> {
        self.patients
            .iter()
            .filter(|p| p.city().is_some_and(|c| !c.trim().is_empty() && c == city))
            .collect()
    }

    pub fn get_patients_without_privacy_consent(&self) -> Vec<&Patient> {
        self.patients
            .iter()
            .filter(|p| !p.privacy.treatment_consent)
            .collect()
    }

    pub fn count_patients(&self) -> u64 {
        self.patients.len() as u64
    }

    pub fn get_all_visits(&self) -> &[Visit] {
        &self.visits
    }

    pub fn get_visit(&self, id: &str) -> Option<&Visit> {
        self.visits.iter().find(|v| v.id == id)
    }

    pub fn get_visits_by_patient(&self, patient_id: &str) -> Vec<&Visit> {
        self.visits.iter().filter(|v| v.patient_id == patient_id).collect()
    }

    /// Inclusive on both ends. Bounds must be `YYYY-MM-DD`.
    pub fn get_visits_by_date_range(
        &self,
        start: &str,
        end: &str,
    ) -> Result<Vec<&Visit>, ValidationError> {
        for (value, field) in [(start, "start"), (end, "end")] {
            if parse_iso_date(value).is_none() {
                return Err(ValidationError::InvalidDate {
                    field: field.into(),
                    value: value.into(),
                });
            }
        }
        Ok(self
            .visits
            .iter()
            .filter(|v| v.visit_date.as_str() >= start && v.visit_date.as_str() <= end)
            .collect())
    }

    pub fn get_visits_by_osteopath(&self, osteopath: &str) -> Vec<&Visit> {
        self.visits.iter().filter(|v| v.osteopath == osteopath).collect()
    }

    /// Case-insensitive substring match on the visit id or the patient id.
    pub fn search_visits(&self, term: &str) -> Vec<&Visit> {
        let term = term.to_ascii_lowercase();
        self.visits
            .iter()
            .filter(|v| {
                v.id.to_ascii_lowercase().contains(&term)
                    || v.patient_id.to_ascii_lowercase().contains(&term)
            })
            .collect()
    }

    pub fn count_visits(&self) -> u64 {
        self.visits.len() as u64
    }

    pub fn count_visits_by_patient(&self, patient_id: &str) -> u64 {
        self.visits.iter().filter(|v| v.patient_id == patient_id).count() as u64
    }
}

impl Default for SampleCatalog {
    fn default() -> Self {
        Self::new()
    }
}

fn sample_patients() -> Vec<Patient> {
    let mut rossi = Patient::create("PAT001", "Mario", "Rossi");
    rossi.birth_date = "1978-04-12".into();
    rossi.sex = Some(Sex::Male);
    rossi.phone = "+39 347 1122334".into();
    rossi.email = "mario.rossi@example.it".into();
    rossi.profession = "Impiegato".into();
    rossi.marital_status = Some(MaritalStatus::Married);
    rossi.address = Some(Address {
        street: "Via Garibaldi 12".into(),
        city: "Milano".into(),
        zip: "20121".into(),
        province: "MI".into(),
        country: "Italia".into(),
        kind: None,
    });
    rossi.privacy = PrivacyConsent {
        treatment_consent: true,
        data_processing_consent: true,
        marketing_consent: false,
        consent_date: "2024-01-15".into(),
        notes: String::new(),
    };
    let mut history = ClinicalHistory::default();
    history.lifestyle.smoking = Some(SmokingDetail {
        status: Some(SmokingStatus::Former),
        quit_date: "2019-09-01".into(),
        ..Default::default()
    });
    history.lifestyle.work = Some(WorkDetail {
        kind: Some(WorkType::Sedentary),
        hours_per_day: Some(8.0),
        ..Default::default()
    });
    rossi.clinical_history = Some(history);

    let mut bianchi = Patient::create("PAT002", "Giulia", "Bianchi");
    bianchi.birth_date = "1991-11-03".into();
    bianchi.sex = Some(Sex::Female);
    bianchi.phone = "+39 333 9876543".into();
    bianchi.email = "giulia.bianchi@example.it".into();
    bianchi.profession = "Infermiera".into();
    bianchi.address = Some(Address {
        city: "Torino".into(),
        ..Default::default()
    });
    bianchi.privacy = PrivacyConsent {
        treatment_consent: true,
        data_processing_consent: true,
        marketing_consent: true,
        consent_date: "2024-02-20".into(),
        notes: String::new(),
    };

    let mut esposito = Patient::create("PAT003", "Luca", "Esposito");
    esposito.birth_date = "2015-06-30".into();
    esposito.sex = Some(Sex::Male);
    esposito.phone = "+39 320 5554433".into();
    esposito.parents = Some(ParentInfo {
        father_name: "Antonio Esposito".into(),
        father_contact: "+39 320 5554433".into(),
        mother_name: "Anna Ferri".into(),
        mother_contact: "+39 320 5554400".into(),
    });

    vec![rossi, bianchi, esposito]
}

fn sample_visits() -> Vec<Visit> {
    let mut lumbar = Visit::create("VIS_PAT_2024_03_04", "PAT001", "2024-03-04");
    lumbar.reason.main = MainComplaint {
        description: "Lombalgia acuta".into(),
        onset: "Dopo sollevamento di un carico".into(),
        vas: Some(Vas(7)),
        ..Default::default()
    };
    lumbar.measurements = Some(VisitMeasurements {
        weight_kg: Some(82.0),
        height_cm: Some(176.0),
        blood_pressure: "130/85".into(),
        ..Default::default()
    });

    let mut follow_up = Visit::create("VIS_PAT_2024_03_18", "PAT001", "2024-03-18");
    follow_up.reason.main = MainComplaint {
        description: "Controllo lombalgia".into(),
        vas: Some(Vas(3)),
        ..Default::default()
    };

    let mut neck = Visit::create("VIS_PAT_2024_04_09", "PAT002", "2024-04-09");
    neck.osteopath = "Dott.ssa Chiara Conti".into();
    neck.reason.main = MainComplaint {
        description: "Cervicalgia con cefalea".into(),
        vas: Some(Vas(5)),
        ..Default::default()
    };
    neck.evaluation = Some(ApparatusEvaluation {
        cranial: Some(CranialApparatus {
            dizziness: Some(FlagWithVas::present(Vas(2), "in rotazione")),
            ..Default::default()
        }),
        respiratory: Some(RespiratoryApparatus {
            dyspnea: Some(FlagWithFrequency::present(Frequency::Rarely, "sotto sforzo")),
            ..Default::default()
        }),
        ..Default::default()
    });

    let mut posture = Visit::create("VIS_PAT_2024_05_02", "PAT003", "2024-05-02");
    posture.reason.main.description = "Valutazione posturale".into();

    vec![lumbar, follow_up, neck, posture]
}

/// Where records come from on this platform.
#[derive(Debug, Clone)]
pub enum DataSource {
    Persistent {
        store: Arc<Store>,
        patients: PatientRepository,
        visits: VisitRepository,
    },
    Sample(SampleCatalog),
}

impl DataSource {
    /// Pick the source for the running platform. The store itself opens
    /// lazily on first repository access.
    pub fn open(config: StoreConfig) -> Self {
        Self::open_with(is_database_supported(), config)
    }

    pub fn open_with(supported: bool, config: StoreConfig) -> Self {
        if !supported {
            tracing::info!("Persistent storage unavailable, serving sample records");
            return Self::Sample(SampleCatalog::new());
        }
        let store = Arc::new(Store::new(config));
        Self::Persistent {
            patients: PatientRepository::new(Arc::clone(&store)),
            visits: VisitRepository::new(Arc::clone(&store)),
            store,
        }
    }

    pub fn is_persistent(&self) -> bool {
        matches!(self, Self::Persistent { .. })
    }

    pub fn patients(&self) -> Result<&PatientRepository, RepositoryError> {
        match self {
            Self::Persistent { patients, .. } => Ok(patients),
            Self::Sample(_) => Err(RepositoryError::StoreUnavailable),
        }
    }

    pub fn visits(&self) -> Result<&VisitRepository, RepositoryError> {
        match self {
            Self::Persistent { visits, .. } => Ok(visits),
            Self::Sample(_) => Err(RepositoryError::StoreUnavailable),
        }
    }

    pub fn sample(&self) -> Option<&SampleCatalog> {
        match self {
            Self::Sample(catalog) => Some(catalog),
            Self::Persistent { .. } => None,
        }
    }

    /// Close the backing store, if any. Safe to call repeatedly.
    pub fn close(&self) -> Result<(), DatabaseError> {
        match self {
            Self::Persistent { store, .. } => store.close(),
            Self::Sample(_) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{validate_patient, validate_visit};

    #[test]
    fn sample_records_are_valid() {
        let catalog = SampleCatalog::new();
        for p in catalog.get_all_patients() {
            assert!(validate_patient(p).is_valid(), "{}: {}", p.id, validate_patient(p));
        }
        for v in catalog.get_all_visits() {
            assert!(validate_visit(v).is_valid(), "{}: {}", v.id, validate_visit(v));
        }
    }

    #[test]
    fn sample_visits_reference_sample_patients() {
        let catalog = SampleCatalog::new();
        for v in catalog.get_all_visits() {
            assert!(catalog.get_patient(&v.patient_id).is_some());
        }
    }

    #[test]
    fn sample_queries_follow_repository_ordering() {
        let catalog = SampleCatalog::new();
        let surnames: Vec<&str> =
            catalog.get_all_patients().iter().map(|p| p.surname.as_str()).collect();
        assert_eq!(surnames, vec!["Bianchi", "Esposito", "Rossi"]);

        let dates: Vec<&str> = catalog
            .get_visits_by_patient("PAT001")
            .iter()
            .map(|v| v.visit_date.as_str())
            .collect();
        assert_eq!(dates, vec!["2024-03-18", "2024-03-04"]);
        assert_eq!(catalog.search_patients_by_name("GIU").len(), 1);
        assert_eq!(catalog.count_visits(), 4);
        assert_eq!(catalog.count_visits_by_patient("PAT001"), 2);
    }

    #[test]
    fn sample_patient_filters() {
        let catalog = SampleCatalog::new();
        let ids = |found: Vec<&Patient>| found.iter().map(|p| p.id.clone()).collect::<Vec<_>>();

        assert_eq!(ids(catalog.search_patients_by_phone("5554")), vec!["PAT003"]);
        assert_eq!(ids(catalog.get_patients_by_city("Torino")), vec!["PAT002"]);
        assert!(catalog.get_patients_by_city("torino").is_empty());
        assert_eq!(ids(catalog.get_patients_without_privacy_consent()), vec!["PAT003"]);
    }

    #[test]
    fn sample_visit_filters() {
        let catalog = SampleCatalog::new();
        let ids = |found: Vec<&Visit>| found.iter().map(|v| v.id.clone()).collect::<Vec<_>>();

        let march = catalog.get_visits_by_date_range("2024-03-01", "2024-03-31").unwrap();
        assert_eq!(ids(march), vec!["VIS_PAT_2024_03_18", "VIS_PAT_2024_03_04"]);
        assert!(catalog
            .get_visits_by_date_range("2024-05-01", "2024-03-01")
            .unwrap()
            .is_empty());
        assert!(matches!(
            catalog.get_visits_by_date_range(" 2024-03-01", "2024-03-31"),
            Err(ValidationError::InvalidDate { .. })
        ));

        assert_eq!(
            ids(catalog.get_visits_by_osteopath("Dott.ssa Chiara Conti")),
            vec!["VIS_PAT_2024_04_09"]
        );
        assert_eq!(catalog.search_visits("pat003").len(), 1);
        assert_eq!(catalog.search_visits("vis_pat_2024_03").len(), 2);
    }

    #[test]
    fn unsupported_platform_gets_sample_source() {
        let source = DataSource::open_with(false, StoreConfig::in_memory());
        assert!(!source.is_persistent());
        assert!(matches!(source.patients(), Err(RepositoryError::StoreUnavailable)));
        assert!(matches!(source.visits(), Err(RepositoryError::StoreUnavailable)));
        assert_eq!(source.sample().map(SampleCatalog::count_patients), Some(3));
        assert!(source.close().is_ok());
    }

    #[tokio::test]
    async fn supported_platform_gets_repositories() {
        let source = DataSource::open_with(true, StoreConfig::in_memory());
        assert!(source.is_persistent());
        let patients = source.patients().unwrap();
        patients.save(Patient::create("PAT001", "Mario", "Rossi")).await.unwrap();
        assert_eq!(patients.count().await.unwrap(), 1);
        assert!(source.sample().is_none());
        source.close().unwrap();
        source.close().unwrap();
    }
}
