//! Lightweight records for list screens.
//!
//! Summaries carry only what a list row shows. They convert from the
//! persisted entities, and a patient summary edited in a quick form can be
//! written back onto the full record with [`PatientSummary::apply_to`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{Address, Patient, Visit};
use crate::validation::today;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientSummary {
    pub id: String,
    pub name: String,
    pub surname: String,
    pub full_name: String,
    pub birth_date: String,
    /// `None` when the birth date is blank or malformed.
    pub age: Option<i32>,
    pub phone: String,
    pub email: String,
    pub city: Option<String>,
    pub privacy_consent: bool,
    pub visits_count: Option<u64>,
}

impl PatientSummary {
    pub fn from_patient(patient: &Patient, today: NaiveDate) -> Self {
        Self {
            id: patient.id.clone(),
            name: patient.name.clone(),
            surname: patient.surname.clone(),
            full_name: patient.full_name(),
            birth_date: patient.birth_date.clone(),
            age: patient.age_on(today),
            phone: patient.phone.clone(),
            email: patient.email.clone(),
            city: patient
                .city()
                .filter(|c| !c.trim().is_empty())
                .map(str::to_string),
            privacy_consent: patient.privacy.treatment_consent,
            visits_count: None,
        }
    }

    pub fn with_visits_count(mut self, count: u64) -> Self {
        self.visits_count = Some(count);
        self
    }

    /// Copy the editable summary fields onto `patient`, leaving every
    /// section the summary does not show untouched.
    pub fn apply_to(&self, patient: &mut Patient) {
        patient.name = self.name.clone();
        patient.surname = self.surname.clone();
        patient.birth_date = self.birth_date.clone();
        patient.phone = self.phone.clone();
        patient.email = self.email.clone();
        patient.privacy.treatment_consent = self.privacy_consent;
        if let Some(address) = patient.address.as_mut() {
            address.city = self.city.clone().unwrap_or_default();
        } else if let Some(city) = &self.city {
            patient.address = Some(Address {
                city: city.clone(),
                ..Default::default()
            });
        }
    }

    /// A new patient built from a quick-entry form.
    pub fn into_patient(self) -> Patient {
        let mut patient = Patient::create(self.id.clone(), "", "");
        self.apply_to(&mut patient);
        patient
    }
}

impl From<&Patient> for PatientSummary {
    fn from(patient: &Patient) -> Self {
        Self::from_patient(patient, today())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisitSummary {
    pub id: String,
    pub patient_id: String,
    pub visit_date: String,
    pub osteopath: String,
    pub main_complaint: String,
    pub vas: Option<i32>,
    pub evaluated_systems: Vec<String>,
}

impl From<&Visit> for VisitSummary {
    fn from(visit: &Visit) -> Self {
        Self {
            id: visit.id.clone(),
            patient_id: visit.patient_id.clone(),
            visit_date: visit.visit_date.clone(),
            osteopath: visit.osteopath.clone(),
            main_complaint: visit.reason.main.description.clone(),
            vas: visit.reason.main.vas.map(|v| v.0),
            evaluated_systems: visit
                .evaluation
                .as_ref()
                .map(|e| e.evaluated_systems().into_iter().map(String::from).collect())
                .unwrap_or_default(),
        }
    }
}
