use serde::{Deserialize, Serialize};

use super::apparatus::ApparatusEvaluation;
use super::shapes::Vas;
use crate::config::DEFAULT_OSTEOPATH;
use crate::validation::record::{check_blood_pressure, check_fields, check_height, check_weight, join};
use crate::validation::{Check, Checker};

/// A consultation. `patient_id` refers to a [`super::Patient`] by value;
/// the visit repository checks that the patient exists before writing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Visit {
    pub id: String,
    pub patient_id: String,
    /// `YYYY-MM-DD`.
    pub visit_date: String,
    pub osteopath: String,
    pub measurements: Option<VisitMeasurements>,
    pub reason: ConsultationReason,
    pub evaluation: Option<ApparatusEvaluation>,
    pub notes: String,
}

impl Default for Visit {
    fn default() -> Self {
        Self {
            id: String::new(),
            patient_id: String::new(),
            visit_date: String::new(),
            osteopath: DEFAULT_OSTEOPATH.to_string(),
            measurements: None,
            reason: ConsultationReason::default(),
            evaluation: None,
            notes: String::new(),
        }
    }
}

impl Visit {
    /// New visit with an assigned id; measurements and evaluation absent.
    pub fn create(
        id: impl Into<String>,
        patient_id: impl Into<String>,
        visit_date: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            patient_id: patient_id.into(),
            visit_date: visit_date.into(),
            ..Default::default()
        }
    }

    /// Blank visit for a patient, filled in interactively before the id
    /// is generated.
    pub fn new_empty(patient_id: impl Into<String>) -> Self {
        Self {
            patient_id: patient_id.into(),
            ..Default::default()
        }
    }
}

impl Check for Visit {
    fn check(&self, path: &str, checker: &mut Checker) {
        checker.date(&self.visit_date, &join(path, "visit_date"));
        self.measurements.check(&join(path, "measurements"), checker);
        self.reason.check(&join(path, "reason"), checker);
        self.evaluation.check(&join(path, "evaluation"), checker);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisitMeasurements {
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    pub bmi: Option<f64>,
    /// `systolic/diastolic`, e.g. `"120/80"`.
    pub blood_pressure: String,
    pub cranial_index: Option<f64>,
}

impl VisitMeasurements {
    /// BMI from weight and height, rounded to one decimal.
    pub fn bmi_from(weight_kg: f64, height_cm: f64) -> Option<f64> {
        if weight_kg <= 0.0 || height_cm <= 0.0 {
            return None;
        }
        let meters = height_cm / 100.0;
        Some((weight_kg / (meters * meters) * 10.0).round() / 10.0)
    }

    /// Stored BMI, or one computed from weight and height.
    pub fn effective_bmi(&self) -> Option<f64> {
        self.bmi.or_else(|| match (self.weight_kg, self.height_cm) {
            (Some(w), Some(h)) => Self::bmi_from(w, h),
            _ => None,
        })
    }
}

impl Check for VisitMeasurements {
    fn check(&self, path: &str, checker: &mut Checker) {
        check_weight(self.weight_kg, &join(path, "weight_kg"), checker);
        check_height(self.height_cm, &join(path, "height_cm"), checker);
        check_blood_pressure(&self.blood_pressure, &join(path, "blood_pressure"), checker);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsultationReason {
    pub main: MainComplaint,
    pub secondary: Option<SecondaryComplaint>,
}

check_fields!(ConsultationReason { main, secondary });

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MainComplaint {
    pub description: String,
    pub onset: String,
    pub pain_description: String,
    pub vas: Option<Vas>,
    pub contributing_factors: String,
}

impl Check for MainComplaint {
    fn check(&self, path: &str, checker: &mut Checker) {
        checker.vas(self.vas, &join(path, "vas"));
        checker.detail(
            self.vas.is_some(),
            &self.description,
            &join(path, "description"),
        );
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecondaryComplaint {
    pub description: String,
    pub duration: String,
    pub vas: Option<Vas>,
}

impl Check for SecondaryComplaint {
    fn check(&self, path: &str, checker: &mut Checker) {
        checker.vas(self.vas, &join(path, "vas"));
        checker.detail(true, &self.description, &join(path, "description"));
    }
}
