use serde::{Deserialize, Serialize};

use super::enums::{DeliveryType, DiabetesType, PathologyStatus, SmokingStatus, WorkType};
use crate::validation::record::{check_fields, check_height, check_weight, join};
use crate::validation::{Check, Checker};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClinicalHistory {
    pub chronic: ChronicConditions,
    pub lifestyle: Lifestyle,
    pub therapies: Vec<Therapy>,
    pub interventions: Vec<InterventionOrTrauma>,
    pub diagnostic_tests: Vec<DiagnosticTest>,
    pub pediatric: Option<PediatricHistory>,
}

check_fields!(ClinicalHistory {
    chronic,
    lifestyle,
    therapies,
    interventions,
    diagnostic_tests,
    pediatric,
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChronicConditions {
    pub drug_allergies: Vec<String>,
    pub diabetes: Option<DiabetesType>,
    pub hypertension: bool,
    pub heart_disease: bool,
    pub thyroid_disorder: bool,
    pub osteoporosis: bool,
    pub other_pathologies: Vec<Pathology>,
}

check_fields!(ChronicConditions { other_pathologies });

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pathology {
    pub name: String,
    pub onset_date: String,
    pub status: Option<PathologyStatus>,
    pub note: String,
}

impl Check for Pathology {
    fn check(&self, path: &str, checker: &mut Checker) {
        checker.date(&self.onset_date, &join(path, "onset_date"));
        checker.detail(true, &self.name, &join(path, "name"));
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lifestyle {
    pub smoking: Option<SmokingDetail>,
    pub work: Option<WorkDetail>,
    pub sports: Vec<SportActivity>,
}

impl Check for Lifestyle {
    fn check(&self, path: &str, checker: &mut Checker) {
        if let Some(smoking) = &self.smoking {
            checker.date(&smoking.quit_date, &join(path, "smoking.quit_date"));
            let current = smoking.status == Some(SmokingStatus::Current);
            checker.detail(
                current,
                &smoking.cigarettes_per_day,
                &join(path, "smoking.cigarettes_per_day"),
            );
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmokingDetail {
    pub status: Option<SmokingStatus>,
    pub cigarettes_per_day: Option<u32>,
    pub years: Option<u32>,
    pub quit_date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkDetail {
    pub kind: Option<WorkType>,
    pub hours_per_day: Option<f64>,
    pub posture: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SportActivity {
    pub name: String,
    pub weekly_hours: Option<f64>,
    pub competitive: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Therapy {
    pub drug: String,
    pub dosage: String,
    pub frequency: String,
    pub start_date: String,
    /// `None` while the therapy is ongoing.
    pub end_date: Option<String>,
    pub indication: String,
}

impl Therapy {
    pub fn is_ongoing(&self) -> bool {
        self.end_date.as_deref().map_or(true, |d| d.trim().is_empty())
    }
}

impl Check for Therapy {
    fn check(&self, path: &str, checker: &mut Checker) {
        checker.date(&self.start_date, &join(path, "start_date"));
        if let Some(end) = &self.end_date {
            checker.date(end, &join(path, "end_date"));
        }
        checker.detail(true, &self.drug, &join(path, "drug"));
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterventionOrTrauma {
    pub description: String,
    pub date: String,
    /// True for traumas (falls, accidents), false for surgical interventions.
    pub is_trauma: bool,
    pub sequelae: String,
}

impl Check for InterventionOrTrauma {
    fn check(&self, path: &str, checker: &mut Checker) {
        checker.date(&self.date, &join(path, "date"));
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticTest {
    pub kind: String,
    pub date: String,
    pub body_region: String,
    pub outcome: String,
}

impl Check for DiagnosticTest {
    fn check(&self, path: &str, checker: &mut Checker) {
        checker.date(&self.date, &join(path, "date"));
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PediatricHistory {
    pub pregnancy: Option<PregnancyRecord>,
    pub birth: Option<BirthRecord>,
    pub milestones: Option<DevelopmentalMilestones>,
}

check_fields!(PediatricHistory { pregnancy, birth });

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PregnancyRecord {
    pub complications: bool,
    pub complication_notes: String,
    pub gestational_weeks: Option<u32>,
    pub maternal_medications: Vec<String>,
}

impl Check for PregnancyRecord {
    fn check(&self, path: &str, checker: &mut Checker) {
        checker.detail(
            self.complications,
            &self.complication_notes,
            &join(path, "complication_notes"),
        );
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BirthRecord {
    pub delivery: Option<DeliveryType>,
    pub weight_kg: Option<f64>,
    pub length_cm: Option<f64>,
    pub apgar_score: Option<u32>,
    pub complications: String,
}

impl Check for BirthRecord {
    fn check(&self, path: &str, checker: &mut Checker) {
        check_weight(self.weight_kg, &join(path, "weight_kg"), checker);
        check_height(self.length_cm, &join(path, "length_cm"), checker);
    }
}

/// Age in months at which each milestone was reached.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DevelopmentalMilestones {
    pub head_control_months: Option<u32>,
    pub sitting_months: Option<u32>,
    pub crawling_months: Option<u32>,
    pub walking_months: Option<u32>,
    pub first_words_months: Option<u32>,
    pub notes: String,
}
