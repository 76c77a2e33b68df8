use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::clinical_history::ClinicalHistory;
use super::enums::{AddressType, MaritalStatus, Sex};
use crate::validation::record::{check_email, join};
use crate::validation::{parse_iso_date, validate_age, Check, Checker};

/// Age below which parent details are expected.
pub const ADULT_AGE_YEARS: i32 = 18;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Patient {
    pub id: String,
    pub name: String,
    pub surname: String,
    /// `YYYY-MM-DD`, or blank when unknown.
    pub birth_date: String,
    pub sex: Option<Sex>,
    pub birthplace: String,
    pub tax_code: String,
    pub phone: String,
    pub email: String,
    pub profession: String,
    pub marital_status: Option<MaritalStatus>,
    pub nationality: String,
    pub address: Option<Address>,
    pub privacy: PrivacyConsent,
    pub parents: Option<ParentInfo>,
    pub physician: Option<PhysicianRef>,
    pub clinical_history: Option<ClinicalHistory>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub zip: String,
    pub province: String,
    pub country: String,
    pub kind: Option<AddressType>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrivacyConsent {
    pub treatment_consent: bool,
    pub data_processing_consent: bool,
    pub marketing_consent: bool,
    pub consent_date: String,
    pub notes: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParentInfo {
    pub father_name: String,
    pub father_contact: String,
    pub mother_name: String,
    pub mother_contact: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicianRef {
    pub name: String,
    pub contact: String,
    pub specialization: String,
}

impl Patient {
    /// New patient with an assigned id and every optional section absent.
    pub fn create(id: impl Into<String>, name: impl Into<String>, surname: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            surname: surname.into(),
            ..Default::default()
        }
    }

    /// Blank patient used while a record is being filled in; the id is
    /// assigned before the first save.
    pub fn new_empty() -> Self {
        Self::default()
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.name.trim(), self.surname.trim())
            .trim()
            .to_string()
    }

    /// Completed years on `today`, or `None` when the birth date is blank
    /// or malformed.
    pub fn age_on(&self, today: NaiveDate) -> Option<i32> {
        let birth = parse_iso_date(&self.birth_date)?;
        Some(years_between(birth, today))
    }

    pub fn is_minor_on(&self, today: NaiveDate) -> bool {
        self.age_on(today).is_some_and(|age| age < ADULT_AGE_YEARS)
    }

    pub fn city(&self) -> Option<&str> {
        self.address.as_ref().map(|a| a.city.as_str())
    }
}

pub(crate) fn years_between(birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut years = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        years -= 1;
    }
    years
}

impl Check for Patient {
    fn check(&self, path: &str, checker: &mut Checker) {
        checker.soft(crate::validation::validate_required(&self.name, &join(path, "name")));
        checker.soft(crate::validation::validate_required(
            &self.surname,
            &join(path, "surname"),
        ));

        let birth_path = join(path, "birth_date");
        checker.date(&self.birth_date, &birth_path);
        if let Some(age) = self.age_on(checker.today()) {
            checker.hard(validate_age(age, &birth_path));
            if age < ADULT_AGE_YEARS && self.parents.is_none() {
                checker.detail(true, &None::<String>, &join(path, "parents"));
            }
        }

        check_email(&self.email, &join(path, "email"), checker);
        self.privacy.check(&join(path, "privacy"), checker);
        self.clinical_history
            .check(&join(path, "clinical_history"), checker);
    }
}

impl Check for PrivacyConsent {
    fn check(&self, path: &str, checker: &mut Checker) {
        checker.date(&self.consent_date, &join(path, "consent_date"));
        let any_consent =
            self.treatment_consent || self.data_processing_consent || self.marketing_consent;
        checker.detail(any_consent, &self.consent_date, &join(path, "consent_date"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn full_name_concatenates_and_trims() {
        let p = Patient::create("PAT001", " Mario ", "Rossi");
        assert_eq!(p.full_name(), "Mario Rossi");
        let p = Patient::create("PAT002", "", "Bianchi");
        assert_eq!(p.full_name(), "Bianchi");
    }

    #[test]
    fn age_counts_completed_years() {
        let mut p = Patient::create("PAT001", "Anna", "Verdi");
        p.birth_date = "2000-06-15".into();
        assert_eq!(p.age_on(day(2024, 6, 14)), Some(23));
        assert_eq!(p.age_on(day(2024, 6, 15)), Some(24));
        p.birth_date.clear();
        assert_eq!(p.age_on(day(2024, 6, 15)), None);
    }

    #[test]
    fn factory_leaves_optional_sections_absent() {
        let p = Patient::create("PAT001", "Anna", "Verdi");
        assert!(p.address.is_none());
        assert!(p.parents.is_none());
        assert!(p.physician.is_none());
        assert!(p.clinical_history.is_none());
        assert!(!p.privacy.treatment_consent);
    }

    #[test]
    fn minor_without_parents_warns() {
        let mut p = Patient::create("PAT003", "Luca", "Neri");
        p.birth_date = "2015-03-01".into();
        let report = crate::validation::validate_patient_on(&p, day(2024, 1, 1));
        assert!(report.is_valid());
        assert!(report.warning_fields().contains(&"parents".to_string()));
    }

    #[test]
    fn consent_without_date_warns() {
        let mut p = Patient::create("PAT004", "Sara", "Gialli");
        p.privacy.treatment_consent = true;
        let report = crate::validation::validate_patient_on(&p, day(2024, 1, 1));
        assert!(report.is_valid());
        assert_eq!(report.warning_fields(), vec!["privacy.consent_date".to_string()]);
    }

    #[test]
    fn malformed_email_warns() {
        let mut p = Patient::create("PAT005", "Sara", "Gialli");
        p.email = "sara.gialli".into();
        let report = crate::validation::validate_patient_on(&p, day(2024, 1, 1));
        assert!(report.is_valid());
        assert_eq!(report.warning_fields(), vec!["email".to_string()]);
    }
}
