//! Whole-record validation.
//!
//! Records are walked field by field through the [`Check`] trait. Hard
//! errors block persistence; warnings (a finding flagged present without
//! its detail) are reported but never block a save.

use std::fmt;

use chrono::NaiveDate;

use super::{
    today, validate_blood_pressure, validate_date_on, validate_email, validate_height,
    validate_required, validate_required_when_present, validate_vas, validate_visit_id,
    validate_weight, Blank, ValidationError,
};
use crate::models::{Patient, Vas, Visit};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Field paths carrying a hard error.
    pub fn error_fields(&self) -> Vec<String> {
        self.errors.iter().filter_map(field_of).collect()
    }

    pub fn warning_fields(&self) -> Vec<String> {
        self.warnings.iter().filter_map(field_of).collect()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.errors.iter().map(ToString::to_string).collect();
        write!(f, "{}", messages.join("; "))
    }
}

fn field_of(e: &ValidationError) -> Option<String> {
    match e {
        ValidationError::VasOutOfRange { field, .. }
        | ValidationError::InvalidDate { field, .. }
        | ValidationError::FutureDate { field, .. }
        | ValidationError::Required { field }
        | ValidationError::RequiredWhenPresent { field }
        | ValidationError::InvalidEnum { field, .. }
        | ValidationError::OutOfRange { field, .. }
        | ValidationError::InvalidBloodPressure { field, .. }
        | ValidationError::InvalidEmail { field, .. } => Some(field.clone()),
        ValidationError::InvalidVisitId(_) => Some("id".into()),
        ValidationError::VisitIdSpaceExhausted { .. } => None,
    }
}

/// Accumulates findings while a record is walked.
#[derive(Debug)]
pub struct Checker {
    today: NaiveDate,
    report: ValidationReport,
}

impl Checker {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            report: ValidationReport::default(),
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn finish(self) -> ValidationReport {
        self.report
    }

    /// Record a blocking failure.
    pub fn hard(&mut self, result: Result<(), ValidationError>) {
        if let Err(e) = result {
            self.report.errors.push(e);
        }
    }

    /// Record a non-blocking failure.
    pub fn soft(&mut self, result: Result<(), ValidationError>) {
        if let Err(e) = result {
            self.report.warnings.push(e);
        }
    }

    pub fn vas(&mut self, vas: Option<Vas>, path: &str) {
        if let Some(v) = vas {
            self.hard(validate_vas(v.0, path));
        }
    }

    pub fn date(&mut self, s: &str, path: &str) {
        self.hard(validate_date_on(s, path, self.today));
    }

    pub fn detail<T: Blank + ?Sized>(&mut self, present: bool, value: &T, path: &str) {
        self.soft(validate_required_when_present(present, value, path));
    }
}

/// A node of a record that can be validated in place.
pub trait Check {
    fn check(&self, path: &str, checker: &mut Checker);
}

impl<T: Check> Check for Option<T> {
    fn check(&self, path: &str, checker: &mut Checker) {
        if let Some(inner) = self {
            inner.check(path, checker);
        }
    }
}

impl<T: Check> Check for Vec<T> {
    fn check(&self, path: &str, checker: &mut Checker) {
        for (i, item) in self.iter().enumerate() {
            item.check(&format!("{path}[{i}]"), checker);
        }
    }
}

impl Check for Vas {
    fn check(&self, path: &str, checker: &mut Checker) {
        checker.vas(Some(*self), path);
    }
}

pub fn join(path: &str, field: &str) -> String {
    if path.is_empty() {
        field.to_string()
    } else {
        format!("{path}.{field}")
    }
}

/// Implement [`Check`] for a composite type by walking the listed fields.
macro_rules! check_fields {
    ($ty:ty { $($field:ident),+ $(,)? }) => {
        impl $crate::validation::Check for $ty {
            fn check(&self, path: &str, checker: &mut $crate::validation::Checker) {
                $(
                    $crate::validation::Check::check(
                        &self.$field,
                        &$crate::validation::record::join(path, stringify!($field)),
                        checker,
                    );
                )+
            }
        }
    };
}

/// Detail records made only of free text and flags.
macro_rules! unchecked {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::validation::Check for $ty {
                fn check(&self, _path: &str, _checker: &mut $crate::validation::Checker) {}
            }
        )+
    };
}

pub(crate) use check_fields;
pub(crate) use unchecked;

pub fn validate_patient(patient: &Patient) -> ValidationReport {
    validate_patient_on(patient, today())
}

pub fn validate_patient_on(patient: &Patient, today: NaiveDate) -> ValidationReport {
    let mut checker = Checker::new(today);
    checker.hard(validate_required(&patient.id, "id"));
    patient.check("", &mut checker);
    checker.finish()
}

pub fn validate_visit(visit: &Visit) -> ValidationReport {
    validate_visit_on(visit, today())
}

pub fn validate_visit_on(visit: &Visit, today: NaiveDate) -> ValidationReport {
    let mut checker = Checker::new(today);
    checker.hard(validate_visit_id(&visit.id));
    checker.hard(validate_required(&visit.patient_id, "patient_id"));
    checker.hard(validate_required(&visit.visit_date, "visit_date"));
    checker.hard(validate_required(&visit.osteopath, "osteopath"));
    visit.check("", &mut checker);
    checker.finish()
}

/// Measurement checks shared by visit measurements and pediatric records.
pub(crate) fn check_weight(kg: Option<f64>, path: &str, checker: &mut Checker) {
    if let Some(kg) = kg {
        checker.hard(validate_weight(kg, path));
    }
}

pub(crate) fn check_height(cm: Option<f64>, path: &str, checker: &mut Checker) {
    if let Some(cm) = cm {
        checker.hard(validate_height(cm, path));
    }
}

pub(crate) fn check_blood_pressure(s: &str, path: &str, checker: &mut Checker) {
    checker.hard(validate_blood_pressure(s, path));
}

pub(crate) fn check_email(s: &str, path: &str, checker: &mut Checker) {
    checker.soft(validate_email(s, path));
}
