//! Field validators for patient and visit records.
//!
//! Every validator is a pure function: a `bool` predicate for quick form
//! checks, and a `validate_*` twin returning a [`ValidationError`] with a
//! readable reason. Whole-record walks live in [`record`].

pub mod record;

use std::sync::LazyLock;

use chrono::{Local, NaiveDate};
use regex::Regex;
use thiserror::Error;

pub use crate::ids::{generate_unique_visit_id, visit_id_base};
pub use record::{
    validate_patient, validate_patient_on, validate_visit, validate_visit_on, Check, Checker,
    ValidationReport,
};

/// Inclusive VAS bounds.
pub const VAS_MIN: i32 = 0;
pub const VAS_MAX: i32 = 10;

pub const MAX_AGE_YEARS: i32 = 120;
pub const MAX_WEIGHT_KG: f64 = 500.0;
pub const MAX_HEIGHT_CM: f64 = 280.0;

/// ISO calendar date format used by every date field.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

static VISIT_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^VIS_[A-Z0-9]{3}_[0-9]{4}_[0-9]{2}_[0-9]{2}(_[0-9]{2})?$").unwrap());

static BLOOD_PRESSURE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([0-9]{2,3})\s*/\s*([0-9]{2,3})\s*$").unwrap());

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{field}: VAS score {value} is outside 0-10")]
    VasOutOfRange { field: String, value: i32 },

    #[error("{field}: '{value}' is not a valid date (expected YYYY-MM-DD)")]
    InvalidDate { field: String, value: String },

    #[error("{field}: {value} is in the future")]
    FutureDate { field: String, value: String },

    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} should be filled in when the finding is marked present")]
    RequiredWhenPresent { field: String },

    #[error("{field}: '{value}' is not one of [{allowed}]")]
    InvalidEnum {
        field: String,
        value: String,
        allowed: String,
    },

    #[error("'{0}' is not a valid visit id (expected VIS_XXX_YYYY_MM_DD[_NN])")]
    InvalidVisitId(String),

    #[error("{field}: {value} is outside {min}..={max}")]
    OutOfRange {
        field: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{field}: '{value}' is not a blood pressure reading (expected systolic/diastolic)")]
    InvalidBloodPressure { field: String, value: String },

    #[error("{field}: '{value}' is not a valid email address")]
    InvalidEmail { field: String, value: String },

    #[error("every visit id derived from {base} is already taken")]
    VisitIdSpaceExhausted { base: String },
}

// ── VAS ─────────────────────────────────────────────────────

pub fn is_valid_vas(v: i32) -> bool {
    (VAS_MIN..=VAS_MAX).contains(&v)
}

pub fn validate_vas(v: i32, field: &str) -> Result<(), ValidationError> {
    if is_valid_vas(v) {
        Ok(())
    } else {
        Err(ValidationError::VasOutOfRange {
            field: field.into(),
            value: v,
        })
    }
}

// ── Dates ───────────────────────────────────────────────────

/// Today's date in the system's local timezone.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parse a strict `YYYY-MM-DD` string.
pub fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    // chrono accepts unpadded fields and surrounding whitespace; stored dates
    // must sort lexicographically.
    if s.len() != 10 || s.trim() != s {
        return None;
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT).ok()
}

/// Blank, or a calendar date that is not after today.
pub fn is_valid_date(s: &str) -> bool {
    is_valid_date_on(s, today())
}

pub fn is_valid_date_on(s: &str, today: NaiveDate) -> bool {
    validate_date_on(s, "date", today).is_ok()
}

pub fn validate_date(s: &str, field: &str) -> Result<(), ValidationError> {
    validate_date_on(s, field, today())
}

pub fn validate_date_on(s: &str, field: &str, today: NaiveDate) -> Result<(), ValidationError> {
    if s.trim().is_empty() {
        return Ok(());
    }
    let date = parse_iso_date(s).ok_or_else(|| ValidationError::InvalidDate {
        field: field.into(),
        value: s.into(),
    })?;
    if date > today {
        return Err(ValidationError::FutureDate {
            field: field.into(),
            value: s.into(),
        });
    }
    Ok(())
}

// ── Enumerations ────────────────────────────────────────────

/// Blank, or `s` (trimmed, case-insensitive) is one of `allowed`.
pub fn is_valid_enum_value(s: &str, allowed: &[&str]) -> bool {
    let s = s.trim();
    s.is_empty() || allowed.iter().any(|a| a.eq_ignore_ascii_case(s))
}

pub fn validate_enum_value(s: &str, allowed: &[&str], field: &str) -> Result<(), ValidationError> {
    if is_valid_enum_value(s, allowed) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEnum {
            field: field.into(),
            value: s.into(),
            allowed: allowed.join(", "),
        })
    }
}

// ── Required fields ─────────────────────────────────────────

/// Values that can be "not filled in": empty text, zero, `None`, empty list.
pub trait Blank {
    fn is_blank(&self) -> bool;
}

impl Blank for str {
    fn is_blank(&self) -> bool {
        self.trim().is_empty()
    }
}

impl Blank for String {
    fn is_blank(&self) -> bool {
        self.as_str().is_blank()
    }
}

impl Blank for i32 {
    fn is_blank(&self) -> bool {
        *self == 0
    }
}

impl Blank for u32 {
    fn is_blank(&self) -> bool {
        *self == 0
    }
}

impl Blank for f64 {
    fn is_blank(&self) -> bool {
        *self == 0.0
    }
}

impl<T: Blank> Blank for Option<T> {
    fn is_blank(&self) -> bool {
        self.as_ref().map_or(true, Blank::is_blank)
    }
}

impl<T> Blank for Vec<T> {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

pub fn validate_required<T: Blank + ?Sized>(value: &T, field: &str) -> Result<(), ValidationError> {
    if value.is_blank() {
        Err(ValidationError::Required { field: field.into() })
    } else {
        Ok(())
    }
}

/// Fails iff `parent_flag` is set and `value` is blank.
pub fn validate_required_when_present<T: Blank + ?Sized>(
    parent_flag: bool,
    value: &T,
    field: &str,
) -> Result<(), ValidationError> {
    if parent_flag && value.is_blank() {
        Err(ValidationError::RequiredWhenPresent { field: field.into() })
    } else {
        Ok(())
    }
}

// ── Numeric ranges ──────────────────────────────────────────

pub fn is_valid_age(years: i32) -> bool {
    (0..=MAX_AGE_YEARS).contains(&years)
}

pub fn is_valid_weight(kg: f64) -> bool {
    kg > 0.0 && kg <= MAX_WEIGHT_KG
}

pub fn is_valid_height(cm: f64) -> bool {
    cm > 0.0 && cm <= MAX_HEIGHT_CM
}

pub fn validate_weight(kg: f64, field: &str) -> Result<(), ValidationError> {
    range_check(is_valid_weight(kg), kg, 0.0, MAX_WEIGHT_KG, field)
}

pub fn validate_height(cm: f64, field: &str) -> Result<(), ValidationError> {
    range_check(is_valid_height(cm), cm, 0.0, MAX_HEIGHT_CM, field)
}

pub fn validate_age(years: i32, field: &str) -> Result<(), ValidationError> {
    range_check(
        is_valid_age(years),
        f64::from(years),
        0.0,
        f64::from(MAX_AGE_YEARS),
        field,
    )
}

fn range_check(ok: bool, value: f64, min: f64, max: f64, field: &str) -> Result<(), ValidationError> {
    if ok {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field: field.into(),
            value,
            min,
            max,
        })
    }
}

// ── Formats ─────────────────────────────────────────────────

/// Blank, or `systolic/diastolic` with systolic above diastolic.
pub fn is_valid_blood_pressure(s: &str) -> bool {
    if s.trim().is_empty() {
        return true;
    }
    let Some(caps) = BLOOD_PRESSURE_PATTERN.captures(s) else {
        return false;
    };
    let systolic: u32 = caps[1].parse().unwrap_or(0);
    let diastolic: u32 = caps[2].parse().unwrap_or(0);
    (20..=300).contains(&systolic) && (20..=300).contains(&diastolic) && systolic > diastolic
}

pub fn validate_blood_pressure(s: &str, field: &str) -> Result<(), ValidationError> {
    if is_valid_blood_pressure(s) {
        Ok(())
    } else {
        Err(ValidationError::InvalidBloodPressure {
            field: field.into(),
            value: s.into(),
        })
    }
}

pub fn is_valid_email(s: &str) -> bool {
    s.trim().is_empty() || EMAIL_PATTERN.is_match(s.trim())
}

pub fn validate_email(s: &str, field: &str) -> Result<(), ValidationError> {
    if is_valid_email(s) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail {
            field: field.into(),
            value: s.into(),
        })
    }
}

pub fn is_valid_visit_id(s: &str) -> bool {
    VISIT_ID_PATTERN.is_match(s)
}

pub fn validate_visit_id(s: &str) -> Result<(), ValidationError> {
    if is_valid_visit_id(s) {
        Ok(())
    } else {
        Err(ValidationError::InvalidVisitId(s.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn vas_boundaries() {
        assert!(is_valid_vas(0));
        assert!(is_valid_vas(10));
        assert!(!is_valid_vas(-1));
        assert!(!is_valid_vas(11));
    }

    #[test]
    fn vas_error_names_field() {
        let err = validate_vas(12, "reason.main.vas").unwrap_err();
        assert_eq!(
            err,
            ValidationError::VasOutOfRange {
                field: "reason.main.vas".into(),
                value: 12
            }
        );
        assert!(err.to_string().contains("reason.main.vas"));
    }

    #[test]
    fn date_boundaries() {
        let today = today();
        let tomorrow = today + Duration::days(1);
        assert!(is_valid_date(""));
        assert!(is_valid_date(&today.format(DATE_FORMAT).to_string()));
        assert!(!is_valid_date(&tomorrow.format(DATE_FORMAT).to_string()));
        assert!(!is_valid_date("not-a-date"));
    }

    #[test]
    fn date_against_fixed_today() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert!(is_valid_date_on("2024-06-01", today));
        assert!(is_valid_date_on("2024-02-29", today));
        assert!(!is_valid_date_on("2024-06-02", today));
        assert!(!is_valid_date_on("2023-02-29", today));
        assert!(!is_valid_date_on("2024-6-1", today));
        assert!(!is_valid_date_on(" 2024-05-15", today));
        assert!(!is_valid_date_on("2024-05-15 ", today));
        assert!(is_valid_date_on("   ", today));
        assert_eq!(parse_iso_date(" 2024-05-15"), None);
    }

    #[test]
    fn future_date_error_kind() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let err = validate_date_on("2030-01-01", "visit_date", today).unwrap_err();
        assert!(matches!(err, ValidationError::FutureDate { .. }));
        let err = validate_date_on("01/01/2020", "visit_date", today).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidDate { .. }));
    }

    #[test]
    fn enum_membership() {
        let allowed = ["male", "female", "other"];
        assert!(is_valid_enum_value("", &allowed));
        assert!(is_valid_enum_value("Female", &allowed));
        assert!(!is_valid_enum_value("unknown", &allowed));
        let err = validate_enum_value("x", &allowed, "sex").unwrap_err();
        assert!(err.to_string().contains("male, female, other"));
    }

    #[test]
    fn required_when_present_combinator() {
        assert!(validate_required_when_present(false, "", "note").is_ok());
        assert!(validate_required_when_present(true, "left knee", "note").is_ok());
        assert!(validate_required_when_present(true, "  ", "note").is_err());
        assert!(validate_required_when_present(true, &0_i32, "count").is_err());
        assert!(validate_required_when_present(true, &Some(3_i32), "count").is_ok());
        assert!(validate_required_when_present(true, &None::<String>, "detail").is_err());
        assert!(validate_required_when_present(true, &Vec::<String>::new(), "sites").is_err());
    }

    #[test]
    fn numeric_ranges() {
        assert!(is_valid_age(0));
        assert!(is_valid_age(120));
        assert!(!is_valid_age(-1));
        assert!(!is_valid_age(121));
        assert!(is_valid_weight(72.5));
        assert!(!is_valid_weight(0.0));
        assert!(!is_valid_weight(501.0));
        assert!(is_valid_height(178.0));
        assert!(!is_valid_height(-4.0));
        assert!(matches!(
            validate_weight(900.0, "weight"),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn blood_pressure_format() {
        assert!(is_valid_blood_pressure(""));
        assert!(is_valid_blood_pressure("120/80"));
        assert!(is_valid_blood_pressure(" 135 / 85 "));
        assert!(!is_valid_blood_pressure("80/120"));
        assert!(!is_valid_blood_pressure("120-80"));
        assert!(!is_valid_blood_pressure("high"));
    }

    #[test]
    fn email_format() {
        assert!(is_valid_email(""));
        assert!(is_valid_email("mario.rossi@example.it"));
        assert!(!is_valid_email("mario.rossi"));
        assert!(!is_valid_email("a@b"));
    }

    #[test]
    fn visit_id_format() {
        assert!(is_valid_visit_id("VIS_PAT_2024_06_01"));
        assert!(is_valid_visit_id("VIS_P0X_2024_06_01_07"));
        assert!(!is_valid_visit_id("VIS_pat_2024_06_01"));
        assert!(!is_valid_visit_id("VIS_PA_2024_06_01"));
        assert!(!is_valid_visit_id("VIS_PAT_2024_06_01_7"));
        assert!(!is_valid_visit_id("VIS_PAT_2024-06-01"));
        assert!(!is_valid_visit_id("VIS_PAT_\u{662}\u{660}\u{662}\u{664}_06_01"));
        assert!(!is_valid_visit_id("VIS_PAT_2024_\u{660}6_01"));
    }
}
