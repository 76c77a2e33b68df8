//! Identifier generation for patients and visits.

use crate::validation::{parse_iso_date, ValidationError};

/// Highest collision suffix a visit id may carry (`_99`).
pub const MAX_VISIT_ID_SUFFIX: u32 = 99;

const VISIT_ID_PREFIX_LEN: usize = 3;

/// Sequential patient id for the record following `count` existing ones:
/// `PAT001`, `PAT002`, ... widening past `PAT999`.
pub fn generate_patient_id(count: u64) -> String {
    format!("PAT{:03}", count + 1)
}

/// `VIS_<ABC>_<yyyy>_<mm>_<dd>` where `ABC` is the first three ASCII
/// alphanumerics of the patient id, uppercased and padded with `X`.
pub fn visit_id_base(patient_id: &str, visit_date: &str) -> Result<String, ValidationError> {
    let date = parse_iso_date(visit_date).ok_or_else(|| ValidationError::InvalidDate {
        field: "visit_date".into(),
        value: visit_date.into(),
    })?;

    let mut prefix: String = patient_id
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(VISIT_ID_PREFIX_LEN)
        .map(|c| c.to_ascii_uppercase())
        .collect();
    while prefix.len() < VISIT_ID_PREFIX_LEN {
        prefix.push('X');
    }

    Ok(format!("VIS_{prefix}_{}", date.format("%Y_%m_%d")))
}

/// First free visit id for this patient and day. `exists` is asked about
/// each candidate in turn: the bare base, then `_01` through `_99`.
pub fn generate_unique_visit_id<E, F>(
    patient_id: &str,
    visit_date: &str,
    mut exists: F,
) -> Result<String, E>
where
    E: From<ValidationError>,
    F: FnMut(&str) -> Result<bool, E>,
{
    let base = visit_id_base(patient_id, visit_date)?;
    if !exists(&base)? {
        return Ok(base);
    }
    for suffix in 1..=MAX_VISIT_ID_SUFFIX {
        let candidate = format!("{base}_{suffix:02}");
        if !exists(&candidate)? {
            return Ok(candidate);
        }
    }
    Err(ValidationError::VisitIdSpaceExhausted { base }.into())
}
