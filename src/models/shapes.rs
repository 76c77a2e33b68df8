//! Reusable leaf shapes of the apparatus questionnaires.
//!
//! Nearly every finding in an apparatus tree is one of these: a bare flag
//! (plain `bool`), a flag with a note, a flag with a VAS score, a flag with
//! a frequency, or a flag with a list of sites/triggers and a detail object.

use serde::{Deserialize, Serialize};

use super::enums::Frequency;
use crate::validation::record::join;
use crate::validation::{Blank, Check, Checker};

/// Visual Analog Scale score. Valid range is 0..=10; out-of-range values
/// are representable so that validation can reject them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vas(pub i32);

// A recorded score or frequency is filled in, zero included.
impl Blank for Vas {
    fn is_blank(&self) -> bool {
        false
    }
}

impl Blank for Frequency {
    fn is_blank(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlagWithNote {
    pub present: bool,
    pub note: String,
}

impl FlagWithNote {
    pub fn present(note: impl Into<String>) -> Self {
        Self {
            present: true,
            note: note.into(),
        }
    }

    /// Marked present with no note yet.
    pub fn flagged() -> Self {
        Self::present("")
    }
}

impl Check for FlagWithNote {
    fn check(&self, path: &str, checker: &mut Checker) {
        checker.detail(self.present, &self.note, &join(path, "note"));
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlagWithVas {
    pub present: bool,
    pub vas: Option<Vas>,
    pub note: String,
}

impl FlagWithVas {
    pub fn present(vas: Vas, note: impl Into<String>) -> Self {
        Self {
            present: true,
            vas: Some(vas),
            note: note.into(),
        }
    }
}

impl Check for FlagWithVas {
    fn check(&self, path: &str, checker: &mut Checker) {
        let vas_path = join(path, "vas");
        checker.vas(self.vas, &vas_path);
        checker.detail(self.present, &self.vas, &vas_path);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlagWithFrequency {
    pub present: bool,
    pub frequency: Option<Frequency>,
    pub note: String,
}

impl FlagWithFrequency {
    pub fn present(frequency: Frequency, note: impl Into<String>) -> Self {
        Self {
            present: true,
            frequency: Some(frequency),
            note: note.into(),
        }
    }
}

impl Check for FlagWithFrequency {
    fn check(&self, path: &str, checker: &mut Checker) {
        checker.detail(self.present, &self.frequency, &join(path, "frequency"));
    }
}

/// A finding with sites (or triggers) and a structured detail record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlagWithList<D> {
    pub present: bool,
    pub items: Vec<String>,
    pub detail: Option<D>,
}

impl<D> Default for FlagWithList<D> {
    fn default() -> Self {
        Self {
            present: false,
            items: Vec::new(),
            detail: None,
        }
    }
}

impl<D> FlagWithList<D> {
    pub fn present<I, S>(items: I, detail: D) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            present: true,
            items: items.into_iter().map(Into::into).collect(),
            detail: Some(detail),
        }
    }
}

impl<D: Check> Check for FlagWithList<D> {
    fn check(&self, path: &str, checker: &mut Checker) {
        checker.detail(self.present, &self.items, &join(path, "items"));
        self.detail.check(&join(path, "detail"), checker);
    }
}

/// Pain details shared by several list-shaped findings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PainDetail {
    pub vas: Option<Vas>,
    pub character: Option<super::enums::PainCharacter>,
    pub frequency: Option<Frequency>,
    pub radiation: String,
    pub aggravating: Vec<String>,
    pub relieving: Vec<String>,
    pub note: String,
}

impl Check for PainDetail {
    fn check(&self, path: &str, checker: &mut Checker) {
        checker.vas(self.vas, &join(path, "vas"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn run<T: Check>(node: &T) -> crate::validation::ValidationReport {
        let mut checker = Checker::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        node.check("node", &mut checker);
        checker.finish()
    }

    #[test]
    fn absent_findings_have_no_warnings() {
        let report = run(&FlagWithNote::default());
        assert!(report.warnings.is_empty());
        let report = run(&FlagWithList::<PainDetail>::default());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn flagged_vas_without_score_warns() {
        let report = run(&FlagWithVas {
            present: true,
            ..Default::default()
        });
        assert!(report.is_valid());
        assert_eq!(report.warning_fields(), vec!["node.vas".to_string()]);
    }

    #[test]
    fn vas_zero_counts_as_filled_in() {
        let report = run(&FlagWithVas::present(Vas(0), ""));
        assert!(report.warnings.is_empty());
        assert!(report.is_valid());
    }

    #[test]
    fn list_detail_is_walked() {
        let finding = FlagWithList::present(
            ["lumbar"],
            PainDetail {
                vas: Some(Vas(15)),
                ..Default::default()
            },
        );
        let report = run(&finding);
        assert_eq!(report.error_fields(), vec!["node.detail.vas".to_string()]);
    }

    #[test]
    fn flagged_frequency_without_value_warns() {
        let report = run(&FlagWithFrequency {
            present: true,
            ..Default::default()
        });
        assert_eq!(report.warning_fields(), vec!["node.frequency".to_string()]);
    }

    #[test]
    fn absent_sub_object_is_persisted_as_null() {
        let json = serde_json::to_value(FlagWithList::<PainDetail>::default()).unwrap();
        assert!(json["detail"].is_null());
    }
}
