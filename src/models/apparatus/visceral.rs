//! Respiratory, cardiovascular, gastrointestinal, urinary and reproductive
//! apparatus.

use serde::{Deserialize, Serialize};

use crate::models::enums::{CoughKind, Frequency, Side, StoolConsistency};
use crate::models::shapes::{FlagWithFrequency, FlagWithList, FlagWithNote, FlagWithVas, PainDetail};
use crate::validation::record::{check_fields, join, unchecked};
use crate::validation::{Check, Checker};

// ── Respiratory ─────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RespiratoryApparatus {
    pub dyspnea: Option<FlagWithFrequency>,
    pub cough: Option<CoughFindings>,
    pub asthma: Option<FlagWithNote>,
    pub recurrent_infections: Option<FlagWithFrequency>,
    /// Items are the known triggers (pollen, dust, ...).
    pub allergic_rhinitis: Option<FlagWithList<AllergyDetail>>,
    pub sinusitis: Option<FlagWithNote>,
    pub sleep_apnea: Option<FlagWithNote>,
    pub snoring: bool,
}

check_fields!(RespiratoryApparatus {
    dyspnea,
    cough,
    asthma,
    recurrent_infections,
    allergic_rhinitis,
    sinusitis,
    sleep_apnea,
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoughFindings {
    pub present: bool,
    pub kind: Option<CoughKind>,
    pub frequency: Option<Frequency>,
    pub nocturnal: bool,
}

impl Check for CoughFindings {
    fn check(&self, path: &str, checker: &mut Checker) {
        checker.detail(self.present, &self.frequency, &join(path, "frequency"));
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllergyDetail {
    pub seasonal: bool,
    pub treatment: String,
}

// ── Cardiovascular ──────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardiovascularApparatus {
    pub hypertension: Option<FlagWithNote>,
    pub palpitations: Option<FlagWithFrequency>,
    pub chest_pain: Option<FlagWithVas>,
    /// Items are the swollen areas.
    pub edema: Option<FlagWithList<EdemaDetail>>,
    pub varicose_veins: Option<FlagWithNote>,
    pub anticoagulants: Option<FlagWithNote>,
    pub cold_extremities: bool,
}

check_fields!(CardiovascularApparatus {
    hypertension,
    palpitations,
    chest_pain,
    edema,
    varicose_veins,
    anticoagulants,
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdemaDetail {
    pub side: Option<Side>,
    pub pitting: bool,
    pub worse_in_evening: bool,
    pub note: String,
}

// ── Gastrointestinal ────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GastrointestinalApparatus {
    pub reflux: Option<FlagWithFrequency>,
    /// Items are abdominal quadrants.
    pub abdominal_pain: Option<FlagWithList<PainDetail>>,
    pub bowel: Option<BowelFindings>,
    pub nausea: Option<FlagWithFrequency>,
    /// Items are the offending foods.
    pub food_intolerances: Option<FlagWithList<IntoleranceDetail>>,
    pub hernia: Option<FlagWithNote>,
}

check_fields!(GastrointestinalApparatus {
    reflux,
    abdominal_pain,
    bowel,
    nausea,
    food_intolerances,
    hernia,
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BowelFindings {
    pub constipation: Option<FlagWithFrequency>,
    pub diarrhea: Option<FlagWithFrequency>,
    pub bloating: Option<FlagWithNote>,
    pub consistency: Option<StoolConsistency>,
    pub movements_per_week: Option<u32>,
}

check_fields!(BowelFindings {
    constipation,
    diarrhea,
    bloating,
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntoleranceDetail {
    pub confirmed_by_test: bool,
    pub symptoms: String,
}

// ── Urinary ─────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UrinaryApparatus {
    pub incontinence: Option<FlagWithFrequency>,
    pub urgency: Option<FlagWithNote>,
    pub nocturia: Option<FlagWithFrequency>,
    pub recurrent_infections: Option<FlagWithFrequency>,
    pub dysuria: Option<FlagWithVas>,
    pub kidney_stones: Option<FlagWithNote>,
}

check_fields!(UrinaryApparatus {
    incontinence,
    urgency,
    nocturia,
    recurrent_infections,
    dysuria,
    kidney_stones,
});

// ── Reproductive ────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReproductiveApparatus {
    pub menstrual: Option<MenstrualFindings>,
    pub obstetric: Option<ObstetricHistory>,
    pub pelvic_pain: Option<FlagWithVas>,
    pub contraception: Option<FlagWithNote>,
    pub sexual_dysfunction: Option<FlagWithNote>,
    pub prostate: Option<FlagWithNote>,
}

check_fields!(ReproductiveApparatus {
    menstrual,
    obstetric,
    pelvic_pain,
    contraception,
    sexual_dysfunction,
    prostate,
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenstrualFindings {
    pub regular_cycle: bool,
    pub cycle_length_days: Option<u32>,
    pub dysmenorrhea: Option<FlagWithVas>,
    pub premenstrual_syndrome: Option<FlagWithNote>,
    pub menopause: Option<MenopauseDetail>,
}

check_fields!(MenstrualFindings {
    dysmenorrhea,
    premenstrual_syndrome,
    menopause,
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenopauseDetail {
    pub present: bool,
    pub since: String,
    pub hormone_therapy: Option<FlagWithNote>,
}

impl Check for MenopauseDetail {
    fn check(&self, path: &str, checker: &mut Checker) {
        let since = join(path, "since");
        checker.date(&self.since, &since);
        checker.detail(self.present, &self.since, &since);
        self.hormone_therapy
            .check(&join(path, "hormone_therapy"), checker);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObstetricHistory {
    pub pregnancies: u32,
    pub deliveries: u32,
    pub cesareans: u32,
    pub miscarriages: u32,
    pub last_delivery_date: String,
}

impl Check for ObstetricHistory {
    fn check(&self, path: &str, checker: &mut Checker) {
        checker.date(&self.last_delivery_date, &join(path, "last_delivery_date"));
    }
}

unchecked!(AllergyDetail, EdemaDetail, IntoleranceDetail);
