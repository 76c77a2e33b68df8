//! Psycho-neuro-endocrine, skin/nails, metabolic and lymphatic apparatus.

use serde::{Deserialize, Serialize};

use crate::models::shapes::{FlagWithFrequency, FlagWithList, FlagWithNote, FlagWithVas};
use crate::validation::record::{check_fields, join, unchecked};
use crate::validation::{Check, Checker};

// ── Psycho-neuro-endocrine ──────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PsychoNeuroEndocrineApparatus {
    pub stress: Option<FlagWithVas>,
    pub anxiety: Option<FlagWithFrequency>,
    pub depression: Option<FlagWithNote>,
    pub sleep: Option<SleepFindings>,
    pub fatigue: Option<FlagWithVas>,
    pub thyroid: Option<FlagWithNote>,
    pub mood_swings: Option<FlagWithFrequency>,
}

check_fields!(PsychoNeuroEndocrineApparatus {
    stress,
    anxiety,
    depression,
    sleep,
    fatigue,
    thyroid,
    mood_swings,
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SleepFindings {
    pub hours_per_night: Option<f64>,
    pub restorative: bool,
    pub insomnia: Option<FlagWithFrequency>,
    pub night_waking: Option<FlagWithFrequency>,
    pub nightmares: bool,
    pub preferred_position: String,
}

check_fields!(SleepFindings {
    insomnia,
    night_waking,
});

// ── Skin and nails ──────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkinNailsApparatus {
    /// Items of each lesion finding are the affected areas.
    pub dermatitis: Option<FlagWithList<SkinLesionDetail>>,
    pub psoriasis: Option<FlagWithList<SkinLesionDetail>>,
    pub scars: Option<FlagWithList<ScarDetail>>,
    pub nail_changes: Option<FlagWithNote>,
    pub hair_loss: Option<FlagWithNote>,
    pub itching: Option<FlagWithFrequency>,
}

check_fields!(SkinNailsApparatus {
    dermatitis,
    psoriasis,
    scars,
    nail_changes,
    hair_loss,
    itching,
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkinLesionDetail {
    pub itching: bool,
    pub seasonal: bool,
    pub treatment: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScarDetail {
    pub origin: String,
    pub date: String,
    pub adherent: bool,
    pub painful: Option<FlagWithVas>,
}

impl Check for ScarDetail {
    fn check(&self, path: &str, checker: &mut Checker) {
        checker.date(&self.date, &join(path, "date"));
        self.painful.check(&join(path, "painful"), checker);
    }
}

// ── Metabolic ───────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetabolicApparatus {
    pub weight_change: Option<WeightChange>,
    pub dyslipidemia: Option<FlagWithNote>,
    pub excessive_thirst: Option<FlagWithNote>,
    pub gout: Option<FlagWithNote>,
    pub diet: Option<DietFindings>,
    pub heat_intolerance: bool,
    pub cold_intolerance: bool,
}

check_fields!(MetabolicApparatus {
    weight_change,
    dyslipidemia,
    excessive_thirst,
    gout,
    diet,
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightChange {
    pub present: bool,
    /// Signed change: negative for weight loss.
    pub kg: Option<f64>,
    pub months: Option<u32>,
    pub intentional: bool,
}

impl Check for WeightChange {
    fn check(&self, path: &str, checker: &mut Checker) {
        checker.detail(self.present, &self.kg, &join(path, "kg"));
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DietFindings {
    pub kind: String,
    pub meals_per_day: Option<u32>,
    pub water_liters_per_day: Option<f64>,
    pub coffee_per_day: Option<u32>,
    pub alcohol: Option<FlagWithFrequency>,
}

check_fields!(DietFindings { alcohol });

// ── Lymphatic ───────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LymphaticApparatus {
    pub lymphedema: Option<FlagWithList<super::EdemaDetail>>,
    /// Items are the node stations (cervical, axillary, inguinal, ...).
    pub swollen_nodes: Option<FlagWithList<LymphNodeDetail>>,
    pub recurrent_infections: Option<FlagWithFrequency>,
    pub lymph_node_removal: Option<FlagWithNote>,
    pub splenectomy: bool,
}

check_fields!(LymphaticApparatus {
    lymphedema,
    swollen_nodes,
    recurrent_infections,
    lymph_node_removal,
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LymphNodeDetail {
    pub painful: bool,
    pub since: String,
}

impl Check for LymphNodeDetail {
    fn check(&self, path: &str, checker: &mut Checker) {
        checker.date(&self.since, &join(path, "since"));
    }
}

unchecked!(SkinLesionDetail);
