//! Apparatus evaluation: twelve independent body-system questionnaires
//! attached to a visit. Every system is optional and absent until the
//! practitioner fills it in.

mod structural;
mod systemic;
mod visceral;

use serde::{Deserialize, Serialize};

pub use structural::*;
pub use systemic::*;
pub use visceral::*;

use crate::validation::record::check_fields;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApparatusEvaluation {
    pub cranial: Option<CranialApparatus>,
    pub respiratory: Option<RespiratoryApparatus>,
    pub cardiovascular: Option<CardiovascularApparatus>,
    pub gastrointestinal: Option<GastrointestinalApparatus>,
    pub urinary: Option<UrinaryApparatus>,
    pub reproductive: Option<ReproductiveApparatus>,
    pub psycho_neuro_endocrine: Option<PsychoNeuroEndocrineApparatus>,
    pub skin_nails: Option<SkinNailsApparatus>,
    pub metabolic: Option<MetabolicApparatus>,
    pub lymphatic: Option<LymphaticApparatus>,
    pub musculoskeletal: Option<MusculoskeletalApparatus>,
    pub nervous: Option<NervousApparatus>,
}

check_fields!(ApparatusEvaluation {
    cranial,
    respiratory,
    cardiovascular,
    gastrointestinal,
    urinary,
    reproductive,
    psycho_neuro_endocrine,
    skin_nails,
    metabolic,
    lymphatic,
    musculoskeletal,
    nervous,
});

impl ApparatusEvaluation {
    /// Names of the systems that have been filled in, in questionnaire order.
    pub fn evaluated_systems(&self) -> Vec<&'static str> {
        let slots: [(&'static str, bool); 12] = [
            ("cranial", self.cranial.is_some()),
            ("respiratory", self.respiratory.is_some()),
            ("cardiovascular", self.cardiovascular.is_some()),
            ("gastrointestinal", self.gastrointestinal.is_some()),
            ("urinary", self.urinary.is_some()),
            ("reproductive", self.reproductive.is_some()),
            ("psycho_neuro_endocrine", self.psycho_neuro_endocrine.is_some()),
            ("skin_nails", self.skin_nails.is_some()),
            ("metabolic", self.metabolic.is_some()),
            ("lymphatic", self.lymphatic.is_some()),
            ("musculoskeletal", self.musculoskeletal.is_some()),
            ("nervous", self.nervous.is_some()),
        ];
        slots
            .into_iter()
            .filter_map(|(name, set)| set.then_some(name))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.evaluated_systems().is_empty()
    }
}
