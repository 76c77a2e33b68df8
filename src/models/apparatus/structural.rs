//! Cranial, musculoskeletal and nervous apparatus.

use serde::{Deserialize, Serialize};

use crate::models::enums::Side;
use crate::models::shapes::{FlagWithFrequency, FlagWithList, FlagWithNote, FlagWithVas, PainDetail};
use crate::validation::record::{check_fields, unchecked};

// ── Cranial ─────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CranialApparatus {
    /// Items are head regions (frontal, temporal, occipital, ...).
    pub headache: Option<FlagWithList<HeadacheDetail>>,
    pub dizziness: Option<FlagWithVas>,
    pub tinnitus: Option<FlagWithNote>,
    pub visual_disturbances: Option<FlagWithNote>,
    pub head_trauma: Option<FlagWithNote>,
    pub temporomandibular: Option<TemporomandibularFindings>,
    pub sinus_pressure: bool,
}

check_fields!(CranialApparatus {
    headache,
    dizziness,
    tinnitus,
    visual_disturbances,
    head_trauma,
    temporomandibular,
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadacheDetail {
    pub pain: Option<PainDetail>,
    pub triggers: Vec<String>,
    pub aura: bool,
    pub migraine_diagnosed: bool,
}

check_fields!(HeadacheDetail { pain });

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemporomandibularFindings {
    pub clicking: bool,
    pub locking: bool,
    pub pain: Option<FlagWithVas>,
    pub bruxism: Option<FlagWithFrequency>,
    pub malocclusion: Option<FlagWithNote>,
    pub orthodontic_treatment: Option<FlagWithNote>,
}

check_fields!(TemporomandibularFindings {
    pain,
    bruxism,
    malocclusion,
    orthodontic_treatment,
});

// ── Musculoskeletal ─────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MusculoskeletalApparatus {
    pub spine: Option<SpineFindings>,
    pub upper_limbs: Option<UpperLimbFindings>,
    pub lower_limbs: Option<LowerLimbFindings>,
    pub posture: Option<PosturalFindings>,
    pub joint_stiffness: Option<FlagWithFrequency>,
    pub fractures: Option<FlagWithNote>,
    pub muscle_cramps: Option<FlagWithFrequency>,
}

check_fields!(MusculoskeletalApparatus {
    spine,
    upper_limbs,
    lower_limbs,
    posture,
    joint_stiffness,
    fractures,
    muscle_cramps,
});

/// Items of each segment are the painful levels (e.g. "L4-L5").
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpineFindings {
    pub cervical: Option<FlagWithList<PainDetail>>,
    pub thoracic: Option<FlagWithList<PainDetail>>,
    pub lumbar: Option<FlagWithList<PainDetail>>,
    pub sacrococcygeal: Option<FlagWithList<PainDetail>>,
}

check_fields!(SpineFindings {
    cervical,
    thoracic,
    lumbar,
    sacrococcygeal,
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpperLimbFindings {
    pub shoulder: Option<JointFinding>,
    pub elbow: Option<JointFinding>,
    pub wrist_hand: Option<JointFinding>,
}

check_fields!(UpperLimbFindings {
    shoulder,
    elbow,
    wrist_hand,
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LowerLimbFindings {
    pub hip: Option<JointFinding>,
    pub knee: Option<JointFinding>,
    pub ankle_foot: Option<JointFinding>,
}

check_fields!(LowerLimbFindings {
    hip,
    knee,
    ankle_foot,
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JointFinding {
    pub side: Option<Side>,
    pub pain: Option<FlagWithVas>,
    pub reduced_mobility: bool,
    pub swelling: bool,
    pub instability: bool,
    pub note: String,
}

check_fields!(JointFinding { pain });

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PosturalFindings {
    pub scoliosis: Option<FlagWithNote>,
    pub hyperkyphosis: Option<FlagWithNote>,
    pub hyperlordosis: Option<FlagWithNote>,
    pub leg_length_discrepancy: Option<FlagWithNote>,
    pub flat_feet: bool,
    pub cavus_feet: bool,
}

check_fields!(PosturalFindings {
    scoliosis,
    hyperkyphosis,
    hyperlordosis,
    leg_length_discrepancy,
});

// ── Nervous ─────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NervousApparatus {
    /// Items are the affected body areas.
    pub paresthesia: Option<FlagWithList<NeurologicalDetail>>,
    pub weakness: Option<FlagWithList<NeurologicalDetail>>,
    pub neuralgia: Option<FlagWithVas>,
    pub tremor: Option<FlagWithFrequency>,
    pub balance_disorders: Option<FlagWithFrequency>,
    pub seizures: Option<FlagWithNote>,
    pub memory_problems: Option<FlagWithNote>,
    pub radiculopathy: Option<RadiculopathyFindings>,
}

check_fields!(NervousApparatus {
    paresthesia,
    weakness,
    neuralgia,
    tremor,
    balance_disorders,
    seizures,
    memory_problems,
    radiculopathy,
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NeurologicalDetail {
    pub side: Option<Side>,
    pub dermatome: String,
    pub worse_at_night: bool,
    pub note: String,
}

unchecked!(NeurologicalDetail);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadiculopathyFindings {
    pub cervical: Option<FlagWithList<PainDetail>>,
    pub lumbar: Option<FlagWithList<PainDetail>>,
    pub positive_lasegue: bool,
}

check_fields!(RadiculopathyFindings { cervical, lumbar });
