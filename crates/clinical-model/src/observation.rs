//! Concepts and the observations recorded against them.

use crate::{DomainEntity, Encounter, Patient};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A mapping from a concept to a code in an external terminology.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptMapping {
    /// Name of the concept source, e.g. "CIEL" or "LOINC".
    pub source: String,
    pub code: String,
}

/// Numeric bounds and units attached to a numeric concept.
///
/// Each bound is stored independently. Any combination may be missing.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ConceptNumeric {
    pub hi_absolute: Option<f64>,
    pub hi_critical: Option<f64>,
    pub hi_normal: Option<f64>,
    pub low_absolute: Option<f64>,
    pub low_critical: Option<f64>,
    pub low_normal: Option<f64>,
    pub units: Option<String>,
}

/// A coded clinical idea (a question, an answer, a diagnosis, a drug class, ...).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Concept {
    pub uuid: String,
    pub name: Option<String>,
    pub mappings: Vec<ConceptMapping>,
    pub numeric: Option<ConceptNumeric>,
}

impl Concept {
    /// Returns the code this concept carries in `source`, if it is mapped there.
    pub fn code_in(&self, source: &str) -> Option<&str> {
        self.mappings
            .iter()
            .find(|m| m.source.eq_ignore_ascii_case(source))
            .map(|m| m.code.as_str())
    }
}

impl DomainEntity for Concept {
    fn uuid(&self) -> &str {
        &self.uuid
    }

    fn display(&self) -> Option<String> {
        self.name.clone()
    }
}

/// Lifecycle state recorded on an observation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObsStatus {
    Preliminary,
    #[default]
    Final,
    Amended,
}

impl ObsStatus {
    /// Every variant, in declaration order.
    pub const ALL: [ObsStatus; 3] = [ObsStatus::Preliminary, ObsStatus::Final, ObsStatus::Amended];
}

/// Interpretation flag recorded on an observation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObsInterpretation {
    Normal,
    Abnormal,
    CriticallyAbnormal,
    High,
    CriticallyHigh,
    Low,
    CriticallyLow,
    OffScaleHigh,
    OffScaleLow,
    Negative,
    Positive,
}

impl ObsInterpretation {
    /// Every variant, in declaration order.
    pub const ALL: [ObsInterpretation; 11] = [
        ObsInterpretation::Normal,
        ObsInterpretation::Abnormal,
        ObsInterpretation::CriticallyAbnormal,
        ObsInterpretation::High,
        ObsInterpretation::CriticallyHigh,
        ObsInterpretation::Low,
        ObsInterpretation::CriticallyLow,
        ObsInterpretation::OffScaleHigh,
        ObsInterpretation::OffScaleLow,
        ObsInterpretation::Negative,
        ObsInterpretation::Positive,
    ];
}

/// The answer recorded by an observation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObsValue {
    Numeric(f64),
    Text(String),
    Coded(Concept),
    Boolean(bool),
    DateTime(DateTime<Utc>),
}

/// A single recorded observation, or a group of them.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Obs {
    pub uuid: String,
    pub person: Option<Patient>,
    pub encounter: Option<Encounter>,
    pub concept: Option<Concept>,
    pub obs_datetime: Option<DateTime<Utc>>,
    pub value: Option<ObsValue>,
    pub status: ObsStatus,
    pub interpretation: Option<ObsInterpretation>,
    pub comment: Option<String>,
    /// Members of an observation group.
    pub group_members: Vec<Obs>,
    pub voided: bool,
}

impl DomainEntity for Obs {
    fn uuid(&self) -> &str {
        &self.uuid
    }

    fn display(&self) -> Option<String> {
        self.concept.as_ref().and_then(|c| c.name.clone())
    }
}
