//! Encounter diagnoses.

use crate::{Concept, DomainEntity, Encounter, Patient};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How sure the clinician is about a diagnosis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosisCertainty {
    Provisional,
    Confirmed,
}

impl DiagnosisCertainty {
    /// Every variant, in declaration order.
    pub const ALL: [DiagnosisCertainty; 2] =
        [DiagnosisCertainty::Provisional, DiagnosisCertainty::Confirmed];
}

/// A value that is either a coded concept or free text entered instead of one.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CodedOrFreeText {
    pub coded: Option<Concept>,
    pub non_coded: Option<String>,
}

/// A diagnosis made during an encounter.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnosis {
    pub uuid: String,
    pub patient: Option<Patient>,
    pub encounter: Option<Encounter>,
    pub diagnosis: CodedOrFreeText,
    pub certainty: Option<DiagnosisCertainty>,
    /// 1 marks the primary diagnosis, higher numbers are secondary.
    pub rank: Option<i32>,
    pub date_created: Option<DateTime<Utc>>,
    pub voided: bool,
}

impl DomainEntity for Diagnosis {
    fn uuid(&self) -> &str {
        &self.uuid
    }

    fn display(&self) -> Option<String> {
        self.diagnosis
            .coded
            .as_ref()
            .and_then(|c| c.name.clone())
            .or_else(|| self.diagnosis.non_coded.clone())
    }
}
