//! FHIR Condition wire model and the encounter diagnosis translator.
//!
//! Rank and certainty have no first-class Condition element. They travel as extensions
//! ([`EXT_DIAGNOSIS_RANK`], [`EXT_DIAGNOSIS_CERTAINTY`]); certainty is also mirrored into
//! `verificationStatus`.

use crate::constants::{
    CONDITION_CATEGORY_SYSTEM, CONDITION_CLINICAL_SYSTEM, CONDITION_VERIFICATION_SYSTEM,
    EXT_DIAGNOSIS_CERTAINTY, EXT_DIAGNOSIS_RANK,
};
use crate::datatypes::{
    find_extension, CodeableConcept, Coding, Extension, Reference, ResourceType,
};
use crate::field::mappings::{DIAGNOSIS_CERTAINTY_CODE, DIAGNOSIS_VERIFICATION};
use crate::translator::{DynTranslator, Translator, UpdatableTranslator};
use crate::wire::WireResource;
use crate::FhirResult;
use chrono::{DateTime, Utc};
use clinical_model::{
    new_uuid, CodedOrFreeText, Concept, Diagnosis, DiagnosisCertainty, Encounter, Patient,
};
use serde::{Deserialize, Serialize};

const VERIFICATION_ENTERED_IN_ERROR: &str = "entered-in-error";

/// Condition resource (wire model).
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct ConditionResource {
    /// Always `"Condition"`.
    pub resource_type: String,

    /// Diagnosis uuid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Diagnosis rank and certainty extensions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extension: Vec<Extension>,

    /// Derived clinical status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clinical_status: Option<CodeableConcept>,

    /// Certainty mirrored into the FHIR verification status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_status: Option<CodeableConcept>,

    /// Always `encounter-diagnosis` on the way out.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub category: Vec<CodeableConcept>,

    /// Coded diagnosis, or a non-coded one as `text`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<CodeableConcept>,

    /// The patient.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<Reference>,

    /// Encounter the diagnosis was made in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encounter: Option<Reference>,

    /// When the diagnosis was recorded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recorded_date: Option<DateTime<Utc>>,
}

impl WireResource for ConditionResource {
    const RESOURCE_TYPE: ResourceType = ResourceType::Condition;

    fn resource_type_tag(&self) -> &str {
        &self.resource_type
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

/// Verification status. Voided overrides the certainty.
pub fn verification_status(diagnosis: &Diagnosis) -> Option<CodeableConcept> {
    if diagnosis.voided {
        return Some(CodeableConcept::from_coding(Coding::new(
            CONDITION_VERIFICATION_SYSTEM,
            VERIFICATION_ENTERED_IN_ERROR,
            "Entered in Error",
        )));
    }
    DIAGNOSIS_VERIFICATION.to_codeable_concept(diagnosis.certainty)
}

pub fn clinical_status(diagnosis: &Diagnosis) -> CodeableConcept {
    let coding = if diagnosis.voided {
        Coding::new(CONDITION_CLINICAL_SYSTEM, "inactive", "Inactive")
    } else {
        Coding::new(CONDITION_CLINICAL_SYSTEM, "active", "Active")
    };
    CodeableConcept::from_coding(coding)
}

fn is_entered_in_error(status: Option<&CodeableConcept>) -> bool {
    status.is_some_and(|s| {
        s.coding.iter().any(|c| {
            c.system.as_deref() == Some(CONDITION_VERIFICATION_SYSTEM)
                && c.code.as_deref() == Some(VERIFICATION_ENTERED_IN_ERROR)
        })
    })
}

/// Diagnosis ⇄ Condition resource.
pub struct ConditionTranslator {
    concepts: DynTranslator<Concept, CodeableConcept>,
    patients: DynTranslator<Patient, Reference>,
    encounters: DynTranslator<Encounter, Reference>,
}

impl ConditionTranslator {
    pub fn new(
        concepts: DynTranslator<Concept, CodeableConcept>,
        patients: DynTranslator<Patient, Reference>,
        encounters: DynTranslator<Encounter, Reference>,
    ) -> Self {
        Self {
            concepts,
            patients,
            encounters,
        }
    }
}

impl Translator<Diagnosis, ConditionResource> for ConditionTranslator {
    fn to_wire(&self, domain: Option<&Diagnosis>) -> FhirResult<Option<ConditionResource>> {
        let Some(diagnosis) = domain else {
            return Ok(None);
        };

        let mut extension = Vec::new();
        if let Some(rank) = diagnosis.rank {
            extension.push(Extension::integer(EXT_DIAGNOSIS_RANK, rank));
        }
        if let Some(code) = DIAGNOSIS_CERTAINTY_CODE.to_wire(diagnosis.certainty) {
            extension.push(Extension::code(EXT_DIAGNOSIS_CERTAINTY, code));
        }

        let code = match (&diagnosis.diagnosis.coded, &diagnosis.diagnosis.non_coded) {
            (Some(coded), _) => self.concepts.to_wire(Some(coded))?,
            (None, Some(text)) => Some(CodeableConcept::from_text(text.clone())),
            (None, None) => None,
        };

        Ok(Some(ConditionResource {
            resource_type: ResourceType::Condition.as_str().to_owned(),
            id: Some(diagnosis.uuid.clone()),
            extension,
            clinical_status: Some(clinical_status(diagnosis)),
            verification_status: verification_status(diagnosis),
            category: vec![CodeableConcept::from_coding(Coding::new(
                CONDITION_CATEGORY_SYSTEM,
                "encounter-diagnosis",
                "Encounter Diagnosis",
            ))],
            code,
            subject: self.patients.to_wire(diagnosis.patient.as_ref())?,
            encounter: self.encounters.to_wire(diagnosis.encounter.as_ref())?,
            recorded_date: diagnosis.date_created,
        }))
    }

    fn to_domain(&self, wire: Option<&ConditionResource>) -> FhirResult<Option<Diagnosis>> {
        wire.map(|resource| self.create(resource)).transpose()
    }
}

impl UpdatableTranslator<Diagnosis, ConditionResource> for ConditionTranslator {
    fn create(&self, wire: &ConditionResource) -> FhirResult<Diagnosis> {
        let diagnosis = Diagnosis {
            uuid: wire.id.clone().unwrap_or_else(new_uuid),
            ..Default::default()
        };
        self.to_domain_update(diagnosis, wire)
    }

    fn to_domain_update(
        &self,
        mut existing: Diagnosis,
        wire: &ConditionResource,
    ) -> FhirResult<Diagnosis> {
        if let Some(patient) = self.patients.to_domain(wire.subject.as_ref())? {
            existing.patient = Some(patient);
        }
        if let Some(encounter) = self.encounters.to_domain(wire.encounter.as_ref())? {
            existing.encounter = Some(encounter);
        }

        if let Some(code) = &wire.code {
            if let Some(coded) = self.concepts.to_domain(Some(code))? {
                existing.diagnosis = CodedOrFreeText {
                    coded: Some(coded),
                    non_coded: None,
                };
            } else if let Some(text) = code.text.as_deref().filter(|t| !t.trim().is_empty()) {
                existing.diagnosis = CodedOrFreeText {
                    coded: None,
                    non_coded: Some(text.to_owned()),
                };
            }
        }

        if let Some(rank) =
            find_extension(&wire.extension, EXT_DIAGNOSIS_RANK).and_then(|e| e.value_integer)
        {
            existing.rank = Some(rank);
        }

        if let Some(certainty) = certainty_from_wire(wire) {
            existing.certainty = Some(certainty);
        }

        if let Some(recorded) = wire.recorded_date {
            existing.date_created = Some(recorded);
        }

        if is_entered_in_error(wire.verification_status.as_ref()) {
            existing.voided = true;
        }

        Ok(existing)
    }
}

/// Certainty from the extension, falling back to `verificationStatus`.
fn certainty_from_wire(wire: &ConditionResource) -> Option<DiagnosisCertainty> {
    let from_extension = find_extension(&wire.extension, EXT_DIAGNOSIS_CERTAINTY)
        .and_then(|e| DIAGNOSIS_CERTAINTY_CODE.from_code(e.value_code.as_deref()));
    from_extension.or_else(|| {
        DIAGNOSIS_VERIFICATION.from_codeable_concept(wire.verification_status.as_ref())
    })
}
