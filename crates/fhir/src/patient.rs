//! FHIR Patient wire model and translator.
//!
//! Notes:
//! - Domain names carry a single `given` plus a space-separated `middle`. On the wire these
//!   are flattened into the `given` list and split back on the way in.
//! - `active` is derived from the voided flag; voided always wins.

use crate::datatypes::{
    CodeableConcept, HumanName, Identifier, IdentifierUse, Meta, NameUse, ResourceType,
};
use crate::field::mappings::GENDER;
use crate::translator::{Translator, UpdatableTranslator};
use crate::wire::WireResource;
use crate::FhirResult;
use chrono::{DateTime, NaiveDate, Utc};
use clinical_model::{new_uuid, Patient, PatientIdentifier, PersonName};
use serde::{Deserialize, Serialize};

// ============================================================================
// Wire model
// ============================================================================

/// Administrative gender as carried on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdministrativeGender {
    Male,
    Female,
    Other,
    Unknown,
}

/// Patient resource (wire model).
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct PatientResource {
    /// Always `"Patient"`.
    pub resource_type: String,

    /// Patient uuid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Resource metadata; neither written nor read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,

    /// Business identifiers such as the medical record number.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identifier: Vec<Identifier>,

    /// `false` marks the record voided.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,

    /// Names; the preferred one has use `official`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub name: Vec<HumanName>,

    /// Administrative gender.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<AdministrativeGender>,

    /// Date of birth (full date only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,

    /// Death flag, sent only when no death date is known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deceased_boolean: Option<bool>,

    /// Date and time of death.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deceased_date_time: Option<DateTime<Utc>>,
}

impl WireResource for PatientResource {
    const RESOURCE_TYPE: ResourceType = ResourceType::Patient;

    fn resource_type_tag(&self) -> &str {
        &self.resource_type
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

// ============================================================================
// Translator
// ============================================================================

/// Patient ⇄ Patient resource.
///
/// Stateless: a patient carries no references that need resolving.
#[derive(Clone, Copy, Debug, Default)]
pub struct PatientTranslator;

impl Translator<Patient, PatientResource> for PatientTranslator {
    fn to_wire(&self, domain: Option<&Patient>) -> FhirResult<Option<PatientResource>> {
        let Some(patient) = domain else {
            return Ok(None);
        };

        let (deceased_boolean, deceased_date_time) = match (patient.dead, patient.death_date) {
            (_, Some(date)) => (None, Some(date)),
            (true, None) => (Some(true), None),
            (false, None) => (None, None),
        };

        Ok(Some(PatientResource {
            resource_type: ResourceType::Patient.as_str().to_owned(),
            id: Some(patient.uuid.clone()),
            meta: None,
            identifier: patient.identifiers.iter().map(identifier_to_wire).collect(),
            active: Some(!patient.voided),
            name: patient.names.iter().map(name_to_wire).collect(),
            gender: GENDER.to_wire(patient.gender),
            birth_date: patient.birthdate,
            deceased_boolean,
            deceased_date_time,
        }))
    }

    fn to_domain(&self, wire: Option<&PatientResource>) -> FhirResult<Option<Patient>> {
        wire.map(|resource| self.create(resource)).transpose()
    }
}

impl UpdatableTranslator<Patient, PatientResource> for PatientTranslator {
    fn create(&self, wire: &PatientResource) -> FhirResult<Patient> {
        let patient = Patient {
            uuid: wire.id.clone().unwrap_or_else(new_uuid),
            ..Default::default()
        };
        self.to_domain_update(patient, wire)
    }

    fn to_domain_update(
        &self,
        mut existing: Patient,
        wire: &PatientResource,
    ) -> FhirResult<Patient> {
        if !wire.name.is_empty() {
            existing.names = wire.name.iter().map(name_to_domain).collect();
        }

        let identifiers: Vec<PatientIdentifier> =
            wire.identifier.iter().filter_map(identifier_to_domain).collect();
        if !identifiers.is_empty() {
            existing.identifiers = identifiers;
        }

        if let Some(gender) = GENDER.to_domain(wire.gender) {
            existing.gender = Some(gender);
        }
        if let Some(birth_date) = wire.birth_date {
            existing.birthdate = Some(birth_date);
        }

        if let Some(date) = wire.deceased_date_time {
            existing.dead = true;
            existing.death_date = Some(date);
        } else if let Some(dead) = wire.deceased_boolean {
            existing.dead = dead;
            if !dead {
                existing.death_date = None;
            }
        }

        if let Some(active) = wire.active {
            existing.voided = !active;
        }

        Ok(existing)
    }
}

// ============================================================================
// Name and identifier helpers
// ============================================================================

/// Flatten a domain name into the wire `given` list.
fn name_to_wire(name: &PersonName) -> HumanName {
    let given = name
        .given
        .iter()
        .map(|g| g.trim().to_owned())
        .filter(|g| !g.is_empty())
        .chain(
            name.middle
                .iter()
                .flat_map(|m| m.split(' '))
                .filter(|token| !token.is_empty())
                .map(str::to_owned),
        )
        .collect();

    HumanName {
        use_type: name.preferred.then_some(NameUse::Official),
        text: None,
        family: name.family.clone(),
        given,
    }
}

/// Split the wire `given` list into a given name and a middle name.
fn name_to_domain(name: &HumanName) -> PersonName {
    let mut given = name.given.iter();
    let first = given.next().cloned();
    let rest: Vec<&str> = given.map(String::as_str).collect();

    PersonName {
        given: first,
        middle: (!rest.is_empty()).then(|| rest.join(" ")),
        family: name.family.clone(),
        preferred: name.use_type == Some(NameUse::Official),
    }
}

fn identifier_to_wire(identifier: &PatientIdentifier) -> Identifier {
    Identifier {
        use_type: identifier.preferred.then_some(IdentifierUse::Official),
        identifier_type: identifier
            .type_name
            .as_deref()
            .map(CodeableConcept::from_text),
        system: None,
        value: Some(identifier.identifier.clone()),
    }
}

fn identifier_to_domain(identifier: &Identifier) -> Option<PatientIdentifier> {
    let value = identifier.value.as_deref().filter(|v| !v.trim().is_empty())?;
    Some(PatientIdentifier {
        identifier: value.to_owned(),
        type_name: identifier
            .identifier_type
            .as_ref()
            .and_then(|t| t.text.clone()),
        preferred: identifier.use_type == Some(IdentifierUse::Official),
    })
}
