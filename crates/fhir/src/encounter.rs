//! FHIR Encounter wire model and the encounter translator.
//!
//! The same wire resource carries two domain entities: visits and encounters. They are told
//! apart by a `meta.tag` coding in [`ENCOUNTER_TAG_SYSTEM`]; see [`EncounterResource::is_visit`]
//! and [`crate::visit::VisitTranslator`].

use crate::constants::{ENCOUNTER_TAG_ENCOUNTER, ENCOUNTER_TAG_SYSTEM, ENCOUNTER_TAG_VISIT};
use crate::datatypes::{CodeableConcept, Coding, Meta, Period, Reference, ResourceType};
use crate::translator::{DynTranslator, Translator, UpdatableTranslator};
use crate::wire::WireResource;
use crate::{FhirError, FhirResult};
use clinical_model::{new_uuid, Concept, Encounter, Location, Patient, Practitioner, Visit};
use serde::{Deserialize, Serialize};

// ============================================================================
// Wire model
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EncounterStatus {
    Planned,
    Arrived,
    Triaged,
    InProgress,
    Onleave,
    Finished,
    Cancelled,
    EnteredInError,
    Unknown,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct EncounterParticipant {
    /// Practitioner reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub individual: Option<Reference>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct EncounterLocation {
    /// Location reference.
    pub location: Reference,
}

/// Encounter resource (wire model).
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct EncounterResource {
    /// Always `"Encounter"`.
    pub resource_type: String,

    /// Visit or encounter uuid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Carries the tag telling a visit from an encounter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,

    /// Derived status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<EncounterStatus>,

    /// Encounter class; not populated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<Coding>,

    /// Visit type or encounter type concept.
    #[serde(rename = "type", default, skip_serializing_if = "Vec::is_empty")]
    pub encounter_type: Vec<CodeableConcept>,

    /// The patient.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<Reference>,

    /// Providers taking part.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub participant: Vec<EncounterParticipant>,

    /// When it happened. Encounters only ever carry a start.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<Period>,

    /// Where it happened; only the first entry is read.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub location: Vec<EncounterLocation>,

    /// Enclosing visit, referenced with resource type `Encounter`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part_of: Option<Reference>,
}

impl EncounterResource {
    /// True when the resource is tagged as a visit rather than an encounter.
    pub fn is_visit(&self) -> bool {
        self.has_encounter_tag(ENCOUNTER_TAG_VISIT)
    }

    /// True when the resource is tagged as an encounter.
    pub fn is_encounter(&self) -> bool {
        self.has_encounter_tag(ENCOUNTER_TAG_ENCOUNTER)
    }

    fn has_encounter_tag(&self, code: &str) -> bool {
        self.meta
            .as_ref()
            .is_some_and(|m| m.has_tag(ENCOUNTER_TAG_SYSTEM, code))
    }
}

impl WireResource for EncounterResource {
    const RESOURCE_TYPE: ResourceType = ResourceType::Encounter;

    fn resource_type_tag(&self) -> &str {
        &self.resource_type
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

pub(crate) fn encounter_tag(code: &str, display: &str) -> Meta {
    Meta::tagged(Coding::new(ENCOUNTER_TAG_SYSTEM, code, display))
}

/// Fail if `wire` is tagged `forbidden`. An untagged resource passes.
///
/// # Errors
///
/// Returns [`FhirError::InvalidInput`] when the tag belongs to the other entity kind.
pub(crate) fn reject_encounter_tag(wire: &EncounterResource, forbidden: &str) -> FhirResult<()> {
    if !wire.has_encounter_tag(forbidden) {
        return Ok(());
    }
    tracing::warn!(id = ?wire.id, tag = forbidden, "encounter resource carries the wrong tag");
    Err(FhirError::InvalidInput(format!(
        "Encounter resource tagged `{forbidden}` cannot be translated here"
    )))
}

// ============================================================================
// Translator
// ============================================================================

/// Derived status of an encounter. Voided wins.
pub fn encounter_status(encounter: &Encounter) -> EncounterStatus {
    if encounter.voided {
        EncounterStatus::EnteredInError
    } else {
        EncounterStatus::Unknown
    }
}

/// Encounter ⇄ Encounter resource tagged `encounter`.
pub struct EncounterTranslator {
    patients: DynTranslator<Patient, Reference>,
    locations: DynTranslator<Location, Reference>,
    practitioners: DynTranslator<Practitioner, Reference>,
    visits: DynTranslator<Visit, Reference>,
    concepts: DynTranslator<Concept, CodeableConcept>,
}

impl EncounterTranslator {
    pub fn new(
        patients: DynTranslator<Patient, Reference>,
        locations: DynTranslator<Location, Reference>,
        practitioners: DynTranslator<Practitioner, Reference>,
        visits: DynTranslator<Visit, Reference>,
        concepts: DynTranslator<Concept, CodeableConcept>,
    ) -> Self {
        Self {
            patients,
            locations,
            practitioners,
            visits,
            concepts,
        }
    }
}

impl Translator<Encounter, EncounterResource> for EncounterTranslator {
    fn to_wire(&self, domain: Option<&Encounter>) -> FhirResult<Option<EncounterResource>> {
        let Some(encounter) = domain else {
            return Ok(None);
        };

        let mut participant = Vec::with_capacity(encounter.providers.len());
        for provider in &encounter.providers {
            participant.push(EncounterParticipant {
                individual: self.practitioners.to_wire(Some(provider))?,
            });
        }

        let location = self
            .locations
            .to_wire(encounter.location.as_ref())?
            .map(|location| EncounterLocation { location })
            .into_iter()
            .collect();

        Ok(Some(EncounterResource {
            resource_type: ResourceType::Encounter.as_str().to_owned(),
            id: Some(encounter.uuid.clone()),
            meta: Some(encounter_tag(ENCOUNTER_TAG_ENCOUNTER, "Encounter")),
            status: Some(encounter_status(encounter)),
            class: None,
            encounter_type: self
                .concepts
                .to_wire(encounter.encounter_type.as_ref())?
                .into_iter()
                .collect(),
            subject: self.patients.to_wire(encounter.patient.as_ref())?,
            participant,
            period: Some(Period::new(encounter.encounter_datetime, None)),
            location,
            part_of: self.visits.to_wire(encounter.visit.as_ref())?,
        }))
    }

    fn to_domain(&self, wire: Option<&EncounterResource>) -> FhirResult<Option<Encounter>> {
        wire.map(|resource| self.create(resource)).transpose()
    }
}

impl UpdatableTranslator<Encounter, EncounterResource> for EncounterTranslator {
    fn create(&self, wire: &EncounterResource) -> FhirResult<Encounter> {
        let encounter = Encounter {
            uuid: wire.id.clone().unwrap_or_else(new_uuid),
            ..Default::default()
        };
        self.to_domain_update(encounter, wire)
    }

    fn to_domain_update(
        &self,
        mut existing: Encounter,
        wire: &EncounterResource,
    ) -> FhirResult<Encounter> {
        reject_encounter_tag(wire, ENCOUNTER_TAG_VISIT)?;

        if let Some(patient) = self.patients.to_domain(wire.subject.as_ref())? {
            existing.patient = Some(patient);
        }

        let first_location = wire.location.first().map(|l| &l.location);
        if let Some(location) = self.locations.to_domain(first_location)? {
            existing.location = Some(location);
        }

        let mut providers = Vec::new();
        for participant in &wire.participant {
            if let Some(provider) = self.practitioners.to_domain(participant.individual.as_ref())? {
                providers.push(provider);
            }
        }
        if !providers.is_empty() {
            existing.providers = providers;
        }

        if let Some(visit) = self.visits.to_domain(wire.part_of.as_ref())? {
            existing.visit = Some(visit);
        }

        if let Some(encounter_type) = self.concepts.to_domain(wire.encounter_type.first())? {
            existing.encounter_type = Some(encounter_type);
        }

        // Start wins; end stands in for a missing start; neither leaves the datetime alone.
        if let Some(occurred) = wire.period.as_ref().and_then(Period::occurrence) {
            existing.encounter_datetime = Some(occurred);
        }

        if wire.status == Some(EncounterStatus::EnteredInError) {
            existing.voided = true;
        }

        Ok(existing)
    }
}
