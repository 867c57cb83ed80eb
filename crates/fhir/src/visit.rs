//! Visit translator.
//!
//! A visit travels as an Encounter resource tagged `visit`. Unlike an encounter it carries a
//! real time range, and its status is derived from that range.

use crate::constants::{ENCOUNTER_TAG_ENCOUNTER, ENCOUNTER_TAG_VISIT};
use crate::datatypes::{CodeableConcept, Period, Reference, ResourceType};
use crate::encounter::{
    encounter_tag, reject_encounter_tag, EncounterLocation, EncounterResource, EncounterStatus,
};
use crate::translator::{DynTranslator, Translator, UpdatableTranslator};
use crate::FhirResult;
use chrono::{DateTime, Utc};
use clinical_model::{new_uuid, Concept, Location, Patient, Visit};

/// Derived status of a visit at `now`.
///
/// First match wins:
/// 1. voided → `entered-in-error`
/// 2. stopped → `finished`
/// 3. starts after `now` → `planned`
/// 4. otherwise `in-progress`
pub fn visit_status(visit: &Visit, now: DateTime<Utc>) -> EncounterStatus {
    if visit.voided {
        EncounterStatus::EnteredInError
    } else if visit.stop_datetime.is_some() {
        EncounterStatus::Finished
    } else if visit.start_datetime.is_some_and(|start| start > now) {
        EncounterStatus::Planned
    } else {
        EncounterStatus::InProgress
    }
}

/// Visit ⇄ Encounter resource tagged `visit`.
pub struct VisitTranslator {
    patients: DynTranslator<Patient, Reference>,
    locations: DynTranslator<Location, Reference>,
    concepts: DynTranslator<Concept, CodeableConcept>,
}

impl VisitTranslator {
    pub fn new(
        patients: DynTranslator<Patient, Reference>,
        locations: DynTranslator<Location, Reference>,
        concepts: DynTranslator<Concept, CodeableConcept>,
    ) -> Self {
        Self {
            patients,
            locations,
            concepts,
        }
    }
}

impl Translator<Visit, EncounterResource> for VisitTranslator {
    fn to_wire(&self, domain: Option<&Visit>) -> FhirResult<Option<EncounterResource>> {
        let Some(visit) = domain else {
            return Ok(None);
        };

        let location = self
            .locations
            .to_wire(visit.location.as_ref())?
            .map(|location| EncounterLocation { location })
            .into_iter()
            .collect();

        Ok(Some(EncounterResource {
            resource_type: ResourceType::Encounter.as_str().to_owned(),
            id: Some(visit.uuid.clone()),
            meta: Some(encounter_tag(ENCOUNTER_TAG_VISIT, "Visit")),
            status: Some(visit_status(visit, Utc::now())),
            class: None,
            encounter_type: self
                .concepts
                .to_wire(visit.visit_type.as_ref())?
                .into_iter()
                .collect(),
            subject: self.patients.to_wire(visit.patient.as_ref())?,
            participant: Vec::new(),
            period: Some(Period::new(visit.start_datetime, visit.stop_datetime)),
            location,
            part_of: None,
        }))
    }

    fn to_domain(&self, wire: Option<&EncounterResource>) -> FhirResult<Option<Visit>> {
        wire.map(|resource| self.create(resource)).transpose()
    }
}

impl UpdatableTranslator<Visit, EncounterResource> for VisitTranslator {
    fn create(&self, wire: &EncounterResource) -> FhirResult<Visit> {
        let visit = Visit {
            uuid: wire.id.clone().unwrap_or_else(new_uuid),
            ..Default::default()
        };
        self.to_domain_update(visit, wire)
    }

    fn to_domain_update(&self, mut existing: Visit, wire: &EncounterResource) -> FhirResult<Visit> {
        reject_encounter_tag(wire, ENCOUNTER_TAG_ENCOUNTER)?;

        if let Some(patient) = self.patients.to_domain(wire.subject.as_ref())? {
            existing.patient = Some(patient);
        }

        let first_location = wire.location.first().map(|l| &l.location);
        if let Some(location) = self.locations.to_domain(first_location)? {
            existing.location = Some(location);
        }

        if let Some(visit_type) = self.concepts.to_domain(wire.encounter_type.first())? {
            existing.visit_type = Some(visit_type);
        }

        if let Some(period) = &wire.period {
            if let Some(start) = period.start {
                existing.start_datetime = Some(start);
            }
            if let Some(end) = period.end {
                existing.stop_datetime = Some(end);
            }
        }

        if wire.status == Some(EncounterStatus::EnteredInError) {
            existing.voided = true;
        }

        Ok(existing)
    }
}
