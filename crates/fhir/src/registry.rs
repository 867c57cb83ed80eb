//! Translator wiring.
//!
//! The embedding application hands over one lookup port per entity kind plus the resolved
//! [`TranslatorConfig`]; the registry builds every reference, field and composite translator
//! once and shares them. Nothing here is global: two registries over different ports are fully
//! independent.

use crate::condition::{ConditionResource, ConditionTranslator};
use crate::config::TranslatorConfig;
use crate::datatypes::{CodeableConcept, Reference, ResourceType};
use crate::encounter::{EncounterResource, EncounterTranslator};
use crate::field::concept::ConceptTranslator;
use crate::medication_request::{MedicationRequestResource, MedicationRequestTranslator};
use crate::observation::{ObservationResource, ObservationTranslator};
use crate::patient::{PatientResource, PatientTranslator};
use crate::reference_translator::ReferenceTranslator;
use crate::translator::{translate_inbound, DynTranslator};
use crate::visit::VisitTranslator;
use crate::FhirResult;
use clinical_model::{
    Concept, ConceptLookup, Diagnosis, Drug, DrugOrder, Encounter, EntityLookup, Location, Obs,
    Patient, Practitioner, Visit,
};
use std::sync::Arc;

/// One lookup port per entity kind.
#[derive(Clone)]
pub struct LookupPorts {
    pub patients: Arc<dyn EntityLookup<Patient>>,
    pub practitioners: Arc<dyn EntityLookup<Practitioner>>,
    pub locations: Arc<dyn EntityLookup<Location>>,
    pub visits: Arc<dyn EntityLookup<Visit>>,
    pub encounters: Arc<dyn EntityLookup<Encounter>>,
    pub observations: Arc<dyn EntityLookup<Obs>>,
    pub diagnoses: Arc<dyn EntityLookup<Diagnosis>>,
    pub drug_orders: Arc<dyn EntityLookup<DrugOrder>>,
    pub drugs: Arc<dyn EntityLookup<Drug>>,
    pub concepts: Arc<dyn ConceptLookup>,
}

/// Reference translators, one per entity kind that can be pointed at.
pub struct ReferenceTranslators {
    pub patient: DynTranslator<Patient, Reference>,
    pub practitioner: DynTranslator<Practitioner, Reference>,
    pub location: DynTranslator<Location, Reference>,
    /// Visits are referenced as `Encounter`.
    pub visit: DynTranslator<Visit, Reference>,
    pub encounter: DynTranslator<Encounter, Reference>,
    pub observation: DynTranslator<Obs, Reference>,
    pub drug: DynTranslator<Drug, Reference>,
}

impl ReferenceTranslators {
    fn new(ports: &LookupPorts) -> Self {
        Self {
            patient: Arc::new(ReferenceTranslator::new(
                ResourceType::Patient,
                Arc::clone(&ports.patients),
            )),
            practitioner: Arc::new(ReferenceTranslator::new(
                ResourceType::Practitioner,
                Arc::clone(&ports.practitioners),
            )),
            location: Arc::new(ReferenceTranslator::new(
                ResourceType::Location,
                Arc::clone(&ports.locations),
            )),
            visit: Arc::new(ReferenceTranslator::new(
                ResourceType::Encounter,
                Arc::clone(&ports.visits),
            )),
            encounter: Arc::new(ReferenceTranslator::new(
                ResourceType::Encounter,
                Arc::clone(&ports.encounters),
            )),
            observation: Arc::new(ReferenceTranslator::new(
                ResourceType::Observation,
                Arc::clone(&ports.observations),
            )),
            drug: Arc::new(ReferenceTranslator::new(
                ResourceType::Medication,
                Arc::clone(&ports.drugs),
            )),
        }
    }
}

/// Every translator, built once over a set of lookup ports.
pub struct TranslatorRegistry {
    ports: LookupPorts,
    config: Arc<TranslatorConfig>,
    references: ReferenceTranslators,
    concept: DynTranslator<Concept, CodeableConcept>,
    patient: PatientTranslator,
    visit: VisitTranslator,
    encounter: EncounterTranslator,
    observation: ObservationTranslator,
    condition: ConditionTranslator,
    medication_request: MedicationRequestTranslator,
}

impl TranslatorRegistry {
    pub fn new(ports: LookupPorts, config: TranslatorConfig) -> Self {
        let config = Arc::new(config);
        let references = ReferenceTranslators::new(&ports);
        let concept: DynTranslator<Concept, CodeableConcept> = Arc::new(ConceptTranslator::new(
            Arc::clone(&ports.concepts),
            Arc::clone(&config),
        ));

        let visit = VisitTranslator::new(
            Arc::clone(&references.patient),
            Arc::clone(&references.location),
            Arc::clone(&concept),
        );
        let encounter = EncounterTranslator::new(
            Arc::clone(&references.patient),
            Arc::clone(&references.location),
            Arc::clone(&references.practitioner),
            Arc::clone(&references.visit),
            Arc::clone(&concept),
        );
        let observation = ObservationTranslator::new(
            Arc::clone(&concept),
            Arc::clone(&references.patient),
            Arc::clone(&references.encounter),
            Arc::clone(&references.observation),
        );
        let condition = ConditionTranslator::new(
            Arc::clone(&concept),
            Arc::clone(&references.patient),
            Arc::clone(&references.encounter),
        );
        let medication_request = MedicationRequestTranslator::new(
            Arc::clone(&references.drug),
            Arc::clone(&references.patient),
            Arc::clone(&references.encounter),
            Arc::clone(&references.practitioner),
        );

        tracing::debug!(
            concept_sources = ?config,
            "translator registry initialised"
        );

        Self {
            ports,
            config,
            references,
            concept,
            patient: PatientTranslator,
            visit,
            encounter,
            observation,
            condition,
            medication_request,
        }
    }

    pub fn ports(&self) -> &LookupPorts {
        &self.ports
    }

    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    pub fn references(&self) -> &ReferenceTranslators {
        &self.references
    }

    pub fn concept(&self) -> &DynTranslator<Concept, CodeableConcept> {
        &self.concept
    }

    pub fn patient(&self) -> &PatientTranslator {
        &self.patient
    }

    pub fn visit(&self) -> &VisitTranslator {
        &self.visit
    }

    pub fn encounter(&self) -> &EncounterTranslator {
        &self.encounter
    }

    pub fn observation(&self) -> &ObservationTranslator {
        &self.observation
    }

    pub fn condition(&self) -> &ConditionTranslator {
        &self.condition
    }

    pub fn medication_request(&self) -> &MedicationRequestTranslator {
        &self.medication_request
    }

    // ------------------------------------------------------------------------
    // Inbound create-or-update
    // ------------------------------------------------------------------------

    pub fn inbound_patient(&self, wire: &PatientResource) -> FhirResult<Patient> {
        translate_inbound(&self.patient, self.ports.patients.as_ref(), wire)
    }

    /// Translate an inbound Encounter resource tagged `visit`.
    pub fn inbound_visit(&self, wire: &EncounterResource) -> FhirResult<Visit> {
        translate_inbound(&self.visit, self.ports.visits.as_ref(), wire)
    }

    pub fn inbound_encounter(&self, wire: &EncounterResource) -> FhirResult<Encounter> {
        translate_inbound(&self.encounter, self.ports.encounters.as_ref(), wire)
    }

    pub fn inbound_observation(&self, wire: &ObservationResource) -> FhirResult<Obs> {
        translate_inbound(&self.observation, self.ports.observations.as_ref(), wire)
    }

    pub fn inbound_condition(&self, wire: &ConditionResource) -> FhirResult<Diagnosis> {
        translate_inbound(&self.condition, self.ports.diagnoses.as_ref(), wire)
    }

    pub fn inbound_medication_request(
        &self,
        wire: &MedicationRequestResource,
    ) -> FhirResult<DrugOrder> {
        translate_inbound(&self.medication_request, self.ports.drug_orders.as_ref(), wire)
    }
}
