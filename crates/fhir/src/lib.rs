//! FHIR wire/boundary support for the clinical domain model.
//!
//! This crate provides **wire models** and **translators** between
//! `clinical_model` entities and FHIR R4 resources:
//! - a reference codec for `"<ResourceType>/<id>"` references
//! - one generic reference translator, closed over a resource type and a lookup port
//! - field translators (immutable code mapping tables, concept ⇄ CodeableConcept)
//! - composite translators for Patient, Visit, Encounter, Observation, Condition and
//!   MedicationRequest
//! - JSON/YAML parsing and rendering of those resources
//!
//! Translators are stateless and `Send + Sync`. The only calls that leave the process go
//! through the lookup ports injected at construction (see [`registry::TranslatorRegistry`]).

pub mod condition;
pub mod config;
pub mod constants;
pub mod datatypes;
pub mod encounter;
pub mod field;
pub mod medication_request;
pub mod observation;
pub mod patient;
pub mod reference;
pub mod reference_translator;
pub mod registry;
pub mod translator;
pub mod visit;
pub mod wire;

#[cfg(test)]
mod fixtures;

// Re-export facades
pub use condition::{ConditionResource, ConditionTranslator};
pub use config::TranslatorConfig;
pub use encounter::{EncounterResource, EncounterStatus, EncounterTranslator};
pub use field::concept::ConceptTranslator;
pub use medication_request::{
    MedicationRequestResource, MedicationRequestStatus, MedicationRequestTranslator,
};
pub use observation::{ObservationResource, ObservationStatus, ObservationTranslator};
pub use patient::{AdministrativeGender, PatientResource, PatientTranslator};
pub use reference::ReferenceCodec;
pub use reference_translator::ReferenceTranslator;
pub use registry::{LookupPorts, TranslatorRegistry};
pub use translator::{translate_inbound, DynTranslator, Translator, UpdatableTranslator};
pub use visit::VisitTranslator;
pub use wire::WireResource;

// Re-export wire data types
pub use datatypes::{
    CodeableConcept, Coding, Extension, HumanName, Identifier, Meta, Period, Quantity,
    Reference, ResourceType,
};

use clinical_model::LookupError;

/// Errors returned by the `fhir` boundary crate.
#[derive(Debug, thiserror::Error)]
pub enum FhirError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("invalid YAML: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),

    #[error("translation error: {0}")]
    Translation(String),

    /// A reference was handed to a translator for a different resource type.
    #[error("invalid reference type: expected {expected}, got {found}")]
    InvalidReferenceType {
        expected: ResourceType,
        found: ResourceType,
    },

    /// A lookup port failed while resolving a reference.
    #[error("lookup failed: {0}")]
    Lookup(#[from] LookupError),
}

/// Type alias for Results that can fail with a [`FhirError`].
pub type FhirResult<T> = Result<T, FhirError>;
