//! Clinical domain model shared by the translation crates.
//!
//! This crate holds the in-process side of the translation layer:
//! - domain entities (patients, visits, encounters, observations, diagnoses, drug orders)
//! - the domain enums those entities carry
//! - the lookup ports through which references are resolved back to entities
//! - an in-memory store implementing those ports
//!
//! Entities are owned by an external store. The translation layer only ever holds transient
//! clones of them while a translate call is running.

pub mod diagnosis;
pub mod encounter;
pub mod lookup;
pub mod observation;
pub mod order;
pub mod person;
pub mod text;

pub use diagnosis::{CodedOrFreeText, Diagnosis, DiagnosisCertainty};
pub use encounter::{Encounter, Location, Practitioner, Visit};
pub use lookup::{
    ConceptLookup, EntityLookup, EntityStore, InMemoryStore, LookupError, LookupResult,
};
pub use observation::{
    Concept, ConceptMapping, ConceptNumeric, Obs, ObsInterpretation, ObsStatus, ObsValue,
};
pub use order::{Drug, DrugOrder, OrderAction};
pub use person::{Gender, Patient, PatientIdentifier, PersonName};
pub use text::{NonEmptyText, TextError};

/// An identified clinical record.
///
/// Every entity carries a globally unique identifier string. That identifier is the only
/// thing a wire reference needs in order to be resolved back through a lookup port.
pub trait DomainEntity: Clone + Send + Sync + 'static {
    /// Globally unique identifier of this record.
    fn uuid(&self) -> &str;

    /// Human readable label used when the entity is referenced from elsewhere.
    fn display(&self) -> Option<String> {
        None
    }
}

/// Allocate a fresh identifier for an entity created from inbound data.
pub fn new_uuid() -> String {
    uuid::Uuid::new_v4().to_string()
}
