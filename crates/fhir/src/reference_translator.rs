//! Generic reference translator.
//!
//! One implementation serves every entity kind. An instance closes over the resource type its
//! references use and the lookup port that resolves them; nothing else differs between kinds.

use crate::datatypes::{Reference, ResourceType};
use crate::reference::ReferenceCodec;
use crate::translator::Translator;
use crate::FhirResult;
use clinical_model::{DomainEntity, EntityLookup};
use std::sync::Arc;

/// Converts a domain entity to a typed reference and resolves references back.
///
/// Resolution never caches: every call to `to_domain` is a fresh lookup.
pub struct ReferenceTranslator<E> {
    kind: ResourceType,
    lookup: Arc<dyn EntityLookup<E>>,
}

impl<E: DomainEntity> ReferenceTranslator<E> {
    pub fn new(kind: ResourceType, lookup: Arc<dyn EntityLookup<E>>) -> Self {
        Self { kind, lookup }
    }

    /// The resource type this translator's references carry.
    pub fn kind(&self) -> ResourceType {
        self.kind
    }
}

impl<E: DomainEntity> Translator<E, Reference> for ReferenceTranslator<E> {
    fn to_wire(&self, domain: Option<&E>) -> FhirResult<Option<Reference>> {
        Ok(domain.map(|entity| {
            let mut reference = ReferenceCodec::encode(self.kind, entity.uuid());
            reference.display = entity.display();
            reference
        }))
    }

    /// Resolve a reference through the lookup port.
    ///
    /// - `None` in gives `None` out.
    /// - A declared type other than this translator's kind is an error.
    /// - A target that does not decode gives `None`.
    /// - Otherwise the lookup result is returned as is, including a miss.
    fn to_domain(&self, wire: Option<&Reference>) -> FhirResult<Option<E>> {
        let Some(reference) = wire else {
            return Ok(None);
        };

        if let Err(err) = ReferenceCodec::validate_type(reference, self.kind) {
            tracing::warn!(
                expected = %self.kind,
                found = ?reference.resource_type,
                "reference type mismatch"
            );
            return Err(err);
        }

        let Some(id) = ReferenceCodec::decode_as(Some(reference), self.kind) else {
            tracing::debug!(
                kind = %self.kind,
                target = ?reference.reference,
                "reference has no usable identifier"
            );
            return Ok(None);
        };

        let found = self.lookup.get(&id)?;
        if found.is_none() {
            tracing::debug!(kind = %self.kind, id = %id, "referenced entity not found");
        }
        Ok(found)
    }
}
