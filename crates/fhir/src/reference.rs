//! Reference codec.
//!
//! A wire reference points at another resource by `"<ResourceType>/<id>"`, optionally with an
//! explicit identifier alongside. This module turns identifiers into references and back.
//!
//! Decoding never fails: a target that does not parse is treated as "no identifier". The only
//! error this module raises is a declared resource type that does not match the expected one.

use crate::datatypes::{Identifier, Reference, ResourceType};
use crate::{FhirError, FhirResult};

/// Reference encoding operations.
///
/// This is a zero-sized type used for namespacing. All methods are associated functions.
pub struct ReferenceCodec;

impl ReferenceCodec {
    /// Build a reference to `identifier` within the `resource_type` namespace.
    pub fn encode(resource_type: ResourceType, identifier: &str) -> Reference {
        Reference {
            reference: Some(format!("{resource_type}/{identifier}")),
            resource_type: Some(resource_type),
            identifier: None,
            display: None,
        }
    }

    /// Extract the target identifier of a reference.
    ///
    /// Resolution order:
    /// 1. a non-blank explicit `identifier.value`,
    /// 2. the id segment of `reference` when it reads `"<T>/<id>"`, where `T` is the declared
    ///    `type` or, if none is declared, any known resource type,
    /// 3. otherwise `None`.
    pub fn decode(reference: Option<&Reference>) -> Option<String> {
        let reference = reference?;
        if let Some(value) = explicit_identifier(reference.identifier.as_ref()) {
            return Some(value);
        }

        let (target_type, id) = split_target(reference.reference.as_deref()?)?;
        match reference.resource_type {
            Some(declared) if declared != target_type => None,
            _ => Some(id.to_owned()),
        }
    }

    /// As [`ReferenceCodec::decode`], but a parsed target must also be of `expected` type.
    pub fn decode_as(reference: Option<&Reference>, expected: ResourceType) -> Option<String> {
        let reference = reference?;
        if let Some(value) = explicit_identifier(reference.identifier.as_ref()) {
            return Some(value);
        }

        let (target_type, id) = split_target(reference.reference.as_deref()?)?;
        (target_type == expected).then(|| id.to_owned())
    }

    /// Check the declared type of `reference` against `expected`.
    ///
    /// A reference without a declared type always passes.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError::InvalidReferenceType`] when a type is declared and differs.
    pub fn validate_type(reference: &Reference, expected: ResourceType) -> FhirResult<()> {
        match reference.resource_type {
            Some(found) if found != expected => {
                Err(FhirError::InvalidReferenceType { expected, found })
            }
            _ => Ok(()),
        }
    }
}

fn explicit_identifier(identifier: Option<&Identifier>) -> Option<String> {
    identifier
        .and_then(|i| i.value.as_deref())
        .filter(|v| !v.trim().is_empty())
        .map(str::to_owned)
}

/// Split `"<T>/<id>"` into its parts. Anything else yields `None`.
fn split_target(target: &str) -> Option<(ResourceType, &str)> {
    let (prefix, id) = target.split_once('/')?;
    let resource_type = prefix.parse::<ResourceType>().ok()?;
    if id.is_empty() || id.contains('/') {
        return None;
    }
    Some((resource_type, id))
}
