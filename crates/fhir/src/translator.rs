//! The bidirectional translator capability.
//!
//! Every translator in this crate, from a single reference up to a full resource, implements
//! [`Translator`]. Composite translators depend on this capability (usually as
//! [`DynTranslator`]) rather than on concrete translator types.
//!
//! Absent values are modelled as `None` on both sides: `None` in always gives `Ok(None)` out.

use crate::wire::WireResource;
use crate::FhirResult;
use clinical_model::EntityLookup;
use std::sync::Arc;

/// Two-way conversion between a domain value `D` and a wire value `W`.
pub trait Translator<D, W>: Send + Sync {
    /// Translate a domain value to its wire form.
    fn to_wire(&self, domain: Option<&D>) -> FhirResult<Option<W>>;

    /// Translate a wire value back to the domain.
    fn to_domain(&self, wire: Option<&W>) -> FhirResult<Option<D>>;
}

/// A translator that can also merge a wire value onto an existing domain entity.
///
/// Merging only touches the fields the wire value carries. Fields left unset on the wire keep
/// their existing domain value.
pub trait UpdatableTranslator<D, W>: Translator<D, W> {
    /// Build a new domain entity from `wire`.
    fn create(&self, wire: &W) -> FhirResult<D>;

    /// Merge `wire` onto `existing` and return the result.
    fn to_domain_update(&self, existing: D, wire: &W) -> FhirResult<D>;
}

/// Shared handle to a translator, as injected into composite translators.
pub type DynTranslator<D, W> = Arc<dyn Translator<D, W>>;

/// Translate an inbound resource, updating the known entity when the resource id matches one.
///
/// If `wire` carries an id that `lookup` resolves, the result is that entity with `wire`
/// merged onto it. Otherwise a new entity is created. Nothing is persisted.
pub fn translate_inbound<D, W, T>(
    translator: &T,
    lookup: &dyn EntityLookup<D>,
    wire: &W,
) -> FhirResult<D>
where
    W: WireResource,
    T: UpdatableTranslator<D, W> + ?Sized,
{
    if let Some(id) = wire.id() {
        if let Some(existing) = lookup.get(id)? {
            tracing::debug!(id, resource_type = %W::RESOURCE_TYPE, "updating existing entity");
            return translator.to_domain_update(existing, wire);
        }
    }
    translator.create(wire)
}
