//! Entity lookup ports.
//!
//! The translation layer never owns persistence. Every reference it resolves goes through one
//! of these ports, which the embedding application implements on top of its store.
//!
//! Contract for implementors:
//! - `get` returns `Ok(None)` for an unknown identifier; it must not fail for a miss.
//! - Any `Err` is treated as a downstream failure and propagated unchanged to the caller.
//! - Implementations must be safe for concurrent reads (`Send + Sync`).
//!
//! [`InMemoryStore`] is a complete implementation backed by a `HashMap`, used by tests and by
//! embedders that seed translators from fixtures.

use crate::{Concept, DomainEntity};
use std::collections::HashMap;
use std::sync::RwLock;

/// Errors raised by a lookup port.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("lookup service unavailable: {0}")]
    Unavailable(String),

    #[error("lookup backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("entity already exists: {0}")]
    AlreadyExists(String),

    #[error("entity not found: {0}")]
    NotFound(String),
}

/// Type alias for Results that can fail with a [`LookupError`].
pub type LookupResult<T> = Result<T, LookupError>;

/// Resolves an identifier to one kind of domain entity.
pub trait EntityLookup<E>: Send + Sync {
    /// Fetch the entity with the given identifier, or `None` if it is not known.
    fn get(&self, uuid: &str) -> LookupResult<Option<E>>;
}

/// A lookup port that can also persist entities.
pub trait EntityStore<E>: EntityLookup<E> {
    /// Store a new entity. Fails if the identifier is already taken.
    fn create(&self, entity: E) -> LookupResult<E>;

    /// Replace an existing entity. Fails if the identifier is unknown.
    fn update(&self, entity: E) -> LookupResult<E>;
}

/// Concept lookup, which can also resolve a concept through a terminology mapping.
pub trait ConceptLookup: EntityLookup<Concept> {
    /// Find the concept mapped to `code` in the concept source named `source`.
    fn get_by_mapping(&self, source: &str, code: &str) -> LookupResult<Option<Concept>>;
}

/// Thread-safe in-memory store keyed by entity uuid.
pub struct InMemoryStore<E> {
    entries: RwLock<HashMap<String, E>>,
}

impl<E> Default for InMemoryStore<E> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl<E: DomainEntity> InMemoryStore<E> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with `entities`. Later duplicates replace earlier ones.
    pub fn with_entities(entities: impl IntoIterator<Item = E>) -> Self {
        let entries = entities
            .into_iter()
            .map(|e| (e.uuid().to_owned(), e))
            .collect();
        Self {
            entries: RwLock::new(entries),
        }
    }

    /// Insert or replace an entity.
    pub fn insert(&self, entity: E) -> LookupResult<()> {
        let mut entries = self.write()?;
        entries.insert(entity.uuid().to_owned(), entity);
        Ok(())
    }

    /// Number of stored entities.
    pub fn len(&self) -> LookupResult<usize> {
        Ok(self.read()?.len())
    }

    /// True when nothing has been stored.
    pub fn is_empty(&self) -> LookupResult<bool> {
        Ok(self.read()?.is_empty())
    }

    fn read(&self) -> LookupResult<std::sync::RwLockReadGuard<'_, HashMap<String, E>>> {
        self.entries
            .read()
            .map_err(|_| LookupError::Unavailable("in-memory store lock poisoned".into()))
    }

    fn write(&self) -> LookupResult<std::sync::RwLockWriteGuard<'_, HashMap<String, E>>> {
        self.entries
            .write()
            .map_err(|_| LookupError::Unavailable("in-memory store lock poisoned".into()))
    }
}

impl<E: DomainEntity> EntityLookup<E> for InMemoryStore<E> {
    fn get(&self, uuid: &str) -> LookupResult<Option<E>> {
        let found = self.read()?.get(uuid).cloned();
        if found.is_none() {
            tracing::debug!(uuid, "in-memory lookup miss");
        }
        Ok(found)
    }
}

impl<E: DomainEntity> EntityStore<E> for InMemoryStore<E> {
    fn create(&self, entity: E) -> LookupResult<E> {
        let mut entries = self.write()?;
        if entries.contains_key(entity.uuid()) {
            return Err(LookupError::AlreadyExists(entity.uuid().to_owned()));
        }
        entries.insert(entity.uuid().to_owned(), entity.clone());
        Ok(entity)
    }

    fn update(&self, entity: E) -> LookupResult<E> {
        let mut entries = self.write()?;
        match entries.get_mut(entity.uuid()) {
            Some(slot) => {
                *slot = entity.clone();
                Ok(entity)
            }
            None => Err(LookupError::NotFound(entity.uuid().to_owned())),
        }
    }
}

impl ConceptLookup for InMemoryStore<Concept> {
    fn get_by_mapping(&self, source: &str, code: &str) -> LookupResult<Option<Concept>> {
        let entries = self.read()?;
        Ok(entries
            .values()
            .find(|c| c.code_in(source) == Some(code))
            .cloned())
    }
}
