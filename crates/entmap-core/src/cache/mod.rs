//! Module: cache
//! Responsibility: one shared entity instance per `(entity type, identity key)`.
//! Does not own: record fetching or relation resolution (see `session`).
//!
//! Invariants:
//! - The first successful construction for a key is the only one ever
//!   published for that key; later lookups return the same handle.
//! - Construction arguments on a hit are ignored; nothing is merged.
//! - A failed construction publishes nothing and leaves no slot behind.
//! - Concurrent lookups for one key construct at most once. The per-key
//!   slot lock is held only for the construction section.

mod key;


use crate::{
    entity::{Entity, EntityRef},
    error::InternalError,
    model::EntityRegistry,
    obs::{MetricsEvent, MetricsSink, NoopSink},
    record::RawRecord,
    traits::EntityKind,
    value::Value,
};
use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicUsize, Ordering},
    },
};

// re-exports
pub use key::{IdentityKey, IdentityKeyError};

///
/// CacheKey
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct CacheKey {
    pub entity: &'static str,
    pub key: IdentityKey,
}

type Slot = Arc<Mutex<Option<EntityRef>>>;

// No lock here guards a multi-step update, so a poisoned guard is still
// consistent.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

///
/// IdentityCache
///
/// Explicit, shareable cache object. Create one per scope that needs
/// isolation (a test, a request context, a process).
///

pub struct IdentityCache {
    registry: EntityRegistry,
    slots: Mutex<HashMap<CacheKey, Slot>>,
    published: AtomicUsize,
    sink: Arc<dyn MetricsSink>,
}

impl IdentityCache {
    #[must_use]
    pub fn new(registry: EntityRegistry) -> Self {
        Self {
            registry,
            slots: Mutex::new(HashMap::new()),
            published: AtomicUsize::new(0),
            sink: Arc::new(NoopSink),
        }
    }

    /// Replace the metrics sink.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn MetricsSink>) -> Self {
        self.sink = sink;
        self
    }

    #[must_use]
    pub const fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    /// Return the shared instance for the record's identity key, building it
    /// on first access.
    pub fn get_or_create(
        &self,
        entity_name: &str,
        record: &RawRecord,
        related: &[EntityRef],
    ) -> Result<EntityRef, InternalError> {
        let model = self.registry.get(entity_name)?;
        let key = CacheKey {
            entity: model.entity_name,
            key: IdentityKey::extract(model, record)?,
        };

        let slot = lock(&self.slots).entry(key.clone()).or_default().clone();
        let mut guard = lock(&slot);

        if let Some(entity) = guard.as_ref() {
            tracing::trace!(entity = key.entity, key = %key.key, "identity cache hit");
            self.record(MetricsEvent::CacheHit { entity: key.entity });

            return Ok(entity.clone());
        }

        self.record(MetricsEvent::CacheMiss { entity: key.entity });

        match Entity::new(model, record, related) {
            Ok(entity) => {
                let entity = EntityRef::new(entity);
                *guard = Some(entity.clone());
                self.published.fetch_add(1, Ordering::Release);

                tracing::debug!(
                    entity = key.entity,
                    key = %key.key,
                    related = related.len(),
                    "constructed entity"
                );
                self.record(MetricsEvent::EntityConstructed { entity: key.entity });

                Ok(entity)
            }
            Err(err) => {
                drop(guard);
                self.release_empty_slot(&key, &slot);
                self.record(MetricsEvent::ConstructFailed { entity: key.entity });

                Err(err)
            }
        }
    }

    // Drop the slot a failed construction left behind, unless another
    // caller is already waiting on it.
    fn release_empty_slot(&self, key: &CacheKey, slot: &Slot) {
        let mut slots = lock(&self.slots);
        let unshared = Arc::strong_count(slot) == 2;

        if unshared && lock(slot).is_none() {
            slots.remove(key);
        }
    }

    /// Same as [`Self::get_or_create`], accepting any supported raw shape.
    pub fn get_or_create_value(
        &self,
        entity_name: &str,
        raw: Value,
        related: &[EntityRef],
    ) -> Result<EntityRef, InternalError> {
        self.registry.get(entity_name)?;
        let record = RawRecord::try_from_value(raw)?;

        self.get_or_create(entity_name, &record, related)
    }

    /// Typed form of [`Self::get_or_create`].
    pub fn get_or_create_kind<E: EntityKind>(
        &self,
        record: &RawRecord,
        related: &[EntityRef],
    ) -> Result<EntityRef, InternalError> {
        self.get_or_create(E::ENTITY_NAME, record, related)
    }

    /// Look up a published instance without constructing anything.
    #[must_use]
    pub fn get(&self, entity_name: &str, key: &IdentityKey) -> Option<EntityRef> {
        let model = self.registry.get(entity_name).ok()?;
        let slot = lock(&self.slots)
            .get(&CacheKey {
                entity: model.entity_name,
                key: key.clone(),
            })
            .cloned()?;

        lock(&slot).clone()
    }

    #[must_use]
    pub fn contains(&self, entity_name: &str, key: &IdentityKey) -> bool {
        self.get(entity_name, key).is_some()
    }

    /// Number of published instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.published.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of per-key slots, published or not.
    #[cfg(test)]
    pub(crate) fn slot_count(&self) -> usize {
        lock(&self.slots).len()
    }

    pub(crate) fn record(&self, event: MetricsEvent) {
        self.sink.record(event);
    }
}

impl std::fmt::Debug for IdentityCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityCache")
            .field("registry", &self.registry)
            .field("published", &self.len())
            .finish_non_exhaustive()
    }
}
