//! Module: session
//! Responsibility: load entities by id from bound record sources, resolving
//! declared relations through the shared identity cache.
//! Does not own: field resolution or identity (see `entity`, `cache`).
//!
//! Invariants:
//! - A record whose identity is already cached is returned as the cached
//!   instance; its relations are not resolved again.
//! - Relation resolution is bounded by `relations.max_depth`.

#[cfg(test)]
mod tests;

use crate::{
    cache::{IdentityCache, IdentityKey},
    config::Config,
    entity::{Entity, EntityRef, ExportedRecord},
    error::{ErrorClass, ErrorKind, ErrorOrigin, InternalError},
    model::{Cardinality, EntityModel, EntityRegistry, RelationModel},
    obs::{EventReport, MetricsEvent, MetricsRecorder},
    record::RawRecord,
    source::RecordSource,
    traits::EntityKind,
    value::Value,
};
use std::{collections::BTreeMap, fmt, sync::Arc};
use thiserror::Error as ThisError;

///
/// SessionError
///

#[derive(Debug, ThisError)]
pub enum SessionError {
    #[error("no record source bound for '{entity}'")]
    MissingSource { entity: &'static str },

    #[error("resolving relations of '{entity}' exceeded max depth {max}")]
    RelationDepthExceeded { entity: &'static str, max: u32 },
}

impl From<SessionError> for InternalError {
    fn from(err: SessionError) -> Self {
        let (class, kind) = match err {
            SessionError::MissingSource { .. } => {
                (ErrorClass::Unavailable, ErrorKind::MissingSource)
            }
            SessionError::RelationDepthExceeded { .. } => {
                (ErrorClass::Unsupported, ErrorKind::RelationDepthExceeded)
            }
        };

        Self::new(class, ErrorOrigin::Session, kind, err.to_string())
    }
}

///
/// Session
///
/// Generic facade over an identity cache and one record source per entity
/// type. Cheap to share behind an `Arc`; all methods take `&self` once the
/// sources are bound.
///

pub struct Session {
    cache: Arc<IdentityCache>,
    sources: BTreeMap<&'static str, Arc<dyn RecordSource>>,
    config: Config,
    metrics: Option<Arc<MetricsRecorder>>,
}

impl Session {
    /// Build a session with its own cache. When metrics are enabled a
    /// `MetricsRecorder` is wired into that cache.
    pub fn new(registry: EntityRegistry, config: Config) -> Result<Self, InternalError> {
        config.validate()?;

        let (cache, metrics) = if config.metrics.enabled {
            let recorder = Arc::new(MetricsRecorder::new());
            let cache = IdentityCache::new(registry).with_sink(recorder.clone());
            (cache, Some(recorder))
        } else {
            (IdentityCache::new(registry), None)
        };

        Ok(Self {
            cache: Arc::new(cache),
            sources: BTreeMap::new(),
            config,
            metrics,
        })
    }

    /// Build a session over an existing cache, sharing its instances with
    /// every other holder of the cache. The cache keeps its own sink.
    pub fn with_cache(cache: Arc<IdentityCache>, config: Config) -> Result<Self, InternalError> {
        config.validate()?;

        Ok(Self {
            cache,
            sources: BTreeMap::new(),
            config,
            metrics: None,
        })
    }

    /// Bind the record source for a registered entity type, replacing any
    /// earlier binding.
    pub fn bind_source(
        &mut self,
        entity_name: &str,
        source: impl RecordSource + 'static,
    ) -> Result<(), InternalError> {
        let model = self.cache.registry().get(entity_name)?;
        self.sources.insert(model.entity_name, Arc::new(source));

        Ok(())
    }

    /// Builder form of [`Self::bind_source`] for a typed entity.
    pub fn bind<E: EntityKind>(
        mut self,
        source: impl RecordSource + 'static,
    ) -> Result<Self, InternalError> {
        self.bind_source(E::ENTITY_NAME, source)?;
        Ok(self)
    }

    /// Load one entity by id.
    pub fn load(&self, entity_name: &str, id: &Value) -> Result<EntityRef, InternalError> {
        let model = self.cache.registry().get(entity_name)?;

        self.load_at(model, id, 0)
    }

    /// Typed form of [`Self::load`].
    pub fn load_kind<E: EntityKind>(&self, id: impl Into<Value>) -> Result<EntityRef, InternalError> {
        self.load(E::ENTITY_NAME, &id.into())
    }

    /// Export with the configured default format and gap mode.
    #[must_use]
    pub fn export(&self, entity: &Entity) -> ExportedRecord {
        entity.to_record_with(self.config.export.default_format, self.config.export.gap_mode)
    }

    #[must_use]
    pub fn cache(&self) -> &Arc<IdentityCache> {
        &self.cache
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Snapshot of the session's own metrics, if it records any.
    #[must_use]
    pub fn metrics_report(&self) -> Option<EventReport> {
        self.metrics.as_ref().map(|m| m.report())
    }

    fn load_at(
        &self,
        model: &'static EntityModel,
        id: &Value,
        depth: u32,
    ) -> Result<EntityRef, InternalError> {
        let record = self.fetch(model, id)?;
        let key = IdentityKey::extract(model, &record)?;

        if self.cache.contains(model.entity_name, &key) {
            return self.cache.get_or_create(model.entity_name, &record, &[]);
        }

        let mut related = Vec::new();
        for relation in model.relations {
            self.resolve_relation(model, relation, &record, depth, &mut related)?;
        }

        self.cache.get_or_create(model.entity_name, &record, &related)
    }

    fn resolve_relation(
        &self,
        model: &'static EntityModel,
        relation: &RelationModel,
        record: &RawRecord,
        depth: u32,
        related: &mut Vec<EntityRef>,
    ) -> Result<(), InternalError> {
        let Some(ids) = relation.foreign_key.and_then(|fk| record.get(fk)) else {
            return Ok(());
        };

        let max = self.config.relations.max_depth;
        if depth >= max {
            return Err(SessionError::RelationDepthExceeded {
                entity: model.entity_name,
                max,
            }
            .into());
        }

        let target = self.cache.registry().get(relation.target)?;
        tracing::trace!(
            entity = model.entity_name,
            target = target.entity_name,
            cardinality = %relation.cardinality,
            depth,
            "resolving relation"
        );

        match (relation.cardinality, ids) {
            (Cardinality::Multiple, Value::List(ids)) => {
                for id in ids.iter().filter(|id| !id.is_null()) {
                    related.push(self.load_at(target, id, depth + 1)?);
                }
            }
            (_, id) => related.push(self.load_at(target, id, depth + 1)?),
        }

        Ok(())
    }

    fn fetch(&self, model: &'static EntityModel, id: &Value) -> Result<RawRecord, InternalError> {
        let entity = model.entity_name;
        let source = self
            .sources
            .get(entity)
            .ok_or(SessionError::MissingSource { entity })?;

        tracing::debug!(entity, id = %id.to_json(), "fetching record");
        self.cache.record(MetricsEvent::SourceFetch { entity });

        source.fetch_by_id(id).map_err(|err| {
            tracing::debug!(entity, error = %err, "record fetch failed");
            self.cache.record(MetricsEvent::SourceFailed { entity });

            err.into()
        })
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("cache", &self.cache)
            .field("sources", &self.sources.keys().collect::<Vec<_>>())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
