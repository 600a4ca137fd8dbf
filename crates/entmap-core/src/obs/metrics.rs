use crate::obs::sink::{MetricsEvent, MetricsSink};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    sync::{Mutex, PoisonError},
};

///
/// EventReport
/// Ephemeral, in-memory counters for cache and source activity.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct EventReport {
    pub ops: EventOps,
    pub entities: BTreeMap<String, EntityCounters>,
}

///
/// EventOps
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct EventOps {
    // Identity cache
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub entities_constructed: u64,
    pub construct_failures: u64,

    // Record sources
    pub source_fetches: u64,
    pub source_failures: u64,
}

impl EventOps {
    fn apply(&mut self, event: MetricsEvent) {
        let counter = match event {
            MetricsEvent::CacheHit { .. } => &mut self.cache_hits,
            MetricsEvent::CacheMiss { .. } => &mut self.cache_misses,
            MetricsEvent::EntityConstructed { .. } => &mut self.entities_constructed,
            MetricsEvent::ConstructFailed { .. } => &mut self.construct_failures,
            MetricsEvent::SourceFetch { .. } => &mut self.source_fetches,
            MetricsEvent::SourceFailed { .. } => &mut self.source_failures,
        };
        *counter = counter.saturating_add(1);
    }
}

///
/// EntityCounters
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct EntityCounters {
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub constructed: u64,
    pub source_fetches: u64,
}

impl EntityCounters {
    fn apply(&mut self, event: MetricsEvent) {
        let counter = match event {
            MetricsEvent::CacheHit { .. } => &mut self.cache_hits,
            MetricsEvent::CacheMiss { .. } => &mut self.cache_misses,
            MetricsEvent::EntityConstructed { .. } => &mut self.constructed,
            MetricsEvent::SourceFetch { .. } => &mut self.source_fetches,
            MetricsEvent::ConstructFailed { .. } | MetricsEvent::SourceFailed { .. } => return,
        };
        *counter = counter.saturating_add(1);
    }
}

///
/// MetricsRecorder
/// Sink that accumulates events into an `EventReport`.
///

#[derive(Debug, Default)]
pub struct MetricsRecorder {
    state: Mutex<EventReport>,
}

impl MetricsRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Point-in-time copy of all counters.
    #[must_use]
    pub fn report(&self) -> EventReport {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Reset all counters (useful in tests).
    pub fn reset(&self) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = EventReport::default();
    }
}

impl MetricsSink for MetricsRecorder {
    fn record(&self, event: MetricsEvent) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        state.ops.apply(event);
        state
            .entities
            .entry(event.entity().to_string())
            .or_default()
            .apply(event);
    }
}
