//! Metrics sink boundary.
//!
//! The cache and session report through `MetricsEvent` and `MetricsSink`
//! only. Sinks are injected per cache; there is no process-global sink.

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MetricsEvent {
    CacheHit { entity: &'static str },
    CacheMiss { entity: &'static str },
    EntityConstructed { entity: &'static str },
    ConstructFailed { entity: &'static str },
    SourceFetch { entity: &'static str },
    SourceFailed { entity: &'static str },
}

impl MetricsEvent {
    #[must_use]
    pub const fn entity(&self) -> &'static str {
        match self {
            Self::CacheHit { entity }
            | Self::CacheMiss { entity }
            | Self::EntityConstructed { entity }
            | Self::ConstructFailed { entity }
            | Self::SourceFetch { entity }
            | Self::SourceFailed { entity } => *entity,
        }
    }
}

///
/// MetricsSink
///

pub trait MetricsSink: Send + Sync {
    fn record(&self, event: MetricsEvent);
}

///
/// NoopSink
/// Default sink when nothing observes the cache.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl MetricsSink for NoopSink {
    fn record(&self, _: MetricsEvent) {}
}
