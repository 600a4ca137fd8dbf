use crate::{
    entity::{Entity, EntityError},
    error::InternalError,
    record::RawRecord,
    value::{FieldValue, Value},
};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt, iter::FusedIterator, str::FromStr};

///
/// GapMode
///
/// How ordered export treats a declared field that has no value.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GapMode {
    /// Stop at the first unset field; later fields are excluded even if set.
    #[default]
    StopAtGap,
    /// Skip unset fields and continue through the declared order.
    SkipGaps,
}

///
/// ExportFormat
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    /// Unordered key → value mapping.
    #[default]
    Mapping,
    /// Explicitly ordered `(key, value)` pairs.
    OrderedPairs,
}

impl FromStr for ExportFormat {
    type Err = InternalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mapping" => Ok(Self::Mapping),
            "orderedPairs" | "ordered_pairs" => Ok(Self::OrderedPairs),
            other => Err(EntityError::UnsupportedFormat {
                format: other.to_string(),
            }
            .into()),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Mapping => "mapping",
            Self::OrderedPairs => "orderedPairs",
        };
        write!(f, "{label}")
    }
}

///
/// Fields
///
/// Lazy walk over an entity's populated fields in declaration order.
/// Computed fresh from the entity on every call; holds no shared position.
///

pub struct Fields<'a> {
    entity: &'a Entity,
    position: usize,
    mode: GapMode,
}

impl<'a> Fields<'a> {
    pub(super) const fn new(entity: &'a Entity, mode: GapMode) -> Self {
        Self {
            entity,
            position: 0,
            mode,
        }
    }
}

impl<'a> Iterator for Fields<'a> {
    type Item = (&'static str, &'a FieldValue);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((name, value)) = self.entity.value_at(self.position) {
            self.position += 1;

            match (value, self.mode) {
                (Some(value), _) => return Some((name, value)),
                (None, GapMode::SkipGaps) => {}
                (None, GapMode::StopAtGap) => {
                    self.position = self.entity.model().field_count();
                    return None;
                }
            }
        }

        None
    }
}

impl FusedIterator for Fields<'_> {}

///
/// ExportedRecord
///
/// Snapshot of an entity's ordered export in the requested shape.
/// `OrderedPairs` serializes as a list of `[key, value]` pairs.
///

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ExportedRecord {
    Mapping(BTreeMap<String, Value>),
    OrderedPairs(Vec<(String, Value)>),
}

impl ExportedRecord {
    pub(super) fn collect<'a>(
        format: ExportFormat,
        fields: impl Iterator<Item = (&'static str, &'a FieldValue)>,
        mode: GapMode,
    ) -> Self {
        let pairs = fields.map(|(name, value)| (name.to_string(), value.to_value_with(mode)));

        match format {
            ExportFormat::Mapping => Self::Mapping(pairs.collect()),
            ExportFormat::OrderedPairs => Self::OrderedPairs(pairs.collect()),
        }
    }

    #[must_use]
    pub const fn format(&self) -> ExportFormat {
        match self {
            Self::Mapping(_) => ExportFormat::Mapping,
            Self::OrderedPairs(_) => ExportFormat::OrderedPairs,
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Self::Mapping(map) => map.get(key),
            Self::OrderedPairs(pairs) => pairs.iter().find_map(|(k, v)| (k == key).then_some(v)),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Mapping(map) => map.len(),
            Self::OrderedPairs(pairs) => pairs.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keys in the order this shape yields them.
    pub fn keys(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        match self {
            Self::Mapping(map) => Box::new(map.keys().map(String::as_str)),
            Self::OrderedPairs(pairs) => Box::new(pairs.iter().map(|(k, _)| k.as_str())),
        }
    }

    /// Convert into one nested `Value::Map`.
    #[must_use]
    pub fn into_value(self) -> Value {
        match self {
            Self::Mapping(map) => Value::Map(map.into_iter().collect()),
            Self::OrderedPairs(pairs) => Value::Map(pairs),
        }
    }

    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Mapping(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
            Self::OrderedPairs(pairs) => serde_json::Value::Array(
                pairs
                    .iter()
                    .map(|(k, v)| serde_json::json!([k, v.to_json()]))
                    .collect(),
            ),
        }
    }
}

// Exported records are keyed by exposed names, which construction accepts
// through the exposed-name fallback.
impl From<ExportedRecord> for RawRecord {
    fn from(record: ExportedRecord) -> Self {
        match record {
            ExportedRecord::Mapping(map) => Self::from(map),
            ExportedRecord::OrderedPairs(pairs) => Self::from_pairs(pairs),
        }
    }
}
