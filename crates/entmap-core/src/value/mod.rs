
use crate::entity::{EntityRef, GapMode};
use serde::{Serialize, Serializer, ser::SerializeMap};

///
/// Value
///
/// Raw data carried by records and scalar entity fields.
///
/// Null   → explicitly empty; treated as absent during field resolution.
/// Map    → ordered key/value pairs; insertion order is preserved.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Bool(bool),
    Float(f64),
    Int(i64),
    /// Ordered list of values.
    List(Vec<Self>),
    Map(Vec<(String, Self)>),
    Null,
    Text(String),
    Uint(u64),
}

impl Value {
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_map(&self) -> Option<&[(String, Self)]> {
        match self {
            Self::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Look up one key in a `Map` value (last duplicate wins).
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Self> {
        self.as_map()?
            .iter()
            .rev()
            .find_map(|(k, v)| (k == key).then_some(v))
    }

    /// Short label used in diagnostics.
    #[must_use]
    pub const fn type_label(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Float(_) => "float",
            Self::Int(_) => "int",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Null => "null",
            Self::Text(_) => "text",
            Self::Uint(_) => "uint",
        }
    }

    /// Convert into a `serde_json::Value` for downstream serialization.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Float(f) => serde_json::Number::from_f64(*f)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Self::Int(i) => serde_json::Value::from(*i),
            Self::List(items) => serde_json::Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Map(entries) => serde_json::Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            Self::Null => serde_json::Value::Null,
            Self::Text(s) => serde_json::Value::String(s.clone()),
            Self::Uint(u) => serde_json::Value::from(*u),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Float(f) => serializer.serialize_f64(*f),
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::List(items) => serializer.collect_seq(items),
            Self::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            Self::Null => serializer.serialize_unit(),
            Self::Text(s) => serializer.serialize_str(s),
            Self::Uint(u) => serializer.serialize_u64(*u),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Self::Uint(u)
                } else {
                    Self::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Self::Text(s),
            serde_json::Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            serde_json::Value::Object(entries) => {
                Self::Map(entries.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

macro_rules! impl_value_from {
    ( $( $ty:ty => $variant:ident ),* $(,)? ) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Self::$variant(v.into())
                }
            }
        )*
    };
}

impl_value_from! {
    bool => Bool,
    f32 => Float,
    f64 => Float,
    i8 => Int,
    i16 => Int,
    i32 => Int,
    i64 => Int,
    u8 => Uint,
    u16 => Uint,
    u32 => Uint,
    u64 => Uint,
    String => Text,
    &str => Text,
}

impl<T: Into<Self>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

///
/// FieldValue
///
/// Typed container for one exposed entity field: a raw scalar, a single
/// related entity, or an ordered sequence of related entities.
///

#[derive(Clone, Debug)]
pub enum FieldValue {
    Scalar(Value),
    Entity(EntityRef),
    Entities(Vec<EntityRef>),
}

impl FieldValue {
    #[must_use]
    pub const fn as_scalar(&self) -> Option<&Value> {
        match self {
            Self::Scalar(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_entity(&self) -> Option<&EntityRef> {
        match self {
            Self::Entity(e) => Some(e),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_entities(&self) -> Option<&[EntityRef]> {
        match self {
            Self::Entities(list) => Some(list),
            _ => None,
        }
    }

    /// Snapshot this field as a plain value; related entities export as
    /// nested ordered maps using the compatible gap mode.
    #[must_use]
    pub fn to_value(&self) -> Value {
        self.to_value_with(GapMode::StopAtGap)
    }

    #[must_use]
    pub fn to_value_with(&self, mode: GapMode) -> Value {
        match self {
            Self::Scalar(v) => v.clone(),
            Self::Entity(e) => e.to_value_with(mode),
            Self::Entities(list) => {
                Value::List(list.iter().map(|e| e.to_value_with(mode)).collect())
            }
        }
    }
}

impl PartialEq for FieldValue {
    // Related entities compare by identity, never by content.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Scalar(a), Self::Scalar(b)) => a == b,
            (Self::Entity(a), Self::Entity(b)) => EntityRef::ptr_eq(a, b),
            (Self::Entities(a), Self::Entities(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| EntityRef::ptr_eq(x, y))
            }
            _ => false,
        }
    }
}

impl From<Value> for FieldValue {
    fn from(v: Value) -> Self {
        Self::Scalar(v)
    }
}

impl From<EntityRef> for FieldValue {
    fn from(e: EntityRef) -> Self {
        Self::Entity(e)
    }
}
