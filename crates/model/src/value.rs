//! Dynamic slot values and their runtime kinds
//!
//! Entities store every slot as a [`Value`]. The encoded form of an entity is a
//! [`Map`] whose values are JSON-representable (nested entities become maps,
//! flags become integers, type references become their short name).

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::entity::{Entity, EntityType};
use crate::flags::{FlagKind, FlagSet, Flags};

/// Ordered string-keyed map; the canonical encoded form of an entity.
pub type Map = BTreeMap<String, Value>;

/// A slot value.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Map(Map),
    Flags(Flags),
    Entity(Entity),
    /// A bare type reference, encoded as the type's short name
    Type(Rc<EntityType>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view; integers widen to float.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_flags(&self) -> Option<Flags> {
        match self {
            Self::Flags(flags) => Some(*flags),
            _ => None,
        }
    }

    pub fn as_entity(&self) -> Option<&Entity> {
        match self {
            Self::Entity(entity) => Some(entity),
            _ => None,
        }
    }

    /// Length of text (in characters), lists and maps.
    pub fn len(&self) -> Option<usize> {
        match self {
            Self::Str(s) => Some(s.chars().count()),
            Self::List(items) => Some(items.len()),
            Self::Map(map) => Some(map.len()),
            _ => None,
        }
    }

    /// Short description of the value's runtime type, used in error messages.
    pub fn type_name(&self) -> String {
        match self {
            Self::Null => "null".to_string(),
            Self::Bool(_) => "bool".to_string(),
            Self::Int(_) => "int".to_string(),
            Self::Float(_) => "float".to_string(),
            Self::Str(_) => "str".to_string(),
            Self::List(_) => "list".to_string(),
            Self::Map(_) => "dict".to_string(),
            Self::Flags(flags) => flags.kind().name().to_string(),
            Self::Entity(entity) => entity.entity_type().name().to_string(),
            Self::Type(_) => "type".to_string(),
        }
    }

    /// The kind a default value implies for an untyped slot.
    pub fn kind(&self) -> Option<ValueKind> {
        match self {
            Self::Null => None,
            Self::Bool(_) => Some(ValueKind::Bool),
            Self::Int(_) => Some(ValueKind::Int),
            Self::Float(_) => Some(ValueKind::Float),
            Self::Str(_) => Some(ValueKind::Str),
            Self::List(_) => Some(ValueKind::List),
            Self::Map(_) => Some(ValueKind::Map),
            Self::Flags(flags) => Some(ValueKind::Flags(flags.kind())),
            Self::Entity(entity) => Some(ValueKind::Entity(entity.entity_type().clone())),
            Self::Type(_) => None,
        }
    }

    /// Encode into the JSON-representable form used by `to_dict`.
    pub fn encode(&self, show_private: bool) -> Value {
        match self {
            Self::List(items) => Self::List(items.iter().map(|v| v.encode(show_private)).collect()),
            Self::Map(map) => Self::Map(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.encode(show_private)))
                    .collect(),
            ),
            Self::Flags(flags) => Self::Int(flags.bits() as i64),
            Self::Entity(entity) => Self::Map(entity.to_dict(&[], show_private)),
            Self::Type(ty) => Self::Str(ty.name().to_string()),
            other => other.clone(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            (Self::Flags(a), Self::Flags(b)) => a == b,
            (Self::Entity(a), Self::Entity(b)) => a == b,
            (Self::Type(a), Self::Type(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Str(s) => write!(f, "{s:?}"),
            Self::List(items) => {
                let parts: Vec<String> = items.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            Self::Map(map) => {
                let parts: Vec<String> = map.iter().map(|(k, v)| format!("{k:?}: {v}")).collect();
                write!(f, "{{{}}}", parts.join(", "))
            }
            Self::Flags(flags) => write!(f, "{flags}"),
            Self::Entity(entity) => write!(f, "<{}>", entity.entity_type().resolved_name()),
            Self::Type(ty) => write!(f, "{}", ty.name()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::Float(x) => serializer.serialize_f64(*x),
            Self::Str(s) => serializer.serialize_str(s),
            Self::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Map(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            }
            Self::Flags(flags) => serializer.serialize_u64(flags.bits()),
            Self::Entity(entity) => Value::Map(entity.to_dict(&[], false)).serialize(serializer),
            Self::Type(ty) => serializer.serialize_str(ty.name()),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => Self::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Self::Str(s),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Self::Map(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Self::$variant(value.into())
                }
            }
        )+
    };
}

value_from! {
    bool => Bool,
    i64 => Int,
    i32 => Int,
    u32 => Int,
    f64 => Float,
    f32 => Float,
    String => Str,
    &str => Str,
    Vec<Value> => List,
    Map => Map,
    Flags => Flags,
    Entity => Entity,
    Rc<EntityType> => Type,
}

impl<F: FlagSet> From<F> for Value {
    fn from(flags: F) -> Self {
        Self::Flags(flags.into())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Runtime type constraint for a slot.
#[derive(Debug, Clone)]
pub enum ValueKind {
    Bool,
    Int,
    Float,
    Str,
    List,
    Map,
    Flags(&'static FlagKind),
    /// An entity of this type or any of its subtypes
    Entity(Rc<EntityType>),
}

impl ValueKind {
    /// Exact match: an `Int` is not a `Float`, null matches nothing.
    pub fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::Bool, Value::Bool(_))
            | (Self::Int, Value::Int(_))
            | (Self::Float, Value::Float(_))
            | (Self::Str, Value::Str(_))
            | (Self::List, Value::List(_))
            | (Self::Map, Value::Map(_)) => true,
            (Self::Flags(kind), Value::Flags(flags)) => flags.kind() == *kind,
            (Self::Entity(ty), Value::Entity(entity)) => entity.entity_type().is_subtype_of(ty),
            _ => false,
        }
    }
}

impl PartialEq for ValueKind {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Flags(a), Self::Flags(b)) => a == b,
            (Self::Entity(a), Self::Entity(b)) => Rc::ptr_eq(a, b),
            (a, b) => std::mem::discriminant(a) == std::mem::discriminant(b),
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => write!(f, "bool"),
            Self::Int => write!(f, "int"),
            Self::Float => write!(f, "float"),
            Self::Str => write!(f, "str"),
            Self::List => write!(f, "list"),
            Self::Map => write!(f, "dict"),
            Self::Flags(kind) => write!(f, "{}", kind.name()),
            Self::Entity(ty) => write!(f, "{}", ty.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_numbers_split_into_int_and_float() {
        let value = Value::from(serde_json::json!({"a": 1, "b": 2.5, "c": [true, null]}));
        let map = value.as_map().unwrap();
        assert_eq!(map["a"], Value::Int(1));
        assert_eq!(map["b"], Value::Float(2.5));
        assert_eq!(map["c"], Value::List(vec![Value::Bool(true), Value::Null]));
    }

    #[test]
    fn kinds_match_exactly() {
        assert!(ValueKind::Int.matches(&Value::Int(3)));
        assert!(!ValueKind::Float.matches(&Value::Int(3)));
        assert!(!ValueKind::Str.matches(&Value::Null));
        assert!(ValueKind::Map.matches(&Value::Map(Map::new())));
    }

    #[test]
    fn text_length_counts_characters() {
        assert_eq!(Value::from("héllo").len(), Some(5));
        assert_eq!(Value::Int(5).len(), None);
    }

    #[test]
    fn serializes_to_plain_json() {
        let mut map = Map::new();
        map.insert("damage".to_string(), Value::Int(10));
        map.insert("name".to_string(), Value::from("Sword"));
        let json = serde_json::to_string(&Value::Map(map)).unwrap();
        assert_eq!(json, r#"{"damage":10,"name":"Sword"}"#);
    }
}
