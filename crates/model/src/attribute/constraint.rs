//! Labelled value predicates attached to attributes

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::value::{Value, ValueKind};

/// A named predicate. The label is reported when the predicate fails.
#[derive(Clone)]
pub struct Constraint {
    label: String,
    check: Rc<dyn Fn(&Value) -> bool>,
}

impl Constraint {
    pub fn new(label: impl Into<String>, check: impl Fn(&Value) -> bool + 'static) -> Self {
        Self {
            label: label.into(),
            check: Rc::new(check),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn check(&self, value: &Value) -> bool {
        (self.check)(value)
    }

    /// Inclusive numeric range. `None` when there is nothing to check.
    pub fn range(bounds: Bounds<Number>) -> Option<Self> {
        if bounds == Bounds::Unbounded {
            return None;
        }
        let label = bounds.describe();
        Some(Self::new(label, move |value| {
            Number::of(value).is_some_and(|x| bounds.contains(x))
        }))
    }

    /// Inclusive length range for text, lists and maps.
    pub fn length(bounds: Bounds<usize>) -> Option<Self> {
        if bounds == Bounds::Unbounded {
            return None;
        }
        let label = format!("length {}", bounds.describe());
        Some(Self::new(label, move |value| {
            value.len().is_some_and(|n| bounds.contains(n))
        }))
    }

    /// Map whose keys all belong to `expected` and whose values satisfy the
    /// expected kind for their key.
    pub fn keys(expected: BTreeMap<String, Expected>) -> Self {
        let names: Vec<&str> = expected.keys().map(String::as_str).collect();
        let label = format!("keys within {{{}}}", names.join(", "));
        Self::new(label, move |value| match value {
            Value::Map(map) => map.iter().all(|(key, item)| {
                expected
                    .get(key)
                    .is_some_and(|expectation| expectation.accepts(item))
            }),
            _ => false,
        })
    }
}

impl fmt::Debug for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Constraint").field(&self.label).finish()
    }
}

/// A range bound or checked value. Integers compare exactly against
/// integers; anything involving a float compares as `f64`.
#[derive(Debug, Clone, Copy)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Int(i) => Some(Self::Int(*i)),
            Value::Float(x) => Some(Self::Float(*x)),
            _ => None,
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Self::Int(i) => i as f64,
            Self::Float(x) => x,
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.partial_cmp(other) == Some(Ordering::Equal)
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (*self, *other) {
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(&b)),
            (a, b) => a.as_f64().partial_cmp(&b.as_f64()),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
        }
    }
}

macro_rules! number_from {
    ($($ty:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$ty> for Number {
                fn from(value: $ty) -> Self {
                    Self::$variant(value.into())
                }
            }
        )+
    };
}

number_from! {
    i32 => Int,
    i64 => Int,
    u32 => Int,
    f32 => Float,
    f64 => Float,
}

/// Inclusive bounds, folded once at declaration time so a check never tests a
/// bound that was not supplied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bounds<T> {
    Unbounded,
    AtLeast(T),
    AtMost(T),
    Between(T, T),
}

impl<T: PartialOrd + Copy + fmt::Display> Bounds<T> {
    pub fn new(min: Option<T>, max: Option<T>) -> Self {
        match (min, max) {
            (None, None) => Self::Unbounded,
            (Some(min), None) => Self::AtLeast(min),
            (None, Some(max)) => Self::AtMost(max),
            (Some(min), Some(max)) => Self::Between(min, max),
        }
    }

    pub fn contains(&self, value: T) -> bool {
        match *self {
            Self::Unbounded => true,
            Self::AtLeast(min) => min <= value,
            Self::AtMost(max) => value <= max,
            Self::Between(min, max) => min <= value && value <= max,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Unbounded => "unbounded".to_string(),
            Self::AtLeast(min) => format!("at least {min}"),
            Self::AtMost(max) => format!("at most {max}"),
            Self::Between(min, max) => format!("between {min} and {max}"),
        }
    }
}

/// What a map entry must hold.
#[derive(Debug, Clone)]
pub struct Expected {
    kind: ValueKind,
    optional: bool,
}

impl Expected {
    pub fn of(kind: ValueKind) -> Self {
        Self {
            kind,
            optional: false,
        }
    }

    /// Also satisfied by null.
    pub fn optional(kind: ValueKind) -> Self {
        Self {
            kind,
            optional: true,
        }
    }

    pub fn accepts(&self, value: &Value) -> bool {
        (self.optional && value.is_null()) || self.kind.matches(value)
    }
}
