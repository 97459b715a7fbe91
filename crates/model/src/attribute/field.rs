//! Slot declarations
//!
//! A [`Field`] is the author-facing description of one slot: its declared
//! type, default, bounds and flags. Entity type builders hand fields to the
//! resolver, which turns each into an [`Attribute`](super::Attribute).

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::entity::EntityType;
use crate::error::ModelError;
use crate::flags::{FlagKind, FlagSet};
use crate::value::{Value, ValueKind};

use super::{Coercion, Constraint, Expected, Number};

/// Declared type of a slot, as far as the resolver is concerned.
#[derive(Clone)]
pub enum TypeHint {
    Bool,
    Int,
    Float,
    Str,
    Dict,
    List,
    Flags(&'static FlagKind),
    Entity(Rc<EntityType>),
    /// Any other type name; resolved by name and left unchecked at runtime
    Named(String),
}

impl TypeHint {
    /// The name the resolver maps to an attribute class.
    pub fn type_name(&self) -> &str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Str => "str",
            Self::Dict => "dict",
            Self::List => "list",
            Self::Flags(_) => "flags",
            Self::Entity(_) => "reference",
            Self::Named(name) => name,
        }
    }

    pub fn value_kind(&self) -> Option<ValueKind> {
        match self {
            Self::Bool => Some(ValueKind::Bool),
            Self::Int => Some(ValueKind::Int),
            Self::Float => Some(ValueKind::Float),
            Self::Str => Some(ValueKind::Str),
            Self::Dict => Some(ValueKind::Map),
            Self::List => Some(ValueKind::List),
            Self::Flags(kind) => Some(ValueKind::Flags(kind)),
            Self::Entity(ty) => Some(ValueKind::Entity(ty.clone())),
            Self::Named(_) => None,
        }
    }
}

impl fmt::Debug for TypeHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flags(kind) => write!(f, "Flags({})", kind.name()),
            Self::Entity(ty) => write!(f, "Entity({})", ty.name()),
            other => write!(f, "{}", other.type_name()),
        }
    }
}

/// Declaration of one slot.
///
/// ```ignore
/// Field::int("damage").range(0, 1000).required()
/// Field::flags::<DamageType>("damage_type").default(DamageType::NO_DAMAGE_TYPE)
/// Field::text("uuid").default_with(identity_token).freeze().private()
/// ```
#[derive(Clone)]
pub struct Field {
    pub(crate) name: String,
    pub(crate) hint: Option<TypeHint>,
    pub(crate) default: Option<Value>,
    pub(crate) default_factory: Option<Rc<dyn Fn() -> Value>>,
    pub(crate) constraints: Vec<Constraint>,
    pub(crate) minimum: Option<Number>,
    pub(crate) maximum: Option<Number>,
    pub(crate) min_length: Option<usize>,
    pub(crate) max_length: Option<usize>,
    pub(crate) expected: Option<BTreeMap<String, Expected>>,
    pub(crate) freeze: bool,
    pub(crate) post_process: Option<Rc<dyn Fn(Value) -> Value>>,
    pub(crate) weak: bool,
    pub(crate) required: bool,
    pub(crate) private: bool,
    pub(crate) init: bool,
    pub(crate) to_type: Option<Coercion>,
    pub(crate) misc: BTreeMap<String, Value>,
}

impl Field {
    /// An untyped slot; its value kind is taken from the default, if any.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hint: None,
            default: None,
            default_factory: None,
            constraints: Vec::new(),
            minimum: None,
            maximum: None,
            min_length: None,
            max_length: None,
            expected: None,
            freeze: false,
            post_process: None,
            weak: false,
            required: false,
            private: false,
            init: true,
            to_type: None,
            misc: BTreeMap::new(),
        }
    }

    pub fn typed(name: impl Into<String>, hint: TypeHint) -> Self {
        Self {
            hint: Some(hint),
            ..Self::new(name)
        }
    }

    pub fn int(name: impl Into<String>) -> Self {
        Self::typed(name, TypeHint::Int)
    }

    pub fn float(name: impl Into<String>) -> Self {
        Self::typed(name, TypeHint::Float)
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::typed(name, TypeHint::Str)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::typed(name, TypeHint::Bool)
    }

    pub fn dict(name: impl Into<String>) -> Self {
        Self::typed(name, TypeHint::Dict)
    }

    pub fn list(name: impl Into<String>) -> Self {
        Self::typed(name, TypeHint::List)
    }

    /// A flag-set slot. Strings and integers written to it are normalized.
    pub fn flags<F: FlagSet>(name: impl Into<String>) -> Self {
        Self::typed(name, TypeHint::Flags(F::KIND))
    }

    /// A nested entity slot. Maps decode into `ty`, strings resolve as ids.
    pub fn reference(name: impl Into<String>, ty: &Rc<EntityType>) -> Self {
        Self::typed(name, TypeHint::Entity(ty.clone()))
    }

    /// A list of entities of `ty`, empty by default.
    pub fn entity_list(name: impl Into<String>, ty: &Rc<EntityType>) -> Self {
        let mut field = Self::list(name).default_with(|| Value::List(Vec::new()));
        field.to_type = Some(Coercion::ListOf(Box::new(Coercion::Entity(ty.clone()))));
        field
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hint(&self) -> Option<&TypeHint> {
        self.hint.as_ref()
    }

    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Produce a fresh default on every materialization.
    pub fn default_with(mut self, factory: impl Fn() -> Value + 'static) -> Self {
        self.default_factory = Some(Rc::new(factory));
        self
    }

    pub fn constraint(
        mut self,
        label: impl Into<String>,
        check: impl Fn(&Value) -> bool + 'static,
    ) -> Self {
        self.constraints.push(Constraint::new(label, check));
        self
    }

    pub fn minimum(mut self, min: impl Into<Number>) -> Self {
        self.minimum = Some(min.into());
        self
    }

    pub fn maximum(mut self, max: impl Into<Number>) -> Self {
        self.maximum = Some(max.into());
        self
    }

    pub fn range(self, min: impl Into<Number>, max: impl Into<Number>) -> Self {
        self.minimum(min).maximum(max)
    }

    pub fn min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    /// Restrict a dict slot to `key`, whose value must satisfy `expected`.
    pub fn expect_key(mut self, key: impl Into<String>, expected: Expected) -> Self {
        self.expected
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), expected);
        self
    }

    /// Make the slot immutable after its first successful write.
    pub fn freeze(mut self) -> Self {
        self.freeze = true;
        self
    }

    pub fn post_process(mut self, process: impl Fn(Value) -> Value + 'static) -> Self {
        self.post_process = Some(Rc::new(process));
        self
    }

    /// Hold the referenced entity without keeping it alive.
    pub fn weak(mut self) -> Self {
        self.weak = true;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Hidden from encoding unless private output is requested.
    pub fn private(mut self) -> Self {
        self.private = true;
        self
    }

    /// Not a constructor parameter; decode leaves it at its default.
    pub fn no_init(mut self) -> Self {
        self.init = false;
        self
    }

    pub fn coerce_with(
        mut self,
        convert: impl Fn(Value) -> Result<Value, ModelError> + 'static,
    ) -> Self {
        self.to_type = Some(Coercion::Custom(Rc::new(convert)));
        self
    }

    /// Free-form metadata carried alongside the slot.
    pub fn misc(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.misc.insert(key.into(), value.into());
        self
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("hint", &self.hint)
            .field("default", &self.default)
            .field("freeze", &self.freeze)
            .field("weak", &self.weak)
            .field("required", &self.required)
            .field("private", &self.private)
            .finish_non_exhaustive()
    }
}
