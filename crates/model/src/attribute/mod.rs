//! Attribute descriptors - constrained, typed, lazily-defaulted entity slots
//!
//! One [`Attribute`] exists per declared slot per entity type and is shared by
//! every instance of that type. All per-instance state (the stored value and
//! the freeze flag) lives in the entity itself, so freezing a slot on one
//! instance never affects another.
//!
//! Authors declare slots with [`Field`]; the [`resolver`] picks the attribute
//! class for the declared type and builds the descriptor.

mod constraint;
mod field;
pub mod resolver;

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::config::Validation;
use crate::entity::{Entity, EntityType, Slot};
use crate::error::ModelError;
use crate::flags::FlagKind;
use crate::value::{Value, ValueKind};

pub use constraint::{Bounds, Constraint, Expected, Number};
pub use field::{Field, TypeHint};
pub use resolver::{resolve, AttributeClass, Specialization};

/// How a slot obtains its value before the first write.
#[derive(Clone, Default)]
pub enum DefaultValue {
    #[default]
    None,
    Value(Value),
    Factory(Rc<dyn Fn() -> Value>),
}

impl DefaultValue {
    pub fn is_some(&self) -> bool {
        !matches!(self, Self::None)
    }

    fn produce(&self) -> Value {
        match self {
            Self::None => Value::Null,
            Self::Value(value) => value.clone(),
            Self::Factory(factory) => factory(),
        }
    }
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Factory(_) => write!(f, "Factory(..)"),
        }
    }
}

/// Normalization applied by the entity setter before the attribute sees a
/// value (`to_type` metadata).
#[derive(Clone)]
pub enum Coercion {
    /// Integers decompose into members, strings name a single member
    Flags(&'static FlagKind),
    /// Maps decode into the type, strings resolve as identity tokens
    Entity(Rc<EntityType>),
    /// Apply the inner coercion to every list element
    ListOf(Box<Coercion>),
    Custom(Rc<dyn Fn(Value) -> Result<Value, ModelError>>),
}

impl Coercion {
    /// Normalize a value headed for `slot`.
    pub fn coerce(&self, slot: &str, value: Value) -> Result<Value, ModelError> {
        match self {
            Self::Flags(kind) => match value {
                Value::Str(name) => kind.member(&name).map(Value::Flags),
                Value::Int(bits) => kind.normalize(bits).map(Value::Flags),
                Value::Flags(flags) if flags.kind() == *kind => {
                    let bits = i64::try_from(flags.bits())
                        .map_err(|_| ModelError::invalid_flag(kind.name(), flags.bits().to_string()))?;
                    kind.normalize(bits).map(Value::Flags)
                }
                other => Ok(other),
            },
            Self::Entity(ty) => match value {
                Value::Map(map) => ty.from_dict(&map).map(Value::Entity),
                Value::Str(id) => ty.find_by_id(&id).map(Value::Entity),
                Value::Entity(entity) if entity.entity_type().is_subtype_of(ty) => {
                    Ok(Value::Entity(entity))
                }
                Value::Null => Ok(Value::Null),
                other => Err(ModelError::type_mismatch(slot, ty.name(), other.type_name())),
            },
            Self::ListOf(inner) => match value {
                Value::List(items) => items
                    .into_iter()
                    .map(|item| match item {
                        Value::Null => Err(ModelError::type_mismatch(slot, "list element", "null")),
                        item => inner.coerce(slot, item),
                    })
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::List),
                other => Ok(other),
            },
            Self::Custom(convert) => convert(value),
        }
    }
}

impl fmt::Debug for Coercion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flags(kind) => write!(f, "Flags({})", kind.name()),
            Self::Entity(ty) => write!(f, "Entity({})", ty.name()),
            Self::ListOf(inner) => f.debug_tuple("ListOf").field(inner).finish(),
            Self::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

/// Per-slot metadata, aggregated per entity type by [`EntityType::metadata`].
#[derive(Debug, Clone, Default)]
pub struct FieldMeta {
    pub required: bool,
    pub private: bool,
    pub to_type: Option<Coercion>,
    pub extra: BTreeMap<String, Value>,
}

impl FieldMeta {
    pub fn is_empty(&self) -> bool {
        !self.required && !self.private && self.to_type.is_none() && self.extra.is_empty()
    }
}

/// A single constrained slot shared by all instances of an entity type.
pub struct Attribute {
    name: String,
    class: &'static AttributeClass,
    value_kind: Option<ValueKind>,
    constraints: Vec<Constraint>,
    default: DefaultValue,
    freeze: bool,
    post_process: Option<Rc<dyn Fn(Value) -> Value>>,
    weak: bool,
    init: bool,
    meta: FieldMeta,
    validation: Validation,
}

impl Attribute {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The attribute class the resolver chose for this slot.
    pub fn class(&self) -> &'static AttributeClass {
        self.class
    }

    pub fn value_kind(&self) -> Option<&ValueKind> {
        self.value_kind.as_ref()
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn default_value(&self) -> &DefaultValue {
        &self.default
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// Whether the slot becomes immutable after its first successful write.
    pub fn freezes(&self) -> bool {
        self.freeze
    }

    pub fn is_weak(&self) -> bool {
        self.weak
    }

    /// Whether decode passes this slot to the constructor.
    pub fn is_init(&self) -> bool {
        self.init
    }

    pub fn meta(&self) -> &FieldMeta {
        &self.meta
    }

    pub fn is_private(&self) -> bool {
        self.meta.private
    }

    /// Marked required and has nothing to fall back on.
    pub fn is_required(&self) -> bool {
        self.meta.required && !self.has_default()
    }

    pub fn validation(&self) -> Validation {
        self.validation
    }

    /// Read the slot, materializing the default on first access.
    ///
    /// A weak slot whose referent is gone reads as null.
    pub fn get(&self, entity: &Entity) -> Value {
        match entity.read_slot(&self.name) {
            Some(Slot::Value(value)) => value,
            Some(Slot::Reference(reference)) => {
                reference.upgrade().map_or(Value::Null, Value::Entity)
            }
            None => self.materialize(entity),
        }
    }

    fn materialize(&self, entity: &Entity) -> Value {
        let value = self.default.produce();
        if value.is_null() {
            return value;
        }
        let slot = match (&value, self.weak) {
            (Value::Entity(referent), true) => Slot::Reference(referent.downgrade()),
            _ => Slot::Value(value.clone()),
        };
        entity.write_slot(&self.name, Some(slot), false);
        value
    }

    /// Validate, post-process and store a value.
    pub fn set(&self, entity: &Entity, value: Value) -> Result<(), ModelError> {
        if entity.is_frozen(&self.name) {
            return Err(ModelError::frozen(&self.name));
        }
        // Clearing a reference (e.g. decoding a dangling one) is always allowed.
        if self.weak && value.is_null() {
            entity.write_slot(&self.name, None, self.freeze);
            return Ok(());
        }
        if self.validation.is_enforced() {
            self.validate(&value)?;
        }
        let value = match &self.post_process {
            Some(process) => process(value),
            None => value,
        };
        let slot = if self.weak {
            match value {
                Value::Entity(referent) => Slot::Reference(referent.downgrade()),
                other => {
                    return Err(ModelError::type_mismatch(
                        &self.name,
                        "entity reference",
                        other.type_name(),
                    ))
                }
            }
        } else {
            Slot::Value(value)
        };
        entity.write_slot(&self.name, Some(slot), self.freeze);
        Ok(())
    }

    /// Remove the stored value so the next read materializes the default again.
    pub fn delete(&self, entity: &Entity) -> Result<(), ModelError> {
        if entity.is_frozen(&self.name) {
            return Err(ModelError::frozen(&self.name));
        }
        if !entity.clear_slot(&self.name) {
            return Err(ModelError::missing_attribute(&self.name));
        }
        Ok(())
    }

    /// Type check, then every constraint in declaration order.
    pub fn validate(&self, value: &Value) -> Result<(), ModelError> {
        if let Some(kind) = &self.value_kind {
            if !kind.matches(value) {
                return Err(ModelError::type_mismatch(
                    &self.name,
                    kind.to_string(),
                    value.type_name(),
                ));
            }
        }
        if let Some(failed) = self.constraints.iter().find(|c| !c.check(value)) {
            return Err(ModelError::constraint_violation(
                &self.name,
                failed.label(),
                value.to_string(),
            ));
        }
        Ok(())
    }
}

impl fmt::Debug for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attribute")
            .field("name", &self.name)
            .field("class", &self.class.name())
            .field("value_kind", &self.value_kind)
            .field("constraints", &self.constraints)
            .field("default", &self.default)
            .field("freeze", &self.freeze)
            .field("weak", &self.weak)
            .field("meta", &self.meta)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::entity::EntityType;

    bitflags::bitflags! {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct Element: u64 {
            const NO_ELEMENT = 1 << 0;
            const FIRE = 1 << 1;
            const ICE = 1 << 2;
        }
    }

    crate::flag_sets!(Element);

    fn gadget() -> Rc<EntityType> {
        EntityType::builder("Gadget")
            .field(Field::int("charge").range(0, 10).default(5))
            .field(Field::text("serial").freeze())
            .field(Field::text("label").max_length(8).post_process(|v| match v {
                Value::Str(s) => Value::Str(s.to_uppercase()),
                other => other,
            }))
            .field(Field::flags::<Element>("element").default(Element::NO_ELEMENT))
            .field(Field::list("parts").default_with(|| Value::List(Vec::new())))
            .build()
            .unwrap()
    }

    #[test]
    fn first_read_materializes_default() {
        let g = gadget().factory().create().unwrap();
        assert!(!g.has_stored("charge"));
        assert_eq!(g.get("charge").unwrap(), Value::Int(5));
        assert!(g.has_stored("charge"));
    }

    #[test]
    fn missing_default_reads_null_without_storing() {
        let g = gadget().factory().create().unwrap();
        assert_eq!(g.get("label").unwrap(), Value::Null);
        assert!(!g.has_stored("label"));
    }

    #[test]
    fn default_factory_runs_per_instance() {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let ty = EntityType::builder("Counter")
            .field(Field::int("n").default_with(move || {
                counter.set(counter.get() + 1);
                Value::Int(counter.get())
            }))
            .build()
            .unwrap();
        let a = ty.factory().create().unwrap();
        let b = ty.factory().create().unwrap();
        assert_eq!(a.get("n").unwrap(), Value::Int(1));
        assert_eq!(a.get("n").unwrap(), Value::Int(1));
        assert_eq!(b.get("n").unwrap(), Value::Int(2));
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn range_boundaries() {
        let g = gadget().factory().create().unwrap();
        assert!(g.set("charge", 0).is_ok());
        assert!(g.set("charge", 10).is_ok());
        for bad in [-1, 11] {
            let err = g.set("charge", bad).unwrap_err();
            assert!(matches!(err, ModelError::ConstraintViolation { .. }));
        }
        assert_eq!(g.get("charge").unwrap(), Value::Int(10));
    }

    #[test]
    fn wrong_type_is_rejected() {
        let g = gadget().factory().create().unwrap();
        let err = g.set("charge", "full").unwrap_err();
        assert_eq!(err, ModelError::type_mismatch("charge", "int", "str"));
        assert!(g.set("charge", 2.5).is_err());
    }

    #[test]
    fn frozen_slot_accepts_exactly_one_write() {
        let g = gadget().factory().create().unwrap();
        g.set("serial", "A-1").unwrap();
        assert!(g.is_frozen("serial"));
        assert_eq!(g.set("serial", "A-1").unwrap_err(), ModelError::frozen("serial"));
        assert_eq!(g.set("serial", 7).unwrap_err(), ModelError::frozen("serial"));
        assert_eq!(g.delete("serial").unwrap_err(), ModelError::frozen("serial"));
        assert_eq!(g.get("serial").unwrap(), Value::from("A-1"));
    }

    #[test]
    fn freezing_is_per_instance() {
        let ty = gadget();
        let a = ty.factory().create().unwrap();
        let b = ty.factory().create().unwrap();
        a.set("serial", "A").unwrap();
        assert!(b.set("serial", "B").is_ok());
    }

    #[test]
    fn failed_write_leaves_prior_value() {
        let g = gadget().factory().create().unwrap();
        g.set("charge", 3).unwrap();
        assert!(g.set("charge", 99).is_err());
        assert_eq!(g.get("charge").unwrap(), Value::Int(3));
    }

    #[test]
    fn post_process_runs_after_validation() {
        let g = gadget().factory().create().unwrap();
        g.set("label", "gizmo").unwrap();
        assert_eq!(g.get("label").unwrap(), Value::from("GIZMO"));
        assert!(g.set("label", "much too long").is_err());
    }

    #[test]
    fn delete_reverts_to_default() {
        let g = gadget().factory().create().unwrap();
        g.set("charge", 1).unwrap();
        g.delete("charge").unwrap();
        assert_eq!(g.get("charge").unwrap(), Value::Int(5));

        let err = g.delete("label").unwrap_err();
        assert_eq!(err, ModelError::missing_attribute("label"));
    }

    #[test]
    fn flags_are_normalized_on_write() {
        let g = gadget().factory().create().unwrap();
        g.set("element", "FIRE").unwrap();
        assert_eq!(g.get("element").unwrap(), Value::from(Element::FIRE));

        g.set("element", 6).unwrap();
        assert_eq!(g.get("element").unwrap(), Value::from(Element::FIRE | Element::ICE));

        assert!(matches!(
            g.set("element", 0),
            Err(ModelError::InvalidFlag { .. })
        ));
        assert!(matches!(
            g.set("element", "LIGHTNING"),
            Err(ModelError::InvalidFlag { .. })
        ));
    }

    #[test]
    fn skipped_validation_still_coerces() {
        let ty = EntityType::builder("Loose")
            .validation(Validation::Skipped)
            .field(Field::int("charge").range(0, 10))
            .field(Field::flags::<Element>("element"))
            .build()
            .unwrap();
        let g = ty.factory().create().unwrap();
        g.set("charge", 500).unwrap();
        g.set("charge", "lots").unwrap();
        assert!(g.set("element", 8).is_err());
    }

    #[test]
    fn weak_slot_reads_null_once_referent_is_gone() {
        let gadget = gadget();
        let holder = EntityType::builder("Holder")
            .field(Field::reference("target", &gadget).weak())
            .build()
            .unwrap();
        let h = holder.factory().create().unwrap();
        {
            let g = gadget.factory().create().unwrap();
            h.set("target", g.clone()).unwrap();
            assert!(h.get("target").unwrap().as_entity().unwrap().ptr_eq(&g));
        }
        assert_eq!(h.get("target").unwrap(), Value::Null);
    }

    #[test]
    fn weak_slot_rejects_plain_values() {
        let holder = EntityType::builder("Holder")
            .field(Field::new("target").weak())
            .build()
            .unwrap();
        let h = holder.factory().create().unwrap();
        assert!(matches!(
            h.set("target", 3),
            Err(ModelError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn custom_coercion_runs_before_validation() {
        let ty = EntityType::builder("Meter")
            .field(Field::int("level").coerce_with(|v| match v {
                Value::Str(s) => s
                    .parse::<i64>()
                    .map(Value::Int)
                    .map_err(|_| ModelError::type_mismatch("level", "int", "str")),
                other => Ok(other),
            }))
            .build()
            .unwrap();
        let m = ty.factory().create().unwrap();
        m.set("level", "12").unwrap();
        assert_eq!(m.get("level").unwrap(), Value::Int(12));
        assert!(m.set("level", "twelve").is_err());
    }

    #[test]
    fn expected_keys_constrain_dicts() {
        let ty = EntityType::builder("Body")
            .field(
                Field::dict("vitals")
                    .expect_key("hp", Expected::of(ValueKind::Int))
                    .expect_key("note", Expected::optional(ValueKind::Str)),
            )
            .build()
            .unwrap();
        let b = ty.factory().create().unwrap();
        let mut vitals = crate::value::Map::new();
        vitals.insert("hp".to_string(), Value::Int(10));
        vitals.insert("note".to_string(), Value::Null);
        b.set("vitals", vitals.clone()).unwrap();

        vitals.insert("mana".to_string(), Value::Int(1));
        let err = b.set("vitals", vitals).unwrap_err();
        assert!(err.to_string().contains("keys within {hp, note}"));
    }
}
