//! Entities - instances of entity types
//!
//! An [`Entity`] is a cheap, clonable handle. Slot values and freeze state
//! live in per-instance storage; the shared [`Attribute`] descriptors on the
//! [`EntityType`] decide how values are read, checked and written.

mod codec;
mod entity_type;

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::{Rc, Weak};

use uuid::Uuid;

use crate::attribute::Attribute;
use crate::error::ModelError;
use crate::value::Value;

pub use entity_type::{EntityType, EntityTypeBuilder, Initializer};

pub(crate) use codec::{decode_as, parse_object};
pub(crate) use entity_type::descend;

/// Name of the implicit identity slot every root type carries.
pub const IDENTITY_SLOT: &str = "uuid";

/// Reserved key holding the polymorphic type tag in encoded form.
pub const RESOLVED_NAME_KEY: &str = "resolved_name";

/// A fresh identity token: a v4 UUID as 32 lowercase hex digits.
pub fn identity_token() -> String {
    Uuid::new_v4().simple().to_string()
}

#[derive(Clone)]
pub(crate) enum Slot {
    Value(Value),
    Reference(WeakEntity),
}

#[derive(Default)]
struct SlotStore {
    values: HashMap<String, Slot>,
    frozen: HashSet<String>,
}

struct EntityCell {
    ty: Rc<EntityType>,
    slots: RefCell<SlotStore>,
}

/// Handle to one entity instance.
#[derive(Clone)]
pub struct Entity {
    cell: Rc<EntityCell>,
}

/// Non-owning handle; see [`Entity::downgrade`].
#[derive(Clone, Default)]
pub struct WeakEntity {
    cell: Weak<EntityCell>,
}

impl WeakEntity {
    pub fn upgrade(&self) -> Option<Entity> {
        self.cell.upgrade().map(|cell| Entity { cell })
    }

    pub fn is_alive(&self) -> bool {
        self.cell.strong_count() > 0
    }
}

impl fmt::Debug for WeakEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upgrade() {
            Some(entity) => write!(f, "WeakEntity({entity:?})"),
            None => write!(f, "WeakEntity(<gone>)"),
        }
    }
}

impl Entity {
    /// An empty instance; only [`EntityType::construct`] creates these.
    pub(crate) fn blank(ty: Rc<EntityType>) -> Self {
        Self {
            cell: Rc::new(EntityCell {
                ty,
                slots: RefCell::new(SlotStore::default()),
            }),
        }
    }

    pub fn entity_type(&self) -> &Rc<EntityType> {
        &self.cell.ty
    }

    pub fn type_name(&self) -> &str {
        self.cell.ty.name()
    }

    pub fn resolved_name(&self) -> &str {
        self.cell.ty.resolved_name()
    }

    /// The identity token, empty only for types without an identity slot.
    pub fn id(&self) -> String {
        match self.get(IDENTITY_SLOT) {
            Ok(Value::Str(id)) => id,
            _ => String::new(),
        }
    }

    pub fn attribute(&self, name: &str) -> Result<&Rc<Attribute>, ModelError> {
        self.cell
            .ty
            .attribute(name)
            .ok_or_else(|| ModelError::unknown_field(self.type_name(), name))
    }

    pub fn get(&self, name: &str) -> Result<Value, ModelError> {
        Ok(self.attribute(name)?.get(self))
    }

    /// Write a slot through its `to_type` coercion and descriptor.
    pub fn set(&self, name: &str, value: impl Into<Value>) -> Result<(), ModelError> {
        let attr = self.attribute(name)?;
        if self.is_frozen(name) {
            return Err(ModelError::frozen(name));
        }
        let value = value.into();
        let value = match self.cell.ty.metadata().get(name).and_then(|m| m.to_type.as_ref()) {
            Some(coercion) => coercion.coerce(name, value)?,
            None => value,
        };
        attr.set(self, value)
    }

    pub fn delete(&self, name: &str) -> Result<(), ModelError> {
        self.attribute(name)?.delete(self)
    }

    pub fn is_frozen(&self, name: &str) -> bool {
        self.cell.slots.borrow().frozen.contains(name)
    }

    /// Whether a value (written or materialized) is currently stored.
    pub fn has_stored(&self, name: &str) -> bool {
        self.cell.slots.borrow().values.contains_key(name)
    }

    pub fn is_instance_of(&self, ty: &EntityType) -> bool {
        self.cell.ty.is_subtype_of(ty)
    }

    pub fn downgrade(&self) -> WeakEntity {
        WeakEntity {
            cell: Rc::downgrade(&self.cell),
        }
    }

    /// Same instance, not merely equal.
    pub fn ptr_eq(&self, other: &Entity) -> bool {
        Rc::ptr_eq(&self.cell, &other.cell)
    }

    pub(crate) fn read_slot(&self, name: &str) -> Option<Slot> {
        self.cell.slots.borrow().values.get(name).cloned()
    }

    /// Store (or with `None`, clear) a slot, optionally freezing it.
    pub(crate) fn write_slot(&self, name: &str, slot: Option<Slot>, freeze: bool) {
        let mut store = self.cell.slots.borrow_mut();
        match slot {
            Some(slot) => {
                store.values.insert(name.to_string(), slot);
            }
            None => {
                store.values.remove(name);
            }
        }
        if freeze {
            store.frozen.insert(name.to_string());
        }
    }

    pub(crate) fn clear_slot(&self, name: &str) -> bool {
        self.cell.slots.borrow_mut().values.remove(name).is_some()
    }
}

/// Same concrete type and equal public encodings.
impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        Rc::ptr_eq(self.entity_type(), other.entity_type())
            && self.to_dict(&[], false) == other.to_dict(&[], false)
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("type", &self.resolved_name())
            .field("id", &self.id())
            .finish()
    }
}
