//! Partial-application builders
//!
//! A [`Builder`] is an immutable recipe: a bound entity type plus a set of
//! bound constructor arguments. Every `bind*`/`unbind*` returns a new
//! builder, so recipes compose freely:
//!
//! ```ignore
//! let sword = melee_weapon.factory().bind("name_infix", "Sword").bind("damage", 10);
//! let legendary = sword.bind("name_prefix", "Legendary").bind("damage", 100);
//! let blade = legendary.create()?;
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::entity::{Entity, EntityType};
use crate::error::ModelError;
use crate::registry::TypeRegistry;
use crate::value::{Map, Value};

/// A bound argument: a plain value or a nested recipe created on demand.
#[derive(Debug, Clone)]
pub enum Arg {
    Value(Value),
    Builder(Builder),
}

impl From<Value> for Arg {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<Builder> for Arg {
    fn from(builder: Builder) -> Self {
        Self::Builder(builder)
    }
}

pub type Args = BTreeMap<String, Arg>;

/// Collect `(key, value)` pairs into builder arguments.
pub fn args<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Args
where
    K: Into<String>,
    V: Into<Value>,
{
    pairs
        .into_iter()
        .map(|(key, value)| (key.into(), Arg::Value(value.into())))
        .collect()
}

#[derive(Clone, Default)]
pub struct Builder {
    bound_type: Option<Rc<EntityType>>,
    bound_args: Args,
}

impl Builder {
    /// A builder with no type and no arguments.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_type(ty: &Rc<EntityType>) -> Self {
        Self {
            bound_type: Some(ty.clone()),
            bound_args: Args::new(),
        }
    }

    pub fn bound_type(&self) -> Option<&Rc<EntityType>> {
        self.bound_type.as_ref()
    }

    pub fn bound_args(&self) -> &Args {
        &self.bound_args
    }

    /// Merge `extra` over the bound arguments; `extra` wins on collision.
    pub fn bind_args(&self, extra: Args) -> Self {
        let mut bound_args = self.bound_args.clone();
        bound_args.extend(extra);
        Self {
            bound_type: self.bound_type.clone(),
            bound_args,
        }
    }

    pub fn bind(&self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.bind_args(Args::from([(key.into(), Arg::Value(value.into()))]))
    }

    /// Bind a nested recipe, created when this builder creates.
    pub fn bind_builder(&self, key: impl Into<String>, builder: Builder) -> Self {
        self.bind_args(Args::from([(key.into(), Arg::Builder(builder))]))
    }

    /// Rebind the target type, keeping the bound arguments.
    pub fn bind_type(&self, ty: &Rc<EntityType>) -> Self {
        Self {
            bound_type: Some(ty.clone()),
            bound_args: self.bound_args.clone(),
        }
    }

    /// Rebind the target type by (resolved) name.
    pub fn bind_type_name(&self, registry: &TypeRegistry, name: &str) -> Result<Self, ModelError> {
        Ok(self.bind_type(&registry.resolve(name)?))
    }

    pub fn unbind_args(&self, keys: &[&str]) -> Self {
        let mut bound_args = self.bound_args.clone();
        for key in keys {
            bound_args.remove(*key);
        }
        Self {
            bound_type: self.bound_type.clone(),
            bound_args,
        }
    }

    pub fn create(&self) -> Result<Entity, ModelError> {
        self.create_with(Args::new())
    }

    /// Merge `extra`, validate against the bound type, resolve nested
    /// builders and construct.
    pub fn create_with(&self, extra: Args) -> Result<Entity, ModelError> {
        let ty = self.bound_type.as_ref().ok_or(ModelError::UnboundFactory)?;

        let mut merged = self.bound_args.clone();
        merged.extend(extra);

        if let Some(unknown) = merged.keys().find(|key| ty.attribute(key).is_none()) {
            return Err(ModelError::unknown_field(ty.name(), unknown));
        }
        if let Some(missing) = ty
            .attributes()
            .iter()
            .find(|attr| attr.is_required() && !merged.contains_key(attr.name()))
        {
            return Err(ModelError::missing_required(ty.name(), missing.name()));
        }

        let mut values = Map::new();
        for (key, arg) in merged {
            let value = match arg {
                Arg::Value(value) => value,
                Arg::Builder(nested) => Value::Entity(nested.create()?),
            };
            values.insert(key, value);
        }

        debug!(
            type_name = %ty.resolved_name(),
            args = values.len(),
            "Creating entity from factory"
        );
        ty.construct(values)
    }
}

impl fmt::Debug for Builder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Builder")
            .field(
                "bound_type",
                &self.bound_type.as_ref().map(|ty| ty.resolved_name()),
            )
            .field("bound_args", &self.bound_args)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::Field;

    fn weapon() -> Rc<EntityType> {
        let item = EntityType::builder("Item")
            .field(Field::text("name").default(""))
            .build()
            .unwrap();
        EntityType::builder("Weapon")
            .extends(&item)
            .field(Field::int("damage").range(0, 1000).required())
            .field(Field::int("level").default(1))
            .build()
            .unwrap()
    }

    #[test]
    fn binding_returns_new_builders() {
        let base = weapon().factory();
        let bound = base.bind("damage", 5);
        assert!(base.bound_args().is_empty());
        assert_eq!(bound.bound_args().len(), 1);

        let unbound = bound.unbind_args(&["damage"]);
        assert!(unbound.bound_args().is_empty());
        assert_eq!(bound.bound_args().len(), 1);
    }

    #[test]
    fn later_bindings_win() {
        let ty = weapon();
        let entity = ty
            .factory()
            .bind("damage", 5)
            .bind_args(args([("damage", 9)]))
            .create()
            .unwrap();
        assert_eq!(entity.get("damage").unwrap(), Value::Int(9));

        let entity = ty
            .factory()
            .bind("damage", 5)
            .create_with(args([("damage", 7)]))
            .unwrap();
        assert_eq!(entity.get("damage").unwrap(), Value::Int(7));
    }

    #[test]
    fn chained_and_combined_binds_are_equal() {
        let factory = weapon().factory();
        let chained = factory.bind("damage", 1).bind("level", 2).create().unwrap();
        let combined = factory
            .bind_args(args([("damage", 1), ("level", 2)]))
            .create()
            .unwrap();
        assert_eq!(chained, combined);
        assert_ne!(chained.id(), combined.id());
    }

    #[test]
    fn bound_arguments_reach_constructor_only_slots() {
        let ty = EntityType::builder("Crate")
            .field(Field::boolean("sealed").default(true).no_init())
            .build()
            .unwrap();
        let opened = ty.factory().bind("sealed", false).create().unwrap();
        assert_eq!(opened.get("sealed").unwrap(), Value::Bool(false));
        assert_eq!(
            opened.get("sealed").unwrap(),
            ty.construct(Map::from([("sealed".to_string(), Value::Bool(false))]))
                .unwrap()
                .get("sealed")
                .unwrap()
        );
    }

    #[test]
    fn create_without_type_fails() {
        let err = Builder::new().bind("damage", 1).create().unwrap_err();
        assert_eq!(err, ModelError::UnboundFactory);
    }

    #[test]
    fn create_checks_required_and_unknown() {
        let factory = weapon().factory();
        assert!(matches!(
            factory.create(),
            Err(ModelError::MissingRequiredField { .. })
        ));
        assert!(matches!(
            factory.bind("damage", 1).bind("sharpness", 9).create(),
            Err(ModelError::UnknownField { .. })
        ));
    }

    #[test]
    fn nested_builders_are_created_first() {
        let ty = weapon();
        let holder = EntityType::builder("Rack")
            .field(Field::reference("main", &ty))
            .build()
            .unwrap();
        let rack = holder
            .factory()
            .bind_builder("main", ty.factory().bind("damage", 3))
            .create()
            .unwrap();
        let main = rack.get("main").unwrap();
        let main = main.as_entity().unwrap();
        assert_eq!(main.get("damage").unwrap(), Value::Int(3));
    }

    #[test]
    fn bind_type_keeps_arguments() {
        let ty = weapon();
        let other = EntityType::builder("Training")
            .extends(&ty)
            .build()
            .unwrap();
        let factory = ty.factory().bind("damage", 2).bind_type(&other);
        let entity = factory.create().unwrap();
        assert_eq!(entity.resolved_name(), "Item.Weapon.Training");
        assert_eq!(entity.get("damage").unwrap(), Value::Int(2));
    }
}
