//! Name-keyed catalogue of entity types

use std::collections::BTreeMap;
use std::rc::Rc;

use tracing::{debug, warn};

use crate::entity::{descend, parse_object, Entity, EntityType, EntityTypeBuilder, RESOLVED_NAME_KEY};
use crate::error::ModelError;
use crate::value::{Map, Value};

/// Registry of entity types by short name.
///
/// Holding a type never keeps its instances alive; instance queries return
/// snapshots of whatever is still live.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: BTreeMap<String, Rc<EntityType>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type. The first registration of a name wins; returns
    /// whether this call added it.
    pub fn register(&mut self, name: impl Into<String>, ty: Rc<EntityType>) -> bool {
        let name = name.into();
        if let Some(existing) = self.types.get(&name) {
            if !Rc::ptr_eq(existing, &ty) {
                warn!(
                    name = %name,
                    kept = %existing.resolved_name(),
                    ignored = %ty.resolved_name(),
                    "Duplicate type registration ignored"
                );
            }
            return false;
        }
        debug!(name = %name, resolved_name = %ty.resolved_name(), "Registered entity type");
        self.types.insert(name, ty);
        true
    }

    /// Build a type and register it under its short name.
    pub fn define(&mut self, builder: EntityTypeBuilder) -> Result<Rc<EntityType>, ModelError> {
        let ty = builder.build()?;
        self.register(ty.name().to_string(), ty.clone());
        Ok(ty)
    }

    /// Get a type by name, exact match first, then case-insensitive.
    pub fn lookup(&self, name: &str) -> Result<Rc<EntityType>, ModelError> {
        self.types
            .get(name)
            .or_else(|| {
                self.types
                    .iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case(name))
                    .map(|(_, ty)| ty)
            })
            .cloned()
            .ok_or_else(|| ModelError::not_registered(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.types.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Resolve a dotted name: the first component by registered name, each
    /// following one as a subtype of the previous.
    pub fn resolve(&self, dotted: &str) -> Result<Rc<EntityType>, ModelError> {
        let components: Vec<&str> = dotted.split('.').collect();
        let (first, rest) = components
            .split_first()
            .ok_or_else(|| ModelError::unresolved(dotted, dotted))?;
        let start = self.lookup(first).map_err(|err| match err {
            ModelError::NotRegistered { .. } => ModelError::unresolved(dotted, *first),
            other => other,
        })?;
        descend(start, rest, dotted)
    }

    /// Live instances of the named type, subtypes included.
    pub fn instances_of(&self, name: &str) -> Result<Vec<Entity>, ModelError> {
        Ok(self.lookup(name)?.instances())
    }

    /// Decode a map that must carry a `resolved_name` tag.
    pub fn from_dict(&self, data: &Map) -> Result<Entity, ModelError> {
        let tag = match data.get(RESOLVED_NAME_KEY) {
            Some(Value::Str(tag)) => tag,
            Some(other) => {
                return Err(ModelError::type_mismatch(
                    RESOLVED_NAME_KEY,
                    "str",
                    other.type_name(),
                ))
            }
            None => return Err(ModelError::missing_required("encoded entity", RESOLVED_NAME_KEY)),
        };
        let target = self.resolve(tag)?;
        target.from_dict(data)
    }

    pub fn from_json(&self, json: &str) -> Result<Entity, ModelError> {
        self.from_dict(&parse_object(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::Field;

    fn registry() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        let item = registry
            .define(EntityType::builder("Item").field(Field::text("name").default("")))
            .unwrap();
        let weapon = registry
            .define(
                EntityType::builder("Weapon")
                    .extends(&item)
                    .field(Field::int("damage").default(0)),
            )
            .unwrap();
        registry
            .define(EntityType::builder("MeleeWeapon").extends(&weapon))
            .unwrap();
        registry
    }

    #[test]
    fn first_registration_wins() {
        let mut registry = registry();
        let original = registry.lookup("Weapon").unwrap();
        let impostor = EntityType::builder("Weapon").build().unwrap();

        assert!(!registry.register("Weapon", impostor));
        assert!(Rc::ptr_eq(&registry.lookup("Weapon").unwrap(), &original));
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn lookup_miss_is_not_registered() {
        let err = registry().lookup("Armor").unwrap_err();
        assert_eq!(err, ModelError::not_registered("Armor"));
    }

    #[test]
    fn resolve_walks_components() {
        let registry = registry();
        let melee = registry.resolve("Item.Weapon.MeleeWeapon").unwrap();
        assert_eq!(melee.resolved_name(), "Item.Weapon.MeleeWeapon");

        let lowercase = registry.resolve("item.weapon.meleeweapon").unwrap();
        assert!(Rc::ptr_eq(&melee, &lowercase));
    }

    #[test]
    fn resolve_fails_on_first_missing_component() {
        let err = registry().resolve("Item.Armor.Helmet").unwrap_err();
        assert_eq!(err, ModelError::unresolved("Item.Armor.Helmet", "Armor"));

        let err = registry().resolve("Gadget.Weapon").unwrap_err();
        assert_eq!(err, ModelError::unresolved("Gadget.Weapon", "Gadget"));
    }

    #[test]
    fn instances_are_snapshots_that_exclude_dropped_entities() {
        let registry = registry();
        let weapon = registry.lookup("Weapon").unwrap();
        let melee = registry.lookup("MeleeWeapon").unwrap();

        let kept = weapon.factory().create().unwrap();
        {
            let _dropped = melee.factory().create().unwrap();
            assert_eq!(registry.instances_of("Item").unwrap().len(), 2);
        }
        let live = registry.instances_of("Weapon").unwrap();
        assert_eq!(live.len(), 1);
        assert!(live[0].ptr_eq(&kept));
        assert!(registry.instances_of("MeleeWeapon").unwrap().is_empty());
    }

    #[test]
    fn from_json_dispatches_on_tag() {
        let registry = registry();
        let entity = registry
            .from_json(r#"{"resolved_name": "Item.Weapon.MeleeWeapon", "damage": 4}"#)
            .unwrap();
        assert_eq!(entity.type_name(), "MeleeWeapon");
        assert_eq!(entity.get("damage").unwrap(), Value::Int(4));

        let err = registry.from_json(r#"{"damage": 4}"#).unwrap_err();
        assert!(matches!(err, ModelError::MissingRequiredField { .. }));
    }
}
