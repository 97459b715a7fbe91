//! Every game entity type, defined once and registered by name

use cybergunk_model::{Entity, Map, ModelConfig, TypeRegistry};
use tracing::info;

use crate::error::GameError;
use crate::objects::{
    armor, consumable, items, living, weapon, world, ArmorTypes, ConsumableTypes, ItemTypes,
    LivingTypes, WeaponTypes, WorldTypes,
};

/// The game's type hierarchies plus a registry resolving them by name.
pub struct GameCatalog {
    registry: TypeRegistry,
    pub items: ItemTypes,
    pub weapons: WeaponTypes,
    pub armor: ArmorTypes,
    pub consumables: ConsumableTypes,
    pub living: LivingTypes,
    pub world: WorldTypes,
}

impl GameCatalog {
    pub fn new(config: &ModelConfig) -> Result<Self, GameError> {
        let mut registry = TypeRegistry::new();
        let items = items::define(&mut registry, config)?;
        let weapons = weapon::define(&mut registry, config, &items.item)?;
        let armor = armor::define(&mut registry, config, &items.item)?;
        let consumables = consumable::define(&mut registry, config, &items.item)?;
        let living = living::define(&mut registry, config, &items.item)?;
        let world = world::define(&mut registry, config, &items.item, &living.living)?;

        info!(
            types = registry.len(),
            validation = %config.validation,
            "Game catalog ready"
        );

        Ok(Self {
            registry,
            items,
            weapons,
            armor,
            consumables,
            living,
            world,
        })
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Decode any tagged game entity.
    pub fn decode(&self, data: &Map) -> Result<Entity, GameError> {
        Ok(self.registry.from_dict(data)?)
    }

    pub fn decode_json(&self, json: &str) -> Result<Entity, GameError> {
        Ok(self.registry.from_json(json)?)
    }
}

#[cfg(test)]
mod tests {
    use cybergunk_model::{Validation, Value};

    use super::*;

    fn catalog() -> GameCatalog {
        GameCatalog::new(&ModelConfig::default()).unwrap()
    }

    #[test]
    fn registers_every_hierarchy() {
        let catalog = catalog();
        for name in [
            "Item",
            "Currency",
            "WeaponMod",
            "Weapon",
            "MeleeWeapon",
            "RangedWeapon",
            "Armor",
            "HeadArmor",
            "FeetArmor",
            "Consumable",
            "Ammo",
            "Living",
            "Trader",
            "Player",
            "WorldObject",
            "WorldSpace",
        ] {
            assert!(catalog.registry().contains(name), "{name} missing");
        }
    }

    #[test]
    fn resolved_names_follow_ancestry() {
        let catalog = catalog();
        assert_eq!(
            catalog.weapons.melee.resolved_name(),
            "Item.Weapon.MeleeWeapon"
        );
        assert_eq!(catalog.living.trader.resolved_name(), "Living.Npc.Trader");
        assert_eq!(
            catalog.consumables.ammo.resolved_name(),
            "Item.Consumable.Ammo"
        );
    }

    #[test]
    fn empty_infix_defaults_to_type_name() {
        let catalog = catalog();
        let food = catalog.consumables.food.construct(Map::new()).unwrap();
        assert_eq!(food.get("name_infix").unwrap(), Value::from("Food"));

        let named = catalog
            .consumables
            .food
            .construct(Map::from([("name_infix".to_string(), Value::from("Noodles"))]))
            .unwrap();
        assert_eq!(named.get("name_infix").unwrap(), Value::from("Noodles"));
    }

    #[test]
    fn whole_numbers_widen_to_float_weights() {
        let catalog = catalog();
        let item = catalog
            .items
            .item
            .construct(Map::from([("weight".to_string(), Value::from(3))]))
            .unwrap();
        assert_eq!(item.get("weight").unwrap(), Value::Float(3.0));
    }

    #[test]
    fn decode_dispatches_on_tag() {
        let catalog = catalog();
        let json = r#"{"resolved_name": "Item.Armor.HeadArmor", "defense": 4}"#;
        let helmet = catalog.decode_json(json).unwrap();
        assert!(helmet.is_instance_of(&catalog.armor.head));
        assert_eq!(helmet.get("defense").unwrap(), Value::Int(4));
    }

    #[test]
    fn skipped_validation_reaches_every_type() {
        let catalog = GameCatalog::new(&ModelConfig::new(Validation::Skipped)).unwrap();
        assert_eq!(catalog.weapons.melee.validation(), Validation::Skipped);
        let weapon = catalog
            .weapons
            .melee
            .construct(Map::from([("damage".to_string(), Value::from(5000))]))
            .unwrap();
        assert_eq!(weapon.get("damage").unwrap(), Value::Int(5000));
    }
}
