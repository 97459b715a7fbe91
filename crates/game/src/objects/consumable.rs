use std::rc::Rc;

use cybergunk_model::{EntityType, Field, ModelConfig, ModelError, TypeRegistry};

use super::measure;
use crate::flags::{AmmoType, ItemSlot};

pub struct ConsumableTypes {
    pub consumable: Rc<EntityType>,
    pub pharmaceutical: Rc<EntityType>,
    pub food: Rc<EntityType>,
    pub drink: Rc<EntityType>,
    pub ammo: Rc<EntityType>,
}

pub(crate) fn define(
    registry: &mut TypeRegistry,
    config: &ModelConfig,
    item: &Rc<EntityType>,
) -> Result<ConsumableTypes, ModelError> {
    let consumable = registry.define(
        EntityType::builder("Consumable")
            .extends(item)
            .config(config)
            .field(Field::boolean("perishable").default(false))
            .field(measure("decay_rate", 0.0))
            .field(measure("decay_time", 0.0)),
    )?;

    let mut plain = |name: &str| {
        registry.define(
            EntityType::builder(name)
                .extends(&consumable)
                .config(config),
        )
    };
    let pharmaceutical = plain("Pharmaceutical")?;
    let food = plain("Food")?;
    let drink = plain("Drink")?;

    let ammo = registry.define(
        EntityType::builder("Ammo")
            .extends(&consumable)
            .config(config)
            .field(Field::flags::<ItemSlot>("slots").default(ItemSlot::AMMO))
            .field(Field::flags::<AmmoType>("ammo_type").default(AmmoType::NO_AMMO_TYPE)),
    )?;

    Ok(ConsumableTypes {
        consumable,
        pharmaceutical,
        food,
        drink,
        ammo,
    })
}
