use std::rc::Rc;

use cybergunk_model::{EntityType, Field, ModelConfig, ModelError, TypeRegistry};

use crate::flags::{DamageType, ItemSlot};

pub struct ArmorTypes {
    pub armor: Rc<EntityType>,
    pub head: Rc<EntityType>,
    pub chest: Rc<EntityType>,
    pub legs: Rc<EntityType>,
    pub feet: Rc<EntityType>,
}

pub(crate) fn define(
    registry: &mut TypeRegistry,
    config: &ModelConfig,
    item: &Rc<EntityType>,
) -> Result<ArmorTypes, ModelError> {
    let armor = registry.define(
        EntityType::builder("Armor")
            .extends(item)
            .config(config)
            .field(Field::int("defense").minimum(0).default(0))
            .field(
                Field::flags::<DamageType>("defense_type").default(DamageType::NO_DAMAGE_TYPE),
            )
            .field(Field::int("max_stack_size").minimum(1).default(1)),
    )?;

    let mut piece = |name: &str, slot: ItemSlot| {
        registry.define(
            EntityType::builder(name)
                .extends(&armor)
                .config(config)
                .field(Field::flags::<ItemSlot>("slots").default(slot)),
        )
    };
    let head = piece("HeadArmor", ItemSlot::HEAD)?;
    let chest = piece("ChestArmor", ItemSlot::CHEST)?;
    let legs = piece("LegsArmor", ItemSlot::LEGS)?;
    let feet = piece("FeetArmor", ItemSlot::FEET)?;

    Ok(ArmorTypes {
        armor,
        head,
        chest,
        legs,
        feet,
    })
}
