//! The item root type and its simple subtypes

use std::rc::Rc;

use cybergunk_model::{EntityType, Field, ModelConfig, ModelError, TypeRegistry};

use super::{default_infix, measure, name_fields};
use crate::flags::{Effect, ItemSlot, ObjectAction, WeaponModSlot};

pub struct ItemTypes {
    pub item: Rc<EntityType>,
    pub currency: Rc<EntityType>,
    pub weapon_mod: Rc<EntityType>,
}

pub(crate) fn define(
    registry: &mut TypeRegistry,
    config: &ModelConfig,
) -> Result<ItemTypes, ModelError> {
    let item = registry.define(
        EntityType::builder("Item")
            .config(config)
            .fields(name_fields())
            .field(Field::int("stack_size").minimum(1).default(1))
            .field(Field::int("max_stack_size").minimum(1).default(1))
            .field(measure("weight", 0.0))
            .field(Field::int("value").minimum(0).default(0))
            .field(Field::flags::<ItemSlot>("slots").default(ItemSlot::NO_SLOT))
            .field(Field::flags::<Effect>("effects").default(Effect::NO_EFFECT))
            .field(
                Field::flags::<ObjectAction>("allowed_actions")
                    .default(ObjectAction::STACK | ObjectAction::UNSTACK | ObjectAction::INSPECT),
            )
            .field(
                Field::boolean("compare_using_name")
                    .default(true)
                    .private()
                    .no_init(),
            )
            .on_init(default_infix),
    )?;

    let currency = registry.define(
        EntityType::builder("Currency")
            .extends(&item)
            .config(config)
            .field(measure("weight", 0.1))
            .field(Field::int("max_stack_size").minimum(1).default(100_000_000))
            .field(Field::int("value").minimum(0).default(1))
            .field(Field::flags::<ItemSlot>("slots").default(ItemSlot::WALLET))
            .field(
                Field::boolean("compare_using_name")
                    .default(false)
                    .private()
                    .no_init(),
            ),
    )?;

    let weapon_mod = registry.define(
        EntityType::builder("WeaponMod")
            .extends(&item)
            .config(config)
            .field(
                Field::flags::<WeaponModSlot>("mod_slot").default(WeaponModSlot::NO_SLOT),
            ),
    )?;

    Ok(ItemTypes {
        item,
        currency,
        weapon_mod,
    })
}
