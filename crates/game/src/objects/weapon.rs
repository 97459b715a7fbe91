use std::rc::Rc;

use cybergunk_model::{EntityType, Field, ModelConfig, ModelError, TypeRegistry};

use crate::flags::{AmmoType, DamageType, ItemSlot};

pub struct WeaponTypes {
    pub weapon: Rc<EntityType>,
    pub melee: Rc<EntityType>,
    pub ranged: Rc<EntityType>,
}

pub(crate) fn define(
    registry: &mut TypeRegistry,
    config: &ModelConfig,
    item: &Rc<EntityType>,
) -> Result<WeaponTypes, ModelError> {
    let weapon = registry.define(
        EntityType::builder("Weapon")
            .extends(item)
            .config(config)
            .field(Field::int("damage").range(0, 1000).required())
            .field(
                Field::flags::<DamageType>("damage_type").default(DamageType::NO_DAMAGE_TYPE),
            )
            .field(Field::int("max_stack_size").minimum(1).default(1)),
    )?;

    let melee = registry.define(
        EntityType::builder("MeleeWeapon")
            .extends(&weapon)
            .config(config)
            .field(
                Field::flags::<ItemSlot>("slots")
                    .default(ItemSlot::MAIN_HAND | ItemSlot::OFF_HAND),
            ),
    )?;

    let ranged = registry.define(
        EntityType::builder("RangedWeapon")
            .extends(&weapon)
            .config(config)
            .field(Field::flags::<ItemSlot>("slots").default(ItemSlot::RANGED))
            .field(Field::flags::<AmmoType>("ammo_type").default(AmmoType::NO_AMMO_TYPE)),
    )?;

    Ok(WeaponTypes {
        weapon,
        melee,
        ranged,
    })
}
