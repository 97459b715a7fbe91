//! Creatures, people and the player

use std::rc::Rc;

use cybergunk_model::{EntityType, Field, ModelConfig, ModelError, TypeRegistry};

use super::{default_infix, name_fields};
use crate::flags::{Affliction, ObjectAction};

/// Vital statistics; each has a current value and a ceiling.
pub const VITALS: [&str; 5] = ["health", "stamina", "thirst", "hunger", "energy"];

pub struct LivingTypes {
    pub living: Rc<EntityType>,
    pub human: Rc<EntityType>,
    pub animal: Rc<EntityType>,
    pub npc: Rc<EntityType>,
    pub trader: Rc<EntityType>,
    pub quest_giver: Rc<EntityType>,
    pub quest_npc: Rc<EntityType>,
    pub hostile_npc: Rc<EntityType>,
    pub player: Rc<EntityType>,
}

fn vital_fields() -> Vec<Field> {
    VITALS
        .iter()
        .flat_map(|vital| {
            [
                Field::int(format!("max_{vital}")).minimum(0).default(100),
                Field::int(*vital).minimum(0).default(100),
            ]
        })
        .collect()
}

pub(crate) fn define(
    registry: &mut TypeRegistry,
    config: &ModelConfig,
    item: &Rc<EntityType>,
) -> Result<LivingTypes, ModelError> {
    let living = registry.define(
        EntityType::builder("Living")
            .config(config)
            .fields(name_fields())
            .fields(vital_fields())
            .field(
                Field::flags::<ObjectAction>("allowed_actions").default(ObjectAction::INSPECT),
            )
            .field(
                Field::flags::<Affliction>("afflictions").default(Affliction::NO_AFFLICTION),
            )
            .field(Field::entity_list("inventory", item))
            .on_init(default_infix),
    )?;

    let mut sub = |name: &str, parent: &Rc<EntityType>| {
        registry.define(EntityType::builder(name).extends(parent).config(config))
    };
    let human = sub("Human", &living)?;
    let animal = sub("Animal", &living)?;
    let npc = sub("Npc", &living)?;
    let trader = sub("Trader", &npc)?;
    let quest_giver = sub("QuestGiver", &npc)?;
    let quest_npc = sub("QuestNpc", &npc)?;
    let hostile_npc = sub("HostileNpc", &npc)?;
    let player = sub("Player", &living)?;

    Ok(LivingTypes {
        living,
        human,
        animal,
        npc,
        trader,
        quest_giver,
        quest_npc,
        hostile_npc,
        player,
    })
}
