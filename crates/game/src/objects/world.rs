//! Static world objects and the spaces that hold everything

use std::rc::Rc;

use cybergunk_model::{EntityType, Field, ModelConfig, ModelError, TypeRegistry};

use super::{default_infix, name_fields};
use crate::flags::{ObjectAction, WorldSpaceFlavor, WorldSpaceType};

pub struct WorldTypes {
    pub world_object: Rc<EntityType>,
    pub world_space: Rc<EntityType>,
}

pub(crate) fn define(
    registry: &mut TypeRegistry,
    config: &ModelConfig,
    item: &Rc<EntityType>,
    living: &Rc<EntityType>,
) -> Result<WorldTypes, ModelError> {
    let world_object = registry.define(
        EntityType::builder("WorldObject")
            .config(config)
            .fields(name_fields())
            .field(
                Field::flags::<ObjectAction>("allowed_actions").default(ObjectAction::INSPECT),
            )
            .on_init(default_infix),
    )?;

    let world_space = registry.define(
        EntityType::builder("WorldSpace")
            .config(config)
            .field(Field::text("world_space_name").default(""))
            .field(Field::entity_list("creatures", living))
            .field(Field::entity_list("items", item))
            .field(Field::entity_list("world_objects", &world_object))
            .field(
                Field::flags::<WorldSpaceType>("world_space_type")
                    .default(WorldSpaceType::ROOM),
            )
            .field(
                Field::flags::<WorldSpaceFlavor>("world_space_flavor")
                    .default(WorldSpaceFlavor::NO_FLAVOR),
            )
            .field(
                Field::flags::<ObjectAction>("allowed_actions")
                    .default(ObjectAction::INSPECT),
            )
            .field(Field::reference("owner", living).weak()),
    )?;

    Ok(WorldTypes {
        world_object,
        world_space,
    })
}
