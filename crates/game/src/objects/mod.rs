//! Game entity type declarations

pub mod armor;
pub mod consumable;
pub mod items;
pub mod living;
pub mod weapon;
pub mod world;

use cybergunk_model::{Entity, Field, ModelError, Value};

pub use armor::ArmorTypes;
pub use consumable::ConsumableTypes;
pub use items::ItemTypes;
pub use living::LivingTypes;
pub use weapon::WeaponTypes;
pub use world::WorldTypes;

/// Prefix, infix and suffix of a display name.
pub(crate) fn name_fields() -> [Field; 3] {
    [
        Field::text("name_prefix").default(""),
        Field::text("name_infix").default(""),
        Field::text("name_suffix").default(""),
    ]
}

/// Non-negative float that also accepts whole numbers.
pub(crate) fn measure(name: &str, default: f64) -> Field {
    Field::float(name)
        .minimum(0)
        .default(default)
        .coerce_with(widen_int)
}

fn widen_int(value: Value) -> Result<Value, ModelError> {
    Ok(match value {
        Value::Int(i) => Value::Float(i as f64),
        other => other,
    })
}

/// Initializer: an empty `name_infix` becomes the concrete type name.
pub(crate) fn default_infix(entity: &Entity) -> Result<(), ModelError> {
    let infix = entity.get("name_infix")?;
    if infix.as_str().map_or(true, str::is_empty) {
        entity.set("name_infix", entity.type_name().to_string())?;
    }
    Ok(())
}
