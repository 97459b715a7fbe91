//! Player-facing descriptions
//!
//! Descriptions are chosen by which slots an entity carries: anything with a
//! stack size describes as an item, `damage` and `defense` add weapon and
//! armor lines, `health` marks a living being and `world_space_type` a space.
//! Currency computes its display name from the stack size.

use cybergunk_model::{Entity, FlagSet, Flags, Value};

use crate::flags::{
    DamageType, Effect, InspectionDetails, ItemSlot, ObjectAction, WorldSpaceFlavor, WorldSpaceType,
};
use crate::objects::living::VITALS;

const NOTHING_TO_SEE: &str = "Nothing to see here";

fn has(entity: &Entity, field: &str) -> bool {
    entity.entity_type().attribute(field).is_some()
}

pub(crate) fn text(entity: &Entity, field: &str) -> String {
    entity
        .get(field)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

pub(crate) fn int(entity: &Entity, field: &str) -> i64 {
    entity.get(field).ok().and_then(|v| v.as_i64()).unwrap_or(0)
}

pub(crate) fn float(entity: &Entity, field: &str) -> f64 {
    entity.get(field).ok().and_then(|v| v.as_f64()).unwrap_or(0.0)
}

pub(crate) fn flags<F: FlagSet>(entity: &Entity, field: &str) -> Option<F> {
    entity
        .get(field)
        .ok()
        .and_then(|v| v.as_flags())
        .and_then(|f| f.typed::<F>())
}

/// Title-cased member names joined by `|`.
pub(crate) fn label<F: FlagSet>(flags: F) -> String {
    Flags::from(flags).to_string()
}

pub(crate) fn is_currency(entity: &Entity) -> bool {
    entity.resolved_name().split('.').any(|part| part == "Currency")
}

fn currency_prefix(stack_size: i64) -> &'static str {
    if stack_size <= 1 {
        "A single"
    } else if stack_size < 1_000 {
        "A stack of"
    } else if stack_size < 1_000_000 {
        "A large stack of"
    } else {
        "A huge stack of"
    }
}

/// Prefix, infix and suffix as displayed; currency computes its own.
pub fn name_parts(entity: &Entity) -> [String; 3] {
    if is_currency(entity) {
        let size = int(entity, "stack_size");
        let infix = if size > 1 { "Credits" } else { "Credit" };
        return [
            currency_prefix(size).to_string(),
            infix.to_string(),
            text(entity, "name_suffix"),
        ];
    }
    ["name_prefix", "name_infix", "name_suffix"].map(|part| text(entity, part))
}

/// Non-empty name parts joined by single spaces.
pub fn full_name(entity: &Entity) -> String {
    name_parts(entity)
        .iter()
        .filter(|part| !part.is_empty())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ")
}

fn member_list<F: FlagSet>(flags: F) -> String {
    flags.iter().map(label).collect::<Vec<_>>().join(", ")
}

fn lowercase_names<F: FlagSet>(flags: F) -> Vec<String> {
    flags
        .iter_names()
        .map(|(name, _)| name.replace('_', " ").to_lowercase())
        .collect()
}

fn space_kind(entity: &Entity) -> String {
    flags::<WorldSpaceType>(entity, "world_space_type")
        .map(|f| lowercase_names(f).join(" "))
        .unwrap_or_default()
}

pub fn short_description(entity: &Entity) -> String {
    if has(entity, "world_space_type") {
        return format!("A {}", space_kind(entity));
    }
    if has(entity, "name_infix") {
        let [_, infix, _] = name_parts(entity);
        return infix;
    }
    entity.type_name().to_string()
}

pub fn long_description(entity: &Entity) -> String {
    if has(entity, "world_space_type") {
        return match flags::<WorldSpaceFlavor>(entity, "world_space_flavor") {
            Some(flavor) if flavor != WorldSpaceFlavor::NO_FLAVOR => {
                format!("A {} {}", lowercase_names(flavor).join(", "), space_kind(entity))
            }
            _ => short_description(entity),
        };
    }
    if has(entity, "name_infix") {
        return full_name(entity);
    }
    short_description(entity)
}

pub fn detailed_description(entity: &Entity) -> String {
    let mut lines = Vec::new();
    if has(entity, "world_space_type") {
        lines.push(short_description(entity));
        for (label, field) in [
            ("Creatures", "creatures"),
            ("Items", "items"),
            ("Objects", "world_objects"),
        ] {
            let names: Vec<String> = match entity.get(field) {
                Ok(Value::List(members)) => members
                    .iter()
                    .filter_map(Value::as_entity)
                    .map(full_name)
                    .collect(),
                _ => Vec::new(),
            };
            lines.push(format!("{label}: {}", names.join(", ")));
        }
        return lines.join("\n");
    }
    if !has(entity, "name_infix") {
        return long_description(entity);
    }

    lines.push(format!("Name: {}", full_name(entity)));
    if has(entity, "stack_size") {
        let slots = flags::<ItemSlot>(entity, "slots").filter(|s| *s != ItemSlot::NO_SLOT);
        if let Some(slots) = slots {
            lines.push(format!("Slot: {}", label(slots)));
        }
        let effects = flags::<Effect>(entity, "effects").filter(|e| *e != Effect::NO_EFFECT);
        if let Some(effects) = effects {
            lines.push(format!("Effects: {}", member_list(effects)));
        }
        lines.push(format!("Stack Size: {}", int(entity, "stack_size")));
        lines.push(format!("Weight: {}", crate::stacking::stack_weight(entity)));
        let value = crate::stacking::stack_value(entity)
            .map_or_else(|_| "priceless".to_string(), |value| value.to_string());
        lines.push(format!("Value: {value}"));
    }
    for (field, label) in [("damage", "Damage"), ("defense", "Defense")] {
        if has(entity, field) {
            lines.push(format!("{label}: {}", int(entity, field)));
            let kind = flags::<DamageType>(entity, &format!("{field}_type"))
                .map(self::label)
                .unwrap_or_default();
            lines.push(format!("{label} Type: {kind}"));
        }
    }
    if has(entity, "health") {
        for vital in VITALS {
            let mut label = vital.to_string();
            label[..1].make_ascii_uppercase();
            lines.push(format!(
                "{label}: {}/{}",
                int(entity, vital),
                int(entity, &format!("max_{vital}"))
            ));
        }
    }
    lines.join("\n")
}

pub fn action_description(entity: &Entity) -> String {
    let actions = flags::<ObjectAction>(entity, "allowed_actions")
        .map(member_list)
        .unwrap_or_default();
    format!("{}\nActions: {actions}", short_description(entity))
}

/// Describe at the requested level of detail.
pub fn inspect(entity: &Entity, detail: InspectionDetails) -> String {
    if detail == InspectionDetails::SHORT_INSPECT {
        short_description(entity)
    } else if detail == InspectionDetails::LONG_INSPECT {
        long_description(entity)
    } else if detail == InspectionDetails::DETAILED_INSPECT {
        detailed_description(entity)
    } else if detail == InspectionDetails::ACTION_INSPECT {
        action_description(entity)
    } else {
        NOTHING_TO_SEE.to_string()
    }
}
