//! Merging and splitting item stacks

use std::rc::Rc;

use cybergunk_model::{Entity, Map, Value};
use tracing::debug;

use crate::describe::{flags, float, full_name, int, label};
use crate::error::GameError;
use crate::flags::ObjectAction;

pub fn stack_weight(item: &Entity) -> f64 {
    float(item, "weight") * int(item, "stack_size") as f64
}

pub fn stack_value(item: &Entity) -> Result<i64, GameError> {
    let (value, size) = (int(item, "value"), int(item, "stack_size"));
    value.checked_mul(size).ok_or_else(|| {
        GameError::stacking(format!("{size} items worth {value} each overflow the stack value"))
    })
}

fn require(item: &Entity, action: ObjectAction) -> Result<(), GameError> {
    let allowed =
        flags::<ObjectAction>(item, "allowed_actions").is_some_and(|a| a.contains(action));
    if !allowed {
        return Err(GameError::action_not_allowed(full_name(item), label(action)));
    }
    Ok(())
}

fn compares_names(item: &Entity) -> bool {
    item.get("compare_using_name")
        .ok()
        .and_then(|v| v.as_bool())
        .unwrap_or(true)
}

/// Move all of `other` onto `target`.
///
/// Both must be the same concrete type, carry the same name when the type
/// compares names, and fit within `target`'s maximum stack size. On success
/// `other` is spent and the caller drops it.
pub fn stack(target: &Entity, other: &Entity) -> Result<(), GameError> {
    require(target, ObjectAction::STACK)?;
    if target.ptr_eq(other) {
        return Err(GameError::stacking("an item cannot stack onto itself"));
    }
    if !Rc::ptr_eq(target.entity_type(), other.entity_type()) {
        return Err(GameError::stacking(format!(
            "{} and {} are different items",
            target.type_name(),
            other.type_name()
        )));
    }
    if compares_names(target) && full_name(target) != full_name(other) {
        return Err(GameError::stacking(format!(
            "'{}' and '{}' are different items",
            full_name(target),
            full_name(other)
        )));
    }
    let (held, added) = (int(target, "stack_size"), int(other, "stack_size"));
    let total = held.checked_add(added).ok_or_else(|| {
        GameError::stacking(format!("{held} and {added} overflow the stack size"))
    })?;
    let max = int(target, "max_stack_size");
    if total > max {
        return Err(GameError::stacking(format!(
            "{total} exceeds the max stack size of {max}"
        )));
    }
    target.set("stack_size", total)?;
    debug!(item = %full_name(target), stack_size = total, "Stacked items");
    Ok(())
}

/// Split `count` off `source` into a new stack of the same type.
///
/// The new stack copies every public slot except the identity and size.
pub fn unstack(source: &Entity, count: i64) -> Result<Entity, GameError> {
    require(source, ObjectAction::UNSTACK)?;
    let size = int(source, "stack_size");
    if count < 1 || count >= size {
        return Err(GameError::stacking(format!(
            "cannot split {count} from a stack of {size}"
        )));
    }

    let ty = source.entity_type();
    let mut data: Map = source
        .to_dict(&[], false)
        .into_iter()
        .filter(|(key, _)| ty.init_params().any(|param| param == key.as_str()))
        .collect();
    data.insert("stack_size".to_string(), Value::from(count));
    let split = ty.construct(data)?;
    source.set("stack_size", size - count)?;
    debug!(item = %full_name(source), split = count, remaining = size - count, "Unstacked items");
    Ok(split)
}
