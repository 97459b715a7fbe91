//! Canonical map and JSON encoding

use std::rc::Rc;

use tracing::debug;

use crate::error::ModelError;
use crate::value::{Map, Value};

use super::{Entity, EntityType, RESOLVED_NAME_KEY};

impl Entity {
    /// Encode into the canonical map form.
    ///
    /// `resolved_name` is always present. An empty `keys` slice selects every
    /// slot; private slots are skipped unless `show_private` is set, and the
    /// flag carries through to nested entities. Weak slots encode as the
    /// referent's identity token.
    pub fn to_dict(&self, keys: &[&str], show_private: bool) -> Map {
        let ty = self.entity_type();
        let metadata = ty.metadata();
        let mut data = Map::new();
        data.insert(
            RESOLVED_NAME_KEY.to_string(),
            Value::Str(ty.resolved_name().to_string()),
        );
        for attr in ty.attributes() {
            let name = attr.name();
            if !keys.is_empty() && !keys.contains(&name) {
                continue;
            }
            if !show_private && metadata.get(name).is_some_and(|meta| meta.private) {
                continue;
            }
            let value = match (attr.is_weak(), attr.get(self)) {
                (true, Value::Entity(referent)) => Value::Str(referent.id()),
                (true, _) => Value::Null,
                (false, value) => value.encode(show_private),
            };
            data.insert(name.to_string(), value);
        }
        data
    }

    /// `to_dict` rendered as pretty-printed JSON with sorted keys.
    pub fn to_json(&self, keys: &[&str], show_private: bool) -> Result<String, ModelError> {
        Ok(serde_json::to_string_pretty(&Value::Map(
            self.to_dict(keys, show_private),
        ))?)
    }
}

impl EntityType {
    /// Decode a map, dispatching on `resolved_name` when present.
    ///
    /// Only constructor parameters present in `data` are passed to the
    /// constructor; they are then written again so post-construction hooks
    /// cannot leave them stale. Slots the constructor froze are left alone.
    pub fn from_dict(self: &Rc<Self>, data: &Map) -> Result<Entity, ModelError> {
        let target = match data.get(RESOLVED_NAME_KEY) {
            Some(Value::Str(name)) => self.resolve_name(name)?,
            Some(other) => {
                return Err(ModelError::type_mismatch(
                    RESOLVED_NAME_KEY,
                    "str",
                    other.type_name(),
                ))
            }
            None => self.clone(),
        };
        decode_as(&target, data)
    }

    pub fn from_json(self: &Rc<Self>, json: &str) -> Result<Entity, ModelError> {
        self.from_dict(&parse_object(json)?)
    }
}

/// Construct `target` from the intersection of its parameters and `data`.
pub(crate) fn decode_as(target: &Rc<EntityType>, data: &Map) -> Result<Entity, ModelError> {
    let params: Vec<&str> = target
        .init_params()
        .filter(|param| data.contains_key(*param))
        .collect();
    let initial: Map = params
        .iter()
        .map(|param| (param.to_string(), data[*param].clone()))
        .collect();

    let entity = target.construct(initial)?;
    for param in params {
        if entity.is_frozen(param) {
            continue;
        }
        entity.set(param, data[param].clone())?;
    }
    debug!(type_name = %target.resolved_name(), id = %entity.id(), "Decoded entity");
    Ok(entity)
}

/// Parse JSON text that must hold an object.
pub(crate) fn parse_object(json: &str) -> Result<Map, ModelError> {
    let parsed: serde_json::Value = serde_json::from_str(json)?;
    match Value::from(parsed) {
        Value::Map(map) => Ok(map),
        other => Err(ModelError::type_mismatch("<json>", "dict", other.type_name())),
    }
}
