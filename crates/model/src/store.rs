//! Persistence seam
//!
//! Stores speak the canonical encoded form: they save
//! `to_dict(show_private = true)` keyed by identity token and hand the same
//! shape back for decoding. Entity types consult an attached store when an
//! identity token does not match a live instance.

use std::cell::RefCell;
use std::collections::BTreeMap;

use tracing::debug;

use crate::entity::{Entity, RESOLVED_NAME_KEY};
use crate::error::ModelError;
use crate::value::{Map, Value};

/// Read access to persisted entities.
#[cfg_attr(test, mockall::automock)]
pub trait EntityStore {
    /// The encoded entity with `id`, if it is of `resolved_name` or a subtype.
    fn fetch(&self, resolved_name: &str, id: &str) -> Result<Option<Map>, ModelError>;
}

/// In-memory store keyed by identity token.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RefCell<BTreeMap<String, Map>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the entity's record. Returns its identity token.
    pub fn save(&self, entity: &Entity) -> String {
        let id = entity.id();
        let record = entity.to_dict(&[], true);
        debug!(type_name = %entity.resolved_name(), id = %id, "Saved entity");
        self.records.borrow_mut().insert(id.clone(), record);
        id
    }

    pub fn get(&self, id: &str) -> Option<Map> {
        self.records.borrow().get(id).cloned()
    }

    /// Records whose `field` equals `value`.
    pub fn find_by(&self, field: &str, value: &Value) -> Vec<Map> {
        self.records
            .borrow()
            .values()
            .filter(|record| record.get(field) == Some(value))
            .cloned()
            .collect()
    }

    pub fn delete(&self, id: &str) -> bool {
        let removed = self.records.borrow_mut().remove(id).is_some();
        if removed {
            debug!(id, "Deleted entity record");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }
}

impl EntityStore for MemoryStore {
    fn fetch(&self, resolved_name: &str, id: &str) -> Result<Option<Map>, ModelError> {
        Ok(self
            .get(id)
            .filter(|record| is_tagged_within(record, resolved_name)))
    }
}

/// Whether the record's type tag is `resolved_name` or one of its subtypes.
fn is_tagged_within(record: &Map, resolved_name: &str) -> bool {
    match record.get(RESOLVED_NAME_KEY).and_then(Value::as_str) {
        Some(tag) => {
            tag == resolved_name
                || tag
                    .strip_prefix(resolved_name)
                    .is_some_and(|rest| rest.starts_with('.'))
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::attribute::Field;
    use crate::entity::EntityType;

    fn item_types() -> (Rc<EntityType>, Rc<EntityType>) {
        let item = EntityType::builder("Item")
            .field(Field::text("name").default(""))
            .build()
            .unwrap();
        let weapon = EntityType::builder("Weapon")
            .extends(&item)
            .field(Field::int("damage").default(1))
            .build()
            .unwrap();
        (item, weapon)
    }

    #[test]
    fn save_keeps_private_identity() {
        let (_, weapon) = item_types();
        let store = MemoryStore::new();
        let sword = weapon.factory().bind("name", "Sword").create().unwrap();

        let id = store.save(&sword);
        let record = store.get(&id).unwrap();
        assert_eq!(record["uuid"], Value::Str(id.clone()));
        assert_eq!(record[RESOLVED_NAME_KEY], Value::from("Item.Weapon"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn fetch_respects_type_tag() {
        let (item, weapon) = item_types();
        let store = MemoryStore::new();
        let plain = item.factory().create().unwrap();
        let sword = weapon.factory().create().unwrap();
        store.save(&plain);
        store.save(&sword);

        assert!(store.fetch("Item", &sword.id()).unwrap().is_some());
        assert!(store.fetch("Item.Weapon", &sword.id()).unwrap().is_some());
        assert!(store.fetch("Item.Weapon", &plain.id()).unwrap().is_none());
        assert!(store.fetch("Item.Weap", &sword.id()).unwrap().is_none());
    }

    #[test]
    fn find_by_and_delete() {
        let (_, weapon) = item_types();
        let store = MemoryStore::new();
        let a = weapon.factory().bind("damage", 5).create().unwrap();
        let b = weapon.factory().bind("damage", 7).create().unwrap();
        store.save(&a);
        store.save(&b);

        let found = store.find_by("damage", &Value::Int(7));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0]["uuid"], Value::Str(b.id()));

        assert!(store.delete(&a.id()));
        assert!(!store.delete(&a.id()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn find_by_id_falls_back_to_attached_store() {
        let (item, weapon) = item_types();
        let store = Rc::new(MemoryStore::new());
        item.attach_store(store.clone());

        let id = {
            let sword = weapon.factory().bind("damage", 9).create().unwrap();
            store.save(&sword)
        };
        assert!(weapon.instances().is_empty());

        let loaded = item.find_by_id(&id).unwrap();
        assert_eq!(loaded.resolved_name(), "Item.Weapon");
        assert_eq!(loaded.id(), id);
        assert_eq!(loaded.get("damage").unwrap(), Value::Int(9));
    }

    #[test]
    fn find_by_id_consults_mock_store() {
        let (item, _weapon) = item_types();
        let mut mock = MockEntityStore::new();
        mock.expect_fetch()
            .withf(|name, id| name == "Item" && id == "abc123")
            .times(1)
            .returning(|_, id| {
                let mut record = Map::new();
                record.insert(RESOLVED_NAME_KEY.to_string(), Value::from("Item.Weapon"));
                record.insert("uuid".to_string(), Value::from(id));
                record.insert("damage".to_string(), Value::Int(3));
                Ok(Some(record))
            });
        item.attach_store(Rc::new(mock));

        let loaded = item.find_by_id("abc123").unwrap();
        assert_eq!(loaded.type_name(), "Weapon");
        assert_eq!(loaded.id(), "abc123");
    }

    #[test]
    fn missing_reference_is_an_error() {
        let (item, _) = item_types();
        let mut mock = MockEntityStore::new();
        mock.expect_fetch().returning(|_, _| Ok(None));
        item.attach_store(Rc::new(mock));

        let err = item.find_by_id("nope").unwrap_err();
        assert!(matches!(err, ModelError::ReferenceNotFound { .. }));
    }

    #[test]
    fn store_errors_propagate() {
        let (item, _) = item_types();
        let mut mock = MockEntityStore::new();
        mock.expect_fetch()
            .returning(|_, _| Err(ModelError::store("connection lost")));
        item.attach_store(Rc::new(mock));

        assert_eq!(
            item.find_by_id("x").unwrap_err(),
            ModelError::store("connection lost")
        );
    }
}
