//! Factory and decode behaviour of melee weapons

use cybergunk_game::flags::DamageType;
use cybergunk_game::{Armory, GameCatalog};
use cybergunk_model::{args, Builder, ModelConfig, ModelError, Value};

fn catalog() -> GameCatalog {
    GameCatalog::new(&ModelConfig::default()).unwrap()
}

fn sword_factory(catalog: &GameCatalog) -> Builder {
    catalog
        .weapons
        .melee
        .factory()
        .bind("name_infix", "Sword")
}

#[test]
fn create_with_damage_uses_default_damage_type() {
    let catalog = catalog();
    let sword = sword_factory(&catalog)
        .create_with(args([("damage", 50)]))
        .unwrap();

    assert_eq!(sword.get("damage").unwrap(), Value::Int(50));
    assert_eq!(
        sword.get("damage_type").unwrap(),
        Value::from(DamageType::NO_DAMAGE_TYPE)
    );
}

#[test]
fn create_without_damage_is_missing_required() {
    let catalog = catalog();
    let err = sword_factory(&catalog).create().unwrap_err();
    assert_eq!(
        err,
        ModelError::MissingRequiredField {
            type_name: "MeleeWeapon".to_string(),
            field: "damage".to_string(),
        }
    );
}

#[test]
fn create_with_undeclared_key_is_unknown_field() {
    let catalog = catalog();
    let err = sword_factory(&catalog)
        .create_with(args([("damage", 50), ("sharpness", 9)]))
        .unwrap_err();
    assert!(matches!(err, ModelError::UnknownField { ref field, .. } if field == "sharpness"));
}

#[test]
fn create_with_negative_damage_violates_range() {
    let catalog = catalog();
    let err = sword_factory(&catalog)
        .create_with(args([("damage", -1)]))
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Value -1 for 'damage' violates constraint: between 0 and 1000"
    );
}

#[test]
fn damage_bounds_are_inclusive() {
    let catalog = catalog();
    let factory = sword_factory(&catalog);
    for ok in [0, 1000] {
        assert!(factory.create_with(args([("damage", ok)])).is_ok(), "{ok}");
    }
    for bad in [-1, 1001] {
        assert!(matches!(
            factory.create_with(args([("damage", bad)])),
            Err(ModelError::ConstraintViolation { .. })
        ));
    }
}

#[test]
fn encoding_tags_the_full_ancestry_and_decodes_to_the_leaf() {
    let catalog = catalog();
    let sword = sword_factory(&catalog)
        .create_with(args([("damage", 50)]))
        .unwrap();
    let data = sword.to_dict(&[], false);
    assert_eq!(
        data["resolved_name"],
        Value::from("Item.Weapon.MeleeWeapon")
    );

    // Decoding through the root type still lands on the leaf.
    let decoded = catalog.items.item.from_dict(&data).unwrap();
    assert_eq!(decoded.resolved_name(), "Item.Weapon.MeleeWeapon");
    assert!(decoded.is_instance_of(&catalog.weapons.melee));
    assert_eq!(decoded, sword);
}

#[test]
fn bind_composition_matches_single_bind() {
    let catalog = catalog();
    let factory = catalog.weapons.melee.factory();
    let chained = factory.bind("damage", 7).bind("name_prefix", "Dull");
    let at_once = factory.bind_args(args([
        ("damage", Value::from(7)),
        ("name_prefix", Value::from("Dull")),
    ]));

    let a = chained.create().unwrap();
    let b = at_once.create().unwrap();
    assert_ne!(a.id(), b.id());
    assert_eq!(a, b);
}

#[test]
fn recipes_leave_their_base_untouched() {
    let catalog = catalog();
    let armory = Armory::new(&catalog);
    let sword = armory.sword.create().unwrap();
    let godly = armory.godly_sword.create().unwrap();

    assert_eq!(sword.get("damage").unwrap(), Value::Int(10));
    assert_eq!(sword.get("name_prefix").unwrap(), Value::from(""));
    assert_eq!(godly.get("damage").unwrap(), Value::Int(1000));
    assert_eq!(godly.get("name_prefix").unwrap(), Value::from("Godly"));
}

#[test]
fn rebinding_by_resolved_name_keeps_arguments() {
    let catalog = catalog();
    let ranged = sword_factory(&catalog)
        .bind("damage", 30)
        .bind_type_name(catalog.registry(), "Item.Weapon.RangedWeapon")
        .unwrap()
        .create()
        .unwrap();
    assert_eq!(ranged.type_name(), "RangedWeapon");
    assert_eq!(ranged.get("name_infix").unwrap(), Value::from("Sword"));
    assert_eq!(ranged.get("damage").unwrap(), Value::Int(30));
}

#[test]
fn identity_is_frozen_after_creation() {
    let catalog = catalog();
    let sword = sword_factory(&catalog)
        .create_with(args([("damage", 50)]))
        .unwrap();
    assert_eq!(sword.id().len(), 32);
    assert!(matches!(
        sword.set("uuid", "0".repeat(32)),
        Err(ModelError::FrozenAttribute { .. })
    ));
}

#[test]
fn factory_binds_reach_constructor_only_slots() {
    let catalog = catalog();
    let loose = catalog
        .items
        .item
        .factory()
        .bind("compare_using_name", false)
        .create()
        .unwrap();
    assert_eq!(loose.get("compare_using_name").unwrap(), Value::Bool(false));
}
