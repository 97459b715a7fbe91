//! Named weapon recipes
//!
//! Each tier rebinds the one below it, so a change to the base sword carries
//! through to every upgrade.

use cybergunk_model::{args, Builder, Entity, ModelError, Value};

use crate::catalog::GameCatalog;

/// The slots a recipe showcase prints.
pub const SHOWCASE_KEYS: [&str; 6] = [
    "name_prefix",
    "name_infix",
    "name_suffix",
    "damage",
    "damage_type",
    "max_stack_size",
];

#[derive(Debug, Clone)]
pub struct Armory {
    pub sword: Builder,
    pub legendary_sword: Builder,
    pub godly_sword: Builder,
}

impl Armory {
    pub fn new(catalog: &GameCatalog) -> Self {
        let sword = catalog.weapons.melee.factory().bind_args(args([
            ("name_infix", Value::from("Sword")),
            ("damage", 10.into()),
            ("damage_type", "SLASHING".into()),
            ("max_stack_size", 1.into()),
        ]));
        let legendary_sword = sword
            .bind("name_prefix", "Legendary")
            .bind("damage", 100);
        let godly_sword = legendary_sword
            .bind("name_prefix", "Godly")
            .bind("damage", 1000);

        Self {
            sword,
            legendary_sword,
            godly_sword,
        }
    }

    /// Every recipe with its display name, weakest first.
    pub fn recipes(&self) -> [(&'static str, &Builder); 3] {
        [
            ("sword", &self.sword),
            ("legendary sword", &self.legendary_sword),
            ("godly sword", &self.godly_sword),
        ]
    }

    /// Forge one of each recipe.
    pub fn forge_all(&self) -> Result<Vec<Entity>, ModelError> {
        self.recipes()
            .into_iter()
            .map(|(_, recipe)| recipe.create())
            .collect()
    }
}
