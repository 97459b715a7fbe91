//! Cybergunk game objects.
//!
//! This crate declares the game's entity hierarchies on top of
//! `cybergunk-model`.
//!
//! ## Structure
//!
//! - `flags` - Flag sets for slots, damage, actions and world spaces
//! - `objects/` - Entity type declarations, one module per hierarchy
//! - `catalog` - Defines every type once and registers it by name
//! - `describe` - Short, long, detailed and action descriptions
//! - `stacking` - Merging and splitting item stacks
//! - `armory` - Named weapon recipes built from factories

pub mod armory;
pub mod catalog;
pub mod describe;
pub mod error;
pub mod flags;
pub mod objects;
pub mod stacking;

pub use armory::Armory;
pub use catalog::GameCatalog;
pub use error::GameError;
