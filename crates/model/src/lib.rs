//! Constrained entity modeling
//!
//! Entity types are declared from [`Field`]s; each field becomes an
//! [`Attribute`] descriptor that type-checks, constrains, defaults and
//! optionally freezes its slot. Entities encode to a canonical map tagged with
//! their resolved type name and decode back to the exact subtype. Builders
//! partially apply constructor arguments.

pub mod attribute;
pub mod config;
pub mod entity;
pub mod error;
pub mod factory;
pub mod flags;
pub mod registry;
pub mod store;
pub mod value;

pub use attribute::{
    Attribute, AttributeClass, Bounds, Coercion, Constraint, DefaultValue, Expected, Field,
    FieldMeta, Number, TypeHint,
};
pub use config::{ModelConfig, Validation};
pub use entity::{
    identity_token, Entity, EntityType, EntityTypeBuilder, WeakEntity, IDENTITY_SLOT,
    RESOLVED_NAME_KEY,
};
pub use error::ModelError;
pub use factory::{args, Arg, Args, Builder};
pub use flags::{FlagKind, FlagSet, Flags};
pub use registry::TypeRegistry;
pub use store::{EntityStore, MemoryStore};
pub use value::{Map, Value, ValueKind};
