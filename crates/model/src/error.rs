//! Unified error types for the model layer
//!
//! Every failure in this crate is local and synchronous. Nothing is retried;
//! callers translate these into their own domain errors.

use thiserror::Error;

/// Unified error type for attribute, entity, registry and factory operations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    /// A freeze-after-write slot was written (or deleted) a second time
    #[error("Attribute '{slot}' is frozen")]
    FrozenAttribute { slot: String },

    /// A value did not match the slot's declared value type
    #[error("Type mismatch for '{slot}': expected {expected}, got {found}")]
    TypeMismatch {
        slot: String,
        expected: String,
        found: String,
    },

    /// A value failed one of the slot's constraint predicates
    #[error("Value {value} for '{slot}' violates constraint: {constraint}")]
    ConstraintViolation {
        slot: String,
        constraint: String,
        value: String,
    },

    /// Delete on a slot that holds no stored value
    #[error("Attribute '{slot}' has no stored value")]
    MissingAttribute { slot: String },

    /// A required slot without default was absent from construction input
    #[error("Missing required field '{field}' for {type_name}")]
    MissingRequiredField { type_name: String, field: String },

    /// A key that does not name any declared slot
    #[error("Unknown field '{field}' for {type_name}")]
    UnknownField { type_name: String, field: String },

    /// A resolved-name component could not be found below the previous one
    #[error("Cannot resolve type '{name}': no subtype named '{component}'")]
    UnresolvedType { name: String, component: String },

    /// Registry lookup miss
    #[error("Type not registered: {name}")]
    NotRegistered { name: String },

    /// A builder without a bound type was asked to create an entity
    #[error("Cannot create an entity from a factory without a bound type")]
    UnboundFactory,

    /// A value could not be normalized into a flag set
    #[error("Invalid {flags} flag value: {value}")]
    InvalidFlag { flags: String, value: String },

    /// An entity type or field declaration is inconsistent
    #[error("Invalid definition: {0}")]
    InvalidDefinition(String),

    /// An identity token did not resolve to a live or stored entity
    #[error("No {type_name} with id {id}")]
    ReferenceNotFound { type_name: String, id: String },

    /// JSON encode/decode failure
    #[error("JSON error: {0}")]
    Json(String),

    /// Failure reported by an attached persistence store
    #[error("Store error: {0}")]
    Store(String),

    /// A configuration value could not be parsed
    #[error("Config error: {0}")]
    Config(String),
}

impl ModelError {
    pub fn frozen(slot: impl Into<String>) -> Self {
        Self::FrozenAttribute { slot: slot.into() }
    }

    pub fn type_mismatch(
        slot: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            slot: slot.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub fn constraint_violation(
        slot: impl Into<String>,
        constraint: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::ConstraintViolation {
            slot: slot.into(),
            constraint: constraint.into(),
            value: value.into(),
        }
    }

    pub fn missing_attribute(slot: impl Into<String>) -> Self {
        Self::MissingAttribute { slot: slot.into() }
    }

    pub fn missing_required(type_name: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MissingRequiredField {
            type_name: type_name.into(),
            field: field.into(),
        }
    }

    pub fn unknown_field(type_name: impl Into<String>, field: impl Into<String>) -> Self {
        Self::UnknownField {
            type_name: type_name.into(),
            field: field.into(),
        }
    }

    pub fn unresolved(name: impl Into<String>, component: impl Into<String>) -> Self {
        Self::UnresolvedType {
            name: name.into(),
            component: component.into(),
        }
    }

    pub fn not_registered(name: impl Into<String>) -> Self {
        Self::NotRegistered { name: name.into() }
    }

    pub fn invalid_flag(flags: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidFlag {
            flags: flags.into(),
            value: value.into(),
        }
    }

    /// Creates a definition error for inconsistent type or field declarations.
    ///
    /// Raised while an entity type is being built, never while instances are
    /// constructed:
    /// - both `default` and `default_factory` configured
    /// - bounds given to an attribute class that does not understand them
    /// - a weak slot declared with a non-entity default
    pub fn invalid_definition(msg: impl Into<String>) -> Self {
        Self::InvalidDefinition(msg.into())
    }

    pub fn reference_not_found(type_name: impl Into<String>, id: impl Into<String>) -> Self {
        Self::ReferenceNotFound {
            type_name: type_name.into(),
            id: id.into(),
        }
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// The slot a slot-level error refers to, if any.
    pub fn slot(&self) -> Option<&str> {
        match self {
            Self::FrozenAttribute { slot }
            | Self::TypeMismatch { slot, .. }
            | Self::ConstraintViolation { slot, .. }
            | Self::MissingAttribute { slot } => Some(slot),
            Self::MissingRequiredField { field, .. } | Self::UnknownField { field, .. } => {
                Some(field)
            }
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ModelError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}
