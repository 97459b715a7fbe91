//! Game-level errors

use cybergunk_model::ModelError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GameError {
    /// Failure from the model layer (validation, decode, factories)
    #[error(transparent)]
    Model(#[from] ModelError),

    /// The object does not allow the requested action
    #[error("{object} does not allow {action}")]
    ActionNotAllowed { object: String, action: String },

    /// Two stacks cannot be merged or a stack cannot be split
    #[error("Cannot stack: {0}")]
    Stacking(String),

    /// An entity lacks a field the game logic expected
    #[error("{type_name} has no usable '{field}'")]
    MissingField { type_name: String, field: String },
}

impl GameError {
    pub fn action_not_allowed(object: impl Into<String>, action: impl Into<String>) -> Self {
        Self::ActionNotAllowed {
            object: object.into(),
            action: action.into(),
        }
    }

    pub fn stacking(msg: impl Into<String>) -> Self {
        Self::Stacking(msg.into())
    }

    pub fn missing_field(type_name: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MissingField {
            type_name: type_name.into(),
            field: field.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_errors_pass_through() {
        let err: GameError = ModelError::frozen("uuid").into();
        assert_eq!(err.to_string(), "Attribute 'uuid' is frozen");
    }

    #[test]
    fn action_message_names_object() {
        let err = GameError::action_not_allowed("Sword", "Stack");
        assert_eq!(err.to_string(), "Sword does not allow Stack");
    }
}
