//! Model configuration
//!
//! Validation is configured per entity type at definition time. There is no
//! process-wide switch: [`ModelConfig::from_env`] reads the environment once
//! and the resulting value is handed to each type builder explicitly.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Whether attribute writes are type and constraint checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Validation {
    #[default]
    Enforced,
    /// Writes skip type and constraint checks; coercion and post-processing
    /// still apply
    Skipped,
}

impl Validation {
    pub fn is_enforced(self) -> bool {
        matches!(self, Self::Enforced)
    }
}

impl fmt::Display for Validation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enforced => write!(f, "enforced"),
            Self::Skipped => write!(f, "skipped"),
        }
    }
}

impl FromStr for Validation {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "enforced" | "enforce" | "on" => Ok(Self::Enforced),
            "skipped" | "skip" | "off" => Ok(Self::Skipped),
            _ => Err(ModelError::config(format!(
                "Unknown validation mode: '{s}'. Valid values: enforced, skipped"
            ))),
        }
    }
}

/// Settings applied to entity types when they are defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default)]
    pub validation: Validation,
}

impl ModelConfig {
    /// Environment variable that turns validation off when truthy.
    pub const SKIP_CHECKING_VAR: &'static str = "CYBERGUNK_SKIP_CHECKING";

    pub fn new(validation: Validation) -> Self {
        Self { validation }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` with an injectable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let skip = lookup(Self::SKIP_CHECKING_VAR).is_some_and(|val| is_truthy(&val));
        if skip {
            tracing::warn!(
                var = Self::SKIP_CHECKING_VAR,
                "Attribute validation disabled for types defined with this config"
            );
            Self::new(Validation::Skipped)
        } else {
            Self::default()
        }
    }
}

fn is_truthy(val: &str) -> bool {
    matches!(
        val.trim().to_lowercase().as_str(),
        "true" | "1" | "t" | "y" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_enforces_validation() {
        assert_eq!(ModelConfig::default().validation, Validation::Enforced);
        assert!(Validation::default().is_enforced());
    }

    #[test]
    fn truthy_skip_variable_disables_validation() {
        for val in ["true", "1", "T", "y", "Yes", "on"] {
            let config = ModelConfig::from_lookup(|_| Some(val.to_string()));
            assert_eq!(config.validation, Validation::Skipped, "value {val}");
        }
    }

    #[test]
    fn other_values_keep_validation() {
        for val in ["false", "0", "", "nope"] {
            let config = ModelConfig::from_lookup(|_| Some(val.to_string()));
            assert_eq!(config.validation, Validation::Enforced, "value {val}");
        }
        assert_eq!(ModelConfig::from_lookup(|_| None), ModelConfig::default());
    }

    #[test]
    fn validation_parses_and_displays() {
        assert_eq!("Skipped".parse::<Validation>().unwrap(), Validation::Skipped);
        assert_eq!(Validation::Enforced.to_string(), "enforced");
        assert!("sometimes".parse::<Validation>().is_err());
    }

    #[test]
    fn deserializes_with_missing_fields() {
        let config: ModelConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ModelConfig::default());
        let config: ModelConfig = serde_json::from_str(r#"{"validation":"skipped"}"#).unwrap();
        assert_eq!(config.validation, Validation::Skipped);
    }
}
