//! Attribute class resolution
//!
//! The attribute classes form a small static tree rooted at
//! [`GENERIC_ATTRIBUTE`]. A declared type name is canonicalized
//! (`"int"` -> `"IntAttribute"`) and searched for depth-first; unknown or
//! missing type names fall back to the generic class instead of failing.

use tracing::trace;

use crate::config::Validation;
use crate::error::ModelError;
use crate::value::ValueKind;

use super::{Attribute, Bounds, Coercion, Constraint, DefaultValue, Field, FieldMeta, TypeHint};

/// What a class adds on top of the generic descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Specialization {
    Generic,
    Number,
    Int,
    Float,
    Str,
    Bool,
    Dict,
    List,
    Flags,
    Reference,
}

impl Specialization {
    fn value_kind(self) -> Option<ValueKind> {
        match self {
            Self::Int => Some(ValueKind::Int),
            Self::Float => Some(ValueKind::Float),
            Self::Str => Some(ValueKind::Str),
            Self::Bool => Some(ValueKind::Bool),
            Self::Dict => Some(ValueKind::Map),
            Self::List => Some(ValueKind::List),
            Self::Generic | Self::Number | Self::Flags | Self::Reference => None,
        }
    }
}

/// One node of the attribute class tree.
#[derive(Debug)]
pub struct AttributeClass {
    name: &'static str,
    specialization: Specialization,
    children: &'static [&'static AttributeClass],
}

pub static GENERIC_ATTRIBUTE: AttributeClass = AttributeClass {
    name: "GenericAttribute",
    specialization: Specialization::Generic,
    children: &[
        &NUMBER_ATTRIBUTE,
        &STR_ATTRIBUTE,
        &BOOL_ATTRIBUTE,
        &DICT_ATTRIBUTE,
        &LIST_ATTRIBUTE,
        &FLAGS_ATTRIBUTE,
        &REFERENCE_ATTRIBUTE,
    ],
};

pub static NUMBER_ATTRIBUTE: AttributeClass = AttributeClass {
    name: "NumberAttribute",
    specialization: Specialization::Number,
    children: &[&INT_ATTRIBUTE, &FLOAT_ATTRIBUTE],
};

pub static INT_ATTRIBUTE: AttributeClass = AttributeClass {
    name: "IntAttribute",
    specialization: Specialization::Int,
    children: &[],
};

pub static FLOAT_ATTRIBUTE: AttributeClass = AttributeClass {
    name: "FloatAttribute",
    specialization: Specialization::Float,
    children: &[],
};

pub static STR_ATTRIBUTE: AttributeClass = AttributeClass {
    name: "StrAttribute",
    specialization: Specialization::Str,
    children: &[],
};

pub static BOOL_ATTRIBUTE: AttributeClass = AttributeClass {
    name: "BoolAttribute",
    specialization: Specialization::Bool,
    children: &[],
};

pub static DICT_ATTRIBUTE: AttributeClass = AttributeClass {
    name: "DictAttribute",
    specialization: Specialization::Dict,
    children: &[],
};

pub static LIST_ATTRIBUTE: AttributeClass = AttributeClass {
    name: "ListAttribute",
    specialization: Specialization::List,
    children: &[],
};

pub static FLAGS_ATTRIBUTE: AttributeClass = AttributeClass {
    name: "FlagsAttribute",
    specialization: Specialization::Flags,
    children: &[],
};

pub static REFERENCE_ATTRIBUTE: AttributeClass = AttributeClass {
    name: "ReferenceAttribute",
    specialization: Specialization::Reference,
    children: &[],
};

/// Find the most specific attribute class for a declared type name.
pub fn resolve(type_name: Option<&str>) -> &'static AttributeClass {
    let Some(type_name) = type_name else {
        return &GENERIC_ATTRIBUTE;
    };
    let wanted = canonical_class_name(type_name);
    let class = search(&GENERIC_ATTRIBUTE, &wanted).unwrap_or(&GENERIC_ATTRIBUTE);
    trace!(type_name, class = class.name, "Resolved attribute class");
    class
}

/// `"int"` -> `"IntAttribute"`, `"STR"` -> `"StrAttribute"`.
pub fn canonical_class_name(type_name: &str) -> String {
    let mut chars = type_name.chars();
    let head: String = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    };
    format!("{head}Attribute")
}

fn search(class: &'static AttributeClass, wanted: &str) -> Option<&'static AttributeClass> {
    if class.name == wanted {
        return Some(class);
    }
    class.children.iter().find_map(|child| search(child, wanted))
}

impl AttributeClass {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn specialization(&self) -> Specialization {
        self.specialization
    }

    pub fn children(&self) -> &'static [&'static AttributeClass] {
        self.children
    }

    fn accepts_bounds(&self) -> bool {
        matches!(
            self.specialization,
            Specialization::Number | Specialization::Int | Specialization::Float
        )
    }

    fn accepts_length(&self) -> bool {
        matches!(
            self.specialization,
            Specialization::Str | Specialization::List | Specialization::Dict
        )
    }

    /// Build the descriptor for `field`.
    pub fn build(
        &'static self,
        field: Field,
        validation: Validation,
    ) -> Result<Attribute, ModelError> {
        let Field {
            name,
            hint,
            default,
            default_factory,
            constraints: extra_constraints,
            minimum,
            maximum,
            min_length,
            max_length,
            expected,
            freeze,
            post_process,
            weak,
            required,
            private,
            init,
            to_type,
            misc,
        } = field;

        let default = match (default, default_factory) {
            (Some(_), Some(_)) => {
                return Err(ModelError::invalid_definition(format!(
                    "'{name}' cannot have both a default and a default factory"
                )))
            }
            (Some(value), None) => DefaultValue::Value(value),
            (None, Some(factory)) => DefaultValue::Factory(factory),
            (None, None) => DefaultValue::None,
        };

        let has_bounds = minimum.is_some() || maximum.is_some();
        if has_bounds && !self.accepts_bounds() {
            return Err(self.unsupported(&name, "minimum/maximum"));
        }
        if (min_length.is_some() || max_length.is_some()) && !self.accepts_length() {
            return Err(self.unsupported(&name, "min_length/max_length"));
        }
        if expected.is_some() && self.specialization != Specialization::Dict {
            return Err(self.unsupported(&name, "expected keys"));
        }

        let mut constraints = Vec::new();
        constraints.extend(Constraint::range(Bounds::new(minimum, maximum)));
        constraints.extend(Constraint::length(Bounds::new(min_length, max_length)));
        constraints.extend(expected.map(Constraint::keys));
        constraints.extend(extra_constraints);

        let value_kind = hint
            .as_ref()
            .and_then(TypeHint::value_kind)
            .or_else(|| self.specialization.value_kind())
            .or_else(|| match &default {
                DefaultValue::Value(value) => value.kind(),
                _ => None,
            });

        if weak && !matches!(value_kind, None | Some(ValueKind::Entity(_))) {
            return Err(ModelError::invalid_definition(format!(
                "'{name}' is weak but holds {}",
                value_kind.map_or_else(String::new, |kind| kind.to_string())
            )));
        }

        let to_type = to_type.or_else(|| match hint {
            Some(TypeHint::Flags(kind)) => Some(Coercion::Flags(kind)),
            Some(TypeHint::Entity(ty)) => Some(Coercion::Entity(ty)),
            _ => None,
        });

        Ok(Attribute {
            name,
            class: self,
            value_kind,
            constraints,
            default,
            freeze,
            post_process,
            weak,
            init,
            meta: FieldMeta {
                required,
                private,
                to_type,
                extra: misc,
            },
            validation,
        })
    }

    fn unsupported(&self, field: &str, option: &str) -> ModelError {
        ModelError::invalid_definition(format!(
            "'{field}' is a {} and does not support {option}",
            self.name
        ))
    }
}

/// Resolve and build in one step, the path entity type builders take.
pub fn build_attribute(field: Field, validation: Validation) -> Result<Attribute, ModelError> {
    let class = resolve(field.hint().map(TypeHint::type_name));
    class.build(field, validation)
}

/// Every class name in the tree, depth-first.
pub fn class_names() -> Vec<&'static str> {
    fn walk(class: &'static AttributeClass, out: &mut Vec<&'static str>) {
        out.push(class.name);
        for child in class.children {
            walk(child, out);
        }
    }
    let mut names = Vec::new();
    walk(&GENERIC_ATTRIBUTE, &mut names);
    names
}
