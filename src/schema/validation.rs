//! Schema-driven validation
//!
//! Converts a resource's [`Property`] tree into a framework-free constraint
//! tree, plus a small evaluator that runs the tree against a JSON body and
//! returns human-readable violations. Read-only properties never appear in
//! the tree and are stripped from submission bodies.

use super::property::{Property, PropertyKind};
use serde_json::{Map, Value};

/// One node of the constraint tree.
#[derive(Debug, Clone)]
pub struct Constraint {
    pub field: String,
    pub kind: PropertyKind,
    pub required: bool,
    /// Minimum string length; required strings get 1.
    pub min_length: Option<usize>,
    /// Child constraints when `kind == Object`.
    pub children: Vec<Constraint>,
}

/// Build the constraint tree for a property list.
pub fn constraints(properties: &[Property], required: &[String]) -> Vec<Constraint> {
    properties
        .iter()
        .filter(|p| !p.read_only)
        .map(|property| {
            let is_required = required.iter().any(|name| name == &property.name);
            Constraint {
                field: property.name.clone(),
                kind: property.kind,
                required: is_required,
                min_length: match property.kind {
                    PropertyKind::String if is_required => Some(1),
                    _ => None,
                },
                children: if property.kind == PropertyKind::Object {
                    constraints(&property.children, &property.required)
                } else {
                    Vec::new()
                },
            }
        })
        .collect()
}

/// Evaluate a body against the tree. An empty result means the body passes.
pub fn evaluate(constraints: &[Constraint], body: &Value) -> Vec<String> {
    let mut violations = Vec::new();
    for constraint in constraints {
        let value = body.get(&constraint.field);
        check(constraint, value, &mut violations);
    }
    violations
}

fn check(constraint: &Constraint, value: Option<&Value>, violations: &mut Vec<String>) {
    let field = &constraint.field;
    match value {
        None | Some(Value::Null) => {
            if constraint.required {
                violations.push(format!("{field} is required"));
            }
        }
        Some(value) => match constraint.kind {
            PropertyKind::String => match value.as_str() {
                Some(s) => {
                    if let Some(min) = constraint.min_length {
                        if s.len() < min {
                            violations.push(format!("{field} is required"));
                        }
                    }
                }
                None => violations.push(format!("{field} must be a string")),
            },
            PropertyKind::Integer => {
                if value.as_i64().is_none() && value.as_u64().is_none() {
                    violations.push(format!("{field} must be an integer"));
                }
            }
            PropertyKind::Number => {
                if !value.is_number() {
                    violations.push(format!("{field} must be a number"));
                }
            }
            PropertyKind::Boolean => {
                if !value.is_boolean() {
                    violations.push(format!("{field} must be true or false"));
                }
            }
            PropertyKind::Object => match value.as_object() {
                Some(_) => {
                    for child in &constraint.children {
                        check(child, value.get(&child.field), violations);
                    }
                }
                None => violations.push(format!("{field} must be an object")),
            },
            PropertyKind::Array => {
                if !value.is_array() {
                    violations.push(format!("{field} must be an array"));
                }
            }
        },
    }
}

/// Remove read-only fields from a submission body, recursing through nested
/// objects the schema knows about.
pub fn strip_read_only(properties: &[Property], body: &mut Map<String, Value>) {
    for property in properties {
        if property.read_only {
            body.remove(&property.name);
        } else if property.kind == PropertyKind::Object {
            if let Some(Value::Object(nested)) = body.get_mut(&property.name) {
                strip_read_only(&property.children, nested);
            }
        }
    }
}
