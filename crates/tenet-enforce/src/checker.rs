use tenet_core::config::Configuration;
use tenet_core::descriptor::TypeDescriptor;
use tenet_core::types::Value;

/// Decides whether a runtime value satisfies a declared type.
///
/// The signature wrapper, props, and inline assertions only ask this trait;
/// they never inspect descriptors themselves.
pub trait TypeChecker: Send + Sync {
    fn matches(&self, ty: &TypeDescriptor, value: &Value) -> bool;

    /// Human-readable description of a mismatch.
    fn error_message(&self, ty: &TypeDescriptor, value: &Value, config: &Configuration) -> String {
        format!("Expected type {}, got {}", ty, describe_value(value, config))
    }
}

/// Scalar values are shown with their contents; anything else only by type.
pub fn describe_value(value: &Value, config: &Configuration) -> String {
    if config.is_scalar_type(value.class_name()) {
        format!("type {} with value {}", value.class_name(), value)
    } else {
        format!("type {}", value.class_name())
    }
}

/// Default checker: matches by runtime class name and recurses into
/// arrays and hashes.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralChecker;

impl TypeChecker for StructuralChecker {
    fn matches(&self, ty: &TypeDescriptor, value: &Value) -> bool {
        match ty {
            TypeDescriptor::Simple(name) => name == "Object" || name == value.class_name(),
            TypeDescriptor::Nilable(inner) => value.is_nil() || self.matches(inner, value),
            TypeDescriptor::Any(types) => types.iter().any(|t| self.matches(t, value)),
            TypeDescriptor::All(types) => types.iter().all(|t| self.matches(t, value)),
            TypeDescriptor::Untyped
            | TypeDescriptor::SelfType
            | TypeDescriptor::TypeParameter(_) => true,
            TypeDescriptor::Noreturn => false,
            TypeDescriptor::Boolean => matches!(value, Value::Bool(_)),
            TypeDescriptor::Enum(values) => values.contains(value),
            TypeDescriptor::Proc => value.is_callable(),
            TypeDescriptor::ClassOf(name) => {
                matches!(value, Value::Type(TypeDescriptor::Simple(n)) if n == name)
            }
            TypeDescriptor::Array(inner) | TypeDescriptor::Enumerable(inner) => match value {
                Value::Array(items) => items.iter().all(|v| self.matches(inner, v)),
                _ => false,
            },
            TypeDescriptor::Hash(key, val) => match value {
                Value::Hash(map) => map.iter().all(|(k, v)| {
                    (self.matches(key, &Value::String(k.clone()))
                        || self.matches(key, &Value::Symbol(k.clone())))
                        && self.matches(val, v)
                }),
                _ => false,
            },
        }
    }
}
