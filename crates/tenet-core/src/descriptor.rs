use std::fmt;

use crate::types::Value;

/// A declared type, as written in a signature or an inline assertion.
///
/// Descriptors are inert data; deciding whether a value matches one is the
/// job of a type checker.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDescriptor {
    /// A class, matched by runtime class name.
    Simple(String),
    Nilable(Box<TypeDescriptor>),
    /// Matches when any member matches.
    Any(Vec<TypeDescriptor>),
    /// Matches when every member matches.
    All(Vec<TypeDescriptor>),
    Untyped,
    Noreturn,
    Boolean,
    /// One of a fixed set of values.
    Enum(Vec<Value>),
    Proc,
    SelfType,
    /// The class object itself rather than an instance of it.
    ClassOf(String),
    TypeParameter(String),
    Array(Box<TypeDescriptor>),
    Hash(Box<TypeDescriptor>, Box<TypeDescriptor>),
    Enumerable(Box<TypeDescriptor>),
}

impl TypeDescriptor {
    pub fn simple(name: impl Into<String>) -> Self {
        TypeDescriptor::Simple(name.into())
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[TypeDescriptor]) -> fmt::Result {
    for (i, t) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", t)?;
    }
    Ok(())
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Simple(name) => f.write_str(name),
            TypeDescriptor::Nilable(inner) => write!(f, "nilable({})", inner),
            TypeDescriptor::Any(types) => {
                f.write_str("any(")?;
                write_list(f, types)?;
                f.write_str(")")
            }
            TypeDescriptor::All(types) => {
                f.write_str("all(")?;
                write_list(f, types)?;
                f.write_str(")")
            }
            TypeDescriptor::Untyped => f.write_str("untyped"),
            TypeDescriptor::Noreturn => f.write_str("noreturn"),
            TypeDescriptor::Boolean => f.write_str("Boolean"),
            TypeDescriptor::Enum(values) => {
                f.write_str("enum([")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                f.write_str("])")
            }
            TypeDescriptor::Proc => f.write_str("proc"),
            TypeDescriptor::SelfType => f.write_str("self_type"),
            TypeDescriptor::ClassOf(name) => write!(f, "class_of({})", name),
            TypeDescriptor::TypeParameter(name) => write!(f, "type_parameter(:{})", name),
            TypeDescriptor::Array(inner) => write!(f, "Array[{}]", inner),
            TypeDescriptor::Hash(k, v) => write!(f, "Hash[{}, {}]", k, v),
            TypeDescriptor::Enumerable(inner) => write!(f, "Enumerable[{}]", inner),
        }
    }
}
